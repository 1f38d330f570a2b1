mod author_candidates;
mod automatch;
mod fill_janeway_authors;
mod import_tournament;
mod invalidate;
mod match_info;

pub use author_candidates::cmd_author_candidates;
pub use automatch::{cmd_automatch, cmd_automatch_all};
pub use fill_janeway_authors::cmd_fill_janeway_authors;
pub use import_tournament::cmd_import_tournament;
pub use invalidate::cmd_invalidate_match_info;
pub use match_info::cmd_match_info;

use crate::config::Config;
use crate::db::Store;
use crate::services::{SeaOrmMatchingService, StoreReleaseImporter};
use std::sync::Arc;
use tokio::sync::RwLock;

async fn open_store(config: &Config) -> anyhow::Result<Store> {
    Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await
}

fn matching_service(store: &Store, config: &Config) -> SeaOrmMatchingService {
    let config = Arc::new(RwLock::new(config.clone()));
    let importer = Arc::new(StoreReleaseImporter::new(store.clone(), config.clone()));
    SeaOrmMatchingService::new(store.clone(), config, importer)
}
