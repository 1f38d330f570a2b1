use super::{matching_service, open_store};
use crate::config::Config;
use crate::domain::ReleaserId;
use crate::services::MatchingService;

pub async fn cmd_invalidate_match_info(config: &Config, releaser_id: i32) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let service = matching_service(&store, config);

    if service
        .invalidate_match_info(ReleaserId::new(releaser_id))
        .await?
    {
        println!("Cleared cached match info for releaser {releaser_id}.");
    } else {
        println!("No cached match info for releaser {releaser_id}.");
    }

    Ok(())
}
