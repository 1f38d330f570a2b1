use crate::domain::{JanewayId, LinkClass, ReleaserId};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{janeway_releases, productions};

pub mod migrator;
pub mod repositories;

pub use repositories::janeway::ReleaseAuthorCredit;
pub use repositories::match_info::MatchCounts;
pub use repositories::production::{CandidateFilter, NewProduction};
pub use repositories::tournament::{EntryFields, NewEntry, StaffRow};

/// Explicit handle to the relational store. Every service takes one of these
/// instead of reaching for a global connection.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // An in-memory database lives and dies with its connection.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    /// Fresh migrated in-memory database.
    pub async fn in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn releasers(&self) -> repositories::releaser::ReleaserRepository {
        repositories::releaser::ReleaserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn productions(&self) -> repositories::production::ProductionRepository {
        repositories::production::ProductionRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn janeway(&self) -> repositories::janeway::JanewayRepository {
        repositories::janeway::JanewayRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn match_info(&self) -> repositories::match_info::MatchInfoRepository {
        repositories::match_info::MatchInfoRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn parties(&self) -> repositories::party::PartyRepository {
        repositories::party::PartyRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn tournaments(&self) -> repositories::tournament::TournamentRepository {
        repositories::tournament::TournamentRepository::new(self.conn.clone())
    }

    // ========== Matching queries ==========

    /// Janeway author IDs a releaser is cross-linked to. Parameters that are
    /// not numeric are ignored.
    pub async fn janeway_author_ids_for_releaser(
        &self,
        releaser_id: ReleaserId,
    ) -> Result<Vec<JanewayId>> {
        let parameters = self
            .releasers()
            .external_link_parameters(releaser_id.value(), LinkClass::KestraBitworldAuthor)
            .await?;

        Ok(parameters
            .iter()
            .filter_map(|p| JanewayId::from_parameter(p))
            .collect())
    }

    /// Local productions credited to the releaser (directly or through an
    /// affiliation nick) that fall inside the Janeway archive's scope.
    pub async fn find_candidate_productions_for_releaser(
        &self,
        releaser_id: ReleaserId,
        filter: &CandidateFilter,
    ) -> Result<Vec<productions::Model>> {
        let nick_ids = self.releasers().nick_ids(releaser_id.value()).await?;
        self.productions()
            .find_candidates_for_nicks(&nick_ids, filter)
            .await
    }

    pub async fn find_janeway_releases_for_author_ids(
        &self,
        author_ids: &[JanewayId],
    ) -> Result<Vec<janeway_releases::Model>> {
        self.janeway().releases_by_author_janeway_ids(author_ids).await
    }

    pub async fn get_match_counts(&self, releaser_id: ReleaserId) -> Result<Option<MatchCounts>> {
        self.match_info().get(releaser_id.value()).await
    }

    pub async fn upsert_match_counts(
        &self,
        releaser_id: ReleaserId,
        counts: MatchCounts,
    ) -> Result<()> {
        self.match_info().upsert(releaser_id.value(), counts).await
    }

    pub async fn invalidate_match_counts(&self, releaser_id: ReleaserId) -> Result<bool> {
        self.match_info().delete(releaser_id.value()).await
    }
}
