//! Creation of local productions from Janeway releases.

use crate::config::Config;
use crate::constants::{data_source, link_source};
use crate::db::{NewProduction, Store};
use crate::domain::{JanewayId, LinkClass, ProductionId, Supertype};
use crate::entities::janeway_releases;
use crate::services::matching_service::MatchingError;
use sea_orm::SqlErr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[async_trait::async_trait]
pub trait ReleaseImporter: Send + Sync {
    /// Creates a local production for the release and links it back.
    async fn import_release(
        &self,
        release: &janeway_releases::Model,
    ) -> Result<ProductionId, MatchingError>;
}

/// Imports straight into the store. Authors are resolved through releasers
/// linked to the credited Janeway author; a credit linked from more than one
/// releaser is left out rather than guessed.
pub struct StoreReleaseImporter {
    store: Store,
    config: Arc<RwLock<Config>>,
}

impl StoreReleaseImporter {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }

    /// Nick crediting one Janeway author name: the releaser's nick with a
    /// variant of the same name if it has one, else its primary nick.
    async fn resolve_credit(
        &self,
        author_id: JanewayId,
        credited_name: &str,
    ) -> Result<Option<i32>, MatchingError> {
        let releaser_ids = self
            .store
            .releasers()
            .releaser_ids_linked_to(LinkClass::KestraBitworldAuthor, &author_id.to_parameter())
            .await?;

        let releaser_id = match releaser_ids.as_slice() {
            [] => {
                debug!("No local releaser linked to Janeway author {}", author_id);
                return Ok(None);
            }
            [single] => *single,
            _ => {
                warn!(
                    "Janeway author {} is linked from {} releasers, leaving credit '{}' out",
                    author_id,
                    releaser_ids.len(),
                    credited_name
                );
                return Ok(None);
            }
        };

        let wanted = credited_name.to_lowercase();
        let nicks = self.store.releasers().nicks_with_variants(releaser_id).await?;
        if let Some((nick, _)) = nicks
            .iter()
            .find(|(_, variants)| variants.iter().any(|v| v.name.to_lowercase() == wanted))
        {
            return Ok(Some(nick.id));
        }

        Ok(self
            .store
            .releasers()
            .primary_nick(releaser_id)
            .await?
            .map(|nick| nick.id))
    }
}

#[async_trait::async_trait]
impl ReleaseImporter for StoreReleaseImporter {
    async fn import_release(
        &self,
        release: &janeway_releases::Model,
    ) -> Result<ProductionId, MatchingError> {
        let supertype: Supertype = release
            .supertype
            .parse()
            .map_err(MatchingError::Internal)?;

        let (import_platform_name, tracked_music_type) = {
            let config = self.config.read().await;
            (
                config.matching.import_platform_name.clone(),
                config.matching.tracked_music_type.clone(),
            )
        };

        let mut new = NewProduction::new(release.title.clone(), supertype);
        new.data_source = Some(data_source::JANEWAY.to_string());

        if supertype == Supertype::Music {
            if let Some(music_type) = self
                .store
                .productions()
                .find_type_by_internal_name(&tracked_music_type)
                .await?
            {
                new.type_ids.push(music_type.id);
            }
        } else if let Some(platform) = self
            .store
            .productions()
            .find_platform_by_name(&import_platform_name)
            .await?
        {
            new.platform_ids.push(platform.id);
        }

        let mut person_nicks = Vec::new();
        let mut group_nicks = Vec::new();
        for credit in self.store.janeway().release_author_credits(release.id).await? {
            let Some(nick_id) = self
                .resolve_credit(credit.author_janeway_id, &credit.name)
                .await?
            else {
                continue;
            };

            let bucket = if credit.is_group {
                &mut group_nicks
            } else {
                &mut person_nicks
            };
            if !bucket.contains(&nick_id) {
                bucket.push(nick_id);
            }
        }

        // Group-only releases are credited to the group directly.
        if person_nicks.is_empty() {
            new.author_nick_ids = group_nicks;
        } else {
            new.author_nick_ids = person_nicks;
            new.affiliation_nick_ids = group_nicks;
        }

        let production = self.store.productions().create(new).await?;
        let parameter = JanewayId::new(release.janeway_id).to_parameter();

        self.store
            .productions()
            .create_link(
                production.id,
                LinkClass::KestraBitworldRelease,
                &parameter,
                link_source::JANEWAY_IMPORT,
            )
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => MatchingError::DuplicateCrossLink {
                    production_id: ProductionId::new(production.id),
                    parameter: parameter.clone(),
                },
                _ => MatchingError::Database(err),
            })?;

        info!(
            "Imported Janeway release {} as production {} ({})",
            release.janeway_id, production.id, production.title
        );
        Ok(ProductionId::new(production.id))
    }
}
