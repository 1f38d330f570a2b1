//! `SeaORM` implementation of the `MatchingService` trait.

use crate::config::Config;
use crate::constants::link_source;
use crate::db::{CandidateFilter, MatchCounts, Store};
use crate::domain::{JanewayId, LinkClass, ProductionId, ReleaserId, Supertype};
use crate::entities::productions;
use crate::parser::title::{generate_search_title, strip_music_extensions};
use crate::services::matching_service::{
    AutomatchResult, JanewayRelease, LocalProduction, MatchedPair, MatchingError,
    MatchingService, MissingAuthorsReport, ProductionMatchData,
};
use crate::services::release_importer::ReleaseImporter;
use async_trait::async_trait;
use sea_orm::SqlErr;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub struct SeaOrmMatchingService {
    store: Store,
    config: Arc<RwLock<Config>>,
    importer: Arc<dyn ReleaseImporter>,
}

impl SeaOrmMatchingService {
    pub fn new(store: Store, config: Arc<RwLock<Config>>, importer: Arc<dyn ReleaseImporter>) -> Self {
        Self {
            store,
            config,
            importer,
        }
    }

    async fn candidate_filter(&self) -> CandidateFilter {
        let config = self.config.read().await;
        CandidateFilter {
            platform_prefix: config.matching.platform_prefix.clone(),
            tracked_music_type: config.matching.tracked_music_type.clone(),
        }
    }

    async fn release_url(&self, janeway_id: JanewayId) -> String {
        self.config.read().await.janeway.release_url(janeway_id.value())
    }

    fn local_production(model: &productions::Model) -> Result<LocalProduction, MatchingError> {
        Ok(LocalProduction {
            id: ProductionId::new(model.id),
            title: model.title.clone(),
            url: format!("/productions/{}/", model.id),
            supertype: parse_supertype(&model.supertype)?,
        })
    }

    /// Writes the automatch link for one pair, refusing to give a production a
    /// second release link.
    async fn link_pair(
        &self,
        production_id: ProductionId,
        janeway_id: JanewayId,
    ) -> Result<(), MatchingError> {
        let parameter = janeway_id.to_parameter();
        let duplicate = || MatchingError::DuplicateCrossLink {
            production_id,
            parameter: parameter.clone(),
        };

        let existing = self
            .store
            .productions()
            .links_for_production(production_id.value(), LinkClass::KestraBitworldRelease)
            .await?;
        if !existing.is_empty() {
            return Err(duplicate());
        }

        self.store
            .productions()
            .create_link(
                production_id.value(),
                LinkClass::KestraBitworldRelease,
                &parameter,
                link_source::AUTOMATCH,
            )
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => duplicate(),
                _ => MatchingError::Database(err),
            })?;

        Ok(())
    }

    /// Janeway author IDs reachable from a production's credited nicks.
    async fn local_author_ids(&self, production_id: i32) -> Result<BTreeSet<JanewayId>, MatchingError> {
        let nick_ids: Vec<i32> = self
            .store
            .productions()
            .credited_nick_ids(production_id)
            .await?
            .into_iter()
            .collect();

        let releaser_ids: BTreeSet<i32> = self
            .store
            .releasers()
            .releaser_ids_for_nicks(&nick_ids)
            .await?
            .into_values()
            .collect();
        let releaser_ids: Vec<i32> = releaser_ids.into_iter().collect();

        Ok(self
            .store
            .releasers()
            .external_links_for_releasers(&releaser_ids, LinkClass::KestraBitworldAuthor)
            .await?
            .iter()
            .filter_map(|link| JanewayId::from_parameter(&link.parameter))
            .collect())
    }
}

fn parse_supertype(value: &str) -> Result<Supertype, MatchingError> {
    value.parse().map_err(MatchingError::Internal)
}

/// Grouping key: normalised title plus supertype. Janeway music titles often
/// carry the module file extension, so it is dropped first.
fn match_key(title: &str, supertype: Supertype, is_janeway: bool) -> (String, Supertype) {
    let title = if is_janeway && supertype == Supertype::Music {
        strip_music_extensions(title)
    } else {
        title.to_string()
    };
    (generate_search_title(&title), supertype)
}

#[async_trait]
impl MatchingService for SeaOrmMatchingService {
    async fn get_production_match_data(
        &self,
        releaser_id: ReleaserId,
    ) -> Result<ProductionMatchData, MatchingError> {
        if self.store.releasers().get(releaser_id.value()).await?.is_none() {
            return Err(MatchingError::ReleaserNotFound(releaser_id));
        }

        let filter = self.candidate_filter().await;
        let local_candidates = self
            .store
            .find_candidate_productions_for_releaser(releaser_id, &filter)
            .await?;

        let author_ids = self.store.janeway_author_ids_for_releaser(releaser_id).await?;
        let janeway_candidates = self
            .store
            .find_janeway_releases_for_author_ids(&author_ids)
            .await?;

        let candidate_ids: Vec<i32> = local_candidates.iter().map(|p| p.id).collect();
        let candidate_parameters: Vec<String> = janeway_candidates
            .iter()
            .map(|r| JanewayId::new(r.janeway_id).to_parameter())
            .collect();

        let links = self
            .store
            .productions()
            .links_touching(
                LinkClass::KestraBitworldRelease,
                &candidate_ids,
                &candidate_parameters,
            )
            .await?;

        let linked_production_ids: Vec<i32> = links.iter().map(|l| l.production_id).collect();
        let linked_productions: HashMap<i32, productions::Model> = self
            .store
            .productions()
            .get_by_ids(&linked_production_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut resolved_links = Vec::with_capacity(links.len());
        for link in links {
            let Some(production) = linked_productions.get(&link.production_id) else {
                continue;
            };
            let Some(janeway_id) = JanewayId::from_parameter(&link.parameter) else {
                return Err(MatchingError::InvalidLinkParameter {
                    production_id: ProductionId::new(link.production_id),
                    parameter: link.parameter,
                });
            };
            resolved_links.push((production, janeway_id));
        }
        resolved_links.sort_by(|(a, _), (b, _)| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

        let matched_janeway_ids: HashSet<JanewayId> =
            resolved_links.iter().map(|(_, id)| *id).collect();
        let matched_local_ids: HashSet<i32> = resolved_links.iter().map(|(p, _)| p.id).collect();

        let matched_janeway_ids_list: Vec<JanewayId> = matched_janeway_ids.iter().copied().collect();
        let matched_releases: HashMap<JanewayId, (String, String)> = self
            .store
            .janeway()
            .releases_by_janeway_ids(&matched_janeway_ids_list)
            .await?
            .into_iter()
            .map(|r| (JanewayId::new(r.janeway_id), (r.title, r.supertype)))
            .collect();

        let mut data = ProductionMatchData::default();

        for (production, janeway_id) in resolved_links {
            let local = Self::local_production(production)?;
            let (title, supertype) = match matched_releases.get(&janeway_id) {
                Some((title, supertype)) => (title.clone(), parse_supertype(supertype)?),
                None => (format!("(Janeway release #{janeway_id})"), local.supertype),
            };
            data.matched.push(MatchedPair {
                janeway: JanewayRelease {
                    janeway_id,
                    title,
                    url: self.release_url(janeway_id).await,
                    supertype,
                },
                local,
            });
        }

        for production in &local_candidates {
            if !matched_local_ids.contains(&production.id) {
                data.unmatched_local.push(Self::local_production(production)?);
            }
        }

        for release in janeway_candidates {
            let janeway_id = JanewayId::new(release.janeway_id);
            if matched_janeway_ids.contains(&janeway_id) {
                continue;
            }
            data.unmatched_janeway.push(JanewayRelease {
                janeway_id,
                title: release.title,
                url: self.release_url(janeway_id).await,
                supertype: parse_supertype(&release.supertype)?,
            });
        }

        debug!(
            "Releaser {}: {} matched, {} unmatched local, {} unmatched Janeway",
            releaser_id,
            data.matched.len(),
            data.unmatched_local.len(),
            data.unmatched_janeway.len()
        );

        Ok(data)
    }

    async fn automatch_productions(
        &self,
        releaser_id: ReleaserId,
    ) -> Result<AutomatchResult, MatchingError> {
        let data = self.get_production_match_data(releaser_id).await?;
        let mut counts = data.counts();
        let mut result = AutomatchResult {
            releaser_id,
            ..Default::default()
        };

        let mut groups: BTreeMap<(String, Supertype), (Vec<ProductionId>, Vec<JanewayId>)> =
            BTreeMap::new();
        for production in &data.unmatched_local {
            groups
                .entry(match_key(&production.title, production.supertype, false))
                .or_default()
                .0
                .push(production.id);
        }
        for release in &data.unmatched_janeway {
            groups
                .entry(match_key(&release.title, release.supertype, true))
                .or_default()
                .1
                .push(release.janeway_id);
        }

        let mut just_linked = HashSet::new();
        for ((title, supertype), (local_ids, janeway_ids)) in &groups {
            let ([production_id], [janeway_id]) = (local_ids.as_slice(), janeway_ids.as_slice())
            else {
                if !local_ids.is_empty() && !janeway_ids.is_empty() {
                    debug!(
                        "Ambiguous {} group '{}': {} local, {} Janeway",
                        supertype,
                        title,
                        local_ids.len(),
                        janeway_ids.len()
                    );
                }
                continue;
            };

            self.link_pair(*production_id, *janeway_id).await?;
            info!(
                "Linked production {} to Janeway release {}",
                production_id, janeway_id
            );

            just_linked.insert(*janeway_id);
            result.linked.push((*production_id, *janeway_id));
            counts.matched += 1;
            counts.unmatched_local -= 1;
            counts.unmatched_janeway -= 1;
        }

        if counts.unmatched_local == 0 {
            let remaining: Vec<JanewayId> = data
                .unmatched_janeway
                .iter()
                .map(|r| r.janeway_id)
                .filter(|id| !just_linked.contains(id))
                .collect();

            for release in self
                .store
                .janeway()
                .releases_by_janeway_ids(&remaining)
                .await?
            {
                let production_id = self.importer.import_release(&release).await?;
                result.imported.push(production_id);
                counts.matched += 1;
                counts.unmatched_janeway -= 1;
            }
        } else if counts.unmatched_janeway > 0 {
            debug!(
                "Releaser {} has {} unmatched local productions, not importing {} Janeway releases",
                releaser_id, counts.unmatched_local, counts.unmatched_janeway
            );
        }

        self.store.upsert_match_counts(releaser_id, counts).await?;
        result.counts = counts;

        info!(
            "Automatch for releaser {}: {} linked, {} imported, counts {:?}",
            releaser_id,
            result.linked.len(),
            result.imported.len(),
            counts
        );

        Ok(result)
    }

    async fn automatch_all(&self) -> Result<Vec<AutomatchResult>, MatchingError> {
        let releaser_ids = self
            .store
            .releasers()
            .ids_with_link_class(LinkClass::KestraBitworldAuthor)
            .await?;

        let mut results = Vec::with_capacity(releaser_ids.len());
        for id in releaser_ids {
            results.push(self.automatch_productions(ReleaserId::new(id)).await?);
        }
        Ok(results)
    }

    async fn refresh_match_info(
        &self,
        releaser_id: ReleaserId,
    ) -> Result<MatchCounts, MatchingError> {
        let counts = self.get_production_match_data(releaser_id).await?.counts();
        self.store.upsert_match_counts(releaser_id, counts).await?;
        Ok(counts)
    }

    async fn invalidate_match_info(&self, releaser_id: ReleaserId) -> Result<bool, MatchingError> {
        Ok(self.store.invalidate_match_counts(releaser_id).await?)
    }

    async fn author_match_candidates(
        &self,
        janeway_id: JanewayId,
    ) -> Result<Vec<ReleaserId>, MatchingError> {
        let Some(author) = self.store.janeway().author_by_janeway_id(janeway_id).await? else {
            return Err(MatchingError::JanewayAuthorNotFound(janeway_id));
        };

        let mut search_titles: Vec<String> = self
            .store
            .janeway()
            .names_for_author(author.id)
            .await?
            .iter()
            .map(|n| generate_search_title(&n.name))
            .collect();
        search_titles.sort();
        search_titles.dedup();

        let candidates = self
            .store
            .releasers()
            .find_ids_by_search_titles(author.is_group, &search_titles)
            .await?;

        let already_linked: HashSet<i32> = self
            .store
            .releasers()
            .releaser_ids_linked_to(LinkClass::KestraBitworldAuthor, &janeway_id.to_parameter())
            .await?
            .into_iter()
            .collect();

        Ok(candidates
            .into_iter()
            .filter(|id| !already_linked.contains(id))
            .map(ReleaserId::new)
            .collect())
    }

    async fn productions_with_missing_janeway_authors(
        &self,
    ) -> Result<MissingAuthorsReport, MatchingError> {
        let mut release_ids_by_production: BTreeMap<i32, Vec<JanewayId>> = BTreeMap::new();
        for link in self
            .store
            .productions()
            .all_links_of_class(LinkClass::KestraBitworldRelease)
            .await?
        {
            match JanewayId::from_parameter(&link.parameter) {
                Some(id) => release_ids_by_production
                    .entry(link.production_id)
                    .or_default()
                    .push(id),
                None => warn!(
                    "Skipping production {}: non-numeric Janeway release link {:?}",
                    link.production_id, link.parameter
                ),
            }
        }

        let mut report = MissingAuthorsReport::default();
        for (production_id, release_ids) in release_ids_by_production {
            let janeway_authors = self
                .store
                .janeway()
                .author_ids_for_releases(&release_ids)
                .await?;
            if janeway_authors.is_empty() {
                continue;
            }

            let local_authors = self.local_author_ids(production_id).await?;
            let missing: Vec<JanewayId> = janeway_authors
                .difference(&local_authors)
                .copied()
                .collect();

            if !missing.is_empty() {
                report.production_ids.push(ProductionId::new(production_id));
                report.missing_author_ids.extend(missing);
            }
        }

        Ok(report)
    }
}
