//! Domain service for reconciling local releasers and productions with the
//! mirrored Janeway archive.

use crate::db::MatchCounts;
use crate::domain::{JanewayId, ProductionId, ReleaserId, Supertype};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("Releaser not found: {0}")]
    ReleaserNotFound(ReleaserId),

    #[error("Janeway author not found: {0}")]
    JanewayAuthorNotFound(JanewayId),

    /// A production already carries a release link. Automatch never writes a
    /// second one; hitting this means the candidate data is inconsistent.
    #[error(
        "Production {production_id} already has a Janeway release link (refusing to add release {parameter})"
    )]
    DuplicateCrossLink {
        production_id: ProductionId,
        parameter: String,
    },

    #[error("Production {production_id} has a non-numeric Janeway release link: {parameter:?}")]
    InvalidLinkParameter {
        production_id: ProductionId,
        parameter: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MatchingError {
    /// Fatal errors point at corrupt data or a matching policy bug and must
    /// stop a batch run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DuplicateCrossLink { .. } | Self::InvalidLinkParameter { .. }
        )
    }
}

impl From<anyhow::Error> for MatchingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalProduction {
    pub id: ProductionId,
    pub title: String,
    pub url: String,
    pub supertype: Supertype,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JanewayRelease {
    pub janeway_id: JanewayId,
    pub title: String,
    pub url: String,
    pub supertype: Supertype,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedPair {
    pub local: LocalProduction,
    pub janeway: JanewayRelease,
}

/// Matching state of one releaser. The three lists are disjoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductionMatchData {
    pub matched: Vec<MatchedPair>,
    pub unmatched_local: Vec<LocalProduction>,
    pub unmatched_janeway: Vec<JanewayRelease>,
}

impl ProductionMatchData {
    #[must_use]
    pub fn counts(&self) -> MatchCounts {
        MatchCounts {
            matched: self.matched.len(),
            unmatched_local: self.unmatched_local.len(),
            unmatched_janeway: self.unmatched_janeway.len(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AutomatchResult {
    pub releaser_id: ReleaserId,
    pub counts: MatchCounts,
    /// Links written in this run.
    pub linked: Vec<(ProductionId, JanewayId)>,
    /// Productions created from Janeway releases in this run.
    pub imported: Vec<ProductionId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingAuthorsReport {
    pub production_ids: Vec<ProductionId>,
    pub missing_author_ids: BTreeSet<JanewayId>,
}

#[async_trait::async_trait]
pub trait MatchingService: Send + Sync {
    /// Candidate productions on both sides for one releaser, split into
    /// matched pairs and unmatched leftovers. Read only.
    ///
    /// # Errors
    ///
    /// - Returns `MatchingError::ReleaserNotFound` if the releaser doesn't exist
    /// - Returns `MatchingError::InvalidLinkParameter` if a relevant release link
    ///   does not hold a numeric ID
    async fn get_production_match_data(
        &self,
        releaser_id: ReleaserId,
    ) -> Result<ProductionMatchData, MatchingError>;

    /// Links unambiguous same-name pairs, imports the remaining Janeway
    /// releases when nothing on the local side is left unmatched, and caches
    /// the resulting counts.
    ///
    /// # Errors
    ///
    /// - Returns `MatchingError::DuplicateCrossLink` if a production picked for
    ///   linking already has a release link
    async fn automatch_productions(
        &self,
        releaser_id: ReleaserId,
    ) -> Result<AutomatchResult, MatchingError>;

    /// Runs automatch for every releaser linked to a Janeway author, in ID
    /// order. Stops at the first error.
    async fn automatch_all(&self) -> Result<Vec<AutomatchResult>, MatchingError>;

    /// Recomputes and caches match counts without writing links.
    async fn refresh_match_info(&self, releaser_id: ReleaserId)
    -> Result<MatchCounts, MatchingError>;

    /// Drops the cached counts. Returns whether a row existed.
    async fn invalidate_match_info(&self, releaser_id: ReleaserId) -> Result<bool, MatchingError>;

    /// Local releasers of the author's kind sharing a normalised name with
    /// any of the author's names, minus those already linked to the author.
    async fn author_match_candidates(
        &self,
        janeway_id: JanewayId,
    ) -> Result<Vec<ReleaserId>, MatchingError>;

    /// Linked productions whose Janeway release credits authors that none of
    /// the production's local authors are linked to.
    async fn productions_with_missing_janeway_authors(
        &self,
    ) -> Result<MissingAuthorsReport, MatchingError>;
}
