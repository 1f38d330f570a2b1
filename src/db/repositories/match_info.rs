use crate::entities::{author_match_info, prelude::*};
use anyhow::Result;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

/// Counts shown next to a releaser on review pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchCounts {
    pub matched: usize,
    pub unmatched_local: usize,
    pub unmatched_janeway: usize,
}

impl From<author_match_info::Model> for MatchCounts {
    fn from(row: author_match_info::Model) -> Self {
        Self {
            matched: usize::try_from(row.matched_production_count).unwrap_or(0),
            unmatched_local: usize::try_from(row.unmatched_demozoo_production_count).unwrap_or(0),
            unmatched_janeway: usize::try_from(row.unmatched_janeway_production_count)
                .unwrap_or(0),
        }
    }
}

fn to_column(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

pub struct MatchInfoRepository {
    conn: DatabaseConnection,
}

impl MatchInfoRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, releaser_id: i32) -> Result<Option<MatchCounts>> {
        let row = AuthorMatchInfo::find_by_id(releaser_id)
            .one(&self.conn)
            .await?;
        Ok(row.map(MatchCounts::from))
    }

    pub async fn upsert(&self, releaser_id: i32, counts: MatchCounts) -> Result<()> {
        let active_model = author_match_info::ActiveModel {
            releaser_id: Set(releaser_id),
            matched_production_count: Set(to_column(counts.matched)),
            unmatched_demozoo_production_count: Set(to_column(counts.unmatched_local)),
            unmatched_janeway_production_count: Set(to_column(counts.unmatched_janeway)),
            updated_at: Set(Some(chrono::Utc::now().to_rfc3339())),
        };

        AuthorMatchInfo::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(author_match_info::Column::ReleaserId)
                    .update_columns([
                        author_match_info::Column::MatchedProductionCount,
                        author_match_info::Column::UnmatchedDemozooProductionCount,
                        author_match_info::Column::UnmatchedJanewayProductionCount,
                        author_match_info::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, releaser_id: i32) -> Result<bool> {
        let result = AuthorMatchInfo::delete_by_id(releaser_id)
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
