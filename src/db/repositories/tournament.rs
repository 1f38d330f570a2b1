use crate::entities::{
    prelude::*, tournament_entries, tournament_phase_staff, tournament_phases, tournaments,
};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

/// Competitor and result fields of an entry, compared on re-import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFields {
    pub nick_id: Option<i32>,
    /// Free-text name, empty when `nick_id` is set.
    pub name: String,
    pub ranking: String,
    pub score: String,
}

impl EntryFields {
    #[must_use]
    pub fn of(entry: &tournament_entries::Model) -> Self {
        Self {
            nick_id: entry.nick_id,
            name: entry.name.clone(),
            ranking: entry.ranking.clone(),
            score: entry.score.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub position: i32,
    pub fields: EntryFields,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StaffRow {
    pub nick_id: Option<i32>,
    pub name: String,
    pub role: String,
}

pub struct TournamentRepository {
    conn: DatabaseConnection,
}

impl TournamentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_source_file(
        &self,
        source_file_name: &str,
    ) -> Result<Option<tournaments::Model>> {
        Ok(Tournaments::find()
            .filter(tournaments::Column::SourceFileName.eq(source_file_name))
            .one(&self.conn)
            .await?)
    }

    pub async fn find_by_party_and_name(
        &self,
        party_id: i32,
        name: &str,
    ) -> Result<Option<tournaments::Model>> {
        Ok(Tournaments::find()
            .filter(tournaments::Column::PartyId.eq(party_id))
            .filter(tournaments::Column::Name.eq(name))
            .one(&self.conn)
            .await?)
    }

    pub async fn create(
        &self,
        party_id: i32,
        name: &str,
        source_file_name: &str,
    ) -> Result<tournaments::Model> {
        Ok(tournaments::ActiveModel {
            party_id: Set(party_id),
            name: Set(name.to_string()),
            source_file_name: Set(source_file_name.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?)
    }

    pub async fn rename(&self, tournament: tournaments::Model, name: &str) -> Result<()> {
        let mut active: tournaments::ActiveModel = tournament.into();
        active.name = Set(name.to_string());
        active.update(&self.conn).await?;
        Ok(())
    }

    // ========== Phases ==========

    pub async fn phases(&self, tournament_id: i32) -> Result<Vec<tournament_phases::Model>> {
        Ok(TournamentPhases::find()
            .filter(tournament_phases::Column::TournamentId.eq(tournament_id))
            .order_by_asc(tournament_phases::Column::Position)
            .all(&self.conn)
            .await?)
    }

    pub async fn create_phase(
        &self,
        tournament_id: i32,
        name: &str,
        position: i32,
    ) -> Result<tournament_phases::Model> {
        Ok(tournament_phases::ActiveModel {
            tournament_id: Set(tournament_id),
            name: Set(name.to_string()),
            position: Set(position),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?)
    }

    /// Removes every phase of the tournament along with their entries and staff.
    pub async fn delete_phases(&self, tournament_id: i32) -> Result<()> {
        let phase_ids: Vec<i32> = self
            .phases(tournament_id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        if phase_ids.is_empty() {
            return Ok(());
        }

        TournamentEntries::delete_many()
            .filter(tournament_entries::Column::PhaseId.is_in(phase_ids.iter().copied()))
            .exec(&self.conn)
            .await?;

        TournamentPhaseStaff::delete_many()
            .filter(tournament_phase_staff::Column::PhaseId.is_in(phase_ids.iter().copied()))
            .exec(&self.conn)
            .await?;

        let result = TournamentPhases::delete_many()
            .filter(tournament_phases::Column::TournamentId.eq(tournament_id))
            .exec(&self.conn)
            .await?;

        debug!(
            "Deleted {} phases of tournament {}",
            result.rows_affected, tournament_id
        );
        Ok(())
    }

    // ========== Entries ==========

    pub async fn entries(&self, phase_id: i32) -> Result<Vec<tournament_entries::Model>> {
        Ok(TournamentEntries::find()
            .filter(tournament_entries::Column::PhaseId.eq(phase_id))
            .order_by_asc(tournament_entries::Column::Position)
            .all(&self.conn)
            .await?)
    }

    pub async fn create_entry(
        &self,
        phase_id: i32,
        entry: NewEntry,
    ) -> Result<tournament_entries::Model> {
        Ok(tournament_entries::ActiveModel {
            phase_id: Set(phase_id),
            position: Set(entry.position),
            nick_id: Set(entry.fields.nick_id),
            name: Set(entry.fields.name),
            ranking: Set(entry.fields.ranking),
            score: Set(entry.fields.score),
            screenshot_path: Set(None),
            original_image_sha256: Set(String::new()),
            updated_at: Set(Some(chrono::Utc::now().to_rfc3339())),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?)
    }

    pub async fn update_entry(
        &self,
        entry: tournament_entries::Model,
        fields: EntryFields,
    ) -> Result<tournament_entries::Model> {
        let mut active: tournament_entries::ActiveModel = entry.into();
        active.nick_id = Set(fields.nick_id);
        active.name = Set(fields.name);
        active.ranking = Set(fields.ranking);
        active.score = Set(fields.score);
        active.updated_at = Set(Some(chrono::Utc::now().to_rfc3339()));
        Ok(active.update(&self.conn).await?)
    }

    pub async fn set_entry_screenshot(
        &self,
        entry: tournament_entries::Model,
        path: &str,
        sha256: &str,
    ) -> Result<tournament_entries::Model> {
        let mut active: tournament_entries::ActiveModel = entry.into();
        active.screenshot_path = Set(Some(path.to_string()));
        active.original_image_sha256 = Set(sha256.to_string());
        active.updated_at = Set(Some(chrono::Utc::now().to_rfc3339()));
        Ok(active.update(&self.conn).await?)
    }

    pub async fn delete_entries(&self, phase_id: i32) -> Result<()> {
        TournamentEntries::delete_many()
            .filter(tournament_entries::Column::PhaseId.eq(phase_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    // ========== Staff ==========

    pub async fn staff(&self, phase_id: i32) -> Result<Vec<StaffRow>> {
        let rows = TournamentPhaseStaff::find()
            .filter(tournament_phase_staff::Column::PhaseId.eq(phase_id))
            .order_by_asc(tournament_phase_staff::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| StaffRow {
                nick_id: row.nick_id,
                name: row.name,
                role: row.role,
            })
            .collect())
    }

    pub async fn replace_staff(&self, phase_id: i32, staff: &[StaffRow]) -> Result<()> {
        TournamentPhaseStaff::delete_many()
            .filter(tournament_phase_staff::Column::PhaseId.eq(phase_id))
            .exec(&self.conn)
            .await?;

        for row in staff {
            tournament_phase_staff::ActiveModel {
                phase_id: Set(phase_id),
                nick_id: Set(row.nick_id),
                name: Set(row.name.clone()),
                role: Set(row.role.clone()),
                ..Default::default()
            }
            .insert(&self.conn)
            .await?;
        }

        Ok(())
    }
}
