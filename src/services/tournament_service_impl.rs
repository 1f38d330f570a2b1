//! `SeaORM` implementation of the `TournamentImportService` trait.

use crate::constants::tournaments::{ORGANISER_JOB, role_for_job};
use crate::db::{EntryFields, NewEntry, StaffRow, Store};
use crate::entities::{tournament_entries, tournament_phases, tournaments};
use crate::services::screenshot::{Screenshot, load_screenshot};
use crate::services::tournament_service::{
    DirectoryImportSummary, HandleData, ImportOutcome, TournamentError, TournamentFile,
    TournamentImportService,
};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Entry as it should be stored, with handles already resolved.
struct PlannedEntry {
    fields: EntryFields,
    preview_image: Option<String>,
}

struct PlannedPhase {
    name: String,
    entries: Vec<PlannedEntry>,
    staff: BTreeSet<StaffRow>,
}

/// Everything a file asks for, resolved against the store before any write.
struct ImportPlan {
    phases: Vec<PlannedPhase>,
    organiser_releaser_ids: Vec<i32>,
}

#[derive(Default)]
struct PhaseChanges {
    entries_written: usize,
    staff_rewritten: bool,
}

pub struct SeaOrmTournamentService {
    store: Store,
}

impl SeaOrmTournamentService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Resolves a handle to a nick of its releaser by case-insensitive name.
    /// Returns `(nick_id, free_text_name)`; exactly one of them is set.
    async fn resolve_handle(
        &self,
        handle: &HandleData,
        cache: &mut HashMap<(i32, String), Option<i32>>,
    ) -> Result<(Option<i32>, String), TournamentError> {
        let Some(releaser_id) = handle.demozoo_id else {
            return Ok((None, handle.name.clone()));
        };

        let wanted = handle.name.to_lowercase();
        let key = (releaser_id, wanted.clone());
        if let Some(cached) = cache.get(&key) {
            return Ok(match cached {
                Some(nick_id) => (Some(*nick_id), String::new()),
                None => (None, handle.name.clone()),
            });
        }

        let Some(releaser) = self.store.releasers().get(releaser_id).await? else {
            warn!(
                "Handle '{}' refers to unknown releaser {}",
                handle.name, releaser_id
            );
            cache.insert(key, None);
            return Ok((None, handle.name.clone()));
        };

        let matching: Vec<i32> = self
            .store
            .releasers()
            .nicks_with_variants(releaser_id)
            .await?
            .into_iter()
            .filter(|(_, variants)| variants.iter().any(|v| v.name.to_lowercase() == wanted))
            .map(|(nick, _)| nick.id)
            .collect();

        let resolved = match matching.as_slice() {
            [] => {
                warn!(
                    "Cannot find nick '{}' for releaser {} ({})",
                    handle.name, releaser_id, releaser.name
                );
                None
            }
            [nick_id] => Some(*nick_id),
            _ => {
                return Err(TournamentError::AmbiguousNick {
                    name: handle.name.clone(),
                    releaser_id,
                    releaser_name: releaser.name,
                });
            }
        };

        cache.insert(key, resolved);
        Ok(match resolved {
            Some(nick_id) => (Some(nick_id), String::new()),
            None => (None, handle.name.clone()),
        })
    }

    async fn build_plan(
        &self,
        source_file_name: &str,
        data: &TournamentFile,
    ) -> Result<ImportPlan, TournamentError> {
        let mut cache = HashMap::new();
        let mut phases = Vec::with_capacity(data.phases.len());

        for phase_data in &data.phases {
            let mut entries = Vec::with_capacity(phase_data.entries.len());
            for entry_data in &phase_data.entries {
                let (nick_id, name) = self.resolve_handle(&entry_data.handle, &mut cache).await?;
                entries.push(PlannedEntry {
                    fields: EntryFields {
                        nick_id,
                        name,
                        ranking: entry_data.rank.clone(),
                        score: entry_data.points.clone(),
                    },
                    preview_image: entry_data
                        .preview_image
                        .clone()
                        .filter(|image| !image.trim().is_empty()),
                });
            }

            let mut staff = BTreeSet::new();
            for staff_data in &phase_data.staffs {
                let Some(role) = role_for_job(&staff_data.job) else {
                    return Err(TournamentError::UnknownJob {
                        job: staff_data.job.clone(),
                        file: source_file_name.to_string(),
                    });
                };
                let (nick_id, name) = self.resolve_handle(&staff_data.handle, &mut cache).await?;
                staff.insert(StaffRow {
                    nick_id,
                    name,
                    role: role.to_string(),
                });
            }

            phases.push(PlannedPhase {
                name: phase_data.name().to_string(),
                entries,
                staff,
            });
        }

        let mut organiser_releaser_ids = Vec::new();
        for staff_data in data.staffs.iter().filter(|s| s.job == ORGANISER_JOB) {
            let Some(releaser_id) = staff_data.handle.demozoo_id else {
                continue;
            };
            // The handle name has to agree with the releaser before crediting.
            let (nick_id, _) = self.resolve_handle(&staff_data.handle, &mut cache).await?;
            if nick_id.is_some() && !organiser_releaser_ids.contains(&releaser_id) {
                organiser_releaser_ids.push(releaser_id);
            }
        }

        Ok(ImportPlan {
            phases,
            organiser_releaser_ids,
        })
    }

    async fn create_phases(
        &self,
        tournament_id: i32,
        plan: &ImportPlan,
        media_path: &Path,
    ) -> Result<PhaseChanges, TournamentError> {
        let mut changes = PhaseChanges::default();

        for (position, planned) in plan.phases.iter().enumerate() {
            let phase = self
                .store
                .tournaments()
                .create_phase(tournament_id, &planned.name, to_position(position))
                .await?;

            let phase_changes = self.load_phase(&phase, planned, media_path).await?;
            changes.entries_written += phase_changes.entries_written;
            changes.staff_rewritten |= phase_changes.staff_rewritten;
        }

        Ok(changes)
    }

    /// Brings one phase's entries and staff in line with the plan.
    async fn load_phase(
        &self,
        phase: &tournament_phases::Model,
        planned: &PlannedPhase,
        media_path: &Path,
    ) -> Result<PhaseChanges, TournamentError> {
        let repo = self.store.tournaments();
        let mut changes = PhaseChanges::default();
        let existing = repo.entries(phase.id).await?;

        let recreate = existing.len() != planned.entries.len()
            || existing
                .iter()
                .enumerate()
                .any(|(i, entry)| entry.position != to_position(i));

        if recreate {
            if !existing.is_empty() {
                debug!("Entries of phase '{}' changed shape, recreating", phase.name);
            }
            repo.delete_entries(phase.id).await?;

            for (position, planned_entry) in planned.entries.iter().enumerate() {
                let entry = repo
                    .create_entry(
                        phase.id,
                        NewEntry {
                            position: to_position(position),
                            fields: planned_entry.fields.clone(),
                        },
                    )
                    .await?;
                if let Some(shot) = screenshot_for(planned_entry, media_path).await {
                    self.apply_screenshot(entry, &shot).await?;
                }
                changes.entries_written += 1;
            }
        } else {
            for (entry, planned_entry) in existing.into_iter().zip(&planned.entries) {
                let mut changed = false;
                let mut entry = entry;

                if EntryFields::of(&entry) != planned_entry.fields {
                    entry = repo
                        .update_entry(entry, planned_entry.fields.clone())
                        .await?;
                    changed = true;
                }

                if let Some(shot) = screenshot_for(planned_entry, media_path).await
                    && shot.sha256 != entry.original_image_sha256
                {
                    self.apply_screenshot(entry, &shot).await?;
                    changed = true;
                }

                if changed {
                    info!("Updated entry {} of phase '{}'", planned_entry.display_name(), phase.name);
                    changes.entries_written += 1;
                }
            }
        }

        let current: BTreeSet<StaffRow> = repo.staff(phase.id).await?.into_iter().collect();
        if current != planned.staff {
            if !current.is_empty() {
                info!("Updating staff of phase '{}'", phase.name);
            }
            let rows: Vec<StaffRow> = planned.staff.iter().cloned().collect();
            repo.replace_staff(phase.id, &rows).await?;
            changes.staff_rewritten = true;
        }

        Ok(changes)
    }

    async fn apply_screenshot(
        &self,
        entry: tournament_entries::Model,
        shot: &Screenshot,
    ) -> Result<(), TournamentError> {
        self.store
            .tournaments()
            .set_entry_screenshot(entry, &shot.path_string(), &shot.sha256)
            .await?;
        Ok(())
    }

    /// Credits organisers on the party unless already credited there.
    async fn credit_organisers(
        &self,
        tournament: &tournaments::Model,
        role: &str,
        releaser_ids: &[i32],
    ) -> Result<usize, TournamentError> {
        let mut added = 0;
        for &releaser_id in releaser_ids {
            if self
                .store
                .parties()
                .has_organiser(tournament.party_id, releaser_id)
                .await?
            {
                continue;
            }

            info!(
                "Adding party organiser: releaser {} on party {}",
                releaser_id, tournament.party_id
            );
            self.store
                .parties()
                .add_organiser(tournament.party_id, releaser_id, role)
                .await?;
            added += 1;
        }
        Ok(added)
    }
}

impl PlannedEntry {
    fn display_name(&self) -> String {
        match self.fields.nick_id {
            Some(nick_id) => format!("nick #{nick_id}"),
            None => self.fields.name.clone(),
        }
    }
}

async fn screenshot_for(entry: &PlannedEntry, media_path: &Path) -> Option<Screenshot> {
    match &entry.preview_image {
        Some(file_name) => load_screenshot(media_path, file_name).await,
        None => None,
    }
}

fn to_position(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

fn phases_match(stored: &[tournament_phases::Model], plan: &ImportPlan) -> bool {
    stored.len() == plan.phases.len()
        && stored
            .iter()
            .zip(&plan.phases)
            .enumerate()
            .all(|(i, (phase, planned))| phase.name == planned.name && phase.position == to_position(i))
}

#[async_trait]
impl TournamentImportService for SeaOrmTournamentService {
    async fn import_tournament(
        &self,
        source_file_name: &str,
        data: &TournamentFile,
        media_path: &Path,
    ) -> Result<ImportOutcome, TournamentError> {
        let repo = self.store.tournaments();
        let existing = repo.find_by_source_file(source_file_name).await?;

        let party_id = match &existing {
            Some(tournament) => tournament.party_id,
            None => {
                let party = match data.demozoo_party_id {
                    Some(id) => self.store.parties().get(id).await?,
                    None => None,
                };
                let Some(party) = party else {
                    let reason = format!("No match for party: {} {}", data.title, data.started);
                    warn!("{}: {}", source_file_name, reason);
                    return Ok(ImportOutcome::Skipped { reason });
                };

                if let Some(other) = repo
                    .find_by_party_and_name(party.id, &data.tournament_type)
                    .await?
                {
                    return Err(TournamentError::SourceFileMismatch {
                        existing: other.source_file_name,
                        file: source_file_name.to_string(),
                    });
                }
                party.id
            }
        };

        let plan = self.build_plan(source_file_name, data).await?;

        let Some(tournament) = existing else {
            let tournament = repo
                .create(party_id, &data.tournament_type, source_file_name)
                .await?;
            info!("Created tournament: {} ({})", tournament.name, source_file_name);

            self.create_phases(tournament.id, &plan, media_path).await?;
            self.credit_organisers(&tournament, &data.tournament_type, &plan.organiser_releaser_ids)
                .await?;
            return Ok(ImportOutcome::Created);
        };

        if data.demozoo_party_id != Some(tournament.party_id) {
            warn!(
                "Party mismatch for {}! Found party {}, but data looks like {:?}",
                source_file_name, tournament.party_id, data.demozoo_party_id
            );
        }

        let mut renamed = false;
        if tournament.name != data.tournament_type {
            info!(
                "Changed name from {} to {}",
                tournament.name, data.tournament_type
            );
            repo.rename(tournament.clone(), &data.tournament_type).await?;
            renamed = true;
        }

        let stored_phases = repo.phases(tournament.id).await?;
        let phases_recreated = !phases_match(&stored_phases, &plan);

        let changes = if phases_recreated {
            info!("Phases of {} don't match - recreating", source_file_name);
            repo.delete_phases(tournament.id).await?;
            self.create_phases(tournament.id, &plan, media_path).await?
        } else {
            let mut changes = PhaseChanges::default();
            for (phase, planned) in stored_phases.iter().zip(&plan.phases) {
                let phase_changes = self.load_phase(phase, planned, media_path).await?;
                changes.entries_written += phase_changes.entries_written;
                changes.staff_rewritten |= phase_changes.staff_rewritten;
            }
            changes
        };

        let organisers_added = self
            .credit_organisers(&tournament, &data.tournament_type, &plan.organiser_releaser_ids)
            .await?;

        if !renamed
            && !phases_recreated
            && changes.entries_written == 0
            && !changes.staff_rewritten
            && organisers_added == 0
        {
            debug!("{} is unchanged", source_file_name);
            return Ok(ImportOutcome::Unchanged);
        }

        Ok(ImportOutcome::Updated {
            entries_written: changes.entries_written,
            staff_rewritten: changes.staff_rewritten,
            phases_recreated,
        })
    }

    async fn import_tournament_file(
        &self,
        path: &Path,
        media_path: &Path,
    ) -> Result<ImportOutcome, TournamentError> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| TournamentError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let data: TournamentFile =
            serde_json::from_str(&content).map_err(|source| TournamentError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let source_file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| TournamentError::Internal(format!("No file name in {}", path.display())))?;

        self.import_tournament(&source_file_name, &data, media_path)
            .await
    }

    async fn import_tournament_dir(
        &self,
        dir: &Path,
        media_path: &Path,
    ) -> Result<DirectoryImportSummary, TournamentError> {
        let mut files: Vec<_> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")))
            .collect();
        files.sort();

        let mut summary = DirectoryImportSummary::default();
        for path in files {
            let label = path.display().to_string();
            info!("Importing {}", label);

            match self.import_tournament_file(&path, media_path).await {
                Ok(ImportOutcome::Created) => summary.created += 1,
                Ok(ImportOutcome::Updated { .. }) => summary.updated += 1,
                Ok(ImportOutcome::Unchanged) => summary.unchanged += 1,
                Ok(ImportOutcome::Skipped { reason }) => summary.skipped.push((label, reason)),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Failed to import {}: {}", label, e);
                    summary.failed.push((label, e.to_string()));
                }
            }
        }

        Ok(summary)
    }
}
