//! Domain service for importing tournament result files.
//!
//! A results file describes one tournament at a party: ordered phases, each
//! with ranked entries and a staff list, plus tournament-wide staff. Imports
//! are keyed by the file name so the same file can be re-imported any number
//! of times; only rows whose content changed are rewritten.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Mismatched source file name: tournament was imported from {existing}, now {file}")]
    SourceFileMismatch { existing: String, file: String },

    #[error("Unknown staff job '{job}' in {file}")]
    UnknownJob { job: String, file: String },

    #[error("Multiple nicks found for '{name}' on releaser {releaser_id} ({releaser_name})")]
    AmbiguousNick {
        name: String,
        releaser_id: i32,
        releaser_name: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TournamentError {
    /// Fatal errors stop a directory import; the rest only abort one file.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousNick { .. } | Self::Database(_) | Self::Internal(_)
        )
    }
}

impl From<anyhow::Error> for TournamentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

// ========== File schema ==========

#[derive(Debug, Clone, Deserialize)]
pub struct TournamentFile {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "optional_id")]
    pub demozoo_party_id: Option<i32>,
    #[serde(rename = "type")]
    pub tournament_type: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub started: String,
    #[serde(default)]
    pub phases: Vec<PhaseData>,
    #[serde(default)]
    pub staffs: Vec<StaffData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhaseData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub entries: Vec<EntryData>,
    #[serde(default)]
    pub staffs: Vec<StaffData>,
}

impl PhaseData {
    #[must_use]
    pub fn name(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryData {
    pub handle: HandleData,
    #[serde(default, deserialize_with = "scalar_text")]
    pub rank: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub points: String,
    #[serde(default)]
    pub preview_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HandleData {
    #[serde(default, deserialize_with = "optional_id")]
    pub demozoo_id: Option<i32>,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaffData {
    pub handle: HandleData,
    pub job: String,
}

/// Numbers and strings as text; null as the empty string.
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a scalar, found {other}"
        ))),
    }
}

/// An ID given as a number or numeric string. Empty, null and non-numeric
/// values are treated as absent.
fn optional_id<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

// ========== Results ==========

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Created,
    Updated {
        entries_written: usize,
        staff_rewritten: bool,
        phases_recreated: bool,
    },
    Unchanged,
    Skipped {
        reason: String,
    },
}

#[derive(Debug, Default)]
pub struct DirectoryImportSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: Vec<(String, String)>,
    /// Files aborted by a non-fatal error.
    pub failed: Vec<(String, String)>,
}

#[async_trait::async_trait]
pub trait TournamentImportService: Send + Sync {
    /// Reconciles one parsed results file with the stored tournament.
    ///
    /// # Errors
    ///
    /// - Returns `TournamentError::SourceFileMismatch` if the party already has
    ///   this tournament from a different file
    /// - Returns `TournamentError::UnknownJob` if a phase staff job has no role
    /// - Returns `TournamentError::AmbiguousNick` if a handle names more than
    ///   one nick of its releaser
    async fn import_tournament(
        &self,
        source_file_name: &str,
        data: &TournamentFile,
        media_path: &Path,
    ) -> Result<ImportOutcome, TournamentError>;

    /// Reads, parses and imports one file, keyed by its file name.
    async fn import_tournament_file(
        &self,
        path: &Path,
        media_path: &Path,
    ) -> Result<ImportOutcome, TournamentError>;

    /// Imports every `*.json` file in the directory in name order. Non-fatal
    /// errors are collected; a fatal one ends the run.
    async fn import_tournament_dir(
        &self,
        dir: &Path,
        media_path: &Path,
    ) -> Result<DirectoryImportSummary, TournamentError>;
}
