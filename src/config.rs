use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub matching: MatchingConfig,

    pub janeway: JanewayConfig,

    pub tournaments: TournamentConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,

    /// Tokio worker threads; 0 uses the runtime default
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/scenematch.db".to_string(),
            log_level: "info".to_string(),
            max_db_connections: 5,
            min_db_connections: 1,
            worker_threads: 0,
        }
    }
}

/// Scope of the Janeway archive as seen from the local dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Productions on a platform whose name starts with this prefix are
    /// match candidates.
    pub platform_prefix: String,

    /// Internal name of the production type that makes a platformless
    /// production a match candidate.
    pub tracked_music_type: String,

    /// Platform assigned to non-music productions imported from Janeway,
    /// if a platform with this exact name exists.
    pub import_platform_name: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            platform_prefix: "Amiga".to_string(),
            tracked_music_type: "tracked-music".to_string(),
            import_platform_name: "Amiga OCS/ECS".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JanewayConfig {
    pub release_url_base: String,

    pub author_url_base: String,
}

impl Default for JanewayConfig {
    fn default() -> Self {
        Self {
            release_url_base: "http://janeway.exotica.org.uk/release.php?id=".to_string(),
            author_url_base: "http://janeway.exotica.org.uk/author.php?id=".to_string(),
        }
    }
}

impl JanewayConfig {
    #[must_use]
    pub fn release_url(&self, janeway_id: i32) -> String {
        format!("{}{}", self.release_url_base, janeway_id)
    }

    #[must_use]
    pub fn author_url(&self, janeway_id: i32) -> String {
        format!("{}{}", self.author_url_base, janeway_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Directory holding entry preview images referenced by result files.
    pub media_path: String,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            media_path: "./tournament-media".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "scenematch".to_string());

        Self {
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            matching: MatchingConfig::default(),
            janeway: JanewayConfig::default(),
            tournaments: TournamentConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("scenematch").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".scenematch").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.trim().is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if self.matching.platform_prefix.trim().is_empty() {
            anyhow::bail!("Matching platform prefix cannot be empty");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!(
                "min_db_connections ({}) exceeds max_db_connections ({})",
                self.general.min_db_connections,
                self.general.max_db_connections
            );
        }

        Ok(())
    }
}
