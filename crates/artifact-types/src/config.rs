//! Configuration loading for the artifact index.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `~/.config/artifact-index/config.toml`.

use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;

/// Groups fetched from the metadata store per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the RocksDB metadata store
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Root directory for per-repository search indexes
    #[serde(default = "default_index_root")]
    pub index_root: String,

    /// Number of artifact groups fetched per page during a rebuild
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "artifact-index")
}

fn default_db_path() -> String {
    project_dirs()
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_index_root() -> String {
    project_dirs()
        .map(|p| p.data_local_dir().join("index"))
        .unwrap_or_else(|| PathBuf::from("./index"))
        .to_string_lossy()
        .to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            index_root: default_index_root(),
            page_size: default_page_size(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/artifact-index/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (ARTIFACT_DB_PATH, ARTIFACT_PAGE_SIZE, ...)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ArtifactError> {
        let config_dir = project_dirs()
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .map_err(|e| ArtifactError::Config(e.to_string()))?
            .set_default("index_root", default_index_root())
            .map_err(|e| ArtifactError::Config(e.to_string()))?
            .set_default("page_size", default_page_size() as i64)
            .map_err(|e| ArtifactError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| ArtifactError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Nested keys use a double underscore so ARTIFACT_DB_PATH maps to db_path.
        builder = builder.add_source(
            Environment::with_prefix("ARTIFACT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder
            .build()
            .map_err(|e| ArtifactError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ArtifactError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.page_size == 0 {
            return Err(ArtifactError::Config("page_size must be > 0".to_string()));
        }
        Ok(())
    }

    /// Expand `~/` in db_path
    pub fn expanded_db_path(&self) -> PathBuf {
        expand_home(&self.db_path)
    }

    /// Expand `~/` in index_root
    pub fn expanded_index_root(&self) -> PathBuf {
        expand_home(&self.index_root)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}
