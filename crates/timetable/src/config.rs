/// Runtime configuration for the planner server
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::schedule::selection::{DEFAULT_MIN_CREDITS, DEFAULT_PALETTE_SIZE};

/// Environment variable consulted when no config path is given on the command line.
pub const CONFIG_ENV_VAR: &str = "TIMETABLE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid bind address {0}")]
    BindAddress(String),

    #[error("palette_size must be at least 1")]
    EmptyPalette,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Local path or http(s) URL of the catalog JSON
    pub catalog_source: String,
    /// SQLite file holding the saved selection
    pub database_path: PathBuf,
    /// Totals below this show a credit warning
    pub min_credits: f64,
    pub palette_size: u8,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
            catalog_source: "data/courses.json".to_string(),
            database_path: PathBuf::from("timetable.db"),
            min_credits: DEFAULT_MIN_CREDITS,
            palette_size: DEFAULT_PALETTE_SIZE,
        }
    }
}

impl PlannerConfig {
    /// Reads and validates a JSON config file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let config: PlannerConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                source: e,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Loads from `path`, falling back to `TIMETABLE_CONFIG`, then to defaults.
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));
        match path {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette_size == 0 {
            return Err(ConfigError::EmptyPalette);
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|_| ConfigError::BindAddress(self.bind_address.clone()))
    }
}
