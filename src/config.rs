// ⚙️ Configuration - TOML file with environment overrides

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_DATABASE: &str = "BUDGET_LEDGER_DB";
pub const ENV_BIND_ADDR: &str = "BUDGET_LEDGER_ADDR";
pub const ENV_LOG_FILTER: &str = "BUDGET_LEDGER_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value '{value}' for {var}")]
    InvalidOverride { var: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// SQLite file holding the registries
    pub database_path: PathBuf,
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,
    /// `tracing_subscriber::EnvFilter` directive, used when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("budget.db"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_filter: "info".to_string(),
        }
    }
}

impl LedgerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Defaults, then the file at `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };

        base.with_overrides(|var| std::env::var(var).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATABASE) {
            self.database_path = PathBuf::from(path);
        }

        if let Some(addr) = lookup(ENV_BIND_ADDR) {
            self.bind_addr = addr.parse().map_err(|_| ConfigError::InvalidOverride {
                var: ENV_BIND_ADDR.to_string(),
                value: addr.clone(),
            })?;
        }

        if let Some(filter) = lookup(ENV_LOG_FILTER) {
            self.log_filter = filter;
        }

        Ok(self)
    }
}
