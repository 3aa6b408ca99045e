//! Layered runtime configuration.
//!
//! Sources, highest priority first:
//! 1. Environment variables with the `RELMAP_` prefix, `__` separating
//!    sections (`RELMAP_DATABASE__URL` -> `database.url`).
//! 2. A TOML file (`relmap.toml` in the working directory unless an explicit
//!    path is given).
//! 3. Built-in defaults.
//!
//! # Invariants
//! - `database.url` is never empty after a successful load.
//! - An explicitly requested config file must exist.

use crate::logging::default_log_level;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "RELMAP_";
pub const DEFAULT_CONFIG_FILE: &str = "relmap.toml";
pub const DEFAULT_DATABASE_URL: &str = "relmap.sqlite3";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug)]
pub enum ConfigError {
    /// Provider merge or extraction failure.
    Figment(Box<figment::Error>),
    /// Explicit config file path does not exist.
    MissingFile(PathBuf),
    /// A field was present but unusable.
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Figment(err) => write!(f, "configuration error: {err}"),
            Self::MissingFile(path) => {
                write!(f, "configuration file `{}` does not exist", path.display())
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "invalid configuration value for `{field}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Figment(err) => Some(err.as_ref()),
            Self::MissingFile(_) | Self::InvalidValue { .. } => None,
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Figment(Box::new(value))
    }
}

/// Database connection settings.
///
/// `url` accepts `:memory:`/`memory` for a process-private in-memory database,
/// `sqlite://<path>` or a bare file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl DatabaseConfig {
    /// Settings for a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            url: ":memory:".to_string(),
            ..Self::default()
        }
    }

    /// Settings for a database file at `path`.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            url: path.as_ref().display().to_string(),
            ..Self::default()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Log sink settings. `dir = None` lets the caller pick a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads defaults, `relmap.toml` (when present) and `RELMAP_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::extract(Self::figment(Path::new(DEFAULT_CONFIG_FILE)))
    }

    /// Loads configuration with an explicit TOML file that must exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        Self::extract(Self::figment(path))
    }

    /// Builds the provider chain. A missing `file` contributes nothing.
    pub fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.database.busy_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.busy_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
