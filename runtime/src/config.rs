//! Layered settings loaded with figment.
//!
//! Sources, highest priority last:
//! 1. Built-in defaults
//! 2. `$SITECHECK_HOME/config.toml` (home defaults to `~/.sitecheck`)
//! 3. `./sitecheck.toml`
//! 4. `SITECHECK_*` environment variables, `__` separating sections
//!    (`SITECHECK_HTTP__TIMEOUT_MS` sets `http.timeout_ms`)

use crate::acquisition::http_client::DEFAULT_TIMEOUT_MS;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_PREFIX: &str = "SITECHECK_";
pub const DEFAULT_BIND: &str = "127.0.0.1:7878";
const DB_FILE: &str = "sitecheck.db";
const CONFIG_FILE: &str = "config.toml";
const LOCAL_CONFIG_FILE: &str = "sitecheck.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Figment(Box::new(e))
    }
}

/// Data directory: `SITECHECK_HOME`, else `~/.sitecheck`.
pub fn sitecheck_home() -> PathBuf {
    if let Ok(home) = std::env::var("SITECHECK_HOME") {
        if !home.trim().is_empty() {
            return PathBuf::from(home);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sitecheck")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to `sitecheck.db` in the data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    pub timeout_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Where reports go when no output path is given. Defaults to the
    /// working directory.
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

impl Settings {
    /// Load from every source and validate.
    pub fn load() -> Result<Self, ConfigError> {
        let settings: Self = Self::figment().extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// The provider chain, without extraction.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let global = sitecheck_home().join(CONFIG_FILE);
        if global.exists() {
            figment = figment.merge(Toml::file(global));
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            figment = figment.merge(Toml::file(local));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.timeout_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        self.bind_addr()?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| sitecheck_home().join(DB_FILE))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export
            .out_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                field: "server.bind".into(),
                reason: e.to_string(),
            })
    }
}
