//! Server configuration, loaded from a TOML file.
//!
//! The file is located via the `PROCURA_CONFIG` environment variable, falling
//! back to `~/.procura/config.toml`. Every field has a default so a missing
//! file yields a working development setup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PortalError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcuraConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,
    /// Token lifetime in days. Expiry is the only invalidation mechanism.
    pub token_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path. `:memory:` is accepted for throwaway instances.
    pub db_path: PathBuf,
}

impl Default for ProcuraConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "procura-dev-secret".into(),
            token_days: 30,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: data_dir().join("procura.db"),
        }
    }
}

impl ProcuraConfig {
    /// Default config file path (`~/.procura/config.toml`).
    pub fn default_path() -> PathBuf {
        data_dir().join("config.toml")
    }

    /// Path selected by `PROCURA_CONFIG`, or the default.
    pub fn resolve_path() -> PathBuf {
        std::env::var("PROCURA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path())
    }

    /// Load from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PortalError::storage(format!("Read config {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| PortalError::storage(format!("Parse config {}: {e}", path.display())))
    }

    /// Load the resolved path if it exists, defaults otherwise. The
    /// `PROCURA_JWT_SECRET` environment variable overrides the file in
    /// either case.
    pub fn load() -> Self {
        let path = Self::resolve_path();
        let mut cfg = if path.exists() {
            Self::load_from(&path).unwrap_or_default()
        } else {
            Self::default()
        };
        if let Ok(secret) = std::env::var("PROCURA_JWT_SECRET") {
            cfg.auth.jwt_secret = secret;
        }
        cfg
    }
}

fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".procura")
}
