//! Configuration file management.
//!
//! Optional defaults for the export command, read from `--config FILE`,
//! then `./.hoard.toml`, then `<config dir>/hoard/config.toml`.
//!
//! ```toml
//! [vault]
//! address = "https://vault.example.com:8200"
//! namespace = "team-a"
//! insecure = false
//!
//! [export]
//! format = "json"
//! engine = "kv2"
//! public_key = "/etc/hoard/backup.pub"
//! ```
//!
//! Command-line flags and environment variables always win over the file.
//! Tokens are never read from the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants;
use crate::core::domain::Engine;
use crate::core::format::Format;
use crate::core::store::VaultSettings;
use crate::error::{ConfigError, Result};

/// Parsed configuration file.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vault: VaultSection,
    #[serde(default)]
    pub export: ExportSection,
}

/// Connection defaults.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultSection {
    pub address: Option<String>,
    pub namespace: Option<String>,
    #[serde(default)]
    pub insecure: bool,
    /// Only present so a misplaced token can be rejected loudly.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

/// Export defaults.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSection {
    pub format: Option<String>,
    pub engine: Option<String>,
    pub public_key: Option<String>,
}

/// Connection flags as given on the command line (or via env).
#[derive(Debug, Default, Clone)]
pub struct ConnectionFlags {
    pub address: Option<String>,
    pub token: Option<String>,
    pub namespace: Option<String>,
    pub insecure: bool,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist; otherwise the project file and then
    /// the user file are tried, and an empty configuration is returned if
    /// neither exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile`, `ConfigError::Parse` or
    /// `ConfigError::InvalidValue`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        for path in Self::search_paths() {
            if path.exists() {
                return Self::load_file(&path);
            }
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Candidate config files in lookup order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(constants::CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(
                dir.join(constants::CONFIG_DIR)
                    .join(constants::USER_CONFIG_FILE),
            );
        }
        paths
    }

    fn load_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Parse and validate config contents; `origin` is used in errors.
    pub fn parse(contents: &str, origin: &Path) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration contents.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a token in the file, an
    /// unknown format or an unknown engine.
    pub fn validate(&self) -> Result<()> {
        if self.vault.token.is_some() {
            return Err(ConfigError::InvalidValue {
                field: "vault.token",
                reason: "tokens must come from --token or VAULT_TOKEN".to_string(),
            }
            .into());
        }
        if let Some(format) = &self.export.format {
            format
                .parse::<Format>()
                .map_err(|e| ConfigError::InvalidValue {
                    field: "export.format",
                    reason: e.to_string(),
                })?;
        }
        if let Some(engine) = &self.export.engine {
            engine
                .parse::<Engine>()
                .map_err(|e| ConfigError::InvalidValue {
                    field: "export.engine",
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Build Vault connection settings; flags win over the file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingAddress` or `ConfigError::MissingToken`.
    pub fn vault_settings(&self, flags: ConnectionFlags) -> Result<VaultSettings> {
        let address = flags
            .address
            .or_else(|| self.vault.address.clone())
            .filter(|a| !a.trim().is_empty())
            .ok_or(ConfigError::MissingAddress)?;
        let token = flags
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let mut settings = VaultSettings::new(address, token);
        settings.namespace = flags.namespace.or_else(|| self.vault.namespace.clone());
        settings.insecure = flags.insecure || self.vault.insecure;
        Ok(settings)
    }

    /// Output format name: flag, then file, then the default.
    ///
    /// Returned unparsed so the pipeline reports unsupported names itself.
    pub fn format(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.export.format.clone())
            .unwrap_or_else(|| Format::default().to_string())
    }

    /// Engine override for single-path exports, if any.
    pub fn engine(&self, flag: Option<Engine>) -> Option<Engine> {
        flag.or_else(|| {
            self.export
                .engine
                .as_deref()
                .and_then(|e| e.parse().ok())
        })
    }

    /// Recipient (inline or file path) for `--encrypt`.
    pub fn public_key(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.export.public_key.clone())
    }
}
