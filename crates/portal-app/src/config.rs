//! Application configuration.
//!
//! Layered in a fixed order: built-in defaults, then the TOML file (if it
//! exists), then `PORTAL_*` environment variables, then validation.
//!
//! ```toml
//! storage_dir = ".portal/data"
//! default_schedule_offset_ms = 86400000
//! sync_channel_capacity = 64
//! approve_selected_strict = false
//!
//! [credentials]
//! backend = "hashed"
//! path = ".portal/credentials.toml"
//! ```

use crate::approval::DEFAULT_SCHEDULE_OFFSET_MS;
use crate::sync::DEFAULT_CHANNEL_CAPACITY;
use portal_core::config::parse_env_value;
use portal_core::{ConfigDefaults, ConfigMerge, ConfigValidation, PortalError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "PORTAL";

/// Where credentials are verified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum CredentialsConfig {
    /// Built-in plaintext table
    #[default]
    Static,
    /// Salted digests loaded from a TOML file
    Hashed {
        /// Table file
        path: PathBuf,
    },
}

/// Settings for an [`AppCore`](crate::AppCore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory for durable local state; in-memory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    /// Offset from approval time used when a post has no slot
    pub default_schedule_offset_ms: u64,
    /// Buffer of the sync status broadcast channel
    pub sync_channel_capacity: usize,
    /// Credential verification backend
    pub credentials: CredentialsConfig,
    /// Reject selective batches naming non-pending posts
    pub approve_selected_strict: bool,
}

impl ConfigDefaults for AppConfig {
    fn defaults() -> Self {
        Self {
            storage_dir: None,
            default_schedule_offset_ms: DEFAULT_SCHEDULE_OFFSET_MS,
            sync_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            credentials: CredentialsConfig::Static,
            approve_selected_strict: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl AppConfig {
    /// Parse a TOML document over the defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, PortalError> {
        toml::from_str(raw).map_err(|e| PortalError::config(format!("invalid config: {e}")))
    }

    /// Load `path` (defaults if it does not exist), apply environment
    /// overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, PortalError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                PortalError::config(format!("failed to read {}: {e}", path.display()))
            })?;
            Self::from_toml_str(&raw)?
        } else {
            debug!(path = %path.display(), "Config file not found, using defaults");
            Self::defaults()
        };
        config.merge_with_env(ENV_PREFIX)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `vars`, keeping only names under `prefix`.
    ///
    /// Recognized suffixes: `STORAGE_DIR`, `DEFAULT_SCHEDULE_OFFSET_MS`,
    /// `SYNC_CHANNEL_CAPACITY`, `APPROVE_SELECTED_STRICT`, `CREDENTIALS_FILE`
    /// (switches to the hashed backend).
    pub fn apply_overrides<I>(&mut self, prefix: &str, vars: I) -> Result<(), PortalError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let head = format!("{prefix}_");
        for (name, value) in vars {
            let Some(suffix) = name.strip_prefix(&head) else {
                continue;
            };
            match suffix {
                "STORAGE_DIR" => self.storage_dir = Some(PathBuf::from(value)),
                "DEFAULT_SCHEDULE_OFFSET_MS" => {
                    self.default_schedule_offset_ms = parse_env_value(&name, &value)?;
                }
                "SYNC_CHANNEL_CAPACITY" => {
                    self.sync_channel_capacity = parse_env_value(&name, &value)?;
                }
                "APPROVE_SELECTED_STRICT" => {
                    self.approve_selected_strict = parse_env_value(&name, &value)?;
                }
                "CREDENTIALS_FILE" => {
                    self.credentials = CredentialsConfig::Hashed {
                        path: PathBuf::from(value),
                    };
                }
                _ => continue,
            }
            debug!(var = %name, "Applied environment override");
        }
        Ok(())
    }
}

impl ConfigMerge for AppConfig {
    fn merge_with_env(&mut self, prefix: &str) -> Result<(), PortalError> {
        self.apply_overrides(prefix, std::env::vars())
    }
}

impl ConfigValidation for AppConfig {
    fn validate(&self) -> Result<(), PortalError> {
        if self.default_schedule_offset_ms == 0 {
            return Err(PortalError::config(
                "default_schedule_offset_ms must be greater than 0",
            ));
        }
        if self.sync_channel_capacity == 0 {
            return Err(PortalError::config(
                "sync_channel_capacity must be greater than 0",
            ));
        }
        if let CredentialsConfig::Hashed { path } = &self.credentials {
            if path.as_os_str().is_empty() {
                return Err(PortalError::config("credentials.path cannot be empty"));
            }
        }
        Ok(())
    }
}
