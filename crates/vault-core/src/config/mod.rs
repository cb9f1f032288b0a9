//! Vault configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files and `VAULTFLOW__*` environment variables. Each sub-module
//! represents a logical configuration section.

pub mod blob;
pub mod logging;
pub mod quota;
pub mod sync;

use serde::{Deserialize, Serialize};

use self::blob::BlobConfig;
use self::logging::LoggingConfig;
use self::quota::QuotaConfig;
use self::sync::SyncConfig;

use crate::error::AppError;

/// Root vault configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Upload quota gate settings.
    #[serde(default)]
    pub quota: QuotaConfig,
    /// Blob store settings.
    #[serde(default)]
    pub blob: BlobConfig,
    /// Folder tree settings.
    #[serde(default)]
    pub tree: TreeConfig,
    /// Realtime projection sync settings.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Intent log settings.
    #[serde(default)]
    pub intents: IntentConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Folder tree traversal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum number of parent hops walked when resolving breadcrumbs.
    #[serde(default = "default_max_breadcrumb_depth")]
    pub max_breadcrumb_depth: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_breadcrumb_depth: default_max_breadcrumb_depth(),
        }
    }
}

/// Intent log retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentConfig {
    /// Settled intents kept for inspection; pending ones are always kept.
    #[serde(default = "default_settled_history")]
    pub settled_history: usize,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            settled_history: default_settled_history(),
        }
    }
}

impl VaultConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default` with an environment-specific overlay and
    /// environment variables prefixed with `VAULTFLOW__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("VAULTFLOW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

fn default_max_breadcrumb_depth() -> usize {
    20
}

fn default_settled_history() -> usize {
    256
}
