//! Upload quota configuration.

use serde::{Deserialize, Serialize};

/// File-count ceiling for the advisory upload gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Maximum number of files per account (`None` disables the gate).
    #[serde(default = "default_max_files")]
    pub max_files: Option<u64>,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
        }
    }
}

fn default_max_files() -> Option<u64> {
    Some(5)
}
