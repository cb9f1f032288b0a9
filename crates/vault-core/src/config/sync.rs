//! Realtime projection sync configuration.

use serde::{Deserialize, Serialize};

use crate::feed::Collection;

/// Which account collections the projection subscribes to on start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Collections subscribed when the projection starts.
    #[serde(default = "default_collections")]
    pub enabled_collections: Vec<Collection>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled_collections: default_collections(),
        }
    }
}

fn default_collections() -> Vec<Collection> {
    vec![
        Collection::Folders,
        Collection::Files,
        Collection::Members,
        Collection::Notes,
    ]
}
