//! Blob store configuration.

use serde::{Deserialize, Serialize};

/// Blob store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    /// Blob store provider: `"memory"` or `"local"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Prefix placed in front of every `{account}/{unique}_{name}` key.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Lifetime of a content reference in seconds (`0` = never expires).
    #[serde(default = "default_content_ref_ttl")]
    pub content_ref_ttl_seconds: u64,
    /// Local filesystem provider settings.
    #[serde(default)]
    pub local: LocalBlobConfig,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            key_prefix: default_key_prefix(),
            content_ref_ttl_seconds: default_content_ref_ttl(),
            local: LocalBlobConfig::default(),
        }
    }
}

/// Local filesystem blob store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalBlobConfig {
    /// Root path for stored blobs.
    #[serde(default = "default_local_root")]
    pub root_path: String,
}

impl Default for LocalBlobConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_key_prefix() -> String {
    "user_uploads".to_string()
}

fn default_content_ref_ttl() -> u64 {
    3600
}

fn default_local_root() -> String {
    "./data/blobs".to_string()
}
