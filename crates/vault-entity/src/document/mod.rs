//! Opaque documents for collections the vault only mirrors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vault_core::types::id::DocumentId;

/// A note or team-member document. The vault never interprets the body;
/// it only carries it through the realtime projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpaqueDocument {
    /// Document identifier.
    pub id: DocumentId,
    /// Arbitrary document fields.
    pub body: serde_json::Value,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
}

impl OpaqueDocument {
    /// Create a document stamped now.
    pub fn new(body: serde_json::Value) -> Self {
        Self {
            id: DocumentId::new(),
            body,
            created_at: Utc::now(),
        }
    }
}
