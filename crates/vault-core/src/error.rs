//! Unified error types for VaultFlow.
//!
//! Every crate maps its failures into [`AppError`] so that a caller of a
//! multi-step operation can tell exactly which sub-step failed.

use std::fmt;
use thiserror::Error;

/// Error kind categorization used across the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The account is at or above its file-count ceiling. Advisory, pre-flight.
    QuotaExceeded,
    /// Streaming content to the blob store failed.
    UploadFailure,
    /// The blob targeted by a delete was already absent.
    BlobMissing,
    /// Any other blob store failure (transient write/delete errors).
    BlobStoreFailure,
    /// The metadata catalog rejected a write.
    MetadataWriteFailure,
    /// The identity provider requires verification before proceeding.
    VerificationRequired,
    /// The requested catalog entity was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuotaExceeded => write!(f, "QUOTA_EXCEEDED"),
            Self::UploadFailure => write!(f, "UPLOAD_FAILURE"),
            Self::BlobMissing => write!(f, "BLOB_MISSING"),
            Self::BlobStoreFailure => write!(f, "BLOB_STORE_FAILURE"),
            Self::MetadataWriteFailure => write!(f, "METADATA_WRITE_FAILURE"),
            Self::VerificationRequired => write!(f, "VERIFICATION_REQUIRED"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified error used throughout VaultFlow.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable, operation-scoped message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Re-label this error with a different kind, keeping the message and cause.
    pub fn into_kind(self, kind: ErrorKind) -> Self {
        Self { kind, ..self }
    }

    /// Create a quota-exceeded error.
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::QuotaExceeded, message)
    }

    /// Create an upload-failure error.
    pub fn upload_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UploadFailure, message)
    }

    /// Create a blob-missing error.
    pub fn blob_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BlobMissing, message)
    }

    /// Create a blob-store-failure error.
    pub fn blob_store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BlobStoreFailure, message)
    }

    /// Create a metadata-write-failure error.
    pub fn metadata_write(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MetadataWriteFailure, message)
    }

    /// Create a verification-required error.
    pub fn verification_required(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::VerificationRequired, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        let kind = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::BlobMissing
        } else {
            ErrorKind::BlobStoreFailure
        };
        Self::with_source(kind, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
