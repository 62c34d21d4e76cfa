//! Persistence error types.
//!
//! All persistence operations return structured errors that provide
//! user-friendly messages and optional remediation hints.

use std::path::PathBuf;
use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not an envelope.
    #[error("Invalid envelope: {reason}")]
    InvalidEnvelope { reason: String },

    /// Envelope written by a newer schema.
    #[error("Envelope version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion { found: u32, max_supported: u32 },

    /// Compressing or decompressing the payload failed.
    #[error("Failed to {operation} envelope payload")]
    Compression {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Failed to serialize envelope record")]
    Serialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Deserialization error.
    #[error("Failed to deserialize envelope record")]
    Deserialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl PersistenceError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
            Self::InvalidEnvelope { reason } => {
                format!("The imported data is not a power table envelope: {reason}")
            }
            Self::UnsupportedVersion {
                found,
                max_supported,
            } => {
                format!(
                    "The imported data was exported by a newer version \
                    (envelope version {found}, this version reads up to {max_supported})."
                )
            }
            Self::Compression { .. } => "The imported data is damaged.".to_string(),
            Self::Serialization { .. } => {
                "An error occurred while preparing the export.".to_string()
            }
            Self::Deserialization { .. } => {
                "An error occurred while reading the imported data. It may be corrupted."
                    .to_string()
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
            Self::InvalidEnvelope { .. } | Self::Compression { .. } => {
                Some("Copy the exported text again, including its prefix.".into())
            }
            Self::UnsupportedVersion { .. } => {
                Some("Update to the version that produced the export.".into())
            }
            Self::Serialization { .. } => None,
            Self::Deserialization { .. } => Some("Ask for a fresh export.".into()),
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
