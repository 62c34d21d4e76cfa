//! Error types for chip profile lookups.

use thiserror::Error;

/// Errors that can occur when resolving a chip profile.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChipError {
    /// No catalog entry has this key.
    #[error("Unknown chip profile '{key}'")]
    UnknownProfile { key: String },

    /// No voltage level with this label for the profile.
    #[error("Voltage level '{label}' is not defined for chip '{chip}'")]
    UnknownVoltageLabel { chip: &'static str, label: String },
}

/// Result type for chip profile operations.
pub type Result<T> = std::result::Result<T, ChipError>;
