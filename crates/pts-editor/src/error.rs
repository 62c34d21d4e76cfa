//! Editor error types.

use std::path::PathBuf;

use pts_chip::ChipError;
use pts_codec::{DecodeError, EncodeError, PropertyError};
use pts_persistence::PersistenceError;
use thiserror::Error;

/// An edit, session or controller operation failed.
///
/// Refused edits leave the session untouched.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Chip(#[from] ChipError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Worker(#[from] WorkerError),

    /// Imported data was exported for a different chip.
    #[error("Envelope for '{found}' cannot be imported into '{active}'")]
    ProfileMismatch { active: &'static str, found: String },

    #[error("No target registered for chip '{key}'")]
    UnknownTarget { key: String },

    #[error("Session for '{chip}' has no source file")]
    NoSourcePath { chip: &'static str },

    #[error("No chip is selected")]
    NoActiveSession,

    #[error("Bin {bin} does not exist ({count} bins)")]
    BinOutOfRange { bin: usize, count: usize },

    #[error("Level {level} does not exist in bin {bin} ({count} levels)")]
    LevelOutOfRange {
        bin: usize,
        level: usize,
        count: usize,
    },

    #[error("Line {line} does not exist in level {level} of bin {bin}")]
    LineOutOfRange { bin: usize, level: usize, line: usize },

    #[error("Bin {bin} already has the maximum of {max} levels")]
    LevelLimit { bin: usize, max: usize },

    #[error("Bin {bin} must keep at least one level")]
    LastLevel { bin: usize },

    #[error("Bin {bin} has no levels to copy")]
    EmptyBin { bin: usize },

    #[error("Level {level} in bin {bin} has no voltage level property")]
    NoVoltageKey { bin: usize, level: usize },

    #[error("Voltage operating point {index} does not exist ({count} points)")]
    OpPointOutOfRange { index: usize, count: usize },

    #[error("This source has no voltage table")]
    NoVoltageTable,

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

impl EditorError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Decode(error) => error.user_message(),
            Self::Persistence(error) => error.user_message(),
            Self::ProfileMismatch { active, found } => format!(
                "This export was made for {found} and cannot be loaded into {active}."
            ),
            Self::Worker(WorkerError::Timeout { secs, .. }) => {
                format!("The build did not finish within {secs} seconds.")
            }
            other => other.to_string(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Decode(error) => error.suggestion().map(str::to_string),
            Self::Persistence(error) => error.suggestion(),
            Self::ProfileMismatch { .. } => {
                Some("Select the chip the export was made for, then import again.".into())
            }
            Self::LevelLimit { .. } => Some("Remove a level before adding another.".into()),
            Self::Worker(WorkerError::Spawn { .. }) => {
                Some("Set build.program in the configuration to an installed compiler.".into())
            }
            _ => None,
        }
    }
}

/// A background job failed.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Failed to start '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed while waiting for '{program}'")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("'{program}' was killed after {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("Output {path} was not written")]
    MissingOutput { path: PathBuf },
}

/// Result type alias for editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;
