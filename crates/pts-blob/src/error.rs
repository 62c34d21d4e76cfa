//! Blob error types.

use thiserror::Error;

/// Errors raised while inspecting a blob fragment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlobError {
    /// The fragment does not start with the FDT magic.
    #[error("Fragment does not start with the FDT magic (found {found:02X?})")]
    InvalidMagic { found: Vec<u8> },

    /// The fragment is shorter than a complete FDT header.
    #[error("Fragment is {len} bytes, too small for an FDT header of {required} bytes")]
    Truncated { len: usize, required: usize },
}

/// Result type alias for blob operations.
pub type Result<T> = std::result::Result<T, BlobError>;
