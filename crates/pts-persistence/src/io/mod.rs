//! File I/O operations.
//!
//! This module handles:
//! - Saving sources with atomic writes
//! - Loading sources
//! - Content signatures for dirty and change detection

mod hash;
mod load;
mod save;

pub use hash::{compute_file_hash, content_signature, verify_file_hash};
pub use load::read_text;
pub use save::write_text;
