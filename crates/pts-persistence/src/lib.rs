//! Persistence for Power Table Studio.
//!
//! This crate provides:
//!
//! - **Atomic writes** of edited sources (temp file + rename)
//! - **Content signatures** via SHA-256 for dirty and change detection
//! - **Auto-save** configuration and dirty tracking
//! - **The import/export envelope**, a framed and compressed record that
//!   carries one chip's tables between sources ([`Envelope`])
//!
//! # Example
//!
//! ```
//! use pts_persistence::{Envelope, content_signature};
//!
//! let envelope = Envelope {
//!     chip: "kona".to_string(),
//!     description: "stock".to_string(),
//!     table: "qcom,gpu-pwrlevels-0 {\n};".to_string(),
//!     voltage_table: None,
//! };
//! let armored = envelope.to_armored().unwrap();
//! assert_eq!(Envelope::from_armored(&armored).unwrap(), envelope);
//! assert_eq!(content_signature("").len(), 64);
//! ```

mod autosave;
mod envelope;
mod error;
mod io;

pub use autosave::{AutoSaveConfig, DirtyTracker};
pub use envelope::{ARMOR_PREFIX, CURRENT_ENVELOPE_VERSION, ENVELOPE_MAGIC, Envelope};
pub use error::{PersistenceError, Result};
pub use io::{compute_file_hash, content_signature, read_text, verify_file_hash, write_text};
