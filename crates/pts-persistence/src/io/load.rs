//! Source loading.

use std::fs;
use std::path::Path;

use crate::error::{PersistenceError, Result};

/// Read a text source.
pub fn read_text(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|e| PersistenceError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(bytes = text.len(), "Loaded {}", path.display());
    Ok(text)
}
