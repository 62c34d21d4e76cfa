//! Codec error types.
//!
//! Structural errors are fatal to a decode call. Every variant names the
//! 0-based source line and its raw text so a broken table can be found by
//! hand.

use thiserror::Error;

/// A table could not be decoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A block opened but never returned to depth zero.
    #[error("Block starting at line {line} is never closed: {text}")]
    Unterminated { line: usize, text: String },

    /// A closing brace appeared with no open block.
    #[error("Unexpected closing brace at line {line}: {text}")]
    UnexpectedClose { line: usize, text: String },

    /// A level block opened inside another level block.
    #[error("Nested block inside a level at line {line}: {text}")]
    NestedLevel { line: usize, text: String },

    /// A table declaration line does not open a block.
    #[error("Table declaration at line {line} does not open a block: {text}")]
    MissingOpenBrace { line: usize, text: String },

    /// An operating point lacks one of its required properties.
    #[error("Operating point at line {line} has no '{key}' property: {text}")]
    MissingProperty {
        line: usize,
        key: &'static str,
        text: String,
    },

    /// An operating point property could not be read as a number.
    #[error("Invalid number at line {line}: {text}")]
    InvalidNumber { line: usize, text: String },

    /// No line in the source opens a power level table for this chip.
    #[error("No power level table found for chip '{chip}'")]
    TableNotFound { chip: &'static str },
}

impl DecodeError {
    /// Source line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            DecodeError::Unterminated { line, .. }
            | DecodeError::UnexpectedClose { line, .. }
            | DecodeError::NestedLevel { line, .. }
            | DecodeError::MissingOpenBrace { line, .. }
            | DecodeError::MissingProperty { line, .. }
            | DecodeError::InvalidNumber { line, .. } => Some(*line),
            DecodeError::TableNotFound { .. } => None,
        }
    }

    /// Rewrite the line index, e.g. to map it back to an earlier line list.
    #[must_use]
    pub fn relocate(mut self, map: impl Fn(usize) -> usize) -> Self {
        match &mut self {
            DecodeError::Unterminated { line, .. }
            | DecodeError::UnexpectedClose { line, .. }
            | DecodeError::NestedLevel { line, .. }
            | DecodeError::MissingOpenBrace { line, .. }
            | DecodeError::MissingProperty { line, .. }
            | DecodeError::InvalidNumber { line, .. } => *line = map(*line),
            DecodeError::TableNotFound { .. } => {}
        }
        self
    }

    /// Short message suitable for a status line.
    pub fn user_message(&self) -> String {
        match self {
            DecodeError::TableNotFound { chip } => {
                format!("The file has no power level table for {chip}")
            }
            DecodeError::MissingProperty { key, .. } => {
                format!("A voltage operating point is missing '{key}'")
            }
            other => match other.line() {
                Some(line) => format!("The table is malformed near line {}", line + 1),
                None => "The table is malformed".to_string(),
            },
        }
    }

    /// Hint for fixing the input, if there is one.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            DecodeError::TableNotFound { .. } => {
                Some("Check that the selected chip matches the device tree")
            }
            DecodeError::Unterminated { .. } | DecodeError::UnexpectedClose { .. } => {
                Some("Check the braces around the reported line")
            }
            _ => None,
        }
    }
}

/// A decoded document could not be written back.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The recorded insertion point lies past the end of the source.
    #[error("Insertion offset {offset} is past the end of {len} source lines")]
    OffsetOutOfRange { offset: usize, len: usize },
}

/// A property line could not be read or rewritten.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PropertyError {
    /// The line is not a `key = value;` statement with one numeric value.
    #[error("Not a numeric property line: {text}")]
    NotNumeric { text: String },

    /// No line carries the requested key.
    #[error("Property '{key}' not found")]
    KeyNotFound { key: String },

    /// The text is not a decimal or `0x` hexadecimal number.
    #[error("Invalid number '{text}'")]
    InvalidNumber { text: String },

    /// An offset would move the value below zero.
    #[error("Property '{key}' cannot go below zero")]
    Underflow { key: String },
}

/// Result type alias for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
