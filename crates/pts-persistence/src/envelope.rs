//! Import/export envelope.
//!
//! An envelope carries one chip's tables between sources. The record is JSON,
//! gzip compressed and framed so a truncated or foreign blob is rejected
//! before decompression:
//!
//! ```text
//! +------------------+
//! | Magic: "PTE\x01" | 4 bytes
//! +------------------+
//! | Version: 1       | 4 bytes - u32 little-endian schema version
//! +------------------+
//! | Payload length   | 4 bytes - u32 little-endian, compressed bytes
//! +------------------+
//! | gzip(JSON)       | Variable
//! +------------------+
//! ```
//!
//! For clipboard transfer the bytes are hex encoded behind [`ARMOR_PREFIX`].

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

use crate::error::{PersistenceError, Result};

/// Magic bytes at the start of every envelope.
pub const ENVELOPE_MAGIC: [u8; 4] = [b'P', b'T', b'E', 0x01];

/// Current schema version.
///
/// Envelopes with a higher version are rejected.
pub const CURRENT_ENVELOPE_VERSION: u32 = 1;

/// Scheme prefix of the armored text form.
pub const ARMOR_PREFIX: &str = "pts-envelope:";

const HEADER_LEN: usize = 12;

/// Exported tables for one chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Profile key the tables were exported from.
    pub chip: String,
    pub description: String,
    /// Power level table text.
    pub table: String,
    /// Voltage operating points, for chips that edit them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_table: Option<String>,
}

impl Envelope {
    /// Frame the record as envelope bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(self).map_err(|e| PersistenceError::Serialization {
            source: Box::new(e),
        })?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&json)
            .map_err(|e| PersistenceError::Compression {
                operation: "compress",
                source: e,
            })?;
        let payload = encoder.finish().map_err(|e| PersistenceError::Compression {
            operation: "compress",
            source: e,
        })?;
        let length = u32::try_from(payload.len()).map_err(|_| PersistenceError::InvalidEnvelope {
            reason: format!("payload of {} bytes is too large", payload.len()),
        })?;

        let mut output = Vec::with_capacity(HEADER_LEN + payload.len());
        output.extend_from_slice(&ENVELOPE_MAGIC);
        output.extend_from_slice(&CURRENT_ENVELOPE_VERSION.to_le_bytes());
        output.extend_from_slice(&length.to_le_bytes());
        output.extend_from_slice(&payload);

        tracing::debug!(chip = %self.chip, bytes = output.len(), "Packed envelope");
        Ok(output)
    }

    /// Validate framing and read the record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let invalid = |reason: &str| PersistenceError::InvalidEnvelope {
            reason: reason.to_string(),
        };

        if bytes.len() < HEADER_LEN {
            return Err(invalid("too short"));
        }
        if bytes[0..4] != ENVELOPE_MAGIC {
            return Err(invalid("invalid magic bytes"));
        }

        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version > CURRENT_ENVELOPE_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: version,
                max_supported: CURRENT_ENVELOPE_VERSION,
            });
        }

        let length = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        let payload = &bytes[HEADER_LEN..];
        if payload.len() != length {
            return Err(PersistenceError::InvalidEnvelope {
                reason: format!(
                    "payload is {} bytes but the header says {length}",
                    payload.len()
                ),
            });
        }

        let mut json = Vec::new();
        GzDecoder::new(payload)
            .read_to_end(&mut json)
            .map_err(|e| PersistenceError::Compression {
                operation: "decompress",
                source: e,
            })?;
        let envelope: Self =
            serde_json::from_slice(&json).map_err(|e| PersistenceError::Deserialization {
                source: Box::new(e),
            })?;

        tracing::debug!(chip = %envelope.chip, "Unpacked envelope");
        Ok(envelope)
    }

    /// Envelope bytes as prefixed hex text.
    pub fn to_armored(&self) -> Result<String> {
        Ok(format!("{ARMOR_PREFIX}{}", hex::encode(self.to_bytes()?)))
    }

    /// Read prefixed hex text, tolerating surrounding whitespace.
    pub fn from_armored(text: &str) -> Result<Self> {
        let encoded = text
            .trim()
            .strip_prefix(ARMOR_PREFIX)
            .ok_or_else(|| PersistenceError::InvalidEnvelope {
                reason: format!("missing '{ARMOR_PREFIX}' prefix"),
            })?;
        let bytes = hex::decode(encoded).map_err(|e| PersistenceError::InvalidEnvelope {
            reason: e.to_string(),
        })?;
        Self::from_bytes(&bytes)
    }
}
