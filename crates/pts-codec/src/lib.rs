//! Decoder and encoder for GPU power level tables in device tree source.
//!
//! This crate provides:
//!
//! - **Document codec** that removes the power level table (and the voltage
//!   operating point table, for chips that have one) from a source and puts
//!   regenerated text back at the same place ([`Document`])
//! - **Bin/level tree** with `Arc` sharing for cheap snapshots ([`Bin`],
//!   [`Level`])
//! - **Property line codec** that rewrites numbers in their original form
//!   ([`PropertyLine`])
//!
//! Decoding is strict: a structurally broken table fails with the offending
//! line instead of being repaired.
//!
//! # Example
//!
//! ```
//! use pts_chip::catalog;
//! use pts_codec::Document;
//!
//! let source = "\tqcom,gpu-pwrlevels {\n\
//!               \t\tqcom,gpu-pwrlevel@0 {\n\
//!               \t\t\treg = <0x00>;\n\
//!               \t\t\tqcom,gpu-freq = <0x2faf0800>;\n\
//!               \t\t};\n\
//!               \t};";
//! let profile = catalog::find("sun").unwrap();
//! let document = Document::decode(source, profile).unwrap();
//!
//! assert_eq!(document.bins[0].levels[0].frequency(), Some(800_000_000));
//! assert_eq!(document.encode(profile).unwrap(), source);
//! ```

mod block;
pub mod document;
pub mod error;
pub mod model;
pub mod property;
pub mod table;
pub mod voltage;

pub use document::{Document, decode_table_text, decode_voltage_text};
pub use error::{DecodeError, EncodeError, PropertyError, Result};
pub use model::{Bin, Level, keys};
pub use property::{NumberForm, PropertyLine, find_value, parse_number, replace_value};
pub use table::{DecodedTable, TableAnchor, decode_block, decode_table, generate_table, insert_lines};
pub use voltage::{
    DecodedVoltage, VoltageOpPoint, VoltageTable, decode_points, decode_voltage_table,
    generate_voltage_table,
};
