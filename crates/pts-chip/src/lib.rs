//! GPU chip profiles for power table editing.
//!
//! This crate provides:
//!
//! - **Chip profiles** with per-chip limits and flags ([`ChipProfile`])
//! - **Layout strategies** that know how bins are delimited in text
//!   ([`LayoutKind`], [`LayoutStrategy`])
//! - **Voltage level labels** layered by chip generation ([`VoltageLevelSet`])
//! - **The fixed catalog** of supported chips ([`catalog`])
//!
//! # Example
//!
//! ```
//! use pts_chip::catalog;
//!
//! let kona = catalog::find("kona").unwrap();
//! assert!(kona.layout.strategy().is_table_start("qcom,gpu-pwrlevels-0 {"));
//! assert_eq!(kona.voltage_label(256), Some("NOM"));
//! ```

pub mod catalog;
pub mod error;
pub mod layout;
pub mod profile;
pub mod voltage;

pub use catalog::{CATALOG, detect, find};
pub use error::{ChipError, Result};
pub use layout::{
    BINS_ENUMERATION_MARKER, COMPATIBLE_MARKER, LayoutKind, LayoutStrategy, MULTI_BIN_KEYWORD,
    MultiBinLayout, SINGLE_BIN_DECLARATION, SingleBinLayout,
};
pub use profile::{ChipProfile, normalize_identity};
pub use voltage::{VoltageLevel, VoltageLevelSet};
