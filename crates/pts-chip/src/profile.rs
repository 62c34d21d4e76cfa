//! Chip profile definition.

use crate::error::{ChipError, Result};
use crate::layout::{LayoutKind, LayoutStrategy};
use crate::voltage::{VoltageLevel, VoltageLevelSet};

/// Suffix carried by the single-bin variant of a chip.
const SINGLE_BIN_SUFFIX: &str = "_singlebin";

/// Keys that name the same silicon under a different revision or bin.
const ALIASES: &[(&str, &str)] = &[
    ("lito_v1", "lito"),
    ("lito_v2", "lito"),
    ("kalama_sg", "kalama"),
    ("cliffs_7", "cliffs"),
];

/// Static description of one supported GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipProfile {
    /// Catalog key, e.g. `kona` or `waipio_singleBin`.
    pub key: &'static str,
    /// Marketing name for display.
    pub name: &'static str,
    /// Highest number of levels one bin may hold.
    pub max_levels: usize,
    /// The chip has an opp table that must be left alone.
    pub ignore_volt_table: bool,
    /// Trailing levels kept below newly added bottom levels.
    pub min_level_offset: usize,
    /// Label of the top-level voltage table node, if the chip has one.
    pub volt_table_pattern: Option<&'static str>,
    /// How bins are laid out in text.
    pub layout: LayoutKind,
    /// Regulator corner labels this generation knows.
    pub voltage_levels: VoltageLevelSet,
    /// Bins carry a secondary target level header next to the initial one.
    pub tracks_target_level: bool,
    /// Compatible-string fragments that identify the chip in a decoded source.
    pub compatible: &'static [&'static str],
}

impl ChipProfile {
    /// Layout strategy bound to this profile.
    pub fn strategy(&self) -> &'static dyn LayoutStrategy {
        self.layout.strategy()
    }

    /// Voltage table label when the voltage codec should run.
    pub fn voltage_table_label(&self) -> Option<&'static str> {
        if self.ignore_volt_table {
            None
        } else {
            self.volt_table_pattern
        }
    }

    /// Label for a regulator corner.
    pub fn voltage_label(&self, value: u32) -> Option<&'static str> {
        self.voltage_levels.label(value)
    }

    /// Label for a corner, or a `LEVEL_<n>` placeholder when unknown.
    pub fn voltage_label_or_placeholder(&self, value: u32) -> String {
        match self.voltage_label(value) {
            Some(label) => label.to_string(),
            None => {
                tracing::warn!(chip = self.key, value, "Voltage level has no known label");
                format!("LEVEL_{value}")
            }
        }
    }

    /// Corner value for a label.
    pub fn voltage_value(&self, label: &str) -> Result<u32> {
        self.voltage_levels
            .value(label)
            .ok_or_else(|| ChipError::UnknownVoltageLabel {
                chip: self.key,
                label: label.to_string(),
            })
    }

    /// Ordered voltage lookup table.
    pub fn voltage_table(&self) -> Vec<VoltageLevel> {
        self.voltage_levels.levels()
    }

    /// Normalized identity used for equivalence checks.
    pub fn identity(&self) -> String {
        normalize_identity(self.key)
    }

    /// Whether data made for `other` may be loaded into this profile.
    pub fn is_equivalent(&self, other: &str) -> bool {
        self.identity() == normalize_identity(other)
    }
}

impl std::fmt::Display for ChipProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.key)
    }
}

/// Strip the single-bin suffix and resolve known aliases.
pub fn normalize_identity(key: &str) -> String {
    let lower = key.trim().to_ascii_lowercase();
    let base = lower.strip_suffix(SINGLE_BIN_SUFFIX).unwrap_or(&lower);
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == base)
        .map_or(base, |(_, canonical)| *canonical)
        .to_string()
}
