//! Bin and level tree.
//!
//! Bins and levels sit behind `Arc` so snapshots of a table share every node
//! that an edit did not touch. Mutate through [`Arc::make_mut`].

use std::sync::Arc;

use crate::error::PropertyError;
use crate::property::{self, find_value, offset_value, replace_value};

/// Property keys used by the editor.
pub mod keys {
    pub const GPU_FREQ: &str = "qcom,gpu-freq";
    pub const BUS_FREQ: &str = "qcom,bus-freq";
    pub const BUS_MIN: &str = "qcom,bus-min";
    pub const BUS_MAX: &str = "qcom,bus-max";
    pub const LEVEL: &str = "qcom,level";
    pub const CX_LEVEL: &str = "qcom,cx-level";
    pub const INITIAL_LEVEL: &str = "qcom,initial-pwrlevel";
    pub const TARGET_LEVEL: &str = "qcom,ca-target-pwrlevel";
    pub const REG: &str = "reg";
    pub const LEVEL_NODE: &str = "qcom,gpu-pwrlevel";
    pub const OPP_PREFIX: &str = "opp-";
    pub const OPP_HZ: &str = "opp-hz";
    pub const OPP_MICROVOLT: &str = "opp-microvolt";
}

/// One GPU operating point inside a bin.
///
/// Lines are kept verbatim (trimmed); the node declaration and `reg` line are
/// regenerated on encode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Level {
    pub lines: Vec<String>,
}

impl Level {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn value(&self, key: &str) -> Option<u64> {
        find_value(&self.lines, key)
    }

    pub fn set_value(&mut self, key: &str, value: u64) -> Result<(), PropertyError> {
        replace_value(&mut self.lines, key, value)
    }

    /// GPU clock in Hz.
    pub fn frequency(&self) -> Option<u64> {
        self.value(keys::GPU_FREQ)
    }

    pub fn bus_freq(&self) -> Option<u64> {
        self.value(keys::BUS_FREQ)
    }

    pub fn bus_min(&self) -> Option<u64> {
        self.value(keys::BUS_MIN)
    }

    pub fn bus_max(&self) -> Option<u64> {
        self.value(keys::BUS_MAX)
    }

    /// Key holding the regulator corner: `qcom,level` or `qcom,cx-level`.
    pub fn voltage_key(&self) -> Option<&'static str> {
        [keys::LEVEL, keys::CX_LEVEL]
            .into_iter()
            .find(|key| self.value(key).is_some())
    }

    /// Regulator corner referenced by this level.
    pub fn voltage_level(&self) -> Option<u64> {
        self.voltage_key().and_then(|key| self.value(key))
    }
}

/// A speed bin: header statements plus its levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bin {
    pub id: u32,
    pub header: Vec<String>,
    pub levels: Vec<Arc<Level>>,
}

impl Bin {
    pub fn header_value(&self, key: &str) -> Option<u64> {
        find_value(&self.header, key)
    }

    pub fn set_header_value(&mut self, key: &str, value: u64) -> Result<(), PropertyError> {
        replace_value(&mut self.header, key, value)
    }

    /// Shift a numeric header field by `delta`, saturating at zero.
    ///
    /// Returns `Ok(None)` when the header has no such field.
    pub fn offset_header_value(
        &mut self,
        key: &str,
        delta: i64,
    ) -> Result<Option<u64>, PropertyError> {
        match offset_value(&mut self.header, key, delta) {
            Ok(value) => Ok(Some(value)),
            Err(PropertyError::KeyNotFound { .. }) => Ok(None),
            Err(PropertyError::Underflow { .. }) => {
                replace_value(&mut self.header, key, 0)?;
                Ok(Some(0))
            }
            Err(error) => Err(error),
        }
    }

    /// Mutable access to a level, cloning it first if a snapshot shares it.
    pub fn level_mut(&mut self, index: usize) -> Option<&mut Level> {
        self.levels.get_mut(index).map(Arc::make_mut)
    }
}

/// Whether a level's property line is the regenerated `reg` framing line.
pub(crate) fn is_framing_line(line: &str) -> bool {
    property::property_key(line) == Some(keys::REG)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(lines: &[&str]) -> Level {
        Level::new(lines.iter().map(|l| (*l).to_string()).collect())
    }

    #[test]
    fn test_level_accessors() {
        let level = level(&[
            "qcom,gpu-freq = <0x2faf0800>;",
            "qcom,bus-freq = <0x0b>;",
            "qcom,bus-min = <0x09>;",
            "qcom,bus-max = <0x0c>;",
            "qcom,cx-level = <0x180>;",
        ]);
        assert_eq!(level.frequency(), Some(800_000_000));
        assert_eq!(level.bus_freq(), Some(11));
        assert_eq!(level.bus_min(), Some(9));
        assert_eq!(level.bus_max(), Some(12));
        assert_eq!(level.voltage_key(), Some(keys::CX_LEVEL));
        assert_eq!(level.voltage_level(), Some(384));
    }

    #[test]
    fn test_offset_header_saturates() {
        let mut bin = Bin {
            id: 0,
            header: vec!["qcom,initial-pwrlevel = <0x00>;".to_string()],
            levels: Vec::new(),
        };
        assert_eq!(bin.offset_header_value(keys::INITIAL_LEVEL, -1), Ok(Some(0)));
        assert_eq!(bin.offset_header_value(keys::INITIAL_LEVEL, 2), Ok(Some(2)));
        assert_eq!(bin.header[0], "qcom,initial-pwrlevel = <0x02>;");
        assert_eq!(bin.offset_header_value(keys::TARGET_LEVEL, 1), Ok(None));
    }

    #[test]
    fn test_level_mut_copies_shared_level() {
        let shared = Arc::new(level(&["qcom,gpu-freq = <100>;"]));
        let mut bin = Bin {
            id: 0,
            header: Vec::new(),
            levels: vec![Arc::clone(&shared)],
        };

        bin.level_mut(0)
            .unwrap()
            .set_value(keys::GPU_FREQ, 200)
            .unwrap();

        assert_eq!(shared.frequency(), Some(100));
        assert_eq!(bin.levels[0].frequency(), Some(200));
    }
}
