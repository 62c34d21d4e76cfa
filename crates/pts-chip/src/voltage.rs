//! Voltage level labels.
//!
//! GPU levels reference regulator corners by number rather than by voltage.
//! Newer chip generations expose more corners, so the tables are layered:
//! standard, then extended, then full, then full-extended. A lookup walks the
//! layers in that order and the first match wins. The numbers themselves are
//! vendor data and are taken as given.

use serde::{Deserialize, Serialize};

/// A regulator corner and its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoltageLevel {
    pub value: u32,
    pub label: &'static str,
}

const fn level(value: u32, label: &'static str) -> VoltageLevel {
    VoltageLevel { value, label }
}

const STANDARD: &[VoltageLevel] = &[
    level(16, "RETENTION"),
    level(48, "MIN_SVS"),
    level(64, "LOW_SVS"),
    level(128, "SVS"),
    level(192, "SVS_L1"),
    level(256, "NOM"),
    level(320, "NOM_L1"),
    level(336, "NOM_L2"),
    level(384, "TURBO"),
    level(416, "TURBO_L1"),
];

const EXTENDED: &[VoltageLevel] = &[
    level(80, "LOW_SVS_L1"),
    level(144, "SVS_L0"),
    level(224, "SVS_L2"),
    level(432, "TURBO_L2"),
];

const FULL: &[VoltageLevel] = &[
    level(52, "LOW_SVS_D2"),
    level(56, "LOW_SVS_D1"),
    level(60, "LOW_SVS_D0"),
    level(72, "LOW_SVS_P1"),
    level(96, "LOW_SVS_L2"),
    level(288, "NOM_L0"),
    level(448, "TURBO_L3"),
];

const FULL_EXTENDED: &[VoltageLevel] = &[
    level(452, "TURBO_L4"),
    level(456, "TURBO_L5"),
    level(464, "SUPER_TURBO"),
    level(480, "SUPER_TURBO_NO_CPR"),
];

static LAYERS: [&[VoltageLevel]; 4] = [STANDARD, EXTENDED, FULL, FULL_EXTENDED];

/// Which label layers a chip generation understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoltageLevelSet {
    Standard,
    Extended,
    Full,
    FullExtended,
}

impl VoltageLevelSet {
    /// Label layers in precedence order.
    pub fn layers(self) -> &'static [&'static [VoltageLevel]] {
        match self {
            VoltageLevelSet::Standard => &LAYERS[..1],
            VoltageLevelSet::Extended => &LAYERS[..2],
            VoltageLevelSet::Full => &LAYERS[..3],
            VoltageLevelSet::FullExtended => &LAYERS[..4],
        }
    }

    /// Label for a corner value, first match across layers.
    pub fn label(self, value: u32) -> Option<&'static str> {
        self.layers()
            .iter()
            .flat_map(|layer| layer.iter())
            .find(|level| level.value == value)
            .map(|level| level.label)
    }

    /// Corner value for a label, first match across layers.
    pub fn value(self, label: &str) -> Option<u32> {
        self.layers()
            .iter()
            .flat_map(|layer| layer.iter())
            .find(|level| level.label.eq_ignore_ascii_case(label))
            .map(|level| level.value)
    }

    /// All levels sorted by value, for pickers and listings.
    pub fn levels(self) -> Vec<VoltageLevel> {
        let mut all: Vec<VoltageLevel> = Vec::new();
        for level in self.layers().iter().flat_map(|layer| layer.iter()) {
            if !all.iter().any(|known| known.value == level.value) {
                all.push(*level);
            }
        }
        all.sort_by_key(|level| level.value);
        all
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoltageLevelSet::Standard => "standard",
            VoltageLevelSet::Extended => "extended",
            VoltageLevelSet::Full => "full",
            VoltageLevelSet::FullExtended => "full-extended",
        }
    }
}
