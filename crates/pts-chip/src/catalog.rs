//! The fixed catalog of supported chips.

use crate::error::{ChipError, Result};
use crate::layout::{BINS_ENUMERATION_MARKER, LayoutKind};
use crate::profile::ChipProfile;
use crate::voltage::VoltageLevelSet;

/// Every chip the editor knows, in display order.
pub static CATALOG: &[ChipProfile] = &[
    ChipProfile {
        key: "msmnile",
        name: "Snapdragon 855",
        max_levels: 11,
        ignore_volt_table: false,
        min_level_offset: 1,
        volt_table_pattern: Some("gpu_opp_table_v2"),
        layout: LayoutKind::MultiBin,
        voltage_levels: VoltageLevelSet::Standard,
        tracks_target_level: false,
        compatible: &["qcom,msmnile", "qcom,sm8150"],
    },
    ChipProfile {
        key: "msmnile_singleBin",
        name: "Snapdragon 855",
        max_levels: 11,
        ignore_volt_table: false,
        min_level_offset: 1,
        volt_table_pattern: Some("gpu_opp_table_v2"),
        layout: LayoutKind::SingleBin,
        voltage_levels: VoltageLevelSet::Standard,
        tracks_target_level: false,
        compatible: &["qcom,msmnile", "qcom,sm8150"],
    },
    ChipProfile {
        key: "kona",
        name: "Snapdragon 865",
        max_levels: 11,
        ignore_volt_table: false,
        min_level_offset: 1,
        volt_table_pattern: Some("gpu_opp_table_v2"),
        layout: LayoutKind::MultiBin,
        voltage_levels: VoltageLevelSet::Standard,
        tracks_target_level: true,
        compatible: &["qcom,kona", "qcom,sm8250"],
    },
    ChipProfile {
        key: "kona_singleBin",
        name: "Snapdragon 865",
        max_levels: 11,
        ignore_volt_table: false,
        min_level_offset: 1,
        volt_table_pattern: Some("gpu_opp_table_v2"),
        layout: LayoutKind::SingleBin,
        voltage_levels: VoltageLevelSet::Standard,
        tracks_target_level: true,
        compatible: &["qcom,kona", "qcom,sm8250"],
    },
    ChipProfile {
        key: "lito_v1",
        name: "Snapdragon 765",
        max_levels: 10,
        ignore_volt_table: false,
        min_level_offset: 1,
        volt_table_pattern: Some("gpu_opp_table"),
        layout: LayoutKind::MultiBin,
        voltage_levels: VoltageLevelSet::Standard,
        tracks_target_level: false,
        compatible: &["qcom,lito"],
    },
    ChipProfile {
        key: "lito_v2",
        name: "Snapdragon 765 v2",
        max_levels: 10,
        ignore_volt_table: false,
        min_level_offset: 1,
        volt_table_pattern: Some("gpu_opp_table"),
        layout: LayoutKind::MultiBin,
        voltage_levels: VoltageLevelSet::Standard,
        tracks_target_level: false,
        compatible: &["qcom,lito-v2"],
    },
    ChipProfile {
        key: "lagoon",
        name: "Snapdragon 690",
        max_levels: 10,
        ignore_volt_table: false,
        min_level_offset: 1,
        volt_table_pattern: Some("gpu_opp_table"),
        layout: LayoutKind::MultiBin,
        voltage_levels: VoltageLevelSet::Standard,
        tracks_target_level: false,
        compatible: &["qcom,lagoon"],
    },
    ChipProfile {
        key: "lahaina",
        name: "Snapdragon 888",
        max_levels: 11,
        ignore_volt_table: true,
        min_level_offset: 1,
        volt_table_pattern: None,
        layout: LayoutKind::MultiBin,
        voltage_levels: VoltageLevelSet::Extended,
        tracks_target_level: true,
        compatible: &["qcom,lahaina", "qcom,sm8350"],
    },
    ChipProfile {
        key: "lahaina_singleBin",
        name: "Snapdragon 888",
        max_levels: 11,
        ignore_volt_table: true,
        min_level_offset: 1,
        volt_table_pattern: None,
        layout: LayoutKind::SingleBin,
        voltage_levels: VoltageLevelSet::Extended,
        tracks_target_level: true,
        compatible: &["qcom,lahaina", "qcom,sm8350"],
    },
    ChipProfile {
        key: "shima",
        name: "Snapdragon 780G",
        max_levels: 11,
        ignore_volt_table: true,
        min_level_offset: 1,
        volt_table_pattern: None,
        layout: LayoutKind::MultiBin,
        voltage_levels: VoltageLevelSet::Extended,
        tracks_target_level: false,
        compatible: &["qcom,shima"],
    },
    ChipProfile {
        key: "yupik",
        name: "Snapdragon 778G",
        max_levels: 11,
        ignore_volt_table: true,
        min_level_offset: 1,
        volt_table_pattern: None,
        layout: LayoutKind::MultiBin,
        voltage_levels: VoltageLevelSet::Extended,
        tracks_target_level: false,
        compatible: &["qcom,yupik"],
    },
    ChipProfile {
        key: "waipio_singleBin",
        name: "Snapdragon 8 Gen 1",
        max_levels: 12,
        ignore_volt_table: true,
        min_level_offset: 1,
        volt_table_pattern: None,
        layout: LayoutKind::SingleBin,
        voltage_levels: VoltageLevelSet::Full,
        tracks_target_level: false,
        compatible: &["qcom,waipio"],
    },
    ChipProfile {
        key: "cape_singleBin",
        name: "Snapdragon 8+ Gen 1",
        max_levels: 12,
        ignore_volt_table: true,
        min_level_offset: 1,
        volt_table_pattern: None,
        layout: LayoutKind::SingleBin,
        voltage_levels: VoltageLevelSet::Full,
        tracks_target_level: false,
        compatible: &["qcom,cape"],
    },
    ChipProfile {
        key: "ukee_singleBin",
        name: "Snapdragon 7+ Gen 2",
        max_levels: 12,
        ignore_volt_table: true,
        min_level_offset: 1,
        volt_table_pattern: None,
        layout: LayoutKind::SingleBin,
        voltage_levels: VoltageLevelSet::Full,
        tracks_target_level: false,
        compatible: &["qcom,ukee"],
    },
    ChipProfile {
        key: "kalama",
        name: "Snapdragon 8 Gen 2",
        max_levels: 16,
        ignore_volt_table: true,
        min_level_offset: 1,
        volt_table_pattern: None,
        layout: LayoutKind::MultiBin,
        voltage_levels: VoltageLevelSet::Full,
        tracks_target_level: false,
        compatible: &["qcom,kalama"],
    },
    ChipProfile {
        key: "kalama_sg_singleBin",
        name: "Snapdragon G3x Gen 2",
        max_levels: 16,
        ignore_volt_table: true,
        min_level_offset: 1,
        volt_table_pattern: None,
        layout: LayoutKind::SingleBin,
        voltage_levels: VoltageLevelSet::Full,
        tracks_target_level: false,
        compatible: &["qcom,kalamap-sg"],
    },
    ChipProfile {
        key: "pineapple",
        name: "Snapdragon 8 Gen 3",
        max_levels: 16,
        ignore_volt_table: true,
        min_level_offset: 1,
        volt_table_pattern: None,
        layout: LayoutKind::MultiBin,
        voltage_levels: VoltageLevelSet::FullExtended,
        tracks_target_level: false,
        compatible: &["qcom,pineapple"],
    },
    ChipProfile {
        key: "cliffs_singleBin",
        name: "Snapdragon 8s Gen 3",
        max_levels: 16,
        ignore_volt_table: true,
        min_level_offset: 1,
        volt_table_pattern: None,
        layout: LayoutKind::SingleBin,
        voltage_levels: VoltageLevelSet::FullExtended,
        tracks_target_level: false,
        compatible: &["qcom,cliffs"],
    },
    ChipProfile {
        key: "cliffs_7_singleBin",
        name: "Snapdragon 7+ Gen 3",
        max_levels: 16,
        ignore_volt_table: true,
        min_level_offset: 1,
        volt_table_pattern: None,
        layout: LayoutKind::SingleBin,
        voltage_levels: VoltageLevelSet::FullExtended,
        tracks_target_level: false,
        compatible: &["qcom,cliffs7"],
    },
    ChipProfile {
        key: "sun",
        name: "Snapdragon 8 Elite",
        max_levels: 16,
        ignore_volt_table: true,
        min_level_offset: 0,
        volt_table_pattern: None,
        layout: LayoutKind::SingleBin,
        voltage_levels: VoltageLevelSet::FullExtended,
        tracks_target_level: false,
        compatible: &["qcom,sun"],
    },
];

/// Look up a profile by key, ignoring ASCII case.
pub fn find(key: &str) -> Result<&'static ChipProfile> {
    let key = key.trim();
    CATALOG
        .iter()
        .find(|profile| profile.key.eq_ignore_ascii_case(key))
        .ok_or_else(|| ChipError::UnknownProfile {
            key: key.to_string(),
        })
}

/// Profiles that plausibly describe a decoded device tree source.
///
/// A profile matches when one of its compatible fragments appears in the
/// text and its layout finds a table start line. When the source enumerates
/// bins, multi-bin profiles are listed first.
pub fn detect(text: &str) -> Vec<&'static ChipProfile> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let enumerates_bins = lines
        .iter()
        .any(|line| line.contains(BINS_ENUMERATION_MARKER) && line.ends_with('{'));

    let mut matches: Vec<&'static ChipProfile> = CATALOG
        .iter()
        .filter(|profile| {
            profile
                .compatible
                .iter()
                .any(|marker| text.contains(&format!("\"{marker}\"")))
        })
        .filter(|profile| {
            let strategy = profile.strategy();
            lines.iter().any(|line| strategy.is_table_start(line))
        })
        .collect();

    matches.sort_by_key(|profile| match (profile.layout, enumerates_bins) {
        (LayoutKind::MultiBin, true) | (LayoutKind::SingleBin, false) => 0,
        _ => 1,
    });
    tracing::debug!(
        candidates = matches.len(),
        "Detected chip profiles from source"
    );
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<String> = CATALOG
            .iter()
            .map(|p| p.key.to_ascii_lowercase())
            .collect();
        assert_eq!(keys.len(), CATALOG.len());
    }

    #[test]
    fn test_catalog_invariants() {
        for profile in CATALOG {
            assert!(profile.max_levels > profile.min_level_offset, "{}", profile.key);
            if profile.key.ends_with("_singleBin") {
                assert_eq!(profile.layout, LayoutKind::SingleBin, "{}", profile.key);
            }
            if !profile.ignore_volt_table {
                assert!(profile.volt_table_pattern.is_some(), "{}", profile.key);
            }
        }
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("KONA").unwrap().key, "kona");
        assert_eq!(find("waipio_singlebin").unwrap().key, "waipio_singleBin");
        assert_eq!(
            find("exynos"),
            Err(ChipError::UnknownProfile {
                key: "exynos".to_string()
            })
        );
    }

    #[test]
    fn test_detect_multi_bin_source() {
        let source = "\
/ {
\tcompatible = \"qcom,kona\";
\tqcom,gpu-pwrlevel-bins {
\t\tqcom,gpu-pwrlevels-0 {
\t\t};
\t};
};";
        let found: Vec<&str> = detect(source).iter().map(|p| p.key).collect();
        assert_eq!(found, vec!["kona"]);
    }

    #[test]
    fn test_detect_single_bin_source() {
        let source = "\
/ {
\tcompatible = \"qcom,waipio\";
\tqcom,gpu-pwrlevels {
\t};
};";
        let found: Vec<&str> = detect(source).iter().map(|p| p.key).collect();
        assert_eq!(found, vec!["waipio_singleBin"]);
    }

    #[test]
    fn test_detect_nothing() {
        assert!(detect("/ { model = \"test\"; };").is_empty());
    }
}
