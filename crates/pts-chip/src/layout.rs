//! Table layout strategies.
//!
//! Chips either spread their power levels over several bracketed
//! `qcom,gpu-pwrlevels-N` blocks (one per speed bin) or keep a single
//! unparameterized `qcom,gpu-pwrlevels` block. Both share the same block
//! codec; a strategy only decides which line opens a table block, how a bin
//! is declared on output, and how many bins are emitted.

use serde::{Deserialize, Serialize};

/// Keyword segment shared by every per-bin table declaration.
pub const MULTI_BIN_KEYWORD: &str = "qcom,gpu-pwrlevels-";

/// The one declaration line used by single-bin chips.
pub const SINGLE_BIN_DECLARATION: &str = "qcom,gpu-pwrlevels {";

/// Lines carrying a compatible string never open a table.
pub const COMPATIBLE_MARKER: &str = "compatible";

/// Container node that enumerates the bins, not a bin itself.
pub const BINS_ENUMERATION_MARKER: &str = "qcom,gpu-pwrlevel-bins";

/// Behavior that differs between table layouts.
pub trait LayoutStrategy: Send + Sync {
    /// Whether a trimmed source line opens a table block.
    fn is_table_start(&self, line: &str) -> bool;

    /// Opening declaration emitted for a bin, without indentation.
    fn bin_declaration(&self, bin_id: u32) -> String;

    /// How many of `decoded` bins are written back.
    fn emitted_bins(&self, decoded: usize) -> usize;
}

/// One independently bracketed block per bin.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiBinLayout;

impl LayoutStrategy for MultiBinLayout {
    fn is_table_start(&self, line: &str) -> bool {
        line.contains(MULTI_BIN_KEYWORD)
            && !line.contains(COMPATIBLE_MARKER)
            && !line.contains(BINS_ENUMERATION_MARKER)
    }

    fn bin_declaration(&self, bin_id: u32) -> String {
        format!("{MULTI_BIN_KEYWORD}{bin_id} {{")
    }

    fn emitted_bins(&self, decoded: usize) -> usize {
        decoded
    }
}

/// A single fixed table block.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleBinLayout;

impl LayoutStrategy for SingleBinLayout {
    fn is_table_start(&self, line: &str) -> bool {
        line == SINGLE_BIN_DECLARATION
    }

    fn bin_declaration(&self, _bin_id: u32) -> String {
        SINGLE_BIN_DECLARATION.to_string()
    }

    fn emitted_bins(&self, decoded: usize) -> usize {
        decoded.min(1)
    }
}

/// Layout variant bound to a chip profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    MultiBin,
    SingleBin,
}

impl LayoutKind {
    /// Strategy object implementing this layout.
    pub fn strategy(self) -> &'static dyn LayoutStrategy {
        match self {
            LayoutKind::MultiBin => &MultiBinLayout,
            LayoutKind::SingleBin => &SingleBinLayout,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKind::MultiBin => "multi-bin",
            LayoutKind::SingleBin => "single-bin",
        }
    }
}

impl std::fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_bin_start_predicate() {
        let layout = MultiBinLayout;
        assert!(layout.is_table_start("qcom,gpu-pwrlevels-0 {"));
        assert!(layout.is_table_start("qcom,gpu-pwrlevels-12 {"));
        assert!(!layout.is_table_start("qcom,gpu-pwrlevel-bins {"));
        assert!(!layout.is_table_start("compatible = \"qcom,gpu-pwrlevels-bins\";"));
        assert!(!layout.is_table_start("qcom,gpu-pwrlevels {"));
    }

    #[test]
    fn test_single_bin_start_predicate() {
        let layout = SingleBinLayout;
        assert!(layout.is_table_start("qcom,gpu-pwrlevels {"));
        assert!(!layout.is_table_start("qcom,gpu-pwrlevels-0 {"));
        assert!(!layout.is_table_start("qcom,gpu-pwrlevels{"));
    }

    #[test]
    fn test_declarations() {
        assert_eq!(
            LayoutKind::MultiBin.strategy().bin_declaration(3),
            "qcom,gpu-pwrlevels-3 {"
        );
        assert_eq!(
            LayoutKind::SingleBin.strategy().bin_declaration(3),
            "qcom,gpu-pwrlevels {"
        );
    }

    #[test]
    fn test_emitted_bins() {
        assert_eq!(MultiBinLayout.emitted_bins(3), 3);
        assert_eq!(SingleBinLayout.emitted_bins(3), 1);
        assert_eq!(SingleBinLayout.emitted_bins(0), 0);
    }
}
