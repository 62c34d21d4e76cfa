//! Power level table decode and generation.
//!
//! Decoding is a single forward pass: table blocks go to the bin list, every
//! other line goes to a new output list, and the position of the first block
//! in that list is kept as the insertion anchor. Generating the table and
//! splicing it back at the anchor is the exact inverse.

use std::ops::Range;
use std::sync::Arc;

use pts_chip::{ChipProfile, LayoutStrategy};

use crate::block::{decode_bin, encode_bin, find_block_end};
use crate::error::{DecodeError, EncodeError, Result};
use crate::model::Bin;

/// Where a generated block goes back into the remaining source lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TableAnchor {
    /// Index in the remaining lines at which generated lines are inserted.
    pub offset: usize,
    /// Leading whitespace of the first removed line.
    pub indent: String,
}

/// Result of pulling the power level table out of a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTable {
    /// Source lines with every table block removed.
    pub lines: Vec<String>,
    pub bins: Vec<Bin>,
    pub anchor: TableAnchor,
    /// Source line ranges consumed by table blocks.
    pub consumed: Vec<Range<usize>>,
}

/// Decode the block opened at `start` into a bin.
///
/// Returns the bin and the line range it occupied.
pub fn decode_block(lines: &[String], start: usize, position: usize) -> Result<(Bin, Range<usize>)> {
    let end = find_block_end(lines, start)?;
    let bin = decode_bin(&lines[start..=end], position, start)?;
    Ok((bin, start..end + 1))
}

/// Remove every table block recognised by the profile's layout.
pub fn decode_table(lines: &[String], profile: &ChipProfile) -> Result<DecodedTable> {
    let strategy = profile.strategy();
    let mut output = Vec::with_capacity(lines.len());
    let mut bins = Vec::new();
    let mut consumed = Vec::new();
    let mut anchor: Option<TableAnchor> = None;

    let mut index = 0;
    while index < lines.len() {
        let line = &lines[index];
        if !strategy.is_table_start(line.trim()) {
            output.push(line.clone());
            index += 1;
            continue;
        }

        let (bin, range) = decode_block(lines, index, bins.len())?;
        tracing::debug!(
            bin = bin.id,
            levels = bin.levels.len(),
            start = range.start,
            end = range.end,
            "Decoded bin block"
        );
        if anchor.is_none() {
            anchor = Some(TableAnchor {
                offset: output.len(),
                indent: leading_whitespace(line).to_string(),
            });
        }
        bins.push(bin);
        index = range.end;
        consumed.push(range);
    }

    let anchor = anchor.ok_or(DecodeError::TableNotFound { chip: profile.key })?;
    Ok(DecodedTable {
        lines: output,
        bins,
        anchor,
        consumed,
    })
}

/// Generate table lines for the bins the layout emits.
pub fn generate_table(bins: &[Arc<Bin>], strategy: &dyn LayoutStrategy, indent: &str) -> Vec<String> {
    let mut output = Vec::new();
    for bin in bins.iter().take(strategy.emitted_bins(bins.len())) {
        encode_bin(bin, strategy, indent, &mut output);
    }
    output
}

/// Splice generated lines into `lines` at `offset`.
pub fn insert_lines(
    mut lines: Vec<String>,
    offset: usize,
    generated: Vec<String>,
) -> std::result::Result<Vec<String>, EncodeError> {
    if offset > lines.len() {
        return Err(EncodeError::OffsetOutOfRange {
            offset,
            len: lines.len(),
        });
    }
    lines.splice(offset..offset, generated);
    Ok(lines)
}

pub(crate) fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}
