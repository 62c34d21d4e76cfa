//! A decoded source file.

use std::sync::Arc;

use pts_chip::ChipProfile;

use crate::error::{EncodeError, Result};
use crate::model::Bin;
use crate::table::{TableAnchor, decode_table, generate_table, insert_lines};
use crate::voltage::{
    VoltageOpPoint, VoltageTable, decode_points, decode_voltage_table, generate_voltage_table,
};

/// A device tree source split into its editable tables and everything else.
///
/// `lines` holds the source with both tables removed and is shared, never
/// mutated, by every clone. Cloning a document is therefore cheap and is what
/// the editor uses as an undo snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Document {
    pub lines: Arc<[String]>,
    pub bins: Vec<Arc<Bin>>,
    pub table: TableAnchor,
    pub voltage: Option<VoltageTable>,
    pub trailing_newline: bool,
}

impl Document {
    /// Decode a source for the given chip.
    ///
    /// The power level table is removed first; the voltage table, when the
    /// profile has one, is then removed from what remains. Error line numbers
    /// always refer to `text`.
    pub fn decode(text: &str, profile: &ChipProfile) -> Result<Self> {
        let source: Vec<String> = text.lines().map(str::to_string).collect();
        let decoded = decode_table(&source, profile)?;

        let (lines, voltage) = match profile.voltage_table_label() {
            Some(label) => {
                let origins: Vec<usize> = (0..source.len())
                    .filter(|index| !decoded.consumed.iter().any(|range| range.contains(index)))
                    .collect();
                match decode_voltage_table(&decoded.lines, label)
                    .map_err(|error| error.relocate(|line| origins.get(line).copied().unwrap_or(line)))?
                {
                    Some(voltage) => (voltage.lines, Some(voltage.table)),
                    None => (decoded.lines, None),
                }
            }
            None => (decoded.lines, None),
        };

        tracing::debug!(
            chip = profile.key,
            bins = decoded.bins.len(),
            voltage_points = voltage.as_ref().map_or(0, |table| table.points.len()),
            "Decoded document"
        );
        Ok(Self {
            lines: lines.into(),
            bins: decoded.bins.into_iter().map(Arc::new).collect(),
            table: decoded.anchor,
            voltage,
            trailing_newline: text.ends_with('\n'),
        })
    }

    /// Regenerate the full source text.
    pub fn encode(&self, profile: &ChipProfile) -> std::result::Result<String, EncodeError> {
        let mut text = self.encode_lines(profile)?.join("\n");
        if self.trailing_newline {
            text.push('\n');
        }
        Ok(text)
    }

    /// Regenerate the source as lines: voltage table first, then the power
    /// level table, undoing the decode order.
    pub fn encode_lines(&self, profile: &ChipProfile) -> std::result::Result<Vec<String>, EncodeError> {
        let mut lines = self.lines.to_vec();
        if let Some(voltage) = &self.voltage {
            let generated = generate_voltage_table(&voltage.points, &voltage.anchor.indent);
            lines = insert_lines(lines, voltage.anchor.offset, generated)?;
        }
        let generated = generate_table(&self.bins, profile.strategy(), &self.table.indent);
        insert_lines(lines, self.table.offset, generated)
    }

    /// The power level table alone, unindented.
    pub fn table_text(&self, profile: &ChipProfile) -> String {
        generate_table(&self.bins, profile.strategy(), "").join("\n")
    }

    /// The voltage operating points alone, unindented.
    pub fn voltage_text(&self) -> Option<String> {
        self.voltage
            .as_ref()
            .map(|voltage| generate_voltage_table(&voltage.points, "").join("\n"))
    }

    /// Mutable access to a bin, cloning it first if a snapshot shares it.
    pub fn bin_mut(&mut self, index: usize) -> Option<&mut Bin> {
        self.bins.get_mut(index).map(Arc::make_mut)
    }

    /// Total level count over all bins.
    pub fn level_count(&self) -> usize {
        self.bins.iter().map(|bin| bin.levels.len()).sum()
    }
}

/// Decode bins from standalone table text such as [`Document::table_text`].
pub fn decode_table_text(text: &str, profile: &ChipProfile) -> Result<Vec<Bin>> {
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    Ok(decode_table(&lines, profile)?.bins)
}

/// Decode operating points from standalone text such as
/// [`Document::voltage_text`].
pub fn decode_voltage_text(text: &str) -> Result<Vec<VoltageOpPoint>> {
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    decode_points(&lines)
}
