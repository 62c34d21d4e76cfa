//! Voltage operating-point table codec.
//!
//! Chips with a voltage table label keep a container node such as
//! `gpu_opp_table_v2: gpu-opp-table_v2 { ... }` holding `opp-<hz> { ... }`
//! entries. The entries are pulled out into [`VoltageOpPoint`]s and later
//! regenerated in a fixed form at the same place, following the same
//! remove-then-insert discipline as the power level table.

use std::ops::Range;

use crate::block::find_block_end;
use crate::error::{DecodeError, Result};
use crate::model::keys;
use crate::property::{parse_cells, property_key};
use crate::table::{TableAnchor, leading_whitespace};

/// One frequency/voltage pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoltageOpPoint {
    /// Frequency in Hz.
    pub frequency: u64,
    pub microvolt: u64,
}

/// Decoded voltage table and where to write it back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VoltageTable {
    /// Entries in source order.
    pub points: Vec<VoltageOpPoint>,
    pub anchor: TableAnchor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedVoltage {
    /// Input lines with every operating point block removed.
    pub lines: Vec<String>,
    pub table: VoltageTable,
    pub consumed: Vec<Range<usize>>,
}

/// Whether a trimmed line opens an operating point block.
pub fn is_op_point_start(line: &str) -> bool {
    line.starts_with(keys::OPP_PREFIX) && line.ends_with('{')
}

/// Pull the operating points out of the container whose declaration
/// contains `label`.
///
/// Returns `Ok(None)` when no such container exists.
pub fn decode_voltage_table(lines: &[String], label: &str) -> Result<Option<DecodedVoltage>> {
    let Some(container) = lines.iter().position(|line| {
        let trimmed = line.trim();
        trimmed.contains(label) && trimmed.ends_with('{')
    }) else {
        tracing::warn!(label, "Voltage table container not found");
        return Ok(None);
    };
    let container_end = find_block_end(lines, container)?;

    let mut output: Vec<String> = lines[..=container].to_vec();
    let mut points = Vec::new();
    let mut consumed = Vec::new();
    let mut anchor: Option<TableAnchor> = None;

    let mut index = container + 1;
    while index < container_end {
        let line = &lines[index];
        if !is_op_point_start(line.trim()) {
            output.push(line.clone());
            index += 1;
            continue;
        }

        let end = find_block_end(lines, index)?;
        points.push(decode_point(lines, index, end)?);
        if anchor.is_none() {
            anchor = Some(TableAnchor {
                offset: output.len(),
                indent: leading_whitespace(line).to_string(),
            });
        }
        consumed.push(index..end + 1);
        index = end + 1;
    }
    output.extend(lines[container_end..].iter().cloned());

    let anchor = anchor.unwrap_or_else(|| TableAnchor {
        offset: container + 1,
        indent: format!("{}\t", leading_whitespace(&lines[container])),
    });
    tracing::debug!(label, points = points.len(), "Decoded voltage table");

    Ok(Some(DecodedVoltage {
        lines: output,
        table: VoltageTable { points, anchor },
        consumed,
    }))
}

/// Decode every operating point block in `lines`, ignoring anything else.
pub fn decode_points(lines: &[String]) -> Result<Vec<VoltageOpPoint>> {
    let mut points = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        if is_op_point_start(lines[index].trim()) {
            let end = find_block_end(lines, index)?;
            points.push(decode_point(lines, index, end)?);
            index = end + 1;
        } else {
            index += 1;
        }
    }
    Ok(points)
}

/// Regenerate operating point blocks.
pub fn generate_voltage_table(points: &[VoltageOpPoint], indent: &str) -> Vec<String> {
    let mut output = Vec::with_capacity(points.len() * 4);
    for point in points {
        output.push(format!("{indent}{}{} {{", keys::OPP_PREFIX, point.frequency));
        output.push(format!(
            "{indent}\t{} = /bits/ 64 <0x{:x}>;",
            keys::OPP_HZ,
            point.frequency
        ));
        output.push(format!(
            "{indent}\t{} = <{}>;",
            keys::OPP_MICROVOLT,
            point.microvolt
        ));
        output.push(format!("{indent}}};"));
    }
    output
}

fn decode_point(lines: &[String], start: usize, end: usize) -> Result<VoltageOpPoint> {
    let mut frequency = None;
    let mut microvolt = None;

    for (index, line) in lines.iter().enumerate().take(end).skip(start + 1) {
        let invalid = || DecodeError::InvalidNumber {
            line: index,
            text: line.trim().to_string(),
        };
        let Some(key) = property_key(line) else {
            continue;
        };
        let value = line.split_once('=').map_or("", |(_, value)| value);

        if key == keys::OPP_HZ {
            let cells = parse_cells(value).map_err(|_| invalid())?;
            frequency = Some(match cells.as_slice() {
                [single] => *single,
                [high, low] => (high << 32) | low,
                _ => return Err(invalid()),
            });
        } else if key == keys::OPP_MICROVOLT {
            let cells = parse_cells(value).map_err(|_| invalid())?;
            let first = cells.first().ok_or_else(invalid)?;
            microvolt = Some(*first);
        }
    }

    let missing = |key: &'static str| DecodeError::MissingProperty {
        line: start,
        key,
        text: lines[start].trim().to_string(),
    };
    Ok(VoltageOpPoint {
        frequency: frequency.ok_or_else(|| missing(keys::OPP_HZ))?,
        microvolt: microvolt.ok_or_else(|| missing(keys::OPP_MICROVOLT))?,
    })
}
