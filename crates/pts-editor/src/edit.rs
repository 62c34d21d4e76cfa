//! Table mutations.
//!
//! Every change the editor can make is an [`Edit`]. Applying one is a pure
//! in-memory rewrite of a [`Document`]; snapshotting, history and dirty
//! tracking happen in the session around it.

use std::fmt;
use std::sync::Arc;

use pts_chip::ChipProfile;
use pts_codec::{Bin, Document, VoltageOpPoint, keys};

use crate::error::{EditorError, Result};

/// One state-changing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Copy the first level and insert it at the top.
    AddLevelTop { bin: usize },
    /// Insert a copy above the profile's reserved trailing levels.
    AddLevelBottom { bin: usize },
    DuplicateLevel { bin: usize, level: usize },
    RemoveLevel { bin: usize, level: usize },
    MoveLevel { bin: usize, from: usize, to: usize },
    /// Rewrite a numeric property of a level, keeping its number form.
    SetLevelValue {
        bin: usize,
        level: usize,
        key: String,
        value: u64,
    },
    /// Replace a level's property line, or append one at `line == len`.
    SetLevelLine {
        bin: usize,
        level: usize,
        line: usize,
        text: String,
    },
    /// Point a level at a named regulator corner.
    SetVoltageLevel {
        bin: usize,
        level: usize,
        label: String,
    },
    SetHeaderValue { bin: usize, key: String, value: u64 },
    SetOpPoint { index: usize, point: VoltageOpPoint },
    /// Replace every bin, and the voltage points when given.
    ReplaceTables {
        bins: Vec<Bin>,
        voltage: Option<Vec<VoltageOpPoint>>,
    },
}

impl Edit {
    pub fn set_frequency(bin: usize, level: usize, hz: u64) -> Self {
        Edit::SetLevelValue {
            bin,
            level,
            key: keys::GPU_FREQ.to_string(),
            value: hz,
        }
    }

    /// Apply to `document`. On error the document may be partly changed, so
    /// callers apply to a copy.
    pub fn apply(&self, document: &mut Document, profile: &ChipProfile) -> Result<()> {
        match self {
            Edit::AddLevelTop { bin } => {
                let target = bin_mut(document, *bin)?;
                check_room(target, *bin, profile)?;
                let first = target
                    .levels
                    .first()
                    .cloned()
                    .ok_or(EditorError::EmptyBin { bin: *bin })?;
                target.levels.insert(0, first);
                shift_dependents(target, profile, 1)
            }
            Edit::AddLevelBottom { bin } => {
                let target = bin_mut(document, *bin)?;
                check_room(target, *bin, profile)?;
                if target.levels.is_empty() {
                    return Err(EditorError::EmptyBin { bin: *bin });
                }
                // Copies the lowest editable level; the reserved trailing levels stay last.
                let at = target.levels.len().saturating_sub(profile.min_level_offset);
                let copy = Arc::clone(&target.levels[at.saturating_sub(1)]);
                target.levels.insert(at, copy);
                shift_dependents(target, profile, 1)
            }
            Edit::DuplicateLevel { bin, level } => {
                let target = bin_mut(document, *bin)?;
                check_level(target, *bin, *level)?;
                check_room(target, *bin, profile)?;
                let copy = Arc::clone(&target.levels[*level]);
                target.levels.insert(level + 1, copy);
                shift_dependents(target, profile, 1)
            }
            Edit::RemoveLevel { bin, level } => {
                let target = bin_mut(document, *bin)?;
                check_level(target, *bin, *level)?;
                if target.levels.len() <= 1 {
                    return Err(EditorError::LastLevel { bin: *bin });
                }
                target.levels.remove(*level);
                shift_dependents(target, profile, -1)
            }
            Edit::MoveLevel { bin, from, to } => {
                let target = bin_mut(document, *bin)?;
                check_level(target, *bin, *from)?;
                check_level(target, *bin, *to)?;
                let moved = target.levels.remove(*from);
                target.levels.insert(*to, moved);
                Ok(())
            }
            Edit::SetLevelValue {
                bin,
                level,
                key,
                value,
            } => {
                level_mut(document, *bin, *level)?.set_value(key, *value)?;
                Ok(())
            }
            Edit::SetLevelLine {
                bin,
                level,
                line,
                text,
            } => {
                let lines = &mut level_mut(document, *bin, *level)?.lines;
                let text = text.trim().to_string();
                match lines.len() {
                    len if *line < len => lines[*line] = text,
                    len if *line == len => lines.push(text),
                    _ => {
                        return Err(EditorError::LineOutOfRange {
                            bin: *bin,
                            level: *level,
                            line: *line,
                        });
                    }
                }
                Ok(())
            }
            Edit::SetVoltageLevel { bin, level, label } => {
                let value = profile.voltage_value(label)?;
                let target = level_mut(document, *bin, *level)?;
                let key = target.voltage_key().ok_or(EditorError::NoVoltageKey {
                    bin: *bin,
                    level: *level,
                })?;
                target.set_value(key, u64::from(value))?;
                Ok(())
            }
            Edit::SetHeaderValue { bin, key, value } => {
                bin_mut(document, *bin)?.set_header_value(key, *value)?;
                Ok(())
            }
            Edit::SetOpPoint { index, point } => {
                let table = document
                    .voltage
                    .as_mut()
                    .ok_or(EditorError::NoVoltageTable)?;
                let count = table.points.len();
                let slot = table
                    .points
                    .get_mut(*index)
                    .ok_or(EditorError::OpPointOutOfRange {
                        index: *index,
                        count,
                    })?;
                *slot = *point;
                Ok(())
            }
            Edit::ReplaceTables { bins, voltage } => {
                document.bins = bins.iter().cloned().map(Arc::new).collect();
                if let Some(points) = voltage {
                    match document.voltage.as_mut() {
                        Some(table) => table.points.clone_from(points),
                        None => tracing::warn!(
                            points = points.len(),
                            "Source has no voltage table, imported points dropped"
                        ),
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::AddLevelTop { bin } => write!(f, "Add level at top of bin {bin}"),
            Edit::AddLevelBottom { bin } => write!(f, "Add level at bottom of bin {bin}"),
            Edit::DuplicateLevel { bin, level } => {
                write!(f, "Duplicate level {level} of bin {bin}")
            }
            Edit::RemoveLevel { bin, level } => write!(f, "Remove level {level} of bin {bin}"),
            Edit::MoveLevel { bin, from, to } => {
                write!(f, "Move level {from} to {to} in bin {bin}")
            }
            Edit::SetLevelValue {
                bin,
                level,
                key,
                value,
            } => write!(f, "Set {key} = {value} on level {level} of bin {bin}"),
            Edit::SetLevelLine {
                bin, level, text, ..
            } => write!(f, "Edit '{text}' on level {level} of bin {bin}"),
            Edit::SetVoltageLevel { bin, level, label } => {
                write!(f, "Set voltage {label} on level {level} of bin {bin}")
            }
            Edit::SetHeaderValue { bin, key, value } => {
                write!(f, "Set {key} = {value} on bin {bin}")
            }
            Edit::SetOpPoint { index, point } => write!(
                f,
                "Set voltage point {index} to {} Hz / {} uV",
                point.frequency, point.microvolt
            ),
            Edit::ReplaceTables { bins, .. } => write!(f, "Import {} bins", bins.len()),
        }
    }
}

fn bin_mut(document: &mut Document, bin: usize) -> Result<&mut Bin> {
    let count = document.bins.len();
    document
        .bin_mut(bin)
        .ok_or(EditorError::BinOutOfRange { bin, count })
}

fn level_mut(document: &mut Document, bin: usize, level: usize) -> Result<&mut pts_codec::Level> {
    let target = bin_mut(document, bin)?;
    check_level(target, bin, level)?;
    target
        .level_mut(level)
        .ok_or(EditorError::LevelOutOfRange {
            bin,
            level,
            count: 0,
        })
}

fn check_level(target: &Bin, bin: usize, level: usize) -> Result<()> {
    let count = target.levels.len();
    if level >= count {
        return Err(EditorError::LevelOutOfRange { bin, level, count });
    }
    Ok(())
}

fn check_room(target: &Bin, bin: usize, profile: &ChipProfile) -> Result<()> {
    if target.levels.len() >= profile.max_levels {
        return Err(EditorError::LevelLimit {
            bin,
            max: profile.max_levels,
        });
    }
    Ok(())
}

/// Keep the initial (and, where tracked, target) level pointing at the same
/// operating point after the level count changed by `delta`.
fn shift_dependents(target: &mut Bin, profile: &ChipProfile, delta: i64) -> Result<()> {
    let initial = target.offset_header_value(keys::INITIAL_LEVEL, delta)?;
    let tracked = if profile.tracks_target_level {
        target.offset_header_value(keys::TARGET_LEVEL, delta)?
    } else {
        None
    };
    tracing::debug!(bin = target.id, delta, ?initial, ?tracked, "Shifted dependent levels");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pts_chip::catalog;
    use pts_codec::Level;

    fn level(freq: u64) -> Arc<Level> {
        Arc::new(Level::new(vec![
            format!("qcom,gpu-freq = <0x{freq:x}>;"),
            "qcom,level = <256>;".to_string(),
        ]))
    }

    fn document(levels: &[u64]) -> Document {
        Document {
            lines: Vec::<String>::new().into(),
            bins: vec![Arc::new(Bin {
                id: 0,
                header: vec![
                    "qcom,initial-pwrlevel = <0x01>;".to_string(),
                    "qcom,ca-target-pwrlevel = <0x01>;".to_string(),
                ],
                levels: levels.iter().map(|f| level(*f)).collect(),
            })],
            table: Default::default(),
            voltage: None,
            trailing_newline: false,
        }
    }

    fn frequencies(document: &Document) -> Vec<Option<u64>> {
        document.bins[0]
            .levels
            .iter()
            .map(|level| level.frequency())
            .collect()
    }

    #[test]
    fn test_add_level_bottom_respects_offset() {
        let profile = catalog::find("kona").unwrap();
        let mut doc = document(&[300, 200, 100]);

        Edit::AddLevelBottom { bin: 0 }.apply(&mut doc, profile).unwrap();

        assert_eq!(frequencies(&doc), vec![Some(300), Some(200), Some(200), Some(100)]);
        assert_eq!(doc.bins[0].header_value(keys::INITIAL_LEVEL), Some(2));
        assert_eq!(doc.bins[0].header_value(keys::TARGET_LEVEL), Some(2));
    }

    #[test]
    fn test_add_level_bottom_without_offset() {
        let profile = catalog::find("sun").unwrap();
        let mut doc = document(&[300, 200]);

        Edit::AddLevelBottom { bin: 0 }.apply(&mut doc, profile).unwrap();

        assert_eq!(frequencies(&doc), vec![Some(300), Some(200), Some(200)]);
        assert_eq!(doc.bins[0].header_value(keys::TARGET_LEVEL), Some(1));
    }

    #[test]
    fn test_add_level_top() {
        let profile = catalog::find("msmnile").unwrap();
        let mut doc = document(&[300, 200]);

        Edit::AddLevelTop { bin: 0 }.apply(&mut doc, profile).unwrap();

        assert_eq!(frequencies(&doc), vec![Some(300), Some(300), Some(200)]);
        assert_eq!(doc.bins[0].header_value(keys::INITIAL_LEVEL), Some(2));
        assert_eq!(doc.bins[0].header_value(keys::TARGET_LEVEL), Some(1));
    }

    #[test]
    fn test_add_refused_at_limit() {
        let profile = catalog::find("lito_v1").unwrap();
        let mut doc = document(&[1; 10]);

        let result = Edit::AddLevelTop { bin: 0 }.apply(&mut doc, profile);
        assert!(matches!(result, Err(EditorError::LevelLimit { max: 10, .. })));
    }

    #[test]
    fn test_remove_level() {
        let profile = catalog::find("kona").unwrap();
        let mut doc = document(&[300, 200]);

        Edit::RemoveLevel { bin: 0, level: 0 }
            .apply(&mut doc, profile)
            .unwrap();
        assert_eq!(frequencies(&doc), vec![Some(200)]);
        assert_eq!(doc.bins[0].header_value(keys::INITIAL_LEVEL), Some(0));

        let result = Edit::RemoveLevel { bin: 0, level: 0 }.apply(&mut doc, profile);
        assert!(matches!(result, Err(EditorError::LastLevel { bin: 0 })));
    }

    #[test]
    fn test_move_level() {
        let profile = catalog::find("kona").unwrap();
        let mut doc = document(&[300, 200, 100]);

        Edit::MoveLevel {
            bin: 0,
            from: 2,
            to: 0,
        }
        .apply(&mut doc, profile)
        .unwrap();
        assert_eq!(frequencies(&doc), vec![Some(100), Some(300), Some(200)]);
    }

    #[test]
    fn test_edit_shared_level_copies_it() {
        let profile = catalog::find("kona").unwrap();
        let mut doc = document(&[300]);
        Edit::DuplicateLevel { bin: 0, level: 0 }
            .apply(&mut doc, profile)
            .unwrap();

        Edit::set_frequency(0, 1, 150).apply(&mut doc, profile).unwrap();

        assert_eq!(frequencies(&doc), vec![Some(300), Some(150)]);
        assert_eq!(doc.bins[0].levels[1].lines[0], "qcom,gpu-freq = <0x096>;");
    }

    #[test]
    fn test_set_voltage_level_by_label() {
        let profile = catalog::find("kona").unwrap();
        let mut doc = document(&[300]);

        Edit::SetVoltageLevel {
            bin: 0,
            level: 0,
            label: "turbo".to_string(),
        }
        .apply(&mut doc, profile)
        .unwrap();
        assert_eq!(doc.bins[0].levels[0].voltage_level(), Some(384));

        let unknown = Edit::SetVoltageLevel {
            bin: 0,
            level: 0,
            label: "WARP".to_string(),
        }
        .apply(&mut doc, profile);
        assert!(matches!(unknown, Err(EditorError::Chip(_))));
    }

    #[test]
    fn test_set_level_line() {
        let profile = catalog::find("kona").unwrap();
        let mut doc = document(&[300]);

        Edit::SetLevelLine {
            bin: 0,
            level: 0,
            line: 2,
            text: "  qcom,bus-freq = <0x0b>;".to_string(),
        }
        .apply(&mut doc, profile)
        .unwrap();
        assert_eq!(doc.bins[0].levels[0].bus_freq(), Some(11));

        let result = Edit::SetLevelLine {
            bin: 0,
            level: 0,
            line: 9,
            text: String::new(),
        }
        .apply(&mut doc, profile);
        assert!(matches!(result, Err(EditorError::LineOutOfRange { line: 9, .. })));
    }

    #[test]
    fn test_out_of_range() {
        let profile = catalog::find("kona").unwrap();
        let mut doc = document(&[300]);

        assert!(matches!(
            Edit::AddLevelTop { bin: 3 }.apply(&mut doc, profile),
            Err(EditorError::BinOutOfRange { bin: 3, count: 1 })
        ));
        assert!(matches!(
            Edit::set_frequency(0, 5, 1).apply(&mut doc, profile),
            Err(EditorError::LevelOutOfRange { level: 5, count: 1, .. })
        ));
        assert!(matches!(
            Edit::SetOpPoint {
                index: 0,
                point: VoltageOpPoint {
                    frequency: 1,
                    microvolt: 1
                }
            }
            .apply(&mut doc, profile),
            Err(EditorError::NoVoltageTable)
        ));
    }

    #[test]
    fn test_description() {
        assert_eq!(
            Edit::AddLevelBottom { bin: 1 }.to_string(),
            "Add level at bottom of bin 1"
        );
        assert_eq!(
            Edit::set_frequency(0, 2, 587_000_000).to_string(),
            "Set qcom,gpu-freq = 587000000 on level 2 of bin 0"
        );
    }
}
