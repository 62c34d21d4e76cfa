//! Terminal tables for command output.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use pts_blob::FdtHeader;
use pts_chip::ChipProfile;
use pts_codec::{Document, Level, keys};

/// One level as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRow {
    /// Position of the bin in the document, as accepted by `pts edit`.
    pub bin: usize,
    pub level: usize,
    pub frequency: String,
    pub bus: String,
    pub voltage: String,
}

/// A fragment found by `pts split`.
#[derive(Debug, Clone)]
pub struct FragmentInfo {
    pub index: usize,
    pub offset: usize,
    pub size: usize,
    pub header: Option<FdtHeader>,
}

pub fn format_frequency(hz: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let mhz = hz as f64 / 1_000_000.0;
    format!("{mhz} MHz")
}

fn bus_summary(level: &Level) -> String {
    match (level.bus_freq(), level.bus_min(), level.bus_max()) {
        (Some(freq), Some(min), Some(max)) => format!("{freq} ({min}-{max})"),
        (Some(freq), _, _) => freq.to_string(),
        _ => "-".to_string(),
    }
}

fn voltage_summary(profile: &ChipProfile, level: &Level) -> String {
    match level.voltage_level() {
        Some(value) => u32::try_from(value).map_or_else(
            |_| format!("LEVEL_{value}"),
            |value| profile.voltage_label_or_placeholder(value),
        ),
        None => "-".to_string(),
    }
}

pub fn level_rows(profile: &ChipProfile, document: &Document) -> Vec<LevelRow> {
    document
        .bins
        .iter()
        .enumerate()
        .flat_map(|(bin, entry)| {
            entry.levels.iter().enumerate().map(move |(index, level)| LevelRow {
                bin,
                level: index,
                frequency: level
                    .frequency()
                    .map_or_else(|| "-".to_string(), format_frequency),
                bus: bus_summary(level),
                voltage: voltage_summary(profile, level),
            })
        })
        .collect()
}

/// Tab-separated listing with a header line, for scripts.
pub fn plain_listing(profile: &ChipProfile, document: &Document) -> String {
    let mut lines = vec!["bin\tlevel\tfrequency\tbus\tvoltage".to_string()];
    lines.extend(level_rows(profile, document).into_iter().map(|row| {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            row.bin, row.level, row.frequency, row.bus, row.voltage
        )
    }));
    lines.join("\n")
}

pub fn levels_table(profile: &ChipProfile, document: &Document) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Bin"),
        header_cell("Level"),
        header_cell("Frequency"),
        header_cell("Bus"),
        header_cell("Voltage"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);

    for row in level_rows(profile, document) {
        let initial = document.bins[row.bin].header_value(keys::INITIAL_LEVEL);
        let is_initial = initial == u64::try_from(row.level).ok();
        let mut level_cell = Cell::new(row.level);
        if is_initial {
            level_cell = level_cell.fg(Color::Green).add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            Cell::new(row.bin),
            level_cell,
            Cell::new(row.frequency),
            Cell::new(row.bus),
            Cell::new(row.voltage),
        ]);
    }
    table
}

/// Operating points of the voltage table, if the source has one.
pub fn op_points_table(document: &Document) -> Option<Table> {
    let voltage = document.voltage.as_ref()?;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Frequency"),
        header_cell("Microvolt"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for (index, point) in voltage.points.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index),
            Cell::new(format_frequency(point.frequency)),
            Cell::new(point.microvolt),
        ]);
    }
    Some(table)
}

pub fn chips_table(profiles: &[ChipProfile]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Name"),
        header_cell("Layout"),
        header_cell("Max levels"),
        header_cell("Voltage labels"),
        header_cell("Voltage table"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for profile in profiles {
        table.add_row(vec![
            Cell::new(profile.key)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(profile.name),
            Cell::new(profile.layout.as_str()),
            Cell::new(profile.max_levels),
            Cell::new(profile.voltage_levels.as_str()),
            profile
                .voltage_table_label()
                .map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    table
}

pub fn fragments_table(fragments: &[FragmentInfo]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Offset"),
        header_cell("Size"),
        header_cell("FDT version"),
        header_cell("Header"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for fragment in fragments {
        let (version, status) = match &fragment.header {
            Some(header) if header.size_matches(fragment.size) => (
                Cell::new(header.version),
                Cell::new("ok").fg(Color::Green),
            ),
            Some(header) => (
                Cell::new(header.version),
                Cell::new(format!("size {} declared", header.total_size)).fg(Color::Yellow),
            ),
            None => (dim_cell("-"), Cell::new("unreadable").fg(Color::Red)),
        };
        table.add_row(vec![
            Cell::new(fragment.index),
            Cell::new(format!("{:#x}", fragment.offset)),
            Cell::new(fragment.size),
            version,
            status,
        ]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_frequency() {
        assert_eq!(format_frequency(800_000_000), "800 MHz");
        assert_eq!(format_frequency(587_500_000), "587.5 MHz");
    }

    #[test]
    fn test_tables_have_one_row_per_entry() {
        let table = chips_table(pts_chip::CATALOG);
        assert_eq!(table.row_iter().count(), pts_chip::CATALOG.len());

        let fragments = [FragmentInfo {
            index: 0,
            offset: 0,
            size: 8,
            header: None,
        }];
        assert_eq!(fragments_table(&fragments).row_iter().count(), 1);
    }
}
