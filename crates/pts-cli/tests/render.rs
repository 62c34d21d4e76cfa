//! Rendering of decoded tables.

use pts_chip::catalog;
use pts_cli::render::{level_rows, levels_table, op_points_table, plain_listing};
use pts_codec::Document;

const KONA: &str = include_str!("../../pts-codec/tests/fixtures/kona.dts");
const SUN: &str = include_str!("../../pts-codec/tests/fixtures/sun.dts");

#[test]
fn test_kona_plain_listing() {
    let profile = catalog::find("kona").unwrap();
    let document = Document::decode(KONA, profile).unwrap();
    insta::assert_snapshot!("kona_plain_listing", plain_listing(profile, &document));
}

#[test]
fn test_unknown_corner_uses_placeholder() {
    let profile = catalog::find("sun").unwrap();
    let text = SUN.replacen("qcom,level = <256>;", "qcom,level = <999>;", 1);
    let document = Document::decode(&text, profile).unwrap();

    let rows = level_rows(profile, &document);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].voltage, "TURBO");
    assert_eq!(rows[1].voltage, "LEVEL_999");
    assert_eq!(rows[1].frequency, "587 MHz");
}

#[test]
fn test_tables_cover_every_row() {
    let profile = catalog::find("kona").unwrap();
    let document = Document::decode(KONA, profile).unwrap();

    assert_eq!(levels_table(profile, &document).row_iter().count(), 5);
    assert_eq!(op_points_table(&document).unwrap().row_iter().count(), 3);

    let sun = catalog::find("sun").unwrap();
    let single = Document::decode(SUN, sun).unwrap();
    assert!(op_points_table(&single).is_none());
}
