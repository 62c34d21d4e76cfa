//! Editing behaviour across sessions and the controller.

use pts_chip::catalog;
use pts_codec::{VoltageOpPoint, keys};
use pts_editor::{Edit, EditorConfig, EditorController, EditorError, EditorSession};
use pts_persistence::Envelope;
use proptest::prelude::*;
use tempfile::{TempDir, tempdir};

const KONA: &str = include_str!("../../pts-codec/tests/fixtures/kona.dts");
const SUN: &str = include_str!("../../pts-codec/tests/fixtures/sun.dts");

fn kona_session() -> EditorSession {
    EditorSession::decode(catalog::find("kona").unwrap(), KONA).unwrap()
}

fn controller_with_targets() -> (TempDir, EditorController) {
    let dir = tempdir().unwrap();
    let kona = dir.path().join("kona.dts");
    let sun = dir.path().join("sun.dts");
    std::fs::write(&kona, KONA).unwrap();
    std::fs::write(&sun, SUN).unwrap();

    let controller = EditorController::new(EditorConfig::default());
    controller.register_target("kona", kona).unwrap();
    controller.register_target("sun", sun).unwrap();
    (dir, controller)
}

#[test]
fn add_level_bottom_and_undo() {
    let mut session = kona_session();
    let original = session.state().clone();

    let state = session.apply_change(&Edit::AddLevelBottom { bin: 0 }).unwrap();
    let bin = &state.bins[0];
    assert_eq!(bin.levels.len(), 4);
    assert_eq!(bin.header_value(keys::INITIAL_LEVEL), Some(3));
    // The copy lands above the reserved lowest level.
    assert_eq!(bin.levels[2], bin.levels[1]);
    assert_eq!(session.undo_available(), 1);

    let state = session.undo().unwrap();
    assert_eq!(state.bins[0].levels.len(), 3);
    assert_eq!(state.bins[0].header_value(keys::INITIAL_LEVEL), Some(2));
    assert_eq!(*state, original);
}

#[test]
fn history_is_bounded() {
    let mut session = kona_session();
    for step in 0..60u64 {
        session
            .apply_change(&Edit::set_frequency(0, 0, 800_000_000 + step))
            .unwrap();
    }
    assert_eq!(session.undo_available(), 50);

    let mut undone = 0;
    while session.undo().is_some() {
        undone += 1;
    }
    assert_eq!(undone, 50);
    // The ten oldest snapshots were evicted.
    assert_eq!(
        session.state().bins[0].levels[0].frequency(),
        Some(800_000_009)
    );
}

#[test]
fn encoded_edit_survives_reload() {
    let mut session = kona_session();
    session.apply_change(&Edit::AddLevelTop { bin: 1 }).unwrap();
    session
        .apply_change(&Edit::set_frequency(1, 0, 650_000_000))
        .unwrap();

    let text = session.encode().unwrap();
    let reloaded = EditorSession::decode(session.profile(), &text).unwrap();

    assert_eq!(reloaded.state().bins, session.state().bins);
    assert_eq!(reloaded.state().bins[1].levels[0].frequency(), Some(650_000_000));
}

#[test]
fn op_point_edit_survives_reload() {
    let mut session = kona_session();
    let before = session.state().voltage.clone().unwrap().points;
    assert_eq!(before.len(), 3);

    let point = VoltageOpPoint {
        frequency: 900_000_000,
        microvolt: 416,
    };
    session
        .apply_change(&Edit::SetOpPoint { index: 0, point })
        .unwrap();

    let text = session.encode().unwrap();
    let reloaded = EditorSession::decode(session.profile(), &text).unwrap();
    let points = reloaded.state().voltage.clone().unwrap().points;
    assert_eq!(points[0], point);
    assert_eq!(points[1..], before[1..]);
    assert!(session.is_dirty());
}

#[test]
fn header_value_edit_and_undo() {
    let mut session = kona_session();

    let state = session
        .apply_change(&Edit::SetHeaderValue {
            bin: 0,
            key: keys::INITIAL_LEVEL.to_string(),
            value: 0,
        })
        .unwrap();
    assert_eq!(state.bins[0].header_value(keys::INITIAL_LEVEL), Some(0));
    assert_eq!(state.bins[1].header_value(keys::INITIAL_LEVEL), Some(1));

    let state = session.undo().unwrap();
    assert_eq!(state.bins[0].header_value(keys::INITIAL_LEVEL), Some(2));
    assert!(!session.is_dirty());
}

#[test]
fn switching_profiles_keeps_sessions_isolated() {
    let (_dir, controller) = controller_with_targets();

    controller.switch_profile("kona").unwrap();
    let kona_edited = controller
        .apply_change(&Edit::AddLevelTop { bin: 0 })
        .unwrap();

    let status = controller.switch_profile("sun").unwrap();
    assert_eq!((status.chip, status.undo, status.dirty), ("sun", 0, false));
    controller
        .apply_change(&Edit::RemoveLevel { bin: 0, level: 1 })
        .unwrap();
    controller
        .apply_change(&Edit::set_frequency(0, 0, 700_000_000))
        .unwrap();

    let status = controller.switch_profile("kona").unwrap();
    assert_eq!((status.undo, status.redo, status.dirty), (1, 0, true));
    let kona = catalog::find("kona").unwrap();
    assert_eq!(controller.encode().unwrap(), kona_edited.encode(kona).unwrap());
    assert_eq!(controller.dirty_profiles(), ["kona", "sun"]);

    let restored = controller.undo().unwrap().unwrap();
    assert_eq!(restored.bins[0].levels.len(), 3);

    controller.switch_profile("sun").unwrap();
    assert_eq!(controller.status().unwrap().undo, 2);
}

#[test]
fn import_from_other_chip_is_rejected_without_mutation() {
    let (_dir, controller) = controller_with_targets();
    controller.switch_profile("sun").unwrap();
    let envelope = controller.export_envelope("sun stock").unwrap();

    controller.switch_profile("kona").unwrap();
    let before = controller.encode().unwrap();

    let error = controller.import_envelope(&envelope).unwrap_err();
    assert!(matches!(
        error,
        EditorError::ProfileMismatch { active: "kona", .. }
    ));
    assert_eq!(controller.encode().unwrap(), before);
    let status = controller.status().unwrap();
    assert_eq!((status.undo, status.dirty), (0, false));
}

#[test]
fn import_unknown_chip_is_rejected() {
    let mut session = kona_session();
    let envelope = Envelope {
        chip: "mystery".to_string(),
        description: String::new(),
        table: String::new(),
        voltage_table: None,
    };
    assert!(matches!(
        session.import_envelope(&envelope),
        Err(EditorError::Chip(_))
    ));
    assert_eq!(session.undo_available(), 0);
}

#[test]
fn envelope_round_trip_between_sessions() {
    let mut source = kona_session();
    source.apply_change(&Edit::AddLevelTop { bin: 0 }).unwrap();
    source.apply_change(&Edit::set_frequency(0, 0, 900_000_000)).unwrap();
    let bytes = source.export_envelope("overclock").to_bytes().unwrap();

    let mut target = kona_session();
    let envelope = Envelope::from_bytes(&bytes).unwrap();
    target.import_envelope(&envelope).unwrap();

    assert_eq!(target.state().bins, source.state().bins);
    assert_eq!(target.state().voltage, source.state().voltage);
    assert_eq!(target.undo_available(), 1);
    assert!(target.is_dirty());
}

#[test]
fn single_bin_profile_accepts_multi_bin_export() {
    let mut source = kona_session();
    let envelope = source.export_envelope("stock");
    source.apply_change(&Edit::AddLevelTop { bin: 0 }).unwrap();

    let single = catalog::find("kona_singleBin").unwrap();
    let single_text = SUN.replace("qcom,sun", "qcom,kona");
    let mut target = EditorSession::decode(single, &single_text).unwrap();

    target.import_envelope(&envelope).unwrap();
    let text = target.encode().unwrap();
    let reloaded = EditorSession::decode(single, &text).unwrap();
    assert_eq!(reloaded.state().bins.len(), 1);
    assert_eq!(reloaded.state().bins[0].levels.len(), 3);
}

#[derive(Debug, Clone)]
enum Step {
    AddTop(usize),
    AddBottom(usize),
    Remove(usize, usize),
    Move(usize, usize, usize),
    Frequency(usize, usize, u64),
}

impl Step {
    fn edit(&self) -> Edit {
        match *self {
            Step::AddTop(bin) => Edit::AddLevelTop { bin },
            Step::AddBottom(bin) => Edit::AddLevelBottom { bin },
            Step::Remove(bin, level) => Edit::RemoveLevel { bin, level },
            Step::Move(bin, from, to) => Edit::MoveLevel { bin, from, to },
            Step::Frequency(bin, level, hz) => Edit::set_frequency(bin, level, hz),
        }
    }
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0..2usize).prop_map(Step::AddTop),
        (0..2usize).prop_map(Step::AddBottom),
        (0..2usize, 0..5usize).prop_map(|(bin, level)| Step::Remove(bin, level)),
        (0..2usize, 0..5usize, 0..5usize).prop_map(|(bin, from, to)| Step::Move(bin, from, to)),
        (0..2usize, 0..5usize, 100_000_000..1_000_000_000u64)
            .prop_map(|(bin, level, hz)| Step::Frequency(bin, level, hz)),
    ]
}

proptest! {
    #[test]
    fn prop_undo_redo_inverse(steps in prop::collection::vec(step(), 1..25)) {
        let mut session = kona_session();
        let original = session.state().clone();

        let mut applied = 0;
        for step in &steps {
            if session.apply_change(&step.edit()).is_ok() {
                applied += 1;
            }
        }
        let last = session.state().clone();
        prop_assert_eq!(session.undo_available(), applied);

        for _ in 0..applied {
            prop_assert!(session.undo().is_some());
        }
        prop_assert!(session.undo().is_none());
        prop_assert_eq!(session.state(), &original);
        prop_assert!(!session.is_dirty());

        for _ in 0..applied {
            prop_assert!(session.redo().is_some());
        }
        prop_assert!(session.redo().is_none());
        prop_assert_eq!(session.state(), &last);
    }
}
