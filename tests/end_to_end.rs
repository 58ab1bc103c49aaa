//! Session-level behaviour: load a ledger from disk, correct a save, persist.

use anchor_fixer::{AnchorEvents, AnchorFixer, Ledger, PartInfo, SaveNode, Settings};
use glam::DVec3;
use proptest::prelude::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn save_with_anchor(id: &str, pos: &str) -> SaveNode {
    let part = SaveNode::new("PART")
        .with_value("part", "groundAnchor")
        .with_value("flightID", id)
        .with_value("pos", pos)
        .with_value("rot", "0,0,0,1");
    let vessel = SaveNode::new("VESSEL")
        .with_value("name", "Base Alpha")
        .with_node(part);
    SaveNode::new("GAME").with_node(SaveNode::new("FLIGHTSTATE").with_node(vessel))
}

fn part_pos(tree: &SaveNode) -> Option<&str> {
    tree.get_node("FLIGHTSTATE")?
        .get_node("VESSEL")?
        .get_node("PART")?
        .get_value("pos")
}

#[test]
fn test_loaded_anchor_is_restored() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("anchors.json");
    std::fs::write(&path, r#"{"anchors":{"42":{"x":1.0,"y":2.0,"z":3.0}}}"#).unwrap();

    let mut ledger = Ledger::new(&path);
    ledger.load().unwrap();
    let mut tree = save_with_anchor("42", "1.0 , 99.0 , 3.0");
    let report = ledger.correct(&mut tree);

    assert_eq!(report.corrected, 1);
    assert_eq!(part_pos(&tree), Some("1 , 2 , 3"));
    // Untouched fields stay as they were
    let part = tree
        .get_node("FLIGHTSTATE")
        .and_then(|f| f.get_node("VESSEL"))
        .and_then(|v| v.get_node("PART"))
        .unwrap();
    assert_eq!(part.get_value("rot"), Some("0,0,0,1"));
}

#[test]
fn test_missing_file_is_empty_ledger() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = Ledger::new(dir.path().join("missing.json"));

    assert!(ledger.load().is_ok());
    assert!(ledger.is_empty());
}

#[test]
fn test_hand_edited_ledger_with_stray_commas_loads() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("anchors.json");
    std::fs::write(
        &path,
        "{\n  \"anchors\": {\n    \"1\": {\"x\": 1, \"y\": 2, \"z\": 3,},\n    ,\"2\": {\"x\": 4.5, \"y\": 5, \"z\": 6},\n  },\n}\n",
    )
    .unwrap();

    let mut ledger = Ledger::new(&path);
    let report = ledger.load().unwrap();

    assert_eq!(report.loaded, 2);
    assert_eq!(ledger.get(2), Some(DVec3::new(4.5, 5.0, 6.0)));
}

#[test]
fn test_two_sessions() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::with_root(dir.path());

    // First session: anchor placed, then drifts before the save
    let mut session = AnchorFixer::start(&settings);
    session.on_part_attached(&PartInfo::new("groundAnchor", 7, DVec3::new(10.0, 20.0, 30.0)));
    let mut tree = save_with_anchor("7", "10 , 20.75 , 30");
    assert_eq!(session.on_before_save(&mut tree).corrected, 1);
    drop(session);

    // Second session: the part is reported again at its drifted position
    let mut session = AnchorFixer::start(&settings);
    session.on_vessel_modified(&[PartInfo::new("groundAnchor", 7, DVec3::new(10.0, 21.0, 30.0))]);
    let mut tree = save_with_anchor("7", "10 , 21 , 30");
    assert_eq!(session.on_before_save(&mut tree).corrected, 1);
    assert_eq!(part_pos(&tree), Some("10 , 20 , 30"));
}

proptest! {
    #[test]
    fn test_persisted_positions_reload_exactly(
        entries in prop::collection::btree_map(
            any::<u32>(),
            (-1.0e9..1.0e9f64, -1.0e9..1.0e9f64, -1.0e9..1.0e9f64),
            0..20,
        )
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchors.json");
        let mut ledger = Ledger::new(&path);
        for (&id, &(x, y, z)) in &entries {
            ledger.register(id, DVec3::new(x, y, z));
        }
        ledger.persist().unwrap();

        let mut reloaded = Ledger::new(&path);
        reloaded.load().unwrap();
        prop_assert_eq!(reloaded.len(), entries.len());
        for (id, pos) in ledger.iter() {
            prop_assert_eq!(reloaded.get(id), Some(pos));
        }
    }

    #[test]
    fn test_second_correction_changes_nothing(
        original in (-1.0e6..1.0e6f64, -1.0e6..1.0e6f64, -1.0e6..1.0e6f64),
        drift in (-1.0e3..1.0e3f64, -1.0e3..1.0e3f64, -1.0e3..1.0e3f64),
    ) {
        let original = DVec3::new(original.0, original.1, original.2);
        let drifted = original + DVec3::new(drift.0, drift.1, drift.2);
        let mut ledger = Ledger::new("unused.json");
        ledger.register(1, original);

        let mut tree = save_with_anchor("1", &anchor_fixer::save_tree::format_position(drifted));
        ledger.correct(&mut tree);
        let once = tree.clone();
        let second = ledger.correct(&mut tree);

        prop_assert_eq!(second.corrected, 0);
        prop_assert_eq!(tree, once);
    }
}
