#![forbid(unsafe_code)]

//! Layout store behaviour across crate boundaries: commit then merge,
//! element placement and the serialized form.
//!
//! Run:
//!   cargo test -p csat-layout --test layout_store

use csat_core::{Placement, SPAN_TO_END};
use csat_layout::{
    GridLayout, LayoutStore, PlacementDelta, PlacementPatch, commit_placement, default_layout,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn commit(layout: &mut GridLayout, id: &str, delta: PlacementDelta) -> Placement {
    let current = layout.get(id).unwrap();
    let next = commit_placement(current, delta).placement;
    layout.merge(id, PlacementPatch::full(next));
    next
}

#[test]
fn sequence_of_commits_accumulates() {
    let mut layout = default_layout();
    commit(&mut layout, "BattleStats", PlacementDelta::translate(1, 0));
    commit(&mut layout, "BattleStats", PlacementDelta { dh: 2, ..PlacementDelta::default() });
    commit(&mut layout, "BattleStats", PlacementDelta::translate(-20, 1));

    // last move pushed x off the grid: x and w stay, y still moves
    assert_eq!(layout.get("BattleStats"), Some(Placement::new(7, 5, 3, 6)));
    assert!(layout.validate().is_empty());
}

#[test]
fn new_element_lands_below_everything() {
    let mut layout = default_layout();
    let row = layout.lowest_free_row();
    assert!(layout.is_id_available("Spellbook"));
    layout.insert("Spellbook", Placement::new(1, row, 4, 6)).unwrap();

    assert_eq!(layout.lowest_free_row(), row + 6);
    assert!(!layout.is_id_available("Spellbook"));

    layout.remove("Spellbook").unwrap();
    assert_eq!(layout, default_layout());
}

#[test]
fn json_form_round_trips_with_sentinels() {
    let layout = default_layout();
    let text = serde_json::to_string(&layout).unwrap();
    assert!(text.contains(r#""GeneralInfo":{"x":1,"y":1,"w":-1,"h":3}"#));
    let back: GridLayout = serde_json::from_str(&text).unwrap();
    assert_eq!(back, layout);
    assert_eq!(back.get("HealthStats").map(|p| p.w), Some(SPAN_TO_END));
}

#[test]
fn partial_patch_from_json_keeps_missing_fields() {
    let mut layout = default_layout();
    let patch: PlacementPatch = serde_json::from_str(r#"{"y": 30}"#).unwrap();
    layout.merge("SavingThrows", patch);
    assert_eq!(layout.get("SavingThrows"), Some(Placement::new(7, 30, 2, 3)));
}

proptest! {
    #[test]
    fn grid_area_inverse_reconstructs_rect(
        x in 1i32..200, y in 1i32..200, w in 1i32..50, h in 1i32..50,
    ) {
        let p = Placement::new(x, y, w, h);
        prop_assert_eq!(p.grid_area().to_placement(), p);
        let text = p.grid_area().to_string();
        prop_assert_eq!(text.parse::<csat_core::GridArea>().unwrap().to_placement(), p);
    }
}
