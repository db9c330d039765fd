#![forbid(unsafe_code)]

//! End-to-end editor behaviour: gestures against the character document,
//! context switches from the host, and command execution.
//!
//! Run:
//!   cargo test -p csat --test editor_flow

use std::rc::Rc;

use csat::{Commands, CsatError, EDITOR_CONTEXT_EVENT, Editor, EditorConfig, EditorMode, execute};
use csat_core::{DRAW_GHOST_EVENT, Direction, GridMetrics, Placement};
use csat_sheet::{FileCache, MemoryCache, default_document};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn fresh_editor() -> Editor {
    Editor::with_document(default_document(), Box::new(MemoryCache::new()), GridMetrics::default())
}

fn run(editor: &mut Editor, command: Commands) -> Result<String, CsatError> {
    let mut out = Vec::new();
    execute(editor, command, &EditorConfig::default(), &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn move_gesture_commits_into_document() {
    let editor = fresh_editor();
    let record = editor
        .drive_gesture("BattleStats", Direction::empty(), 110.0, 0.0)
        .unwrap();
    assert_eq!(record.previous, Placement::new(6, 4, 3, 4));
    assert_eq!(record.placement, Placement::new(7, 4, 3, 4));
    assert_eq!(editor.placement("BattleStats").unwrap(), Placement::new(7, 4, 3, 4));
    assert_eq!(editor.grid().commit_count(), 1);
    assert!(editor.grid().state().is_idle());
}

#[test]
fn resize_gesture_grows_from_the_dragged_corner() {
    let editor = fresh_editor();
    let record = editor
        .drive_gesture("BattleStats", Direction::DOWN_RIGHT, 110.0, 40.0)
        .unwrap();
    assert_eq!(record.placement, Placement::new(6, 4, 4, 5));
}

#[test]
fn unknown_panel_is_reported() {
    let editor = fresh_editor();
    assert!(matches!(
        editor.drive_gesture("Nope", Direction::empty(), 0.0, 0.0),
        Err(CsatError::UnknownPanel { .. })
    ));
}

#[test]
fn context_switches_arrive_over_the_host_bus() {
    let mut editor = fresh_editor();
    editor.host().emit(EDITOR_CONTEXT_EVENT, &json!("layoutEdit-switch"));
    editor.host().emit(EDITOR_CONTEXT_EVENT, &json!("noSuch-switch"));
    assert_eq!(
        editor.mode(),
        EditorMode {
            layout_locked: true,
            ..EditorMode::default()
        }
    );

    assert!(editor.cells().iter().all(|view| view.overlay.is_none()));
    assert!(matches!(
        editor.drive_gesture("BattleStats", Direction::empty(), 110.0, 0.0),
        Err(CsatError::LayoutLocked)
    ));

    editor.host().emit(EDITOR_CONTEXT_EVENT, &json!("layoutEdit-switch"));
    editor.host().emit(EDITOR_CONTEXT_EVENT, &json!("readOnly-switch"));
    assert!(editor.cells().iter().all(|view| view.overlay.is_some()));
    assert!(matches!(editor.add_element("Notes", None), Err(CsatError::ReadOnly)));
    // validate is still allowed while read-only
    editor.dispatch(&json!({"type": "validate"})).unwrap();
}

#[test]
fn unchanged_panels_keep_their_rendered_children() {
    let mut editor = fresh_editor();
    editor.add_element("Inventory", Some(json!({"count": 0}))).unwrap();
    let first = editor.cells();
    let second = editor.cells();
    let find = |views: &[csat_grid::CellView<serde_json::Value>], id: &str| {
        views.iter().find(|v| v.id == id).map(|v| Rc::clone(&v.children)).unwrap()
    };
    assert!(Rc::ptr_eq(&find(&first, "Inventory"), &find(&second, "Inventory")));

    editor
        .dispatch(&json!({"type": "change-grid-element", "id": "Inventory", "merge": {"count": 2}}))
        .unwrap();
    let third = editor.cells();
    assert!(!Rc::ptr_eq(&find(&second, "Inventory"), &find(&third, "Inventory")));
    assert_eq!(*find(&third, "Inventory"), json!({"count": 2}));
    assert!(Rc::ptr_eq(&find(&second, "BattleStats"), &find(&third, "BattleStats")));
}

#[test]
fn external_ghost_follows_host_pushes() {
    let editor = fresh_editor();
    assert!(!editor.grid().view().external_ghost.is_visible());
    editor
        .host()
        .emit(DRAW_GHOST_EVENT, &json!({"gridArea": "26 / 1 / 27 / 2"}));
    let ghost = editor.grid().view().external_ghost;
    assert!(ghost.is_visible());
    assert_eq!(ghost.grid_area(), Some(Placement::new(1, 26, 1, 1).grid_area()));
}

#[test]
fn edits_survive_a_reboot_through_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    {
        let mut editor =
            Editor::boot(Box::new(FileCache::new(&cache_dir)), GridMetrics::default()).unwrap();
        let out = run(
            &mut editor,
            Commands::AddElement {
                id: "Notes".into(),
                data: Some(r#"{"text": "owes 3gp"}"#.into()),
            },
        )
        .unwrap();
        assert_eq!(out, "added Notes at 25 / 1 / 26 / 2\n");
    }
    let mut editor =
        Editor::boot(Box::new(FileCache::new(&cache_dir)), GridMetrics::default()).unwrap();
    assert_eq!(editor.placement("Notes").unwrap(), Placement::new(1, 25, 1, 1));

    run(&mut editor, Commands::ClearCache).unwrap();
    let editor = Editor::boot(Box::new(FileCache::new(&cache_dir)), GridMetrics::default()).unwrap();
    assert_eq!(editor.document(), default_document());
}

#[test]
fn save_then_load_commands() {
    let dir = tempfile::tempdir().unwrap();
    let mut editor = fresh_editor();
    editor
        .dispatch(&json!({"type": "change-text-field", "mergeObject": {"characterName": "Tink"}}))
        .unwrap();
    let out = run(&mut editor, Commands::Save { out: Some(dir.path().to_path_buf()) }).unwrap();
    assert!(out.starts_with("saved "));

    let mut other = fresh_editor();
    run(
        &mut other,
        Commands::Load {
            file: dir.path().join("characterData.json"),
        },
    )
    .unwrap();
    assert_eq!(other.document(), editor.document());

    let missing = run(&mut other, Commands::Save { out: Some(dir.path().join("absent")) });
    assert!(matches!(missing, Err(CsatError::MissingPath { .. })));
}

#[test]
fn show_lists_every_panel() {
    let mut editor = fresh_editor();
    let out = run(&mut editor, Commands::Show { json: true }).unwrap();
    let rows: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    assert_eq!(rows.len(), 12);
    let general = rows.iter().find(|row| row["id"] == "GeneralInfo").unwrap();
    assert_eq!(general["gridArea"], "1 / 1 / 4 / -1");
    assert_eq!(general["locked"], false);
}

#[test]
fn rejected_actions_become_errors() {
    let mut editor = fresh_editor();
    let err = run(
        &mut editor,
        Commands::Dispatch {
            action: r#"{"type": "remove-element", "id": "Nope"}"#.into(),
        },
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), 4);

    let err = run(
        &mut editor,
        Commands::Resize {
            id: "BattleStats".into(),
            direction: "x".into(),
            by: csat::cli::Displacement { dx_px: 0.0, dy_px: 0.0 },
        },
    )
    .unwrap_err();
    assert!(matches!(err, CsatError::Direction(_)));
}

#[test]
fn moved_end_spanning_panel_gets_a_one_cell_span() {
    let editor = fresh_editor();
    let record = editor
        .drive_gesture("GeneralInfo", Direction::empty(), 0.0, 80.0)
        .unwrap();
    assert_eq!(record.previous, Placement::new(1, 1, -1, 3));
    assert_eq!(record.placement, Placement::new(1, 3, 1, 3));
}

const HANDLES: [&str; 9] = ["", "u", "d", "l", "r", "ul", "ur", "ld", "rd"];

proptest! {
    #[test]
    fn committed_gestures_stay_on_the_grid(
        panel in prop::sample::select(vec!["BattleStats", "GeneralInfo", "HealthStats"]),
        handle in prop::sample::select(HANDLES.to_vec()),
        dx_px in -5000.0f64..5000.0,
        dy_px in -5000.0f64..5000.0,
    ) {
        let editor = fresh_editor();
        let direction = if handle.is_empty() {
            Direction::empty()
        } else {
            Direction::from_code(handle).unwrap()
        };
        if let Ok(record) = editor.drive_gesture(panel, direction, dx_px, dy_px) {
            let p = record.placement;
            prop_assert!(p.x >= 1 && p.y >= 1, "origin left the grid: {p:?}");
            // a reverted axis keeps its span as stored, end sentinel included
            let w_ok = p.w >= 1 || (record.x_reverted && p.w == record.previous.w);
            let h_ok = p.h >= 1 || (record.y_reverted && p.h == record.previous.h);
            prop_assert!(w_ok && h_ok, "span below one cell: {p:?}");
            prop_assert_eq!(editor.placement(panel).unwrap(), p);
        }
    }
}
