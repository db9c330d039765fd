#![forbid(unsafe_code)]

//! Character document.
//!
//! The document is an open JSON object: character fields at the top level,
//! panel placements under `"grid"` and per-panel data under `"elements"`.
//! Unknown keys are kept as they are so a round trip through the editor
//! never loses data.

use csat_core::Placement;
use csat_layout::{GridLayout, LayoutStore, PlacementPatch, default_layout};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::warn;

/// Key holding the panel layout.
pub const GRID_KEY: &str = "grid";
/// Key holding per-panel data.
pub const ELEMENTS_KEY: &str = "elements";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterDocument {
    root: Map<String, Value>,
}

impl CharacterDocument {
    /// Empty document, no fields and no layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value. `None` unless it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(root) => Some(Self { root }),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.root
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: Value) {
        self.root.insert(key.into(), value);
    }

    /// Panel layout. Entries that are not placements are skipped.
    #[must_use]
    pub fn layout(&self) -> GridLayout {
        let Some(grid) = self.root.get(GRID_KEY).and_then(Value::as_object) else {
            return GridLayout::new();
        };
        grid.iter()
            .filter_map(|(id, raw)| match Placement::deserialize(raw) {
                Ok(placement) => Some((id.clone(), placement)),
                Err(err) => {
                    warn!(id = %id, error = %err, "skipping malformed grid entry");
                    None
                }
            })
            .collect()
    }

    /// Replace the whole layout.
    pub fn set_layout(&mut self, layout: &GridLayout) {
        let grid: Map<String, Value> = layout
            .iter()
            .map(|(id, p)| (id.to_string(), placement_value(p)))
            .collect();
        self.root.insert(GRID_KEY.into(), Value::Object(grid));
    }

    /// Data of one panel.
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&Value> {
        self.root.get(ELEMENTS_KEY)?.get(id)
    }

    /// Mutable data of one panel, creating an empty object when missing.
    pub fn element_mut(&mut self, id: &str) -> &mut Map<String, Value> {
        let elements = object_entry(&mut self.root, ELEMENTS_KEY);
        object_entry(elements, id)
    }

    /// Drop one panel's data. Returns whether it existed.
    pub fn remove_element_data(&mut self, id: &str) -> bool {
        self.root
            .get_mut(ELEMENTS_KEY)
            .and_then(Value::as_object_mut)
            .is_some_and(|elements| elements.remove(id).is_some())
    }

    /// Drop one panel's placement. Returns whether it existed.
    pub fn remove_placement(&mut self, id: &str) -> bool {
        self.root
            .get_mut(GRID_KEY)
            .and_then(Value::as_object_mut)
            .is_some_and(|grid| grid.remove(id).is_some())
    }
}

impl LayoutStore for CharacterDocument {
    fn get(&self, id: &str) -> Option<Placement> {
        let raw = self.root.get(GRID_KEY)?.get(id)?;
        Placement::deserialize(raw).ok()
    }

    fn merge(&mut self, id: &str, patch: PlacementPatch) {
        let base = LayoutStore::get(self, id).unwrap_or_default();
        let grid = object_entry(&mut self.root, GRID_KEY);
        grid.insert(id.to_string(), placement_value(patch.apply_to(base)));
    }
}

fn placement_value(p: Placement) -> Value {
    json!({"x": p.x, "y": p.y, "w": p.w, "h": p.h})
}

// Object under `key`, replacing a non-object value.
pub(crate) fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    loop {
        if let Value::Object(inner) = slot {
            return inner;
        }
        *slot = Value::Object(Map::new());
    }
}

/// Document a fresh editor starts from.
#[must_use]
pub fn default_document() -> CharacterDocument {
    let value = json!({
        "characterName": "Daino",
        "characterClass": "Artificier",
        "characterLevel": "8",
        "characterBackground": "Sage",
        "characterRace": "Gnome",
        "primarySkills": {
            "str": 8,
            "dex": 16,
            "con": 12,
            "int": 20,
            "wis": 14,
            "cha": 10,
        },
        "proficiencyModifier": 3,
        "proficiencies": {
            "acrobatics": 1,
            "arcana": 1,
            "history": 1,
            "medicine": 1,
            "perception": 1,
            "conSaving": 1,
            "intSaving": 1,
        },
        "health": {
            "maxHp": 43,
            "currentHp": 43,
            "tempHp": 7,
        },
        "armorClass": 19,
        "initiative": "+3",
        "hitDice": "8d8",
        "hitDiceTotal": "8d8",
        "exhaustion": 0,
        "deathSavingThrows": {
            "successes": 0,
            "failures": 0,
        },
        "elements": {},
    });
    let mut doc = CharacterDocument::from_value(value).unwrap_or_default();
    doc.set_layout(&default_layout());
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn document_is_a_layout_store() {
        let mut doc = default_document();
        assert_eq!(
            LayoutStore::get(&doc, "PrimarySkills"),
            Some(Placement::new(1, 4, 2, 18))
        );
        doc.merge("PrimarySkills", PlacementPatch::full(Placement::new(2, 5, 2, 18)));
        assert_eq!(doc.field("grid").unwrap()["PrimarySkills"], json!({"x": 2, "y": 5, "w": 2, "h": 18}));
    }

    #[test]
    fn merge_creates_grid_when_missing() {
        let mut doc = CharacterDocument::new();
        doc.merge("hp", PlacementPatch { y: Some(3), ..PlacementPatch::default() });
        assert_eq!(LayoutStore::get(&doc, "hp"), Some(Placement::new(0, 3, 0, 0)));
    }

    #[test]
    fn layout_skips_malformed_entries() {
        let doc = CharacterDocument::from_value(json!({
            "grid": {"ok": {"x": 1, "y": 1, "w": 1, "h": 1}, "bad": "nope"}
        }))
        .unwrap();
        let layout = doc.layout();
        assert_eq!(layout.len(), 1);
        assert_eq!(layout.get("ok"), Some(Placement::new(1, 1, 1, 1)));
    }

    #[test]
    fn element_mut_creates_containers() {
        let mut doc = CharacterDocument::from_value(json!({"elements": 4})).unwrap();
        doc.element_mut("Inventory").insert("count".into(), json!(0));
        assert_eq!(doc.element("Inventory"), Some(&json!({"count": 0})));
        assert!(doc.remove_element_data("Inventory"));
        assert!(!doc.remove_element_data("Inventory"));
    }

    #[test]
    fn object_entry_keeps_objects_and_replaces_scalars() {
        let mut map = Map::new();
        map.insert("kept".into(), json!({"a": 1}));
        map.insert("scalar".into(), json!([1, 2]));
        object_entry(&mut map, "kept").insert("b".into(), json!(2));
        assert!(object_entry(&mut map, "scalar").is_empty());
        assert_eq!(Value::Object(map), json!({"kept": {"a": 1, "b": 2}, "scalar": {}}));
    }

    #[test]
    fn non_objects_are_not_documents() {
        assert!(CharacterDocument::from_value(json!([1])).is_none());
        assert!(CharacterDocument::from_value(json!("x")).is_none());
    }
}
