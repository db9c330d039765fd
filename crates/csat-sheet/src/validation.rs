#![forbid(unsafe_code)]

//! Default filling for character documents.

use serde_json::{Map, Value, json};

use crate::document::{CharacterDocument, GRID_KEY, object_entry};

/// Primary skill keys, in sheet order.
pub const PRIMARY_SKILLS: [&str; 6] = ["str", "dex", "con", "int", "wis", "cha"];

/// Score given to a missing primary skill.
pub const DEFAULT_SKILL_SCORE: i64 = 10;

const TEXT_DEFAULTS: [(&str, &str); 5] = [
    ("characterName", "Lorem"),
    ("characterClass", "Ispum"),
    ("characterLevel", "Dolor"),
    ("characterBackground", "Sit"),
    ("characterRace", "Amet"),
];

/// Copy of `doc` with every missing or null field filled in.
///
/// Present values are never overwritten, except a non-numeric
/// `proficiencyModifier` and non-object containers, which are replaced.
#[must_use]
pub fn validate(doc: &CharacterDocument) -> CharacterDocument {
    let mut out = doc.clone();
    let root = out.as_map_mut();

    for (key, fallback) in TEXT_DEFAULTS {
        fill(root, key, json!(fallback));
    }

    let skills = object_entry(root, "primarySkills");
    for skill in PRIMARY_SKILLS {
        if !skills.contains_key(skill) {
            skills.insert(skill.into(), json!(DEFAULT_SKILL_SCORE));
        }
    }

    object_entry(root, "proficiencies");
    if !root.get("proficiencyModifier").is_some_and(Value::is_number) {
        root.insert("proficiencyModifier".into(), json!(2));
    }

    let saves = object_entry(root, "deathSavingThrows");
    fill(saves, "successes", json!(0));
    fill(saves, "failures", json!(0));

    fill(root, "armorClass", json!(10));
    fill(root, "initiative", json!("+0"));
    fill(root, "hitDice", json!("0d0"));
    fill(root, "hitDiceTotal", json!("0"));
    fill(root, "exhaustion", json!(0));

    if !root.get(GRID_KEY).is_some_and(Value::is_object) {
        out.set_layout(&csat_layout::default_layout());
    }
    out
}

// Set `key` when it is missing or null.
fn fill(map: &mut Map<String, Value>, key: &str, fallback: Value) {
    let slot = map.entry(key.to_string()).or_insert(Value::Null);
    if slot.is_null() {
        *slot = fallback;
    }
}
