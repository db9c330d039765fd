#![forbid(unsafe_code)]

//! Dispatch reducer for the character document.
//!
//! Actions arrive as JSON objects tagged by `"type"`. [`dispatch`] never
//! fails: an unknown type, a malformed payload or an action that cannot
//! apply is logged and the input document comes back unchanged.

use std::fmt;

use csat_core::Placement;
use csat_layout::{LayoutStore, PlacementPatch};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::document::{CharacterDocument, object_entry};
use crate::validation::validate;

/// Key of one entry in a panel's `dataSet`. Hosts send numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ItemKey {
    Number(i64),
    Text(String),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Every action the reducer understands.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SheetAction {
    /// Fill missing fields with defaults.
    Validate,
    #[serde(rename_all = "camelCase")]
    ChangeProficiency { proficiency: String, new_value: Value },
    /// Shallow-merge into the root, or into `fieldName` when given.
    #[serde(rename_all = "camelCase")]
    ChangeTextField {
        merge_object: Map<String, Value>,
        #[serde(default)]
        field_name: String,
    },
    /// Replace the whole document.
    LoadFromDisk { data: Value },
    GridMerge { id: String, value: PlacementPatch },
    AddElement {
        id: String,
        #[serde(default)]
        placement: Option<Placement>,
        #[serde(default)]
        data: Option<Map<String, Value>>,
    },
    RemoveElement { id: String },
    /// Shallow-merge into one panel's data.
    ChangeGridElement { id: String, merge: Map<String, Value> },
    #[serde(rename_all = "camelCase")]
    AddSetItem { id: String, item_id: ItemKey, item: Value },
    #[serde(rename_all = "camelCase")]
    RemoveSetItem { id: String, item_id: ItemKey },
    #[serde(rename_all = "camelCase")]
    ReplaceSetItem { id: String, item_id: ItemKey, replacement: Value },
}

impl SheetAction {
    /// Decode an action object.
    pub fn from_value(action: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(action)
    }

    /// Wire name of this action.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::ChangeProficiency { .. } => "change-proficiency",
            Self::ChangeTextField { .. } => "change-text-field",
            Self::LoadFromDisk { .. } => "load-from-disk",
            Self::GridMerge { .. } => "grid-merge",
            Self::AddElement { .. } => "add-element",
            Self::RemoveElement { .. } => "remove-element",
            Self::ChangeGridElement { .. } => "change-grid-element",
            Self::AddSetItem { .. } => "add-set-item",
            Self::RemoveSetItem { .. } => "remove-set-item",
            Self::ReplaceSetItem { .. } => "replace-set-item",
        }
    }
}

/// Why an action left the document unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRejected {
    NotADocument,
    IdUnavailable { id: String },
    UnknownElement { id: String },
    UnknownItem { id: String, item: String },
}

impl fmt::Display for ActionRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotADocument => f.write_str("payload is not a JSON object"),
            Self::IdUnavailable { id } => write!(f, "element id is empty or taken: {id:?}"),
            Self::UnknownElement { id } => write!(f, "no element with id: {id}"),
            Self::UnknownItem { id, item } => write!(f, "element {id} has no item {item}"),
        }
    }
}

impl std::error::Error for ActionRejected {}

/// Apply a raw action. Never fails; see the module docs.
#[must_use]
pub fn dispatch(doc: &CharacterDocument, action: &Value) -> CharacterDocument {
    let decoded = match SheetAction::from_value(action) {
        Ok(decoded) => decoded,
        Err(err) => {
            let kind = action.get("type").and_then(Value::as_str).unwrap_or("<missing>");
            error!(action_type = kind, error = %err, "incorrect action passed to the character reducer");
            return doc.clone();
        }
    };
    let kind = decoded.kind();
    match apply(doc, decoded) {
        Ok(next) => {
            debug!(action_type = kind, "character action applied");
            next
        }
        Err(rejected) => {
            warn!(action_type = kind, reason = %rejected, "character action rejected");
            doc.clone()
        }
    }
}

/// Apply a decoded action.
pub fn apply(doc: &CharacterDocument, action: SheetAction) -> Result<CharacterDocument, ActionRejected> {
    let mut next = doc.clone();
    match action {
        SheetAction::Validate => return Ok(validate(doc)),
        SheetAction::ChangeProficiency { proficiency, new_value } => {
            object_entry(next.as_map_mut(), "proficiencies").insert(proficiency, new_value);
        }
        SheetAction::ChangeTextField { merge_object, field_name } => {
            let target = if field_name.is_empty() {
                next.as_map_mut()
            } else {
                object_entry(next.as_map_mut(), &field_name)
            };
            target.extend(merge_object);
        }
        SheetAction::LoadFromDisk { data } => {
            return CharacterDocument::from_value(data).ok_or(ActionRejected::NotADocument);
        }
        SheetAction::GridMerge { id, value } => next.merge(&id, value),
        SheetAction::AddElement { id, placement, data } => {
            let layout = next.layout();
            if !layout.is_id_available(&id) {
                return Err(ActionRejected::IdUnavailable { id });
            }
            let placement =
                placement.unwrap_or_else(|| Placement::new(1, layout.lowest_free_row().max(1), 1, 1));
            next.merge(&id, PlacementPatch::full(placement));
            let element = next.element_mut(&id);
            if let Some(data) = data {
                element.extend(data);
            }
        }
        SheetAction::RemoveElement { id } => {
            if !next.remove_placement(&id) {
                return Err(ActionRejected::UnknownElement { id });
            }
            next.remove_element_data(&id);
        }
        SheetAction::ChangeGridElement { id, merge } => {
            existing_element(&mut next, &id)?.extend(merge);
        }
        SheetAction::AddSetItem { id, item_id, item } => {
            let element = existing_element(&mut next, &id)?;
            object_entry(element, "dataSet").insert(item_id.to_string(), item);
        }
        SheetAction::RemoveSetItem { id, item_id } => {
            let key = item_id.to_string();
            let element = existing_element(&mut next, &id)?;
            if object_entry(element, "dataSet").remove(&key).is_none() {
                return Err(ActionRejected::UnknownItem { id, item: key });
            }
        }
        SheetAction::ReplaceSetItem { id, item_id, replacement } => {
            let key = item_id.to_string();
            let element = existing_element(&mut next, &id)?;
            match object_entry(element, "dataSet").get_mut(&key) {
                Some(slot) => *slot = replacement,
                None => return Err(ActionRejected::UnknownItem { id, item: key }),
            }
        }
    }
    Ok(next)
}

// Panel data for an id that is on the grid.
fn existing_element<'a>(
    doc: &'a mut CharacterDocument,
    id: &str,
) -> Result<&'a mut Map<String, Value>, ActionRejected> {
    if LayoutStore::get(doc, id).is_none() {
        return Err(ActionRejected::UnknownElement { id: id.to_string() });
    }
    Ok(doc.element_mut(id))
}
