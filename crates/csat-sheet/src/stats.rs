#![forbid(unsafe_code)]

//! Derived numbers shown on the sheet.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pounds of carrying capacity per point of strength.
pub const CARRY_PER_STRENGTH: f64 = 15.0;

/// Ability modifier text: `floor((value - 10) / 2) + other`.
///
/// Positive results carry a leading `+`; zero and negatives do not.
#[must_use]
pub fn stat_modifier(value: i64, other: i64) -> String {
    let modifier = (value - 10).div_euclid(2) + other;
    if modifier > 0 {
        format!("+{modifier}")
    } else {
        modifier.to_string()
    }
}

/// [`stat_modifier`] over raw document values.
///
/// A non-numeric score yields `"0"`; a non-numeric bonus counts as zero.
#[must_use]
pub fn stat_modifier_of(value: &Value, other: &Value) -> String {
    let Some(value) = value.as_f64() else {
        return "0".to_string();
    };
    let other = other.as_f64().unwrap_or(0.0);
    let modifier = ((value - 10.0) / 2.0).floor() + other;
    let text = format_number(modifier);
    if modifier > 0.0 { format!("+{text}") } else { text }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One inventory line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryItem {
    pub name: String,
    /// Weight of a single unit in pounds.
    pub wght: f64,
    pub qty: f64,
}

/// Inventory panel data: `{"count": n, "dataSet": {id: item}}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Inventory {
    pub count: u64,
    pub data_set: BTreeMap<String, InventoryItem>,
}

impl Inventory {
    /// Read an inventory from panel data. Malformed data reads as empty.
    #[must_use]
    pub fn from_element(data: &Value) -> Self {
        Self::deserialize(data).unwrap_or_default()
    }

    /// Total carried weight, `sum(wght * qty)`.
    #[must_use]
    pub fn carried_weight(&self) -> f64 {
        self.data_set.values().map(|item| item.wght * item.qty).sum()
    }
}

/// Weight at which a character with `strength` becomes encumbered.
#[must_use]
pub fn encumbrance_limit(strength: f64) -> f64 {
    strength * CARRY_PER_STRENGTH
}
