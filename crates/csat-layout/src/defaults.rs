#![forbid(unsafe_code)]

//! Panel arrangement shipped with a fresh character sheet.

use csat_core::{Placement, SPAN_TO_END};

use crate::store::GridLayout;

const DEFAULT_PANELS: [(&str, Placement); 12] = [
    ("MagicalButton1", Placement::new(1, 23, 1, 2)),
    ("MagicalButton2", Placement::new(2, 23, 1, 2)),
    ("MagicalButton3", Placement::new(3, 23, 1, 2)),
    ("GeneralInfo", Placement::new(1, 1, SPAN_TO_END, 3)),
    ("PrimarySkills", Placement::new(1, 4, 2, 18)),
    ("SecondarySkills", Placement::new(3, 4, 3, 18)),
    ("BattleStats", Placement::new(6, 4, 3, 4)),
    ("HealthStats", Placement::new(9, 4, SPAN_TO_END, 4)),
    ("DeathSavesTracker", Placement::new(6, 8, 3, 3)),
    ("HitdiceTracker", Placement::new(9, 8, 2, 3)),
    ("ExhaustionTracker", Placement::new(11, 8, SPAN_TO_END, 3)),
    ("SavingThrows", Placement::new(7, 11, 2, 3)),
];

/// Default panel layout.
#[must_use]
pub fn default_layout() -> GridLayout {
    DEFAULT_PANELS
        .iter()
        .map(|(id, placement)| ((*id).to_string(), *placement))
        .collect()
}
