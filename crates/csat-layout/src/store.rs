#![forbid(unsafe_code)]

//! Layout store: panel id to committed [`Placement`].

use std::collections::BTreeMap;
use std::fmt;

use csat_core::Placement;
use serde::{Deserialize, Serialize};

/// Partial placement update. Absent fields keep their committed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlacementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<i32>,
}

impl PlacementPatch {
    /// Patch setting all four fields, as every manipulation commit does.
    #[must_use]
    pub const fn full(placement: Placement) -> Self {
        Self {
            x: Some(placement.x),
            y: Some(placement.y),
            w: Some(placement.w),
            h: Some(placement.h),
        }
    }

    /// Overlay this patch on `base`.
    #[must_use]
    pub fn apply_to(self, base: Placement) -> Placement {
        Placement {
            x: self.x.unwrap_or(base.x),
            y: self.y.unwrap_or(base.y),
            w: self.w.unwrap_or(base.w),
            h: self.h.unwrap_or(base.h),
        }
    }
}

impl From<Placement> for PlacementPatch {
    fn from(placement: Placement) -> Self {
        Self::full(placement)
    }
}

/// Storage seam between the grid engine and whatever owns the layout.
///
/// Only the controller's commit step calls [`LayoutStore::merge`].
pub trait LayoutStore {
    /// Committed placement for `id`.
    fn get(&self, id: &str) -> Option<Placement>;

    /// Merge `patch` into the placement stored under `id`.
    fn merge(&mut self, id: &str, patch: PlacementPatch);
}

/// Map-backed layout store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridLayout {
    entries: BTreeMap<String, Placement>,
}

impl GridLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of panels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Panels in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Placement)> + '_ {
        self.entries.iter().map(|(id, p)| (id.as_str(), *p))
    }

    /// Whether `id` is free for a new panel.
    #[must_use]
    pub fn is_id_available(&self, id: &str) -> bool {
        !id.is_empty() && !self.entries.contains_key(id)
    }

    /// First row below every panel (`max(y + h)`), or 0 for an empty layout.
    ///
    /// New panels are dropped here so they never overlap existing ones.
    #[must_use]
    pub fn lowest_free_row(&self) -> i32 {
        self.entries
            .values()
            .map(Placement::row_below)
            .max()
            .unwrap_or(0)
    }

    /// Add a new panel.
    pub fn insert(&mut self, id: &str, placement: Placement) -> Result<(), LayoutError> {
        if id.is_empty() {
            return Err(LayoutError::EmptyId);
        }
        if self.entries.contains_key(id) {
            return Err(LayoutError::DuplicateId { id: id.to_string() });
        }
        self.entries.insert(id.to_string(), placement);
        Ok(())
    }

    /// Remove a panel, returning its last placement.
    pub fn remove(&mut self, id: &str) -> Result<Placement, LayoutError> {
        self.entries
            .remove(id)
            .ok_or_else(|| LayoutError::UnknownId { id: id.to_string() })
    }

    /// Collect placements that break the committed-layout invariant.
    ///
    /// The end sentinel is accepted for spans; everything else must be >= 1.
    #[must_use]
    pub fn validate(&self) -> Vec<LayoutIssue> {
        self.entries
            .iter()
            .filter_map(|(id, p)| {
                validate_placement(*p).map(|problem| LayoutIssue {
                    id: id.clone(),
                    placement: *p,
                    problem,
                })
            })
            .collect()
    }
}

impl FromIterator<(String, Placement)> for GridLayout {
    fn from_iter<I: IntoIterator<Item = (String, Placement)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl LayoutStore for GridLayout {
    fn get(&self, id: &str) -> Option<Placement> {
        self.entries.get(id).copied()
    }

    fn merge(&mut self, id: &str, patch: PlacementPatch) {
        let entry = self.entries.entry(id.to_string()).or_default();
        *entry = patch.apply_to(*entry);
    }
}

/// What is wrong with a stored placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementProblem {
    OriginOutsideGrid,
    EmptySpan,
}

/// One invariant violation found by [`GridLayout::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutIssue {
    pub id: String,
    pub placement: Placement,
    pub problem: PlacementProblem,
}

fn validate_placement(p: Placement) -> Option<PlacementProblem> {
    if !p.has_valid_origin() {
        return Some(PlacementProblem::OriginOutsideGrid);
    }
    let span_ok = |span: i32| span >= 1 || span == csat_core::SPAN_TO_END;
    if !span_ok(p.w) || !span_ok(p.h) {
        return Some(PlacementProblem::EmptySpan);
    }
    None
}

/// Layout mutation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    EmptyId,
    DuplicateId { id: String },
    UnknownId { id: String },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => f.write_str("panel id must not be empty"),
            Self::DuplicateId { id } => write!(f, "panel id already in use: {id}"),
            Self::UnknownId { id } => write!(f, "no panel with id: {id}"),
        }
    }
}

impl std::error::Error for LayoutError {}
