#![forbid(unsafe_code)]

//! Commit-time arithmetic for finished gestures.
//!
//! A gesture reports a [`PlacementDelta`]; [`commit_placement`] folds it into
//! the panel's *current* placement and enforces the committed-layout
//! invariant:
//!
//! - spans never drop below 1, so an end sentinel becomes a 1-cell span,
//! - an origin below 1 discards that axis entirely: origin and span both
//!   keep their current values.

use csat_core::Placement;
use tracing::debug;

/// Grid-cell change produced by a gesture. Missing axes are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlacementDelta {
    pub dx: i32,
    pub dy: i32,
    pub dw: i32,
    pub dh: i32,
}

impl PlacementDelta {
    /// Delta of a pure move.
    #[must_use]
    pub const fn translate(dx: i32, dy: i32) -> Self {
        Self { dx, dy, dw: 0, dh: 0 }
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0 && self.dw == 0 && self.dh == 0
    }
}

/// Result of folding a delta into a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitOutcome {
    pub placement: Placement,
    /// The x axis was rejected because the origin left the grid.
    pub x_reverted: bool,
    /// The y axis was rejected because the origin left the grid.
    pub y_reverted: bool,
}

/// Fold `delta` into `current`.
#[must_use]
pub fn commit_placement(current: Placement, delta: PlacementDelta) -> CommitOutcome {
    let mut w = commit_span(current.w, delta.dw);
    let mut h = commit_span(current.h, delta.dh);

    let mut x = current.x.saturating_add(delta.dx);
    let x_reverted = x < 1;
    if x_reverted {
        x = current.x;
        w = current.w;
    }

    let mut y = current.y.saturating_add(delta.dy);
    let y_reverted = y < 1;
    if y_reverted {
        y = current.y;
        h = current.h;
    }

    if x_reverted || y_reverted {
        debug!(?current, ?delta, x_reverted, y_reverted, "origin left the grid, axis reverted");
    }

    CommitOutcome {
        placement: Placement { x, y, w, h },
        x_reverted,
        y_reverted,
    }
}

fn commit_span(span: i32, delta: i32) -> i32 {
    span.saturating_add(delta).max(1)
}
