#![forbid(unsafe_code)]

//! Interaction sessions: pointer delta to grid-cell conversion.
//!
//! A session is opened when a handle is pressed and lives until the pointer
//! is released. It captures the pointer origin exactly once, at open time;
//! later pointer movement only changes the *current* position it is asked
//! about, never the origin.
//!
//! Sessions are pure: they compute previews and release deltas but never
//! touch the layout store. The controller owns wiring and commit.

use csat_core::{
    Direction, GridMetrics, HorizontalEdge, Placement, PointerPosition, VerticalEdge,
};
use csat_layout::PlacementDelta;

/// Session for a pure move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingSession {
    initial: Placement,
    origin: PointerPosition,
    metrics: GridMetrics,
}

impl MovingSession {
    #[must_use]
    pub const fn new(initial: Placement, origin: PointerPosition, metrics: GridMetrics) -> Self {
        Self {
            initial,
            origin,
            metrics,
        }
    }

    /// Snapped ghost for the pointer at `pointer`.
    #[must_use]
    pub fn preview(&self, pointer: PointerPosition) -> Placement {
        let cells = self.metrics.snap(self.origin, pointer);
        Placement {
            x: self.initial.x.saturating_add(cells.dx),
            y: self.initial.y.saturating_add(cells.dy),
            ..self.initial
        }
    }

    /// Delta reported on release at `pointer`. A move never resizes.
    #[must_use]
    pub fn release_delta(&self, pointer: PointerPosition) -> PlacementDelta {
        let cells = self.metrics.snap(self.origin, pointer);
        PlacementDelta::translate(cells.dx, cells.dy)
    }
}

/// Session for an edge or corner resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizingSession {
    direction: Direction,
    initial: Placement,
    origin: PointerPosition,
    metrics: GridMetrics,
}

impl ResizingSession {
    #[must_use]
    pub const fn new(
        direction: Direction,
        initial: Placement,
        origin: PointerPosition,
        metrics: GridMetrics,
    ) -> Self {
        Self {
            direction,
            initial,
            origin,
            metrics,
        }
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Grid delta for the pointer at `pointer`.
    ///
    /// Dragging the top or left edge moves the origin and grows the span by
    /// the opposite amount; the bottom or right edge only changes the span.
    #[must_use]
    pub fn delta(&self, pointer: PointerPosition) -> PlacementDelta {
        let cells = self.metrics.snap(self.origin, pointer);
        let mut delta = PlacementDelta::default();
        match self.direction.vertical() {
            Some(VerticalEdge::Top) => {
                delta.dy = cells.dy;
                delta.dh = cells.dy.saturating_neg();
            }
            Some(VerticalEdge::Bottom) => delta.dh = cells.dy,
            None => {}
        }
        match self.direction.horizontal() {
            Some(HorizontalEdge::Left) => {
                delta.dx = cells.dx;
                delta.dw = cells.dx.saturating_neg();
            }
            Some(HorizontalEdge::Right) => delta.dw = cells.dx,
            None => {}
        }
        delta
    }

    /// Snapped ghost for the pointer at `pointer`.
    ///
    /// An axis whose origin would leave the grid shows its initial origin and
    /// span instead. This guard is for display only; the commit step applies
    /// its own.
    #[must_use]
    pub fn preview(&self, pointer: PointerPosition) -> Placement {
        let delta = self.delta(pointer);
        let mut ghost = Placement {
            x: self.initial.x.saturating_add(delta.dx),
            y: self.initial.y.saturating_add(delta.dy),
            w: self.initial.w.saturating_add(delta.dw),
            h: self.initial.h.saturating_add(delta.dh),
        };
        if ghost.x < 1 {
            ghost.x = self.initial.x;
            ghost.w = self.initial.w;
        }
        if ghost.y < 1 {
            ghost.y = self.initial.y;
            ghost.h = self.initial.h;
        }
        ghost
    }

    /// Delta reported on release at `pointer`; untouched axes are zero.
    #[must_use]
    pub fn release_delta(&self, pointer: PointerPosition) -> PlacementDelta {
        self.delta(pointer)
    }
}

/// Either session mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Session {
    Moving(MovingSession),
    Resizing(ResizingSession),
}

impl Session {
    /// Open the session matching `direction`: empty moves, anything else resizes.
    #[must_use]
    pub fn open(
        direction: Direction,
        initial: Placement,
        origin: PointerPosition,
        metrics: GridMetrics,
    ) -> Self {
        if direction.is_move() {
            Self::Moving(MovingSession::new(initial, origin, metrics))
        } else {
            Self::Resizing(ResizingSession::new(direction, initial, origin, metrics))
        }
    }

    /// Direction this session was opened with.
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Self::Moving(_) => Direction::empty(),
            Self::Resizing(session) => session.direction(),
        }
    }

    #[must_use]
    pub fn preview(&self, pointer: PointerPosition) -> Placement {
        match self {
            Self::Moving(session) => session.preview(pointer),
            Self::Resizing(session) => session.preview(pointer),
        }
    }

    #[must_use]
    pub fn release_delta(&self, pointer: PointerPosition) -> PlacementDelta {
        match self {
            Self::Moving(session) => session.release_delta(pointer),
            Self::Resizing(session) => session.release_delta(pointer),
        }
    }
}
