#![forbid(unsafe_code)]

//! Snap-to-grid move and resize engine.
//!
//! # Role in CSAT
//! Cells report gestures through a [`GridDispatch`]; the [`GridController`]
//! opens a [`Session`] for the gesture, tracks the pointer hub to publish a
//! snapped ghost, and on release folds the delta into the layout store.
//!
//! The [`ExternalGhost`] overlay is fed by the host and has a lifecycle of its
//! own.

pub mod cell;
pub mod controller;
pub mod ghost;
pub mod session;

pub use cell::{CellView, GridCell, GridCellMemo, GridDispatch, GridIntent, Handle, HandleOverlay};
pub use controller::{
    CommitRecord, ControllerView, GridController, GridControllerState, ReleaseIgnoredReason,
    ReleaseOutcome, SnappedGhost,
};
pub use ghost::{ExternalGhost, GhostStyle};
pub use session::{MovingSession, ResizingSession, Session};
