#![forbid(unsafe_code)]

//! Core: grid geometry, observable values and host input plumbing.
//!
//! # Role in CSAT
//! `csat-core` is the leaf layer of the sheet editor. It owns the coordinate
//! model every other crate speaks, plus the two host-facing feeds the
//! interaction engine consumes.
//!
//! # Primary responsibilities
//! - **Geometry**: [`Placement`], [`GridArea`] and cell snapping via [`GridMetrics`].
//! - **Direction**: resize edge codes ([`Direction`]).
//! - **Observable**: shared values with RAII [`Subscription`] guards.
//! - **Pointer**: the ambient pointer position and one-shot release listeners.
//! - **Host**: named JSON event bus ([`HostEventBus`]).

pub mod direction;
pub mod geometry;
pub mod host;
pub mod observable;
pub mod pointer;

pub use direction::{Direction, HorizontalEdge, ParseDirectionError, VerticalEdge};
pub use geometry::{
    CellDelta, GridArea, GridLine, GridMetrics, ParseGridAreaError, Placement, SPAN_TO_END,
    placement_from_rect,
};
pub use host::{DRAW_GHOST_EVENT, HostEventBus, Unlisten};
pub use observable::{Observable, Subscription};
pub use pointer::{PointerHub, PointerPosition, PointerRelease, ReleaseKind, ReleaseListener};
