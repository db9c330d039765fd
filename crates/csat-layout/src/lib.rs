#![forbid(unsafe_code)]

//! Layout store and commit rules for the editor grid.
//!
//! The store is the only shared mutable state of the interaction engine.
//! Grid sessions never touch it; the controller folds each finished gesture
//! through [`commit_placement`] and writes the result with a single
//! [`LayoutStore::merge`].

pub mod commit;
pub mod defaults;
pub mod store;

pub use commit::{CommitOutcome, PlacementDelta, commit_placement};
pub use defaults::default_layout;
pub use store::{
    GridLayout, LayoutError, LayoutIssue, LayoutStore, PlacementPatch, PlacementProblem,
};
