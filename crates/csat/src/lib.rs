#![forbid(unsafe_code)]

//! CSAT character sheet editor.
//!
//! # Role in CSAT
//! The composition root. [`Editor`] wires the character document from
//! `csat-sheet` into the `csat-grid` controller as its layout store, feeds it
//! pointer input through a `csat-core` pointer hub and mounts the external
//! ghost on the host event bus. The `csat` binary drives it from the
//! command line.

pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod logging;

pub use cli::{Cli, Commands, execute, run, run_from_env};
pub use config::{ConfigError, EditorConfig, LogConfig, StorageConfig};
pub use editor::{EDITOR_CONTEXT_EVENT, Editor, EditorMode};
pub use error::{CsatError, Result};
