#![forbid(unsafe_code)]

//! Character document, reducer and persistence.
//!
//! # Role in CSAT
//! `csat-sheet` owns the data the panels show. The document doubles as the
//! grid's [`LayoutStore`](csat_layout::LayoutStore): placements live under its
//! `"grid"` key, so a commit from the grid engine is an ordinary document
//! edit and is saved with everything else.

pub mod action;
pub mod cache;
pub mod document;
pub mod stats;
pub mod storage;
pub mod validation;

pub use action::{ActionRejected, ItemKey, SheetAction, apply, dispatch};
pub use cache::{FileCache, LocalCache, MemoryCache};
pub use document::{CharacterDocument, ELEMENTS_KEY, GRID_KEY, default_document};
pub use stats::{
    CARRY_PER_STRENGTH, Inventory, InventoryItem, encumbrance_limit, stat_modifier,
    stat_modifier_of,
};
pub use storage::{
    CACHE_KEY, DOCUMENT_FILE_NAME, StorageError, document_to_string, load_document,
    parse_document, recover_document, save_document,
};
pub use validation::{DEFAULT_SKILL_SCORE, PRIMARY_SKILLS, validate};
