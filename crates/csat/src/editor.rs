#![forbid(unsafe_code)]

//! Composition root: one character document shared by the reducer, the
//! grid controller and persistence.
//!
//! The document lives in a single `Rc<RefCell<_>>`. Reducer actions swap in
//! the next document; the grid controller merges commits into the same
//! cell. Nothing else holds a copy.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use csat_core::{
    Direction, GridMetrics, HostEventBus, Observable, Placement, PointerHub, PointerPosition,
    Unlisten,
};
use csat_grid::{
    CellView, CommitRecord, GridCell, GridCellMemo, GridController, ReleaseIgnoredReason,
    ReleaseOutcome,
};
use csat_layout::LayoutStore;
use csat_sheet::{
    CACHE_KEY, CharacterDocument, LocalCache, SheetAction, apply, document_to_string,
    load_document, recover_document, save_document,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{CsatError, Result};

/// Host event carrying a context switch name as its payload.
pub const EDITOR_CONTEXT_EVENT: &str = "change_editor_context";

/// Toggles driven by the host's context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditorMode {
    pub read_only: bool,
    pub layout_locked: bool,
    pub editing_elements: bool,
}

impl EditorMode {
    /// Flip the flag named by `switch`. Returns false for an unknown name.
    pub fn apply_switch(&mut self, switch: &str) -> bool {
        let flag = match switch {
            "readOnly-switch" => &mut self.read_only,
            "layoutEdit-switch" => &mut self.layout_locked,
            "elementEdit-switch" => &mut self.editing_elements,
            _ => return false,
        };
        *flag = !*flag;
        true
    }
}

/// The running editor.
pub struct Editor {
    document: Rc<RefCell<CharacterDocument>>,
    pointer: PointerHub,
    host: HostEventBus,
    grid: GridController<CharacterDocument>,
    mode: Observable<EditorMode>,
    cache: Box<dyn LocalCache>,
    children: BTreeMap<String, Rc<Value>>,
    memos: BTreeMap<String, GridCellMemo<Value>>,
    _context: Unlisten,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("mode", &self.mode.get())
            .field("grid", &self.grid)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Boot from the cached document, or the default one.
    pub fn boot(cache: Box<dyn LocalCache>, metrics: GridMetrics) -> Result<Self> {
        let document = recover_document(cache.as_ref())?;
        Ok(Self::with_document(document, cache, metrics))
    }

    pub fn with_document(
        document: CharacterDocument,
        cache: Box<dyn LocalCache>,
        metrics: GridMetrics,
    ) -> Self {
        let document = Rc::new(RefCell::new(document));
        let pointer = PointerHub::new();
        let host = HostEventBus::new();
        let grid = GridController::with_shared_store(Rc::clone(&document), pointer.clone(), metrics);
        grid.mount(&host);

        let mode = Observable::new(EditorMode::default());
        let context = host.listen(EDITOR_CONTEXT_EVENT, {
            let mode = mode.clone();
            move |payload: &Value| {
                let Some(switch) = payload.as_str() else {
                    warn!(?payload, "editor context payload is not a string");
                    return;
                };
                let mut next = mode.get();
                if next.apply_switch(switch) {
                    mode.set(next);
                    debug!(switch, "editor context switched");
                } else {
                    warn!(switch, "unknown editor context switch");
                }
            }
        });

        Self {
            document,
            pointer,
            host,
            grid,
            mode,
            cache,
            children: BTreeMap::new(),
            memos: BTreeMap::new(),
            _context: context,
        }
    }

    /// Snapshot of the current document.
    #[must_use]
    pub fn document(&self) -> CharacterDocument {
        self.document.borrow().clone()
    }

    #[must_use]
    pub fn mode(&self) -> EditorMode {
        self.mode.get()
    }

    pub fn set_mode(&self, mode: EditorMode) {
        self.mode.set(mode);
    }

    #[must_use]
    pub fn host(&self) -> &HostEventBus {
        &self.host
    }

    #[must_use]
    pub fn pointer(&self) -> &PointerHub {
        &self.pointer
    }

    #[must_use]
    pub fn grid(&self) -> &GridController<CharacterDocument> {
        &self.grid
    }

    /// Render every panel on the grid, reusing cached views where nothing changed.
    pub fn cells(&mut self) -> Vec<CellView<Value>> {
        let locked = self.mode.get().layout_locked;
        let dispatch = self.grid.dispatcher();
        let doc = self.document.borrow();
        let layout = doc.layout();

        self.memos.retain(|id, _| LayoutStore::get(&layout, id).is_some());
        self.children.retain(|id, _| LayoutStore::get(&layout, id).is_some());

        let mut views = Vec::with_capacity(layout.len());
        for (id, placement) in layout.iter() {
            let data = doc.element(id).cloned().unwrap_or(Value::Null);
            let children = match self.children.get(id) {
                Some(current) if **current == data => Rc::clone(current),
                _ => {
                    let fresh = Rc::new(data);
                    self.children.insert(id.to_string(), Rc::clone(&fresh));
                    fresh
                }
            };
            let cell = GridCell::new(id, placement, children, dispatch.clone());
            let memo = self.memos.entry(id.to_string()).or_default();
            views.push(memo.render(&cell, locked).clone());
        }
        views
    }

    /// Apply a raw reducer action.
    ///
    /// Unlike the bare reducer, a rejected or malformed action is reported.
    /// A read-only sheet accepts only `validate` and `load-from-disk`.
    pub fn dispatch(&self, action: &Value) -> Result<()> {
        let decoded = SheetAction::from_value(action)?;
        let allowed_read_only = matches!(decoded, SheetAction::Validate | SheetAction::LoadFromDisk { .. });
        if self.mode.get().read_only && !allowed_read_only {
            return Err(CsatError::ReadOnly);
        }
        let kind = decoded.kind();
        let next = apply(&self.document.borrow(), decoded)?;
        *self.document.borrow_mut() = next;
        debug!(action_type = kind, "editor action applied");
        Ok(())
    }

    /// Add a panel below everything else. Returns where it landed.
    pub fn add_element(&self, id: &str, data: Option<Value>) -> Result<Placement> {
        let mut action = serde_json::json!({"type": "add-element", "id": id});
        if let Some(data) = data {
            action["data"] = data;
        }
        self.dispatch(&action)?;
        self.placement(id)
    }

    pub fn remove_element(&self, id: &str) -> Result<()> {
        self.dispatch(&serde_json::json!({"type": "remove-element", "id": id}))
    }

    pub fn placement(&self, id: &str) -> Result<Placement> {
        LayoutStore::get(&*self.document.borrow(), id)
            .ok_or_else(|| CsatError::UnknownPanel { id: id.to_string() })
    }

    /// Drive one full pointer gesture on panel `id`: grab it by `direction`
    /// (empty for a move), move by (`dx_px`, `dy_px`) and release the mouse.
    pub fn drive_gesture(
        &self,
        id: &str,
        direction: Direction,
        dx_px: f64,
        dy_px: f64,
    ) -> Result<CommitRecord> {
        let mode = self.mode.get();
        if mode.read_only {
            return Err(CsatError::ReadOnly);
        }
        if mode.layout_locked {
            return Err(CsatError::LayoutLocked);
        }
        let placement = self.placement(id)?;
        let start = self.pointer.position();
        let cell = GridCell::new(id, placement, Rc::new(()), self.grid.dispatcher());
        if direction.is_move() {
            cell.start_move();
        } else {
            cell.start_resize(direction);
        }
        let end = PointerPosition::new(start.x + dx_px, start.y + dy_px);
        self.pointer.move_to(end);
        self.pointer.mouse_up(end);

        match self.grid.last_outcome() {
            Some(ReleaseOutcome::Committed(record)) => Ok(record),
            Some(ReleaseOutcome::Ignored(reason)) => Err(CsatError::NotCommitted {
                id: id.to_string(),
                reason,
            }),
            None => Err(CsatError::NotCommitted {
                id: id.to_string(),
                reason: ReleaseIgnoredReason::NoActiveSession,
            }),
        }
    }

    /// Write `characterData.json` into `dir`.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        if !dir.is_dir() {
            return Err(CsatError::MissingPath {
                path: dir.to_path_buf(),
            });
        }
        Ok(save_document(&self.document.borrow(), dir)?)
    }

    /// Load a user-picked file. `None` means the picker was dismissed.
    ///
    /// Returns whether a document was loaded.
    pub fn load(&mut self, path: Option<&Path>) -> Result<bool> {
        let loaded = load_document(path, self.cache.as_mut(), &self.document.borrow())?;
        match loaded {
            Some(next) => {
                self.grid.cancel();
                *self.document.borrow_mut() = next;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Write the working document to the local cache so the next boot resumes it.
    pub fn persist(&mut self) -> Result<()> {
        let text = document_to_string(&self.document.borrow())?;
        self.cache.set(CACHE_KEY, &text)?;
        Ok(())
    }

    pub fn clear_cache(&mut self) -> Result<()> {
        self.cache.clear()?;
        info!("local cache cleared");
        Ok(())
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.grid.unmount();
    }
}
