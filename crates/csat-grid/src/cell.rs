#![forbid(unsafe_code)]

//! Grid cell: one panel on the canvas plus its manipulation handles.
//!
//! A cell knows nothing about sessions. Pressing a handle sends a
//! [`GridIntent`] through the [`GridDispatch`] it was built with; the
//! controller decides what happens next.

use std::fmt;
use std::rc::Rc;

use csat_core::{Direction, GridArea, Placement};

/// Gesture start reported by a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridIntent {
    pub caller_id: String,
    /// Empty for a move.
    pub direction: Direction,
    /// Snapshot of the placement when the handle was pressed.
    pub initial_placement: Placement,
}

/// Upward channel from cells to the one controller.
#[derive(Clone)]
pub struct GridDispatch {
    sink: Rc<dyn Fn(GridIntent)>,
}

impl GridDispatch {
    pub fn new(sink: impl Fn(GridIntent) + 'static) -> Self {
        Self {
            sink: Rc::new(sink),
        }
    }

    /// Dispatch that drops every intent.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    pub fn send(&self, intent: GridIntent) {
        (self.sink)(intent);
    }

    /// Whether both handles feed the same sink.
    #[must_use]
    pub fn same_sink(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.sink, &other.sink)
    }
}

impl fmt::Debug for GridDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridDispatch").finish_non_exhaustive()
    }
}

/// One of the nine handles laid over an unlocked cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    UpLeft,
    Up,
    UpRight,
    Left,
    Center,
    Right,
    DownLeft,
    Down,
    DownRight,
}

impl Handle {
    /// Row-major order of the 3x3 handle matrix.
    pub const ALL: [Self; 9] = [
        Self::UpLeft,
        Self::Up,
        Self::UpRight,
        Self::Left,
        Self::Center,
        Self::Right,
        Self::DownLeft,
        Self::Down,
        Self::DownRight,
    ];

    /// Direction reported when this handle is pressed.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::UpLeft => Direction::UP_LEFT,
            Self::Up => Direction::UP,
            Self::UpRight => Direction::UP_RIGHT,
            Self::Left => Direction::LEFT,
            Self::Center => Direction::empty(),
            Self::Right => Direction::RIGHT,
            Self::DownLeft => Direction::DOWN_LEFT,
            Self::Down => Direction::DOWN,
            Self::DownRight => Direction::DOWN_RIGHT,
        }
    }

    /// CSS cursor shown over the handle.
    #[must_use]
    pub const fn cursor(self) -> &'static str {
        match self {
            Self::UpLeft => "nw-resize",
            Self::Up => "n-resize",
            Self::UpRight => "ne-resize",
            Self::Left => "w-resize",
            Self::Center => "move",
            Self::Right => "e-resize",
            Self::DownLeft => "sw-resize",
            Self::Down => "s-resize",
            Self::DownRight => "se-resize",
        }
    }

    #[must_use]
    pub const fn is_move(self) -> bool {
        matches!(self, Self::Center)
    }
}

/// Handle matrix rendered over an unlocked cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleOverlay {
    /// Title shown in the move handle.
    pub title: String,
    pub handles: [Handle; 9],
}

/// Rendered cell.
#[derive(Debug)]
pub struct CellView<C> {
    pub id: String,
    pub area: GridArea,
    /// `None` while the layout is locked.
    pub overlay: Option<HandleOverlay>,
    pub children: Rc<C>,
}

impl<C> Clone for CellView<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            area: self.area,
            overlay: self.overlay.clone(),
            children: Rc::clone(&self.children),
        }
    }
}

/// A panel at a placement, with children rendered inside it.
pub struct GridCell<C> {
    id: String,
    placement: Placement,
    children: Rc<C>,
    dispatch: GridDispatch,
}

impl<C: fmt::Debug> fmt::Debug for GridCell<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridCell")
            .field("id", &self.id)
            .field("placement", &self.placement)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl<C> GridCell<C> {
    pub fn new(
        id: impl Into<String>,
        placement: Placement,
        children: Rc<C>,
        dispatch: GridDispatch,
    ) -> Self {
        Self {
            id: id.into(),
            placement,
            children,
            dispatch,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn placement(&self) -> Placement {
        self.placement
    }

    #[must_use]
    pub fn children(&self) -> &Rc<C> {
        &self.children
    }

    /// Start a move gesture.
    pub fn start_move(&self) {
        self.send(Direction::empty());
    }

    /// Start a resize gesture grabbing `direction`.
    pub fn start_resize(&self, direction: Direction) {
        self.send(direction);
    }

    /// Pointer-down on `handle`.
    pub fn press(&self, handle: Handle) {
        self.send(handle.direction());
    }

    fn send(&self, direction: Direction) {
        self.dispatch.send(GridIntent {
            caller_id: self.id.clone(),
            direction,
            initial_placement: self.placement,
        });
    }

    /// Render the cell. A locked layout shows the children only.
    #[must_use]
    pub fn render(&self, locked: bool) -> CellView<C> {
        let overlay = (!locked).then(|| HandleOverlay {
            title: self.id.clone(),
            handles: Handle::ALL,
        });
        CellView {
            id: self.id.clone(),
            area: self.placement.grid_area(),
            overlay,
            children: Rc::clone(&self.children),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MemoKey {
    id: String,
    placement: Placement,
    children: usize,
    locked: bool,
}

/// Render cache for one cell.
///
/// Re-renders only when the cell's id, placement, children identity or lock
/// flag changed; edits elsewhere in the document leave it untouched.
#[derive(Debug)]
pub struct GridCellMemo<C> {
    last: Option<(MemoKey, CellView<C>)>,
    renders: u64,
}

impl<C> Default for GridCellMemo<C> {
    fn default() -> Self {
        Self {
            last: None,
            renders: 0,
        }
    }
}

impl<C> GridCellMemo<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached view, refreshed when the cell's identity changed.
    pub fn render(&mut self, cell: &GridCell<C>, locked: bool) -> &CellView<C> {
        let key = MemoKey {
            id: cell.id.clone(),
            placement: cell.placement,
            children: Rc::as_ptr(&cell.children) as *const () as usize,
            locked,
        };
        if self.last.as_ref().is_some_and(|(last, _)| *last != key) {
            self.last = None;
        }
        let renders = &mut self.renders;
        let (_, view) = self.last.get_or_insert_with(|| {
            *renders += 1;
            (key, cell.render(locked))
        });
        view
    }

    /// Number of real renders so far.
    #[must_use]
    pub const fn render_count(&self) -> u64 {
        self.renders
    }
}
