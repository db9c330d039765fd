#![forbid(unsafe_code)]

//! Host pointer feed.
//!
//! [`PointerHub`] is fed by the host environment and read by interaction
//! sessions. It provides:
//! - the current pointer position as an [`Observable`] (the ambient position
//!   provider), and
//! - one-shot release listeners covering both `mouseup` and `touchend`.
//!
//! A release listener fires at most once no matter how many terminal events
//! arrive, and never after its [`ReleaseListener`] guard was dropped.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::observable::{Observable, Subscription};

/// Pointer coordinate pair in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for PointerPosition {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Which terminal event ended the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseKind {
    MouseUp,
    TouchEnd,
}

/// Terminal pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRelease {
    pub kind: ReleaseKind,
    pub position: PointerPosition,
}

struct ReleaseSlot {
    fired: Cell<bool>,
    callback: Box<dyn Fn(PointerRelease)>,
}

impl ReleaseSlot {
    fn fire(&self, release: PointerRelease) -> bool {
        if self.fired.replace(true) {
            return false;
        }
        (self.callback)(release);
        true
    }
}

/// Guard for a one-shot release listener.
///
/// Dropping it unregisters the listener on both `mouseup` and `touchend`.
#[must_use = "dropping a ReleaseListener unregisters it immediately"]
pub struct ReleaseListener {
    slot: Rc<ReleaseSlot>,
}

impl ReleaseListener {
    /// Whether the listener already fired.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.slot.fired.get()
    }
}

impl fmt::Debug for ReleaseListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseListener")
            .field("fired", &self.slot.fired.get())
            .finish()
    }
}

/// Host-driven pointer source.
///
/// Cloning yields another handle to the same feed.
#[derive(Clone)]
pub struct PointerHub {
    position: Observable<PointerPosition>,
    releases: Rc<RefCell<Vec<Weak<ReleaseSlot>>>>,
}

impl Default for PointerHub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PointerHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerHub")
            .field("position", &self.position.get())
            .field("release_listeners", &self.releases.borrow().len())
            .finish()
    }
}

impl PointerHub {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Observable::new(PointerPosition::default()),
            releases: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Current pointer position.
    #[must_use]
    pub fn position(&self) -> PointerPosition {
        self.position.get()
    }

    /// Subscribe to pointer movement.
    pub fn on_move(&self, callback: impl Fn(&PointerPosition) + 'static) -> Subscription {
        self.position.subscribe(callback)
    }

    /// Register a listener that fires on the first `mouseup` or `touchend`.
    pub fn once_release(&self, callback: impl Fn(PointerRelease) + 'static) -> ReleaseListener {
        let slot = Rc::new(ReleaseSlot {
            fired: Cell::new(false),
            callback: Box::new(callback),
        });
        self.releases.borrow_mut().push(Rc::downgrade(&slot));
        ReleaseListener { slot }
    }

    /// Live release listeners that have not fired yet.
    #[must_use]
    pub fn pending_release_listeners(&self) -> usize {
        self.releases
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|slot| !slot.fired.get())
            .count()
    }

    /// Host push: pointer moved.
    pub fn move_to(&self, position: PointerPosition) {
        self.position.set(position);
    }

    /// Host push: mouse button released.
    pub fn mouse_up(&self, position: PointerPosition) {
        self.release(PointerRelease {
            kind: ReleaseKind::MouseUp,
            position,
        });
    }

    /// Host push: touch ended.
    pub fn touch_end(&self, position: PointerPosition) {
        self.release(PointerRelease {
            kind: ReleaseKind::TouchEnd,
            position,
        });
    }

    fn release(&self, release: PointerRelease) {
        self.position.set(release.position);
        // One-shot: every registered slot is consumed by this delivery.
        let slots: Vec<Rc<ReleaseSlot>> = self
            .releases
            .borrow_mut()
            .drain(..)
            .filter_map(|w| w.upgrade())
            .collect();
        let mut delivered = 0usize;
        for slot in &slots {
            if slot.fire(release) {
                delivered += 1;
            }
        }
        trace!(kind = ?release.kind, delivered, "pointer release dispatched");
    }
}
