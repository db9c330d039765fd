#![forbid(unsafe_code)]

//! Shared editor values that tell their listeners when they change.
//!
//! The pointer hub, the controller's snapped preview and the host-driven
//! ghost all hold their state in an [`Observable`]. Handles are cheap clones
//! of one `Rc<RefCell<_>>` cell.
//!
//! Listeners are stored as `Weak` callbacks; the strong side lives in the
//! [`Subscription`] returned by [`Observable::subscribe`]. Dropping that
//! guard is how a listener goes away. Dead listeners are swept on the next
//! change.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

type Listener<T> = Rc<dyn Fn(&T)>;

struct Slot<T> {
    current: T,
    listeners: Vec<Weak<dyn Fn(&T)>>,
}

/// Cloneable handle to a value with change listeners.
///
/// Writing an equal value is a no-op. Listeners run in the order they
/// subscribed, after the cell's borrow has been released, so a listener may
/// write back into the same observable.
pub struct Observable<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("Observable")
            .field("current", &slot.current)
            .field("listeners", &slot.listeners.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                current: initial,
                listeners: Vec::new(),
            })),
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.slot.borrow().current.clone()
    }

    /// Store `next` and tell the live listeners, unless nothing changed.
    pub fn set(&self, next: T) {
        let live: Vec<Listener<T>> = {
            let mut slot = self.slot.borrow_mut();
            if slot.current == next {
                return;
            }
            slot.current = next.clone();
            slot.listeners.retain(|listener| listener.strong_count() > 0);
            slot.listeners.iter().filter_map(Weak::upgrade).collect()
        };
        trace!(listeners = live.len(), "observable changed");
        for listener in &live {
            listener(&next);
        }
    }

    /// Call `listener` with every later change while the guard is alive.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let strong: Listener<T> = Rc::new(listener);
        self.slot.borrow_mut().listeners.push(Rc::downgrade(&strong));
        Subscription {
            _listener: Box::new(strong),
        }
    }
}

/// Keeps one listener registered; drop it to unsubscribe.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _listener: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
