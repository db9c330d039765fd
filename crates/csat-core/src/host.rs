#![forbid(unsafe_code)]

//! Named event bus shared with the host shell.
//!
//! The desktop host pushes JSON payloads under string event names (for
//! example [`DRAW_GHOST_EVENT`]). Listeners are registered with
//! [`HostEventBus::listen`] and stay active while the returned [`Unlisten`]
//! guard lives. Delivery follows emit order; nothing is buffered for
//! listeners that register later.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::trace;

/// Event carrying an externally computed ghost preview style.
pub const DRAW_GHOST_EVENT: &str = "draw_ghost";

type HandlerRc = Rc<dyn Fn(&Value)>;
type HandlerWeak = Weak<dyn Fn(&Value)>;

/// In-process stand-in for the host's `listen` / `emit` bridge.
#[derive(Clone, Default)]
pub struct HostEventBus {
    handlers: Rc<RefCell<BTreeMap<String, Vec<HandlerWeak>>>>,
}

impl fmt::Debug for HostEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.borrow();
        f.debug_map()
            .entries(handlers.iter().map(|(name, list)| (name, list.len())))
            .finish()
    }
}

impl HostEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for `event`. Dropping the guard unsubscribes.
    pub fn listen(&self, event: &str, handler: impl Fn(&Value) + 'static) -> Unlisten {
        let strong: HandlerRc = Rc::new(handler);
        self.handlers
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(Rc::downgrade(&strong));
        Unlisten {
            event: event.to_string(),
            _handler: strong,
        }
    }

    /// Deliver `payload` to every live listener of `event`.
    ///
    /// Returns the number of listeners reached.
    pub fn emit(&self, event: &str, payload: &Value) -> usize {
        let live: Vec<HandlerRc> = {
            let mut handlers = self.handlers.borrow_mut();
            let Some(list) = handlers.get_mut(event) else {
                trace!(event, "host event without listeners");
                return 0;
            };
            list.retain(|w| w.strong_count() > 0);
            list.iter().filter_map(Weak::upgrade).collect()
        };
        for handler in &live {
            handler(payload);
        }
        live.len()
    }

    /// Live listeners for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.handlers
            .borrow()
            .get(event)
            .map_or(0, |list| list.iter().filter(|w| w.strong_count() > 0).count())
    }
}

/// Subscription guard returned by [`HostEventBus::listen`].
#[must_use = "dropping an Unlisten guard unsubscribes immediately"]
pub struct Unlisten {
    event: String,
    _handler: HandlerRc,
}

impl Unlisten {
    /// Event name this guard listens to.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }
}

impl fmt::Debug for Unlisten {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unlisten").field("event", &self.event).finish()
    }
}
