#![forbid(unsafe_code)]

//! External ghost channel.
//!
//! A second preview overlay whose style is pushed by the host on
//! [`DRAW_GHOST_EVENT`]. It is independent of the interactive session: the
//! controller never writes it and a gesture never hides it.

use std::cell::RefCell;

use csat_core::{DRAW_GHOST_EVENT, GridArea, HostEventBus, Observable, Subscription, Unlisten};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

/// Style payload last received from the host.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostStyle(Map<String, Value>);

impl Default for GhostStyle {
    fn default() -> Self {
        Self::hidden()
    }
}

impl GhostStyle {
    /// Initial style before any push: `{"display": "none"}`.
    #[must_use]
    pub fn hidden() -> Self {
        let mut map = Map::new();
        map.insert("display".into(), json!("none"));
        Self(map)
    }

    /// Adopt a pushed payload. Anything but a JSON object hides the ghost.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Self {
        match payload {
            Value::Object(map) => Self(map.clone()),
            other => {
                warn!(payload = %other, "draw_ghost payload is not an object, hiding ghost");
                Self::hidden()
            }
        }
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.0.get("display").and_then(Value::as_str) != Some("none")
    }

    /// Grid area carried by the payload, if it has a parseable one.
    #[must_use]
    pub fn grid_area(&self) -> Option<GridArea> {
        self.0.get("gridArea")?.as_str()?.parse().ok()
    }

    /// Overlay style: fixed translucency and stacking, then the payload.
    #[must_use]
    pub fn render_style(&self) -> Map<String, Value> {
        let mut style = Map::new();
        style.insert("opacity".into(), json!("0.5"));
        style.insert("zIndex".into(), json!("11"));
        style.insert("position".into(), json!("relative"));
        for (key, value) in &self.0 {
            style.insert(key.clone(), value.clone());
        }
        style
    }
}

/// Host-fed ghost overlay with at most one live subscription.
#[derive(Debug)]
pub struct ExternalGhost {
    style: Observable<GhostStyle>,
    listener: RefCell<Option<Unlisten>>,
}

impl Default for ExternalGhost {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalGhost {
    #[must_use]
    pub fn new() -> Self {
        Self {
            style: Observable::new(GhostStyle::hidden()),
            listener: RefCell::new(None),
        }
    }

    /// Subscribe to `bus`. A previous subscription is dropped first.
    pub fn mount(&self, bus: &HostEventBus) {
        let style = self.style.clone();
        let unlisten = bus.listen(DRAW_GHOST_EVENT, move |payload| {
            debug!(%payload, "ghost payload received");
            style.set(GhostStyle::from_payload(payload));
        });
        *self.listener.borrow_mut() = Some(unlisten);
    }

    /// Drop the subscription. The last style stays as it was.
    pub fn unmount(&self) {
        *self.listener.borrow_mut() = None;
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.listener.borrow().is_some()
    }

    /// Current style.
    #[must_use]
    pub fn style(&self) -> GhostStyle {
        self.style.get()
    }

    pub fn on_change(&self, callback: impl Fn(&GhostStyle) + 'static) -> Subscription {
        self.style.subscribe(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_hidden() {
        let ghost = ExternalGhost::new();
        assert!(!ghost.style().is_visible());
        assert_eq!(ghost.style().render_style()["display"], json!("none"));
        assert_eq!(ghost.style().render_style()["zIndex"], json!("11"));
    }

    #[test]
    fn last_payload_wins() {
        let bus = HostEventBus::new();
        let ghost = ExternalGhost::new();
        ghost.mount(&bus);

        bus.emit(DRAW_GHOST_EVENT, &json!({"display": "block", "gridArea": "2 / 3 / 4 / 5"}));
        bus.emit(DRAW_GHOST_EVENT, &json!({"display": "block", "gridArea": "1 / 1 / 2 / -1"}));

        let style = ghost.style();
        assert!(style.is_visible());
        assert_eq!(style.grid_area().map(|a| a.to_string()).as_deref(), Some("1 / 1 / 2 / -1"));
    }

    #[test]
    fn payload_overrides_base_style() {
        let style = GhostStyle::from_payload(&json!({"opacity": "1", "background": "red"}));
        let rendered = style.render_style();
        assert_eq!(rendered["opacity"], json!("1"));
        assert_eq!(rendered["position"], json!("relative"));
        assert_eq!(rendered["background"], json!("red"));
    }

    #[test]
    fn non_object_payload_hides() {
        assert_eq!(GhostStyle::from_payload(&json!([1, 2])), GhostStyle::hidden());
    }

    #[test]
    fn remount_keeps_a_single_listener() {
        let bus = HostEventBus::new();
        let ghost = ExternalGhost::new();
        ghost.mount(&bus);
        ghost.mount(&bus);
        assert_eq!(bus.listener_count(DRAW_GHOST_EVENT), 1);

        ghost.unmount();
        assert!(!ghost.is_mounted());
        assert_eq!(bus.emit(DRAW_GHOST_EVENT, &json!({"display": "block"})), 0);
        assert!(!ghost.style().is_visible());
    }
}
