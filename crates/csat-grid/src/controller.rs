#![forbid(unsafe_code)]

//! Grid controller: the single owner of the live interaction session.
//!
//! # State machine
//!
//! ```text
//!            begin(move)             release
//!   Idle ──────────────────▶ ActiveMove ─────────▶ Idle
//!     │                                              ▲
//!     │      begin(resize)            release        │
//!     └──────────────────▶ ActiveResize ─────────────┘
//! ```
//!
//! A `begin` while a session is live replaces it; the replaced session's
//! pointer subscription and release listener are dropped with it, so it can
//! never commit. Only the commit step writes to the layout store.
//!
//! Callbacks registered on the [`PointerHub`] hold weak references to the
//! controller state plus the generation of the session that registered them;
//! a callback whose generation is no longer current is ignored.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use csat_core::{
    Direction, GridArea, GridMetrics, HostEventBus, Observable, Placement, PointerHub,
    PointerPosition, ReleaseListener, Subscription,
};
use csat_layout::{LayoutStore, PlacementDelta, PlacementPatch, commit_placement};
use serde_json::{Map, Value, json};
use tracing::{debug, info, trace, warn};

use crate::cell::{GridDispatch, GridIntent};
use crate::ghost::{ExternalGhost, GhostStyle};
use crate::session::Session;

/// Observable controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridControllerState {
    Idle,
    ActiveMove { id: String },
    ActiveResize { id: String, direction: Direction },
}

impl GridControllerState {
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Panel under manipulation, if any.
    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::ActiveMove { id } | Self::ActiveResize { id, .. } => Some(id),
        }
    }
}

/// Snapped preview of the live gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnappedGhost {
    pub id: String,
    pub placement: Placement,
}

impl SnappedGhost {
    #[must_use]
    pub const fn area(&self) -> GridArea {
        self.placement.grid_area()
    }

    /// Inline style of the snapped ghost.
    #[must_use]
    pub fn render_style(&self) -> Map<String, Value> {
        let mut style = Map::new();
        style.insert("background".into(), json!("green"));
        style.insert("opacity".into(), json!("0.5"));
        style.insert("zIndex".into(), json!("11"));
        style.insert("position".into(), json!("relative"));
        style.insert("gridArea".into(), json!(self.area().to_string()));
        style
    }
}

/// Why a release did not commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseIgnoredReason {
    /// Release arrived while idle.
    NoActiveSession,
    /// Release belongs to a session that was replaced or cancelled.
    StaleSession,
    /// The panel is no longer in the layout store.
    UnknownPanel,
}

/// One applied commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,
    pub delta: PlacementDelta,
    /// Store value read at commit time.
    pub previous: Placement,
    /// Value merged into the store.
    pub placement: Placement,
    pub x_reverted: bool,
    pub y_reverted: bool,
}

/// Result of one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Committed(CommitRecord),
    Ignored(ReleaseIgnoredReason),
}

impl ReleaseOutcome {
    #[must_use]
    pub const fn committed(&self) -> Option<&CommitRecord> {
        match self {
            Self::Committed(record) => Some(record),
            Self::Ignored(_) => None,
        }
    }
}

/// Both overlays the controller renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerView {
    pub external_ghost: GhostStyle,
    pub snapped_ghost: Option<SnappedGhost>,
}

struct ActiveSession {
    id: String,
    generation: u64,
    session: Session,
    _moves: Subscription,
    _release: ReleaseListener,
}

impl ActiveSession {
    fn state(&self) -> GridControllerState {
        match self.session {
            Session::Moving(_) => GridControllerState::ActiveMove {
                id: self.id.clone(),
            },
            Session::Resizing(resizing) => GridControllerState::ActiveResize {
                id: self.id.clone(),
                direction: resizing.direction(),
            },
        }
    }
}

struct ControllerCore {
    metrics: GridMetrics,
    active: Option<ActiveSession>,
    next_generation: u64,
    commits: u64,
    last_outcome: Option<ReleaseOutcome>,
}

struct Shared<S> {
    core: RefCell<ControllerCore>,
    store: Rc<RefCell<S>>,
    preview: Observable<Option<SnappedGhost>>,
    pointer: PointerHub,
    ghost: ExternalGhost,
}

impl<S: LayoutStore + 'static> Shared<S> {
    fn begin(self: &Rc<Self>, intent: GridIntent) {
        let origin = self.pointer.position();
        let mut core = self.core.borrow_mut();
        let session = Session::open(
            intent.direction,
            intent.initial_placement,
            origin,
            core.metrics,
        );
        let generation = core.next_generation;
        core.next_generation += 1;

        let weak: Weak<Self> = Rc::downgrade(self);
        let moves = self.pointer.on_move({
            let weak = weak.clone();
            move |position| {
                if let Some(shared) = weak.upgrade() {
                    shared.track(generation, *position);
                }
            }
        });
        let release = self.pointer.once_release(move |release| {
            if let Some(shared) = weak.upgrade() {
                shared.finish(generation, release.position);
            }
        });

        debug!(
            id = %intent.caller_id,
            direction = %intent.direction,
            placement = ?intent.initial_placement,
            ?origin,
            generation,
            "grid session opened"
        );
        let replaced = core.active.replace(ActiveSession {
            id: intent.caller_id.clone(),
            generation,
            session,
            _moves: moves,
            _release: release,
        });
        drop(core);

        if let Some(replaced) = replaced {
            debug!(id = %replaced.id, generation = replaced.generation, "grid session superseded");
        }
        self.preview.set(Some(SnappedGhost {
            id: intent.caller_id,
            placement: session.preview(origin),
        }));
    }

    fn track(&self, generation: u64, position: PointerPosition) {
        let ghost = {
            let core = self.core.borrow();
            match &core.active {
                Some(active) if active.generation == generation => SnappedGhost {
                    id: active.id.clone(),
                    placement: active.session.preview(position),
                },
                _ => return,
            }
        };
        self.preview.set(Some(ghost));
    }

    fn finish(&self, generation: u64, position: PointerPosition) -> ReleaseOutcome {
        let taken = {
            let mut core = self.core.borrow_mut();
            match core.active.as_ref().map(|active| active.generation) {
                None => Err(ReleaseIgnoredReason::NoActiveSession),
                Some(live) if live != generation => Err(ReleaseIgnoredReason::StaleSession),
                Some(_) => core.active.take().ok_or(ReleaseIgnoredReason::NoActiveSession),
            }
        };
        match taken {
            Ok(active) => {
                let delta = active.session.release_delta(position);
                self.commit(active.id.clone(), delta)
            }
            Err(reason) => self.ignore(reason),
        }
    }

    fn release(&self, delta: PlacementDelta) -> ReleaseOutcome {
        let taken = self.core.borrow_mut().active.take();
        match taken {
            Some(active) => self.commit(active.id.clone(), delta),
            None => self.ignore(ReleaseIgnoredReason::NoActiveSession),
        }
    }

    fn ignore(&self, reason: ReleaseIgnoredReason) -> ReleaseOutcome {
        trace!(?reason, "grid release ignored");
        let outcome = ReleaseOutcome::Ignored(reason);
        self.core.borrow_mut().last_outcome = Some(outcome.clone());
        outcome
    }

    fn commit(&self, id: String, delta: PlacementDelta) -> ReleaseOutcome {
        let current = self.store.borrow().get(&id);
        let outcome = match current {
            None => {
                warn!(id = %id, "released panel is not in the layout, nothing committed");
                ReleaseOutcome::Ignored(ReleaseIgnoredReason::UnknownPanel)
            }
            Some(current) => {
                let folded = commit_placement(current, delta);
                self.store
                    .borrow_mut()
                    .merge(&id, PlacementPatch::full(folded.placement));
                let p = folded.placement;
                info!(id = %id, x = p.x, y = p.y, w = p.w, h = p.h, "grid placement committed");
                ReleaseOutcome::Committed(CommitRecord {
                    id,
                    delta,
                    previous: current,
                    placement: folded.placement,
                    x_reverted: folded.x_reverted,
                    y_reverted: folded.y_reverted,
                })
            }
        };
        {
            let mut core = self.core.borrow_mut();
            if outcome.committed().is_some() {
                core.commits += 1;
            }
            core.last_outcome = Some(outcome.clone());
        }
        self.preview.set(None);
        outcome
    }

    fn cancel(&self) -> bool {
        let taken = self.core.borrow_mut().active.take();
        let Some(active) = taken else {
            return false;
        };
        debug!(id = %active.id, generation = active.generation, "grid session cancelled");
        drop(active);
        self.preview.set(None);
        true
    }
}

/// Routes cell intents into sessions and commits finished gestures.
///
/// Cloning yields another handle to the same controller.
pub struct GridController<S: LayoutStore + 'static> {
    shared: Rc<Shared<S>>,
}

impl<S: LayoutStore + 'static> Clone for GridController<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<S: LayoutStore + 'static> fmt::Debug for GridController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.shared.core.borrow();
        f.debug_struct("GridController")
            .field("state", &core.active.as_ref().map(ActiveSession::state))
            .field("metrics", &core.metrics)
            .field("commits", &core.commits)
            .finish_non_exhaustive()
    }
}

impl<S: LayoutStore + 'static> GridController<S> {
    /// Controller over an owned store.
    pub fn new(store: S, pointer: PointerHub, metrics: GridMetrics) -> Self {
        Self::with_shared_store(Rc::new(RefCell::new(store)), pointer, metrics)
    }

    /// Controller over a store shared with the rest of the editor.
    pub fn with_shared_store(
        store: Rc<RefCell<S>>,
        pointer: PointerHub,
        metrics: GridMetrics,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                core: RefCell::new(ControllerCore {
                    metrics,
                    active: None,
                    next_generation: 0,
                    commits: 0,
                    last_outcome: None,
                }),
                store,
                preview: Observable::new(None),
                pointer,
                ghost: ExternalGhost::new(),
            }),
        }
    }

    #[must_use]
    pub fn store(&self) -> Rc<RefCell<S>> {
        Rc::clone(&self.shared.store)
    }

    #[must_use]
    pub fn pointer(&self) -> &PointerHub {
        &self.shared.pointer
    }

    #[must_use]
    pub fn metrics(&self) -> GridMetrics {
        self.shared.core.borrow().metrics
    }

    /// Change the grid pitch. Applies to sessions opened afterwards.
    pub fn set_metrics(&self, metrics: GridMetrics) {
        self.shared.core.borrow_mut().metrics = metrics;
    }

    /// Dispatch handle for cells. It does not keep the controller alive.
    #[must_use]
    pub fn dispatcher(&self) -> GridDispatch {
        let weak = Rc::downgrade(&self.shared);
        GridDispatch::new(move |intent| {
            if let Some(shared) = weak.upgrade() {
                shared.begin(intent);
            }
        })
    }

    /// Open a session for `intent`, replacing any live one.
    ///
    /// The pointer origin is read from the hub here, once.
    pub fn begin(&self, intent: GridIntent) {
        self.shared.begin(intent);
    }

    /// Release the live session with an explicit delta.
    ///
    /// Pointer-driven gestures end through the hub's release listener instead.
    pub fn release(&self, delta: PlacementDelta) -> ReleaseOutcome {
        self.shared.release(delta)
    }

    /// Drop the live session without committing. Returns whether one existed.
    pub fn cancel(&self) -> bool {
        self.shared.cancel()
    }

    #[must_use]
    pub fn state(&self) -> GridControllerState {
        self.shared
            .core
            .borrow()
            .active
            .as_ref()
            .map_or(GridControllerState::Idle, ActiveSession::state)
    }

    /// Snapped preview of the live session.
    #[must_use]
    pub fn preview(&self) -> &Observable<Option<SnappedGhost>> {
        &self.shared.preview
    }

    #[must_use]
    pub fn external_ghost(&self) -> &ExternalGhost {
        &self.shared.ghost
    }

    /// Subscribe the external ghost to `bus`.
    pub fn mount(&self, bus: &HostEventBus) {
        self.shared.ghost.mount(bus);
    }

    /// Tear down: unsubscribe the external ghost and drop any live session.
    pub fn unmount(&self) {
        self.shared.ghost.unmount();
        self.shared.cancel();
    }

    #[must_use]
    pub fn view(&self) -> ControllerView {
        ControllerView {
            external_ghost: self.shared.ghost.style(),
            snapped_ghost: self.shared.preview.get(),
        }
    }

    /// Number of commits applied so far.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.shared.core.borrow().commits
    }

    /// Outcome of the most recent release, committed or not.
    #[must_use]
    pub fn last_outcome(&self) -> Option<ReleaseOutcome> {
        self.shared.core.borrow().last_outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csat_core::SPAN_TO_END;
    use csat_layout::GridLayout;
    use pretty_assertions::assert_eq;

    const ORIGIN: PointerPosition = PointerPosition::new(400.0, 300.0);

    fn at_cells(dx: i32, dy: i32) -> PointerPosition {
        let m = GridMetrics::default();
        PointerPosition::new(
            ORIGIN.x + f64::from(dx) * m.column_pitch(),
            ORIGIN.y + f64::from(dy) * m.row_pitch(),
        )
    }

    fn controller(entries: &[(&str, Placement)]) -> GridController<GridLayout> {
        let layout = entries
            .iter()
            .map(|(id, p)| ((*id).to_string(), *p))
            .collect();
        let hub = PointerHub::new();
        hub.move_to(ORIGIN);
        GridController::new(layout, hub, GridMetrics::default())
    }

    fn intent(id: &str, code: &str, placement: Placement) -> GridIntent {
        GridIntent {
            caller_id: id.to_string(),
            direction: Direction::from_code(code).unwrap(),
            initial_placement: placement,
        }
    }

    fn stored(controller: &GridController<GridLayout>, id: &str) -> Option<Placement> {
        controller.store().borrow().get(id)
    }

    #[test]
    fn move_gesture_commits_snapped_delta() {
        let start = Placement::new(3, 3, 2, 4);
        let ctl = controller(&[("stats", start)]);
        ctl.begin(intent("stats", "", start));
        assert_eq!(ctl.state(), GridControllerState::ActiveMove { id: "stats".into() });

        ctl.pointer().move_to(at_cells(2, 1));
        assert_eq!(
            ctl.preview().get().map(|g| g.placement),
            Some(Placement::new(5, 4, 2, 4))
        );

        ctl.pointer().mouse_up(at_cells(2, 1));
        assert_eq!(stored(&ctl, "stats"), Some(Placement::new(5, 4, 2, 4)));
        assert!(ctl.state().is_idle());
        assert_eq!(ctl.preview().get(), None);
        assert_eq!(ctl.commit_count(), 1);
    }

    #[test]
    fn release_uses_release_coordinates_not_last_preview() {
        let start = Placement::new(3, 3, 2, 2);
        let ctl = controller(&[("a", start)]);
        ctl.begin(intent("a", "", start));
        ctl.pointer().move_to(at_cells(1, 0));
        ctl.pointer().touch_end(at_cells(3, 0));
        assert_eq!(stored(&ctl, "a"), Some(Placement::new(6, 3, 2, 2)));
    }

    #[test]
    fn up_right_resize_preview_and_commit() {
        let start = Placement::new(3, 3, 2, 2);
        let ctl = controller(&[("a", start)]);
        ctl.begin(intent("a", "ur", start));
        assert_eq!(
            ctl.state(),
            GridControllerState::ActiveResize { id: "a".into(), direction: Direction::UP_RIGHT }
        );

        ctl.pointer().move_to(at_cells(2, -1));
        assert_eq!(
            ctl.preview().get().map(|g| g.placement),
            Some(Placement::new(3, 2, 4, 3))
        );

        ctl.pointer().mouse_up(at_cells(2, -1));
        assert_eq!(stored(&ctl, "a"), Some(Placement::new(3, 2, 4, 3)));
    }

    #[test]
    fn commit_reads_current_store_value() {
        let start = Placement::new(3, 3, 2, 2);
        let ctl = controller(&[("a", start)]);
        ctl.begin(intent("a", "", start));
        // layout changed behind the gesture
        ctl.store().borrow_mut().merge("a", PlacementPatch::full(Placement::new(10, 10, 1, 1)));
        ctl.pointer().mouse_up(at_cells(1, 1));
        assert_eq!(stored(&ctl, "a"), Some(Placement::new(11, 11, 1, 1)));
    }

    #[test]
    fn duplicate_terminal_events_commit_once() {
        let start = Placement::new(2, 2, 1, 1);
        let ctl = controller(&[("a", start)]);
        ctl.begin(intent("a", "", start));

        ctl.pointer().mouse_up(at_cells(1, 0));
        ctl.pointer().touch_end(at_cells(1, 0));

        assert_eq!(ctl.commit_count(), 1);
        assert_eq!(stored(&ctl, "a"), Some(Placement::new(3, 2, 1, 1)));
    }

    #[test]
    fn second_gesture_discards_first_without_commit() {
        let a = Placement::new(2, 2, 2, 2);
        let b = Placement::new(6, 2, 2, 2);
        let ctl = controller(&[("a", a), ("b", b)]);

        ctl.begin(intent("a", "", a));
        ctl.pointer().move_to(at_cells(1, 1));
        ctl.begin(intent("b", "d", b));
        assert_eq!(ctl.pointer().pending_release_listeners(), 1);

        ctl.pointer().mouse_up(at_cells(1, 2));
        assert_eq!(stored(&ctl, "a"), Some(a));
        // origin for b was captured at its own begin, one cell right and down
        assert_eq!(stored(&ctl, "b"), Some(Placement::new(6, 2, 2, 3)));
        assert_eq!(ctl.commit_count(), 1);
    }

    #[test]
    fn explicit_release_while_idle_is_ignored() {
        let ctl = controller(&[("a", Placement::new(1, 1, 1, 1))]);
        assert_eq!(
            ctl.release(PlacementDelta::translate(1, 1)),
            ReleaseOutcome::Ignored(ReleaseIgnoredReason::NoActiveSession)
        );
        assert_eq!(stored(&ctl, "a"), Some(Placement::new(1, 1, 1, 1)));
    }

    #[test]
    fn explicit_release_commits_delta() {
        let start = Placement::new(2, 2, 2, 2);
        let ctl = controller(&[("a", start)]);
        ctl.begin(intent("a", "ul", start));
        let outcome = ctl.release(PlacementDelta { dx: -3, dy: -1, dw: 3, dh: 1 });
        let record = outcome.committed().cloned().unwrap();
        assert_eq!(record.placement, Placement::new(2, 1, 2, 3));
        assert!(record.x_reverted && !record.y_reverted);
        // the pointer listener went away with the session
        assert_eq!(ctl.pointer().pending_release_listeners(), 0);
    }

    #[test]
    fn release_for_removed_panel_goes_idle() {
        let start = Placement::new(2, 2, 1, 1);
        let ctl = controller(&[]);
        ctl.begin(intent("ghost", "", start));
        ctl.pointer().mouse_up(at_cells(1, 1));
        assert!(ctl.state().is_idle());
        assert_eq!(
            ctl.last_outcome(),
            Some(ReleaseOutcome::Ignored(ReleaseIgnoredReason::UnknownPanel))
        );
        assert_eq!(stored(&ctl, "ghost"), None);
    }

    #[test]
    fn end_span_resolves_to_one_on_commit() {
        let start = Placement::new(1, 1, SPAN_TO_END, 3);
        let ctl = controller(&[("GeneralInfo", start)]);
        ctl.begin(intent("GeneralInfo", "", start));
        ctl.pointer().mouse_up(at_cells(0, 2));
        assert_eq!(stored(&ctl, "GeneralInfo"), Some(Placement::new(1, 3, 1, 3)));
    }

    #[test]
    fn unmount_cancels_live_session() {
        let start = Placement::new(2, 2, 1, 1);
        let ctl = controller(&[("a", start)]);
        let bus = HostEventBus::new();
        ctl.mount(&bus);
        ctl.begin(intent("a", "", start));

        ctl.unmount();
        ctl.pointer().mouse_up(at_cells(3, 3));

        assert!(ctl.state().is_idle());
        assert_eq!(stored(&ctl, "a"), Some(start));
        assert!(!ctl.external_ghost().is_mounted());
    }

    #[test]
    fn dispatcher_routes_cell_intents() {
        let start = Placement::new(4, 4, 2, 2);
        let ctl = controller(&[("a", start)]);
        let dispatch = ctl.dispatcher();
        dispatch.send(intent("a", "r", start));
        assert_eq!(
            ctl.state(),
            GridControllerState::ActiveResize { id: "a".into(), direction: Direction::RIGHT }
        );
        let ghost = ctl.preview().get().unwrap();
        assert_eq!(ghost.id, "a");
        assert_eq!(ghost.placement, start);
    }

    #[test]
    fn dispatcher_does_not_keep_controller_alive() {
        let ctl = controller(&[]);
        let dispatch = ctl.dispatcher();
        drop(ctl);
        dispatch.send(intent("a", "", Placement::new(1, 1, 1, 1)));
    }

    #[test]
    fn view_keeps_ghosts_apart() {
        let start = Placement::new(2, 2, 1, 1);
        let ctl = controller(&[("a", start)]);
        let bus = HostEventBus::new();
        ctl.mount(&bus);

        bus.emit(csat_core::DRAW_GHOST_EVENT, &json!({"display": "block", "gridArea": "5 / 5 / 6 / 6"}));
        let view = ctl.view();
        assert!(view.external_ghost.is_visible());
        assert_eq!(view.snapped_ghost, None);

        ctl.begin(intent("a", "", start));
        let view = ctl.view();
        let snapped = view.snapped_ghost.unwrap();
        assert_eq!(snapped.render_style()["gridArea"], json!("2 / 2 / 3 / 3"));
        assert_eq!(snapped.render_style()["background"], json!("green"));
        assert!(view.external_ghost.is_visible());
    }
}
