use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use shelf_logging::{shelf_debug, shelf_warn};

use crate::bus::{EventBus, EventName, StoreEvent, Subscription};
use crate::grid::{GridRender, ResultGridView};

/// Grid shared between its owner and the removal listener.
pub type SharedGrid = Rc<RefCell<ResultGridView>>;

/// Removals not yet applied to the grid.
type PendingRemovals = Rc<RefCell<Vec<String>>>;

struct SyncState {
    grid: SharedGrid,
    pending: PendingRemovals,
    on_render: Box<dyn FnMut(GridRender)>,
}

impl SyncState {
    /// Applies every queued removal, then re-renders. Leaves the queue intact
    /// when the grid is borrowed elsewhere.
    fn apply_pending(&mut self) {
        let Ok(mut view) = self.grid.try_borrow_mut() else {
            shelf_warn!(
                "Grid busy, deferring {} removal(s)",
                self.pending.borrow().len()
            );
            return;
        };
        let ids: Vec<String> = self.pending.borrow_mut().drain(..).collect();
        if ids.is_empty() {
            return;
        }
        for id in ids {
            if !view.remove(&id) {
                shelf_debug!("Removal of {} matched nothing in the mounted grid", id);
            }
        }
        let rendered = view.render();
        view.consume_dirty();
        drop(view);
        (self.on_render)(rendered);
    }
}

/// Keeps a mounted grid in step with `snap:removed` events.
///
/// Subscribes once on attach. Each event removes the matching record (if
/// any) and hands a full re-render to `on_render`. An event that arrives
/// while the grid is borrowed is queued and applied with the next event or
/// by [`LiveRemovalSync::flush_pending`]. Dropping this value deregisters
/// the listener, so a torn-down view is never touched again.
pub struct LiveRemovalSync {
    state: Rc<RefCell<SyncState>>,
    pending: PendingRemovals,
    _subscription: Subscription,
}

impl LiveRemovalSync {
    pub fn attach(
        bus: &EventBus,
        grid: SharedGrid,
        on_render: impl FnMut(GridRender) + 'static,
    ) -> Self {
        let pending = PendingRemovals::default();
        let state = Rc::new(RefCell::new(SyncState {
            grid,
            pending: Rc::clone(&pending),
            on_render: Box::new(on_render),
        }));
        let listener_state = Rc::clone(&state);
        let listener_pending = Rc::clone(&pending);
        let subscription = bus.subscribe(EventName::SnapRemoved, move |event| {
            let StoreEvent::SnapRemoved { id } = event;
            listener_pending.borrow_mut().push(id.clone());
            // Busy only while this view's own re-render publishes; the id then
            // waits for the next event or `flush_pending`.
            if let Ok(mut sync) = listener_state.try_borrow_mut() {
                sync.apply_pending();
            }
        });
        Self {
            state,
            pending,
            _subscription: subscription,
        }
    }

    /// Number of removals waiting for the grid to become free.
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Applies queued removals now. No-op when nothing is queued.
    pub fn flush_pending(&self) {
        if self.pending.borrow().is_empty() {
            return;
        }
        if let Ok(mut sync) = self.state.try_borrow_mut() {
            sync.apply_pending();
        }
    }

    /// Explicit teardown; equivalent to dropping the value.
    pub fn detach(self) {}
}

impl fmt::Debug for LiveRemovalSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveRemovalSync")
            .field("pending", &self.pending_count())
            .finish()
    }
}
