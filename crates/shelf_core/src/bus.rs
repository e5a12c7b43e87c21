//! In-process publish/subscribe bus with typed events.
//!
//! Dispatch is synchronous: `publish` calls every listener subscribed to the
//! event's name before returning. There is no ordering across names. The bus
//! is single-threaded (`Rc`), matching the cooperative UI loop that owns it.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    SnapRemoved,
}

impl EventName {
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::SnapRemoved => "snap:removed",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A catalog entry ceased to exist on this device (e.g. it was uninstalled).
    SnapRemoved { id: String },
}

impl StoreEvent {
    pub fn name(&self) -> EventName {
        match self {
            StoreEvent::SnapRemoved { .. } => EventName::SnapRemoved,
        }
    }
}

type Listener = Rc<RefCell<dyn FnMut(&StoreEvent)>>;
type SubscriptionId = u64;

#[derive(Default)]
struct BusInner {
    next_id: SubscriptionId,
    listeners: Vec<(SubscriptionId, EventName, Listener)>,
}

impl BusInner {
    fn contains(&self, id: SubscriptionId) -> bool {
        self.listeners.iter().any(|(sub, _, _)| *sub == id)
    }
}

/// Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for events named `name`.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(
        &self,
        name: EventName,
        listener: impl FnMut(&StoreEvent) + 'static,
    ) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .listeners
            .push((id, name, Rc::new(RefCell::new(listener))));
        Subscription {
            id,
            bus: Rc::downgrade(&self.inner),
        }
    }

    /// Delivers `event` to every current listener of its name and returns how
    /// many were called.
    pub fn publish(&self, event: &StoreEvent) -> usize {
        let name = event.name();
        // Snapshot so listeners may subscribe or unsubscribe while we dispatch.
        let targets: Vec<(SubscriptionId, Listener)> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter(|(_, listener_name, _)| *listener_name == name)
            .map(|(id, _, listener)| (*id, Rc::clone(listener)))
            .collect();

        let mut delivered = 0;
        for (id, listener) in targets {
            if !self.inner.borrow().contains(id) {
                continue;
            }
            // A listener that re-publishes into itself is skipped for the nested event.
            if let Ok(mut callback) = listener.try_borrow_mut() {
                (*callback)(event);
                delivered += 1;
            }
        }
        delivered
    }

    pub fn listener_count(&self, name: EventName) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|(_, listener_name, _)| *listener_name == name)
            .count()
    }
}

/// Live registration on an [`EventBus`]; dropping it deregisters the listener.
pub struct Subscription {
    id: SubscriptionId,
    bus: Weak<RefCell<BusInner>>,
}

impl Subscription {
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            let removed = {
                let mut inner = bus.borrow_mut();
                inner
                    .listeners
                    .iter()
                    .position(|(id, _, _)| *id == self.id)
                    .map(|position| inner.listeners.remove(position))
            };
            // The listener's captures are dropped after the bus borrow is released.
            drop(removed);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
