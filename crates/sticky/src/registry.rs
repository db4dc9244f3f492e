//! Stuck element registry
//!
//! Ordered bookkeeping of the elements that are currently stuck to the top of
//! the viewport, plus a change feed that pushes the full list to every
//! subscriber after each mutation.
//!
//! # Responsibilities
//!
//! - Stacking order (insertion order, later entries are on top)
//! - Supersession: only the most recently added entry has `unstuck == false`
//! - Synchronous, in-order delivery of snapshots to subscribers
//!
//! # Design Contract
//!
//! - Ids are stable: removing an entry never changes another entry's id
//! - Every successful `add`/`remove` broadcasts exactly once before returning
//! - Removing an unknown id is a no-op and does not broadcast
//!
//! # NOT Responsible For
//!
//! - Measuring elements or applying styles (see `controller.rs`)
//! - Scroll event delivery (see `page.rs`)

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::Serialize;

/// Stable identifier of a stuck element within one registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ElementId(u64);

impl ElementId {
    /// Get the raw value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entry in the registry list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StuckElement {
    pub id: ElementId,

    /// True once a more recently stuck element has superseded this one
    pub unstuck: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubscriptionId(u64);

type FeedCallback = Rc<RefCell<dyn FnMut(&[StuckElement])>>;

struct Subscriber {
    id: SubscriptionId,
    callback: FeedCallback,
}

/// Ordered list of stuck elements with a change feed
///
/// Shared by `Rc` between the controllers of a scroll container. All methods
/// take `&self`; the list is only ever mutated by `add_stuck_element` and
/// `remove_stuck_element`.
pub struct Registry {
    entries: RefCell<Vec<StuckElement>>,
    next_element_id: Cell<u64>,
    subscribers: RefCell<Vec<Subscriber>>,
    next_subscription_id: Cell<u64>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &*self.entries.borrow())
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

impl Registry {
    /// Create an empty registry with no subscribers
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_element_id: Cell::new(0),
            subscribers: RefCell::new(Vec::new()),
            next_subscription_id: Cell::new(0),
        }
    }

    /// Push a new stuck element on top of the stack.
    ///
    /// Every existing entry is marked unstuck, the new entry is appended as
    /// the active one, and the updated list is broadcast.
    pub fn add_stuck_element(&self) -> ElementId {
        let id = ElementId(self.next_element_id.get());
        self.next_element_id.set(id.0 + 1);

        let depth = {
            let mut entries = self.entries.borrow_mut();
            for entry in entries.iter_mut() {
                entry.unstuck = true;
            }
            entries.push(StuckElement { id, unstuck: false });
            entries.len()
        };

        tracing::debug!(%id, depth, "stuck element added");
        self.broadcast();
        id
    }

    /// Remove a stuck element and reactivate whichever entry is now on top.
    ///
    /// Returns false (without broadcasting) if the id is not in the registry.
    pub fn remove_stuck_element(&self, id: ElementId) -> bool {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            match entries.iter().position(|entry| entry.id == id) {
                Some(position) => {
                    entries.remove(position);
                    if let Some(top) = entries.last_mut() {
                        top.unstuck = false;
                    }
                    true
                }
                None => false,
            }
        };

        if !removed {
            tracing::debug!(%id, "ignoring removal of unknown stuck element");
            return false;
        }

        tracing::debug!(%id, depth = self.len(), "stuck element removed");
        self.broadcast();
        true
    }

    /// Register a callback that receives the full list after every mutation.
    ///
    /// Callbacks run synchronously, in subscription order, inside the
    /// mutating call. They must not add or remove stuck elements themselves.
    pub fn subscribe<F>(self: &Rc<Self>, callback: F) -> Subscription
    where
        F: FnMut(&[StuckElement]) + 'static,
    {
        let id = SubscriptionId(self.next_subscription_id.get());
        self.next_subscription_id.set(id.0 + 1);

        let callback: FeedCallback = Rc::new(RefCell::new(callback));
        self.subscribers.borrow_mut().push(Subscriber { id, callback });

        Subscription {
            id,
            registry: Rc::downgrade(self),
        }
    }

    /// Drop every subscriber. Outstanding `Subscription` guards become inert.
    pub fn clear_subscribers(&self) {
        let dropped = std::mem::take(&mut *self.subscribers.borrow_mut());
        if !dropped.is_empty() {
            tracing::debug!(count = dropped.len(), "cleared registry subscribers");
        }
    }

    /// Copy of the current list, bottom of the stack first
    pub fn snapshot(&self) -> Vec<StuckElement> {
        self.entries.borrow().clone()
    }

    /// Id of the entry that is currently stuck and not superseded
    pub fn active(&self) -> Option<ElementId> {
        self.entries
            .borrow()
            .iter()
            .find(|entry| !entry.unstuck)
            .map(|entry| entry.id)
    }

    /// Stack position of an entry (0 = bottom)
    pub fn position(&self, id: ElementId) -> Option<usize> {
        self.entries.borrow().iter().position(|entry| entry.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscribers.borrow().iter().any(|sub| sub.id == id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.borrow_mut().retain(|sub| sub.id != id);
    }

    fn broadcast(&self) {
        let snapshot = self.snapshot();

        // Clone the handles so callbacks may unsubscribe while we iterate
        let subscribers: Vec<(SubscriptionId, FeedCallback)> = self
            .subscribers
            .borrow()
            .iter()
            .map(|sub| (sub.id, Rc::clone(&sub.callback)))
            .collect();

        tracing::trace!(
            entries = snapshot.len(),
            subscribers = subscribers.len(),
            "broadcasting stuck elements"
        );

        for (id, callback) in subscribers {
            if !self.is_subscribed(id) {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(&snapshot),
                Err(_) => {
                    tracing::error!(
                        subscription = id.0,
                        "skipping re-entrant broadcast: feed callbacks must not mutate the registry"
                    );
                }
            }
        }
    }
}

/// Handle to a change feed subscription
///
/// Dropping the handle unsubscribes. After that the callback never runs
/// again, even if a broadcast is in progress.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Unsubscribe now (same as dropping the handle)
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id.0).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.id);
        }
    }
}
