//! Signal/slot core used by every interactive part of the game.
//!
//! An [`EventSource`] keeps an ordered list of subscriber callbacks. Firing a
//! source invokes every connected callback synchronously, in connection order,
//! with a borrowed payload. Input sources, collision notifications, map
//! lifecycle notifications and UI widgets are all instances of this type.
//!
//! # Re-entrancy contract
//!
//! - While a fire is in progress the source is *locked*. Callbacks connected
//!   while locked go to a pending queue. The queue is drained into the active
//!   list at the start of the next call to [`EventSource::fire`], so a callback
//!   connected during a fire is never invoked by that same fire.
//! - Disconnecting takes effect immediately, including for the remainder of an
//!   in-progress iteration: a callback disconnected before it was reached is
//!   skipped.
//! - The lock is released by a drop guard, so a panicking callback cannot
//!   leave the source locked.
//!
//! Disconnecting a connection that is unknown, already disconnected, or
//! belongs to another source is a silent no-op.
//!
//! # Example
//!
//! ```
//! use ledgehop::events::source::EventSource;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let jumped = EventSource::<f32>::new();
//! let total = Rc::new(Cell::new(0.0));
//! let sink = total.clone();
//! let connection = jumped.connect(move |height| sink.set(sink.get() + *height));
//!
//! jumped.fire(&2.5);
//! connection.disconnect();
//! jumped.fire(&10.0);
//! assert_eq!(total.get(), 2.5);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use log::debug;
use smallvec::SmallVec;

type Callback<A> = Rc<dyn Fn(&A)>;

struct Slot<A> {
    id: u64,
    callback: Callback<A>,
    // Shared with in-flight fire snapshots; cleared when the slot is removed.
    alive: Rc<Cell<bool>>,
}

impl<A> Slot<A> {
    fn kill(&self) {
        self.alive.set(false);
    }
}

struct SourceInner<A> {
    active: RefCell<Vec<Slot<A>>>,
    pending: RefCell<Vec<Slot<A>>>,
    next_id: Cell<u64>,
    // Depth counter rather than a flag so nested fires keep the source locked.
    firing: Cell<u32>,
}

/// Type-erased view of a source, used by connections to detach themselves
/// without knowing the payload type.
trait Detach {
    fn detach(&self, id: u64) -> bool;
    fn contains(&self, id: u64) -> bool;
}

impl<A> Detach for SourceInner<A> {
    fn detach(&self, id: u64) -> bool {
        let mut removed = false;
        {
            let mut active = self.active.borrow_mut();
            if let Some(index) = active.iter().position(|slot| slot.id == id) {
                active.remove(index).kill();
                removed = true;
            }
        }
        if !removed {
            let mut pending = self.pending.borrow_mut();
            if let Some(index) = pending.iter().position(|slot| slot.id == id) {
                pending.remove(index).kill();
                removed = true;
            }
        }
        removed
    }

    fn contains(&self, id: u64) -> bool {
        self.active.borrow().iter().any(|slot| slot.id == id)
            || self.pending.borrow().iter().any(|slot| slot.id == id)
    }
}

/// Releases the fire lock when dropped, including during unwinding.
struct FireGuard<'a> {
    depth: &'a Cell<u32>,
}

impl<'a> FireGuard<'a> {
    fn lock(depth: &'a Cell<u32>) -> Self {
        depth.set(depth.get() + 1);
        Self { depth }
    }
}

impl Drop for FireGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// Ordered list of callbacks fired with a payload of type `A`.
///
/// Cloning an `EventSource` yields another handle to the *same* subscriber
/// list, which lets a widget hand out its source while it is itself borrowed.
pub struct EventSource<A: 'static> {
    inner: Rc<SourceInner<A>>,
}

impl<A: 'static> EventSource<A> {
    /// Create a source with no subscribers.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SourceInner {
                active: RefCell::new(Vec::new()),
                pending: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                firing: Cell::new(0),
            }),
        }
    }

    /// Subscribe `callback`. Ids are never reused within the life of the source.
    ///
    /// When called from inside a fire of this source, the callback is queued
    /// and first invoked by the next call to [`fire`](Self::fire).
    pub fn connect<F>(&self, callback: F) -> EventConnection
    where
        F: Fn(&A) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let slot = Slot {
            id,
            callback: Rc::new(callback),
            alive: Rc::new(Cell::new(true)),
        };
        if self.is_firing() {
            debug!("EventSource: connection {} queued during fire", id);
            self.inner.pending.borrow_mut().push(slot);
        } else {
            self.inner.active.borrow_mut().push(slot);
        }
        let erased: Rc<dyn Detach> = self.inner.clone();
        EventConnection {
            source: Some(Rc::downgrade(&erased)),
            id,
        }
    }

    /// Invoke every connected callback with `args`, in connection order.
    pub fn fire(&self, args: &A) {
        let _guard = FireGuard::lock(&self.inner.firing);
        {
            let mut pending = self.inner.pending.borrow_mut();
            if !pending.is_empty() {
                self.inner.active.borrow_mut().extend(pending.drain(..));
            }
        }
        let snapshot: SmallVec<[(Rc<Cell<bool>>, Callback<A>); 8]> = self
            .inner
            .active
            .borrow()
            .iter()
            .map(|slot| (slot.alive.clone(), slot.callback.clone()))
            .collect();
        for (alive, callback) in snapshot {
            // Skip callbacks disconnected earlier in this same pass.
            if alive.get() {
                callback(args);
            }
        }
    }

    /// Remove `connection` from this source. Unknown connections are ignored.
    pub fn disconnect(&self, connection: &EventConnection) {
        if !self.owns(connection) {
            return;
        }
        self.inner.detach(connection.id);
    }

    /// Remove every subscriber, active and pending.
    pub fn disconnect_all(&self) {
        for slot in self.inner.active.borrow_mut().drain(..) {
            slot.kill();
        }
        for slot in self.inner.pending.borrow_mut().drain(..) {
            slot.kill();
        }
    }

    /// Number of subscribers, including ones queued during a fire.
    pub fn len(&self) -> usize {
        self.inner.active.borrow().len() + self.inner.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True while a call to [`fire`](Self::fire) is on the stack.
    pub fn is_firing(&self) -> bool {
        self.inner.firing.get() > 0
    }

    fn owns(&self, connection: &EventConnection) -> bool {
        match &connection.source {
            Some(source) => std::ptr::addr_eq(source.as_ptr(), Rc::as_ptr(&self.inner)),
            None => false,
        }
    }
}

impl<A: 'static> Default for EventSource<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> Clone for EventSource<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: 'static> fmt::Debug for EventSource<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("subscribers", &self.len())
            .field("firing", &self.is_firing())
            .finish()
    }
}

/// Opaque disconnect token returned by [`EventSource::connect`].
///
/// Holds a weak reference to its source, so it never keeps a source alive and
/// disconnecting after the source is gone does nothing. A default-constructed
/// connection is connected to nothing.
#[derive(Clone, Default)]
pub struct EventConnection {
    source: Option<Weak<dyn Detach>>,
    id: u64,
}

impl EventConnection {
    /// Detach from the owning source. Safe to call any number of times.
    pub fn disconnect(&self) {
        if let Some(source) = self.source.as_ref().and_then(Weak::upgrade) {
            if source.detach(self.id) {
                debug!("EventConnection {} disconnected", self.id);
            }
        }
    }

    /// True while the owning source is alive and still holds this connection.
    pub fn is_connected(&self) -> bool {
        self.source
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|source| source.contains(self.id))
    }

    /// Numeric id assigned by the source.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Debug for EventConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventConnection")
            .field("id", &self.id)
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, Rc<RefCell<Vec<&'static str>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (log.clone(), log)
    }

    #[test]
    fn fires_in_connection_order() {
        let source = EventSource::<()>::new();
        let (log, view) = recorder();
        for name in ["c1", "c2", "c3"] {
            let log = log.clone();
            source.connect(move |_| log.borrow_mut().push(name));
        }
        source.fire(&());
        assert_eq!(*view.borrow(), vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn payload_is_delivered_to_every_subscriber() {
        let source = EventSource::<i32>::new();
        let sum = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let sum = sum.clone();
            source.connect(move |v| sum.set(sum.get() + *v));
        }
        source.fire(&7);
        assert_eq!(sum.get(), 21);
    }

    #[test]
    fn connect_during_fire_is_deferred_to_next_fire() {
        let source = EventSource::<()>::new();
        let late_calls = Rc::new(Cell::new(0));
        let connected_once = Rc::new(Cell::new(false));

        let handle = source.clone();
        let late = late_calls.clone();
        let once = connected_once.clone();
        source.connect(move |_| {
            if !once.get() {
                once.set(true);
                let late = late.clone();
                handle.connect(move |_| late.set(late.get() + 1));
            }
        });

        source.fire(&());
        assert_eq!(late_calls.get(), 0, "must not run in the fire that connected it");
        assert_eq!(source.len(), 2);

        source.fire(&());
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn disconnect_during_fire_skips_unvisited_callback() {
        let source = EventSource::<()>::new();
        let (log, view) = recorder();
        let victim: Rc<RefCell<EventConnection>> = Rc::new(RefCell::new(EventConnection::default()));

        let target = victim.clone();
        let first_log = log.clone();
        source.connect(move |_| {
            first_log.borrow_mut().push("first");
            target.borrow().disconnect();
        });
        let second_log = log.clone();
        *victim.borrow_mut() = source.connect(move |_| second_log.borrow_mut().push("second"));
        let third_log = log.clone();
        source.connect(move |_| third_log.borrow_mut().push("third"));

        source.fire(&());
        assert_eq!(*view.borrow(), vec!["first", "third"]);
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn disconnect_all_during_fire_skips_every_remaining_callback() {
        let source = EventSource::<()>::new();
        let (log, view) = recorder();
        let handle = source.clone();
        let first_log = log.clone();
        source.connect(move |_| {
            first_log.borrow_mut().push("first");
            handle.disconnect_all();
        });
        for name in ["second", "third"] {
            let log = log.clone();
            source.connect(move |_| log.borrow_mut().push(name));
        }

        source.fire(&());
        assert_eq!(*view.borrow(), vec!["first"]);
        assert!(source.is_empty());
    }

    #[test]
    fn reconnecting_after_a_disconnect_during_fire_waits_for_next_fire() {
        let source = EventSource::<()>::new();
        let calls = Rc::new(Cell::new(0));
        let victim: Rc<RefCell<EventConnection>> = Rc::new(RefCell::new(EventConnection::default()));

        let target = victim.clone();
        let handle = source.clone();
        let counter = calls.clone();
        let swapped = Rc::new(Cell::new(false));
        let once = swapped.clone();
        source.connect(move |_| {
            if !once.replace(true) {
                target.borrow().disconnect();
                let counter = counter.clone();
                *target.borrow_mut() = handle.connect(move |_| counter.set(counter.get() + 10));
            }
        });
        let counter = calls.clone();
        *victim.borrow_mut() = source.connect(move |_| counter.set(counter.get() + 1));

        // The old slot is skipped and the replacement is queued.
        source.fire(&());
        assert_eq!(calls.get(), 0);
        source.fire(&());
        assert_eq!(calls.get(), 10);
        assert!(victim.borrow().is_connected());
    }

    #[test]
    fn callback_can_disconnect_itself() {
        let source = EventSource::<()>::new();
        let calls = Rc::new(Cell::new(0));
        let own: Rc<RefCell<EventConnection>> = Rc::new(RefCell::new(EventConnection::default()));

        let me = own.clone();
        let counter = calls.clone();
        *own.borrow_mut() = source.connect(move |_| {
            counter.set(counter.get() + 1);
            me.borrow().disconnect();
        });

        source.fire(&());
        source.fire(&());
        assert_eq!(calls.get(), 1);
        assert!(source.is_empty());
    }

    #[test]
    fn disconnecting_unknown_connections_is_a_no_op() {
        let source = EventSource::<()>::new();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let conn = source.connect(move |_| counter.set(counter.get() + 1));

        source.disconnect(&EventConnection::default());
        EventConnection::default().disconnect();

        let other = EventSource::<()>::new();
        other.disconnect(&conn);
        assert!(conn.is_connected());

        conn.disconnect();
        conn.disconnect();
        source.disconnect(&conn);
        assert!(!conn.is_connected());

        source.fire(&());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn disconnecting_a_queued_connection_removes_it_from_the_queue() {
        let source = EventSource::<()>::new();
        let late_calls = Rc::new(Cell::new(0));
        let queued: Rc<RefCell<Option<EventConnection>>> = Rc::new(RefCell::new(None));

        let handle = source.clone();
        let late = late_calls.clone();
        let slot = queued.clone();
        source.connect(move |_| {
            if slot.borrow().is_none() {
                let late = late.clone();
                let conn = handle.connect(move |_| late.set(late.get() + 1));
                conn.disconnect();
                *slot.borrow_mut() = Some(conn);
            }
        });

        source.fire(&());
        source.fire(&());
        assert_eq!(late_calls.get(), 0);
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn connection_ids_increase_monotonically() {
        let source = EventSource::<()>::new();
        let a = source.connect(|_| {});
        a.disconnect();
        let b = source.connect(|_| {});
        let c = source.connect(|_| {});
        assert!(b.id() > a.id());
        assert!(c.id() > b.id());
    }

    #[test]
    fn connection_outliving_its_source_is_inert() {
        let conn = {
            let source = EventSource::<()>::new();
            source.connect(|_| {})
        };
        assert!(!conn.is_connected());
        conn.disconnect();
    }

    #[test]
    fn lock_is_released_when_a_callback_panics() {
        let source = EventSource::<()>::new();
        source.connect(|_| panic!("boom"));
        let result = catch_unwind(AssertUnwindSafe(|| source.fire(&())));
        assert!(result.is_err());
        assert!(!source.is_firing());

        // Not locked any more, so this connects straight into the active list.
        source.disconnect_all();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        source.connect(move |_| counter.set(counter.get() + 1));
        source.fire(&());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn nested_fire_stays_locked_until_outer_fire_ends() {
        let source = EventSource::<u32>::new();
        let handle = source.clone();
        let observed = Rc::new(RefCell::new(Vec::new()));
        let seen = observed.clone();
        source.connect(move |depth| {
            seen.borrow_mut().push((*depth, handle.is_firing()));
            if *depth == 0 {
                handle.fire(&1);
                seen.borrow_mut().push((99, handle.is_firing()));
            }
        });
        source.fire(&0);
        assert_eq!(*observed.borrow(), vec![(0, true), (1, true), (99, true)]);
        assert!(!source.is_firing());
    }

    #[test]
    fn clones_share_subscribers() {
        let source = EventSource::<()>::new();
        let alias = source.clone();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let conn = alias.connect(move |_| counter.set(counter.get() + 1));
        source.fire(&());
        source.disconnect(&conn);
        alias.fire(&());
        assert_eq!(calls.get(), 1);
    }
}
