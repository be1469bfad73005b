//! Bounded blocking deque implementation.
//!
//! ## Design
//!
//! One `parking_lot::Mutex` guards the whole structure: the node arena, the
//! head/tail handles, and the element count that implements the capacity
//! gate. Two condition variables are keyed on that count:
//!
//! - `not_full`: signalled whenever a removal frees a slot
//! - `not_empty`: signalled whenever an insertion adds an element
//!
//! Every blocking verb waits in a predicate loop, so spurious wakeups are
//! tolerated, and timed variants compute one absolute deadline at entry so
//! repeated wakeups cannot extend the total wait.
//!
//! ## Interruption
//!
//! [`BlockingDeque::interrupt_waiters`] bumps a wait epoch under the lock
//! and broadcasts both conditions. A waiter that entered under an earlier
//! epoch aborts with `Interrupted` on its next wakeup, leaving the deque
//! untouched. The deque stays fully usable afterwards; there is no closed
//! or terminal state.

use crate::metrics::{AtomicMetrics, MetricsCollector, PerformanceMetrics};
use crate::{Error, PushError};
use core::fmt;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::arena::{Arena, NodeRef};

/// Which end of the deque an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum End {
    Front,
    Back,
}

/// Lock-guarded state. All structural invariants hold at lock release:
/// `count` equals the number of live nodes, `count == 0` iff `head` and
/// `tail` are `None`, and live neighbours agree on their links.
#[derive(Debug)]
pub(crate) struct Inner<T> {
    pub(crate) arena: Arena<T>,
    pub(crate) head: Option<NodeRef>,
    pub(crate) tail: Option<NodeRef>,
    pub(crate) count: usize,
    /// Unlinked slots kept alive while iterators hold handles into them.
    retired: Vec<NodeRef>,
    /// Number of live iterators over this deque.
    pub(crate) cursors: usize,
    /// Bumped by `interrupt_waiters`; waiters compare against the value
    /// they saw at entry.
    pub(crate) wait_epoch: u64,
}

impl<T> Inner<T> {
    fn new(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
            head: None,
            tail: None,
            count: 0,
            retired: Vec::new(),
            cursors: 0,
            wait_epoch: 0,
        }
    }

    /// Link a fresh node holding `item` at the given end.
    /// The caller has already checked the capacity gate.
    fn link(&mut self, end: End, item: T) {
        let r = self.arena.alloc(item);
        match end {
            End::Front => {
                let old = self.head;
                if let Some(node) = self.arena.node_mut(r) {
                    node.next = old;
                }
                match old {
                    Some(h) => {
                        if let Some(node) = self.arena.node_mut(h) {
                            node.prev = Some(r);
                        }
                    }
                    None => self.tail = Some(r),
                }
                self.head = Some(r);
            }
            End::Back => {
                let old = self.tail;
                if let Some(node) = self.arena.node_mut(r) {
                    node.prev = old;
                }
                match old {
                    Some(t) => {
                        if let Some(node) = self.arena.node_mut(t) {
                            node.next = Some(r);
                        }
                    }
                    None => self.head = Some(r),
                }
                self.tail = Some(r);
            }
        }
        self.count += 1;
    }

    pub(crate) fn unlink_end(&mut self, end: End) -> Option<T> {
        match end {
            End::Front => self.unlink_front(),
            End::Back => self.unlink_back(),
        }
    }

    pub(crate) fn unlink_front(&mut self) -> Option<T> {
        let f = self.head?;
        let (item, next) = {
            let node = self.arena.node_mut(f)?;
            let item = node.item.take();
            let next = node.next;
            // Self-link tells forward cursors resting here that the node
            // was removed at the front.
            node.next = Some(f);
            (item, next)
        };
        self.head = next;
        match next {
            Some(n) => {
                if let Some(node) = self.arena.node_mut(n) {
                    node.prev = None;
                }
            }
            None => self.tail = None,
        }
        self.count -= 1;
        self.retire(f);
        item
    }

    pub(crate) fn unlink_back(&mut self) -> Option<T> {
        let l = self.tail?;
        let (item, prev) = {
            let node = self.arena.node_mut(l)?;
            let item = node.item.take();
            let prev = node.prev;
            node.prev = Some(l);
            (item, prev)
        };
        self.tail = prev;
        match prev {
            Some(p) => {
                if let Some(node) = self.arena.node_mut(p) {
                    node.next = None;
                }
            }
            None => self.head = None,
        }
        self.count -= 1;
        self.retire(l);
        item
    }

    /// Unlink an arbitrary live node. Returns false if the handle is stale
    /// or the node was already unlinked, which makes concurrent iterator
    /// removals a safe no-op.
    pub(crate) fn unlink(&mut self, r: NodeRef) -> bool {
        let (prev, next) = match self.arena.node(r) {
            Some(node) if node.item.is_some() => (node.prev, node.next),
            _ => return false,
        };
        match (prev, next) {
            // A live node with no predecessor is the head, and mirrored.
            (None, _) => self.unlink_front().is_some(),
            (_, None) => self.unlink_back().is_some(),
            (Some(p), Some(n)) => {
                if let Some(node) = self.arena.node_mut(p) {
                    node.next = Some(n);
                }
                if let Some(node) = self.arena.node_mut(n) {
                    node.prev = Some(p);
                }
                // Interior tombstone: the item goes, the links stay so a
                // cursor resting here can keep walking.
                if let Some(node) = self.arena.node_mut(r) {
                    node.item = None;
                }
                self.count -= 1;
                self.retire(r);
                true
            }
        }
    }

    fn retire(&mut self, r: NodeRef) {
        if self.cursors > 0 {
            self.retired.push(r);
        } else {
            self.arena.free(r);
        }
    }

    /// Called when the last iterator drops.
    pub(crate) fn flush_retired(&mut self) {
        for r in self.retired.drain(..) {
            self.arena.free(r);
        }
    }

    pub(crate) fn end_ref(&self, end: End) -> Option<NodeRef> {
        match end {
            End::Front => self.head,
            End::Back => self.tail,
        }
    }

    /// Next live node after `from`, walking away from `end`.
    ///
    /// Chases through interior tombstones. A self-link (or a reclaimed
    /// slot) means the chain was severed at the traversal end, so the walk
    /// re-resolves from the current first live node, mirroring the
    /// weakly-consistent contract: never fail, possibly skip.
    pub(crate) fn successor(&self, from: NodeRef, end: End) -> Option<NodeRef> {
        let mut n = from;
        loop {
            let node = match self.arena.node(n) {
                Some(node) => node,
                None => return self.end_ref(end),
            };
            let s = match end {
                End::Front => node.next,
                End::Back => node.prev,
            };
            let s = match s {
                Some(s) => s,
                None => return None,
            };
            if s == n {
                return self.end_ref(end);
            }
            match self.arena.node(s) {
                Some(next) if next.item.is_some() => return Some(s),
                Some(_) => n = s,
                None => return self.end_ref(end),
            }
        }
    }
}

/// A bounded, blocking, double-ended queue for concurrent producers and
/// consumers.
///
/// Capacity is fixed at construction. Insert verbs come in blocking
/// (`put_*`), timed (`put_*_timeout`) and non-blocking (`try_push_*`)
/// variants; removal mirrors them (`take_*`, `take_*_timeout`,
/// `try_pop_*`, `remove_*`). All operations take `&self`.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use dequex::BlockingDeque;
///
/// let deque = Arc::new(BlockingDeque::new(4));
///
/// let producer = {
///     let deque = Arc::clone(&deque);
///     thread::spawn(move || {
///         for i in 0..8 {
///             deque.put_back(i).unwrap();
///         }
///     })
/// };
///
/// let mut received = Vec::new();
/// for _ in 0..8 {
///     received.push(deque.take_front().unwrap());
/// }
/// producer.join().unwrap();
/// assert_eq!(received, vec![0, 1, 2, 3, 4, 5, 6, 7]);
/// ```
pub struct BlockingDeque<T> {
    capacity: usize,
    pub(crate) inner: Mutex<Inner<T>>,
    pub(crate) not_full: Condvar,
    pub(crate) not_empty: Condvar,
    metrics: AtomicMetrics,
    metrics_enabled: AtomicBool,
}

impl<T> BlockingDeque<T> {
    /// Create a deque that holds at most `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        Self {
            capacity,
            inner: Mutex::new(Inner::new(capacity)),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            metrics: AtomicMetrics::default(),
            metrics_enabled: AtomicBool::new(true),
        }
    }

    /// Insert at the front, blocking while the deque is full.
    ///
    /// Returns `Err(PushError::Interrupted)` carrying the element back if
    /// [`interrupt_waiters`](Self::interrupt_waiters) fires while this call
    /// is blocked; the deque is left exactly as it was.
    pub fn put_front(&self, value: T) -> Result<(), PushError<T>> {
        self.put(value, End::Front)
    }

    /// Insert at the back, blocking while the deque is full.
    ///
    /// See [`put_front`](Self::put_front) for the interruption contract.
    pub fn put_back(&self, value: T) -> Result<(), PushError<T>> {
        self.put(value, End::Back)
    }

    /// Insert at the front, blocking at most `timeout`.
    ///
    /// The deadline is fixed once at entry; spurious wakeups re-wait for
    /// the remaining time only. On expiry with the deque still full the
    /// element comes back in `PushError::TimedOut`.
    pub fn put_front_timeout(&self, value: T, timeout: Duration) -> Result<(), PushError<T>> {
        self.put_timeout(value, timeout, End::Front)
    }

    /// Insert at the back, blocking at most `timeout`.
    pub fn put_back_timeout(&self, value: T, timeout: Duration) -> Result<(), PushError<T>> {
        self.put_timeout(value, timeout, End::Back)
    }

    /// Insert at the front without blocking.
    ///
    /// Fails fast with `PushError::Full` (returning the element) when the
    /// deque is at capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dequex::BlockingDeque;
    ///
    /// let deque = BlockingDeque::new(1);
    /// assert!(deque.try_push_front(1).is_ok());
    /// assert!(deque.try_push_front(2).is_err());
    /// ```
    pub fn try_push_front(&self, value: T) -> Result<(), PushError<T>> {
        self.try_push(value, End::Front)
    }

    /// Insert at the back without blocking.
    pub fn try_push_back(&self, value: T) -> Result<(), PushError<T>> {
        self.try_push(value, End::Back)
    }

    /// Remove the front element, blocking while the deque is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dequex::BlockingDeque;
    ///
    /// let deque = BlockingDeque::new(2);
    /// deque.put_back("a").unwrap();
    /// assert_eq!(deque.take_front(), Ok("a"));
    /// ```
    pub fn take_front(&self) -> Result<T, Error> {
        self.take(End::Front)
    }

    /// Remove the back element, blocking while the deque is empty.
    pub fn take_back(&self) -> Result<T, Error> {
        self.take(End::Back)
    }

    /// Remove the front element, blocking at most `timeout`.
    pub fn take_front_timeout(&self, timeout: Duration) -> Result<T, Error> {
        self.take_timeout(timeout, End::Front)
    }

    /// Remove the back element, blocking at most `timeout`.
    pub fn take_back_timeout(&self, timeout: Duration) -> Result<T, Error> {
        self.take_timeout(timeout, End::Back)
    }

    /// Remove the front element without blocking; `None` when empty.
    pub fn try_pop_front(&self) -> Option<T> {
        self.try_pop(End::Front)
    }

    /// Remove the back element without blocking; `None` when empty.
    pub fn try_pop_back(&self) -> Option<T> {
        self.try_pop(End::Back)
    }

    /// Remove the front element, failing with [`Error::Empty`] when there
    /// is none. The unconditional-accessor variant of
    /// [`try_pop_front`](Self::try_pop_front).
    pub fn remove_front(&self) -> Result<T, Error> {
        self.try_pop_front().ok_or(Error::Empty)
    }

    /// Remove the back element, failing with [`Error::Empty`] when there
    /// is none.
    pub fn remove_back(&self) -> Result<T, Error> {
        self.try_pop_back().ok_or(Error::Empty)
    }

    /// Current number of elements.
    pub fn len(&self) -> usize {
        self.inner.lock().count
    }

    /// True when the deque holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the deque is at capacity.
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Maximum number of elements the deque can hold.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of additional elements the deque can accept right now.
    pub fn remaining_capacity(&self) -> usize {
        self.capacity - self.len()
    }

    /// Remove every element. Frees capacity in one step and wakes all
    /// blocked producers.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        while inner.unlink_front().is_some() {}
        self.not_full.notify_all();
    }

    /// Abort every wait currently blocked on this deque.
    ///
    /// Each blocked `put_*`/`take_*` call returns `Interrupted` without
    /// having mutated anything. Calls that are not waiting, and calls that
    /// start after this returns, are unaffected; the deque remains usable.
    pub fn interrupt_waiters(&self) {
        let mut inner = self.inner.lock();
        inner.wait_epoch += 1;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Move up to `max` elements from the front into `sink`, in order.
    ///
    /// The elements are unlinked under a single lock acquisition, so the
    /// transfer is atomic with respect to every other deque operation;
    /// exactly `min(max, len)` elements move. The count moved is returned
    /// and blocked producers are woken if anything was removed.
    ///
    /// Draining the deque into itself cannot be expressed: the sink is a
    /// `&mut` borrow and `BlockingDeque` does not implement [`Extend`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dequex::BlockingDeque;
    ///
    /// let deque = BlockingDeque::new(8);
    /// for i in 0..5 {
    ///     deque.put_back(i).unwrap();
    /// }
    ///
    /// let mut sink = Vec::new();
    /// assert_eq!(deque.drain_into_limit(&mut sink, 3), 3);
    /// assert_eq!(sink, vec![0, 1, 2]);
    /// assert_eq!(deque.len(), 2);
    /// ```
    pub fn drain_into_limit<S: Extend<T>>(&self, sink: &mut S, max: usize) -> usize {
        let mut inner = self.inner.lock();
        let n = max.min(inner.count);
        let mut drained = Vec::with_capacity(n);
        for _ in 0..n {
            if let Some(item) = inner.unlink_front() {
                drained.push(item);
            }
        }
        if n > 0 {
            self.not_full.notify_all();
        }
        drop(inner);
        sink.extend(drained);
        n
    }

    /// Move every element into `sink`. See
    /// [`drain_into_limit`](Self::drain_into_limit).
    pub fn drain_into<S: Extend<T>>(&self, sink: &mut S) -> usize {
        self.drain_into_limit(sink, usize::MAX)
    }

    // Blocking insert core: wait on not_full, link, signal not_empty.
    fn put(&self, value: T, end: End) -> Result<(), PushError<T>> {
        let start = Instant::now();
        let mut inner = self.inner.lock();
        let epoch = inner.wait_epoch;
        let mut blocked = false;
        while inner.count == self.capacity {
            blocked = true;
            self.not_full.wait(&mut inner);
            if inner.wait_epoch != epoch {
                drop(inner);
                self.record_failure(blocked);
                return Err(PushError::Interrupted(value));
            }
        }
        inner.link(end, value);
        self.not_empty.notify_one();
        drop(inner);
        self.record_success(start, blocked);
        Ok(())
    }

    fn put_timeout(&self, value: T, timeout: Duration, end: End) -> Result<(), PushError<T>> {
        let start = Instant::now();
        let deadline = start + timeout;
        let mut inner = self.inner.lock();
        let epoch = inner.wait_epoch;
        let mut blocked = false;
        let mut timed_out = false;
        while inner.count == self.capacity {
            if timed_out {
                drop(inner);
                self.record_timeout(blocked);
                return Err(PushError::TimedOut(value));
            }
            blocked = true;
            let result = self.not_full.wait_until(&mut inner, deadline);
            if inner.wait_epoch != epoch {
                drop(inner);
                self.record_failure(blocked);
                return Err(PushError::Interrupted(value));
            }
            // Re-check the gate once more after a timed-out wakeup; a slot
            // freed exactly at the deadline is still ours to use.
            timed_out = result.timed_out();
        }
        inner.link(end, value);
        self.not_empty.notify_one();
        drop(inner);
        self.record_success(start, blocked);
        Ok(())
    }

    fn try_push(&self, value: T, end: End) -> Result<(), PushError<T>> {
        let start = Instant::now();
        let mut inner = self.inner.lock();
        if inner.count == self.capacity {
            drop(inner);
            self.record_failure(false);
            return Err(PushError::Full(value));
        }
        inner.link(end, value);
        self.not_empty.notify_one();
        drop(inner);
        self.record_success(start, false);
        Ok(())
    }

    fn take(&self, end: End) -> Result<T, Error> {
        let start = Instant::now();
        let mut inner = self.inner.lock();
        let epoch = inner.wait_epoch;
        let mut blocked = false;
        loop {
            if let Some(item) = inner.unlink_end(end) {
                self.not_full.notify_one();
                drop(inner);
                self.record_success(start, blocked);
                return Ok(item);
            }
            blocked = true;
            self.not_empty.wait(&mut inner);
            if inner.wait_epoch != epoch {
                drop(inner);
                self.record_failure(blocked);
                return Err(Error::Interrupted);
            }
        }
    }

    fn take_timeout(&self, timeout: Duration, end: End) -> Result<T, Error> {
        let start = Instant::now();
        let deadline = start + timeout;
        let mut inner = self.inner.lock();
        let epoch = inner.wait_epoch;
        let mut blocked = false;
        let mut timed_out = false;
        loop {
            if let Some(item) = inner.unlink_end(end) {
                self.not_full.notify_one();
                drop(inner);
                self.record_success(start, blocked);
                return Ok(item);
            }
            if timed_out {
                drop(inner);
                self.record_timeout(blocked);
                return Err(Error::TimedOut);
            }
            blocked = true;
            let result = self.not_empty.wait_until(&mut inner, deadline);
            if inner.wait_epoch != epoch {
                drop(inner);
                self.record_failure(blocked);
                return Err(Error::Interrupted);
            }
            timed_out = result.timed_out();
        }
    }

    fn try_pop(&self, end: End) -> Option<T> {
        let start = Instant::now();
        let mut inner = self.inner.lock();
        let item = inner.unlink_end(end);
        if item.is_some() {
            self.not_full.notify_one();
            drop(inner);
            self.record_success(start, false);
        } else {
            drop(inner);
            self.record_failure(false);
        }
        item
    }

    fn record_success(&self, start: Instant, blocked: bool) {
        if self.metrics_enabled.load(Ordering::Relaxed) {
            if blocked {
                self.metrics.record_blocked();
            }
            self.metrics.record_success(start.elapsed());
        }
    }

    fn record_failure(&self, blocked: bool) {
        if self.metrics_enabled.load(Ordering::Relaxed) {
            if blocked {
                self.metrics.record_blocked();
            }
            self.metrics.record_failure();
        }
    }

    fn record_timeout(&self, blocked: bool) {
        if self.metrics_enabled.load(Ordering::Relaxed) {
            if blocked {
                self.metrics.record_blocked();
            }
            self.metrics.record_timeout();
        }
    }
}

impl<T: Clone> BlockingDeque<T> {
    /// Clone of the front element without removing it; `None` when empty.
    /// Never blocks, never mutates.
    pub fn peek_front(&self) -> Option<T> {
        self.peek(End::Front)
    }

    /// Clone of the back element without removing it; `None` when empty.
    pub fn peek_back(&self) -> Option<T> {
        self.peek(End::Back)
    }

    fn peek(&self, end: End) -> Option<T> {
        let inner = self.inner.lock();
        let r = inner.end_ref(end)?;
        inner.arena.node(r)?.item.clone()
    }
}

impl<T: PartialEq> BlockingDeque<T> {
    /// Remove the first element equal to `value`, scanning from the front.
    ///
    /// The scan runs entirely under the lock, so it is linearized at its
    /// lock acquisition; mutations that happen afterwards are not seen.
    /// Returns whether a match was removed.
    pub fn remove_first_occurrence(&self, value: &T) -> bool {
        self.remove_occurrence(value, End::Front)
    }

    /// Remove the first element equal to `value`, scanning from the back.
    pub fn remove_last_occurrence(&self, value: &T) -> bool {
        self.remove_occurrence(value, End::Back)
    }

    /// True when some element equals `value`. Consistent snapshot under
    /// the lock.
    pub fn contains(&self, value: &T) -> bool {
        let inner = self.inner.lock();
        let mut cur = inner.head;
        while let Some(r) = cur {
            match inner.arena.node(r) {
                Some(node) => {
                    if node.item.as_ref() == Some(value) {
                        return true;
                    }
                    cur = node.next;
                }
                None => break,
            }
        }
        false
    }

    fn remove_occurrence(&self, value: &T, from: End) -> bool {
        let mut inner = self.inner.lock();
        let mut cur = inner.end_ref(from);
        while let Some(r) = cur {
            let (matched, next) = match inner.arena.node(r) {
                Some(node) => {
                    let step = match from {
                        End::Front => node.next,
                        End::Back => node.prev,
                    };
                    (node.item.as_ref() == Some(value), step)
                }
                None => break,
            };
            if matched && inner.unlink(r) {
                self.not_full.notify_one();
                return true;
            }
            cur = next;
        }
        false
    }
}

impl<T> fmt::Debug for BlockingDeque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingDeque")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<T> MetricsCollector for BlockingDeque<T> {
    fn metrics(&self) -> PerformanceMetrics {
        self.metrics.snapshot()
    }

    fn reset_metrics(&self) {
        self.metrics.reset();
    }

    fn set_metrics_enabled(&self, enabled: bool) {
        self.metrics_enabled.store(enabled, Ordering::Relaxed);
    }

    fn is_metrics_enabled(&self) -> bool {
        self.metrics_enabled.load(Ordering::Relaxed)
    }
}
