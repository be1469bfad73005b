//! Weakly-consistent iteration over the blocking deque.
//!
//! Iterators never hold the lock across steps: creation and each advance
//! take it briefly, user code between calls runs unlocked. Concurrent
//! structural changes never make an iterator fail; elements removed after
//! creation may be skipped, elements inserted after creation may or may
//! not appear, and an element present throughout is yielded exactly once.
//!
//! The cursor rests on node handles. An interior-removed node keeps its
//! links, so the walk steps straight over it; a node removed at the
//! traversal end carries a self-link, which tells the cursor to re-resolve
//! from the current end instead of failing.

use super::arena::NodeRef;
use super::blocking::{BlockingDeque, End};

impl<T: Clone> BlockingDeque<T> {
    /// Weakly-consistent front-to-back iterator.
    ///
    /// Elements are yielded as clones taken under the lock, one step at a
    /// time. See the module docs for the consistency contract.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dequex::BlockingDeque;
    ///
    /// let deque = BlockingDeque::new(4);
    /// deque.put_back(1).unwrap();
    /// deque.put_back(2).unwrap();
    /// deque.put_back(3).unwrap();
    ///
    /// let seen: Vec<i32> = deque.iter().collect();
    /// assert_eq!(seen, vec![1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self, End::Front)
    }

    /// Weakly-consistent back-to-front iterator, the mirror of
    /// [`iter`](Self::iter).
    pub fn descending_iter(&self) -> DescendingIter<'_, T> {
        DescendingIter(Iter::new(self, End::Back))
    }
}

/// Forward iterator over a [`BlockingDeque`]. Created by
/// [`BlockingDeque::iter`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    deque: &'a BlockingDeque<T>,
    /// Next node to yield plus its item, captured eagerly under the lock
    /// so a concurrent unlink cannot invalidate an already-promised value.
    next: Option<NodeRef>,
    next_item: Option<T>,
    /// Most recently yielded node, target of `remove`.
    last: Option<NodeRef>,
    origin: End,
}

impl<'a, T: Clone> Iter<'a, T> {
    fn new(deque: &'a BlockingDeque<T>, origin: End) -> Self {
        let mut inner = deque.inner.lock();
        inner.cursors += 1;
        let next = inner.end_ref(origin);
        let next_item = next
            .and_then(|r| inner.arena.node(r))
            .and_then(|node| node.item.clone());
        Self {
            deque,
            next,
            next_item,
            last: None,
            origin,
        }
    }

    fn advance(&mut self) {
        let cur = match self.next {
            Some(cur) => cur,
            None => return,
        };
        let inner = self.deque.inner.lock();
        self.next = inner.successor(cur, self.origin);
        self.next_item = self
            .next
            .and_then(|r| inner.arena.node(r))
            .and_then(|node| node.item.clone());
    }
}

impl<'a, T> Iter<'a, T> {
    /// Unlink the most recently yielded element from the deque.
    ///
    /// Returns `true` if this call removed it. If another thread already
    /// unlinked that node, or nothing was yielded yet, this is a no-op
    /// returning `false`; it never fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dequex::BlockingDeque;
    ///
    /// let deque = BlockingDeque::new(4);
    /// deque.put_back(1).unwrap();
    /// deque.put_back(2).unwrap();
    ///
    /// let mut iter = deque.iter();
    /// assert_eq!(iter.next(), Some(1));
    /// assert!(iter.remove());
    /// drop(iter);
    ///
    /// assert_eq!(deque.len(), 1);
    /// assert_eq!(deque.take_front(), Ok(2));
    /// ```
    pub fn remove(&mut self) -> bool {
        let r = match self.last.take() {
            Some(r) => r,
            None => return false,
        };
        let mut inner = self.deque.inner.lock();
        if inner.unlink(r) {
            self.deque.not_full.notify_one();
            true
        } else {
            false
        }
    }
}

impl<'a, T: Clone> Iterator for Iter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.next_item.take()?;
        self.last = self.next;
        self.advance();
        Some(item)
    }
}

impl<'a, T> Drop for Iter<'a, T> {
    fn drop(&mut self) {
        let mut inner = self.deque.inner.lock();
        inner.cursors -= 1;
        if inner.cursors == 0 {
            inner.flush_retired();
        }
    }
}

/// Reverse iterator over a [`BlockingDeque`]. Created by
/// [`BlockingDeque::descending_iter`].
#[derive(Debug)]
pub struct DescendingIter<'a, T>(Iter<'a, T>);

impl<'a, T> DescendingIter<'a, T> {
    /// Unlink the most recently yielded element. See [`Iter::remove`].
    pub fn remove(&mut self) -> bool {
        self.0.remove()
    }
}

impl<'a, T: Clone> Iterator for DescendingIter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.next()
    }
}
