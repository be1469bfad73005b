//! # dequex
//!
//! A bounded, blocking, double-ended queue safe for concurrent use by any
//! number of producer and consumer threads at either end.
//!
//! ## Features
//!
//! - **Capacity gate**: a fixed positive capacity; inserts block (or fail,
//!   or time out, depending on the variant) while the deque is full
//! - **Both ends**: every insert/remove verb exists for the front and the
//!   back, so the deque doubles as a FIFO queue, a LIFO stack, or both
//! - **Weakly-consistent iteration**: iterators tolerate concurrent
//!   mutation instead of failing, and support removal of the last-yielded
//!   element
//! - **Bulk draining**: move many elements into a caller-provided sink
//!   under a single lock acquisition
//!
//! ## Quick Start
//!
//! ```rust
//! use dequex::BlockingDeque;
//!
//! let deque = BlockingDeque::new(100);
//! deque.put_back(42).unwrap();
//! assert_eq!(deque.take_front(), Ok(42));
//! ```
//!
//! ## Thread Safety
//!
//! [`BlockingDeque`] takes `&self` for every operation and is `Send + Sync`
//! for `T: Send`; share it across threads behind an [`std::sync::Arc`].
//! One mutex serializes all structural mutation, paired with two condition
//! variables ("not full" / "not empty") that gate the blocking verbs. Every
//! wait re-checks its predicate in a loop, so spurious wakeups are
//! harmless, and timed waits measure against a deadline fixed at call
//! entry, so repeated wakeups cannot stretch the total wait.
//!
//! ## Ordering
//!
//! Elements inserted at the same end emerge in FIFO order relative to each
//! other. When both ends are mutated concurrently there is no global
//! ordering guarantee, only that every element appears exactly once and
//! the size arithmetic is exact.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

use core::fmt;

pub mod deque;
pub mod metrics;

pub use crate::deque::{BlockingDeque, DescendingIter, Iter};

/// Error type for removal-side operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The deque was empty and the operation does not block.
    Empty,
    /// A timed wait reached its deadline before the operation could proceed.
    TimedOut,
    /// A blocking wait was aborted by [`BlockingDeque::interrupt_waiters`].
    Interrupted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Empty => write!(f, "Deque is empty"),
            Error::TimedOut => write!(f, "Operation timed out"),
            Error::Interrupted => write!(f, "Blocking operation was interrupted"),
        }
    }
}

impl std::error::Error for Error {}

/// Error type for insert-side operations.
///
/// Insert failures hand the rejected element back to the caller, so a full
/// deque never costs you the value you tried to store:
///
/// ```rust
/// use dequex::{BlockingDeque, PushError};
///
/// let deque = BlockingDeque::new(1);
/// deque.try_push_back("a").unwrap();
/// match deque.try_push_back("b") {
///     Err(PushError::Full(value)) => assert_eq!(value, "b"),
///     other => panic!("unexpected: {:?}", other.map_err(|_| ())),
/// }
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum PushError<T> {
    /// The deque was at capacity; the element is returned.
    Full(T),
    /// The deadline expired with the deque still full; the element is returned.
    TimedOut(T),
    /// The blocking wait was aborted; the element is returned.
    Interrupted(T),
}

impl<T> PushError<T> {
    /// Returns the element that could not be inserted.
    pub fn into_inner(self) -> T {
        match self {
            PushError::Full(value) | PushError::TimedOut(value) | PushError::Interrupted(value) => {
                value
            }
        }
    }

    /// True when the failure was a capacity rejection rather than a
    /// timeout or interruption.
    pub fn is_full(&self) -> bool {
        matches!(self, PushError::Full(_))
    }
}

// Manual Debug/Display so the element type needs no bounds.
impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Full(_) => f.write_str("Full(..)"),
            PushError::TimedOut(_) => f.write_str("TimedOut(..)"),
            PushError::Interrupted(_) => f.write_str("Interrupted(..)"),
        }
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Full(_) => write!(f, "Deque is full"),
            PushError::TimedOut(_) => write!(f, "Insert timed out"),
            PushError::Interrupted(_) => write!(f, "Blocking insert was interrupted"),
        }
    }
}

impl<T> std::error::Error for PushError<T> {}

/// Result type for dequex operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;
