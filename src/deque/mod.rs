//! Bounded blocking deque
//!
//! This module provides [`BlockingDeque`], a capacity-gated deque for
//! producer-consumer pipelines, bounded work queues, and thread-pool task
//! buffers.
//!
//! ## Guarantees
//!
//! - **Bounded**: `len()` never exceeds the fixed capacity
//! - **Blocking**: `put_*`/`take_*` suspend on condition variables instead
//!   of spinning; non-blocking and deadline-based variants are provided
//! - **Exactly-once delivery**: no element is lost or duplicated under any
//!   interleaving of producers and consumers
//! - **Weakly-consistent iteration**: traversal cooperates with concurrent
//!   mutation instead of failing

mod arena;
mod blocking;
mod iter;

pub use self::blocking::BlockingDeque;
pub use self::iter::{DescendingIter, Iter};


#[cfg(test)]
mod proptests;
