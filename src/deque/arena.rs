//! Node store for the blocking deque.
//!
//! Nodes live in a slot arena addressed by generational handles instead of
//! pointers. A handle stays stable for the life of its slot; freeing a slot
//! bumps the generation, so a stale handle resolves to `None` instead of
//! aliasing whatever reuses the slot. All access happens under the deque's
//! lock, so none of this is atomic.

use core::fmt;

/// Stable handle to a node slot.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeRef {
    index: u32,
    generation: u32,
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({}v{})", self.index, self.generation)
    }
}

/// One element plus its neighbour links.
///
/// A live node always has `item == Some(..)`. Unlinking takes the item and
/// leaves a tombstone the iterators can interpret:
///
/// - removed from the front: `next` self-links
/// - removed from the back: `prev` self-links
/// - removed from the interior: both links stay intact
#[derive(Debug)]
pub(crate) struct Node<T> {
    pub item: Option<T>,
    pub prev: Option<NodeRef>,
    pub next: Option<NodeRef>,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

/// Arena of node slots with a free list.
#[derive(Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Arena<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Allocate a slot holding `item` with both links empty.
    pub fn alloc(&mut self, item: T) -> NodeRef {
        let node = Node {
            item: Some(item),
            prev: None,
            next: None,
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeRef {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeRef {
                index,
                generation: 0,
            }
        }
    }

    /// Resolve a handle; `None` if the slot was freed (possibly reused).
    pub fn node(&self, r: NodeRef) -> Option<&Node<T>> {
        let slot = self.slots.get(r.index as usize)?;
        if slot.generation != r.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn node_mut(&mut self, r: NodeRef) -> Option<&mut Node<T>> {
        let slot = self.slots.get_mut(r.index as usize)?;
        if slot.generation != r.generation {
            return None;
        }
        slot.node.as_mut()
    }

    /// Release the slot; the handle and any copy of it go stale.
    pub fn free(&mut self, r: NodeRef) {
        if let Some(slot) = self.slots.get_mut(r.index as usize) {
            if slot.generation == r.generation && slot.node.is_some() {
                slot.node = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(r.index);
            }
        }
    }
}
