//! Property-based tests for the blocking deque using proptest
//!
//! These tests verify that the deque behaves exactly like a reference
//! model (a `VecDeque` behind a capacity gate) for any single-threaded
//! operation sequence, and that the structural invariants hold across
//! arbitrary edits.

use super::BlockingDeque;
use proptest::prelude::*;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Op {
    PushFront(i32),
    PushBack(i32),
    PopFront,
    PopBack,
    PeekFront,
    PeekBack,
    RemoveOccurrence(i32),
    Drain(usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::PushFront),
        4 => any::<i32>().prop_map(Op::PushBack),
        3 => Just(Op::PopFront),
        3 => Just(Op::PopBack),
        1 => Just(Op::PeekFront),
        1 => Just(Op::PeekBack),
        1 => (0i32..8).prop_map(Op::RemoveOccurrence),
        1 => (0usize..6).prop_map(Op::Drain),
        1 => Just(Op::Clear),
    ]
}

mod model_equivalence {
    use super::*;

    proptest! {
        #[test]
        fn test_matches_vecdeque_model(
            capacity in 1usize..16,
            ops in prop::collection::vec(op_strategy(), 1..200)
        ) {
            let deque: BlockingDeque<i32> = BlockingDeque::new(capacity);
            let mut model: VecDeque<i32> = VecDeque::new();

            for op in ops {
                match op {
                    Op::PushFront(value) => {
                        let accepted = deque.try_push_front(value).is_ok();
                        prop_assert_eq!(accepted, model.len() < capacity);
                        if accepted {
                            model.push_front(value);
                        }
                    }
                    Op::PushBack(value) => {
                        let accepted = deque.try_push_back(value).is_ok();
                        prop_assert_eq!(accepted, model.len() < capacity);
                        if accepted {
                            model.push_back(value);
                        }
                    }
                    Op::PopFront => {
                        prop_assert_eq!(deque.try_pop_front(), model.pop_front());
                    }
                    Op::PopBack => {
                        prop_assert_eq!(deque.try_pop_back(), model.pop_back());
                    }
                    Op::PeekFront => {
                        prop_assert_eq!(deque.peek_front(), model.front().copied());
                    }
                    Op::PeekBack => {
                        prop_assert_eq!(deque.peek_back(), model.back().copied());
                    }
                    Op::RemoveOccurrence(value) => {
                        let removed = deque.remove_first_occurrence(&value);
                        let model_pos = model.iter().position(|&v| v == value);
                        prop_assert_eq!(removed, model_pos.is_some());
                        if let Some(pos) = model_pos {
                            model.remove(pos);
                        }
                    }
                    Op::Drain(max) => {
                        let mut sink = Vec::new();
                        let moved = deque.drain_into_limit(&mut sink, max);
                        let expected: Vec<i32> =
                            model.drain(..max.min(model.len())).collect();
                        prop_assert_eq!(moved, expected.len());
                        prop_assert_eq!(sink, expected);
                    }
                    Op::Clear => {
                        deque.clear();
                        model.clear();
                    }
                }

                // Invariants after every step.
                prop_assert!(deque.len() <= capacity);
                prop_assert_eq!(deque.len(), model.len());
                prop_assert_eq!(deque.is_empty(), model.is_empty());
                prop_assert_eq!(
                    deque.remaining_capacity(),
                    capacity - model.len()
                );
            }

            // Full contents agree front-to-back and back-to-front.
            let forward: Vec<i32> = deque.iter().collect();
            let model_forward: Vec<i32> = model.iter().copied().collect();
            prop_assert_eq!(forward, model_forward);

            let backward: Vec<i32> = deque.descending_iter().collect();
            let model_backward: Vec<i32> = model.iter().rev().copied().collect();
            prop_assert_eq!(backward, model_backward);
        }
    }
}

mod capacity_properties {
    use super::*;

    proptest! {
        #[test]
        fn test_capacity_invariant(
            capacity in 1usize..32,
            values in prop::collection::vec(any::<i32>(), 1..100)
        ) {
            let deque: BlockingDeque<i32> = BlockingDeque::new(capacity);
            let mut accepted = 0usize;

            for &value in &values {
                if deque.try_push_back(value).is_ok() {
                    accepted += 1;
                }
            }

            prop_assert_eq!(accepted, capacity.min(values.len()));
            prop_assert_eq!(deque.len(), accepted);

            let mut popped = 0usize;
            while deque.try_pop_front().is_some() {
                popped += 1;
            }
            prop_assert_eq!(popped, accepted);
            prop_assert!(deque.is_empty());
        }

        #[test]
        fn test_round_trip_preserves_values(
            values in prop::collection::vec(any::<i32>(), 1..50)
        ) {
            let deque: BlockingDeque<i32> = BlockingDeque::new(values.len());

            for &value in &values {
                deque.put_back(value).unwrap();
            }

            let mut sink = Vec::new();
            prop_assert_eq!(deque.drain_into(&mut sink), values.len());
            prop_assert_eq!(sink, values);
        }
    }
}

mod iterator_properties {
    use super::*;

    proptest! {
        #[test]
        fn test_iterator_with_interleaved_removals(
            len in 1usize..20,
            remove_mask in prop::collection::vec(any::<bool>(), 1..20)
        ) {
            let deque: BlockingDeque<usize> = BlockingDeque::new(32);
            for i in 0..len {
                deque.put_back(i).unwrap();
            }

            // Remove a subset while an iterator is live; the iterator must
            // yield a subsequence of the original content, no duplicates.
            let iter = deque.iter();
            for (i, &remove) in remove_mask.iter().enumerate().take(len) {
                if remove {
                    deque.remove_first_occurrence(&i);
                }
            }

            let seen: Vec<usize> = iter.collect();
            let mut last = None;
            for &value in &seen {
                prop_assert!(value < len);
                if let Some(prev) = last {
                    prop_assert!(value > prev, "out of order or duplicate");
                }
                last = Some(value);
            }
        }
    }
}
