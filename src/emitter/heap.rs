//! Array-backed binary min-heap ordered by a runtime comparator
//!
//! `std::collections::BinaryHeap` needs `T: Ord`, which rules out comparators
//! chosen at runtime (closures capturing state, reversed orders, key
//! extractors). This heap stores a `Comparator` instead.
//!
//! Complexity:
//! - push: append + sift-up, O(log n)
//! - pop: swap root with last, shrink, sift-down, O(log n)
//!
//! The heap is not stable: elements the comparator considers equal come out
//! in unspecified order.

use super::comparator::Comparator;

/// Binary min-heap keyed by `C`
#[derive(Debug, Clone)]
pub struct EventHeap<T, C> {
    data: Vec<T>,
    comparator: C,
}

impl<T, C: Comparator<T>> EventHeap<T, C> {
    /// Create an empty heap with room for `capacity` events
    pub fn with_capacity(capacity: usize, comparator: C) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            comparator,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Smallest element, if any
    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    /// Insert an event
    pub fn push(&mut self, event: T) {
        self.data.push(event);
        self.sift_up(self.data.len() - 1);
    }

    /// Remove and return the smallest event
    pub fn pop(&mut self) -> Option<T> {
        let last = self.data.len().checked_sub(1)?;
        self.data.swap(0, last);
        let min = self.data.pop();
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        min
    }

    /// Drain everything in ascending order
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.data.len());
        while let Some(event) = self.pop() {
            out.push(event);
        }
        out
    }

    #[inline]
    fn less(&self, i: usize, j: usize) -> bool {
        self.comparator.less(&self.data[i], &self.data[j])
    }

    fn sift_up(&mut self, mut child: usize) {
        while child > 0 {
            let parent = (child - 1) / 2;
            if !self.less(child, parent) {
                break;
            }
            self.data.swap(child, parent);
            child = parent;
        }
    }

    fn sift_down(&mut self, mut parent: usize) {
        let n = self.data.len();
        loop {
            let left = 2 * parent + 1;
            if left >= n {
                break;
            }
            let right = left + 1;
            let smallest = if right < n && self.less(right, left) {
                right
            } else {
                left
            };
            if !self.less(smallest, parent) {
                break;
            }
            self.data.swap(parent, smallest);
            parent = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::comparator::{by_key, natural_order, reverse};
    use rand::prelude::*;
    use rand::rngs::StdRng;

    #[test]
    fn empty_heap() {
        let mut heap = EventHeap::with_capacity(4, natural_order::<u32>());
        assert!(heap.is_empty());
        assert_eq!(heap.peek(), None);
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn pops_in_ascending_order() {
        let mut heap = EventHeap::with_capacity(4, natural_order::<u64>());
        for v in [100u64, 1, 12, 150, 7, 7, 0] {
            heap.push(v);
        }
        assert_eq!(heap.len(), 7);
        assert_eq!(heap.peek(), Some(&0));
        assert_eq!(heap.into_sorted_vec(), vec![0, 1, 7, 7, 12, 100, 150]);
    }

    #[test]
    fn grows_past_initial_capacity() {
        let mut heap = EventHeap::with_capacity(2, natural_order::<u32>());
        for v in (0..50u32).rev() {
            heap.push(v);
        }
        assert_eq!(heap.len(), 50);
        assert_eq!(heap.into_sorted_vec(), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn closure_comparator() {
        let mut heap = EventHeap::with_capacity(4, |a: &(u32, char), b: &(u32, char)| a.0 < b.0);
        heap.push((3, 'c'));
        heap.push((1, 'a'));
        heap.push((2, 'b'));
        let order: Vec<char> = heap.into_sorted_vec().into_iter().map(|(_, c)| c).collect();
        assert_eq!(order, vec!['a', 'b', 'c']);
    }

    #[test]
    fn reversed_comparator_gives_max_heap() {
        let mut heap = EventHeap::with_capacity(4, reverse::<i32, _>(natural_order::<i32>()));
        for v in [5i32, -3, 9, 0] {
            heap.push(v);
        }
        assert_eq!(heap.into_sorted_vec(), vec![9, 5, 0, -3]);
    }

    #[test]
    fn key_comparator() {
        let mut heap = EventHeap::with_capacity(4, by_key(|s: &&str| s.len()));
        for s in ["three", "a", "of"] {
            heap.push(s);
        }
        assert_eq!(heap.into_sorted_vec(), vec!["a", "of", "three"]);
    }

    #[test]
    fn interleaved_push_pop_matches_sort() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut heap = EventHeap::with_capacity(8, natural_order::<u32>());
        let mut reference: Vec<u32> = Vec::new();

        for _ in 0..2_000 {
            if rng.gen_bool(0.6) {
                let v: u32 = rng.gen_range(0..500);
                heap.push(v);
                reference.push(v);
            } else {
                reference.sort_unstable();
                let expected = if reference.is_empty() {
                    None
                } else {
                    Some(reference.remove(0))
                };
                assert_eq!(heap.pop(), expected);
            }
            assert_eq!(heap.len(), reference.len());
        }
    }
}
