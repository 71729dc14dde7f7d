//! Binary min-heap whose elements remember their own heap position.

use std::cmp::Ordering;

/// Capability of an element to record where it sits inside a [`PriorityQueue`].
pub trait IndexedObject {
    /// Position of the element inside the heap, if it is currently queued.
    fn heap_index(&self) -> Option<usize>;

    /// Records the element's position inside the heap.
    fn set_heap_index(&mut self, index: Option<usize>);
}

/// Min-heap of handles into a caller-owned slice of [`IndexedObject`] items.
///
/// The heap stores slice indices rather than the items themselves so the
/// caller keeps ownership of the search state. Every swap writes the new
/// position back onto the item, which lets [`PriorityQueue::update`] restore
/// heap order for a single changed item without searching for it.
#[derive(Debug)]
pub struct PriorityQueue<F> {
    heap: Vec<usize>,
    compare: F,
}

impl<F> PriorityQueue<F> {
    /// Creates an empty queue ordered by the provided comparator.
    #[must_use]
    pub fn new(compare: F) -> Self {
        Self::with_capacity(0, compare)
    }

    /// Creates an empty queue with room for `capacity` handles.
    #[must_use]
    pub fn with_capacity(capacity: usize, compare: F) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            compare,
        }
    }

    /// Number of queued handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Reports whether the queue holds no handles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Handle with the smallest priority, without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<usize> {
        self.heap.first().copied()
    }

    /// Forgets every queued handle while keeping the backing storage.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl<F> PriorityQueue<F> {
    /// Inserts the item at `handle` and returns its final heap position.
    pub fn push<T>(&mut self, items: &mut [T], handle: usize) -> usize
    where
        T: IndexedObject,
        F: Fn(&T, &T) -> Ordering,
    {
        let position = self.heap.len();
        self.heap.push(handle);
        items[handle].set_heap_index(Some(position));
        self.sift_up(items, position)
    }

    /// Removes and returns the handle with the smallest priority.
    pub fn pop<T>(&mut self, items: &mut [T]) -> Option<usize>
    where
        T: IndexedObject,
        F: Fn(&T, &T) -> Ordering,
    {
        if self.heap.is_empty() {
            return None;
        }

        let root = self.heap.swap_remove(0);
        items[root].set_heap_index(None);

        if let Some(&moved) = self.heap.first() {
            items[moved].set_heap_index(Some(0));
            let _ = self.sift_down(items, 0);
        }

        Some(root)
    }

    /// Restores heap order after the priority of the item at `handle` changed.
    ///
    /// Returns the item's new position, or `None` when the item is not queued.
    pub fn update<T>(&mut self, items: &mut [T], handle: usize) -> Option<usize>
    where
        T: IndexedObject,
        F: Fn(&T, &T) -> Ordering,
    {
        let position = items.get(handle)?.heap_index()?;
        if self.heap.get(position) != Some(&handle) {
            return None;
        }

        let raised = self.sift_up(items, position);
        if raised != position {
            return Some(raised);
        }

        Some(self.sift_down(items, position))
    }

    fn precedes<T>(&self, items: &[T], first: usize, second: usize) -> bool
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let first = &items[self.heap[first]];
        let second = &items[self.heap[second]];
        (self.compare)(first, second) == Ordering::Less
    }

    fn swap<T>(&mut self, items: &mut [T], first: usize, second: usize)
    where
        T: IndexedObject,
    {
        self.heap.swap(first, second);
        items[self.heap[first]].set_heap_index(Some(first));
        items[self.heap[second]].set_heap_index(Some(second));
    }

    fn sift_up<T>(&mut self, items: &mut [T], mut position: usize) -> usize
    where
        T: IndexedObject,
        F: Fn(&T, &T) -> Ordering,
    {
        while position > 0 {
            let parent = (position - 1) / 2;
            if !self.precedes(items, position, parent) {
                break;
            }

            self.swap(items, position, parent);
            position = parent;
        }

        position
    }

    fn sift_down<T>(&mut self, items: &mut [T], mut position: usize) -> usize
    where
        T: IndexedObject,
        F: Fn(&T, &T) -> Ordering,
    {
        let len = self.heap.len();
        loop {
            let left = position * 2 + 1;
            let right = left + 1;
            let mut smallest = position;

            if left < len && self.precedes(items, left, smallest) {
                smallest = left;
            }
            if right < len && self.precedes(items, right, smallest) {
                smallest = right;
            }
            if smallest == position {
                return position;
            }

            self.swap(items, position, smallest);
            position = smallest;
        }
    }
}
