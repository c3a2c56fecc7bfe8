//! A fixed-capacity FIFO queue with a drop-oldest overflow policy.
//!
//! Overflow never errors: enqueueing into a full queue evicts the oldest
//! element first, trading completeness for bounded memory. The queue length
//! never exceeds the configured capacity at any observable point.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` elements.
    ///
    /// A zero capacity is clamped to 1 so `enqueue` always retains the most
    /// recent element.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append to the tail, evicting the head first when full.
    ///
    /// Returns the evicted element, if any.
    pub fn enqueue(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// Remove and return the oldest element.
    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// The oldest element, without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drain everything into batches of at most `batch_size` elements,
    /// preserving FIFO order within and across batches. The final batch may
    /// be smaller.
    pub fn drain_batches(&mut self, batch_size: usize) -> Vec<Vec<T>> {
        let batch_size = batch_size.max(1);
        let mut batches = Vec::new();
        let mut current = Vec::with_capacity(batch_size.min(self.items.len()));
        while let Some(item) = self.items.pop_front() {
            current.push(item);
            if current.len() == batch_size {
                batches.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }
}
