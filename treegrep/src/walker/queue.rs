//! FIFO of pending path entries.
//!
//! The walker uses it as its frontier, which makes the traversal breadth-first
//! with sibling order preserved. The dynamic scheduler wraps one in a mutex and
//! hands it to every worker as the live source of file work.

use std::collections::VecDeque;

/// Strict first-in, first-out queue with O(1) push at the tail and pop at the head.
#[derive(Debug, Clone)]
pub struct WorkQueue<T> {
    entries: VecDeque<T>,
}

impl<T> WorkQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Append an entry at the tail
    pub fn push(&mut self, entry: T) {
        self.entries.push_back(entry);
    }

    /// Remove and return the head entry, transferring ownership to the caller
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain the queue into a vector, head first
    pub fn into_vec(self) -> Vec<T> {
        self.entries.into()
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for WorkQueue<T> {
    fn from(entries: Vec<T>) -> Self {
        Self {
            entries: entries.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = WorkQueue::new();
        assert!(queue.is_empty());

        queue.push("a");
        queue.push("b");
        queue.push("c");
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.pop(), Some("a"));
        queue.push("d");
        assert_eq!(queue.pop(), Some("b"));
        assert_eq!(queue.pop(), Some("c"));
        assert_eq!(queue.pop(), Some("d"));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_from_vec_keeps_head_first() {
        let mut queue = WorkQueue::from(vec![1, 2, 3]);
        queue.push(4);
        queue.push(5);
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.into_vec(), vec![2, 3, 4, 5]);
    }
}
