//! Bounded, branch-discarding undo/redo timeline over immutable values.
//!
//! Writing a value after an undo discards the redo-able future; the timeline
//! is a truncate-then-append sequence, not a tree. Writes that are
//! structurally equal to the current snapshot are ignored.

use std::collections::VecDeque;
use tracing::debug;

/// Snapshots retained by default: ten undoable steps plus the current value.
pub const DEFAULT_CAPACITY: usize = 11;

#[derive(Debug, Clone)]
pub struct HistoryStore<V> {
    snapshots: VecDeque<V>,
    cursor: usize,
    capacity: usize,
}

impl<V: Clone + PartialEq> HistoryStore<V> {
    pub fn new(initial: V) -> Self {
        Self::with_capacity(initial, DEFAULT_CAPACITY)
    }

    /// A capacity below one is raised to one.
    pub fn with_capacity(initial: V, capacity: usize) -> Self {
        let mut snapshots = VecDeque::with_capacity(capacity.max(1));
        snapshots.push_back(initial);
        Self {
            snapshots,
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn current(&self) -> &V {
        &self.snapshots[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record `next` as the new current value. Returns false when `next`
    /// equals the current snapshot and nothing was recorded.
    pub fn set(&mut self, next: V) -> bool {
        if next == *self.current() {
            return false;
        }

        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(next);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;

        debug!(
            "History advanced to {} of {} snapshots",
            self.cursor + 1,
            self.snapshots.len()
        );
        true
    }

    /// Derive the next value from the current one.
    pub fn update<F>(&mut self, derive: F) -> bool
    where
        F: FnOnce(&V) -> V,
    {
        let next = derive(self.current());
        self.set(next)
    }

    /// Fallible derivation. On error nothing is recorded and the error is
    /// returned unchanged.
    pub fn try_update<F, E>(&mut self, derive: F) -> Result<bool, E>
    where
        F: FnOnce(&V) -> Result<V, E>,
    {
        let next = derive(self.current())?;
        Ok(self.set(next))
    }

    pub fn undo(&mut self) -> bool {
        if self.can_undo() {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.can_redo() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Start a fresh timeline holding only `value`.
    pub fn reset(&mut self, value: V) {
        self.snapshots.clear();
        self.snapshots.push_back(value);
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_undo_restores_previous() {
        let mut history = HistoryStore::new(0);
        assert!(history.set(1));
        assert!(history.set(2));
        assert!(history.can_undo());
        assert!(history.undo());
        assert_eq!(*history.current(), 1);
        assert!(history.can_redo());
    }

    #[test]
    fn test_equal_value_is_noop() {
        let mut history = HistoryStore::new(vec![1, 2]);
        assert!(history.set(vec![1, 2, 3]));
        assert!(!history.set(vec![1, 2, 3]));
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 1);
    }

    #[test]
    fn test_noop_does_not_discard_redo() {
        let mut history = HistoryStore::new("a");
        history.set("b");
        history.undo();
        assert!(!history.set("a"));
        assert!(history.can_redo());
    }

    #[test]
    fn test_set_after_undo_discards_future() {
        let mut history = HistoryStore::new(0);
        history.set(1);
        history.set(2);
        history.undo();
        history.undo();
        history.set(9);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        history.undo();
        assert_eq!(*history.current(), 0);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = HistoryStore::new(0);
        for i in 1..=15 {
            history.set(i);
        }
        assert_eq!(history.len(), DEFAULT_CAPACITY);

        let mut steps = 0;
        while history.undo() {
            steps += 1;
        }
        assert_eq!(steps, DEFAULT_CAPACITY - 1);
        assert_eq!(*history.current(), 5);
    }

    #[test]
    fn test_undo_redo_bounds() {
        let mut history = HistoryStore::new(1);
        assert!(!history.undo());
        assert!(!history.redo());
        history.set(2);
        assert!(history.undo());
        assert!(!history.undo());
        assert!(history.redo());
        assert!(!history.redo());
        assert_eq!(*history.current(), 2);
    }

    #[test]
    fn test_try_update_error_leaves_store_unchanged() {
        let mut history = HistoryStore::new(10);
        history.set(11);
        history.undo();

        let result: Result<bool, String> = history.try_update(|_| Err("bad".to_string()));
        assert_eq!(result, Err("bad".to_string()));
        assert_eq!(*history.current(), 10);
        assert!(history.can_redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_update_derives_from_current() {
        let mut history = HistoryStore::new(String::from("a"));
        assert!(history.update(|v| format!("{}b", v)));
        assert_eq!(history.current(), "ab");
    }

    #[test]
    fn test_reset_clears_timeline() {
        let mut history = HistoryStore::new(1);
        history.set(2);
        history.set(3);
        history.reset(100);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(*history.current(), 100);
    }

    #[test]
    fn test_capacity_clamped_to_one() {
        let mut history = HistoryStore::with_capacity(1, 0);
        assert_eq!(history.capacity(), 1);
        history.set(2);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert_eq!(*history.current(), 2);
    }
}
