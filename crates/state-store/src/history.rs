//! Bounded undo/redo history
//!
//! A sequence of captured states with a cursor marking "now":
//!
//! ```text
//!   [s0, s1, s2, s3]      push(s4) after two undos:   [s0, s1, s4]
//!            ^ cursor                                          ^ cursor
//! ```
//!
//! Pushing after an undo starts a new branch and drops the redo future.
//! When the history grows past `max_size` the oldest state is evicted and the
//! cursor shifts down so it still points at the same logical state.

use std::collections::VecDeque;

/// Default number of states kept when no size is configured
pub const DEFAULT_MAX_HISTORY: usize = 50;

#[derive(Debug, Clone)]
pub struct StateHistory<S> {
    entries: VecDeque<S>,
    cursor: usize,
    max_size: usize,
}

impl<S> StateHistory<S> {
    /// Create an empty history holding at most `max_size` states (minimum 1)
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            entries: VecDeque::with_capacity(max_size.min(1024)),
            cursor: 0,
            max_size,
        }
    }

    /// Record a new state as "now"
    pub fn push(&mut self, state: S) {
        if !self.entries.is_empty() {
            // Drop the redo future, O(k) in discarded entries
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(state);
        self.cursor = self.entries.len() - 1;

        if self.entries.len() > self.max_size {
            self.entries.pop_front();
            self.cursor -= 1;
        }
    }

    /// Step back one state; `None` when already at the oldest entry
    pub fn undo(&mut self) -> Option<&S> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one state; `None` when already at the newest entry
    pub fn redo(&mut self) -> Option<&S> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn current(&self) -> Option<&S> {
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor < self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl<S> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let mut history: StateHistory<i32> = StateHistory::new(5);
        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), None);
    }

    #[test]
    fn test_push_advances_cursor() {
        let mut history = StateHistory::new(5);
        history.push(1);
        history.push(2);
        history.push(3);

        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.current(), Some(&3));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_walk() {
        let mut history = StateHistory::new(5);
        history.push("a");
        history.push("b");
        history.push("c");

        assert_eq!(history.undo(), Some(&"b"));
        assert_eq!(history.undo(), Some(&"a"));
        assert_eq!(history.undo(), None);
        assert_eq!(history.current(), Some(&"a"));

        assert_eq!(history.redo(), Some(&"b"));
        assert_eq!(history.redo(), Some(&"c"));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_push_after_undo_discards_branch() {
        let mut history = StateHistory::new(10);
        history.push('A');
        history.push('B');
        history.push('C');

        history.undo();
        history.push('D');

        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), Some(&'D'));
        assert_eq!(history.redo(), None);

        // C is gone, B is still behind D
        assert_eq!(history.undo(), Some(&'B'));
        assert_eq!(history.undo(), Some(&'A'));
        assert_eq!(history.redo(), Some(&'B'));
        assert_eq!(history.redo(), Some(&'D'));
    }

    #[test]
    fn test_eviction_keeps_bound() {
        let mut history = StateHistory::new(3);
        for n in 0..10 {
            history.push(n);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), Some(&9));
        assert_eq!(history.undo(), Some(&8));
        assert_eq!(history.undo(), Some(&7));
        // 0..=6 are unrecoverable
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_eviction_after_undo_keeps_logical_cursor() {
        let mut history = StateHistory::new(3);
        history.push(1);
        history.push(2);
        history.push(3);
        history.undo();
        history.undo();

        // Cursor at 1: pushing truncates to [1] then appends
        history.push(4);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), Some(&4));

        history.push(5);
        history.push(6);
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.current(), Some(&6));
        assert_eq!(history.undo(), Some(&5));
        assert_eq!(history.undo(), Some(&4));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_zero_max_size_is_clamped() {
        let mut history = StateHistory::new(0);
        history.push(1);
        history.push(2);
        assert_eq!(history.max_size(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), Some(&2));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_clear() {
        let mut history = StateHistory::new(4);
        history.push(1);
        history.push(2);
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.cursor(), 0);
    }
}
