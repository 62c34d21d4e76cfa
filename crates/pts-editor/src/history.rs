//! Bounded undo/redo stacks.

use crate::config::DEFAULT_HISTORY_LIMIT;

/// Undo and redo stacks of snapshots.
///
/// Both stacks are bounded; the oldest snapshot is dropped first.
#[derive(Debug, Clone)]
pub struct History<T> {
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
    limit: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl<T> History<T> {
    /// A limit of zero is raised to one.
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the state before a change. Clears the redo stack.
    pub fn push_checkpoint(&mut self, checkpoint: T) {
        push_bounded(&mut self.undo_stack, checkpoint, self.limit);
        self.redo_stack.clear();
    }

    /// Step back: `current` moves to the redo stack and the previous state is
    /// returned. `None` leaves both stacks as they were.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo_stack.pop()?;
        push_bounded(&mut self.redo_stack, current, self.limit);
        Some(previous)
    }

    /// Mirror of [`History::undo`].
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo_stack.pop()?;
        push_bounded(&mut self.undo_stack, current, self.limit);
        Some(next)
    }

    pub fn undo_available(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_available(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

fn push_bounded<T>(stack: &mut Vec<T>, item: T, limit: usize) {
    stack.push(item);
    if stack.len() > limit {
        let drain_len = stack.len() - limit;
        stack.drain(0..drain_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo() {
        let mut history = History::new(10);
        history.push_checkpoint(1);
        history.push_checkpoint(2);

        assert_eq!(history.undo(3), Some(2));
        assert_eq!(history.undo(2), Some(1));
        assert_eq!(history.undo(1), None);
        assert_eq!(history.redo(1), Some(2));
        assert_eq!(history.redo(2), Some(3));
        assert_eq!(history.redo(3), None);
    }

    #[test]
    fn test_checkpoint_clears_redo() {
        let mut history = History::new(10);
        history.push_checkpoint(1);
        history.undo(2);
        assert_eq!(history.redo_available(), 1);

        history.push_checkpoint(1);
        assert_eq!(history.redo_available(), 0);
    }

    #[test]
    fn test_oldest_checkpoint_is_evicted() {
        let mut history = History::new(50);
        for state in 0..60 {
            history.push_checkpoint(state);
        }
        assert_eq!(history.undo_available(), 50);

        let mut current = 60;
        let mut oldest = None;
        while let Some(previous) = history.undo(current) {
            oldest = Some(previous);
            current = previous;
        }
        assert_eq!(oldest, Some(10));
    }

    #[test]
    fn test_zero_limit() {
        let mut history = History::new(0);
        history.push_checkpoint('a');
        history.push_checkpoint('b');
        assert_eq!(history.limit(), 1);
        assert_eq!(history.undo('c'), Some('b'));
    }
}
