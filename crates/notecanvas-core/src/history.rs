//! Snapshot-based undo/redo history.

/// Undo/redo over full snapshots of some state `T`.
///
/// The stack always holds a `current` snapshot. `push` moves it onto the undo
/// stack and clears the redo stack (a new action discards redo history).
/// With a depth cap, the oldest undo entry is evicted first.
#[derive(Debug, Clone)]
pub struct UndoRedoStack<T> {
    current: T,
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
    max_depth: Option<usize>,
}

impl<T: Default> Default for UndoRedoStack<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> UndoRedoStack<T> {
    /// Create an unbounded history starting at `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            current: initial,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: None,
        }
    }

    /// Create a history keeping at most `max_depth` undo entries.
    pub fn with_max_depth(initial: T, max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            ..Self::new(initial)
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    /// Record a new committed snapshot.
    pub fn push(&mut self, snapshot: T) {
        let previous = std::mem::replace(&mut self.current, snapshot);
        self.undo_stack.push(previous);
        self.redo_stack.clear();

        if let Some(max) = self.max_depth {
            let excess = self.undo_stack.len().saturating_sub(max);
            if excess > 0 {
                self.undo_stack.drain(..excess);
            }
        }
    }

    /// Step back one snapshot. Returns `None` (and changes nothing) when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> Option<&T> {
        let previous = self.undo_stack.pop()?;
        let current = std::mem::replace(&mut self.current, previous);
        self.redo_stack.push(current);
        Some(&self.current)
    }

    /// Step forward one snapshot. Returns `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<&T> {
        let next = self.redo_stack.pop()?;
        let current = std::mem::replace(&mut self.current, next);
        self.undo_stack.push(current);
        Some(&self.current)
    }

    /// Drop all undo and redo entries, keeping the current snapshot.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Drop all history and start over from `initial` (document load).
    pub fn reset(&mut self, initial: T) {
        self.clear();
        self.current = initial;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}
