use std::collections::VecDeque;

/// Bounded undo/redo stacks of whole-document snapshots.
#[derive(Debug, Clone)]
pub struct History {
    limit: usize,
    undo: VecDeque<String>,
    redo: Vec<String>,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            undo: VecDeque::new(),
            redo: Vec::new(),
        }
    }

    /// Remember the text an edit replaced. Starts a new branch, so the redo
    /// stack is dropped.
    pub fn record(&mut self, previous: &str) {
        self.redo.clear();
        self.push_undo(previous.to_string());
    }

    fn push_undo(&mut self, text: String) {
        if self.undo.back() == Some(&text) {
            return;
        }
        self.undo.push_back(text);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }

    /// Snapshot to restore, given the text currently shown.
    pub fn undo(&mut self, current: &str) -> Option<String> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current.to_string());
        Some(previous)
    }

    pub fn redo(&mut self, current: &str) -> Option<String> {
        let next = self.redo.pop()?;
        self.push_undo(current.to_string());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_then_redo() {
        let mut history = History::new(10);
        history.record("a");
        history.record("b");

        assert_eq!(history.undo("c").as_deref(), Some("b"));
        assert_eq!(history.undo("b").as_deref(), Some("a"));
        assert_eq!(history.undo("a"), None);
        assert_eq!(history.redo("a").as_deref(), Some("b"));
        assert_eq!(history.redo("b").as_deref(), Some("c"));
        assert!(!history.can_redo());
    }

    #[test]
    fn recording_clears_redo() {
        let mut history = History::new(10);
        history.record("a");
        history.undo("b");
        assert!(history.can_redo());
        history.record("a");
        assert!(!history.can_redo());
    }

    #[test]
    fn bounded_and_deduplicated() {
        let mut history = History::new(3);
        for text in ["a", "a", "b", "c", "d"] {
            history.record(text);
        }
        assert_eq!(history.undo_depth(), 3);
        assert_eq!(history.undo("e").as_deref(), Some("d"));
        assert_eq!(history.undo("d").as_deref(), Some("c"));
        assert_eq!(history.undo("c").as_deref(), Some("b"));
        assert!(!history.can_undo());
    }
}
