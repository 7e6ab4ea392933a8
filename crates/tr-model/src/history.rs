//! Per-parameter undo/redo log of full value snapshots.

use tr_core::Real;

use crate::error::{ModelError, ModelResult};

/// Two-stack snapshot undo/redo.
///
/// `undo_log` always holds at least the initial load state, and its top is
/// the current value vector. Snapshot granularity (whole y vector per entry)
/// is fine here: ring counts are tens of samples, not thousands.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    undo_log: Vec<Vec<Real>>,
    redo_log: Vec<Vec<Real>>,
}

impl HistoryStack {
    /// Seed with the state loaded from file. This entry is never popped.
    pub fn new(initial: Vec<Real>) -> Self {
        Self {
            undo_log: vec![initial],
            redo_log: Vec::new(),
        }
    }

    /// The value vector at the top of the undo log.
    pub fn current(&self) -> &[Real] {
        self.undo_log
            .last()
            .expect("undo log holds at least the initial snapshot")
    }

    pub fn depth(&self) -> usize {
        self.undo_log.len()
    }

    pub fn can_undo(&self) -> bool {
        self.undo_log.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_log.is_empty()
    }

    /// Append a snapshot if it differs from the current top.
    ///
    /// A new edit invalidates everything that was undone, so the redo log is
    /// cleared whenever a snapshot is actually appended. Returns whether an
    /// entry was recorded.
    pub fn record(&mut self, values: &[Real]) -> bool {
        if self.current() == values {
            return false;
        }
        self.undo_log.push(values.to_vec());
        self.redo_log.clear();
        true
    }

    /// Pop the newest snapshot and return the one to restore.
    pub fn undo(&mut self) -> ModelResult<&[Real]> {
        if self.undo_log.len() <= 1 {
            return Err(ModelError::HistoryExhausted);
        }
        let popped = self
            .undo_log
            .pop()
            .expect("undo log checked non-empty above");
        self.redo_log.push(popped);
        Ok(self.current())
    }

    /// Re-apply the most recently undone snapshot.
    pub fn redo(&mut self) -> ModelResult<&[Real]> {
        let restored = self.redo_log.pop().ok_or(ModelError::HistoryExhausted)?;
        self.undo_log.push(restored);
        Ok(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_dedupes_identical_snapshots() {
        let mut h = HistoryStack::new(vec![1.0, 2.0]);
        assert!(h.record(&[1.0, 3.0]));
        assert!(!h.record(&[1.0, 3.0]));
        assert_eq!(h.depth(), 2);
    }

    #[test]
    fn undo_on_initial_state_fails_and_changes_nothing() {
        let mut h = HistoryStack::new(vec![1.0, 2.0]);
        let err = h.undo().unwrap_err();
        assert!(matches!(err, ModelError::HistoryExhausted));
        assert_eq!(h.current(), &[1.0, 2.0]);
        assert_eq!(h.depth(), 1);
    }

    #[test]
    fn undo_restores_previous_snapshot() {
        let mut h = HistoryStack::new(vec![1.0]);
        h.record(&[2.0]);
        h.record(&[3.0]);
        assert_eq!(h.undo().unwrap(), &[2.0]);
        assert_eq!(h.undo().unwrap(), &[1.0]);
        assert!(h.undo().is_err());
    }

    #[test]
    fn redo_after_undo_round_trips() {
        let mut h = HistoryStack::new(vec![1.0]);
        h.record(&[2.0]);
        let pre_undo = h.current().to_vec();
        h.undo().unwrap();
        assert_eq!(h.redo().unwrap(), pre_undo.as_slice());
    }

    #[test]
    fn redo_without_undo_fails() {
        let mut h = HistoryStack::new(vec![1.0]);
        assert!(matches!(h.redo(), Err(ModelError::HistoryExhausted)));
    }

    #[test]
    fn new_edit_clears_redo_log() {
        let mut h = HistoryStack::new(vec![1.0]);
        h.record(&[2.0]);
        h.undo().unwrap();
        assert!(h.can_redo());
        h.record(&[5.0]);
        assert!(!h.can_redo());
        assert!(matches!(h.redo(), Err(ModelError::HistoryExhausted)));
    }
}
