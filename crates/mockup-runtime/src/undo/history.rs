#![forbid(unsafe_code)]

//! Snapshot undo/redo store with an entries + cursor model.
//!
//! [`History`] keeps every snapshot in one chronological [`VecDeque`] and a
//! cursor into it. Undo and redo only move the cursor; a new push truncates
//! everything after the cursor before appending, so redo history is discarded
//! on a new edit.
//!
//! # Example
//!
//! ```
//! use mockup_runtime::undo::{History, HistoryConfig};
//!
//! let mut history = History::new(0, HistoryConfig::default());
//! history.push(1);
//! history.push_with(|n| n + 1);
//! assert_eq!(**history.current(), 2);
//!
//! history.undo();
//! assert_eq!(**history.current(), 1);
//! assert!(history.can_redo());
//!
//! history.redo();
//! assert_eq!(**history.current(), 2);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Default number of snapshots retained.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Configuration for the history store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of snapshots retained, including the current one.
    /// Oldest snapshots are evicted when this limit is exceeded.
    /// Values below 1 are treated as 1.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl HistoryConfig {
    /// Create a new configuration with the given depth limit.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Create an unlimited configuration (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }

    /// Depth limit actually enforced.
    #[must_use]
    pub fn effective_depth(&self) -> usize {
        self.max_depth.max(1)
    }
}

/// A bounded undo/redo history of immutable snapshots.
///
/// # Invariants
///
/// 1. `entries` is never empty; it starts with the seed snapshot.
/// 2. `cursor < entries.len()`, and `entries[cursor]` is the current state.
/// 3. `entries.len() <= config.effective_depth()` after any operation.
/// 4. A push truncates everything after `cursor` before appending.
/// 5. A push equal to the current snapshot changes nothing.
pub struct History<T> {
    /// Snapshots in chronological order.
    entries: VecDeque<Arc<T>>,
    /// Index of the current snapshot.
    cursor: usize,
    /// Incremented whenever the current snapshot changes.
    version: u64,
    /// Configuration.
    config: HistoryConfig,
}

impl<T: fmt::Debug> fmt::Debug for History<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("len", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("version", &self.version)
            .field("config", &self.config)
            .finish()
    }
}

impl<T> History<T> {
    /// Create a history seeded with one snapshot.
    #[must_use]
    pub fn new(seed: T, config: HistoryConfig) -> Self {
        Self::from_arc(Arc::new(seed), config)
    }

    /// Create a history seeded with a pre-wrapped snapshot.
    #[must_use]
    pub fn from_arc(seed: Arc<T>, config: HistoryConfig) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(seed);
        Self {
            entries,
            cursor: 0,
            version: 0,
            config,
        }
    }

    /// Create a history with default configuration.
    #[must_use]
    pub fn with_default_config(seed: T) -> Self {
        Self::new(seed, HistoryConfig::default())
    }

    // ====================================================================
    // Core Operations
    // ====================================================================

    /// The snapshot presented to the UI.
    #[must_use]
    pub fn current(&self) -> &Arc<T> {
        &self.entries[self.cursor]
    }

    /// Move the cursor back one step.
    ///
    /// Returns the new current snapshot, or `None` if already at the oldest.
    pub fn undo(&mut self) -> Option<Arc<T>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.version += 1;
        tracing::trace!(target: "mockup.history", cursor = self.cursor, len = self.entries.len(), "undo");
        Some(Arc::clone(self.current()))
    }

    /// Move the cursor forward one step.
    ///
    /// Returns the new current snapshot, or `None` if nothing was undone.
    pub fn redo(&mut self) -> Option<Arc<T>> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.version += 1;
        tracing::trace!(target: "mockup.history", cursor = self.cursor, len = self.entries.len(), "redo");
        Some(Arc::clone(self.current()))
    }

    /// Replace the whole history with a single snapshot.
    ///
    /// Used for loads (import, template pick, restored draft) that must not
    /// be undoable back to the state before the load.
    pub fn reset(&mut self, seed: T) {
        self.reset_arc(Arc::new(seed));
    }

    /// Like [`reset`](Self::reset) with a pre-wrapped snapshot.
    pub fn reset_arc(&mut self, seed: Arc<T>) {
        let discarded = self.entries.len();
        self.entries.clear();
        self.entries.push_back(seed);
        self.cursor = 0;
        self.version += 1;
        tracing::debug!(target: "mockup.history", discarded, "history reset");
    }

    // ====================================================================
    // Query
    // ====================================================================

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of steps undo can take.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.cursor
    }

    /// Number of steps redo can take.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.entries.len() - self.cursor - 1
    }

    /// Total number of snapshots retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a history holds at least its seed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current snapshot.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Change counter, bumped whenever [`current`](Self::current) changes.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Snapshots in chronological order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &Arc<T>> {
        self.entries.iter()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ====================================================================
    // Maintenance
    // ====================================================================

    /// Evict the oldest snapshots until within the depth limit, keeping the
    /// cursor on the same snapshot.
    fn enforce_depth(&mut self) {
        let limit = self.config.effective_depth();
        let mut evicted = 0usize;
        while self.entries.len() > limit && self.cursor > 0 {
            self.entries.pop_front();
            self.cursor -= 1;
            evicted += 1;
        }
        if evicted > 0 {
            tracing::debug!(target: "mockup.history", evicted, limit, "history evicted oldest snapshots");
        }
    }

    /// Truncate redo entries, append, and move the cursor to the new end.
    fn append(&mut self, next: Arc<T>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(next);
        self.cursor = self.entries.len() - 1;
        self.version += 1;
        self.enforce_depth();
        tracing::trace!(target: "mockup.history", cursor = self.cursor, len = self.entries.len(), "push");
    }
}

impl<T: PartialEq> History<T> {
    /// Record a new snapshot.
    ///
    /// Returns `false` (and changes nothing) if `next` equals the current
    /// snapshot.
    pub fn push(&mut self, next: T) -> bool {
        if *self.current().as_ref() == next {
            return false;
        }
        self.append(Arc::new(next));
        true
    }

    /// Record a snapshot computed from the current one.
    ///
    /// A panic inside `update` propagates to the caller; the history is
    /// left untouched.
    pub fn push_with(&mut self, update: impl FnOnce(&T) -> T) -> bool {
        let next = update(self.current());
        self.push(next)
    }

    /// Record a pre-wrapped snapshot.
    pub fn push_arc(&mut self, next: Arc<T>) -> bool {
        if Arc::ptr_eq(self.current(), &next) || self.current().as_ref() == next.as_ref() {
            return false;
        }
        self.append(next);
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        count: i32,
    }

    #[test]
    fn new_history_holds_seed() {
        let history = History::with_default_config(7);
        assert_eq!(**history.current(), 7);
        assert_eq!(history.len(), 1);
        assert!(!history.is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 0);
        assert_eq!(history.redo_depth(), 0);
        assert_eq!(history.version(), 0);
    }

    #[test]
    fn counter_scenario() {
        let mut history = History::with_default_config(Counter { count: 0 });
        assert!(history.push(Counter { count: 1 }));
        assert!(history.push(Counter { count: 2 }));

        history.undo();
        assert_eq!(**history.current(), Counter { count: 1 });
        assert!(history.can_redo());

        history.redo();
        assert_eq!(**history.current(), Counter { count: 2 });
        assert!(!history.can_redo());
    }

    #[test]
    fn push_equal_is_noop() {
        let mut history = History::with_default_config(Counter { count: 3 });
        history.push(Counter { count: 4 });
        let version = history.version();

        assert!(!history.push(Counter { count: 4 }));
        assert!(!history.push_with(|c| c.clone()));
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 1);
        assert_eq!(history.version(), version);
    }

    #[test]
    fn push_with_resolves_against_current() {
        let mut history = History::with_default_config(Counter { count: 0 });
        for _ in 0..3 {
            history.push_with(|c| Counter { count: c.count + 1 });
        }
        assert_eq!(history.current().count, 3);
        assert_eq!(history.len(), 4);
    }

    #[test]
    #[should_panic(expected = "broken updater")]
    fn panicking_updater_propagates() {
        let mut history = History::with_default_config(0);
        history.push_with(|_| panic!("broken updater"));
    }

    #[test]
    fn panicking_updater_leaves_history_intact() {
        let mut history = History::with_default_config(0);
        history.push(1);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            history.push_with(|_| panic!("broken updater"));
        }));
        assert!(result.is_err());
        assert_eq!(**history.current(), 1);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn undo_stops_at_seed() {
        let mut history = History::with_default_config(1);
        history.push(2);
        history.push(3);

        assert_eq!(history.undo().as_deref(), Some(&2));
        assert_eq!(history.undo().as_deref(), Some(&1));
        assert!(history.undo().is_none());
        assert_eq!(**history.current(), 1);
    }

    #[test]
    fn redo_stops_at_newest() {
        let mut history = History::with_default_config(1);
        history.push(2);
        history.undo();
        assert_eq!(history.redo().as_deref(), Some(&2));
        assert!(history.redo().is_none());
    }

    #[test]
    fn push_truncates_redo() {
        let mut history = History::with_default_config(0);
        history.push(1);
        history.push(2);
        history.undo();
        history.push(3);

        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(**history.current(), 3);
        let values: Vec<i32> = history.entries().map(|e| **e).collect();
        assert_eq!(values, vec![0, 1, 3]);
    }

    #[test]
    fn reset_establishes_new_baseline() {
        let mut history = History::with_default_config(0);
        history.push(1);
        history.push(2);
        history.undo();

        history.reset(42);
        assert_eq!(**history.current(), 42);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn reset_bumps_version_even_for_equal_seed() {
        let mut history = History::with_default_config(5);
        let before = history.version();
        history.reset(5);
        assert!(history.version() > before);
    }

    #[test]
    fn version_tracks_current_changes() {
        let mut history = History::with_default_config(0);
        let v0 = history.version();
        history.push(1);
        let v1 = history.version();
        history.undo();
        let v2 = history.version();
        history.undo();
        let v3 = history.version();
        assert!(v1 > v0);
        assert!(v2 > v1);
        assert_eq!(v3, v2, "failed undo must not bump version");
    }

    #[test]
    fn depth_limit_evicts_oldest() {
        let mut history = History::new(0, HistoryConfig::new(3));
        history.push(1);
        history.push(2);
        history.push(3);

        assert_eq!(history.len(), 3);
        assert_eq!(**history.current(), 3);
        assert_eq!(history.undo().as_deref(), Some(&2));
        assert_eq!(history.undo().as_deref(), Some(&1));
        assert!(history.undo().is_none());
    }

    #[test]
    fn eviction_keeps_cursor_on_current() {
        let mut history = History::new(0, HistoryConfig::new(2));
        for i in 1..=10 {
            history.push(i);
            assert_eq!(**history.current(), i);
            assert_eq!(history.cursor(), history.len() - 1);
        }
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn depth_zero_behaves_like_one() {
        let mut history = History::new(0, HistoryConfig::new(0));
        history.push(1);
        history.push(2);
        assert_eq!(history.len(), 1);
        assert_eq!(**history.current(), 2);
        assert!(!history.can_undo());
    }

    #[test]
    fn push_arc_shares_allocation() {
        let mut history = History::with_default_config(0);
        let snapshot = Arc::new(9);
        assert!(history.push_arc(Arc::clone(&snapshot)));
        assert!(Arc::ptr_eq(history.current(), &snapshot));
        assert!(!history.push_arc(Arc::clone(&snapshot)));
        assert!(!history.push_arc(Arc::new(9)));
    }

    #[test]
    fn undo_redo_return_current_arc() {
        let mut history = History::with_default_config("a");
        history.push("b");
        history.push("c");
        let undone = history.undo().unwrap();
        assert!(Arc::ptr_eq(&undone, history.current()));
        assert_eq!(*undone, "b");
        assert_eq!(*history.redo().unwrap(), "c");
    }

    #[test]
    fn config_defaults() {
        assert_eq!(HistoryConfig::default().max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(HistoryConfig::unlimited().max_depth, usize::MAX);
        assert_eq!(HistoryConfig::new(0).effective_depth(), 1);
    }

    #[test]
    fn history_debug() {
        let history = History::with_default_config(1);
        let s = format!("{history:?}");
        assert!(s.contains("History"));
        assert!(s.contains("cursor"));
    }
}
