#![forbid(unsafe_code)]

//! Property tests for the undo/redo history.
//!
//! Validates:
//! 1. The cursor always points inside the entry list.
//! 2. The entry count never exceeds the configured depth.
//! 3. Pushing a value equal to the current one changes nothing.
//! 4. Undo followed by redo returns to the same snapshot.
//! 5. A push after undo discards every redo step.
//! 6. Reset leaves exactly one entry and no undo or redo.
//! 7. The history agrees with a simple reference model.

use proptest::prelude::*;

use mockup_runtime::{History, HistoryConfig};

#[derive(Debug, Clone)]
enum Op {
    Push(u8),
    PushSame,
    Undo,
    Redo,
    Reset(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => any::<u8>().prop_map(Op::Push),
        1 => Just(Op::PushSame),
        3 => Just(Op::Undo),
        2 => Just(Op::Redo),
        1 => any::<u8>().prop_map(Op::Reset),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 0..120)
}

/// Straightforward Vec + index model of the same semantics.
struct Model {
    entries: Vec<u8>,
    cursor: usize,
    depth: usize,
}

impl Model {
    fn new(seed: u8, depth: usize) -> Self {
        Self {
            entries: vec![seed],
            cursor: 0,
            depth: depth.max(1),
        }
    }

    fn apply(&mut self, op: &Op) {
        match *op {
            Op::Push(v) => {
                if self.entries[self.cursor] != v {
                    self.entries.truncate(self.cursor + 1);
                    self.entries.push(v);
                    while self.entries.len() > self.depth {
                        self.entries.remove(0);
                    }
                    self.cursor = self.entries.len() - 1;
                }
            }
            Op::PushSame => {}
            Op::Undo => self.cursor = self.cursor.saturating_sub(1),
            Op::Redo => {
                if self.cursor + 1 < self.entries.len() {
                    self.cursor += 1;
                }
            }
            Op::Reset(v) => {
                self.entries = vec![v];
                self.cursor = 0;
            }
        }
    }
}

fn apply(history: &mut History<u8>, op: &Op) {
    match *op {
        Op::Push(v) => {
            history.push(v);
        }
        Op::PushSame => {
            let same = **history.current();
            assert!(!history.push(same));
        }
        Op::Undo => {
            history.undo();
        }
        Op::Redo => {
            history.redo();
        }
        Op::Reset(v) => history.reset(v),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn matches_reference_model(seed in any::<u8>(), depth in 1usize..12, ops in ops_strategy()) {
        let mut history = History::new(seed, HistoryConfig::new(depth));
        let mut model = Model::new(seed, depth);

        for op in &ops {
            apply(&mut history, op);
            model.apply(op);

            prop_assert!(history.cursor() < history.len());
            prop_assert!(history.len() <= depth);
            prop_assert_eq!(history.cursor(), model.cursor);
            let entries: Vec<u8> = history.entries().map(|e| **e).collect();
            prop_assert_eq!(&entries, &model.entries);
            prop_assert_eq!(history.can_undo(), model.cursor > 0);
            prop_assert_eq!(history.can_redo(), model.cursor + 1 < model.entries.len());
            prop_assert_eq!(history.undo_depth() + history.redo_depth() + 1, history.len());
        }
    }

    #[test]
    fn equal_push_is_idempotent(ops in ops_strategy()) {
        let mut history = History::new(0u8, HistoryConfig::default());
        for op in &ops {
            apply(&mut history, op);
        }
        let len = history.len();
        let cursor = history.cursor();
        let version = history.version();
        let current = **history.current();

        prop_assert!(!history.push(current));
        prop_assert!(!history.push_with(|v| *v));
        prop_assert_eq!(history.len(), len);
        prop_assert_eq!(history.cursor(), cursor);
        prop_assert_eq!(history.version(), version);
    }

    #[test]
    fn undo_then_redo_is_identity(ops in ops_strategy()) {
        let mut history = History::new(0u8, HistoryConfig::default());
        for op in &ops {
            apply(&mut history, op);
        }
        let before = **history.current();
        if history.undo().is_some() {
            history.redo();
            prop_assert_eq!(**history.current(), before);
        }
    }

    #[test]
    fn push_after_undo_truncates_redo(ops in ops_strategy(), next in any::<u8>()) {
        let mut history = History::new(0u8, HistoryConfig::unlimited());
        for op in &ops {
            apply(&mut history, op);
        }
        if history.undo().is_some() && **history.current() != next {
            let cursor = history.cursor();
            prop_assert!(history.push(next));
            prop_assert!(!history.can_redo());
            prop_assert_eq!(history.len(), cursor + 2);
            prop_assert_eq!(**history.current(), next);
        }
    }

    #[test]
    fn reset_clears_both_directions(ops in ops_strategy(), seed in any::<u8>()) {
        let mut history = History::new(0u8, HistoryConfig::default());
        for op in &ops {
            apply(&mut history, op);
        }
        history.reset(seed);
        prop_assert_eq!(history.len(), 1);
        prop_assert!(!history.can_undo());
        prop_assert!(!history.can_redo());
        prop_assert_eq!(**history.current(), seed);
    }

    #[test]
    fn version_changes_iff_current_changes(ops in ops_strategy()) {
        let mut history = History::new(0u8, HistoryConfig::new(8));
        for op in &ops {
            let before_version = history.version();
            let before_ptr = std::sync::Arc::clone(history.current());
            apply(&mut history, op);
            let changed = !std::sync::Arc::ptr_eq(&before_ptr, history.current());
            if changed {
                prop_assert!(history.version() > before_version);
            }
            if matches!(op, Op::PushSame) {
                prop_assert_eq!(history.version(), before_version);
            }
        }
    }
}
