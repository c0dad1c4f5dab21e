#![forbid(unsafe_code)]

//! End-to-end autosave scenarios: history + agent + real backends.

use std::sync::Arc;

use mockup_runtime::{
    Duration, FileStorage, History, HistoryConfig, Instant, MemoryStorage, PersistConfig,
    PersistedRecord, PersistenceAgent, SaveOutcome, StorageBackend,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Counter {
    count: i32,
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Minimal screen: a history whose every change is reported to the agent.
struct Screen<S: StorageBackend> {
    history: History<Counter>,
    agent: PersistenceAgent<Counter, S>,
}

impl<S: StorageBackend> Screen<S> {
    fn open(storage: S, config: PersistConfig) -> Self {
        let seed = Counter { count: 0 };
        let (agent, draft) = PersistenceAgent::open(config, storage, &seed);
        let mut history = History::new(seed, HistoryConfig::default());
        if let Some(draft) = draft {
            history.reset(draft);
        }
        Self { history, agent }
    }

    fn set(&mut self, count: i32, now: Instant) {
        if self.history.push(Counter { count }) {
            self.agent.observe(self.history.current(), now);
        }
    }

    fn undo(&mut self, now: Instant) {
        if self.history.undo().is_some() {
            self.agent.observe(self.history.current(), now);
        }
    }
}

#[test]
fn draft_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let t0 = Instant::now();

    {
        let mut screen = Screen::open(FileStorage::new(dir.path()), PersistConfig::new("counter"));
        screen.set(1, t0);
        screen.set(2, t0 + ms(100));
        assert!(screen.agent.tick(t0 + ms(2100)).unwrap().is_saved());
    }

    let screen = Screen::open(FileStorage::new(dir.path()), PersistConfig::new("counter"));
    assert_eq!(screen.history.current().count, 2);
    assert!(!screen.history.can_undo(), "hydration must not be undoable");
    assert!(!screen.agent.has_unsaved_changes());
}

#[test]
fn debounce_scenario_first_write_at_three_seconds() {
    let storage = MemoryStorage::new();
    let mut screen = Screen::open(storage.clone(), PersistConfig::new("counter"));
    let t0 = Instant::now();

    screen.set(1, t0);
    screen.set(2, t0 + ms(500));
    screen.set(3, t0 + ms(1000));

    let mut first_write = None;
    for step in 0..=40u64 {
        let now = t0 + ms(step * 100);
        if screen.agent.tick(now).is_some() && first_write.is_none() {
            first_write = Some(step * 100);
        }
    }
    assert_eq!(first_write, Some(3000));
    assert_eq!(storage.write_count(), 1);

    let stored: Counter = PersistedRecord::decode(&storage.peek("counter").unwrap()).unwrap();
    assert_eq!(stored.count, 3);
}

#[test]
fn undo_is_persisted_like_any_change() {
    let storage = MemoryStorage::new();
    let mut screen = Screen::open(storage.clone(), PersistConfig::new("counter"));
    let t0 = Instant::now();

    screen.set(1, t0);
    screen.set(2, t0);
    screen.agent.tick(t0 + ms(2000));
    screen.undo(t0 + ms(2500));
    screen.agent.tick(t0 + ms(4500));

    let stored: Counter = PersistedRecord::decode(&storage.peek("counter").unwrap()).unwrap();
    assert_eq!(stored.count, 1);
    assert_eq!(storage.write_count(), 2);
}

#[test]
fn failed_write_retries_on_next_change() {
    let storage = MemoryStorage::new();
    let mut screen = Screen::open(storage.clone(), PersistConfig::new("counter"));
    let t0 = Instant::now();

    storage.set_available(false);
    screen.set(5, t0);
    assert_eq!(screen.agent.tick(t0 + ms(2000)), Some(SaveOutcome::Failed));
    assert!(screen.agent.status().has_unsaved_changes);
    assert!(screen.agent.status().has_error);

    storage.set_available(true);
    screen.set(6, t0 + ms(2500));
    assert!(screen.agent.tick(t0 + ms(4500)).unwrap().is_saved());
    assert!(!screen.agent.status().has_error);
    assert!(!screen.agent.has_unsaved_changes());
}

#[test]
fn clear_then_restart_starts_from_defaults() {
    let storage = MemoryStorage::new();
    let t0 = Instant::now();
    {
        let mut screen = Screen::open(storage.clone(), PersistConfig::new("counter"));
        screen.set(9, t0);
        screen.agent.save_now(&Arc::clone(screen.history.current()));
        screen.agent.clear_saved();
        assert_eq!(screen.history.current().count, 9);
    }
    let screen = Screen::open(storage, PersistConfig::new("counter"));
    assert_eq!(screen.history.current().count, 0);
}

#[test]
fn separate_keys_do_not_interfere() {
    let storage = MemoryStorage::new();
    let t0 = Instant::now();
    let mut chat = Screen::open(storage.clone(), PersistConfig::new("chat-draft"));
    let mut ai = Screen::open(storage.clone(), PersistConfig::new("ai-draft"));

    chat.set(1, t0);
    ai.set(2, t0);
    chat.agent.tick(t0 + ms(2000));
    ai.agent.tick(t0 + ms(2000));

    let chat_again = Screen::open(storage.clone(), PersistConfig::new("chat-draft"));
    let ai_again = Screen::open(storage, PersistConfig::new("ai-draft"));
    assert_eq!(chat_again.history.current().count, 1);
    assert_eq!(ai_again.history.current().count, 2);
}
