#![forbid(unsafe_code)]

//! Mockup Runtime
//!
//! This crate provides the stateful pieces every editor screen shares: the
//! undo/redo history, the durable key-value storage boundary, and the
//! debounced autosave agent that keeps a draft of the current state.
//!
//! # Key Components
//!
//! - [`History`] - Snapshot undo/redo store with an entries + cursor model
//! - [`StorageBackend`] - Fallible `get`/`set`/`remove` string storage
//! - [`MemoryStorage`] / [`FileStorage`] - Bundled backends
//! - [`PersistedRecord`] - Versioned JSON envelope for one stored snapshot
//! - [`PersistenceAgent`] - Debounced writer and one-shot draft loader
//! - [`RuntimeSettings`] - Tunables loadable from TOML, JSON, or env
//!
//! # Role in the workspace
//! `mockup-runtime` is the state layer. `mockup-editor` composes a
//! [`History`] with a [`PersistenceAgent`] and the key dispatcher from
//! `mockup-core` into a per-screen editor.
//!
//! # Time
//! Nothing here spawns timers. Time-dependent operations take an explicit
//! `now: Instant`; the host drives [`PersistenceAgent::tick`] from its own
//! tick loop and can ask [`PersistenceAgent::next_deadline`] when to wake.

pub mod autosave;
pub mod settings;
pub mod state_persistence;
pub mod undo;

pub use autosave::{PersistConfig, PersistenceAgent, SaveOutcome, SaveStatus};
pub use settings::{RuntimeSettings, SettingsError};
#[cfg(feature = "file-storage")]
pub use state_persistence::FileStorage;
pub use state_persistence::{
    MemoryStorage, PersistedRecord, StorageBackend, StorageError, StorageResult,
};
pub use undo::{History, HistoryConfig};

/// Re-exported so hosts use the same clock type as the runtime.
pub use web_time::{Duration, Instant, SystemTime};
