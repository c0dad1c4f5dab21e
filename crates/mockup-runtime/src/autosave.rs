#![forbid(unsafe_code)]

//! Debounced autosave of the current snapshot.
//!
//! A [`PersistenceAgent`] mirrors the snapshot currently presented by a
//! [`History`](crate::undo::History) into a [`StorageBackend`], writing at
//! most once per quiet period, and hands back a previously saved draft once
//! at startup.
//!
//! # Lifecycle
//!
//! ```text
//!  open ──► (draft?) ──► observe ─► observe ─► observe ─► ... tick ──► write
//!                           │          │          │                    ▲
//!                           └──────────┴──────────┴── reschedule ──────┘
//!                                                   deadline = now + debounce
//! ```
//!
//! 1. [`open`](PersistenceAgent::open) reads the record under the configured
//!    key. A decodable record is returned as the draft; anything else means
//!    "no draft". Nothing can be scheduled before `open` returns, so hydration
//!    always precedes the first write.
//! 2. [`observe`](PersistenceAgent::observe) is called after every history
//!    change. A changed snapshot cancels any pending write and schedules a new
//!    one at `now + debounce`, capturing that snapshot.
//! 3. [`tick`](PersistenceAgent::tick) performs the pending write once its
//!    deadline has passed.
//! 4. [`save_now`](PersistenceAgent::save_now) bypasses the debounce and
//!    consumes the pending write.
//!
//! # Invariants
//!
//! - At most one pending write exists at any time.
//! - A pending write stores exactly the snapshot observed when it was
//!   scheduled.
//! - Changes made within one quiet period produce exactly one write.
//!
//! # Failure Modes
//!
//! Storage failures never propagate. They are logged at `warn` (target
//! `mockup.autosave`), kept in [`last_error`](PersistenceAgent::last_error),
//! and leave [`has_unsaved_changes`](PersistenceAgent::has_unsaved_changes)
//! set. The next observed change or an explicit `save_now` retries.
//!
//! A stored record that fails to decode is treated as "no draft" and logged.
//! It is overwritten by the next successful write.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use web_time::{Duration, Instant, SystemTime};

use crate::state_persistence::{PersistedRecord, StorageBackend, StorageError};

/// Default quiet period before a write.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(2000);

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for one [`PersistenceAgent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistConfig {
    /// Storage key for the draft record.
    pub key: String,
    /// Quiet period after the last change before writing.
    pub debounce: Duration,
    /// When false the agent neither hydrates nor schedules writes.
    /// [`save_now`](PersistenceAgent::save_now) still writes.
    pub enabled: bool,
}

impl PersistConfig {
    /// Enabled configuration with the default debounce.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            debounce: DEFAULT_DEBOUNCE,
            enabled: true,
        }
    }

    /// Set the quiet period.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Enable or disable autosave.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// ============================================================================
// Outcome / status
// ============================================================================

/// Result of one write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The record was written.
    Saved {
        /// Size of the stored record text.
        bytes: usize,
    },
    /// The write failed; see [`PersistenceAgent::last_error`].
    Failed,
}

impl SaveOutcome {
    /// Whether the write succeeded.
    #[must_use]
    pub fn is_saved(self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Copyable save state for status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveStatus {
    pub is_saving: bool,
    pub last_saved: Option<SystemTime>,
    pub has_unsaved_changes: bool,
    pub has_error: bool,
    pub pending: bool,
}

// ============================================================================
// Agent
// ============================================================================

struct PendingWrite<T> {
    deadline: Instant,
    snapshot: Arc<T>,
}

/// Debounced writer and one-shot draft loader for one storage key.
pub struct PersistenceAgent<T, S> {
    config: PersistConfig,
    storage: S,
    pending: Option<PendingWrite<T>>,
    /// Last snapshot seen through `open`, `observe`, or `save_now`.
    observed: Arc<T>,
    /// Snapshot known to match durable storage (or the startup baseline).
    /// `None` after the record is cleared.
    persisted: Option<Arc<T>>,
    last_saved: Option<SystemTime>,
    last_error: Option<StorageError>,
    saving: bool,
    writes: u64,
}

impl<T, S> fmt::Debug for PersistenceAgent<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceAgent")
            .field("config", &self.config)
            .field("pending", &self.pending.as_ref().map(|p| p.deadline))
            .field("last_saved", &self.last_saved)
            .field("last_error", &self.last_error)
            .field("writes", &self.writes)
            .finish_non_exhaustive()
    }
}

impl<T, S> PersistenceAgent<T, S>
where
    T: Serialize + DeserializeOwned + PartialEq + Clone,
    S: StorageBackend,
{
    /// Open the agent and read any saved draft.
    ///
    /// `seed` is the snapshot the history starts from; it is the baseline for
    /// [`has_unsaved_changes`](Self::has_unsaved_changes) when no draft
    /// exists. When a draft exists the caller should `reset` its history to
    /// it.
    pub fn open(config: PersistConfig, storage: S, seed: &T) -> (Self, Option<T>) {
        let mut last_error = None;
        let draft = if config.enabled {
            match storage.get(&config.key) {
                Ok(Some(text)) => match decode_draft::<T>(&config.key, &text) {
                    Ok(value) => {
                        tracing::debug!(
                            target: "mockup.autosave",
                            key = %config.key,
                            backend = storage.name(),
                            bytes = text.len(),
                            "draft restored"
                        );
                        Some(value)
                    }
                    Err(err) => {
                        tracing::warn!(
                            target: "mockup.autosave",
                            key = %config.key,
                            error = %err,
                            "ignoring unreadable draft"
                        );
                        None
                    }
                },
                Ok(None) => None,
                Err(err) => {
                    tracing::warn!(
                        target: "mockup.autosave",
                        key = %config.key,
                        backend = storage.name(),
                        error = %err,
                        "draft read failed"
                    );
                    last_error = Some(err);
                    None
                }
            }
        } else {
            None
        };

        let baseline = Arc::new(draft.clone().unwrap_or_else(|| seed.clone()));
        let agent = Self {
            config,
            storage,
            pending: None,
            observed: Arc::clone(&baseline),
            persisted: Some(baseline),
            last_saved: None,
            last_error,
            saving: false,
            writes: 0,
        };
        (agent, draft)
    }

    /// Callback form of [`open`](Self::open).
    ///
    /// `on_load` runs synchronously, at most once, and only when a draft was
    /// found.
    pub fn open_with(
        config: PersistConfig,
        storage: S,
        seed: &T,
        on_load: impl FnOnce(T),
    ) -> Self {
        let (agent, draft) = Self::open(config, storage, seed);
        if let Some(draft) = draft {
            on_load(draft);
        }
        agent
    }

    /// Record the snapshot now presented by the history.
    ///
    /// An unchanged snapshot is ignored. A changed one replaces any pending
    /// write with one due at `now + debounce`.
    pub fn observe(&mut self, snapshot: &Arc<T>, now: Instant) {
        if same_snapshot(&self.observed, snapshot) {
            return;
        }
        self.observed = Arc::clone(snapshot);
        if !self.config.enabled {
            return;
        }
        let deadline = now + self.config.debounce;
        let rescheduled = self.pending.is_some();
        self.pending = Some(PendingWrite {
            deadline,
            snapshot: Arc::clone(snapshot),
        });
        tracing::trace!(
            target: "mockup.autosave",
            key = %self.config.key,
            rescheduled,
            debounce_ms = self.config.debounce.as_millis() as u64,
            "write scheduled"
        );
    }

    /// Perform the pending write if its deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Option<SaveOutcome> {
        if self.pending.as_ref().is_none_or(|p| now < p.deadline) {
            return None;
        }
        let pending = self.pending.take()?;
        Some(self.write(pending.snapshot))
    }

    /// Write `snapshot` immediately, consuming any pending write.
    pub fn save_now(&mut self, snapshot: &Arc<T>) -> SaveOutcome {
        self.pending = None;
        self.observed = Arc::clone(snapshot);
        self.write(Arc::clone(snapshot))
    }

    /// Delete the stored draft and drop any pending write.
    ///
    /// In-memory state is not touched. Failures are logged and kept in
    /// [`last_error`](Self::last_error).
    pub fn clear_saved(&mut self) {
        self.pending = None;
        self.last_saved = None;
        self.persisted = None;
        match self.storage.remove(&self.config.key) {
            Ok(()) => {
                self.last_error = None;
                tracing::debug!(target: "mockup.autosave", key = %self.config.key, "draft cleared");
            }
            Err(err) => {
                tracing::warn!(
                    target: "mockup.autosave",
                    key = %self.config.key,
                    error = %err,
                    "draft clear failed"
                );
                self.last_error = Some(err);
            }
        }
    }

    /// Turn autosave on or off.
    ///
    /// Disabling drops any pending write. Re-enabling with edits that were
    /// observed while disabled schedules a write due at `now + debounce`.
    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        let was_enabled = self.config.enabled;
        self.config.enabled = enabled;
        if !enabled {
            self.cancel_pending();
            return;
        }
        if !was_enabled && self.pending.is_none() && self.has_unsaved_changes() {
            self.pending = Some(PendingWrite {
                deadline: now + self.config.debounce,
                snapshot: Arc::clone(&self.observed),
            });
            tracing::trace!(
                target: "mockup.autosave",
                key = %self.config.key,
                "write scheduled on re-enable"
            );
        }
    }

    fn write(&mut self, snapshot: Arc<T>) -> SaveOutcome {
        self.saving = true;
        let result = PersistedRecord::encode(&self.config.key, snapshot.as_ref())
            .and_then(|text| self.storage.set(&self.config.key, &text).map(|()| text.len()));
        self.saving = false;

        match result {
            Ok(bytes) => {
                self.writes += 1;
                self.persisted = Some(snapshot);
                self.last_saved = Some(SystemTime::now());
                self.last_error = None;
                tracing::debug!(
                    target: "mockup.autosave",
                    key = %self.config.key,
                    backend = self.storage.name(),
                    bytes,
                    writes = self.writes,
                    "draft saved"
                );
                SaveOutcome::Saved { bytes }
            }
            Err(err) => {
                tracing::warn!(
                    target: "mockup.autosave",
                    key = %self.config.key,
                    backend = self.storage.name(),
                    error = %err,
                    "draft save failed"
                );
                self.last_error = Some(err);
                SaveOutcome::Failed
            }
        }
    }
}

impl<T: PartialEq, S> PersistenceAgent<T, S> {
    /// Whether the last observed snapshot differs from what is stored.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        match &self.persisted {
            Some(persisted) => !same_snapshot(persisted, &self.observed),
            None => true,
        }
    }

    /// Snapshot of all status flags.
    #[must_use]
    pub fn status(&self) -> SaveStatus {
        SaveStatus {
            is_saving: self.is_saving(),
            last_saved: self.last_saved,
            has_unsaved_changes: self.has_unsaved_changes(),
            has_error: self.last_error.is_some(),
            pending: self.pending.is_some(),
        }
    }
}

impl<T, S> PersistenceAgent<T, S> {
    /// Drop the pending write without performing it.
    pub fn cancel_pending(&mut self) {
        if self.pending.take().is_some() {
            tracing::trace!(target: "mockup.autosave", key = %self.config.key, "pending write cancelled");
        }
    }

    /// True from the moment a write is scheduled until it completes or
    /// fails.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving || self.pending.is_some()
    }

    /// Time of the last successful write in this session.
    #[must_use]
    pub fn last_saved(&self) -> Option<SystemTime> {
        self.last_saved
    }

    /// Error from the most recent failed storage operation, cleared on the
    /// next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&StorageError> {
        self.last_error.as_ref()
    }

    /// Successful writes performed by this agent.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// When the pending write is due, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.config.key
    }

    #[must_use]
    pub fn config(&self) -> &PersistConfig {
        &self.config
    }

    /// The storage backend.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<T, S> Drop for PersistenceAgent<T, S> {
    fn drop(&mut self) {
        if self.pending.is_some() {
            tracing::debug!(
                target: "mockup.autosave",
                key = %self.config.key,
                "discarding pending write on drop"
            );
        }
    }
}

fn same_snapshot<T: PartialEq>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::ptr_eq(a, b) || a.as_ref() == b.as_ref()
}

fn decode_draft<T: DeserializeOwned>(key: &str, text: &str) -> Result<T, StorageError> {
    let record = PersistedRecord::parse(text)?;
    if record.key != key {
        return Err(StorageError::Corrupt(format!(
            "record written for key {:?}",
            record.key
        )));
    }
    record.payload_as()
}

// ============================================================================
// Tests
// ============================================================================
