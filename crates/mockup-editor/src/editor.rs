#![forbid(unsafe_code)]

//! Per-screen editor: history, autosave, and key commands behind one handle.
//!
//! # Design
//!
//! An [`Editor`] owns three collaborators:
//!
//! ```text
//!            set_data / set_appearance / update / load
//!                          │
//!                          ▼
//!   key ──► Registration ──► apply ──► History ──► current ──► PersistenceAgent
//!                                         ▲                         │
//!                                         └──── reset(draft) ◄──────┘ (open)
//! ```
//!
//! Every path that changes the current snapshot (edits, undo, redo, loads)
//! ends by reporting it to the agent, so the stored draft always tracks what
//! the user sees. Loads go through `reset`, never `push`, so an import or a
//! restored draft is not undoable back to the defaults.
//!
//! # Invariants
//!
//! - A restored draft is applied before `open` returns and before any write.
//! - One edit method call produces at most one undo step.
//! - Dropping the editor unregisters its key commands and discards any
//!   pending autosave write.
//!
//! # Failure Modes
//!
//! Storage failures surface only through [`SaveStatus`]. Import and export
//! return [`EditorError`].

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use web_time::Instant;

use mockup_core::{Command, Dispatcher, KeyContext, KeyEvent, Registration};
use mockup_runtime::{
    History, HistoryConfig, PersistConfig, PersistenceAgent, RuntimeSettings, SaveOutcome,
    SaveStatus, StorageBackend,
};

use crate::action::{EditorAction, KeyOutcome, default_keymap};
use crate::document::{Document, EditorDomain};

// ============================================================================
// Errors
// ============================================================================

/// Errors from importing or exporting documents.
#[derive(Debug)]
pub enum EditorError {
    /// The text was not a document of this editor's shape.
    Import(serde_json::Error),
    /// The document could not be serialized.
    Export(serde_json::Error),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Import(e) => write!(f, "import failed: {e}"),
            Self::Export(e) => write!(f, "export failed: {e}"),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Import(e) | Self::Export(e) => Some(e),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Everything an editor needs at open time.
pub struct EditorConfig<D, A> {
    /// Screen name, used in logs and as the key-registration label.
    pub name: String,
    /// Document shown when there is no draft.
    pub defaults: Document<D, A>,
    pub history: HistoryConfig,
    pub persist: PersistConfig,
    /// Commands registered while the editor is open.
    pub keymap: Vec<Command<EditorAction>>,
}

impl<D: fmt::Debug, A: fmt::Debug> fmt::Debug for EditorConfig<D, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorConfig")
            .field("name", &self.name)
            .field("defaults", &self.defaults)
            .field("history", &self.history)
            .field("persist", &self.persist)
            .field("keymap", &self.keymap.len())
            .finish()
    }
}

impl<D, A> EditorConfig<D, A> {
    /// Defaults for a screen: draft key `"{name}-draft"`, default history
    /// depth and debounce, default keymap.
    #[must_use]
    pub fn new(name: impl Into<String>, defaults: Document<D, A>) -> Self {
        let name = name.into();
        Self {
            persist: PersistConfig::new(format!("{name}-draft")),
            name,
            defaults,
            history: HistoryConfig::default(),
            keymap: default_keymap(),
        }
    }

    #[must_use]
    pub fn with_history(mut self, history: HistoryConfig) -> Self {
        self.history = history;
        self
    }

    #[must_use]
    pub fn with_persist(mut self, persist: PersistConfig) -> Self {
        self.persist = persist;
        self
    }

    #[must_use]
    pub fn with_keymap(mut self, keymap: Vec<Command<EditorAction>>) -> Self {
        self.keymap = keymap;
        self
    }

    /// Apply history depth and autosave settings, keeping the draft key.
    #[must_use]
    pub fn with_settings(mut self, settings: &RuntimeSettings) -> Self {
        self.history = settings.to_history_config();
        self.persist = settings.to_persist_config(self.persist.key.clone());
        self
    }
}

// ============================================================================
// Editor
// ============================================================================

/// One editor screen.
pub struct Editor<D, A, S> {
    name: String,
    history: History<Document<D, A>>,
    agent: PersistenceAgent<Document<D, A>, S>,
    keys: Registration<EditorAction>,
}

impl<D, A, S> fmt::Debug for Editor<D, A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("name", &self.name)
            .field("history_len", &self.history.len())
            .field("cursor", &self.history.cursor())
            .field("agent", &self.agent)
            .field("keys", &self.keys)
            .finish()
    }
}

impl<D, A, S> Editor<D, A, S>
where
    D: Clone + PartialEq + Serialize + DeserializeOwned,
    A: Clone + PartialEq + Serialize + DeserializeOwned,
    S: StorageBackend,
{
    /// Open the screen: restore any draft, then register key commands.
    pub fn open(
        config: EditorConfig<D, A>,
        storage: S,
        dispatcher: &Dispatcher<EditorAction>,
        now: Instant,
    ) -> Self {
        let EditorConfig {
            name,
            defaults,
            history,
            persist,
            keymap,
        } = config;

        let (mut agent, draft) = PersistenceAgent::open(persist, storage, &defaults);
        let restored = draft.is_some();
        let mut history = History::new(defaults, history);
        if let Some(draft) = draft {
            history.reset(draft);
        }
        agent.observe(history.current(), now);

        let keys = dispatcher.register(name.clone(), keymap);
        tracing::info!(
            target: "mockup.editor",
            editor = %name,
            restored,
            autosave = agent.is_enabled(),
            "editor opened"
        );

        Self {
            name,
            history,
            agent,
            keys,
        }
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Replace the data part with `f(current data)`.
    ///
    /// Returns `false` if the result equals the current data.
    pub fn set_data(&mut self, now: Instant, f: impl FnOnce(&D) -> D) -> bool {
        let changed = self.history.push_with(|doc| Document {
            data: f(&doc.data),
            appearance: doc.appearance.clone(),
        });
        self.after_edit(changed, now)
    }

    /// Replace the appearance part with `f(current appearance)`.
    pub fn set_appearance(&mut self, now: Instant, f: impl FnOnce(&A) -> A) -> bool {
        let changed = self.history.push_with(|doc| Document {
            data: doc.data.clone(),
            appearance: f(&doc.appearance),
        });
        self.after_edit(changed, now)
    }

    /// Edit both parts as one undo step.
    pub fn update(&mut self, now: Instant, f: impl FnOnce(&mut Document<D, A>)) -> bool {
        let changed = self.history.push_with(|doc| {
            let mut next = doc.clone();
            f(&mut next);
            next
        });
        self.after_edit(changed, now)
    }

    fn after_edit(&mut self, changed: bool, now: Instant) -> bool {
        if changed {
            self.agent.observe(self.history.current(), now);
        }
        changed
    }

    /// Step back one edit. Returns `false` at the oldest snapshot.
    pub fn undo(&mut self, now: Instant) -> bool {
        let moved = self.history.undo().is_some();
        self.after_edit(moved, now)
    }

    /// Step forward one undone edit.
    pub fn redo(&mut self, now: Instant) -> bool {
        let moved = self.history.redo().is_some();
        self.after_edit(moved, now)
    }

    /// Replace the document wholesale (template pick, cloud load). Clears
    /// undo and redo.
    pub fn load(&mut self, document: Document<D, A>, now: Instant) {
        self.history.reset(document);
        self.agent.observe(self.history.current(), now);
        tracing::info!(target: "mockup.editor", editor = %self.name, "document loaded");
    }

    /// Parse a JSON document and [`load`](Self::load) it.
    ///
    /// On error the current document and history are untouched.
    pub fn import_json(&mut self, text: &str, now: Instant) -> Result<(), EditorError> {
        let document: Document<D, A> = serde_json::from_str(text).map_err(|e| {
            tracing::warn!(target: "mockup.editor", editor = %self.name, error = %e, "import rejected");
            EditorError::Import(e)
        })?;
        self.load(document, now);
        Ok(())
    }

    /// The current document as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, EditorError> {
        serde_json::to_string_pretty(self.history.current().as_ref()).map_err(EditorError::Export)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the current document now, skipping the debounce.
    pub fn save_now(&mut self) -> SaveOutcome {
        self.agent.save_now(self.history.current())
    }

    /// Delete the stored draft. The open document is kept.
    pub fn clear_saved(&mut self) {
        self.agent.clear_saved();
    }

    /// Drive the autosave debounce. Call from the host's tick loop.
    pub fn tick(&mut self, now: Instant) -> Option<SaveOutcome> {
        self.agent.tick(now)
    }

    /// Turn autosave on or off for this screen. Turning it back on schedules
    /// a write if the document changed while it was off.
    pub fn set_autosave_enabled(&mut self, enabled: bool, now: Instant) {
        self.agent.set_enabled(enabled, now);
    }

    // ------------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------------

    /// Apply an action that needs no document knowledge.
    ///
    /// Document-dependent actions are forwarded; see
    /// [`apply`](Self::apply) for the full set.
    pub fn apply_basic(&mut self, action: EditorAction, now: Instant) -> KeyOutcome {
        match action {
            EditorAction::Undo => {
                self.undo(now);
            }
            EditorAction::Redo => {
                self.redo(now);
            }
            EditorAction::Save => {
                self.save_now();
            }
            EditorAction::ClearDraft => self.clear_saved(),
            EditorAction::Export
            | EditorAction::CloseDialog
            | EditorAction::ToggleDarkMode
            | EditorAction::SwitchPlatform(_) => return KeyOutcome::Forward(action),
        }
        KeyOutcome::Applied(action)
    }
}

impl<D, A, S> Editor<D, A, S>
where
    D: Clone + PartialEq + Serialize + DeserializeOwned,
    A: Clone + PartialEq + Serialize + DeserializeOwned,
    S: StorageBackend,
    Document<D, A>: EditorDomain,
{
    /// Apply an action, using the document's [`EditorDomain`] hooks for
    /// theme and platform switches.
    pub fn apply(&mut self, action: EditorAction, now: Instant) -> KeyOutcome {
        let mut understood = false;
        match action {
            EditorAction::ToggleDarkMode => {
                self.update(now, |doc| understood = doc.toggle_dark_mode());
            }
            EditorAction::SwitchPlatform(index) => {
                self.update(now, |doc| understood = doc.switch_platform(index));
            }
            other => return self.apply_basic(other, now),
        }
        if understood {
            KeyOutcome::Applied(action)
        } else {
            KeyOutcome::Forward(action)
        }
    }

    /// Route a key event through this editor's commands.
    ///
    /// Passes through when a newer registration (a dialog mounted over the
    /// editor) claims the same chord.
    pub fn handle_key(&mut self, event: &KeyEvent, ctx: KeyContext, now: Instant) -> KeyOutcome {
        let Some(action) = self.keys.claim(event, ctx) else {
            return KeyOutcome::PassThrough;
        };
        let outcome = self.apply(action, now);
        tracing::debug!(
            target: "mockup.editor",
            editor = %self.name,
            action = %action,
            forwarded = matches!(outcome, KeyOutcome::Forward(_)),
            "key action"
        );
        outcome
    }
}

impl<D, A, S> Editor<D, A, S> {
    /// The current snapshot.
    #[must_use]
    pub fn document(&self) -> &Document<D, A> {
        self.history.current()
    }

    #[must_use]
    pub fn data(&self) -> &D {
        &self.history.current().data
    }

    #[must_use]
    pub fn appearance(&self) -> &A {
        &self.history.current().appearance
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Change counter; bumps whenever the document shown changes.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.history.version()
    }

    #[must_use]
    pub fn history(&self) -> &History<Document<D, A>> {
        &self.history
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Autosave state for status indicators.
    #[must_use]
    pub fn save_status(&self) -> SaveStatus
    where
        D: PartialEq,
        A: PartialEq,
    {
        self.agent.status()
    }

    /// When the host should next call [`tick`](Self::tick).
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.agent.next_deadline()
    }

    /// The autosave agent, for detailed status (last error, write count).
    #[must_use]
    pub fn autosave(&self) -> &PersistenceAgent<Document<D, A>, S> {
        &self.agent
    }


    /// Enable or disable every key command bound to `action`.
    pub fn set_action_enabled(&self, action: EditorAction, enabled: bool) -> usize {
        self.keys.set_enabled_where(enabled, |a| *a == action)
    }

    /// `(chord, description)` pairs for a help overlay.
    #[must_use]
    pub fn key_hints(&self) -> Vec<(String, String)> {
        self.keys
            .with_commands(|set| {
                set.iter()
                    .filter(|c| c.enabled)
                    .map(|c| (c.chord.to_string(), c.description.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
