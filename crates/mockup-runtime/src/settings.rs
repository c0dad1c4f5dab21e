#![forbid(unsafe_code)]

//! Runtime tunables for the history and autosave layers.
//!
//! [`RuntimeSettings`] collects the few knobs a host may want to expose:
//! history depth, autosave debounce, whether autosave runs at all, and where
//! file-backed drafts live. Settings load from TOML (feature
//! `settings-toml`), JSON, or environment variables, and are always clamped
//! through [`RuntimeSettings::validated`] before use.
//!
//! # Example (TOML)
//!
//! ```toml
//! history_depth = 200
//! autosave_debounce_ms = 1500
//! autosave_enabled = true
//! storage_dir = "/var/lib/mockup/drafts"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `MOCKUP_HISTORY_DEPTH` | `history_depth` |
//! | `MOCKUP_AUTOSAVE_DEBOUNCE_MS` | `autosave_debounce_ms` |
//! | `MOCKUP_AUTOSAVE_DISABLED` | `autosave_enabled` (set to `1`/`true` to disable) |
//! | `MOCKUP_STORAGE_DIR` | `storage_dir` |
//!
//! Unparseable values are ignored and the default is kept.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::autosave::{DEFAULT_DEBOUNCE, PersistConfig};
use crate::undo::HistoryConfig;
use crate::undo::history::DEFAULT_MAX_DEPTH;

/// Smallest accepted history depth.
pub const MIN_HISTORY_DEPTH: usize = 1;
/// Largest accepted history depth.
pub const MAX_HISTORY_DEPTH: usize = 10_000;
/// Largest accepted autosave debounce.
pub const MAX_AUTOSAVE_DEBOUNCE_MS: u64 = 60_000;

/// Tunables shared by every editor screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Snapshots retained per history.
    pub history_depth: usize,
    /// Quiet period before an autosave write.
    pub autosave_debounce_ms: u64,
    /// Whether drafts are restored and written automatically.
    pub autosave_enabled: bool,
    /// Directory for file-backed drafts. `None` means in-memory only.
    pub storage_dir: Option<PathBuf>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_MAX_DEPTH,
            autosave_debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            autosave_enabled: true,
            storage_dir: None,
        }
    }
}

impl RuntimeSettings {
    /// Parse from a TOML string.
    #[cfg(feature = "settings-toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        toml::from_str::<Self>(s)
            .map(Self::validated)
            .map_err(SettingsError::Toml)
    }

    /// Load from a TOML file.
    #[cfg(feature = "settings-toml")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(SettingsError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parse from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, SettingsError> {
        serde_json::from_str::<Self>(s)
            .map(Self::validated)
            .map_err(SettingsError::Json)
    }

    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(SettingsError::Io)?;
        Self::from_json_str(&content)
    }

    /// Defaults overridden by `MOCKUP_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable lookup.
    #[must_use]
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(val) = lookup("MOCKUP_HISTORY_DEPTH")
            && let Ok(depth) = val.trim().parse::<usize>()
        {
            settings.history_depth = depth;
        }

        if let Some(val) = lookup("MOCKUP_AUTOSAVE_DEBOUNCE_MS")
            && let Ok(ms) = val.trim().parse::<u64>()
        {
            settings.autosave_debounce_ms = ms;
        }

        if let Some(val) = lookup("MOCKUP_AUTOSAVE_DISABLED") {
            let val = val.trim();
            settings.autosave_enabled = !(val == "1" || val.eq_ignore_ascii_case("true"));
        }

        if let Some(val) = lookup("MOCKUP_STORAGE_DIR")
            && !val.trim().is_empty()
        {
            settings.storage_dir = Some(PathBuf::from(val));
        }

        settings.validated()
    }

    /// Clamp values to supported ranges.
    ///
    /// - `history_depth` to `1..=10_000`
    /// - `autosave_debounce_ms` to `0..=60_000`
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.history_depth = self
            .history_depth
            .clamp(MIN_HISTORY_DEPTH, MAX_HISTORY_DEPTH);
        self.autosave_debounce_ms = self.autosave_debounce_ms.min(MAX_AUTOSAVE_DEBOUNCE_MS);
        self
    }

    /// Check whether values are already within supported ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (MIN_HISTORY_DEPTH..=MAX_HISTORY_DEPTH).contains(&self.history_depth)
            && self.autosave_debounce_ms <= MAX_AUTOSAVE_DEBOUNCE_MS
    }

    /// Autosave debounce as a duration.
    #[must_use]
    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    /// History configuration for these settings.
    #[must_use]
    pub fn to_history_config(&self) -> HistoryConfig {
        HistoryConfig::new(self.history_depth)
    }

    /// Autosave configuration for `key` under these settings.
    #[must_use]
    pub fn to_persist_config(&self, key: impl Into<String>) -> PersistConfig {
        PersistConfig::new(key)
            .with_debounce(self.autosave_debounce())
            .with_enabled(self.autosave_enabled)
    }

    /// File storage rooted at `storage_dir`, if one is configured.
    #[cfg(feature = "file-storage")]
    #[must_use]
    pub fn file_storage(&self) -> Option<crate::state_persistence::FileStorage> {
        self.storage_dir
            .as_ref()
            .map(crate::state_persistence::FileStorage::new)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors from loading settings.
#[derive(Debug)]
pub enum SettingsError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "settings-toml")]
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "settings-toml")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "settings-toml")]
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
