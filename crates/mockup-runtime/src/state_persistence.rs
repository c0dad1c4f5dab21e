#![forbid(unsafe_code)]

//! Durable key-value storage for editor drafts.
//!
//! The autosave agent needs exactly one thing from the outside world: a place
//! to put a string under a key and read it back later. [`StorageBackend`] is
//! that boundary. It is synchronous and fallible; every failure is reported as
//! a [`StorageError`] and it is up to the caller to decide whether that is
//! fatal (for the autosave agent it never is).
//!
//! # Backends
//!
//! - [`MemoryStorage`]: shared in-process map. Supports a byte quota and an
//!   availability switch so quota and outage paths can be exercised in tests.
//! - [`FileStorage`] (feature `file-storage`): one JSON file per key under a
//!   root directory, written atomically.
//!
//! # Record Format
//!
//! Snapshots are stored inside a versioned envelope, [`PersistedRecord`]:
//!
//! ```json
//! {
//!   "version": 1,
//!   "key": "chat-mockup-draft",
//!   "written_at_ms": 1760600000000,
//!   "payload": { "data": { ... }, "appearance": { ... } }
//! }
//! ```
//!
//! A record with a different `version`, or text that is not a record at all,
//! decodes to [`StorageError::Corrupt`].
//!
//! # Atomic Writes
//!
//! [`FileStorage`] writes to a temp file in the same directory and renames it
//! over the target, so a crash mid-write leaves the previous record intact.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use web_time::{Duration, SystemTime};

/// Current record format version.
pub const RECORD_VERSION: u32 = 1;

// ============================================================================
// Errors
// ============================================================================

/// Errors from storage backends and record decoding.
#[derive(Debug)]
pub enum StorageError {
    /// Underlying I/O failed.
    Io(io::Error),
    /// A snapshot could not be converted to or from JSON.
    Serialization(serde_json::Error),
    /// The write would exceed the backend's capacity.
    QuotaExceeded {
        /// Bytes the backend would hold after the write.
        needed: usize,
        /// Configured capacity in bytes.
        limit: usize,
    },
    /// The backend cannot be used at all right now.
    Unavailable(String),
    /// Stored text is not a record this version understands.
    Corrupt(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "storage I/O error: {e}"),
            Self::Serialization(e) => write!(f, "snapshot serialization failed: {e}"),
            Self::QuotaExceeded { needed, limit } => {
                write!(f, "storage quota exceeded: need {needed} bytes, limit {limit}")
            }
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
            Self::Corrupt(reason) => write!(f, "stored record is corrupt: {reason}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================================
// Backend trait
// ============================================================================

/// A synchronous string key-value store.
///
/// Methods take `&self`; backends that mutate in memory use interior
/// mutability. At most one value is held per key.
pub trait StorageBackend {
    /// Read the value under `key`. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove the value under `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for Arc<B> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

// ============================================================================
// Persisted record
// ============================================================================

/// Versioned envelope around one stored snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    /// Format version, always [`RECORD_VERSION`] when written by this crate.
    pub version: u32,
    /// Storage key the record was written under.
    pub key: String,
    /// Wall-clock write time, milliseconds since the Unix epoch.
    pub written_at_ms: u64,
    /// The snapshot itself.
    pub payload: serde_json::Value,
}

impl PersistedRecord {
    /// Wrap a snapshot, stamping it with the current time.
    pub fn capture<T: Serialize>(key: &str, value: &T) -> StorageResult<Self> {
        Ok(Self {
            version: RECORD_VERSION,
            key: key.to_owned(),
            written_at_ms: now_ms(),
            payload: serde_json::to_value(value)?,
        })
    }

    /// Serialize the record to JSON text.
    pub fn to_json(&self) -> StorageResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse JSON text into a record, checking the format version.
    pub fn parse(text: &str) -> StorageResult<Self> {
        let record: Self = serde_json::from_str(text)
            .map_err(|e| StorageError::Corrupt(format!("not a persisted record: {e}")))?;
        if record.version != RECORD_VERSION {
            return Err(StorageError::Corrupt(format!(
                "unsupported record version: {} (expected {RECORD_VERSION})",
                record.version
            )));
        }
        Ok(record)
    }

    /// Deserialize the payload into a snapshot type.
    pub fn payload_as<T: DeserializeOwned>(&self) -> StorageResult<T> {
        T::deserialize(&self.payload)
            .map_err(|e| StorageError::Corrupt(format!("payload does not match snapshot: {e}")))
    }

    /// Wall-clock write time.
    #[must_use]
    pub fn written_at(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_millis(self.written_at_ms)
    }

    /// Capture and serialize in one step.
    pub fn encode<T: Serialize>(key: &str, value: &T) -> StorageResult<String> {
        Self::capture(key, value)?.to_json()
    }

    /// Parse and extract the payload in one step.
    pub fn decode<T: DeserializeOwned>(text: &str) -> StorageResult<T> {
        Self::parse(text)?.payload_as()
    }
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// ============================================================================
// MemoryStorage
// ============================================================================

#[derive(Debug)]
struct MemoryInner {
    entries: HashMap<String, String>,
    quota: Option<usize>,
    available: bool,
    writes: u64,
}

impl MemoryInner {
    fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

/// In-process storage backed by a shared map.
///
/// Clones share the same map, so a test can keep one handle while the agent
/// owns another.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Create an empty, unlimited store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner {
                entries: HashMap::new(),
                quota: None,
                available: true,
                writes: 0,
            })),
        }
    }

    /// Create an empty store holding at most `limit` bytes (keys plus values).
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        let storage = Self::new();
        storage.set_quota(Some(limit));
        storage
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Change the byte quota. `None` removes the limit.
    pub fn set_quota(&self, limit: Option<usize>) {
        self.lock().quota = limit;
    }

    /// Simulate the medium going away (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Number of successful `set` calls.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.lock().writes
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Whether a value exists under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Read a value bypassing availability. For inspection in tests.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    /// Store a raw value bypassing quota and write counting.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().entries.insert(key.into(), value.into());
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let inner = self.lock();
        if !inner.available {
            return Err(StorageError::Unavailable("memory storage disabled".into()));
        }
        Ok(inner.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut inner = self.lock();
        if !inner.available {
            return Err(StorageError::Unavailable("memory storage disabled".into()));
        }
        if let Some(limit) = inner.quota {
            let replaced = inner.entries.get(key).map_or(0, |old| key.len() + old.len());
            let needed = inner.used_bytes() - replaced + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }
        inner.entries.insert(key.to_owned(), value.to_owned());
        inner.writes += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut inner = self.lock();
        if !inner.available {
            return Err(StorageError::Unavailable("memory storage disabled".into()));
        }
        inner.entries.remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ============================================================================
// FileStorage
// ============================================================================

#[cfg(feature = "file-storage")]
pub use file::FileStorage;

#[cfg(feature = "file-storage")]
mod file {
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    use super::{StorageBackend, StorageResult};

    /// One JSON file per key under a root directory.
    ///
    /// The root is created on first write. Keys are mapped to file names by
    /// replacing anything outside `[A-Za-z0-9._-]` with `_`.
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        root: PathBuf,
    }

    impl FileStorage {
        /// Store files under `root`.
        #[must_use]
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into() }
        }

        /// Root directory.
        #[must_use]
        pub fn root(&self) -> &Path {
            &self.root
        }

        /// File that holds the value for `key`.
        #[must_use]
        pub fn path_for(&self, key: &str) -> PathBuf {
            self.root.join(format!("{}.json", sanitize_key(key)))
        }
    }

    fn sanitize_key(key: &str) -> String {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        // Leading dots would hide the file or walk upward.
        let name = name.trim_start_matches('.');
        if name.is_empty() {
            "_".to_owned()
        } else {
            name.to_owned()
        }
    }

    impl StorageBackend for FileStorage {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            match fs::read_to_string(self.path_for(key)) {
                Ok(text) => Ok(Some(text)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            fs::create_dir_all(&self.root)?;
            let path = self.path_for(key);
            let temp = path.with_extension("json.tmp");
            fs::write(&temp, value)?;
            fs::rename(&temp, &path)?;
            tracing::trace!(target: "mockup.storage", path = %path.display(), bytes = value.len(), "file written");
            Ok(())
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            match fs::remove_file(self.path_for(key)) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        }

        fn name(&self) -> &str {
            "file"
        }
    }

}

// ============================================================================
// Tests
// ============================================================================
