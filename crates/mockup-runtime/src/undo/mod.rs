#![forbid(unsafe_code)]

//! Undo/redo history for editor documents.
//!
//! Every edit produces a new immutable snapshot of the whole document. The
//! history keeps a bounded, chronological list of those snapshots and a
//! cursor pointing at the one presented to the UI.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          History<T>                           │
//! │                                                               │
//! │   entries:  [Arc(s0)] [Arc(s1)] [Arc(s2)] [Arc(s3)]           │
//! │                                     ▲                         │
//! │   cursor ───────────────────────────┘   (s3 is redo-able)     │
//! │                                                               │
//! │   undo(): cursor - 1        redo(): cursor + 1                │
//! │   push(s4): drop s3, append s4, cursor → s4                   │
//! │   reset(seed): [Arc(seed)], cursor = 0                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Notes
//!
//! ## Snapshots, not commands
//!
//! Documents here are small value types (a list of chat messages plus a few
//! appearance flags), so storing whole snapshots is simpler than recording
//! reversible commands and cannot drift out of sync with the state.
//! Snapshots are `Arc`-wrapped so handing the current one to a renderer or
//! the autosave agent never copies it.
//!
//! ## Null edits
//!
//! A push whose result equals the current snapshot is ignored. Setters can
//! be called unconditionally (e.g. on every keystroke in a form field)
//! without filling the history with no-op steps.
//!
//! ## Bounded memory
//!
//! The history holds at most `max_depth` snapshots (default 100). The oldest
//! are evicted first; the current snapshot is never evicted.

pub mod history;

pub use history::{History, HistoryConfig};
