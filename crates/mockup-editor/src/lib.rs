#![forbid(unsafe_code)]

//! Mockup Editor
//!
//! Per-screen editor façade for mockup documents. An [`Editor`] owns an
//! undo/redo history of whole-document snapshots, a debounced autosave agent
//! that mirrors the current snapshot into storage, and a scoped key-command
//! registration. Screens differ only in their document shape.
//!
//! # Key Components
//!
//! - [`Editor`] / [`EditorConfig`] - Generic façade over `Document<D, A>`
//! - [`Document`] - Content plus appearance, undone as one value
//! - [`EditorAction`] / [`default_keymap`] - Keyboard actions and bindings
//! - [`chat`] - Chat conversation mockups
//! - [`ai`] - AI assistant conversation mockups
//!
//! # Example
//!
//! ```
//! use mockup_core::{Dispatcher, KeyContext, KeyEvent, Modifiers};
//! use mockup_editor::chat::{self, Sender};
//! use mockup_editor::{Editor, KeyOutcome, EditorAction};
//! use mockup_runtime::{Instant, MemoryStorage};
//!
//! let dispatcher = Dispatcher::new();
//! let now = Instant::now();
//! let mut editor = Editor::open(chat::default_config(), MemoryStorage::new(), &dispatcher, now);
//!
//! editor.add_message(now, Sender::Me, "Running late!");
//! let undo = KeyEvent::char('z').with_modifiers(Modifiers::CTRL);
//! assert_eq!(
//!     editor.handle_key(&undo, KeyContext::new(), now),
//!     KeyOutcome::Applied(EditorAction::Undo)
//! );
//! assert_eq!(editor.data().messages.len(), 2);
//! ```

pub mod action;
pub mod ai;
pub mod chat;
pub mod document;
pub mod editor;

pub use action::{EditorAction, KeyOutcome, default_keymap};
pub use document::{DeviceFrame, Document, EditorDomain};
pub use editor::{Editor, EditorConfig, EditorError};
