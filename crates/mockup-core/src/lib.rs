#![forbid(unsafe_code)]

//! Core: key events, chords, commands, and the keyboard command dispatcher.
//!
//! # Role in the workspace
//! `mockup-core` is the input layer. It owns the canonical key event types
//! and turns a stream of key presses into at most one named action per press.
//! It performs no I/O and knows nothing about the documents being edited.
//!
//! # Primary responsibilities
//! - **KeyEvent**: canonical key input (code, exact modifier set, press kind).
//! - **KeyChord / Command**: declared trigger plus an application-defined action.
//! - **CommandSet**: ordered, first-match-wins resolution with a focus guard.
//! - **Dispatcher / Registration**: scoped registration that is reversed when
//!   the owning screen goes away, on every exit path.
//!
//! # How it fits in the system
//! `mockup-editor` declares a keymap of `Command<EditorAction>` values,
//! registers it here, and applies whatever action a key press resolves to.
//! The history and persistence layers live in `mockup-runtime`.

pub mod dispatcher;
pub mod event;
pub mod keybinding;

pub use dispatcher::{Dispatch, Dispatcher, Registration};
pub use event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use keybinding::{
    ChordParseError, Command, CommandScope, CommandSet, KeyChord, KeyContext, KeyDisposition,
};
