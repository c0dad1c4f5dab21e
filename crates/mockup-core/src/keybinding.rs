#![forbid(unsafe_code)]

//! Key chords, commands, and first-match command resolution.
//!
//! # Key Concepts
//!
//! - **KeyChord**: a key plus the *exact* set of modifiers that must be held.
//!   `Ctrl+Z` does not match a plain `z` press and vice versa.
//!
//! - **Command**: a chord bound to an application-defined action value, with a
//!   description for help overlays, an enabled flag, and a focus scope.
//!
//! - **KeyContext**: runtime flags queried at the moment a key is resolved
//!   (currently: whether a text input has focus).
//!
//! - **CommandSet**: an ordered list of commands. Resolution returns the first
//!   enabled, in-scope command whose chord matches; declaration order is the
//!   tie-break for duplicate chords.
//!
//! # Focus Guard
//!
//! Chords without Ctrl, Alt, or Super (bare keys and Shift+key) are ordinary
//! typing while a text field has focus. Such commands are skipped while
//! [`KeyContext::text_input_focused`] is set, unless the command is marked
//! [`CommandScope::Global`]. Chords with a command modifier always resolve.
//!
//! # Example
//!
//! ```
//! use mockup_core::event::{KeyEvent, Modifiers};
//! use mockup_core::keybinding::{Command, CommandSet, KeyChord, KeyContext};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Action { Undo, Zoom }
//!
//! let set = CommandSet::new(vec![
//!     Command::new(KeyChord::ctrl('z'), Action::Undo).describe("Undo"),
//!     Command::new(KeyChord::plain('z'), Action::Zoom).describe("Zoom"),
//! ]);
//!
//! let ctrl_z = KeyEvent::char('z').with_modifiers(Modifiers::CTRL);
//! let hit = set.resolve(&ctrl_z, KeyContext::new()).unwrap();
//! assert_eq!(hit.action, Action::Undo);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::event::{KeyCode, KeyEvent, Modifiers};

// ---------------------------------------------------------------------------
// Key Chord
// ---------------------------------------------------------------------------

/// A key combined with the exact modifier set that triggers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    /// The primary key.
    pub code: KeyCode,
    /// Modifiers that must be held; no more, no fewer.
    pub modifiers: Modifiers,
}

impl KeyChord {
    /// Create a chord from a key code and modifiers.
    ///
    /// ASCII letters are stored lowercase, so `ctrl('Z')` and `ctrl('z')`
    /// are the same chord. Shift is expressed through `modifiers`.
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        let code = match code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        Self { code, modifiers }
    }

    /// A bare key with no modifiers.
    #[must_use]
    pub const fn key(code: KeyCode) -> Self {
        Self::new(code, Modifiers::NONE)
    }

    /// A bare character key.
    #[must_use]
    pub const fn plain(c: char) -> Self {
        Self::key(KeyCode::Char(c))
    }

    /// Ctrl+character.
    #[must_use]
    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), Modifiers::CTRL)
    }

    /// Ctrl+Shift+character.
    #[must_use]
    pub const fn ctrl_shift(c: char) -> Self {
        Self::new(KeyCode::Char(c), Modifiers::CTRL.union(Modifiers::SHIFT))
    }

    /// Meta (Cmd on macOS)+character.
    #[must_use]
    pub const fn meta(c: char) -> Self {
        Self::new(KeyCode::Char(c), Modifiers::SUPER)
    }

    /// Meta+Shift+character.
    #[must_use]
    pub const fn meta_shift(c: char) -> Self {
        Self::new(KeyCode::Char(c), Modifiers::SUPER.union(Modifiers::SHIFT))
    }

    /// Alt+character.
    #[must_use]
    pub const fn alt(c: char) -> Self {
        Self::new(KeyCode::Char(c), Modifiers::ALT)
    }

    /// Check whether a key event triggers this chord.
    ///
    /// The modifier sets must be equal. Character keys compare
    /// case-insensitively, so a Shift+Z press reported as `'Z'` matches a
    /// `Ctrl+Shift+z` chord; all other keys compare exactly.
    #[must_use]
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if self.modifiers != event.modifiers {
            return false;
        }
        match (self.code, event.code) {
            (KeyCode::Char(want), KeyCode::Char(got)) => {
                want == got || want.to_lowercase().eq(got.to_lowercase())
            }
            (want, got) => want == got,
        }
    }

    /// True if both chords fire on exactly the same key presses.
    #[must_use]
    pub fn same_trigger(&self, other: &KeyChord) -> bool {
        if self.modifiers != other.modifiers {
            return false;
        }
        match (self.code, other.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => a == b || a.to_lowercase().eq(b.to_lowercase()),
            (a, b) => a == b,
        }
    }

    /// True if typing this chord in a text field would produce text or
    /// ordinary editing (no Ctrl, Alt, or Super).
    #[must_use]
    pub const fn is_bare(&self) -> bool {
        !self.modifiers.has_command_modifier()
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (Modifiers::CTRL, "Ctrl"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::SUPER, "Meta"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        write!(f, "{}", self.code)
    }
}

/// Error returned when a chord string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChordParseError {
    /// The input was empty or only separators.
    Empty,
    /// A modifier name was not recognized.
    UnknownModifier(String),
    /// The key name was not recognized.
    UnknownKey(String),
}

impl fmt::Display for ChordParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty key chord"),
            Self::UnknownModifier(m) => write!(f, "unknown modifier '{m}'"),
            Self::UnknownKey(k) => write!(f, "unknown key '{k}'"),
        }
    }
}

impl std::error::Error for ChordParseError {}

impl FromStr for KeyChord {
    type Err = ChordParseError;

    /// Parse `[modifier+]*key`, e.g. `"Ctrl+Shift+Z"`, `"Meta+S"`, `"Escape"`.
    ///
    /// Modifier names: `Ctrl`/`Control`, `Alt`/`Option`, `Shift`,
    /// `Meta`/`Cmd`/`Super`/`Win`. A literal plus key is written `Plus`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((key, mods)) = parts.split_last() else {
            return Err(ChordParseError::Empty);
        };
        if key.is_empty() {
            return Err(ChordParseError::Empty);
        }

        let mut modifiers = Modifiers::NONE;
        for m in mods {
            modifiers |= match m.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => Modifiers::CTRL,
                "alt" | "option" => Modifiers::ALT,
                "shift" => Modifiers::SHIFT,
                "meta" | "cmd" | "command" | "super" | "win" => Modifiers::SUPER,
                _ => return Err(ChordParseError::UnknownModifier((*m).to_string())),
            };
        }

        let code =
            KeyCode::from_name(key).ok_or_else(|| ChordParseError::UnknownKey((*key).to_string()))?;
        Ok(Self::new(code, modifiers))
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Where a command is allowed to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandScope {
    /// Bare-key commands are suppressed while a text input has focus.
    #[default]
    Focused,
    /// Fires regardless of focus (e.g. Escape closing a dialog).
    Global,
}

/// A keyboard-triggerable action.
///
/// `A` is whatever the owner wants back when the chord fires: usually a small
/// `Copy`/`Clone` enum that the owner applies to its own state.
#[derive(Debug, Clone, PartialEq)]
pub struct Command<A> {
    /// Trigger.
    pub chord: KeyChord,
    /// Action handed back to the owner when the chord fires.
    pub action: A,
    /// Human-readable label for help overlays.
    pub description: String,
    /// Disabled commands never resolve.
    pub enabled: bool,
    /// Focus behavior.
    pub scope: CommandScope,
}

impl<A> Command<A> {
    /// Create an enabled, focus-scoped command with an empty description.
    #[must_use]
    pub fn new(chord: KeyChord, action: A) -> Self {
        Self {
            chord,
            action,
            description: String::new(),
            enabled: true,
            scope: CommandScope::Focused,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the enabled flag.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Allow the command to fire while a text input has focus.
    #[must_use]
    pub fn global(mut self) -> Self {
        self.scope = CommandScope::Global;
        self
    }

    /// Whether this command is suppressed while a text input has focus.
    #[must_use]
    pub fn is_focus_guarded(&self) -> bool {
        self.scope == CommandScope::Focused && self.chord.is_bare()
    }

    /// Whether this command fires for `event` under `ctx`.
    #[must_use]
    pub fn accepts(&self, event: &KeyEvent, ctx: KeyContext) -> bool {
        self.enabled
            && self.chord.matches(event)
            && !(ctx.text_input_focused && self.is_focus_guarded())
    }
}

// ---------------------------------------------------------------------------
// Key Context
// ---------------------------------------------------------------------------

/// Runtime state flags that affect command resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyContext {
    /// True if keyboard focus is inside a text-entry element.
    pub text_input_focused: bool,
}

impl KeyContext {
    /// Create a context with all flags false.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text_input_focused: false,
        }
    }

    /// Set the text_input_focused flag.
    #[must_use]
    pub const fn with_text_input(mut self, focused: bool) -> Self {
        self.text_input_focused = focused;
        self
    }
}

// ---------------------------------------------------------------------------
// Disposition
// ---------------------------------------------------------------------------

/// What the host should do with the original key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyDisposition {
    /// A command fired; suppress the platform default for this key.
    Consumed,
    /// Nothing fired; let the event through untouched.
    PassThrough,
}

impl KeyDisposition {
    /// Check if the event was consumed.
    #[must_use]
    pub const fn consumes_event(&self) -> bool {
        matches!(self, Self::Consumed)
    }
}

// ---------------------------------------------------------------------------
// Command Set
// ---------------------------------------------------------------------------

/// Ordered command list with first-match resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSet<A> {
    commands: Vec<Command<A>>,
}

impl<A> Default for CommandSet<A> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

impl<A> FromIterator<Command<A>> for CommandSet<A> {
    fn from_iter<I: IntoIterator<Item = Command<A>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<A> CommandSet<A> {
    /// Create a set from commands in declaration order.
    #[must_use]
    pub fn new(commands: Vec<Command<A>>) -> Self {
        Self { commands }
    }

    /// Append a command (lowest priority).
    pub fn push(&mut self, command: Command<A>) {
        self.commands.push(command);
    }

    /// Number of declared commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if no commands are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterate commands in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Command<A>> {
        self.commands.iter()
    }

    /// Get a command by declaration index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Command<A>> {
        self.commands.get(index)
    }

    /// Resolve a key event to at most one command.
    ///
    /// Only key presses qualify; repeats and releases pass through.
    #[must_use]
    pub fn resolve(&self, event: &KeyEvent, ctx: KeyContext) -> Option<&Command<A>> {
        self.resolve_index(event, ctx).map(|i| &self.commands[i])
    }

    /// Like [`resolve`](Self::resolve) but returns the declaration index.
    #[must_use]
    pub fn resolve_index(&self, event: &KeyEvent, ctx: KeyContext) -> Option<usize> {
        if !event.is_press() {
            return None;
        }
        self.commands.iter().position(|c| c.accepts(event, ctx))
    }

    /// Enable or disable the command at `index`. Returns false if out of range.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.commands.get_mut(index) {
            Some(command) => {
                command.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Enable or disable every command whose action satisfies `pred`.
    ///
    /// Returns how many commands were touched.
    pub fn set_enabled_where(&mut self, enabled: bool, pred: impl Fn(&A) -> bool) -> usize {
        let mut touched = 0;
        for command in self.commands.iter_mut().filter(|c| pred(&c.action)) {
            command.enabled = enabled;
            touched += 1;
        }
        touched
    }

    /// Pairs of declaration indices `(winner, shadowed)` where two enabled
    /// commands claim the same chord (letters compared without case). The
    /// later one can never fire.
    #[must_use]
    pub fn conflicts(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (i, a) in self.commands.iter().enumerate().filter(|(_, c)| c.enabled) {
            for (j, b) in self.commands.iter().enumerate().skip(i + 1) {
                if b.enabled && a.chord.same_trigger(&b.chord) {
                    out.push((i, j));
                }
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
