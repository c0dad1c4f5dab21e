#![forbid(unsafe_code)]

//! Canonical key event types.
//!
//! Hosts translate whatever their platform delivers (a browser `keydown`, a
//! native window event, a scripted test) into these types before handing them
//! to the dispatcher. All types derive `Clone`, `PartialEq`, and `Eq` for use
//! in tests and pattern matching.
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press` when the platform cannot tell.
//! - `Modifiers` use bitflags so the dispatcher can compare whole sets.
//! - `KeyCode::from_name` accepts web-style key names (`"z"`, `"Escape"`,
//!   `"ArrowUp"`) so keymaps can be written as strings.

use std::fmt;

use bitflags::bitflags;

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with no modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Shorthand for a pressed character key.
    #[must_use]
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt modifier is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Check if Super/Meta/Cmd modifier is held.
    #[must_use]
    pub const fn super_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SUPER)
    }

    /// Whether this event should be considered for command dispatch.
    #[must_use]
    pub const fn is_press(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Delete key.
    Delete,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Function key (F1-F24).
    F(u8),
}

impl KeyCode {
    /// Parse a key name.
    ///
    /// Accepts single characters and the names used by browser key events
    /// (`"Escape"`, `"Enter"`, `"ArrowLeft"`, `"F5"`), plus a few common
    /// aliases (`"Esc"`, `"Return"`, `"Space"`, `"Up"`). Named keys are
    /// matched case-insensitively; single characters are kept as given.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        if let Some(c) = chars.next()
            && chars.next().is_none()
        {
            return Some(Self::Char(c));
        }

        let lower = name.to_ascii_lowercase();
        let code = match lower.as_str() {
            "enter" | "return" => Self::Enter,
            "escape" | "esc" => Self::Escape,
            "backspace" => Self::Backspace,
            "tab" => Self::Tab,
            "delete" | "del" => Self::Delete,
            "home" => Self::Home,
            "end" => Self::End,
            "pageup" => Self::PageUp,
            "pagedown" => Self::PageDown,
            "arrowup" | "up" => Self::Up,
            "arrowdown" | "down" => Self::Down,
            "arrowleft" | "left" => Self::Left,
            "arrowright" | "right" => Self::Right,
            "space" => Self::Char(' '),
            "plus" => Self::Char('+'),
            _ => {
                let n = lower.strip_prefix('f')?.parse::<u8>().ok()?;
                if (1..=24).contains(&n) {
                    Self::F(n)
                } else {
                    return None;
                }
            }
        };
        Some(code)
    }

    /// True for keys that produce text when typed.
    #[must_use]
    pub const fn is_printable(&self) -> bool {
        matches!(self, Self::Char(_))
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(' ') => f.write_str("Space"),
            Self::Char('+') => f.write_str("Plus"),
            Self::Char(c) => write!(f, "{}", c.to_uppercase()),
            Self::Enter => f.write_str("Enter"),
            Self::Escape => f.write_str("Escape"),
            Self::Backspace => f.write_str("Backspace"),
            Self::Tab => f.write_str("Tab"),
            Self::Delete => f.write_str("Delete"),
            Self::Home => f.write_str("Home"),
            Self::End => f.write_str("End"),
            Self::PageUp => f.write_str("PageUp"),
            Self::PageDown => f.write_str("PageDown"),
            Self::Up => f.write_str("ArrowUp"),
            Self::Down => f.write_str("ArrowDown"),
            Self::Left => f.write_str("ArrowLeft"),
            Self::Right => f.write_str("ArrowRight"),
            Self::F(n) => write!(f, "F{n}"),
        }
    }
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

impl Modifiers {
    /// True if any modifier other than Shift is held.
    ///
    /// Shift alone still produces text, so Shift+key behaves like a bare key
    /// for focus purposes.
    #[must_use]
    pub const fn has_command_modifier(&self) -> bool {
        self.intersects(Self::CTRL.union(Self::ALT).union(Self::SUPER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_is_copy() {
        let key = KeyEvent::new(KeyCode::Char('a'));
        let copy = key;
        assert_eq!(key, copy);
    }

    #[test]
    fn key_event_modifiers() {
        let event = KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL);
        assert!(event.ctrl());
        assert!(!event.alt());
        assert!(!event.shift());
        assert!(!event.super_key());
    }

    #[test]
    fn key_event_combined_modifiers() {
        let event =
            KeyEvent::new(KeyCode::Char('z')).with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        assert!(event.ctrl());
        assert!(event.shift());
        assert!(!event.alt());
    }

    #[test]
    fn key_event_is_char() {
        let event = KeyEvent::char('q');
        assert!(event.is_char('q'));
        assert!(!event.is_char('x'));
    }

    #[test]
    fn release_is_not_press() {
        let event = KeyEvent::char('q').with_kind(KeyEventKind::Release);
        assert!(!event.is_press());
        assert!(KeyEvent::char('q').is_press());
    }

    #[test]
    fn modifiers_default_is_none() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }

    #[test]
    fn shift_is_not_a_command_modifier() {
        assert!(!Modifiers::SHIFT.has_command_modifier());
        assert!(!Modifiers::NONE.has_command_modifier());
        assert!(Modifiers::CTRL.has_command_modifier());
        assert!((Modifiers::SHIFT | Modifiers::SUPER).has_command_modifier());
        assert!(Modifiers::ALT.has_command_modifier());
    }

    #[test]
    fn from_name_single_chars() {
        assert_eq!(KeyCode::from_name("z"), Some(KeyCode::Char('z')));
        assert_eq!(KeyCode::from_name("Z"), Some(KeyCode::Char('Z')));
        assert_eq!(KeyCode::from_name("1"), Some(KeyCode::Char('1')));
        assert_eq!(KeyCode::from_name(" "), Some(KeyCode::Char(' ')));
    }

    #[test]
    fn from_name_named_keys() {
        assert_eq!(KeyCode::from_name("Escape"), Some(KeyCode::Escape));
        assert_eq!(KeyCode::from_name("esc"), Some(KeyCode::Escape));
        assert_eq!(KeyCode::from_name("Enter"), Some(KeyCode::Enter));
        assert_eq!(KeyCode::from_name("ArrowUp"), Some(KeyCode::Up));
        assert_eq!(KeyCode::from_name("space"), Some(KeyCode::Char(' ')));
        assert_eq!(KeyCode::from_name("F5"), Some(KeyCode::F(5)));
        assert_eq!(KeyCode::from_name("f12"), Some(KeyCode::F(12)));
    }

    #[test]
    fn from_name_rejects_unknown() {
        assert_eq!(KeyCode::from_name(""), None);
        assert_eq!(KeyCode::from_name("Hyper"), None);
        assert_eq!(KeyCode::from_name("F0"), None);
        assert_eq!(KeyCode::from_name("F99"), None);
    }

    #[test]
    fn display_round_trips_through_from_name() {
        for code in [
            KeyCode::Char('s'),
            KeyCode::Escape,
            KeyCode::Enter,
            KeyCode::Up,
            KeyCode::F(3),
            KeyCode::Char(' '),
        ] {
            let name = code.to_string();
            let parsed = KeyCode::from_name(&name).unwrap();
            match (code, parsed) {
                (KeyCode::Char(a), KeyCode::Char(b)) => {
                    assert!(a.eq_ignore_ascii_case(&b), "{name}");
                }
                (a, b) => assert_eq!(a, b, "{name}"),
            }
        }
    }

    #[test]
    fn printable_only_for_chars() {
        assert!(KeyCode::Char('a').is_printable());
        assert!(!KeyCode::Enter.is_printable());
        assert!(!KeyCode::F(1).is_printable());
    }
}
