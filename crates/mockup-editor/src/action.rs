#![forbid(unsafe_code)]

//! Editor actions and the default keymap.
//!
//! Actions are plain values. The dispatcher hands one back per key press and
//! the editor (or the host) applies it exactly once.
//!
//! # Default bindings
//!
//! | Chord | Action |
//! |-------|--------|
//! | Ctrl+Z / Meta+Z | Undo |
//! | Ctrl+Shift+Z / Meta+Shift+Z / Ctrl+Y | Redo |
//! | Ctrl+S / Meta+S | Save draft now |
//! | Ctrl+E / Meta+E | Export |
//! | Ctrl+D / Meta+D | Toggle dark mode |
//! | Alt+1 .. Alt+9 | Switch to platform 1..9 |
//! | Escape | Close dialog (fires even while typing) |
//!
//! Every binding except Escape carries a command modifier, so all of them
//! work while a text field has focus; bare letters never trigger editor
//! commands.

use std::fmt;

use mockup_core::{Command, KeyChord, KeyCode, KeyDisposition};

/// Something a key press asks the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAction {
    Undo,
    Redo,
    /// Write the draft immediately.
    Save,
    /// Export the mockup. Rendering is the host's job.
    Export,
    /// Delete the stored draft.
    ClearDraft,
    /// Close whatever dialog is open. Host-only.
    CloseDialog,
    ToggleDarkMode,
    /// Index into the document's platform table.
    SwitchPlatform(usize),
}

impl EditorAction {
    /// Label for help overlays.
    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::Undo => "Undo".into(),
            Self::Redo => "Redo".into(),
            Self::Save => "Save draft".into(),
            Self::Export => "Export".into(),
            Self::ClearDraft => "Clear saved draft".into(),
            Self::CloseDialog => "Close dialog".into(),
            Self::ToggleDarkMode => "Toggle dark mode".into(),
            Self::SwitchPlatform(i) => format!("Switch to platform {}", i + 1),
        }
    }
}

impl fmt::Display for EditorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// What happened to a key press routed through an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The editor performed the action.
    Applied(EditorAction),
    /// The action matched but only the host can perform it.
    Forward(EditorAction),
    /// No command matched; the event belongs to whoever is focused.
    PassThrough,
}

impl KeyOutcome {
    /// Whether the host should stop default handling of the event.
    #[must_use]
    pub fn disposition(&self) -> KeyDisposition {
        match self {
            Self::Applied(_) | Self::Forward(_) => KeyDisposition::Consumed,
            Self::PassThrough => KeyDisposition::PassThrough,
        }
    }

    /// The matched action, if any.
    #[must_use]
    pub fn action(&self) -> Option<EditorAction> {
        match *self {
            Self::Applied(a) | Self::Forward(a) => Some(a),
            Self::PassThrough => None,
        }
    }
}

fn bind(chord: KeyChord, action: EditorAction) -> Command<EditorAction> {
    Command::new(chord, action).describe(action.description())
}

/// The standard editor bindings, in resolution order.
#[must_use]
pub fn default_keymap() -> Vec<Command<EditorAction>> {
    use EditorAction::*;

    let mut keymap = vec![
        bind(KeyChord::ctrl('z'), Undo),
        bind(KeyChord::meta('z'), Undo),
        bind(KeyChord::ctrl_shift('z'), Redo),
        bind(KeyChord::meta_shift('z'), Redo),
        bind(KeyChord::ctrl('y'), Redo),
        bind(KeyChord::ctrl('s'), Save),
        bind(KeyChord::meta('s'), Save),
        bind(KeyChord::ctrl('e'), Export),
        bind(KeyChord::meta('e'), Export),
        bind(KeyChord::ctrl('d'), ToggleDarkMode),
        bind(KeyChord::meta('d'), ToggleDarkMode),
    ];
    for (index, digit) in ('1'..='9').enumerate() {
        keymap.push(bind(KeyChord::alt(digit), SwitchPlatform(index)));
    }
    keymap.push(bind(KeyChord::key(KeyCode::Escape), CloseDialog).global());
    keymap
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockup_core::{CommandSet, KeyContext, KeyEvent, Modifiers};

    fn resolve(event: KeyEvent, ctx: KeyContext) -> Option<EditorAction> {
        let set: CommandSet<EditorAction> = default_keymap().into_iter().collect();
        set.resolve(&event, ctx).map(|c| c.action)
    }

    fn press(c: char, mods: Modifiers) -> KeyEvent {
        KeyEvent::char(c).with_modifiers(mods)
    }

    #[test]
    fn keymap_has_no_conflicts() {
        let set: CommandSet<EditorAction> = default_keymap().into_iter().collect();
        assert!(set.conflicts().is_empty());
        assert!(set.iter().all(|c| !c.description.is_empty()));
    }

    #[test]
    fn undo_redo_bindings() {
        let ctx = KeyContext::new();
        assert_eq!(resolve(press('z', Modifiers::CTRL), ctx), Some(EditorAction::Undo));
        assert_eq!(resolve(press('z', Modifiers::SUPER), ctx), Some(EditorAction::Undo));
        assert_eq!(
            resolve(press('Z', Modifiers::CTRL | Modifiers::SHIFT), ctx),
            Some(EditorAction::Redo)
        );
        assert_eq!(
            resolve(press('z', Modifiers::SUPER | Modifiers::SHIFT), ctx),
            Some(EditorAction::Redo)
        );
        assert_eq!(resolve(press('y', Modifiers::CTRL), ctx), Some(EditorAction::Redo));
    }

    #[test]
    fn extra_modifiers_do_not_match() {
        let ctx = KeyContext::new();
        assert_eq!(resolve(press('z', Modifiers::CTRL | Modifiers::ALT), ctx), None);
        assert_eq!(resolve(press('z', Modifiers::NONE), ctx), None);
        assert_eq!(resolve(press('s', Modifiers::CTRL | Modifiers::SUPER), ctx), None);
    }

    #[test]
    fn platform_digits() {
        let ctx = KeyContext::new();
        assert_eq!(
            resolve(press('1', Modifiers::ALT), ctx),
            Some(EditorAction::SwitchPlatform(0))
        );
        assert_eq!(
            resolve(press('9', Modifiers::ALT), ctx),
            Some(EditorAction::SwitchPlatform(8))
        );
        assert_eq!(resolve(press('0', Modifiers::ALT), ctx), None);
    }

    #[test]
    fn bindings_work_while_typing() {
        let typing = KeyContext::new().with_text_input(true);
        assert_eq!(resolve(press('z', Modifiers::CTRL), typing), Some(EditorAction::Undo));
        assert_eq!(
            resolve(KeyEvent::new(KeyCode::Escape), typing),
            Some(EditorAction::CloseDialog)
        );
    }

    #[test]
    fn outcome_disposition() {
        assert_eq!(
            KeyOutcome::Applied(EditorAction::Undo).disposition(),
            KeyDisposition::Consumed
        );
        assert_eq!(
            KeyOutcome::Forward(EditorAction::Export).disposition(),
            KeyDisposition::Consumed
        );
        assert_eq!(KeyOutcome::PassThrough.disposition(), KeyDisposition::PassThrough);
        assert_eq!(KeyOutcome::PassThrough.action(), None);
    }

    #[test]
    fn descriptions() {
        assert_eq!(EditorAction::SwitchPlatform(2).to_string(), "Switch to platform 3");
        assert_eq!(EditorAction::Save.description(), "Save draft");
    }
}
