#![forbid(unsafe_code)]

//! The combined snapshot an editor screen edits.

use serde::{Deserialize, Serialize};

/// Content plus presentation, stored and undone as one value.
///
/// `data` is what the mockup says (messages, contact, model name);
/// `appearance` is how it is framed (theme, device, status bar). Keeping both
/// in one snapshot means a single undo step can revert a change that touched
/// both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<D, A> {
    pub data: D,
    pub appearance: A,
}

impl<D, A> Document<D, A> {
    #[must_use]
    pub fn new(data: D, appearance: A) -> Self {
        Self { data, appearance }
    }
}

impl<D: Default, A: Default> Default for Document<D, A> {
    fn default() -> Self {
        Self::new(D::default(), A::default())
    }
}

/// Device chrome drawn around a mockup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceFrame {
    #[default]
    #[serde(rename = "iphone", alias = "i-phone")]
    IPhone,
    Android,
    Desktop,
    /// No chrome; the conversation only.
    Bare,
}

/// Document-level hooks for keyboard actions whose meaning depends on the
/// document shape.
///
/// Each method edits the document in place and returns `true` if it
/// understood the request. Returning `false` hands the action back to the
/// host. The editor records the result as one undo step.
pub trait EditorDomain {
    /// Flip light/dark presentation.
    fn toggle_dark_mode(&mut self) -> bool {
        false
    }

    /// Switch to the platform at `index` in the document's platform table.
    fn switch_platform(&mut self, index: usize) -> bool {
        let _ = index;
        false
    }
}
