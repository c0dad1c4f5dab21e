#![forbid(unsafe_code)]

//! AI assistant conversation mockups (ChatGPT, Claude, Gemini, ...).
//!
//! Same shape as the chat editor: a [`Document`] of content ([`AiData`]) and
//! chrome ([`AiAppearance`]). The one coupled rule lives in
//! [`AiData::with_platform`]: a model name only makes sense for its own
//! platform, so switching platforms also resets the model unless the new
//! platform offers the same one. Both changes land in a single undo step.

use serde::{Deserialize, Serialize};
use web_time::Instant;

use mockup_runtime::StorageBackend;

use crate::document::{DeviceFrame, Document, EditorDomain};
use crate::editor::{Editor, EditorConfig};

/// Assistant products an AI mockup can imitate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiPlatform {
    #[default]
    ChatGpt,
    Claude,
    Gemini,
    Perplexity,
    Copilot,
    Grok,
}

impl AiPlatform {
    /// Every platform, in switcher order.
    pub const ALL: [AiPlatform; 6] = [
        Self::ChatGpt,
        Self::Claude,
        Self::Gemini,
        Self::Perplexity,
        Self::Copilot,
        Self::Grok,
    ];

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ChatGpt => "ChatGPT",
            Self::Claude => "Claude",
            Self::Gemini => "Gemini",
            Self::Perplexity => "Perplexity",
            Self::Copilot => "Copilot",
            Self::Grok => "Grok",
        }
    }

    /// Accent color as `#rrggbb`.
    #[must_use]
    pub const fn accent_color(self) -> &'static str {
        match self {
            Self::ChatGpt => "#10a37f",
            Self::Claude => "#d97757",
            Self::Gemini => "#4285f4",
            Self::Perplexity => "#20808d",
            Self::Copilot => "#0078d4",
            Self::Grok => "#000000",
        }
    }

    /// Model names offered in the platform's picker. Never empty; the first
    /// entry is the default.
    #[must_use]
    pub const fn models(self) -> &'static [&'static str] {
        match self {
            Self::ChatGpt => &["GPT-4o", "GPT-4o mini", "o1", "o3-mini"],
            Self::Claude => &["Claude 3.5 Sonnet", "Claude 3.5 Haiku", "Claude 3 Opus"],
            Self::Gemini => &["Gemini 2.0 Flash", "Gemini 1.5 Pro", "Gemini 1.5 Flash"],
            Self::Perplexity => &["Sonar", "Sonar Pro"],
            Self::Copilot => &["Balanced", "Creative", "Precise"],
            Self::Grok => &["Grok 2", "Grok 2 mini"],
        }
    }

    #[must_use]
    pub const fn default_model(self) -> &'static str {
        self.models()[0]
    }

    #[must_use]
    pub fn offers_model(self, model: &str) -> bool {
        self.models().iter().any(|m| *m == model)
    }
}

/// Who wrote a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiTurn {
    pub role: Role,
    pub content: String,
}

impl AiTurn {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiData {
    pub platform: AiPlatform,
    pub model: String,
    /// Conversation title shown in the header or sidebar.
    pub title: String,
    pub turns: Vec<AiTurn>,
}

impl AiData {
    /// Copy with `platform` switched, keeping the model only if the new
    /// platform offers it.
    #[must_use]
    pub fn with_platform(&self, platform: AiPlatform) -> Self {
        let model = if platform.offers_model(&self.model) {
            self.model.clone()
        } else {
            platform.default_model().to_owned()
        };
        Self {
            platform,
            model,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAppearance {
    pub dark_mode: bool,
    pub device: DeviceFrame,
    pub show_sidebar: bool,
    /// Text size multiplier, 1.0 is the platform default.
    pub font_scale: f32,
}

impl Default for AiAppearance {
    fn default() -> Self {
        Self {
            dark_mode: false,
            device: DeviceFrame::Desktop,
            show_sidebar: true,
            font_scale: 1.0,
        }
    }
}

pub type AiDocument = Document<AiData, AiAppearance>;

/// Editor for AI assistant mockups.
pub type AiEditor<S> = Editor<AiData, AiAppearance, S>;

impl EditorDomain for AiDocument {
    fn toggle_dark_mode(&mut self) -> bool {
        self.appearance.dark_mode = !self.appearance.dark_mode;
        true
    }

    fn switch_platform(&mut self, index: usize) -> bool {
        let Some(platform) = AiPlatform::from_index(index) else {
            return false;
        };
        self.data = self.data.with_platform(platform);
        true
    }
}

/// The conversation a fresh AI editor starts with.
#[must_use]
pub fn default_document() -> AiDocument {
    let platform = AiPlatform::default();
    Document::new(
        AiData {
            platform,
            model: platform.default_model().to_owned(),
            title: "Trip ideas".into(),
            turns: vec![
                AiTurn::new(Role::User, "Plan a 3-day weekend in Lisbon."),
                AiTurn::new(
                    Role::Assistant,
                    "Day 1: Alfama and the castle. Day 2: Belém. Day 3: a day trip to Sintra.",
                ),
            ],
        },
        AiAppearance::default(),
    )
}

/// Configuration for the AI screen: name `"ai"`, draft key `"ai-draft"`.
#[must_use]
pub fn default_config() -> EditorConfig<AiData, AiAppearance> {
    EditorConfig::new("ai", default_document())
}

impl<S: StorageBackend> Editor<AiData, AiAppearance, S> {
    pub fn add_turn(&mut self, now: Instant, role: Role, content: impl Into<String>) -> bool {
        let turn = AiTurn::new(role, content);
        self.set_data(now, |data| {
            let mut next = data.clone();
            next.turns.push(turn);
            next
        })
    }

    /// Switch platform, resetting the model if needed, as one undo step.
    pub fn set_platform(&mut self, now: Instant, platform: AiPlatform) -> bool {
        self.set_data(now, |data| data.with_platform(platform))
    }

    /// Set the model label. Any name is accepted so mockups can show
    /// unreleased or custom models.
    pub fn set_model(&mut self, now: Instant, model: impl Into<String>) -> bool {
        let model = model.into();
        self.set_data(now, |data| AiData {
            model,
            ..data.clone()
        })
    }

    pub fn set_title(&mut self, now: Instant, title: impl Into<String>) -> bool {
        let title = title.into();
        self.set_data(now, |data| AiData {
            title,
            ..data.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockup_core::Dispatcher;
    use mockup_runtime::MemoryStorage;

    use crate::action::{EditorAction, KeyOutcome};

    fn editor(dispatcher: &Dispatcher<EditorAction>) -> AiEditor<MemoryStorage> {
        Editor::open(default_config(), MemoryStorage::new(), dispatcher, Instant::now())
    }

    #[test]
    fn every_platform_has_models() {
        for platform in AiPlatform::ALL {
            assert!(!platform.models().is_empty(), "{}", platform.name());
            assert!(platform.offers_model(platform.default_model()));
        }
    }

    #[test]
    fn switching_platform_resets_model_in_one_step() {
        let dispatcher = Dispatcher::new();
        let mut ai = editor(&dispatcher);
        let now = Instant::now();
        assert_eq!(ai.data().model, "GPT-4o");

        assert!(ai.set_platform(now, AiPlatform::Claude));
        assert_eq!(ai.data().platform, AiPlatform::Claude);
        assert_eq!(ai.data().model, "Claude 3.5 Sonnet");
        assert_eq!(ai.history().len(), 2);

        ai.undo(now);
        assert_eq!(ai.data().platform, AiPlatform::ChatGpt);
        assert_eq!(ai.data().model, "GPT-4o");
    }

    #[test]
    fn shared_model_survives_switch() {
        let data = AiData {
            platform: AiPlatform::Copilot,
            model: "Balanced".into(),
            title: String::new(),
            turns: Vec::new(),
        };
        let switched = data.with_platform(AiPlatform::Copilot);
        assert_eq!(switched.model, "Balanced");
        let switched = data.with_platform(AiPlatform::Grok);
        assert_eq!(switched.model, "Grok 2");
    }

    #[test]
    fn turn_and_title_setters() {
        let dispatcher = Dispatcher::new();
        let mut ai = editor(&dispatcher);
        let now = Instant::now();
        assert!(ai.add_turn(now, Role::User, "And food?"));
        assert!(ai.set_title(now, "Lisbon"));
        assert!(!ai.set_title(now, "Lisbon"));
        assert!(ai.set_model(now, "GPT-5 preview"));
        assert_eq!(ai.data().turns.len(), 3);
        assert_eq!(ai.data().title, "Lisbon");
        assert_eq!(ai.data().model, "GPT-5 preview");
    }

    #[test]
    fn platform_key_switch() {
        let dispatcher = Dispatcher::new();
        let mut ai = editor(&dispatcher);
        let now = Instant::now();
        assert_eq!(
            ai.apply(EditorAction::SwitchPlatform(2), now),
            KeyOutcome::Applied(EditorAction::SwitchPlatform(2))
        );
        assert_eq!(ai.data().platform, AiPlatform::Gemini);
        assert_eq!(ai.data().model, "Gemini 2.0 Flash");
        assert_eq!(
            ai.apply(EditorAction::SwitchPlatform(6), now),
            KeyOutcome::Forward(EditorAction::SwitchPlatform(6))
        );
    }

    #[test]
    fn platform_serde_names() {
        assert_eq!(serde_json::to_string(&AiPlatform::ChatGpt).unwrap(), "\"chatgpt\"");
    }
}
