#![forbid(unsafe_code)]

//! Chat conversation mockups (iMessage, WhatsApp, Slack, ...).
//!
//! The document is a contact plus an ordered message list ([`ChatData`]) and
//! the phone chrome around it ([`ChatAppearance`]). Platforms are a closed
//! set with a static capability table; anything rendering-specific beyond
//! that table belongs to the host.

use serde::{Deserialize, Serialize};
use web_time::Instant;

use mockup_runtime::StorageBackend;

use crate::document::{DeviceFrame, Document, EditorDomain};
use crate::editor::{Editor, EditorConfig};

// ============================================================================
// Platforms
// ============================================================================

/// Messaging apps a chat mockup can imitate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatPlatform {
    #[default]
    IMessage,
    WhatsApp,
    Messenger,
    Instagram,
    Telegram,
    Discord,
    Slack,
    Snapchat,
}

/// Static facts about a chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformInfo {
    pub name: &'static str,
    /// Brand color as `#rrggbb`.
    pub brand_color: &'static str,
    pub read_receipts: bool,
    pub reactions: bool,
}

static PLATFORM_INFO: [PlatformInfo; 8] = [
    PlatformInfo {
        name: "iMessage",
        brand_color: "#0a84ff",
        read_receipts: true,
        reactions: true,
    },
    PlatformInfo {
        name: "WhatsApp",
        brand_color: "#25d366",
        read_receipts: true,
        reactions: true,
    },
    PlatformInfo {
        name: "Messenger",
        brand_color: "#0084ff",
        read_receipts: true,
        reactions: true,
    },
    PlatformInfo {
        name: "Instagram",
        brand_color: "#e1306c",
        read_receipts: true,
        reactions: true,
    },
    PlatformInfo {
        name: "Telegram",
        brand_color: "#229ed9",
        read_receipts: true,
        reactions: true,
    },
    PlatformInfo {
        name: "Discord",
        brand_color: "#5865f2",
        read_receipts: false,
        reactions: true,
    },
    PlatformInfo {
        name: "Slack",
        brand_color: "#4a154b",
        read_receipts: false,
        reactions: true,
    },
    PlatformInfo {
        name: "Snapchat",
        brand_color: "#fffc00",
        read_receipts: true,
        reactions: false,
    },
];

impl ChatPlatform {
    /// Every platform, in switcher order (Alt+1 is the first).
    pub const ALL: [ChatPlatform; 8] = [
        Self::IMessage,
        Self::WhatsApp,
        Self::Messenger,
        Self::Instagram,
        Self::Telegram,
        Self::Discord,
        Self::Slack,
        Self::Snapchat,
    ];

    /// Position in [`ALL`](Self::ALL).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn info(self) -> &'static PlatformInfo {
        &PLATFORM_INFO[self as usize]
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.info().name
    }
}

// ============================================================================
// Document
// ============================================================================

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    #[default]
    Me,
    Them,
}

/// Delivery indicator shown under outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    #[default]
    Delivered,
    Read,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique within one conversation.
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    /// Display time, free-form (`"9:41"`).
    pub time: String,
    #[serde(default)]
    pub status: MessageStatus,
}

impl ChatMessage {
    #[must_use]
    pub fn new(id: u64, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id,
            sender,
            text: text.into(),
            time: DEFAULT_TIME.to_owned(),
            status: MessageStatus::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub online: bool,
}

/// What the conversation says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatData {
    pub platform: ChatPlatform,
    pub contact: Contact,
    pub messages: Vec<ChatMessage>,
}

impl ChatData {
    /// Next unused message id.
    ///
    /// One past the largest id, or the smallest free id when the largest is
    /// already `u64::MAX` (possible after importing a hand-edited document).
    #[must_use]
    pub fn next_id(&self) -> u64 {
        let largest = self.messages.iter().map(|m| m.id).max().unwrap_or(0);
        largest
            .checked_add(1)
            .unwrap_or_else(|| self.smallest_free_id())
    }

    fn smallest_free_id(&self) -> u64 {
        let mut used: Vec<u64> = self.messages.iter().map(|m| m.id).collect();
        used.sort_unstable();
        used.dedup();
        let mut candidate = 1u64;
        for id in used {
            if id > candidate {
                break;
            }
            if id == candidate {
                candidate = candidate.saturating_add(1);
            }
        }
        candidate
    }

    #[must_use]
    pub fn message(&self, id: u64) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }
}

/// How the phone around the conversation looks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAppearance {
    pub dark_mode: bool,
    pub device: DeviceFrame,
    pub status_bar_time: String,
    /// 0..=100.
    pub battery_percent: u8,
    pub show_keyboard: bool,
    /// Host-defined wallpaper id; `None` uses the platform default.
    pub wallpaper: Option<String>,
}

const DEFAULT_TIME: &str = "9:41";

impl Default for ChatAppearance {
    fn default() -> Self {
        Self {
            dark_mode: false,
            device: DeviceFrame::IPhone,
            status_bar_time: DEFAULT_TIME.to_owned(),
            battery_percent: 100,
            show_keyboard: false,
            wallpaper: None,
        }
    }
}

/// A chat mockup snapshot.
pub type ChatDocument = Document<ChatData, ChatAppearance>;

/// Editor for chat mockups.
pub type ChatEditor<S> = Editor<ChatData, ChatAppearance, S>;

impl EditorDomain for ChatDocument {
    fn toggle_dark_mode(&mut self) -> bool {
        self.appearance.dark_mode = !self.appearance.dark_mode;
        true
    }

    fn switch_platform(&mut self, index: usize) -> bool {
        match ChatPlatform::from_index(index) {
            Some(platform) => {
                self.data.platform = platform;
                true
            }
            None => false,
        }
    }
}

/// The conversation a fresh chat editor starts with.
#[must_use]
pub fn default_document() -> ChatDocument {
    let mut greeting = ChatMessage::new(1, Sender::Them, "Hey! Are we still on for tonight?");
    greeting.time = "9:38".into();
    let mut reply = ChatMessage::new(2, Sender::Me, "Yes! See you at 8 🎉");
    reply.time = "9:40".into();
    reply.status = MessageStatus::Read;

    Document::new(
        ChatData {
            platform: ChatPlatform::default(),
            contact: Contact {
                name: "Alex".into(),
                online: true,
            },
            messages: vec![greeting, reply],
        },
        ChatAppearance::default(),
    )
}

/// Configuration for the chat screen: name `"chat"`, draft key
/// `"chat-draft"`, default conversation.
#[must_use]
pub fn default_config() -> EditorConfig<ChatData, ChatAppearance> {
    EditorConfig::new("chat", default_document())
}

// ============================================================================
// Domain setters
// ============================================================================

impl<S: StorageBackend> Editor<ChatData, ChatAppearance, S> {
    /// Append a message and return its id.
    pub fn add_message(&mut self, now: Instant, sender: Sender, text: impl Into<String>) -> u64 {
        let text = text.into();
        let mut id = 0;
        self.set_data(now, |data| {
            let mut next = data.clone();
            id = next.next_id();
            next.messages.push(ChatMessage::new(id, sender, text));
            next
        });
        id
    }

    /// Replace a message's text. Returns `false` if the id is unknown or
    /// the text is unchanged.
    pub fn edit_message(&mut self, now: Instant, id: u64, text: impl Into<String>) -> bool {
        let text = text.into();
        self.set_data(now, |data| {
            let mut next = data.clone();
            if let Some(message) = next.messages.iter_mut().find(|m| m.id == id) {
                message.text = text;
            }
            next
        })
    }

    /// Delete a message. Returns `false` if the id is unknown.
    pub fn remove_message(&mut self, now: Instant, id: u64) -> bool {
        self.set_data(now, |data| {
            let mut next = data.clone();
            next.messages.retain(|m| m.id != id);
            next
        })
    }

    pub fn set_platform(&mut self, now: Instant, platform: ChatPlatform) -> bool {
        self.set_data(now, |data| ChatData {
            platform,
            ..data.clone()
        })
    }

    pub fn set_contact_name(&mut self, now: Instant, name: impl Into<String>) -> bool {
        let name = name.into();
        self.set_data(now, |data| {
            let mut next = data.clone();
            next.contact.name = name;
            next
        })
    }

    pub fn set_dark_mode(&mut self, now: Instant, dark_mode: bool) -> bool {
        self.set_appearance(now, |appearance| ChatAppearance {
            dark_mode,
            ..appearance.clone()
        })
    }
}
