use chrono::{DateTime, Utc};
use serde::Serialize;

/// One normalized chat event. The base fields are shared by every variant;
/// the variant-specific fields live in [`ChatItemKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatItem {
    pub id: String,
    pub author: ChatAuthor,
    pub is_membership: bool,
    pub is_owner: bool,
    pub is_verified: bool,
    pub is_moderator: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: ChatItemKind,
}

impl ChatItem {
    /// Wire tag of the variant (`"message"`, `"superchat"`, ...).
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ImageItem>,
    pub channel_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<AuthorBadge>,
}

/// Membership badge shown next to the author name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorBadge {
    pub thumbnail: ImageItem,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ChatItemKind {
    Message {
        message: Vec<MessageItem>,
    },
    Superchat {
        message: Vec<MessageItem>,
        superchat: SuperchatDetails,
    },
    Supersticker {
        superchat: SuperstickerDetails,
    },
    MembershipJoin {
        join_message: Vec<MessageItem>,
    },
    MembershipMilestone {
        message: Vec<MessageItem>,
        milestone_message: Vec<MessageItem>,
    },
    MembershipGift {
        gift_message: Vec<MessageItem>,
    },
    MembershipRedeem {
        redeem_message: Vec<MessageItem>,
    },
}

impl ChatItemKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ChatItemKind::Message { .. } => "message",
            ChatItemKind::Superchat { .. } => "superchat",
            ChatItemKind::Supersticker { .. } => "supersticker",
            ChatItemKind::MembershipJoin { .. } => "membership-join",
            ChatItemKind::MembershipMilestone { .. } => "membership-milestone",
            ChatItemKind::MembershipGift { .. } => "membership-gift",
            ChatItemKind::MembershipRedeem { .. } => "membership-redeem",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuperchatDetails {
    pub amount: String,
    /// `#RRGGBB`
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuperstickerDetails {
    pub amount: String,
    pub color: String,
    pub sticker: ImageItem,
}

/// A run of chat text: either literal text or an emoji image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MessageItem {
    Text { text: String },
    Emoji(EmojiItem),
}

impl MessageItem {
    pub fn text(text: impl Into<String>) -> Self {
        MessageItem::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ImageItem {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmojiItem {
    pub url: String,
    pub alt: String,
    pub is_custom_emoji: bool,
    pub emoji_text: String,
}

impl std::fmt::Display for MessageItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageItem::Text { text } => f.write_str(text),
            MessageItem::Emoji(emoji) => f.write_str(&emoji.emoji_text),
        }
    }
}
