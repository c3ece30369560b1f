//! Subset of the upstream live-chat renderer schema that the normalizer reads.
//!
//! Only fields needed to build a [`ytchat_core::ChatItem`] are declared; every
//! other upstream field is ignored during deserialization.

use serde::Deserialize;
use ytchat_core::Thumbnail;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RendererBase {
    pub id: String,
    pub timestamp_usec: String,
    #[serde(default)]
    pub author_name: Option<SimpleText>,
    #[serde(default)]
    pub author_photo: Option<Thumbnails>,
    #[serde(default)]
    pub author_badges: Vec<AuthorBadgeEntry>,
    #[serde(default)]
    pub author_external_channel_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SimpleText {
    pub simple_text: String,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct Thumbnails {
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

/// Text that upstream sends either as `runs` or as a single `simpleText`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FormattedText {
    #[serde(default)]
    pub runs: Option<Vec<MessageRun>>,
    #[serde(default)]
    pub simple_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MessageRun {
    Text { text: String },
    Emoji { emoji: Emoji },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Emoji {
    #[serde(default)]
    pub emoji_id: String,
    #[serde(default)]
    pub shortcuts: Vec<String>,
    #[serde(default)]
    pub image: Thumbnails,
    #[serde(default)]
    pub is_custom_emoji: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthorBadgeEntry {
    pub live_chat_author_badge_renderer: BadgeRenderer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BadgeRenderer {
    #[serde(default)]
    pub custom_thumbnail: Option<Thumbnails>,
    #[serde(default)]
    pub icon: Option<BadgeIcon>,
    #[serde(default)]
    pub tooltip: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BadgeIcon {
    pub icon_type: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextMessageRenderer {
    #[serde(flatten)]
    pub base: RendererBase,
    pub message: FormattedText,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaidMessageRenderer {
    #[serde(flatten)]
    pub base: RendererBase,
    #[serde(default)]
    pub message: Option<FormattedText>,
    pub purchase_amount_text: SimpleText,
    pub body_background_color: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaidStickerRenderer {
    #[serde(flatten)]
    pub base: RendererBase,
    pub purchase_amount_text: SimpleText,
    pub sticker: Sticker,
    pub background_color: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Sticker {
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
    pub accessibility: Accessibility,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Accessibility {
    pub accessibility_data: AccessibilityData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessibilityData {
    pub label: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MembershipItemRenderer {
    #[serde(flatten)]
    pub base: RendererBase,
    #[serde(default)]
    pub header_primary_text: Option<FormattedText>,
    #[serde(default)]
    pub header_subtext: Option<FormattedText>,
    #[serde(default)]
    pub message: Option<FormattedText>,
}

/// Gift purchase after the sponsorship header has been merged into it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GiftPurchaseRenderer {
    #[serde(flatten)]
    pub base: RendererBase,
    pub primary_text: FormattedText,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GiftRedemptionRenderer {
    #[serde(flatten)]
    pub base: RendererBase,
    pub message: FormattedText,
}
