use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use ytchat_core::{
    AuthorBadge, ChatAuthor, ChatError, ChatItem, ChatItemKind, EmojiItem, ImageItem,
    MessageItem, SuperchatDetails, SuperstickerDetails, Thumbnail,
};

use crate::wire::{
    FormattedText, GiftPurchaseRenderer, GiftRedemptionRenderer, MembershipItemRenderer,
    MessageRun, PaidMessageRenderer, PaidStickerRenderer, RendererBase, TextMessageRenderer,
};

/// The closed set of renderer shapes that become chat items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    TextMessage,
    PaidMessage,
    PaidSticker,
    MembershipItem,
    GiftPurchase,
    GiftRedemption,
}

impl RendererKind {
    const KEYS: [(RendererKind, &'static str); 6] = [
        (RendererKind::TextMessage, "liveChatTextMessageRenderer"),
        (RendererKind::PaidMessage, "liveChatPaidMessageRenderer"),
        (RendererKind::PaidSticker, "liveChatPaidStickerRenderer"),
        (RendererKind::MembershipItem, "liveChatMembershipItemRenderer"),
        (
            RendererKind::GiftPurchase,
            "liveChatSponsorshipsGiftPurchaseAnnouncementRenderer",
        ),
        (
            RendererKind::GiftRedemption,
            "liveChatSponsorshipsGiftRedemptionAnnouncementRenderer",
        ),
    ];

    /// Finds the first recognized renderer in an `addChatItemAction.item`.
    pub fn detect(item: &Value) -> Option<(RendererKind, &Value)> {
        Self::KEYS
            .iter()
            .find_map(|(kind, key)| item.get(*key).map(|renderer| (*kind, renderer)))
    }
}

/// Normalizes one chat action.
///
/// Returns `Ok(None)` for actions that carry no chat item (tickers, engagement
/// messages, deletions, ...). A recognized renderer that cannot be mapped is
/// reported as [`ChatError::MalformedAction`] carrying the serialized item.
pub fn normalize_action(action: &Value) -> Result<Option<ChatItem>, ChatError> {
    let Some(item) = action.pointer("/addChatItemAction/item") else {
        return Ok(None);
    };
    let Some((kind, renderer)) = RendererKind::detect(item) else {
        return Ok(None);
    };

    normalize_renderer(kind, renderer)
        .map(Some)
        .map_err(|reason| ChatError::MalformedAction {
            payload: item.to_string(),
            reason,
        })
}

fn normalize_renderer(kind: RendererKind, renderer: &Value) -> Result<ChatItem, String> {
    match kind {
        RendererKind::TextMessage => {
            let r: TextMessageRenderer = parse(renderer)?;
            let message = parse_text(r.message);
            build_item(r.base, ChatItemKind::Message { message })
        }
        RendererKind::PaidMessage => {
            let r: PaidMessageRenderer = parse(renderer)?;
            let kind = ChatItemKind::Superchat {
                message: r.message.map(parse_text).unwrap_or_default(),
                superchat: SuperchatDetails {
                    amount: r.purchase_amount_text.simple_text,
                    color: color_to_hex6(r.body_background_color),
                },
            };
            build_item(r.base, kind)
        }
        RendererKind::PaidSticker => {
            let r: PaidStickerRenderer = parse(renderer)?;
            let kind = ChatItemKind::Supersticker {
                superchat: SuperstickerDetails {
                    amount: r.purchase_amount_text.simple_text,
                    color: color_to_hex6(r.background_color),
                    sticker: image_from_thumbnails(
                        &r.sticker.thumbnails,
                        &r.sticker.accessibility.accessibility_data.label,
                    ),
                },
            };
            build_item(r.base, kind)
        }
        RendererKind::MembershipItem => {
            let r: MembershipItemRenderer = parse(renderer)?;
            let kind = match r.header_primary_text {
                Some(primary) => ChatItemKind::MembershipMilestone {
                    message: r.message.map(parse_text).unwrap_or_default(),
                    milestone_message: parse_text(primary),
                },
                None => {
                    let subtext = r
                        .header_subtext
                        .ok_or_else(|| "missing field `headerSubtext`".to_string())?;
                    ChatItemKind::MembershipJoin {
                        join_message: parse_text(subtext),
                    }
                }
            };
            build_item(r.base, kind)
        }
        RendererKind::GiftPurchase => {
            let r: GiftPurchaseRenderer = parse(&merge_sponsorship_header(renderer))?;
            let gift_message = parse_text(r.primary_text);
            build_item(r.base, ChatItemKind::MembershipGift { gift_message })
        }
        RendererKind::GiftRedemption => {
            let r: GiftRedemptionRenderer = parse(renderer)?;
            let redeem_message = parse_text(r.message);
            build_item(r.base, ChatItemKind::MembershipRedeem { redeem_message })
        }
    }
}

fn parse<T: DeserializeOwned>(renderer: &Value) -> Result<T, String> {
    serde_path_to_error::deserialize(renderer).map_err(|err| err.to_string())
}

/// Gift purchases keep the author in a nested header renderer; the outer
/// renderer's own fields win on conflict.
fn merge_sponsorship_header(renderer: &Value) -> Value {
    let mut merged = renderer
        .pointer("/header/liveChatSponsorshipsHeaderRenderer")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    if let Some(outer) = renderer.as_object() {
        merged.extend(outer.iter().map(|(key, value)| (key.clone(), value.clone())));
    }
    Value::Object(merged)
}

/// Shared base-field construction for every variant.
fn build_item(base: RendererBase, kind: ChatItemKind) -> Result<ChatItem, String> {
    let name = base
        .author_name
        .map(|name| name.simple_text)
        .unwrap_or_default();
    let thumbnail = base
        .author_photo
        .map(|photo| image_from_thumbnails(&photo.thumbnails, &name));

    let mut author = ChatAuthor {
        name,
        thumbnail,
        channel_id: base.author_external_channel_id,
        badge: None,
    };
    let mut is_membership = false;
    let mut is_owner = false;
    let mut is_verified = false;
    let mut is_moderator = false;

    for entry in base.author_badges {
        let badge = entry.live_chat_author_badge_renderer;
        if let Some(custom) = badge.custom_thumbnail {
            author.badge = Some(AuthorBadge {
                thumbnail: image_from_thumbnails(&custom.thumbnails, &badge.tooltip),
                label: badge.tooltip,
            });
            is_membership = true;
            continue;
        }
        match badge.icon.as_ref().map(|icon| icon.icon_type.as_str()) {
            Some("OWNER") => is_owner = true,
            Some("VERIFIED") => is_verified = true,
            Some("MODERATOR") => is_moderator = true,
            _ => {}
        }
    }

    Ok(ChatItem {
        id: base.id,
        author,
        is_membership,
        is_owner,
        is_verified,
        is_moderator,
        timestamp: timestamp_from_usec(&base.timestamp_usec)?,
        kind,
    })
}

fn timestamp_from_usec(usec: &str) -> Result<DateTime<Utc>, String> {
    let micros: i64 = usec
        .trim()
        .parse()
        .map_err(|_| format!("invalid timestampUsec `{usec}`"))?;
    DateTime::from_timestamp_millis(micros / 1000)
        .ok_or_else(|| format!("timestampUsec `{usec}` out of range"))
}

fn parse_text(text: FormattedText) -> Vec<MessageItem> {
    match (text.runs, text.simple_text) {
        (Some(runs), _) => runs.into_iter().map(parse_run).collect(),
        (None, Some(simple)) => vec![MessageItem::Text { text: simple }],
        (None, None) => Vec::new(),
    }
}

fn parse_run(run: MessageRun) -> MessageItem {
    match run {
        MessageRun::Text { text } => MessageItem::Text { text },
        MessageRun::Emoji { emoji } => {
            let url = emoji
                .image
                .thumbnails
                .first()
                .map(|thumbnail| thumbnail.url.clone())
                .unwrap_or_default();
            let shortcut = emoji.shortcuts.into_iter().next().unwrap_or_default();
            let emoji_text = if emoji.is_custom_emoji {
                shortcut.clone()
            } else {
                emoji.emoji_id
            };
            MessageItem::Emoji(EmojiItem {
                url,
                alt: shortcut,
                is_custom_emoji: emoji.is_custom_emoji,
                emoji_text,
            })
        }
    }
}

/// Picks the last (highest resolution) thumbnail; empty lists degrade to an empty image.
fn image_from_thumbnails(thumbnails: &[Thumbnail], alt: &str) -> ImageItem {
    match thumbnails.last() {
        Some(thumbnail) => ImageItem {
            url: thumbnail.url.clone(),
            alt: alt.to_string(),
        },
        None => ImageItem::default(),
    }
}

/// ARGB color integer to `#RRGGBB`, alpha dropped.
fn color_to_hex6(color: i64) -> String {
    format!("#{:06X}", color & 0x00FF_FFFF)
}
