use chrono::DateTime;
use pretty_assertions::assert_eq;
use serde_json::json;
use ytchat_core::{
    AuthorBadge, ChatAuthor, ChatItem, ChatItemKind, EmojiItem, ImageItem, MessageItem,
    SuperchatDetails,
};

fn author() -> ChatAuthor {
    ChatAuthor {
        name: "Alice".to_string(),
        thumbnail: Some(ImageItem {
            url: "https://yt3.example/alice.jpg".to_string(),
            alt: "Alice".to_string(),
        }),
        channel_id: "UCalice".to_string(),
        badge: None,
    }
}

#[test]
fn superchat_serializes_with_type_tag_and_camel_case_fields() {
    let item = ChatItem {
        id: "sc1".to_string(),
        author: author(),
        is_membership: false,
        is_owner: false,
        is_verified: true,
        is_moderator: false,
        timestamp: DateTime::from_timestamp_millis(1_000).unwrap(),
        kind: ChatItemKind::Superchat {
            message: vec![
                MessageItem::text("thanks "),
                MessageItem::Emoji(EmojiItem {
                    url: "https://yt3.example/e.png".to_string(),
                    alt: ":wave:".to_string(),
                    is_custom_emoji: true,
                    emoji_text: ":wave:".to_string(),
                }),
            ],
            superchat: SuperchatDetails {
                amount: "$5.00".to_string(),
                color: "#FF0000".to_string(),
            },
        },
    };

    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(
        value,
        json!({
            "id": "sc1",
            "type": "superchat",
            "author": {
                "name": "Alice",
                "thumbnail": { "url": "https://yt3.example/alice.jpg", "alt": "Alice" },
                "channelId": "UCalice"
            },
            "isMembership": false,
            "isOwner": false,
            "isVerified": true,
            "isModerator": false,
            "timestamp": "1970-01-01T00:00:01Z",
            "message": [
                { "text": "thanks " },
                {
                    "url": "https://yt3.example/e.png",
                    "alt": ":wave:",
                    "isCustomEmoji": true,
                    "emojiText": ":wave:"
                }
            ],
            "superchat": { "amount": "$5.00", "color": "#FF0000" }
        })
    );
}

#[test]
fn membership_variants_use_kebab_case_tags() {
    let mut item = ChatItem {
        id: "m1".to_string(),
        author: ChatAuthor {
            badge: Some(AuthorBadge {
                thumbnail: ImageItem::default(),
                label: "Member (1 year)".to_string(),
            }),
            ..author()
        },
        is_membership: true,
        is_owner: false,
        is_verified: false,
        is_moderator: false,
        timestamp: DateTime::from_timestamp_millis(0).unwrap(),
        kind: ChatItemKind::MembershipMilestone {
            message: Vec::new(),
            milestone_message: vec![MessageItem::text("Member for 12 months")],
        },
    };
    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(value["type"], "membership-milestone");
    assert_eq!(value["milestoneMessage"][0]["text"], "Member for 12 months");
    assert_eq!(value["author"]["badge"]["label"], "Member (1 year)");

    item.kind = ChatItemKind::MembershipGift {
        gift_message: vec![MessageItem::text("gifted 5")],
    };
    assert_eq!(item.type_name(), "membership-gift");
    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(value["giftMessage"][0]["text"], "gifted 5");
}
