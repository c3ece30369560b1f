use chrono::Local;
use serde_json::json;
use ytchat_core::{ChatEvent, ChatItem, ChatItemKind, MessageItem};

use crate::config::OutputFormat;

pub(crate) fn render(event: &ChatEvent, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(event)),
        OutputFormat::Json => render_json(event),
    }
}

fn render_text(event: &ChatEvent) -> String {
    match event {
        ChatEvent::Start { live_id, details } => match details {
            Some(details) => format!("[start] {live_id} \"{}\" by {}", details.title, details.author),
            None => format!("[start] {live_id}"),
        },
        ChatEvent::Chat(item) => render_item(item),
        ChatEvent::End { reason } => format!("[end] {}", reason.as_deref().unwrap_or("stopped")),
        ChatEvent::Error(err) => format!("[error] {err}"),
    }
}

fn render_item(item: &ChatItem) -> String {
    let time = item.timestamp.with_timezone(&Local).format("%H:%M:%S");
    let mut roles = String::new();
    if item.is_owner {
        roles.push('★');
    }
    if item.is_moderator {
        roles.push('🔧');
    }
    if item.is_verified {
        roles.push('✓');
    }
    let name = &item.author.name;

    let body = match &item.kind {
        ChatItemKind::Message { message } => join(message),
        ChatItemKind::Superchat { message, superchat } => {
            format!("[{} {}] {}", superchat.amount, superchat.color, join(message))
        }
        ChatItemKind::Supersticker { superchat } => format!(
            "[{} {}] sticker: {}",
            superchat.amount, superchat.color, superchat.sticker.alt
        ),
        ChatItemKind::MembershipJoin { join_message } => format!("joined: {}", join(join_message)),
        ChatItemKind::MembershipMilestone {
            message,
            milestone_message,
        } => format!("{} {}", join(milestone_message), join(message)),
        ChatItemKind::MembershipGift { gift_message } => join(gift_message),
        ChatItemKind::MembershipRedeem { redeem_message } => join(redeem_message),
    };
    format!("{time} {roles}{name}: {}", body.trim_end())
}

fn join(runs: &[MessageItem]) -> String {
    runs.iter().map(ToString::to_string).collect()
}

fn render_json(event: &ChatEvent) -> anyhow::Result<String> {
    let value = match event {
        ChatEvent::Start { live_id, details } => {
            json!({ "event": "start", "liveId": live_id, "details": details })
        }
        ChatEvent::Chat(item) => json!({ "event": "chat", "item": item }),
        ChatEvent::End { reason } => json!({ "event": "end", "reason": reason }),
        ChatEvent::Error(err) => json!({ "event": "error", "message": err.to_string() }),
    };
    Ok(serde_json::to_string(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use ytchat_core::{ChatAuthor, ChatError, SuperchatDetails};

    fn superchat() -> ChatItem {
        ChatItem {
            id: "sc1".to_string(),
            author: ChatAuthor {
                name: "Alice".to_string(),
                thumbnail: None,
                channel_id: "UCalice".to_string(),
                badge: None,
            },
            is_membership: false,
            is_owner: true,
            is_verified: false,
            is_moderator: false,
            timestamp: DateTime::from_timestamp_millis(0).unwrap(),
            kind: ChatItemKind::Superchat {
                message: vec![MessageItem::text("thanks")],
                superchat: SuperchatDetails {
                    amount: "$5.00".to_string(),
                    color: "#FF0000".to_string(),
                },
            },
        }
    }

    #[test]
    fn text_lines_show_author_and_amount() {
        let line = render(&ChatEvent::Chat(superchat()), OutputFormat::Text).unwrap();
        assert!(line.ends_with("★Alice: [$5.00 #FF0000] thanks"), "{line}");

        let line = render(&ChatEvent::End { reason: None }, OutputFormat::Text).unwrap();
        assert_eq!(line, "[end] stopped");
    }

    #[test]
    fn json_lines_are_tagged_by_event() {
        let line = render(&ChatEvent::Chat(superchat()), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["event"], "chat");
        assert_eq!(value["item"]["type"], "superchat");
        assert_eq!(value["item"]["superchat"]["amount"], "$5.00");

        let line = render(&ChatEvent::Error(ChatError::LiveNotFound), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["message"], "Live Stream was not found");
    }
}
