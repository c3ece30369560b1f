use serde_json::Value;
use ytchat_core::{ChatBatch, ChatError};

use crate::normalize::normalize_action;

/// Translates one raw batch response into ordered chat items plus the next continuation.
///
/// A response without `continuationContents.liveChatContinuation` means the chat
/// has ended. Malformed actions are collected next to the items so one bad
/// action never drops the rest of the batch.
pub fn translate_batch(response: &Value) -> Result<ChatBatch, ChatError> {
    let continuation = match response.pointer("/continuationContents/liveChatContinuation") {
        None | Some(Value::Null) => return Err(ChatError::ChatEnded),
        Some(continuation) if continuation.is_object() => continuation,
        Some(other) => {
            return Err(ChatError::InvalidResponse(format!(
                "liveChatContinuation is not an object: {other}"
            )))
        }
    };

    let mut batch = ChatBatch {
        continuation: next_continuation(continuation),
        ..ChatBatch::default()
    };

    let actions = continuation
        .get("actions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for action in actions {
        match normalize_action(action) {
            Ok(Some(item)) => batch.items.push(item),
            Ok(None) => {}
            Err(err) => batch.malformed.push(err),
        }
    }

    Ok(batch)
}

/// Invalidation token first, then timed token; empty when neither is present.
fn next_continuation(continuation: &Value) -> String {
    let Some(first) = continuation.pointer("/continuations/0") else {
        return String::new();
    };
    ["invalidationContinuationData", "timedContinuationData"]
        .iter()
        .find_map(|key| first.get(*key)?.get("continuation")?.as_str())
        .unwrap_or_default()
        .to_string()
}
