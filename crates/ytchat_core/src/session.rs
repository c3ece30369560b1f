use serde::{Deserialize, Serialize};

use crate::ChatError;

/// Selects which live page is bootstrapped. Exactly one identifier is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum YoutubeId {
    ChannelId(String),
    LiveId(String),
    Handle(String),
}

impl YoutubeId {
    /// Rejects blank identifiers; the poller refuses to construct without one.
    pub fn validate(&self) -> Result<(), ChatError> {
        if self.value().trim().is_empty() {
            return Err(ChatError::InvalidIdentity);
        }
        Ok(())
    }

    pub fn value(&self) -> &str {
        match self {
            YoutubeId::ChannelId(id) | YoutubeId::LiveId(id) | YoutubeId::Handle(id) => id,
        }
    }

    /// Live id known before bootstrap, if the session was selected by one.
    pub fn live_id(&self) -> Option<&str> {
        match self {
            YoutubeId::LiveId(id) => Some(id),
            _ => None,
        }
    }
}

/// Opaque values replayed verbatim on every batch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchParams {
    pub api_key: String,
    pub client_version: String,
    pub continuation: String,
}

/// Result of bootstrapping a live page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSession {
    pub live_id: String,
    pub title: String,
    pub params: FetchParams,
    pub details: Option<VideoDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_live: Option<bool>,
    #[serde(default)]
    pub is_live_content: bool,
    #[serde(default)]
    pub view_count: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub thumbnail: ThumbnailList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ThumbnailList {
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}
