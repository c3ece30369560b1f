use std::time::Duration;

use chat_logging::chat_trace;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};
use url::Url;
use ytchat_core::{FailureKind, FetchError, FetchParams, YoutubeId};

use crate::decode::decode_page;

pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 16 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Fetches the HTML of the live page selected by a [`YoutubeId`].
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_live_page(&self, id: &YoutubeId) -> Result<String, FetchError>;
}

/// Fetches one raw live-chat batch for the current continuation.
#[async_trait::async_trait]
pub trait BatchFetcher: Send + Sync {
    async fn fetch_batch(&self, params: &FetchParams) -> Result<Value, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base_url,
            client,
        })
    }

    /// Reads the body while enforcing `max_bytes`, returning it with its content type.
    async fn read_body(
        &self,
        response: reqwest::Response,
    ) -> Result<(Vec<u8>, Option<String>), FetchError> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes, content_len));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok((bytes, content_type))
    }
}

#[async_trait::async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch_live_page(&self, id: &YoutubeId) -> Result<String, FetchError> {
        let url = live_page_url(&self.base_url, id)?;
        chat_trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let (bytes, content_type) = self.read_body(response).await?;
        Ok(decode_page(&bytes, content_type.as_deref())?)
    }
}

#[async_trait::async_trait]
impl BatchFetcher for ReqwestFetcher {
    async fn fetch_batch(&self, params: &FetchParams) -> Result<Value, FetchError> {
        let url = batch_url(&self.base_url, &params.api_key)?;
        chat_trace!("POST {} continuation={}", url.path(), params.continuation);
        let response = self
            .client
            .post(url)
            .json(&batch_request_body(params))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let (bytes, _) = self.read_body(response).await?;
        serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }
}

/// Page that embeds the chat bootstrap data for the given identity.
pub fn live_page_url(base: &Url, id: &YoutubeId) -> Result<Url, FetchError> {
    let joined = match id {
        YoutubeId::ChannelId(channel) => base.join(&format!("channel/{channel}/live")),
        YoutubeId::LiveId(live) => base.join("watch").map(|mut url| {
            url.query_pairs_mut().append_pair("v", live);
            url
        }),
        YoutubeId::Handle(handle) => {
            let handle = if handle.starts_with('@') {
                handle.clone()
            } else {
                format!("@{handle}")
            };
            base.join(&format!("{handle}/live"))
        }
    };
    joined.map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
}

pub fn batch_url(base: &Url, api_key: &str) -> Result<Url, FetchError> {
    let mut url = base
        .join("youtubei/v1/live_chat/get_live_chat")
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

pub fn batch_request_body(params: &FetchParams) -> Value {
    json!({
        "context": {
            "client": {
                "clientVersion": params.client_version,
                "clientName": "WEB",
            },
        },
        "continuation": params.continuation,
    })
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if let Some(status) = err.status() {
        return FetchError::new(FailureKind::HttpStatus(status.as_u16()), err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse(DEFAULT_BASE_URL).unwrap()
    }

    #[test]
    fn page_urls_follow_identity() {
        let url = live_page_url(&base(), &YoutubeId::ChannelId("UC123".into())).unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/channel/UC123/live");

        let url = live_page_url(&base(), &YoutubeId::LiveId("abc123".into())).unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/watch?v=abc123");

        let url = live_page_url(&base(), &YoutubeId::Handle("someone".into())).unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/@someone/live");

        let url = live_page_url(&base(), &YoutubeId::Handle("@someone".into())).unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/@someone/live");
    }

    #[test]
    fn batch_request_replays_params_verbatim() {
        let params = FetchParams {
            api_key: "KEY".into(),
            client_version: "2.20240101.00.00".into(),
            continuation: "C0".into(),
        };
        let url = batch_url(&base(), &params.api_key).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.youtube.com/youtubei/v1/live_chat/get_live_chat?key=KEY"
        );
        let body = batch_request_body(&params);
        assert_eq!(body["context"]["client"]["clientVersion"], "2.20240101.00.00");
        assert_eq!(body["context"]["client"]["clientName"], "WEB");
        assert_eq!(body["continuation"], "C0");
    }
}
