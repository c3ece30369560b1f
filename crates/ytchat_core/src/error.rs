use std::fmt;

/// Transport failure reported by a page or batch fetcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Every failure that can surface on the `error` event or end a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("Required channelId or liveId or handle.")]
    InvalidIdentity,
    #[error("Live Stream was not found")]
    LiveNotFound,
    #[error("{live_id} is finished live")]
    FinishedLive { live_id: String },
    #[error("API Key was not found")]
    ApiKeyNotFound,
    #[error("Client Version was not found")]
    ClientVersionNotFound,
    #[error("Failed to extract fetch options")]
    FailedExtraction,
    #[error("Not found options")]
    MissingFetchParams,
    /// The live chat has no continuation contents any more.
    #[error("chat ended")]
    ChatEnded,
    #[error("Error while processing {payload}: {reason}")]
    MalformedAction { payload: String, reason: String },
    #[error("invalid batch response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ChatError {
    /// Request timeouts and HTTP 503 are retried with backoff by the poller.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ChatError::Fetch(FetchError {
                kind: FailureKind::Timeout | FailureKind::HttpStatus(503),
                ..
            })
        )
    }
}
