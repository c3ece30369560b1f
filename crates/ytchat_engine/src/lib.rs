//! ytchat engine: HTTP fetching, page bootstrap, batch translation and the poller driver.
mod bootstrap;
mod decode;
mod fetch;
mod live_chat;
mod normalize;
mod translate;
mod wire;

pub use bootstrap::bootstrap_from_page;
pub use decode::{decode_page, DecodeError};
pub use fetch::{
    batch_request_body, batch_url, live_page_url, BatchFetcher, FetchSettings, PageFetcher,
    ReqwestFetcher, DEFAULT_BASE_URL,
};
pub use live_chat::{ChatEvents, LiveChat};
pub use normalize::{normalize_action, RendererKind};
pub use translate::translate_batch;
