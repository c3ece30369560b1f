//! ytchat core: chat data model and the pure poller state machine.
mod chat_item;
mod effect;
mod error;
mod event;
mod msg;
mod session;
mod state;
mod update;

pub use chat_item::{
    AuthorBadge, ChatAuthor, ChatItem, ChatItemKind, EmojiItem, ImageItem, MessageItem,
    SuperchatDetails, SuperstickerDetails,
};
pub use effect::Effect;
pub use error::{ChatError, FailureKind, FetchError};
pub use event::ChatEvent;
pub use msg::{ChatBatch, Msg};
pub use session::{FetchParams, LiveSession, Thumbnail, ThumbnailList, VideoDetails, YoutubeId};
pub use state::{
    Phase, PollerConfig, PollerState, StartTicket, TimerId, CHAT_ENDED_REASON,
    CONTINUATION_MISSING_REASON, MAX_TIMER_DELAY,
};
pub use update::update;
