use crate::{ChatError, ChatItem, VideoDetails};

/// Events published by a running poller, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Bootstrap succeeded and the first poll is scheduled.
    Start {
        live_id: String,
        details: Option<VideoDetails>,
    },
    /// One recognized chat item.
    Chat(ChatItem),
    /// The session was stopped, explicitly or by a terminal condition.
    End { reason: Option<String> },
    Error(ChatError),
}
