use crate::{ChatError, ChatItem, LiveSession, StartTicket, TimerId};

/// Inputs to the poller state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Caller asked to start polling; the outcome is answered on `ticket`.
    StartRequested { ticket: StartTicket },
    /// The live page was fetched and bootstrapped (or failed to).
    BootstrapFinished(Result<LiveSession, ChatError>),
    /// A previously armed timer elapsed.
    TimerFired(TimerId),
    /// A batch fetch tagged with `generation` completed.
    BatchFinished {
        generation: u64,
        result: Result<ChatBatch, ChatError>,
    },
    /// Caller asked to stop polling.
    StopRequested { reason: Option<String> },
}

/// One translated batch response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatBatch {
    pub items: Vec<ChatItem>,
    /// Actions that could not be normalized, one error each.
    pub malformed: Vec<ChatError>,
    /// Next continuation token; empty when the response carried none.
    pub continuation: String,
}
