use std::time::Duration;

use crate::{ChatEvent, FetchParams, StartTicket, TimerId};

/// Side effects requested by [`crate::update`]; executed by the driver in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch and bootstrap the live page for the configured identity.
    FetchLivePage,
    /// Resolve the `start()` call holding `ticket`.
    StartFinished { ticket: StartTicket, success: bool },
    ArmTimer { timer: TimerId, delay: Duration },
    ClearTimer { timer: TimerId },
    FetchBatch { generation: u64, params: FetchParams },
    Emit(ChatEvent),
}
