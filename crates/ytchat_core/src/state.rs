use std::time::Duration;

use crate::{ChatEvent, Effect, FetchParams, LiveSession};

pub const CHAT_ENDED_REASON: &str = "Chat ended.";
pub const CONTINUATION_MISSING_REASON: &str = "Continuation token missing.";

/// Longest delay a single timer is armed for; longer intervals and backoffs are clamped.
pub const MAX_TIMER_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Base delay between two batch fetches.
    pub interval: Duration,
    /// Transient failures retried before falling back to the fail-open path.
    pub max_retries: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_retries: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Identifies one `start()` call so its outcome reaches that caller only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StartTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Bootstrapping,
    Running,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerState {
    config: PollerConfig,
    phase: Phase,
    live_id: Option<String>,
    fetch_params: Option<FetchParams>,
    retry_count: u32,
    pending_timer: Option<TimerId>,
    next_timer: u64,
    generation: u64,
    in_flight: Option<u64>,
    start_ticket: Option<StartTicket>,
}

impl Default for PollerState {
    fn default() -> Self {
        Self::new(PollerConfig::default())
    }
}

impl PollerState {
    pub fn new(config: PollerConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            live_id: None,
            fetch_params: None,
            retry_count: 0,
            pending_timer: None,
            next_timer: 0,
            generation: 0,
            in_flight: None,
            start_ticket: None,
        }
    }

    pub fn with_live_id(mut self, live_id: Option<String>) -> Self {
        self.live_id = live_id;
        self
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn live_id(&self) -> Option<&str> {
        self.live_id.as_deref()
    }

    pub fn fetch_params(&self) -> Option<&FetchParams> {
        self.fetch_params.as_ref()
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending_timer
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    pub(crate) fn begin_bootstrap(&mut self, ticket: StartTicket) {
        self.phase = Phase::Bootstrapping;
        self.start_ticket = Some(ticket);
    }

    /// The ticket of the `start()` call that owns the bootstrap in progress.
    pub(crate) fn take_start_ticket(&mut self) -> Option<StartTicket> {
        self.start_ticket.take()
    }

    pub(crate) fn bootstrap_failed(&mut self) {
        self.phase = Phase::Idle;
    }

    pub(crate) fn enter_running(&mut self, session: &LiveSession) {
        self.phase = Phase::Running;
        self.live_id = Some(session.live_id.clone());
        self.fetch_params = Some(session.params.clone());
        self.retry_count = 0;
    }

    /// Replaces any pending timer with a fresh one; never leaves two armed.
    pub(crate) fn arm_timer(&mut self, delay: Duration) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        if let Some(timer) = self.pending_timer.take() {
            effects.push(Effect::ClearTimer { timer });
        }
        self.next_timer += 1;
        let timer = TimerId(self.next_timer);
        self.pending_timer = Some(timer);
        effects.push(Effect::ArmTimer {
            timer,
            delay: delay.min(MAX_TIMER_DELAY),
        });
        effects
    }

    /// Consumes the pending timer if `timer` is the one currently armed.
    pub(crate) fn take_fired_timer(&mut self, timer: TimerId) -> bool {
        if self.pending_timer == Some(timer) {
            self.pending_timer = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn begin_fetch(&mut self) -> u64 {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.generation
    }

    /// Accepts a batch result only for the fetch currently in flight.
    pub(crate) fn finish_fetch(&mut self, generation: u64) -> bool {
        if self.phase == Phase::Running && self.in_flight == Some(generation) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn reset_retries(&mut self) {
        self.retry_count = 0;
    }

    /// Returns the new retry count, or `None` once the ceiling is reached.
    pub(crate) fn next_retry(&mut self) -> Option<u32> {
        if self.retry_count < self.config.max_retries {
            self.retry_count += 1;
            Some(self.retry_count)
        } else {
            None
        }
    }

    pub(crate) fn set_continuation(&mut self, continuation: String) {
        if let Some(params) = self.fetch_params.as_mut() {
            params.continuation = continuation;
        }
    }

    /// Moves a running session to `Stopped`; no-op in every other phase.
    pub(crate) fn stop(&mut self, reason: Option<String>) -> Vec<Effect> {
        if self.phase != Phase::Running {
            return Vec::new();
        }
        self.phase = Phase::Stopped;
        self.in_flight = None;
        let mut effects = Vec::with_capacity(2);
        if let Some(timer) = self.pending_timer.take() {
            effects.push(Effect::ClearTimer { timer });
        }
        effects.push(Effect::Emit(ChatEvent::End { reason }));
        effects
    }
}
