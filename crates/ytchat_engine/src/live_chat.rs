use std::collections::HashMap;
use std::future::poll_fn;
use std::sync::Arc;
use std::time::Duration;

use chat_logging::{chat_debug, chat_info, chat_trace, chat_warn};
use tokio::sync::{mpsc, oneshot};
use tokio_util::time::{delay_queue, DelayQueue};
use ytchat_core::{
    update, ChatError, ChatEvent, Effect, FetchParams, Msg, PollerConfig, PollerState,
    StartTicket, TimerId, YoutubeId,
};

use crate::bootstrap::bootstrap_from_page;
use crate::fetch::{BatchFetcher, PageFetcher};
use crate::translate::translate_batch;

enum Command {
    Start { reply: oneshot::Sender<bool> },
    Stop { reason: Option<String> },
}

/// Handle to one live-chat poller.
///
/// The poller runs as a tokio task that owns all session state; this handle
/// only sends it commands. Dropping the handle shuts the task down.
pub struct LiveChat {
    id: YoutubeId,
    commands: mpsc::UnboundedSender<Command>,
}

/// Receiving end of the `start`/`chat`/`end`/`error` event stream.
pub struct ChatEvents {
    rx: mpsc::UnboundedReceiver<ChatEvent>,
}

impl ChatEvents {
    pub async fn recv(&mut self) -> Option<ChatEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<ChatEvent> {
        self.rx.try_recv().ok()
    }
}

impl LiveChat {
    /// Validates the identity and spawns the poller task on the current runtime.
    pub fn new<F>(
        id: YoutubeId,
        config: PollerConfig,
        fetcher: Arc<F>,
    ) -> Result<(Self, ChatEvents), ChatError>
    where
        F: PageFetcher + BatchFetcher + 'static,
    {
        id.validate()?;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            id: id.clone(),
            fetcher,
            state: PollerState::new(config).with_live_id(id.live_id().map(str::to_string)),
            timers: DelayQueue::new(),
            timer_keys: HashMap::new(),
            pending_start: HashMap::new(),
            next_ticket: 0,
            events: event_tx,
            inbox: inbox_tx,
        };
        tokio::spawn(driver.run(cmd_rx, inbox_rx));

        Ok((
            Self {
                id,
                commands: cmd_tx,
            },
            ChatEvents { rx: event_rx },
        ))
    }

    pub fn id(&self) -> &YoutubeId {
        &self.id
    }

    /// Bootstraps the session and schedules the first poll.
    ///
    /// Returns `false` if already running or if bootstrap failed; the failure
    /// itself is published as an `error` event.
    pub async fn start(&self) -> bool {
        let (reply, rx) = oneshot::channel();
        if self.commands.send(Command::Start { reply }).is_err() {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Stops a running session and publishes `end` with `reason`. No-op otherwise.
    pub fn stop(&self, reason: Option<String>) {
        let _ = self.commands.send(Command::Stop { reason });
    }
}

struct Driver<F> {
    id: YoutubeId,
    fetcher: Arc<F>,
    state: PollerState,
    timers: DelayQueue<TimerId>,
    timer_keys: HashMap<TimerId, delay_queue::Key>,
    pending_start: HashMap<StartTicket, oneshot::Sender<bool>>,
    next_ticket: u64,
    events: mpsc::UnboundedSender<ChatEvent>,
    inbox: mpsc::UnboundedSender<Msg>,
}

impl<F> Driver<F>
where
    F: PageFetcher + BatchFetcher + 'static,
{
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut inbox: mpsc::UnboundedReceiver<Msg>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Start { reply }) => {
                        self.next_ticket += 1;
                        let ticket = StartTicket(self.next_ticket);
                        self.pending_start.insert(ticket, reply);
                        self.dispatch(Msg::StartRequested { ticket });
                    }
                    Some(Command::Stop { reason }) => {
                        self.dispatch(Msg::StopRequested { reason });
                    }
                    None => break,
                },
                Some(msg) = inbox.recv() => self.dispatch(msg),
                Some(expired) = poll_fn(|cx| self.timers.poll_expired(cx)) => {
                    let timer = expired.into_inner();
                    self.timer_keys.remove(&timer);
                    chat_trace!("timer {:?} fired", timer);
                    self.dispatch(Msg::TimerFired(timer));
                }
            }
        }
        chat_debug!("poller for {:?} shut down", self.id);
    }

    fn dispatch(&mut self, msg: Msg) {
        let failed_batch = match &msg {
            Msg::BatchFinished {
                generation,
                result: Err(err),
            } => Some((*generation, err.to_string())),
            _ => None,
        };
        let (state, effects) = update(std::mem::take(&mut self.state), msg);
        self.state = state;
        if let Some((generation, err)) = failed_batch {
            self.log_failure(generation, &err, failure_outcome(&effects));
        }
        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::FetchLivePage => self.spawn_bootstrap(),
            Effect::StartFinished { ticket, success } => {
                if let Some(reply) = self.pending_start.remove(&ticket) {
                    let _ = reply.send(success);
                }
            }
            Effect::ArmTimer { timer, delay } => {
                chat_trace!("arm timer {:?} in {:?}", timer, delay);
                let key = self.timers.insert(timer, delay);
                self.timer_keys.insert(timer, key);
            }
            Effect::ClearTimer { timer } => {
                chat_trace!("clear timer {:?}", timer);
                if let Some(key) = self.timer_keys.remove(&timer) {
                    self.timers.try_remove(&key);
                }
            }
            Effect::FetchBatch { generation, params } => self.spawn_batch(generation, params),
            Effect::Emit(event) => {
                if let ChatEvent::End { reason } = &event {
                    chat_info!("session ended: {}", reason.as_deref().unwrap_or("stopped"));
                }
                let _ = self.events.send(event);
            }
        }
    }

    fn log_failure(&self, generation: u64, err: &str, outcome: FailureOutcome) {
        match outcome {
            FailureOutcome::Discarded => {
                chat_trace!("batch {} failed after it went stale: {}", generation, err)
            }
            FailureOutcome::Retry(delay) => chat_warn!(
                "batch {} failed (retry {}), retrying in {:?}: {}",
                generation,
                self.state.retry_count(),
                delay,
                err
            ),
            FailureOutcome::Reported(delay) => chat_warn!(
                "batch {} failed, polling continues in {:?}: {}",
                generation,
                delay,
                err
            ),
            FailureOutcome::Ended => chat_info!("batch {}: {}", generation, err),
        }
    }

    fn spawn_bootstrap(&self) {
        let fetcher = Arc::clone(&self.fetcher);
        let inbox = self.inbox.clone();
        let id = self.id.clone();
        tokio::spawn(async move {
            let result = match fetcher.fetch_live_page(&id).await {
                Ok(html) => bootstrap_from_page(&html),
                Err(err) => Err(ChatError::from(err)),
            };
            match &result {
                Ok(session) => chat_info!(
                    "bootstrapped live {} ({}) for {:?}",
                    session.live_id,
                    session.title,
                    id
                ),
                Err(err) => chat_warn!("bootstrap failed for {:?}: {}", id, err),
            }
            let _ = inbox.send(Msg::BootstrapFinished(result));
        });
    }

    fn spawn_batch(&self, generation: u64, params: FetchParams) {
        let fetcher = Arc::clone(&self.fetcher);
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            let result = match fetcher.fetch_batch(&params).await {
                Ok(response) => translate_batch(&response),
                Err(err) => Err(ChatError::from(err)),
            };
            if let Ok(batch) = &result {
                chat_debug!(
                    "batch {}: {} items, {} malformed",
                    generation,
                    batch.items.len(),
                    batch.malformed.len()
                );
            }
            let _ = inbox.send(Msg::BatchFinished { generation, result });
        });
    }
}

/// What the state machine did with a failed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureOutcome {
    /// The result belonged to a fetch that is no longer current.
    Discarded,
    /// Silent backoff before the next attempt.
    Retry(Duration),
    /// The error was published and polling resumes at the base interval.
    Reported(Duration),
    Ended,
}

fn failure_outcome(effects: &[Effect]) -> FailureOutcome {
    let rearmed = effects.iter().find_map(|effect| match effect {
        Effect::ArmTimer { delay, .. } => Some(*delay),
        _ => None,
    });
    let reported = effects
        .iter()
        .any(|effect| matches!(effect, Effect::Emit(ChatEvent::Error(_))));
    match (rearmed, reported) {
        (Some(delay), true) => FailureOutcome::Reported(delay),
        (Some(delay), false) => FailureOutcome::Retry(delay),
        (None, _) if effects.is_empty() => FailureOutcome::Discarded,
        (None, _) => FailureOutcome::Ended,
    }
}
