use crate::{
    ChatBatch, ChatError, ChatEvent, Effect, Msg, Phase, PollerState, CHAT_ENDED_REASON,
    CONTINUATION_MISSING_REASON, MAX_TIMER_DELAY,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Effects must be executed in the returned order; the driver feeds the
/// outcome of `FetchLivePage`, `ArmTimer` and `FetchBatch` back as messages.
pub fn update(mut state: PollerState, msg: Msg) -> (PollerState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested { ticket } => match state.phase() {
            Phase::Idle | Phase::Stopped => {
                state.begin_bootstrap(ticket);
                vec![Effect::FetchLivePage]
            }
            Phase::Bootstrapping | Phase::Running => {
                vec![Effect::StartFinished {
                    ticket,
                    success: false,
                }]
            }
        },
        Msg::BootstrapFinished(result) => {
            if state.phase() != Phase::Bootstrapping {
                return (state, Vec::new());
            }
            let ticket = state.take_start_ticket();
            let finished = move |success| {
                ticket.map(|ticket| Effect::StartFinished { ticket, success })
            };
            match result {
                Ok(session) => {
                    state.enter_running(&session);
                    let mut effects = state.arm_timer(state.config().interval);
                    effects.push(Effect::Emit(ChatEvent::Start {
                        live_id: session.live_id,
                        details: session.details,
                    }));
                    effects.extend(finished(true));
                    effects
                }
                Err(error) => {
                    state.bootstrap_failed();
                    let mut effects = vec![Effect::Emit(ChatEvent::Error(error))];
                    effects.extend(finished(false));
                    effects
                }
            }
        }
        Msg::TimerFired(timer) => {
            if state.phase() != Phase::Running || !state.take_fired_timer(timer) {
                return (state, Vec::new());
            }
            match state.fetch_params().cloned() {
                Some(params) => {
                    let generation = state.begin_fetch();
                    vec![Effect::FetchBatch { generation, params }]
                }
                None => {
                    let error = ChatError::MissingFetchParams;
                    let mut effects = vec![Effect::Emit(ChatEvent::Error(error.clone()))];
                    effects.extend(state.stop(Some(error.to_string())));
                    effects
                }
            }
        }
        Msg::BatchFinished { generation, result } => {
            if !state.finish_fetch(generation) {
                return (state, Vec::new());
            }
            match result {
                Ok(batch) => apply_batch(&mut state, batch),
                Err(error) => apply_failure(&mut state, error),
            }
        }
        Msg::StopRequested { reason } => state.stop(reason),
    };

    (state, effects)
}

fn apply_batch(state: &mut PollerState, batch: ChatBatch) -> Vec<Effect> {
    let ChatBatch {
        items,
        malformed,
        continuation,
    } = batch;

    let mut effects = Vec::with_capacity(items.len() + malformed.len() + 2);
    effects.extend(items.into_iter().map(|item| Effect::Emit(ChatEvent::Chat(item))));
    effects.extend(
        malformed
            .into_iter()
            .map(|error| Effect::Emit(ChatEvent::Error(error))),
    );
    state.reset_retries();

    // Resubmitting an empty continuation cannot make progress.
    if continuation.is_empty() {
        effects.extend(state.stop(Some(CONTINUATION_MISSING_REASON.to_string())));
        return effects;
    }

    state.set_continuation(continuation);
    effects.extend(state.arm_timer(state.config().interval));
    effects
}

fn apply_failure(state: &mut PollerState, error: ChatError) -> Vec<Effect> {
    if error == ChatError::ChatEnded {
        return state.stop(Some(CHAT_ENDED_REASON.to_string()));
    }

    if error.is_transient() {
        if let Some(attempt) = state.next_retry() {
            let delay = state
                .config()
                .interval
                .checked_mul(attempt)
                .unwrap_or(MAX_TIMER_DELAY);
            return state.arm_timer(delay);
        }
    }

    // Fail-open: report the error but keep polling at the base interval.
    let mut effects = state.arm_timer(state.config().interval);
    effects.push(Effect::Emit(ChatEvent::Error(error)));
    effects
}
