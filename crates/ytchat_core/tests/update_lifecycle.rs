use std::sync::Once;
use std::time::Duration;

use pretty_assertions::assert_eq;
use ytchat_core::{
    update, ChatError, ChatEvent, Effect, FetchParams, LiveSession, Msg, Phase, PollerConfig,
    PollerState, StartTicket, TimerId,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(chat_logging::initialize_for_tests);
}

fn start_request(ticket: u64) -> Msg {
    Msg::StartRequested {
        ticket: StartTicket(ticket),
    }
}

fn session() -> LiveSession {
    LiveSession {
        live_id: "abc123".to_string(),
        title: "Test Stream".to_string(),
        params: FetchParams {
            api_key: "KEY".to_string(),
            client_version: "2.0".to_string(),
            continuation: "C0".to_string(),
        },
        details: None,
    }
}

fn running_state() -> PollerState {
    let (state, _) = update(PollerState::default(), start_request(1));
    let (state, _) = update(state, Msg::BootstrapFinished(Ok(session())));
    state
}

#[test]
fn start_fetches_page_then_arms_first_timer() {
    init_logging();
    let (state, effects) = update(PollerState::default(), start_request(1));
    assert_eq!(state.phase(), Phase::Bootstrapping);
    assert_eq!(effects, vec![Effect::FetchLivePage]);

    let (state, effects) = update(state, Msg::BootstrapFinished(Ok(session())));
    assert_eq!(state.phase(), Phase::Running);
    assert_eq!(state.live_id(), Some("abc123"));
    assert_eq!(state.fetch_params().map(|p| p.continuation.as_str()), Some("C0"));
    assert_eq!(
        effects,
        vec![
            Effect::ArmTimer {
                timer: TimerId(1),
                delay: Duration::from_millis(1000),
            },
            Effect::Emit(ChatEvent::Start {
                live_id: "abc123".to_string(),
                details: None,
            }),
            Effect::StartFinished {
                ticket: StartTicket(1),
                success: true,
            },
        ]
    );
}

#[test]
fn start_while_running_reports_failure() {
    init_logging();
    let state = running_state();
    let (state, effects) = update(state, start_request(2));
    assert_eq!(state.phase(), Phase::Running);
    assert_eq!(
        effects,
        vec![Effect::StartFinished {
            ticket: StartTicket(2),
            success: false,
        }]
    );
}

#[test]
fn start_while_bootstrapping_answers_each_caller_on_its_own_ticket() {
    init_logging();
    let (state, _) = update(PollerState::default(), start_request(1));
    let (state, effects) = update(state, start_request(2));
    assert_eq!(state.phase(), Phase::Bootstrapping);
    assert_eq!(
        effects,
        vec![Effect::StartFinished {
            ticket: StartTicket(2),
            success: false,
        }]
    );

    let (state, effects) = update(state, Msg::BootstrapFinished(Ok(session())));
    assert_eq!(state.phase(), Phase::Running);
    assert_eq!(
        effects.last(),
        Some(&Effect::StartFinished {
            ticket: StartTicket(1),
            success: true,
        })
    );
}

#[test]
fn bootstrap_failure_reports_error_and_returns_to_idle() {
    init_logging();
    let (state, _) = update(PollerState::default(), start_request(1));
    let (state, effects) = update(state, Msg::BootstrapFinished(Err(ChatError::ApiKeyNotFound)));

    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.pending_timer(), None);
    assert_eq!(
        effects,
        vec![
            Effect::Emit(ChatEvent::Error(ChatError::ApiKeyNotFound)),
            Effect::StartFinished {
                ticket: StartTicket(1),
                success: false,
            },
        ]
    );
}

#[test]
fn stop_while_idle_is_noop() {
    init_logging();
    let state = PollerState::default();
    let (next, effects) = update(
        state.clone(),
        Msg::StopRequested {
            reason: Some("bye".to_string()),
        },
    );
    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn stop_while_running_clears_timer_and_emits_one_end() {
    init_logging();
    let state = running_state();
    let (state, effects) = update(
        state,
        Msg::StopRequested {
            reason: Some("bye".to_string()),
        },
    );
    assert_eq!(state.phase(), Phase::Stopped);
    assert_eq!(state.pending_timer(), None);
    assert_eq!(
        effects,
        vec![
            Effect::ClearTimer { timer: TimerId(1) },
            Effect::Emit(ChatEvent::End {
                reason: Some("bye".to_string()),
            }),
        ]
    );

    let (_state, effects) = update(state, Msg::StopRequested { reason: None });
    assert!(effects.is_empty());
}

#[test]
fn stopped_session_can_be_restarted() {
    init_logging();
    let (state, _) = update(running_state(), Msg::StopRequested { reason: None });
    let (state, effects) = update(state, start_request(1));
    assert_eq!(state.phase(), Phase::Bootstrapping);
    assert_eq!(effects, vec![Effect::FetchLivePage]);
}

#[test]
fn stale_timer_is_ignored() {
    init_logging();
    let state = running_state();
    let (next, effects) = update(state.clone(), Msg::TimerFired(TimerId(99)));
    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn config_interval_is_used_for_first_timer() {
    init_logging();
    let config = PollerConfig {
        interval: Duration::from_millis(250),
        ..PollerConfig::default()
    };
    let (state, _) = update(PollerState::new(config), start_request(1));
    let (_state, effects) = update(state, Msg::BootstrapFinished(Ok(session())));
    assert_eq!(
        effects[0],
        Effect::ArmTimer {
            timer: TimerId(1),
            delay: Duration::from_millis(250),
        }
    );
}
