//! Unit tests for the dispatcher and the handler table.

use std::sync::Arc;

use atomic_types::{Event, SessionState, SpeechResult};
use serde_json::json;

use crate::audit::{AuditPayload, MemoryAuditSink};
use crate::dispatcher::{Context, Dispatcher, Handler, Tier};
use crate::error::{ActionError, DispatchError};
use crate::handlers::{self, intents, ASPECT_SLOT, TOPIC_KEY, USAGE_COUNT_KEY};

fn dispatcher() -> (Dispatcher, Arc<MemoryAuditSink>) {
    let audit = Arc::new(MemoryAuditSink::new());
    let dispatcher = Dispatcher::standard(audit.clone()).expect("standard table is well ordered");
    (dispatcher, audit)
}

fn speak(dispatcher: &Dispatcher, event: &Event, session: &mut SessionState) -> SpeechResult {
    dispatcher
        .dispatch(event, session)
        .expect("event should be handled")
}

fn speech(result: &SpeechResult) -> &str {
    result.speech.as_deref().expect("result should have speech")
}

// ── ordering ─────────────────────────────────────────────────────────

#[test]
fn every_named_intent_reaches_its_own_handler() {
    let (d, _) = dispatcher();
    for name in intents::ALL {
        let event = Event::intent(*name);
        let handler = d.select(&event).expect("intent should match a handler");
        assert_ne!(handler.name, "intent_reflector", "{name} fell through to the reflector");

        let result = speak(&d, &event, &mut SessionState::new());
        assert!(
            !speech(&result).starts_with("You just triggered"),
            "{name} produced the reflector echo"
        );
    }
}

#[test]
fn unknown_intent_is_reflected_verbatim() {
    let (d, _) = dispatcher();
    let result = speak(&d, &Event::intent("OrderPizzaIntent"), &mut SessionState::new());
    assert_eq!(speech(&result), "You just triggered OrderPizzaIntent");
    assert!(result.reprompt.is_none());
    assert!(!result.end_session);
}

#[test]
fn intent_names_match_case_sensitively() {
    let (d, _) = dispatcher();
    let result = speak(&d, &Event::intent("checkstats"), &mut SessionState::new());
    assert_eq!(speech(&result), "You just triggered checkstats");
}

#[test]
fn specific_after_generic_is_rejected() {
    fn any(_: &Event) -> bool {
        true
    }
    fn ok(_: &mut Context<'_>) -> Result<SpeechResult, ActionError> {
        Ok(SpeechResult::speak("ok"))
    }
    let table = vec![
        Handler {
            name: "catch_all",
            tier: Tier::Generic,
            predicate: any,
            action: ok,
        },
        Handler {
            name: "narrow",
            tier: Tier::Specific,
            predicate: any,
            action: ok,
        },
    ];
    let err = Dispatcher::new(table, Arc::new(MemoryAuditSink::new())).unwrap_err();
    assert_eq!(
        err,
        DispatchError::Shadowed {
            handler: "narrow",
            shadowed_by: "catch_all",
        }
    );
}

#[test]
fn standard_table_order_is_declared_order() {
    let (d, _) = dispatcher();
    let names: Vec<_> = d.handler_names().collect();
    assert_eq!(
        names,
        vec![
            "launch",
            "help",
            "explain_benefit",
            "climate_clock",
            "make_difference",
            "check_stats",
            "cancel_stop",
            "fallback",
            "session_ended",
            "intent_reflector",
        ]
    );
}

// ── handlers ─────────────────────────────────────────────────────────

#[test]
fn launch_welcomes_and_reprompts_with_welcome() {
    let (d, _) = dispatcher();
    let result = speak(&d, &Event::launch(), &mut SessionState::new());
    assert_eq!(speech(&result), handlers::WELCOME);
    assert_eq!(result.reprompt.as_deref(), Some(handlers::WELCOME));
    assert!(!result.end_session);
}

#[test]
fn help_defaults_topic_to_none() {
    let (d, _) = dispatcher();
    let result = speak(&d, &Event::intent(intents::HELP), &mut SessionState::new());
    assert!(speech(&result).contains("you have selected none."));
    assert_eq!(result.reprompt.as_deref(), Some(handlers::HELP_REPROMPT));
}

#[test]
fn help_echoes_selected_topic() {
    let (d, _) = dispatcher();
    let mut session = SessionState::new();
    session.set(TOPIC_KEY, "emissions");
    let result = speak(&d, &Event::intent(intents::HELP), &mut session);
    assert!(speech(&result).contains("you have selected emissions."));
}

#[test]
fn explain_benefit_picks_text_by_slot() {
    let (d, _) = dispatcher();
    let cases = [
        ("efficiency", handlers::EFFICIENCY),
        ("emissions", handlers::EMISSIONS),
        ("safety", handlers::SAFETY),
    ];
    for (value, expected) in cases {
        let event = Event::intent(intents::EXPLAIN_BENEFIT).with_slot(ASPECT_SLOT, value);
        let first = speak(&d, &event, &mut SessionState::new());
        let second = speak(&d, &event, &mut SessionState::new());
        assert_eq!(speech(&first), expected);
        assert_eq!(first, second);
        assert_eq!(first.reprompt.as_deref(), Some(handlers::EXPLAIN_REPROMPT));
    }
}

#[test]
fn explain_benefit_clarifies_unknown_or_missing_slot() {
    let (d, _) = dispatcher();
    let events = [
        Event::intent(intents::EXPLAIN_BENEFIT),
        Event::intent(intents::EXPLAIN_BENEFIT).with_slot(ASPECT_SLOT, "cost"),
        Event::intent(intents::EXPLAIN_BENEFIT).with_slot(ASPECT_SLOT, "Safety"),
    ];
    for event in &events {
        let mut session = SessionState::new();
        let result = speak(&d, event, &mut session);
        assert_eq!(speech(&result), handlers::CLARIFY_ASPECT);
        assert!(session.get(TOPIC_KEY).is_none());
    }
}

#[test]
fn explain_benefit_leaves_session_untouched() {
    let (d, _) = dispatcher();
    let mut session = SessionState::new();
    session.set(USAGE_COUNT_KEY, 2);
    let explain = Event::intent(intents::EXPLAIN_BENEFIT).with_slot(ASPECT_SLOT, "safety");
    speak(&d, &explain, &mut session);

    assert!(session.get(TOPIC_KEY).is_none());
    assert_eq!(session.get(USAGE_COUNT_KEY), Some(&json!(2)));
    assert_eq!(session.len(), 1);

    let result = speak(&d, &Event::intent(intents::HELP), &mut session);
    assert!(speech(&result).contains("you have selected none."));
}

#[test]
fn help_treats_false_and_zero_topics_as_none() {
    let (d, _) = dispatcher();
    for topic in [json!(false), json!(0)] {
        let mut session = SessionState::new();
        session.set(TOPIC_KEY, topic);
        let result = speak(&d, &Event::intent(intents::HELP), &mut session);
        assert!(speech(&result).contains("you have selected none."));
    }

    let mut session = SessionState::new();
    session.set(TOPIC_KEY, true);
    let result = speak(&d, &Event::intent(intents::HELP), &mut session);
    assert!(speech(&result).contains("you have selected true."));
}

#[test]
fn check_stats_counts_each_call() {
    let (d, _) = dispatcher();
    let mut session = SessionState::new();
    let event = Event::intent(intents::CHECK_STATS);
    for n in 1..=4 {
        let result = speak(&d, &event, &mut session);
        assert_eq!(
            speech(&result),
            format!("You have used Atomic Energy {n} times. Keep it up!")
        );
    }
    assert_eq!(session.get(USAGE_COUNT_KEY), Some(&json!(4)));
}

#[test]
fn climate_clock_and_make_difference_keep_session_open() {
    let (d, _) = dispatcher();
    let clock = speak(&d, &Event::intent(intents::CLIMATE_CLOCK), &mut SessionState::new());
    assert_eq!(speech(&clock), handlers::CLIMATE_CLOCK);
    assert_eq!(clock.reprompt.as_deref(), Some(handlers::CLIMATE_CLOCK_REPROMPT));
    assert!(!clock.end_session);

    let diff = speak(&d, &Event::intent(intents::MAKE_DIFFERENCE), &mut SessionState::new());
    assert_eq!(speech(&diff), handlers::MAKE_DIFFERENCE);
    assert!(!diff.end_session);
}

#[test]
fn cancel_and_stop_end_the_session() {
    let (d, _) = dispatcher();
    for name in [intents::CANCEL, intents::STOP] {
        let result = speak(&d, &Event::intent(name), &mut SessionState::new());
        assert_eq!(speech(&result), handlers::GOODBYE);
        assert!(result.end_session);
        assert!(result.reprompt.is_none());
    }
}

#[test]
fn only_goodbye_and_session_end_close_the_session() {
    let (d, _) = dispatcher();
    for name in intents::ALL {
        let result = speak(&d, &Event::intent(*name), &mut SessionState::new());
        let closes = *name == intents::CANCEL || *name == intents::STOP;
        assert_eq!(result.end_session, closes, "{name}");
    }
    assert!(!speak(&d, &Event::launch(), &mut SessionState::new()).end_session);
}

#[test]
fn fallback_asks_again() {
    let (d, _) = dispatcher();
    let result = speak(&d, &Event::intent(intents::FALLBACK), &mut SessionState::new());
    assert_eq!(speech(&result), handlers::NOT_UNDERSTOOD);
    assert_eq!(result.reprompt.as_deref(), Some(handlers::NOT_UNDERSTOOD));
    assert!(!result.end_session);
}

#[test]
fn session_end_is_silent_and_audited() {
    let (d, audit) = dispatcher();
    let mut session = SessionState::new();
    session.set(USAGE_COUNT_KEY, 2);
    let event = Event::session_ended(Some("USER_INITIATED".to_string())).with_request_id("req-9");

    let result = speak(&d, &event, &mut session);
    assert_eq!(result, SpeechResult::silent());
    assert_eq!(session.get(USAGE_COUNT_KEY), Some(&json!(2)));

    let records = audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].request_id.as_deref(), Some("req-9"));
    assert_eq!(
        records[0].payload,
        AuditPayload::SessionEnded {
            reason: Some("USER_INITIATED".to_string())
        }
    );
}

// ── faults ───────────────────────────────────────────────────────────

#[test]
fn faulting_action_yields_apology_and_keeps_session() {
    let (d, audit) = dispatcher();
    let mut session = SessionState::new();
    session.set(USAGE_COUNT_KEY, "lots");
    let before = session.clone();

    let result = speak(&d, &Event::intent(intents::CHECK_STATS), &mut session);
    assert_eq!(result, handlers::apology());
    assert_eq!(speech(&result), handlers::APOLOGY);
    assert!(!result.end_session);
    assert_eq!(session, before);

    let records = audit.records();
    assert_eq!(records.len(), 1);
    assert!(matches!(
        &records[0].payload,
        AuditPayload::ActionFailed { handler, .. } if handler == "check_stats"
    ));
}

#[test]
fn structured_topic_faults_help() {
    let (d, _) = dispatcher();
    let mut session = SessionState::new();
    session.set(TOPIC_KEY, json!({"nested": true}));
    let result = speak(&d, &Event::intent(intents::HELP), &mut session);
    assert_eq!(speech(&result), handlers::APOLOGY);
}

#[test]
fn empty_speech_is_treated_as_fault() {
    fn any(_: &Event) -> bool {
        true
    }
    fn mute(ctx: &mut Context<'_>) -> Result<SpeechResult, ActionError> {
        ctx.session.set("touched", true);
        Ok(SpeechResult::speak(""))
    }
    let audit = Arc::new(MemoryAuditSink::new());
    let d = Dispatcher::new(
        vec![Handler {
            name: "mute",
            tier: Tier::Generic,
            predicate: any,
            action: mute,
        }],
        audit.clone(),
    )
    .unwrap();

    let mut session = SessionState::new();
    let result = d.dispatch(&Event::launch(), &mut session).unwrap();
    assert_eq!(result, handlers::apology());
    assert!(session.is_empty());
    assert!(matches!(
        &audit.records()[0].payload,
        AuditPayload::ActionFailed { error, .. } if error == "handler mute produced empty speech"
    ));
}

#[test]
fn intent_event_without_intent_faults_the_reflector() {
    let (d, _) = dispatcher();
    let mut event = Event::intent("Anything");
    event.intent = None;
    let result = speak(&d, &event, &mut SessionState::new());
    assert_eq!(speech(&result), handlers::APOLOGY);
}

#[test]
fn unknown_request_type_is_unhandled() {
    let (d, audit) = dispatcher();
    let err = d
        .dispatch(&Event::other("CanFulfillIntentRequest"), &mut SessionState::new())
        .unwrap_err();
    assert_eq!(
        err,
        DispatchError::Unhandled {
            request_type: "CanFulfillIntentRequest".to_string()
        }
    );
    assert_eq!(audit.records()[0].payload.event_type(), "UNHANDLED");
}
