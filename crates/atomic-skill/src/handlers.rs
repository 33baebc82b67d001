//! The skill's handler table and its canned responses.

use crate::audit::AuditPayload;
use crate::dispatcher::{Context, Handler, Tier};
use crate::error::ActionError;
use atomic_types::{Event, RequestKind, SpeechResult};

/// Intent names as the platform sends them.
pub mod intents {
    pub const HELP: &str = "AMAZON.HelpIntent";
    pub const EXPLAIN_BENEFIT: &str = "ExplainNuclearBenefitIntent";
    pub const CLIMATE_CLOCK: &str = "ClimateClock";
    pub const MAKE_DIFFERENCE: &str = "MakeDifference";
    pub const CHECK_STATS: &str = "CheckStats";
    pub const CANCEL: &str = "AMAZON.CancelIntent";
    pub const STOP: &str = "AMAZON.StopIntent";
    pub const FALLBACK: &str = "AMAZON.FallbackIntent";

    /// Every intent with a dedicated handler.
    pub const ALL: &[&str] = &[
        HELP,
        EXPLAIN_BENEFIT,
        CLIMATE_CLOCK,
        MAKE_DIFFERENCE,
        CHECK_STATS,
        CANCEL,
        STOP,
        FALLBACK,
    ];
}

/// Slot carrying the benefit the user asked about.
pub const ASPECT_SLOT: &str = "Positive_Aspect";
/// Session key Help reads the selected topic from. The skill never writes it.
pub const TOPIC_KEY: &str = "Positive_Aspect";
/// Session key holding the stats counter.
pub const USAGE_COUNT_KEY: &str = "usageCount";

pub const WELCOME: &str = "Welcome to the Atomic Energy skill, I can tell you more about the benefits of nuclear energy, provide info on the climate clock, or suggest ways you can help.";
pub const HELP_REPROMPT: &str = "What would you like to do?";
pub const EFFICIENCY: &str = "Nuclear energy is highly efficient, with a small amount of uranium producing a large amount of energy. This efficiency reduces the need for frequent resource extraction.";
pub const EMISSIONS: &str = "Nuclear energy produces electricity with zero carbon emissions, making it a key player in combating climate change. Makes you wonder who has fed us all of this misinformation...";
pub const SAFETY: &str = "Modern nuclear power plants are built with multiple safety systems to prevent accidents. They are among the safest forms of energy generation when managed properly. In fact, nuclear energy results in 0.3 deaths per terawatt-hour. Compare that to oil, which racks up nearly 20 deaths per terawatt-hour.";
pub const CLARIFY_ASPECT: &str = "I'm sorry, I didn't understand that. Please ask about efficiency, emissions, or safety.";
pub const EXPLAIN_REPROMPT: &str = "What else would you like to learn about nuclear energy?";
pub const CLIMATE_CLOCK: &str = "The Climate Clock shows the time left to limit global warming to 1.5 degrees Celsius. This highlights the urgent need to reduce carbon emissions. Nuclear energy plays a vital role in achieving this goal. Would you like to learn how?";
pub const CLIMATE_CLOCK_REPROMPT: &str = "Would you like to know more about nuclear energy’s role in combating climate change?";
pub const MAKE_DIFFERENCE: &str = "You can make a difference by learning more about nuclear energy, sharing accurate information, and supporting policies that promote clean energy solutions. You can also join organizations that advocate for sustainable energy initiatives. How else can I assist you today?";
pub const MAKE_DIFFERENCE_REPROMPT: &str = "What would you like to learn next?";
pub const STATS_REPROMPT: &str = "What would you like to do next?";
pub const GOODBYE: &str = "Goodbye!";
pub const NOT_UNDERSTOOD: &str = "Sorry, I don't know about that. Please try again.";
pub const APOLOGY: &str = "Sorry, I had trouble doing what you asked. Please try again.";

/// Evaluation order. Specific handlers first, the reflector last.
pub static HANDLERS: &[Handler] = &[
    Handler {
        name: "launch",
        tier: Tier::Specific,
        predicate: is_launch,
        action: launch,
    },
    Handler {
        name: "help",
        tier: Tier::Specific,
        predicate: is_help,
        action: help,
    },
    Handler {
        name: "explain_benefit",
        tier: Tier::Specific,
        predicate: is_explain_benefit,
        action: explain_benefit,
    },
    Handler {
        name: "climate_clock",
        tier: Tier::Specific,
        predicate: is_climate_clock,
        action: climate_clock,
    },
    Handler {
        name: "make_difference",
        tier: Tier::Specific,
        predicate: is_make_difference,
        action: make_difference,
    },
    Handler {
        name: "check_stats",
        tier: Tier::Specific,
        predicate: is_check_stats,
        action: check_stats,
    },
    Handler {
        name: "cancel_stop",
        tier: Tier::Specific,
        predicate: is_cancel_or_stop,
        action: goodbye,
    },
    Handler {
        name: "fallback",
        tier: Tier::Specific,
        predicate: is_fallback,
        action: not_understood,
    },
    Handler {
        name: "session_ended",
        tier: Tier::Specific,
        predicate: is_session_ended,
        action: session_ended,
    },
    Handler {
        name: "intent_reflector",
        tier: Tier::Generic,
        predicate: is_any_intent,
        action: reflect_intent,
    },
];

/// The response used whenever an action faults.
pub fn apology() -> SpeechResult {
    SpeechResult::speak(APOLOGY).reprompt(APOLOGY)
}

fn is_launch(event: &Event) -> bool {
    event.kind == RequestKind::Launch
}

fn is_help(event: &Event) -> bool {
    event.is_intent(intents::HELP)
}

fn is_explain_benefit(event: &Event) -> bool {
    event.is_intent(intents::EXPLAIN_BENEFIT)
}

fn is_climate_clock(event: &Event) -> bool {
    event.is_intent(intents::CLIMATE_CLOCK)
}

fn is_make_difference(event: &Event) -> bool {
    event.is_intent(intents::MAKE_DIFFERENCE)
}

fn is_check_stats(event: &Event) -> bool {
    event.is_intent(intents::CHECK_STATS)
}

fn is_cancel_or_stop(event: &Event) -> bool {
    event.is_intent(intents::CANCEL) || event.is_intent(intents::STOP)
}

fn is_fallback(event: &Event) -> bool {
    event.is_intent(intents::FALLBACK)
}

fn is_session_ended(event: &Event) -> bool {
    event.kind == RequestKind::SessionEnded
}

/// Matches every intent, so it must stay last.
fn is_any_intent(event: &Event) -> bool {
    event.kind == RequestKind::Intent
}

fn launch(_: &mut Context<'_>) -> Result<SpeechResult, ActionError> {
    Ok(SpeechResult::speak(WELCOME).reprompt(WELCOME))
}

fn help(ctx: &mut Context<'_>) -> Result<SpeechResult, ActionError> {
    let topic = ctx.session.text(TOPIC_KEY)?;
    let topic = topic.as_deref().unwrap_or("none");
    Ok(SpeechResult::speak(format!(
        "This skill intends to help reduce the misinformation around nuclear energy. Currently, you have selected {topic}. You can ask me about efficiency, emissions, and safety, check the climate clock, or ask me for ways you can help."
    ))
    .reprompt(HELP_REPROMPT))
}

fn benefit_text(aspect: &str) -> Option<&'static str> {
    match aspect {
        "efficiency" => Some(EFFICIENCY),
        "emissions" => Some(EMISSIONS),
        "safety" => Some(SAFETY),
        _ => None,
    }
}

/// Explains one benefit. The session is left as it came in.
fn explain_benefit(ctx: &mut Context<'_>) -> Result<SpeechResult, ActionError> {
    let speech = ctx
        .event
        .slot(ASPECT_SLOT)
        .and_then(benefit_text)
        .unwrap_or(CLARIFY_ASPECT);
    Ok(SpeechResult::speak(speech).reprompt(EXPLAIN_REPROMPT))
}

fn climate_clock(_: &mut Context<'_>) -> Result<SpeechResult, ActionError> {
    Ok(SpeechResult::speak(CLIMATE_CLOCK).reprompt(CLIMATE_CLOCK_REPROMPT))
}

fn make_difference(_: &mut Context<'_>) -> Result<SpeechResult, ActionError> {
    Ok(SpeechResult::speak(MAKE_DIFFERENCE).reprompt(MAKE_DIFFERENCE_REPROMPT))
}

fn check_stats(ctx: &mut Context<'_>) -> Result<SpeechResult, ActionError> {
    let count = ctx.session.increment(USAGE_COUNT_KEY)?;
    Ok(SpeechResult::speak(format!(
        "You have used Atomic Energy {count} times. Keep it up!"
    ))
    .reprompt(STATS_REPROMPT))
}

fn goodbye(_: &mut Context<'_>) -> Result<SpeechResult, ActionError> {
    Ok(SpeechResult::speak(GOODBYE).ending())
}

fn not_understood(_: &mut Context<'_>) -> Result<SpeechResult, ActionError> {
    Ok(SpeechResult::speak(NOT_UNDERSTOOD).reprompt(NOT_UNDERSTOOD))
}

fn session_ended(ctx: &mut Context<'_>) -> Result<SpeechResult, ActionError> {
    tracing::info!(
        reason = ctx.event.reason.as_deref().unwrap_or("-"),
        "session ended"
    );
    ctx.audit(AuditPayload::SessionEnded {
        reason: ctx.event.reason.clone(),
    });
    Ok(SpeechResult::silent())
}

fn reflect_intent(ctx: &mut Context<'_>) -> Result<SpeechResult, ActionError> {
    let name = ctx.event.intent_name().ok_or(ActionError::Missing {
        what: "intent name",
    })?;
    Ok(SpeechResult::speak(format!("You just triggered {name}")))
}
