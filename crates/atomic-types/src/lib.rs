//! Shared types for the Atomic Energy skill.
//!
//! This crate provides the records that flow between the HTTP layer and the
//! dispatcher: the decoded inbound [`Event`], the per-conversation
//! [`SessionState`], and the outbound [`SpeechResult`]. The platform's JSON
//! envelopes live in [`envelope`] together with their conversion into these
//! records.
//!
//! Nothing here knows about individual handlers. Session keys are opaque at
//! this level; only handler actions give them meaning.

pub mod envelope;
pub mod session;

pub use envelope::{RequestEnvelope, ResponseEnvelope};
pub use session::{AttributeError, SessionState};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request categories delivered by the voice platform.
///
/// The skill understands three of them. Anything else the platform sends is
/// kept verbatim in [`RequestKind::Other`] so the dispatcher can report it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// The user opened the skill without asking for anything specific.
    Launch,
    /// The platform classified the user's speech as a named intent.
    Intent,
    /// The platform closed the session.
    SessionEnded,
    /// A request type the skill has no handler category for.
    Other(String),
}

impl RequestKind {
    /// Maps the platform's `request.type` string to a kind.
    pub fn parse(request_type: &str) -> Self {
        match request_type {
            "LaunchRequest" => Self::Launch,
            "IntentRequest" => Self::Intent,
            "SessionEndedRequest" => Self::SessionEnded,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the platform's string label for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Launch => "LaunchRequest",
            Self::Intent => "IntentRequest",
            Self::SessionEnded => "SessionEndedRequest",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified intent with its filled slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Intent name exactly as the platform sent it.
    pub name: String,
    /// Slot name to spoken value. Slots the user did not fill are absent.
    pub slots: BTreeMap<String, String>,
}

/// One inbound request, decoded from the platform envelope.
///
/// Events are immutable once built and are discarded after dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Request category.
    pub kind: RequestKind,
    /// Intent payload; present only for [`RequestKind::Intent`].
    pub intent: Option<Intent>,
    /// Platform request identifier, used for log correlation.
    pub request_id: Option<String>,
    /// Locale of the device that produced the request.
    pub locale: Option<String>,
    /// Why the session ended; present only for [`RequestKind::SessionEnded`].
    pub reason: Option<String>,
}

impl Event {
    fn of_kind(kind: RequestKind) -> Self {
        Self {
            kind,
            intent: None,
            request_id: None,
            locale: None,
            reason: None,
        }
    }

    /// A launch event.
    pub fn launch() -> Self {
        Self::of_kind(RequestKind::Launch)
    }

    /// An intent event with no slots.
    pub fn intent(name: impl Into<String>) -> Self {
        Self {
            intent: Some(Intent {
                name: name.into(),
                slots: BTreeMap::new(),
            }),
            ..Self::of_kind(RequestKind::Intent)
        }
    }

    /// A session-ended event carrying the platform's reason.
    pub fn session_ended(reason: Option<String>) -> Self {
        Self {
            reason,
            ..Self::of_kind(RequestKind::SessionEnded)
        }
    }

    /// An event of a request type the skill does not model.
    pub fn other(request_type: impl Into<String>) -> Self {
        Self::of_kind(RequestKind::Other(request_type.into()))
    }

    /// Adds a filled slot. No effect on events without an intent.
    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Some(intent) = self.intent.as_mut() {
            intent.slots.insert(name.into(), value.into());
        }
        self
    }

    /// Sets the request identifier.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// The intent name, if this is an intent event.
    pub fn intent_name(&self) -> Option<&str> {
        self.intent.as_ref().map(|i| i.name.as_str())
    }

    /// Returns `true` if this is an intent event whose name is exactly `name`.
    pub fn is_intent(&self, name: &str) -> bool {
        self.kind == RequestKind::Intent && self.intent_name() == Some(name)
    }

    /// The value of a filled slot.
    pub fn slot(&self, name: &str) -> Option<&str> {
        self.intent
            .as_ref()
            .and_then(|i| i.slots.get(name))
            .map(String::as_str)
    }
}

/// What the skill says back.
///
/// A result without speech is a silent response; the platform requires one
/// for session-ended requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechResult {
    /// Text to synthesize. `None` for a silent response.
    pub speech: Option<String>,
    /// Text spoken if the user stays quiet.
    pub reprompt: Option<String>,
    /// Whether the platform should close the session after speaking.
    pub end_session: bool,
}

impl SpeechResult {
    /// Speaks `text` and keeps the session open.
    pub fn speak(text: impl Into<String>) -> Self {
        Self {
            speech: Some(text.into()),
            reprompt: None,
            end_session: false,
        }
    }

    /// A silent response that closes the session.
    pub fn silent() -> Self {
        Self {
            speech: None,
            reprompt: None,
            end_session: true,
        }
    }

    /// Adds a reprompt.
    pub fn reprompt(mut self, text: impl Into<String>) -> Self {
        self.reprompt = Some(text.into());
        self
    }

    /// Marks the session as finished.
    pub fn ending(mut self) -> Self {
        self.end_session = true;
        self
    }

    /// Returns `true` if speech is present but contains no words.
    pub fn is_blank(&self) -> bool {
        matches!(&self.speech, Some(text) if text.trim().is_empty())
    }
}
