//! Platform JSON envelopes.
//!
//! The voice platform owns this format. Only the fields the skill reads or
//! writes are modelled; everything else in the request is ignored.

use crate::{Event, Intent, RequestKind, SessionState, SpeechResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Envelope version the skill writes.
pub const RESPONSE_VERSION: &str = "1.0";

/// Inbound request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub session: Option<SessionPayload>,
    pub request: RequestPayload,
}

/// The `session` object of a request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    /// Whether this is the first request of the session.
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Attributes the skill returned on the previous turn. Anything other
    /// than an object starts the turn with no attributes.
    #[serde(default)]
    pub attributes: Option<Value>,
}

/// The `request` object of a request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub intent: Option<IntentPayload>,
    /// Session-ended reason (`USER_INITIATED`, `ERROR`, `EXCEEDED_MAX_REPROMPTS`).
    #[serde(default)]
    pub reason: Option<String>,
}

/// The `request.intent` object.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentPayload {
    /// Only a string name counts; anything else leaves the intent unnamed.
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub slots: BTreeMap<String, SlotPayload>,
}

/// One entry of `request.intent.slots`.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotPayload {
    #[serde(default)]
    pub name: Option<String>,
    /// Absent when the user did not fill the slot. Kept loose so a
    /// non-string value reads as unfilled instead of rejecting the request.
    #[serde(default)]
    pub value: Option<Value>,
}

impl SlotPayload {
    /// The spoken value, if it is a string.
    pub fn text(self) -> Option<String> {
        match self.value {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl RequestEnvelope {
    /// Session identifier, if the request belongs to a session.
    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref()?.session_id.as_deref()
    }

    /// Splits the envelope into the event and the session attributes it carries.
    ///
    /// An intent request without a named intent still becomes an intent
    /// event; it has no intent payload and handlers that need one fault.
    pub fn into_parts(self) -> (Event, SessionState) {
        let RequestPayload {
            request_type,
            request_id,
            locale,
            intent,
            reason,
        } = self.request;

        let kind = RequestKind::parse(&request_type);
        let intent = match (&kind, intent) {
            (
                RequestKind::Intent,
                Some(IntentPayload {
                    name: Some(Value::String(name)),
                    slots,
                }),
            ) => Some(Intent {
                name,
                slots: slots
                    .into_iter()
                    .filter_map(|(slot_name, slot)| slot.text().map(|value| (slot_name, value)))
                    .collect(),
            }),
            _ => None,
        };

        let session = self
            .session
            .and_then(|s| match s.attributes {
                Some(Value::Object(map)) => Some(SessionState::from(map)),
                _ => None,
            })
            .unwrap_or_default();

        let event = Event {
            kind,
            intent,
            request_id,
            locale,
            reason,
        };
        (event, session)
    }
}

/// Outbound response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,
    pub session_attributes: Map<String, Value>,
    pub response: ResponseBody,
}

/// The `response` object of a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    pub should_end_session: bool,
}

/// SSML speech payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub speech_type: String,
    pub ssml: String,
}

/// The `response.reprompt` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

impl OutputSpeech {
    /// Wraps plain text in a `<speak>` element, escaping markup characters.
    pub fn ssml(text: &str) -> Self {
        let mut ssml = String::with_capacity(text.len() + 15);
        ssml.push_str("<speak>");
        for c in text.chars() {
            match c {
                '&' => ssml.push_str("&amp;"),
                '<' => ssml.push_str("&lt;"),
                '>' => ssml.push_str("&gt;"),
                c => ssml.push(c),
            }
        }
        ssml.push_str("</speak>");
        Self {
            speech_type: "SSML".to_string(),
            ssml,
        }
    }
}

impl ResponseEnvelope {
    /// Builds the response for `result`, echoing `session` back to the platform.
    pub fn new(result: &SpeechResult, session: SessionState) -> Self {
        Self {
            version: RESPONSE_VERSION.to_string(),
            session_attributes: session.into_map(),
            response: ResponseBody {
                output_speech: result.speech.as_deref().map(OutputSpeech::ssml),
                reprompt: result.reprompt.as_deref().map(|text| Reprompt {
                    output_speech: OutputSpeech::ssml(text),
                }),
                should_end_session: result.end_session,
            },
        }
    }
}
