//! Error types for dispatch.

use atomic_types::AttributeError;

/// Faults raised by a handler action.
///
/// These never reach the caller of [`Dispatcher::dispatch`](crate::Dispatcher::dispatch);
/// the dispatcher records them and answers with the apology.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// A session attribute could not be read or updated.
    #[error(transparent)]
    Attribute(#[from] AttributeError),

    /// The action returned speech with no words in it.
    #[error("handler {handler} produced empty speech")]
    EmptySpeech {
        /// Name of the offending handler.
        handler: &'static str,
    },

    /// The event lacked data the action needs.
    #[error("event is missing {what}")]
    Missing {
        /// Description of the missing data.
        what: &'static str,
    },
}

/// Errors surfaced by the dispatcher itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// No handler predicate accepted the event.
    #[error("no handler accepts request type {request_type}")]
    Unhandled {
        /// The request type of the rejected event.
        request_type: String,
    },

    /// A specific handler is listed after a generic one and could never match.
    #[error("handler {handler} is shadowed by generic handler {shadowed_by}")]
    Shadowed {
        /// The specific handler that can never be reached.
        handler: &'static str,
        /// The earlier generic handler that matches its events first.
        shadowed_by: &'static str,
    },
}
