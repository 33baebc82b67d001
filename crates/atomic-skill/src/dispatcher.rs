//! Ordered predicate dispatch with an apology fallback.

use crate::audit::{AuditPayload, AuditRecord, AuditSink};
use crate::error::{ActionError, DispatchError};
use crate::handlers;
use atomic_types::{Event, SessionState, SpeechResult};
use std::fmt;
use std::sync::Arc;

/// Decides whether a handler accepts an event.
pub type Predicate = fn(&Event) -> bool;

/// Produces the response for an accepted event.
pub type Action = fn(&mut Context<'_>) -> Result<SpeechResult, ActionError>;

/// How broadly a handler's predicate matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Matches a single request kind or intent name.
    Specific,
    /// Matches a whole request category. Must follow every specific handler.
    Generic,
}

/// A predicate/action pair.
#[derive(Clone, Copy)]
pub struct Handler {
    pub name: &'static str,
    pub tier: Tier,
    pub predicate: Predicate,
    pub action: Action,
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("tier", &self.tier)
            .finish()
    }
}

/// What an action gets to work with.
pub struct Context<'a> {
    pub event: &'a Event,
    /// Working copy of the session; committed only if the action succeeds.
    pub session: &'a mut SessionState,
    audit: &'a dyn AuditSink,
}

impl<'a> Context<'a> {
    pub fn new(event: &'a Event, session: &'a mut SessionState, audit: &'a dyn AuditSink) -> Self {
        Self {
            event,
            session,
            audit,
        }
    }

    /// Records an audit entry tagged with the current request id.
    pub fn audit(&self, payload: AuditPayload) {
        self.audit
            .record(AuditRecord::new(self.event.request_id.clone(), payload));
    }
}

/// Routes events to the first matching handler.
///
/// The handler list is fixed at construction. The dispatcher holds no
/// per-session state and can be shared across requests.
pub struct Dispatcher {
    handlers: Vec<Handler>,
    audit: Arc<dyn AuditSink>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Builds a dispatcher over `handlers`, evaluated in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Shadowed`] if a [`Tier::Specific`] handler
    /// follows a [`Tier::Generic`] one.
    pub fn new(
        handlers: impl Into<Vec<Handler>>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, DispatchError> {
        let handlers = handlers.into();
        let mut generic: Option<&Handler> = None;
        for handler in &handlers {
            match (handler.tier, generic) {
                (Tier::Generic, None) => generic = Some(handler),
                (Tier::Specific, Some(g)) => {
                    return Err(DispatchError::Shadowed {
                        handler: handler.name,
                        shadowed_by: g.name,
                    });
                }
                _ => {}
            }
        }
        Ok(Self { handlers, audit })
    }

    /// Builds a dispatcher over the skill's handler table.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::new`].
    pub fn standard(audit: Arc<dyn AuditSink>) -> Result<Self, DispatchError> {
        Self::new(handlers::HANDLERS, audit)
    }

    /// Handler names in evaluation order.
    pub fn handler_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.iter().map(|h| h.name)
    }

    /// The first handler whose predicate accepts `event`.
    pub fn select(&self, event: &Event) -> Option<&Handler> {
        self.handlers.iter().find(|h| (h.predicate)(event))
    }

    /// Handles one event.
    ///
    /// The action runs against a copy of `session`, which replaces `session`
    /// only when the action succeeds. Action faults are logged, audited, and
    /// answered with [`handlers::apology`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Unhandled`] if no handler accepts the event.
    pub fn dispatch(
        &self,
        event: &Event,
        session: &mut SessionState,
    ) -> Result<SpeechResult, DispatchError> {
        let Some(handler) = self.select(event) else {
            let request_type = event.kind.as_str().to_string();
            tracing::warn!(
                request_type = %request_type,
                request_id = event.request_id.as_deref().unwrap_or("-"),
                "no handler accepts request"
            );
            self.audit.record(AuditRecord::new(
                event.request_id.clone(),
                AuditPayload::Unhandled {
                    request_type: request_type.clone(),
                },
            ));
            return Err(DispatchError::Unhandled { request_type });
        };

        let mut working = session.clone();
        let outcome = {
            let mut ctx = Context::new(event, &mut working, self.audit.as_ref());
            (handler.action)(&mut ctx)
        }
        .and_then(|result| {
            if result.is_blank() {
                Err(ActionError::EmptySpeech {
                    handler: handler.name,
                })
            } else {
                Ok(result)
            }
        });

        match outcome {
            Ok(result) => {
                *session = working;
                tracing::debug!(
                    handler = handler.name,
                    end_session = result.end_session,
                    "request handled"
                );
                Ok(result)
            }
            Err(error) => {
                tracing::error!(
                    handler = handler.name,
                    request_id = event.request_id.as_deref().unwrap_or("-"),
                    "handler failed, answering with apology: {}",
                    error
                );
                self.audit.record(AuditRecord::new(
                    event.request_id.clone(),
                    AuditPayload::ActionFailed {
                        handler: handler.name.to_string(),
                        error: error.to_string(),
                    },
                ));
                Ok(handlers::apology())
            }
        }
    }
}
