//! Request dispatch for the Atomic Energy skill.
//!
//! A [`Dispatcher`] holds an ordered table of [`Handler`]s. Each handler pairs
//! a predicate over the inbound [`Event`](atomic_types::Event) with an action
//! that reads and writes the [`SessionState`](atomic_types::SessionState) and
//! produces a [`SpeechResult`](atomic_types::SpeechResult). The first
//! predicate that matches wins.
//!
//! # Ordering
//!
//! Handlers are tiered. [`Tier::Specific`] handlers match one request kind or
//! one intent name; [`Tier::Generic`] handlers match a whole category (the
//! intent reflector matches every intent). The table must list every specific
//! handler before any generic one, and the dispatcher's own apology path comes
//! after both. [`Dispatcher::new`] rejects a table that breaks this.
//!
//! | # | Handler | Matches |
//! |---|---------|---------|
//! | 1 | `launch` | `LaunchRequest` |
//! | 2 | `help` | `AMAZON.HelpIntent` |
//! | 3 | `explain_benefit` | `ExplainNuclearBenefitIntent` |
//! | 4 | `climate_clock` | `ClimateClock` |
//! | 5 | `make_difference` | `MakeDifference` |
//! | 6 | `check_stats` | `CheckStats` |
//! | 7 | `cancel_stop` | `AMAZON.CancelIntent`, `AMAZON.StopIntent` |
//! | 8 | `fallback` | `AMAZON.FallbackIntent` |
//! | 9 | `session_ended` | `SessionEndedRequest` |
//! | 10 | `intent_reflector` | any `IntentRequest` |
//!
//! # Usage
//!
//! ```rust,ignore
//! use atomic_skill::{Dispatcher, TracingAuditSink};
//!
//! let dispatcher = Dispatcher::standard(Arc::new(TracingAuditSink))?;
//! let result = dispatcher.dispatch(&event, &mut session)?;
//! ```

mod audit;
mod dispatcher;
mod error;
pub mod handlers;

pub use audit::{AuditPayload, AuditRecord, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use dispatcher::{Action, Context, Dispatcher, Handler, Predicate, Tier};
pub use error::{ActionError, DispatchError};

#[cfg(test)]
mod tests;
