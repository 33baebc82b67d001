//! Audit trail for session endings and handler faults.
//!
//! The skill keeps no storage of its own. Audit records go to an
//! [`AuditSink`]; the default sink writes them to the tracing pipeline as
//! JSON so the hosting environment's log collector keeps them.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

/// Structured audit payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditPayload {
    /// The platform closed a session.
    SessionEnded {
        /// Platform-supplied reason, if any.
        reason: Option<String>,
    },

    /// A handler action faulted and the user heard the apology.
    ActionFailed {
        /// Handler that faulted.
        handler: String,
        /// Rendered fault.
        error: String,
    },

    /// No handler accepted the request.
    Unhandled {
        /// The request type nobody accepted.
        request_type: String,
    },
}

impl AuditPayload {
    /// Returns the `SCREAMING_SNAKE_CASE` event type string.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionEnded { .. } => "SESSION_ENDED",
            Self::ActionFailed { .. } => "ACTION_FAILED",
            Self::Unhandled { .. } => "UNHANDLED",
        }
    }
}

/// One audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    /// Platform request the entry belongs to.
    pub request_id: Option<String>,
    /// RFC 3339 timestamp.
    pub recorded_at: String,
    pub payload: AuditPayload,
}

impl AuditRecord {
    /// Stamps `payload` with a fresh id and the current time.
    pub fn new(request_id: Option<String>, payload: AuditPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id,
            recorded_at: chrono::Utc::now().to_rfc3339(),
            payload,
        }
    }
}

/// Destination for audit records.
pub trait AuditSink: Send + Sync {
    /// Records one entry. Must not fail the request it belongs to.
    fn record(&self, record: AuditRecord);
}

/// Writes audit records to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: AuditRecord) {
        let event_type = record.payload.event_type();
        match serde_json::to_string(&record) {
            Ok(json) => tracing::info!(target: "atomic_skill::audit", event_type, "{}", json),
            Err(e) => tracing::warn!(
                target: "atomic_skill::audit",
                event_type,
                "failed to serialize audit record: {}",
                e
            ),
        }
    }
}

/// Keeps audit records in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, oldest first.
    pub fn records(&self) -> Vec<AuditRecord> {
        match self.records.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: AuditRecord) {
        let mut records = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("audit buffer lock poisoned, recovering");
                poisoned.into_inner()
            }
        };
        records.push(record);
    }
}
