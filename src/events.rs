// Expansion and dictionary events
// Defines event payloads and the emission trait so hosts can observe the engine

use serde::Serialize;

use crate::field::FieldClassification;

/// Event names as constants for consistency
pub mod event_names {
    pub const EXPANSION_APPLIED: &str = "expansion_applied";
    pub const EXPANSION_FAILED: &str = "expansion_failed";
    pub const DICTIONARY_CHANGED: &str = "dictionary_changed";
}

/// Notification that the stored dictionary changed in some tier.
///
/// Carries no payload: receivers always reload and re-merge everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DictionaryChanged;

/// Payload for expansion_applied event
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionAppliedPayload {
    /// Token that was replaced
    pub token: String,
    /// Field the replacement happened in
    pub classification: FieldClassification,
    /// True when the clipboard-mediated path was needed
    pub used_fallback: bool,
    /// ISO 8601 timestamp
    pub timestamp: String,
}

/// Payload for expansion_failed event
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionFailedPayload {
    pub token: String,
    pub classification: FieldClassification,
    /// Why neither strategy could complete
    pub reason: String,
    pub timestamp: String,
}

/// Trait for emitting expansion events
/// Allows mocking in tests while hosts forward to their own UI or telemetry
pub trait ExpansionEventEmitter: Send + Sync {
    /// Emit expansion_applied event
    fn emit_expansion_applied(&self, payload: ExpansionAppliedPayload);

    /// Emit expansion_failed event
    fn emit_expansion_failed(&self, payload: ExpansionFailedPayload);
}

/// Emitter that writes events to the log
pub struct LogEventEmitter;

impl ExpansionEventEmitter for LogEventEmitter {
    fn emit_expansion_applied(&self, payload: ExpansionAppliedPayload) {
        crate::debug!(
            "{}: '{}' in {} field (fallback: {})",
            event_names::EXPANSION_APPLIED,
            payload.token,
            payload.classification,
            payload.used_fallback
        );
    }

    fn emit_expansion_failed(&self, payload: ExpansionFailedPayload) {
        crate::debug!(
            "{}: '{}' in {} field: {}",
            event_names::EXPANSION_FAILED,
            payload.token,
            payload.classification,
            payload.reason
        );
    }
}

/// Get current timestamp in ISO 8601 format
pub fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
