//! Registry envelope codec and the dashboard read/write paths built on it.

use serde::Deserialize;
use serde_json::Value;
use uci_core::{DashboardConfig, DashboardSnapshot, Record, RegistryError};

mod controller;
mod submit;
mod transport;

#[cfg(test)]
mod testing;

pub use controller::{
    format_updated_at, ConnectionStatus, DashboardController, DashboardView, RefreshOutcome,
    RefreshPhase, RefreshTicket, StatusTone,
};
pub use submit::{
    Notifier, RecordForm, RecordSubmitter, SubmitControl, SubmitOutcome, Submission,
};
pub use transport::{HttpTransport, RegistryTransport};

/// Parse a read envelope from its JSON text.
pub fn parse_envelope_str(envelope_json: &str) -> Result<Vec<Record>, RegistryError> {
    let value: Value = serde_json::from_str(envelope_json)
        .map_err(|err| RegistryError::Transport(format!("invalid JSON envelope: {err}")))?;
    parse_envelope_value(&value)
}

/// Extract the record collection from a read envelope.
///
/// An "ok" envelope without a `data` array yields an empty collection, and
/// elements that are not objects become blank records so row positions are
/// preserved.
pub fn parse_envelope_value(envelope: &Value) -> Result<Vec<Record>, RegistryError> {
    ensure_ok(envelope)?;

    let Some(items) = envelope.get("data").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    Ok(items.iter().map(record_from_value).collect())
}

/// Check the `status` of any envelope, read or write.
pub fn ensure_ok(envelope: &Value) -> Result<(), RegistryError> {
    if !envelope.is_object() {
        return Err(RegistryError::Transport(format!(
            "expected an envelope object, received {}",
            value_kind(envelope)
        )));
    }

    match envelope.get("status").and_then(Value::as_str) {
        Some("ok") => Ok(()),
        _ => Err(RegistryError::Application {
            detail: failure_detail(envelope),
        }),
    }
}

/// Summarize a read envelope given as JSON text.
pub fn summarize_envelope_str(
    envelope_json: &str,
    config: &DashboardConfig,
) -> Result<DashboardSnapshot, RegistryError> {
    let records = parse_envelope_str(envelope_json)?;
    Ok(DashboardSnapshot::from_records(&records, config))
}

/// Summarize a read envelope given as a `serde_json::Value`.
pub fn summarize_envelope_value(
    envelope: &Value,
    config: &DashboardConfig,
) -> Result<DashboardSnapshot, RegistryError> {
    let records = parse_envelope_value(envelope)?;
    Ok(DashboardSnapshot::from_records(&records, config))
}

fn record_from_value(item: &Value) -> Record {
    if !item.is_object() {
        return Record::default();
    }
    Record::deserialize(item).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "unreadable registry row, keeping it blank");
        Record::default()
    })
}

/// The server's `detail`: strings verbatim, other non-null values as JSON
/// text (validation errors arrive as lists). Empty means absent.
fn failure_detail(envelope: &Value) -> Option<String> {
    match envelope.get("detail")? {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
