//! JSON wire format for delivered batches

use crate::errors::Result;
use crate::event::LogEvent;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

const PAYLOAD_TYPE: &str = "logs";

#[derive(Debug, Serialize)]
struct LogsPayload<'a> {
    token: &'a str,
    #[serde(rename = "type")]
    payload_type: &'static str,
    logs: Vec<WireLog<'a>>,
}

#[derive(Debug, Serialize)]
struct WireLog<'a> {
    timestamp: String,
    body: &'a str,
    level: &'static str,
    attributes: &'a BTreeMap<String, String>,
}

impl<'a> From<&'a LogEvent> for WireLog<'a> {
    fn from(event: &'a LogEvent) -> Self {
        Self {
            timestamp: format_timestamp(&event.timestamp),
            body: &event.body,
            level: event.level.as_str(),
            attributes: &event.attributes,
        }
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.123Z`
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Encode a batch into the JSON document posted to the ingestion endpoint
pub fn encode_batch(token: &str, events: &[LogEvent]) -> Result<Vec<u8>> {
    let payload = LogsPayload {
        token,
        payload_type: PAYLOAD_TYPE,
        logs: events.iter().map(WireLog::from).collect(),
    };

    Ok(serde_json::to_vec(&payload)?)
}
