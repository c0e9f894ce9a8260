//! The canonical event schema carried on the `events-normalised` queue.
//!
//! Wire format (UTF-8 JSON object):
//!
//! ```text
//! {"companyNumber": "A1", "eventType": "accounts-filed",
//!  "timestamp": "2024-01-15T10:30:00Z", "metadata": {...}}
//! ```
//!
//! `metadata` is omitted when absent. `timestamp` is optional on read.

use std::fmt;
use std::str::FromStr;

use chrono::{SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::names::{FIELD_COMPANY_NUMBER, FIELD_EVENT_TYPE};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

/// The enumerated set of event types this system produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    /// A company filed its annual accounts.
    AccountsFiled,
}

impl EventType {
    /// Every defined event type.
    pub const ALL: &'static [EventType] = &[EventType::AccountsFiled];

    /// Wire name, e.g. `"accounts-filed"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::AccountsFiled => "accounts-filed",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Protocol(format!("unknown event type `{s}`")))
    }
}

// ---------------------------------------------------------------------------
// NormalizedEvent
// ---------------------------------------------------------------------------

/// One state change of one watched company.
///
/// `event_type` is kept as a string on the wire type so that a consumer can
/// still handle events from producers that know more types than this build
/// does. Producers construct events through [`NormalizedEvent::new`], which
/// only accepts an [`EventType`].
///
/// `timestamp` is carried as received. Only `companyNumber` and `eventType`
/// are required; a missing or unparsable timestamp never rejects a message.
/// Use [`NormalizedEvent::parsed_timestamp`] when the instant is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    pub company_number: String,

    pub event_type: String,

    /// Construction instant as written by the producer.
    #[serde(
        default,
        deserialize_with = "iso_seconds::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl NormalizedEvent {
    /// Create an event stamped with the current UTC instant.
    pub fn new(company_number: impl Into<String>, event_type: EventType) -> Self {
        Self {
            company_number: company_number.into(),
            event_type: event_type.as_str().to_string(),
            timestamp: None,
            metadata: None,
        }
        .with_timestamp(Utc::now())
    }

    /// Override the timestamp (truncated to whole seconds).
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(iso_seconds::format(&timestamp.trunc_subsecs(0)));
        self
    }

    /// Attach an opaque metadata object.
    pub fn with_metadata(mut self, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// The event type, if it belongs to the set this build knows about.
    pub fn known_type(&self) -> Option<EventType> {
        self.event_type.parse().ok()
    }

    /// The timestamp as an instant. `Ok(None)` when the message carried none.
    pub fn parsed_timestamp(&self) -> Result<Option<Timestamp>, CoreError> {
        self.timestamp
            .as_deref()
            .map(|raw| iso_seconds::parse(raw).map_err(CoreError::Protocol))
            .transpose()
    }

    /// Check the required-field invariant.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.company_number.trim().is_empty() {
            return Err(CoreError::missing_field(FIELD_COMPANY_NUMBER));
        }
        if self.event_type.trim().is_empty() {
            return Err(CoreError::missing_field(FIELD_EVENT_TYPE));
        }
        Ok(())
    }

    /// Serialize to the JSON message body.
    pub fn to_json(&self) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(self)
            .map_err(|e| CoreError::Protocol(format!("failed to serialize event: {e}")))
    }

    /// Parse and validate a JSON message body.
    pub fn from_json(body: &[u8]) -> Result<Self, CoreError> {
        let event: Self = serde_json::from_slice(body)
            .map_err(|e| CoreError::Protocol(format!("invalid event body: {e}")))?;
        event.validate()?;
        Ok(event)
    }
}

/// ISO-8601 timestamps with second precision.
///
/// Written as `2024-01-15T10:30:00Z`. Parsed leniently: RFC 3339 with any
/// offset, or a naive `2024-01-15T10:30:00[.ffffff]` interpreted as UTC.
pub mod iso_seconds {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer};

    use crate::types::Timestamp;

    pub fn format(ts: &Timestamp) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Accept any JSON value for a timestamp field. Strings are kept as-is,
    /// other scalars are rendered to text, `null` becomes `None`.
    pub fn lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(raw) => Some(raw),
            other => Some(other.to_string()),
        })
    }

    /// Parse a timestamp string in either accepted form.
    pub fn parse(raw: &str) -> Result<Timestamp, String> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("invalid ISO-8601 timestamp `{raw}`: {e}"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
