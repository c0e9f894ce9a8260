//! Watched-entity view over an externally owned store document.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::event::{EventType, NormalizedEvent};
use crate::names::{FIELD_COMPANY_NUMBER, FIELD_IS_WATCHED};

/// A company record flagged for event emission.
///
/// Only `companyNumber` and `isWatched` are interpreted; everything else in
/// the document is carried along untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedEntity {
    pub company_number: String,

    #[serde(default)]
    pub is_watched: bool,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl WatchedEntity {
    /// Read the interpreted fields out of a raw store document.
    ///
    /// A document without a non-empty string `companyNumber` cannot produce
    /// a valid event and is rejected.
    pub fn from_document(document: &serde_json::Value) -> Result<Self, CoreError> {
        let company_number = document
            .get(FIELD_COMPANY_NUMBER)
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CoreError::missing_field(FIELD_COMPANY_NUMBER))?;

        let is_watched = document
            .get(FIELD_IS_WATCHED)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);

        let mut extra = document.as_object().cloned().unwrap_or_default();
        extra.remove(FIELD_COMPANY_NUMBER);
        extra.remove(FIELD_IS_WATCHED);

        Ok(Self {
            company_number: company_number.to_string(),
            is_watched,
            extra,
        })
    }

    /// Build the event announcing a change to this entity.
    pub fn to_event(&self, event_type: EventType) -> NormalizedEvent {
        NormalizedEvent::new(self.company_number.clone(), event_type)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_interpreted_fields_and_keeps_the_rest() {
        let doc = json!({"companyNumber": "A1", "isWatched": true, "name": "Acme Ltd"});
        let entity = WatchedEntity::from_document(&doc).unwrap();

        assert_eq!(entity.company_number, "A1");
        assert!(entity.is_watched);
        assert_eq!(entity.extra["name"], "Acme Ltd");
        assert!(!entity.extra.contains_key("companyNumber"));
    }

    #[test]
    fn missing_watch_flag_reads_as_false() {
        let entity = WatchedEntity::from_document(&json!({"companyNumber": "B1"})).unwrap();
        assert!(!entity.is_watched);
    }

    #[test]
    fn missing_or_blank_company_number_is_rejected() {
        assert_matches!(
            WatchedEntity::from_document(&json!({"isWatched": true})),
            Err(CoreError::Protocol(_))
        );
        assert_matches!(
            WatchedEntity::from_document(&json!({"companyNumber": "  ", "isWatched": true})),
            Err(CoreError::Protocol(_))
        );
        assert_matches!(
            WatchedEntity::from_document(&json!({"companyNumber": 42, "isWatched": true})),
            Err(CoreError::Protocol(_))
        );
    }

    #[test]
    fn to_event_carries_company_number() {
        let entity = WatchedEntity::from_document(&json!({"companyNumber": "A2"})).unwrap();
        let event = entity.to_event(EventType::AccountsFiled);
        assert_eq!(event.company_number, "A2");
        assert_eq!(event.event_type, "accounts-filed");
    }
}
