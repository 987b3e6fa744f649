//! Record identity and redo payload types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EngineError;

/// Identity of a record within the engine repository: the data source it
/// belongs to plus its source-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub data_source: String,
    pub record_id: String,
}

impl RecordKey {
    #[must_use]
    pub fn new(data_source: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            record_id: record_id.into(),
        }
    }

    /// Extract the key fields from a record definition.
    ///
    /// Record definitions are JSON objects carrying at least `DATA_SOURCE`
    /// and `RECORD_ID`. Anything else about the payload is opaque to
    /// matchflow; it is passed through to the engine untouched.
    pub fn parse(definition: &str) -> Result<Self, EngineError> {
        let value: serde_json::Value = serde_json::from_str(definition)
            .map_err(|e| EngineError::bad_input("NOT_JSON", format!("record is not valid JSON: {e}")))?;
        let object = value
            .as_object()
            .ok_or_else(|| EngineError::bad_input("NOT_OBJECT", "record is not a JSON object"))?;

        let field = |name: &str| -> Result<String, EngineError> {
            match object.get(name).and_then(serde_json::Value::as_str) {
                Some(s) if !s.is_empty() => Ok(s.to_string()),
                _ => Err(EngineError::bad_input(
                    "MISSING_KEY_FIELD",
                    format!("record is missing a non-empty {name}"),
                )),
            }
        };

        Ok(Self {
            data_source: field("DATA_SOURCE")?,
            record_id: field("RECORD_ID")?,
        })
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.data_source, self.record_id)
    }
}

/// Opaque redo payload handed back by the engine's redo queue.
///
/// matchflow never interprets the contents; it only carries them back into
/// `process_redo_record`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedoRecord(pub String);

impl RedoRecord {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Disposition, ErrorCategory};

    #[test]
    fn parse_valid_record() {
        let key = RecordKey::parse(r#"{"DATA_SOURCE": "CUSTOMERS", "RECORD_ID": "1070", "NAME_FULL": "Edna Kusha"}"#)
            .unwrap();
        assert_eq!(key.data_source, "CUSTOMERS");
        assert_eq!(key.record_id, "1070");
    }

    #[test]
    fn parse_rejects_invalid_json() {
        let err = RecordKey::parse("{not json").unwrap_err();
        assert_eq!(err.category, ErrorCategory::BadInput);
        assert_eq!(err.disposition(), Disposition::MalformedInput);
    }

    #[test]
    fn parse_rejects_non_object() {
        let err = RecordKey::parse(r#"["CUSTOMERS", "1070"]"#).unwrap_err();
        assert_eq!(err.code, "NOT_OBJECT");
    }

    #[test]
    fn parse_rejects_missing_fields() {
        let err = RecordKey::parse(r#"{"DATA_SOURCE": "CUSTOMERS"}"#).unwrap_err();
        assert_eq!(err.code, "MISSING_KEY_FIELD");

        let err = RecordKey::parse(r#"{"DATA_SOURCE": "", "RECORD_ID": "1"}"#).unwrap_err();
        assert_eq!(err.code, "MISSING_KEY_FIELD");
    }

    #[test]
    fn display_formats_as_pair() {
        let key = RecordKey::new("WATCHLIST", "2092");
        assert_eq!(key.to_string(), "WATCHLIST/2092");
    }
}
