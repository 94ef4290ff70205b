//! JSON ingestion for seasonal facts.
//!
//! Accepts the three shapes the dashboard API and its exports produce:
//! - a bare array of fact objects
//! - the success envelope `{"seasonalData": [...]}`
//! - the failure envelope `{"error": "...", "details": "..."}`, which is
//!   surfaced as [`JsonIngestError::Upstream`]
//!
//! Elements are decoded one at a time so a single malformed object is
//! rejected without losing the rest of the batch.

use std::fmt;

use rta_seasonal::RawSeasonalFact;
use serde_json::Value;

use crate::{LoadedFacts, RejectedRow};

pub const DATA_KEY: &str = "seasonalData";

#[derive(Debug)]
pub enum JsonIngestError {
    Io(String),
    /// Not JSON, or JSON of a shape that carries no fact array.
    Decode(String),
    /// The payload is an error envelope.
    Upstream {
        error: String,
        details: Option<String>,
    },
}

impl fmt::Display for JsonIngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonIngestError::Io(msg) => write!(f, "json io error: {msg}"),
            JsonIngestError::Decode(msg) => write!(f, "json decode error: {msg}"),
            JsonIngestError::Upstream { error, details } => match details {
                Some(d) => write!(f, "upstream error: {error} ({d})"),
                None => write!(f, "upstream error: {error}"),
            },
        }
    }
}

impl std::error::Error for JsonIngestError {}

pub fn parse_json_str(src: &str) -> Result<LoadedFacts, JsonIngestError> {
    let value: Value =
        serde_json::from_str(src).map_err(|e| JsonIngestError::Decode(e.to_string()))?;
    facts_from_value(value)
}

/// Decode an already-parsed payload (the HTTP source hands its body here).
pub fn facts_from_value(value: Value) -> Result<LoadedFacts, JsonIngestError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if let Some(err) = map.get("error") {
                return Err(JsonIngestError::Upstream {
                    error: text_of(err),
                    details: map.get("details").map(text_of),
                });
            }
            match map.remove(DATA_KEY) {
                Some(Value::Array(items)) => items,
                Some(other) => {
                    return Err(JsonIngestError::Decode(format!(
                        "'{DATA_KEY}' must be an array, got {}",
                        kind_of(&other)
                    )))
                }
                None => {
                    return Err(JsonIngestError::Decode(format!(
                        "object payload has no '{DATA_KEY}' array"
                    )))
                }
            }
        }
        other => {
            return Err(JsonIngestError::Decode(format!(
                "expected an array or object, got {}",
                kind_of(&other)
            )))
        }
    };

    let mut out = LoadedFacts::default();
    for (i, item) in items.into_iter().enumerate() {
        let row = i as u64 + 1;
        let raw = item.to_string();
        match serde_json::from_value::<RawSeasonalFact>(item) {
            Ok(fact) => out.records.push(fact),
            Err(e) => {
                tracing::debug!(row, error = %e, "fact element rejected");
                out.rejected.push(RejectedRow {
                    row,
                    field: "record".to_string(),
                    raw,
                });
            }
        }
    }
    Ok(out)
}

fn text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rta_seasonal::Season;

    const ONE: &str = r#"{"Month":1,"Department":"GROCERY","Total_Spend":100.0,
        "Basket_Count":5,"Transaction_Count":10,"Avg_Spend":10.0,"Season":"Winter"}"#;

    #[test]
    fn bare_array() {
        let out = parse_json_str(&format!("[{ONE}]")).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].season, Season::Winter);
        assert_eq!(out.records[0].transaction_count, 10);
    }

    #[test]
    fn success_envelope() {
        let out = parse_json_str(&format!(r#"{{"seasonalData":[{ONE},{ONE}]}}"#)).unwrap();
        assert_eq!(out.records.len(), 2);
        assert!(out.rejected.is_empty());
    }

    #[test]
    fn empty_array_is_ok() {
        let out = parse_json_str("[]").unwrap();
        assert!(out.records.is_empty());
    }

    #[test]
    fn error_envelope_surfaces_upstream() {
        let err = parse_json_str(
            r#"{"error":"Failed to fetch seasonal analytics data","details":"timeout"}"#,
        )
        .unwrap_err();
        match err {
            JsonIngestError::Upstream { error, details } => {
                assert!(error.starts_with("Failed to fetch"));
                assert_eq!(details.as_deref(), Some("timeout"));
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn malformed_element_is_rejected_not_fatal() {
        let bad = r#"{"Month":2,"Department":"X","Total_Spend":1,"Basket_Count":-1,
            "Transaction_Count":1,"Season":"Winter"}"#;
        let out = parse_json_str(&format!("[{ONE},{bad}]")).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].row, 2);
        assert_eq!(out.rejected[0].field, "record");
    }

    #[test]
    fn camel_case_keys_accepted() {
        let src = r#"[{"month":7,"department":"Deli","totalSpend":9.5,"basketCount":1,
            "transactionCount":2,"season":"Summer"}]"#;
        let out = parse_json_str(src).unwrap();
        assert_eq!(out.records[0].avg_spend, 0.0);
        assert_eq!(out.records[0].season, Season::Summer);
    }

    #[test]
    fn wrong_shapes_are_decode_errors() {
        assert!(matches!(
            parse_json_str("42").unwrap_err(),
            JsonIngestError::Decode(_)
        ));
        assert!(matches!(
            parse_json_str(r#"{"rows":[]}"#).unwrap_err(),
            JsonIngestError::Decode(_)
        ));
        assert!(matches!(
            parse_json_str(r#"{"seasonalData":{}}"#).unwrap_err(),
            JsonIngestError::Decode(_)
        ));
        assert!(matches!(
            parse_json_str("not json").unwrap_err(),
            JsonIngestError::Decode(_)
        ));
    }
}
