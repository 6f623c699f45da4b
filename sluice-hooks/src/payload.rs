//! Conversion between the gateway's native field maps and the structured
//! payload exchanged with hook callbacks.
//!
//! The gateway's internals speak [`Fields`], a dynamic map whose leaves
//! include host types such as durations, timestamps, and raw byte buffers.
//! Callbacks speak the structured payload, a JSON-equivalent tree
//! ([`serde_json::Value`]). Encoding normalizes host types into the
//! primitive set:
//!
//! - durations become floating-point seconds
//! - timestamps become RFC 3339 strings
//! - byte buffers become standard-alphabet base64 strings
//!
//! Decoding is lossy with respect to the host types: a duration returned by
//! a callback stays a number. Hosts that need typed values back must
//! re-parse them.

use std::collections::HashMap;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use crate::error::HookError;

/// The gateway's native payload map.
pub type Fields = HashMap<String, FieldValue>;

/// A leaf or subtree of a native payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Duration(Duration),
    Timestamp(DateTime<Utc>),
    Bytes(Vec<u8>),
    List(Vec<FieldValue>),
    Map(Fields),
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<Duration> for FieldValue {
    fn from(value: Duration) -> Self {
        FieldValue::Duration(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

/// Encode a native payload into the structured form.
///
/// An empty map encodes to an empty object, never to null. The only failure
/// is [`HookError::CastFailed`], raised for values with no structured
/// representation (non-finite numbers).
pub fn encode(fields: &Fields) -> Result<Value, HookError> {
    let mut object = Map::with_capacity(fields.len());
    for (key, value) in fields {
        object.insert(key.clone(), encode_value(key, value)?);
    }
    Ok(Value::Object(object))
}

fn encode_value(key: &str, value: &FieldValue) -> Result<Value, HookError> {
    let encoded = match value {
        FieldValue::Null => Value::Null,
        FieldValue::Bool(value) => Value::Bool(*value),
        FieldValue::Int(value) => Value::Number((*value).into()),
        FieldValue::Float(value) => Number::from_f64(*value)
            .map(Value::Number)
            .ok_or_else(|| {
                HookError::CastFailed(format!("field `{key}` is not a finite number"))
            })?,
        FieldValue::Str(value) => Value::String(value.clone()),
        FieldValue::Duration(value) => Number::from_f64(value.as_secs_f64())
            .map(Value::Number)
            .ok_or_else(|| {
                HookError::CastFailed(format!("field `{key}` holds an unrepresentable duration"))
            })?,
        FieldValue::Timestamp(value) => {
            Value::String(value.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        FieldValue::Bytes(value) => Value::String(BASE64.encode(value)),
        FieldValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| encode_value(key, item))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        FieldValue::Map(nested) => encode(nested)?,
    };
    Ok(encoded)
}

/// Decode a structured payload back into a native map.
///
/// Null and non-object payloads decode to an empty map, so the host never
/// observes a null result.
pub fn decode(payload: &Value) -> Fields {
    match payload.as_object() {
        Some(object) => object
            .iter()
            .map(|(key, value)| (key.clone(), decode_value(value)))
            .collect(),
        None => Fields::new(),
    }
}

fn decode_value(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(value) => FieldValue::Bool(*value),
        Value::Number(number) => number
            .as_i64()
            .map(FieldValue::Int)
            .or_else(|| number.as_f64().map(FieldValue::Float))
            .unwrap_or(FieldValue::Null),
        Value::String(value) => FieldValue::Str(value.clone()),
        Value::Array(items) => FieldValue::List(items.iter().map(decode_value).collect()),
        Value::Object(_) => FieldValue::Map(decode(value)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_map_encodes_to_empty_object() {
        let encoded = encode(&Fields::new()).expect("encode empty map");
        assert_eq!(encoded, json!({}));
    }

    #[test]
    fn durations_encode_as_seconds() {
        let fields = Fields::from([(
            "idleTimeout".to_string(),
            FieldValue::Duration(Duration::from_millis(2500)),
        )]);
        let encoded = encode(&fields).expect("encode duration");
        assert_eq!(encoded, json!({"idleTimeout": 2.5}));
    }

    #[test]
    fn timestamps_encode_as_rfc3339() {
        let moment = Utc
            .with_ymd_and_hms(2025, 1, 1, 12, 30, 0)
            .single()
            .expect("valid timestamp");
        let fields = Fields::from([("startedAt".to_string(), FieldValue::Timestamp(moment))]);
        let encoded = encode(&fields).expect("encode timestamp");
        assert_eq!(encoded, json!({"startedAt": "2025-01-01T12:30:00.000Z"}));
    }

    #[test]
    fn bytes_encode_as_base64() {
        let fields = Fields::from([(
            "preamble".to_string(),
            FieldValue::Bytes(b"sluice".to_vec()),
        )]);
        let encoded = encode(&fields).expect("encode bytes");
        assert_eq!(encoded, json!({"preamble": "c2x1aWNl"}));
    }

    #[test]
    fn non_finite_floats_fail_to_cast() {
        let fields = Fields::from([("rate".to_string(), FieldValue::Float(f64::NAN))]);
        let err = encode(&fields).expect_err("NaN has no structured form");
        assert!(matches!(err, HookError::CastFailed(_)));
    }

    #[test]
    fn nested_structures_round_trip() {
        let fields = Fields::from([(
            "listener".to_string(),
            FieldValue::Map(Fields::from([
                ("port".to_string(), FieldValue::Int(5432)),
                (
                    "tags".to_string(),
                    FieldValue::List(vec![
                        FieldValue::Str("pg".to_string()),
                        FieldValue::Str("primary".to_string()),
                    ]),
                ),
            ])),
        )]);
        let encoded = encode(&fields).expect("encode nested");
        assert_eq!(
            encoded,
            json!({"listener": {"port": 5432, "tags": ["pg", "primary"]}})
        );
        assert_eq!(decode(&encoded), fields);
    }

    #[test]
    fn decode_is_lossy_for_host_types() {
        let fields = Fields::from([(
            "idleTimeout".to_string(),
            FieldValue::Duration(Duration::from_secs(4)),
        )]);
        let encoded = encode(&fields).expect("encode duration");
        let decoded = decode(&encoded);
        assert_eq!(
            decoded.get("idleTimeout"),
            Some(&FieldValue::Float(4.0)),
            "durations come back as plain numbers"
        );
    }

    #[test]
    fn null_payload_decodes_to_empty_map() {
        assert_eq!(decode(&Value::Null), Fields::new());
        assert_eq!(decode(&json!("not an object")), Fields::new());
    }

    #[test]
    fn integers_survive_the_round_trip() {
        let fields = Fields::from([("connections".to_string(), FieldValue::Int(42))]);
        let encoded = encode(&fields).expect("encode int");
        assert_eq!(decode(&encoded), fields);
    }
}
