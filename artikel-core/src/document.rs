//! Typed document model and decoding from the REST wire format.
//!
//! The service encodes every field value as a single-key object naming its
//! type, e.g. `{"stringValue": "huis"}` or `{"integerValue": "42"}`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::errors::RequestError;

/// A typed field value stored in a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Timestamp(DateTime<Utc>),
    String(String),
    /// Base64 payload as sent by the service
    Bytes(String),
    /// Resource name of another document
    Reference(String),
    GeoPoint {
        latitude: f64,
        longitude: f64,
    },
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns the string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the value's type as used on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "nullValue",
            Value::Boolean(_) => "booleanValue",
            Value::Integer(_) => "integerValue",
            Value::Double(_) => "doubleValue",
            Value::Timestamp(_) => "timestampValue",
            Value::String(_) => "stringValue",
            Value::Bytes(_) => "bytesValue",
            Value::Reference(_) => "referenceValue",
            Value::GeoPoint { .. } => "geoPointValue",
            Value::Array(_) => "arrayValue",
            Value::Map(_) => "mapValue",
        }
    }

    /// Encodes the value in the REST wire format.
    pub fn to_wire(&self) -> serde_json::Value {
        match self {
            Value::Null => json!({ "nullValue": null }),
            Value::Boolean(b) => json!({ "booleanValue": b }),
            // 64-bit integers travel as strings
            Value::Integer(i) => json!({ "integerValue": i.to_string() }),
            Value::Double(d) if d.is_nan() => json!({ "doubleValue": "NaN" }),
            Value::Double(d) if d.is_infinite() => {
                let text = if d.is_sign_positive() {
                    "Infinity"
                } else {
                    "-Infinity"
                };
                json!({ "doubleValue": text })
            }
            Value::Double(d) => json!({ "doubleValue": d }),
            Value::Timestamp(ts) => json!({ "timestampValue": ts.to_rfc3339() }),
            Value::String(s) => json!({ "stringValue": s }),
            Value::Bytes(b) => json!({ "bytesValue": b }),
            Value::Reference(r) => json!({ "referenceValue": r }),
            Value::GeoPoint {
                latitude,
                longitude,
            } => json!({ "geoPointValue": { "latitude": latitude, "longitude": longitude } }),
            Value::Array(values) => {
                let values: Vec<_> = values.iter().map(Value::to_wire).collect();
                json!({ "arrayValue": { "values": values } })
            }
            Value::Map(fields) => {
                let fields: serde_json::Map<_, _> = fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_wire()))
                    .collect();
                json!({ "mapValue": { "fields": fields } })
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// A record returned by the document database.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{path}`
    pub name: String,
    pub fields: BTreeMap<String, Value>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

impl Document {
    /// Creates an empty document with the given resource name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
            create_time: None,
            update_time: None,
        }
    }

    /// Adds a field, replacing any previous value under the same name.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the field value, if present.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns a string field.
    ///
    /// Absent fields yield `Ok(None)`.
    ///
    /// # Errors
    /// - `RequestError::MalformedDocument` - The field holds a non-string value
    pub fn string_field(&self, name: &str) -> Result<Option<&str>, RequestError> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(RequestError::MalformedDocument {
                document: self.name.clone(),
                reason: format!("field '{name}' is {}, expected stringValue", other.type_name()),
            }),
        }
    }
}

/// Document as it appears in a `runQuery` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireDocument {
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, WireValue>,
    create_time: Option<String>,
    update_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum WireValue {
    NullValue,
    BooleanValue(bool),
    IntegerValue(serde_json::Value),
    DoubleValue(serde_json::Value),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(WireGeoPoint),
    ArrayValue(WireArray),
    MapValue(WireMap),
}

// Zero coordinates and empty containers are omitted on the wire.
#[derive(Debug, Deserialize)]
struct WireGeoPoint {
    #[serde(default)]
    latitude: f64,
    #[serde(default)]
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct WireArray {
    #[serde(default)]
    values: Vec<WireValue>,
}

#[derive(Debug, Deserialize)]
struct WireMap {
    #[serde(default)]
    fields: BTreeMap<String, WireValue>,
}

impl TryFrom<WireDocument> for Document {
    type Error = RequestError;

    fn try_from(wire: WireDocument) -> Result<Self, Self::Error> {
        let fields = decode_fields(wire.fields).map_err(|reason| RequestError::Parse {
            reason: format!("document '{}': {reason}", wire.name),
        })?;

        let create_time = wire
            .create_time
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(|reason| RequestError::Parse { reason })?;
        let update_time = wire
            .update_time
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(|reason| RequestError::Parse { reason })?;

        Ok(Document {
            name: wire.name,
            fields,
            create_time,
            update_time,
        })
    }
}

fn decode_fields(
    fields: BTreeMap<String, WireValue>,
) -> Result<BTreeMap<String, Value>, String> {
    fields
        .into_iter()
        .map(|(name, value)| decode_value(value).map(|value| (name, value)))
        .collect()
}

fn decode_value(wire: WireValue) -> Result<Value, String> {
    let value = match wire {
        WireValue::NullValue => Value::Null,
        WireValue::BooleanValue(b) => Value::Boolean(b),
        WireValue::IntegerValue(raw) => Value::Integer(parse_integer(&raw)?),
        WireValue::DoubleValue(raw) => Value::Double(parse_double(&raw)?),
        WireValue::TimestampValue(ts) => Value::Timestamp(parse_timestamp(&ts)?),
        WireValue::StringValue(s) => Value::String(s),
        WireValue::BytesValue(b) => Value::Bytes(b),
        WireValue::ReferenceValue(r) => Value::Reference(r),
        WireValue::GeoPointValue(point) => Value::GeoPoint {
            latitude: point.latitude,
            longitude: point.longitude,
        },
        WireValue::ArrayValue(array) => Value::Array(
            array
                .values
                .into_iter()
                .map(decode_value)
                .collect::<Result<_, _>>()?,
        ),
        WireValue::MapValue(map) => Value::Map(decode_fields(map.fields)?),
    };
    Ok(value)
}

fn parse_integer(raw: &serde_json::Value) -> Result<i64, String> {
    match raw {
        serde_json::Value::String(s) => s
            .parse()
            .map_err(|e| format!("invalid integerValue '{s}': {e}")),
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("integerValue {n} out of range")),
        other => Err(format!("invalid integerValue {other}")),
    }
}

fn parse_double(raw: &serde_json::Value) -> Result<f64, String> {
    match raw {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("doubleValue {n} not representable")),
        serde_json::Value::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            _ => Err(format!("invalid doubleValue '{s}'")),
        },
        other => Err(format!("invalid doubleValue {other}")),
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{raw}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: serde_json::Value) -> Result<Document, RequestError> {
        let wire: WireDocument = serde_json::from_value(body).unwrap();
        Document::try_from(wire)
    }

    #[test]
    fn test_decode_word_document() {
        let doc = decode(json!({
            "name": "projects/p/databases/(default)/documents/words/huis",
            "fields": {
                "word": { "stringValue": "huis" },
                "article": { "stringValue": "Een huis is een gebouw." }
            },
            "createTime": "2024-03-01T10:00:00.123456Z",
            "updateTime": "2024-03-02T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(doc.string_field("word").unwrap(), Some("huis"));
        assert_eq!(
            doc.string_field("article").unwrap(),
            Some("Een huis is een gebouw.")
        );
        assert!(doc.create_time.unwrap() < doc.update_time.unwrap());
    }

    #[test]
    fn test_decode_nested_values() {
        let doc = decode(json!({
            "name": "projects/p/databases/(default)/documents/words/x",
            "fields": {
                "count": { "integerValue": "42" },
                "ratio": { "doubleValue": 0.5 },
                "weird": { "doubleValue": "NaN" },
                "gone": { "nullValue": null },
                "tags": { "arrayValue": { "values": [
                    { "stringValue": "de" },
                    { "booleanValue": true }
                ] } },
                "empty": { "arrayValue": {} },
                "meta": { "mapValue": { "fields": {
                    "origin": { "geoPointValue": { "latitude": 52.37 } }
                } } }
            }
        }))
        .unwrap();

        assert_eq!(doc.field("count"), Some(&Value::Integer(42)));
        assert_eq!(doc.field("ratio"), Some(&Value::Double(0.5)));
        assert!(matches!(doc.field("weird"), Some(Value::Double(d)) if d.is_nan()));
        assert_eq!(doc.field("gone"), Some(&Value::Null));
        assert_eq!(
            doc.field("tags"),
            Some(&Value::Array(vec![Value::from("de"), Value::Boolean(true)]))
        );
        assert_eq!(doc.field("empty"), Some(&Value::Array(Vec::new())));

        let Some(Value::Map(meta)) = doc.field("meta") else {
            panic!("meta should be a map");
        };
        assert_eq!(
            meta.get("origin"),
            Some(&Value::GeoPoint {
                latitude: 52.37,
                longitude: 0.0
            })
        );
    }

    #[test]
    fn test_invalid_integer_is_parse_error() {
        let result = decode(json!({
            "name": "projects/p/databases/(default)/documents/words/x",
            "fields": { "count": { "integerValue": "many" } }
        }));

        assert!(matches!(result, Err(RequestError::Parse { .. })));
    }

    #[test]
    fn test_string_field_type_mismatch() {
        let doc = Document::new("words/huis").with_field("article", 7i64);

        assert!(matches!(
            doc.string_field("article"),
            Err(RequestError::MalformedDocument { .. })
        ));
        assert_eq!(doc.string_field("missing").unwrap(), None);
    }

    #[test]
    fn test_wire_encoding() {
        assert_eq!(Value::from("tafel").to_wire(), json!({ "stringValue": "tafel" }));
        assert_eq!(
            Value::Integer(-3).to_wire(),
            json!({ "integerValue": "-3" })
        );
        assert_eq!(
            Value::Double(f64::NEG_INFINITY).to_wire(),
            json!({ "doubleValue": "-Infinity" })
        );
    }
}
