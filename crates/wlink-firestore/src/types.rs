//! Firestore REST wire types and the serde bridge.
//!
//! Domain documents are plain serde types; `to_fields`/`from_document`
//! bridge them to the Firestore value encoding so repositories never
//! hand-convert individual fields.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::error::{StoreError, StoreResult};

/// Firestore document value encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String), // Firestore sends integers as strings
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapValue {
    pub fields: Option<HashMap<String, Value>>,
}

/// Firestore document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    pub name: Option<String>,
    /// Document fields
    pub fields: Option<HashMap<String, Value>>,
    /// Create time
    pub create_time: Option<String>,
    /// Update time
    pub update_time: Option<String>,
}

impl Document {
    /// Create a new document with the given fields.
    pub fn new(fields: HashMap<String, Value>) -> Self {
        Self {
            name: None,
            fields: Some(fields),
            create_time: None,
            update_time: None,
        }
    }
}

/// List documents response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    pub documents: Option<Vec<Document>>,
    pub next_page_token: Option<String>,
}

// ============================================================================
// Structured queries
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub r#where: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<Order>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_descendants: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_filter: Option<FieldFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFilter {
    pub field: FieldReference,
    /// Comparison operator ("EQUAL", ...)
    pub op: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub field: FieldReference,
    pub direction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
}

/// Build an EQUAL filter on a single field.
pub fn equals_filter(field_path: impl Into<String>, value: Value) -> Filter {
    Filter {
        field_filter: Some(FieldFilter {
            field: FieldReference {
                field_path: field_path.into(),
            },
            op: "EQUAL".to_string(),
            value,
        }),
    }
}

// ============================================================================
// Batch writes (atomic multi-document commits)
// ============================================================================

/// A single write operation in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Write {
    /// Update or insert a document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<Document>,

    /// Delete a document by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,

    /// Field mask for partial updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_mask: Option<DocumentMask>,

    /// Precondition for the write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_document: Option<Precondition>,
}

impl Write {
    /// A masked update of `doc_name`, touching only `mask` fields.
    pub fn masked_update(
        doc_name: String,
        fields: HashMap<String, Value>,
        mask: Vec<String>,
    ) -> Self {
        Self {
            update: Some(Document {
                name: Some(doc_name),
                fields: Some(fields),
                create_time: None,
                update_time: None,
            }),
            delete: None,
            update_mask: Some(DocumentMask { field_paths: mask }),
            current_document: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMask {
    pub field_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Precondition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWriteRequest {
    pub writes: Vec<Write>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// gRPC status code (0 = OK).
    pub code: Option<i32>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWriteResponse {
    pub write_results: Option<Vec<WriteResult>>,
    pub status: Option<Vec<Status>>,
}

impl BatchWriteResponse {
    pub fn empty() -> Self {
        Self {
            write_results: Some(vec![]),
            status: Some(vec![]),
        }
    }

    /// Check for partial failures in the batch response.
    pub fn check_for_errors(&self) -> StoreResult<()> {
        if let Some(statuses) = &self.status {
            for (i, status) in statuses.iter().enumerate() {
                if let Some(code) = status.code {
                    if code != 0 {
                        let msg = status.message.as_deref().unwrap_or("Unknown error");
                        return Err(StoreError::request_failed(format!(
                            "Batch write failed at index {}: {} (code {})",
                            i, msg, code
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Serde bridge
// ============================================================================

/// Serialize a domain document into Firestore fields.
pub fn to_fields<T: Serialize>(value: &T) -> StoreResult<HashMap<String, Value>> {
    let json = serde_json::to_value(value)?;
    match json {
        JsonValue::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, json_to_value(v)))
            .collect()),
        _ => Err(StoreError::serialization(
            "top-level document must serialize to an object",
        )),
    }
}

/// Serialize one field of a domain document (for masked updates).
pub fn to_field<T: Serialize>(value: &T) -> StoreResult<Value> {
    Ok(json_to_value(serde_json::to_value(value)?))
}

/// Deserialize a Firestore document into a domain document.
pub fn from_document<T: serde::de::DeserializeOwned>(doc: &Document) -> StoreResult<T> {
    let fields = doc
        .fields
        .as_ref()
        .ok_or_else(|| StoreError::serialization("document has no fields"))?;
    let json = JsonValue::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect(),
    );
    serde_json::from_value(json).map_err(|e| StoreError::serialization(e.to_string()))
}

fn json_to_value(json: JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::NullValue(()),
        JsonValue::Bool(b) => Value::BooleanValue(b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::IntegerValue(i.to_string())
            } else {
                Value::DoubleValue(n.as_f64().unwrap_or(0.0))
            }
        }
        JsonValue::String(s) => Value::StringValue(s),
        JsonValue::Array(items) => Value::ArrayValue(ArrayValue {
            values: Some(items.into_iter().map(json_to_value).collect()),
        }),
        JsonValue::Object(map) => Value::MapValue(MapValue {
            fields: Some(
                map.into_iter()
                    .map(|(k, v)| (k, json_to_value(v)))
                    .collect(),
            ),
        }),
    }
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::NullValue(()) => JsonValue::Null,
        Value::BooleanValue(b) => JsonValue::Bool(*b),
        Value::IntegerValue(s) => s
            .parse::<i64>()
            .map(|i| JsonValue::Number(i.into()))
            .unwrap_or(JsonValue::Null),
        Value::DoubleValue(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::TimestampValue(s) | Value::StringValue(s) | Value::BytesValue(s)
        | Value::ReferenceValue(s) => JsonValue::String(s.clone()),
        Value::ArrayValue(arr) => JsonValue::Array(
            arr.values
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(value_to_json)
                .collect(),
        ),
        Value::MapValue(map) => JsonValue::Object(
            map.fields
                .as_ref()
                .map(|fields| {
                    fields
                        .iter()
                        .map(|(k, v)| (k.clone(), value_to_json(v)))
                        .collect()
                })
                .unwrap_or_default(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: i64,
        ratio: f64,
        tags: Vec<String>,
        nested: Nested,
        missing: Option<String>,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Nested {
        flag: bool,
    }

    #[test]
    fn test_bridge_round_trip() {
        let sample = Sample {
            name: "backend".to_string(),
            count: 7,
            ratio: 0.5,
            tags: vec!["a".to_string(), "b".to_string()],
            nested: Nested { flag: true },
            missing: None,
        };

        let fields = to_fields(&sample).unwrap();
        assert!(matches!(fields.get("count"), Some(Value::IntegerValue(s)) if s == "7"));
        assert!(matches!(fields.get("ratio"), Some(Value::DoubleValue(_))));

        let doc = Document::new(fields);
        let back: Sample = from_document(&doc).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_bridge_rejects_non_object() {
        assert!(to_fields(&42i64).is_err());
    }

    #[test]
    fn test_timestamps_survive_the_bridge() {
        use chrono::{DateTime, Utc};

        #[derive(Serialize, Deserialize)]
        struct Stamped {
            at: DateTime<Utc>,
        }

        let stamped = Stamped { at: Utc::now() };
        let doc = Document::new(to_fields(&stamped).unwrap());
        let back: Stamped = from_document(&doc).unwrap();
        assert_eq!(back.at, stamped.at);
    }

    #[test]
    fn test_batch_response_surfaces_partial_failure() {
        let response = BatchWriteResponse {
            write_results: Some(vec![]),
            status: Some(vec![
                Status { code: Some(0), message: None },
                Status { code: Some(5), message: Some("missing".to_string()) },
            ]),
        };
        assert!(response.check_for_errors().is_err());
        assert!(BatchWriteResponse::empty().check_for_errors().is_ok());
    }
}
