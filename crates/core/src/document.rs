//! Raw documents and the typed decode boundary.
//!
//! A [`Document`] is the generic JSON object the remote API stores and returns.
//! Callers work with their own element types; [`decode`] and [`encode`] convert
//! between the two using serde.
//!
//! ## Field paths
//!
//! Nested fields are addressed with dotted paths (`"address.city"`). Numeric
//! segments index into arrays (`"tags.0"`).

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Name of the identifier field every stored document carries.
pub const ID_FIELD: &str = "_id";

/// A JSON object as stored by the remote API.
///
/// Wraps `serde_json::Map` so that only objects (never bare scalars or arrays)
/// can be sent as documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Document(Map::new())
    }

    /// Insert a top-level field, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get the value at a dotted path.
    ///
    /// Returns `None` if any segment is missing or the path crosses a scalar.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(obj) => obj.get(segment)?,
                Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// The document identifier, if present.
    pub fn id(&self) -> Option<&Value> {
        self.0.get(ID_FIELD)
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Consume into a `serde_json::Value::Object`.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Document(map)
    }
}

impl TryFrom<Value> for Document {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Document(map)),
            other => Err(Error::Serialization {
                reason: format!("expected a JSON object, got {}", json_type_name(&other)),
            }),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// Decode a raw document into the caller's element type.
pub fn decode<T: DeserializeOwned>(doc: Document) -> Result<T> {
    serde_json::from_value(doc.into_value()).map_err(|e| Error::Decode {
        reason: e.to_string(),
    })
}

/// Decode a bare JSON value (e.g. a distinct field value).
pub fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::Decode {
        reason: e.to_string(),
    })
}

/// Encode a caller value into a raw document.
///
/// Fails if the value does not serialize to a JSON object.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Document> {
    Document::try_from(serde_json::to_value(value)?)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
