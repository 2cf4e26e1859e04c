use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// The opaque identifier the server assigns to a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A product as listed by a category endpoint. Apart from the identifier,
/// every field is category-specific and kept exactly as the server sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: ProductId,
    fields: Map<String, Value>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductDecodeError {
    #[error("product is not a JSON object")]
    NotAnObject,
    #[error("product has no usable `{0}` field")]
    MissingId(String),
}

impl Product {
    pub fn new(id: ProductId, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    /// Reads a product out of a raw listing entry, taking its identifier from
    /// `id_field`. String and integer identifiers are both accepted.
    pub fn from_value(value: Value, id_field: &str) -> Result<Self, ProductDecodeError> {
        let Value::Object(fields) = value else {
            return Err(ProductDecodeError::NotAnObject);
        };
        let id = match fields.get(id_field) {
            Some(Value::String(id)) if !id.is_empty() => ProductId::new(id.clone()),
            Some(Value::Number(id)) => ProductId::new(id.to_string()),
            _ => return Err(ProductDecodeError::MissingId(id_field.to_string())),
        };
        Ok(Self { id, fields })
    }

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The field as it would be displayed. Missing and null fields have no
    /// text; numbers and booleans are printed as-is.
    pub fn field_text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// The image paths stored under `key`, in order. Entries that are not
    /// strings are skipped.
    pub fn images(&self, key: &str) -> Vec<&str> {
        match self.fields.get(key) {
            Some(Value::Array(images)) => images.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn price(&self) -> Option<String> {
        self.field_text("price")
    }
}
