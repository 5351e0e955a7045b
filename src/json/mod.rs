//! Purpose: Generic JSON value model plus the typed decode/encode protocol built on it.
//! Exports: `Json`, `parse`, `FromJson`, `ToJson`, `DecodeError`, `ParseError`.
//! Role: Single seam between raw response bytes and typed domain records.
//! Invariants: `Json` is a closed tagged union; values are immutable once parsed.
//! Invariants: Object members keep document order; lookup is exact and case-sensitive.
//! Invariants: Decoding is pure and deterministic (same input, same outcome).

mod decode;
mod encode;
mod parse;

pub use decode::{DecodeError, FromJson};
pub use encode::ToJson;
pub use parse::{ParseError, ParseFailureCategory, hint_for_error, parse};

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Debug, PartialEq)]
pub enum Json {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Array(Vec<Json>),
    Object(Vec<(String, Json)>),
}

impl Json {
    pub fn kind(&self) -> &'static str {
        match self {
            Json::Null => "null",
            Json::Bool(_) => "bool",
            Json::Integer(_) => "integer",
            Json::Double(_) => "double",
            Json::String(_) => "string",
            Json::Array(_) => "array",
            Json::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Json::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Json::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Json::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Json::Double(value) => Some(*value),
            Json::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Json::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Json]> {
        match self {
            Json::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, Json)]> {
        match self {
            Json::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Looks up `key` in an object. Duplicate keys resolve to the last occurrence.
    /// Returns `None` for non-objects as well as for absent keys.
    pub fn value_for(&self, key: &str) -> Option<&Json> {
        self.as_object()?
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

impl From<&str> for Json {
    fn from(value: &str) -> Self {
        Json::String(value.to_string())
    }
}

impl From<String> for Json {
    fn from(value: String) -> Self {
        Json::String(value)
    }
}

impl From<i64> for Json {
    fn from(value: i64) -> Self {
        Json::Integer(value)
    }
}

impl From<f64> for Json {
    fn from(value: f64) -> Self {
        Json::Double(value)
    }
}

impl From<bool> for Json {
    fn from(value: bool) -> Self {
        Json::Bool(value)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::new(ErrorKind::Parse)
            .with_message(err.to_string())
            .with_source(err)
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Error::new(ErrorKind::Decode)
            .with_message(err.to_string())
            .with_source(err)
    }
}
