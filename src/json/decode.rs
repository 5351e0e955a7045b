//! Purpose: Typed decoding from the generic `Json` value.
//! Exports: `FromJson`, `DecodeError`, and the `Json::get` / `Json::decode` helpers.
//! Role: Capability trait dispatched statically by target type; no runtime registry.
//! Invariants: Primitive decodes accept exactly the documented tags, else `BadValue`.
//! Invariants: Missing object members surface as `KeyNotFound(key)`, never `BadValue`.
//! Invariants: Decoding is all-or-nothing; the first failure wins.

use super::Json;
use std::error::Error as StdError;
use std::fmt;
use time::{OffsetDateTime, PrimitiveDateTime};
use url::Url;

const RENDER_LIMIT: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub enum DecodeError {
    BadValue(Json),
    KeyNotFound(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::BadValue(json) => {
                let rendered = json.to_string();
                if rendered.chars().count() > RENDER_LIMIT {
                    let head: String = rendered.chars().take(RENDER_LIMIT).collect();
                    write!(f, "bad value ({}) {head}...", json.kind())
                } else {
                    write!(f, "bad value ({}) {rendered}", json.kind())
                }
            }
            DecodeError::KeyNotFound(key) => write!(f, "key not found \"{key}\""),
        }
    }
}

impl StdError for DecodeError {}

pub trait FromJson: Sized {
    fn from_json(json: &Json) -> Result<Self, DecodeError>;
}

impl Json {
    /// Decodes this value as `T`.
    pub fn decode<T: FromJson>(&self) -> Result<T, DecodeError> {
        T::from_json(self)
    }

    /// Looks up `key` and decodes the member as `T`.
    ///
    /// Fails with `KeyNotFound` when the key is absent and with `BadValue(self)`
    /// when `self` is not an object.
    pub fn get<T: FromJson>(&self, key: &str) -> Result<T, DecodeError> {
        if self.as_object().is_none() {
            return Err(DecodeError::BadValue(self.clone()));
        }
        match self.value_for(key) {
            Some(value) => T::from_json(value),
            None => Err(DecodeError::KeyNotFound(key.to_string())),
        }
    }

    /// Like `get`, but an absent key or a `null` member yields `None`.
    pub fn get_optional<T: FromJson>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        if self.as_object().is_some() && self.value_for(key).is_none() {
            return Ok(None);
        }
        self.get::<Option<T>>(key)
    }
}

impl FromJson for Json {
    fn from_json(json: &Json) -> Result<Self, DecodeError> {
        Ok(json.clone())
    }
}

impl FromJson for String {
    fn from_json(json: &Json) -> Result<Self, DecodeError> {
        match json {
            Json::String(value) => Ok(value.clone()),
            _ => Err(DecodeError::BadValue(json.clone())),
        }
    }
}

impl FromJson for i64 {
    fn from_json(json: &Json) -> Result<Self, DecodeError> {
        match json {
            Json::Integer(value) => Ok(*value),
            _ => Err(DecodeError::BadValue(json.clone())),
        }
    }
}

impl FromJson for bool {
    fn from_json(json: &Json) -> Result<Self, DecodeError> {
        match json {
            Json::Bool(value) => Ok(*value),
            _ => Err(DecodeError::BadValue(json.clone())),
        }
    }
}

impl FromJson for f64 {
    fn from_json(json: &Json) -> Result<Self, DecodeError> {
        json.as_f64()
            .ok_or_else(|| DecodeError::BadValue(json.clone()))
    }
}

impl<T: FromJson> FromJson for Option<T> {
    fn from_json(json: &Json) -> Result<Self, DecodeError> {
        match json {
            Json::Null => Ok(None),
            _ => T::from_json(json).map(Some),
        }
    }
}

impl<T: FromJson> FromJson for Vec<T> {
    fn from_json(json: &Json) -> Result<Self, DecodeError> {
        match json {
            Json::Array(items) => items.iter().map(T::from_json).collect(),
            _ => Err(DecodeError::BadValue(json.clone())),
        }
    }
}

impl FromJson for Url {
    fn from_json(json: &Json) -> Result<Self, DecodeError> {
        match json {
            Json::String(value) => {
                Url::parse(value).map_err(|_| DecodeError::BadValue(json.clone()))
            }
            _ => Err(DecodeError::BadValue(json.clone())),
        }
    }
}

impl FromJson for OffsetDateTime {
    fn from_json(json: &Json) -> Result<Self, DecodeError> {
        let decoded = match json {
            Json::Integer(seconds) => OffsetDateTime::from_unix_timestamp(*seconds).ok(),
            Json::Double(seconds) if seconds.is_finite() => {
                let nanos = (seconds * 1_000_000_000.0).round() as i128;
                OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
            }
            Json::String(value) => parse_timestamp(value),
            _ => None,
        };
        decoded.ok_or_else(|| DecodeError::BadValue(json.clone()))
    }
}

// Exactly `yyyy-MM-ddTHH:mm:ssZ`, read as UTC. `[year]` alone would admit a sign.
fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    if !value.as_bytes().first().is_some_and(u8::is_ascii_digit) {
        return None;
    }
    let format =
        time::macros::format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
    PrimitiveDateTime::parse(value, format)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}
