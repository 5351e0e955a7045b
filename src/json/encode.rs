//! Purpose: Re-encode typed values back into `Json` and JSON text.
//! Exports: `ToJson`, plus `Serialize`/`Display` for `Json`.
//! Role: Mirror of the decode protocol used for `--json` output and round-trip checks.
//! Invariants: Object member order is preserved when rendering text.
//! Invariants: For every type here, decoding its encoding yields an equal value
//! (whole-second timestamps; fractional ones go through a lossy double).

use super::Json;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;
use time::{OffsetDateTime, UtcOffset};
use url::Url;

pub trait ToJson {
    fn to_json(&self) -> Json;
}

impl ToJson for Json {
    fn to_json(&self) -> Json {
        self.clone()
    }
}

impl ToJson for String {
    fn to_json(&self) -> Json {
        Json::String(self.clone())
    }
}

impl ToJson for str {
    fn to_json(&self) -> Json {
        Json::String(self.to_string())
    }
}

impl ToJson for i64 {
    fn to_json(&self) -> Json {
        Json::Integer(*self)
    }
}

impl ToJson for bool {
    fn to_json(&self) -> Json {
        Json::Bool(*self)
    }
}

impl ToJson for f64 {
    fn to_json(&self) -> Json {
        Json::Double(*self)
    }
}

impl<T: ToJson> ToJson for Option<T> {
    fn to_json(&self) -> Json {
        match self {
            Some(value) => value.to_json(),
            None => Json::Null,
        }
    }
}

impl<T: ToJson> ToJson for Vec<T> {
    fn to_json(&self) -> Json {
        Json::Array(self.iter().map(ToJson::to_json).collect())
    }
}

impl ToJson for Url {
    fn to_json(&self) -> Json {
        Json::String(self.as_str().to_string())
    }
}

impl ToJson for OffsetDateTime {
    fn to_json(&self) -> Json {
        let utc = self.to_offset(UtcOffset::UTC);
        if utc.nanosecond() != 0 {
            return Json::Double(utc.unix_timestamp_nanos() as f64 / 1_000_000_000.0);
        }
        // The pattern only spells unsigned four-digit years.
        if !(0..=9999).contains(&utc.year()) {
            return Json::Integer(utc.unix_timestamp());
        }
        let format =
            time::macros::format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
        match utc.format(format) {
            Ok(text) => Json::String(text),
            Err(_) => Json::Integer(utc.unix_timestamp()),
        }
    }
}

impl Serialize for Json {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Json::Null => serializer.serialize_unit(),
            Json::Bool(value) => serializer.serialize_bool(*value),
            Json::Integer(value) => serializer.serialize_i64(*value),
            Json::Double(value) => serializer.serialize_f64(*value),
            Json::String(value) => serializer.serialize_str(value),
            Json::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Json::Object(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (key, value) in members {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl fmt::Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
