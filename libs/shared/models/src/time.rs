//! Local date-time handling shared by the wire format and the store.
//!
//! Both sides use ISO local date-times without offset, e.g. `2025-03-01T09:00:00`.
//! Input may omit the seconds.

use chrono::NaiveDateTime;

pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const FORMAT_WITH_FRACTION: &str = "%Y-%m-%dT%H:%M:%S%.f";
const FORMAT_MINUTES: &str = "%Y-%m-%dT%H:%M";

pub fn parse(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, FORMAT_WITH_FRACTION)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, FORMAT_MINUTES))
        .ok()
}

pub fn format(value: &NaiveDateTime) -> String {
    value.format(FORMAT).to_string()
}

/// `#[serde(with = "shared_models::time::wire")]`
pub mod wire {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid date-time: {}", raw)))
    }
}

/// Like [`wire`] for optional fields; pair with `#[serde(default)]`.
pub mod wire_opt {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&super::format(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date-time: {}", raw))),
            None => Ok(None),
        }
    }
}
