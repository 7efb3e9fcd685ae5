//! Datetime handling for the clinic API wire format.
//!
//! The clinic API exchanges timestamps as `"YYYY-MM-DD HH:MM:SS"` strings
//! with no zone marker; values are scoped to the requested calendar date.

pub const CLINIC_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// serde adapter for `NaiveDateTime` fields in the clinic wire format.
pub mod clinic_datetime {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::CLINIC_DATETIME_FORMAT;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(CLINIC_DATETIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, CLINIC_DATETIME_FORMAT)
            .map_err(serde::de::Error::custom)
    }
}
