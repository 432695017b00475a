use anyhow::{Context, Result};
use chrono::{NaiveDateTime, NaiveTime};

/// The format used for start and end times in the settings file and in prompts.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";

pub fn parse_time_of_day(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_OF_DAY_FORMAT)
        .with_context(|| format!("Expected time as HH:MM, got {value:?}"))
}

pub fn format_time_of_day(value: NaiveTime) -> String {
    value.format(TIME_OF_DAY_FORMAT).to_string()
}

/// Short clock form used in console messages.
pub fn format_clock(value: NaiveDateTime) -> String {
    value.format("%H:%M:%S").to_string()
}

/// Serde adapter storing [NaiveTime] as "HH:MM".
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::{format_time_of_day, parse_time_of_day};

    pub fn serialize<S: Serializer>(value: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_time_of_day(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_time_of_day(&raw).map_err(|e| D::Error::custom(format!("{e:#}")))
    }
}
