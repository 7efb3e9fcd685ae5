use chrono::{Local, NaiveDate};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::models::ScheduleError;

/// Today in the server's local zone, truncated to a calendar date.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Date-only past check. Both sides are already calendar dates, so midnight
/// normalization is structural; today is never past. Every date entry point
/// (calendar grid, day strip) must route through this one guard so they all
/// disable exactly the same dates.
pub fn is_past_date(candidate: NaiveDate, today: NaiveDate) -> bool {
    candidate < today
}

fn date_only_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static pattern"))
}

fn datetime_prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]").expect("static pattern"))
}

/// Normalize the loosely-shaped date payloads clients send into one
/// canonical calendar date. All format sniffing lives here; call sites only
/// ever see a `NaiveDate`.
///
/// Accepted shapes: `"YYYY-MM-DD"`, datetime strings (`T` or space
/// separated, any trailing time/zone suffix - truncated to the date),
/// `{"year": .., "month": .., "day": ..}` objects from the calendar grid,
/// and `{"date": <any of the above>}` wrappers from the day strip.
pub fn parse_selected_date(value: &Value) -> Result<NaiveDate, ScheduleError> {
    match value {
        Value::String(raw) => {
            let raw = raw.trim();
            if date_only_pattern().is_match(raw) {
                return NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| ScheduleError::InvalidDate(raw.to_string()));
            }
            if datetime_prefix_pattern().is_match(raw) {
                return NaiveDate::parse_from_str(&raw[..10], "%Y-%m-%d")
                    .map_err(|_| ScheduleError::InvalidDate(raw.to_string()));
            }
            Err(ScheduleError::InvalidDate(raw.to_string()))
        }
        Value::Object(fields) => {
            if let Some(inner) = fields.get("date") {
                return parse_selected_date(inner);
            }

            let ymd = (
                fields.get("year").and_then(Value::as_i64),
                fields.get("month").and_then(Value::as_i64),
                fields.get("day").and_then(Value::as_i64),
            );
            if let (Some(year), Some(month), Some(day)) = ymd {
                return NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
                    .ok_or_else(|| ScheduleError::InvalidDate(value.to_string()));
            }

            Err(ScheduleError::InvalidDate(value.to_string()))
        }
        other => Err(ScheduleError::InvalidDate(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn today_is_never_past() {
        let today = day(2025, 3, 10);
        assert!(!is_past_date(today, today));
    }

    #[test]
    fn yesterday_is_past_tomorrow_is_not() {
        let today = day(2025, 3, 10);
        assert!(is_past_date(day(2025, 3, 9), today));
        assert!(!is_past_date(day(2025, 3, 11), today));
    }

    #[test]
    fn plain_date_string_parses() {
        let parsed = parse_selected_date(&json!("2025-03-10")).unwrap();
        assert_eq!(parsed, day(2025, 3, 10));
    }

    #[test]
    fn datetime_strings_truncate_to_the_date() {
        assert_eq!(
            parse_selected_date(&json!("2025-03-10 14:30:00")).unwrap(),
            day(2025, 3, 10)
        );
        assert_eq!(
            parse_selected_date(&json!("2025-03-10T14:30:00Z")).unwrap(),
            day(2025, 3, 10)
        );
    }

    #[test]
    fn calendar_grid_object_parses() {
        let parsed = parse_selected_date(&json!({"year": 2025, "month": 3, "day": 10})).unwrap();
        assert_eq!(parsed, day(2025, 3, 10));
    }

    #[test]
    fn wrapped_date_object_parses() {
        let parsed = parse_selected_date(&json!({"date": "2025-03-10"})).unwrap();
        assert_eq!(parsed, day(2025, 3, 10));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_selected_date(&json!("next tuesday")).is_err());
        assert!(parse_selected_date(&json!(42)).is_err());
        assert!(parse_selected_date(&json!({"month": 3, "day": 10})).is_err());
        assert!(parse_selected_date(&json!({"year": 2025, "month": 13, "day": 40})).is_err());
    }

    #[test]
    fn both_picker_shapes_disable_the_same_dates() {
        // The grid sends an object, the strip sends a string; after
        // normalization the guard must agree on every date.
        let today = day(2025, 3, 10);

        for (grid, strip, expect_past) in [
            (json!({"year": 2025, "month": 3, "day": 9}), json!("2025-03-09"), true),
            (json!({"year": 2025, "month": 3, "day": 10}), json!("2025-03-10"), false),
            (json!({"year": 2025, "month": 3, "day": 11}), json!("2025-03-11"), false),
        ] {
            let from_grid = parse_selected_date(&grid).unwrap();
            let from_strip = parse_selected_date(&strip).unwrap();
            assert_eq!(from_grid, from_strip);
            assert_eq!(is_past_date(from_grid, today), expect_past);
            assert_eq!(is_past_date(from_strip, today), expect_past);
        }
    }
}
