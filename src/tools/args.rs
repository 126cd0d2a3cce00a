use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use serde_json::Value;

use super::ToolError;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Which end of a range a date-only value stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

pub fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    match optional_str(args, key)? {
        Some(value) => Ok(value),
        None => Err(ToolError::invalid(format!("{} is required", key))),
    }
}

/// A string argument; blank strings count as absent.
pub fn optional_str<'a>(args: &'a Value, key: &str) -> Result<Option<&'a str>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim())),
        Some(_) => Err(ToolError::invalid(format!("{} must be a string", key))),
    }
}

pub fn optional_bool(args: &Value, key: &str) -> Result<Option<bool>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ToolError::invalid(format!("{} must be a boolean", key))),
    }
}

/// A Notion page id: 32 hex digits, dashed or not. Returned as given.
pub fn page_id(args: &Value, key: &str) -> Result<String, ToolError> {
    let raw = required_str(args, key)?;
    uuid::Uuid::parse_str(raw)
        .map_err(|_| ToolError::invalid(format!("{} is not a valid page id: {}", key, raw)))?;
    Ok(raw.to_string())
}

/// Parse a datetime argument.
///
/// Accepts RFC 3339 with an offset, a naive date-time (read in `tz`), or a
/// bare date, which stands for the start or the end of that day in `tz`.
pub fn parse_datetime(
    text: &str,
    tz: &Tz,
    bound: Bound,
) -> Result<DateTime<FixedOffset>, ToolError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt);
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
            match bound {
                Bound::Start => date.and_hms_opt(0, 0, 0),
                Bound::End => date.and_hms_nano_opt(23, 59, 59, 999_999_999),
            }
        })
        .ok_or_else(|| {
            ToolError::invalid(format!(
                "'{}' is not an ISO-8601 date or datetime (YYYY-MM-DDTHH:MM:SS)",
                text
            ))
        })?;

    let local = tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        ToolError::invalid(format!("'{}' does not exist in timezone {}", text, tz.name()))
    })?;
    Ok(local.with_timezone(&local.offset().fix()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TOKYO: Tz = chrono_tz::Asia::Tokyo;

    #[test]
    fn required_str_rejects_missing_blank_and_non_string() {
        let args = json!({ "task": "  Buy milk ", "blank": "   ", "number": 3 });
        assert_eq!(required_str(&args, "task").unwrap(), "Buy milk");
        assert!(required_str(&args, "missing").is_err());
        assert!(required_str(&args, "blank").is_err());
        let err = required_str(&args, "number").unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn optional_bool_accepts_only_booleans() {
        let args = json!({ "yes": true, "text": "true" });
        assert_eq!(optional_bool(&args, "yes").unwrap(), Some(true));
        assert_eq!(optional_bool(&args, "missing").unwrap(), None);
        assert!(optional_bool(&args, "text").is_err());
    }

    #[test]
    fn page_id_accepts_dashed_and_plain_ids() {
        let args = json!({
            "dashed": "59833787-2cf9-4fdf-8782-e53db20768a5",
            "plain": "598337872cf94fdf8782e53db20768a5",
            "bad": "not-an-id"
        });
        assert!(page_id(&args, "dashed").is_ok());
        assert_eq!(page_id(&args, "plain").unwrap(), "598337872cf94fdf8782e53db20768a5");
        assert!(page_id(&args, "bad").is_err());
    }

    #[test]
    fn offset_datetimes_are_kept() {
        let dt = parse_datetime("2024-06-01T09:00:00+02:00", &TOKYO, Bound::Start).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-06-01T09:00:00+02:00");
    }

    #[test]
    fn naive_datetimes_are_read_in_display_timezone() {
        for text in [
            "2024-06-01T09:00:00",
            "2024-06-01T09:00:00.000000",
            "2024-06-01T09:00",
            "2024-06-01 09:00",
        ] {
            let dt = parse_datetime(text, &TOKYO, Bound::Start).unwrap();
            assert_eq!(dt.to_rfc3339(), "2024-06-01T09:00:00+09:00", "input {text}");
        }
    }

    #[test]
    fn bare_dates_cover_the_whole_day() {
        let start = parse_datetime("2024-06-01", &TOKYO, Bound::Start).unwrap();
        let end = parse_datetime("2024-06-07", &TOKYO, Bound::End).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-06-01T00:00:00+09:00");
        assert_eq!(end.to_rfc3339(), "2024-06-07T23:59:59.999999999+09:00");

        let late = parse_datetime("2024-06-07T23:59:59.5", &TOKYO, Bound::Start).unwrap();
        assert!(late <= end);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = parse_datetime("tomorrow", &TOKYO, Bound::Start).unwrap_err();
        assert!(err.to_string().contains("not an ISO-8601"));
    }

    #[test]
    fn times_skipped_by_dst_are_rejected() {
        let berlin = chrono_tz::Europe::Berlin;
        let err = parse_datetime("2024-03-31T02:30:00", &berlin, Bound::Start).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
