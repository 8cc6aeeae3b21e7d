// Utility functions
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Parses an RFC 3339 timestamp, or a bare SQLite `datetime('now')` value taken as UTC.
pub fn parse_datetime(date_str: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let trimmed = date_str.trim();
    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f")
            .map(|naive| naive.and_utc()),
    }
}

/// Fixed-width UTC form, e.g. `2024-01-01T00:00:00.000Z`.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Splits a comma-separated query value into trimmed, lower-cased, non-empty parts.
pub fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(|part| part.trim().to_lowercase())
                .filter(|part| !part.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_and_sqlite_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_datetime("2024-01-01T12:30:00Z").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-01T14:30:00+02:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-01 12:30:00").unwrap(), expected);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn formatted_timestamps_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = earlier + chrono::Duration::milliseconds(500);
        assert_eq!(format_timestamp(&earlier), "2024-01-01T00:00:00.000Z");
        assert!(format_timestamp(&earlier) < format_timestamp(&later));
    }

    #[test]
    fn split_list_drops_empty_parts() {
        assert_eq!(split_list(Some("Fixed, byob,,")), vec!["fixed", "byob"]);
        assert!(split_list(None).is_empty());
    }
}
