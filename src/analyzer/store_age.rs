use chrono::{DateTime, Utc};

const SECONDS_PER_YEAR: i64 = 31_536_000;
const SECONDS_PER_MONTH: i64 = 2_592_000;
const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_MINUTE: i64 = 60;

fn plural(count: i64) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Long-form age, e.g. "2 years and 3 days" or "45 days".
pub fn store_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - created_at).num_days().abs();
    let years = days / 365;
    let remaining = days % 365;

    if years > 0 {
        format!(
            "{} year{} and {} day{}",
            years,
            plural(years),
            remaining,
            plural(remaining)
        )
    } else {
        format!("{} day{}", days, plural(days))
    }
}

/// Table-friendly age, e.g. "1y 2m 3d", "< 1d" for brand-new stores.
pub fn compact_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - created_at).num_days().max(0);
    let years = days / 365;
    let months = (days % 365) / 30;
    let rest = days % 30;

    let parts: Vec<String> = [(years, 'y'), (months, 'm'), (rest, 'd')]
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect();

    if parts.is_empty() {
        "< 1d".to_string()
    } else {
        parts.join(" ")
    }
}

/// Relative time such as "3 days ago". A unit is used once more than one whole unit has passed.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    let units = [
        (SECONDS_PER_YEAR, "year"),
        (SECONDS_PER_MONTH, "month"),
        (SECONDS_PER_DAY, "day"),
        (SECONDS_PER_HOUR, "hour"),
        (SECONDS_PER_MINUTE, "minute"),
    ];

    for (size, unit) in units {
        if seconds > size {
            let count = seconds / size;
            return format!("{} {}{} ago", count, unit, plural(count));
        }
    }

    let seconds = seconds.max(0);
    format!("{} second{} ago", seconds, plural(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn store_age_uses_years_after_a_full_year() {
        assert_eq!(store_age(now() - Duration::days(1), now()), "1 day");
        assert_eq!(store_age(now() - Duration::days(45), now()), "45 days");
        assert_eq!(store_age(now() - Duration::days(365), now()), "1 year and 0 days");
        assert_eq!(store_age(now() - Duration::days(731), now()), "2 years and 1 day");
    }

    #[test]
    fn store_age_ignores_direction() {
        assert_eq!(store_age(now() + Duration::days(3), now()), "3 days");
    }

    #[test]
    fn compact_age_skips_zero_parts() {
        assert_eq!(compact_age(now() - Duration::hours(5), now()), "< 1d");
        assert_eq!(compact_age(now() - Duration::days(400), now()), "1y 1m 10d");
        assert_eq!(compact_age(now() - Duration::days(30), now()), "1m");
        assert_eq!(compact_age(now() - Duration::days(3), now()), "3d");
    }

    #[test]
    fn time_ago_picks_the_largest_unit() {
        assert_eq!(time_ago(now() - Duration::seconds(30), now()), "30 seconds ago");
        assert_eq!(time_ago(now() - Duration::minutes(5), now()), "5 minutes ago");
        assert_eq!(time_ago(now() - Duration::hours(26), now()), "1 day ago");
        assert_eq!(time_ago(now() - Duration::days(70), now()), "2 months ago");
        assert_eq!(time_ago(now() - Duration::days(800), now()), "2 years ago");
    }

    #[test]
    fn time_ago_needs_more_than_one_unit() {
        // exactly one hour is still reported in minutes
        assert_eq!(time_ago(now() - Duration::hours(1), now()), "60 minutes ago");
    }
}
