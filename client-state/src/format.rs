use jiff::Timestamp;
use jiff::tz::TimeZone;

/// Clock time of the last successful refresh, "Never" before the first.
pub fn format_last_refresh(
    last_updated: Option<Timestamp>,
    tz: &TimeZone,
) -> String {
    match last_updated {
        Some(ts) => ts.to_zoned(tz.clone()).strftime("%I:%M:%S %p").to_string(),
        None => "Never".to_string(),
    }
}

/// Long form used in tables, e.g. "Mar 4, 2025, 02:05 PM UTC".
pub fn format_date(value: Option<Timestamp>, tz: &TimeZone) -> String {
    match value {
        Some(ts) => ts
            .to_zoned(tz.clone())
            .strftime("%b %-d, %Y, %I:%M %p %Z")
            .to_string(),
        None => "N/A".to_string(),
    }
}

/// Like [`format_date`] for values that arrive as loosely formatted text.
pub fn format_date_str(value: Option<&str>, tz: &TimeZone) -> String {
    format_date(value.and_then(payloads::lenient_timestamp::parse), tz)
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn format_millis(value: f64) -> String {
    format!("{value:.0} ms")
}

pub fn format_seconds(value: f64) -> String {
    format!("{value:.2}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> Option<Timestamp> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn last_refresh() {
        assert_eq!(format_last_refresh(None, &TimeZone::UTC), "Never");
        assert_eq!(
            format_last_refresh(at("2025-03-04T14:05:09Z"), &TimeZone::UTC),
            "02:05:09 PM"
        );
        assert_eq!(
            format_last_refresh(at("2025-03-04T00:00:01Z"), &TimeZone::UTC),
            "12:00:01 AM"
        );
    }

    #[test]
    fn dates() {
        assert_eq!(format_date(None, &TimeZone::UTC), "N/A");
        assert_eq!(
            format_date(at("2025-03-04T14:05:09Z"), &TimeZone::UTC),
            "Mar 4, 2025, 02:05 PM UTC"
        );
        assert_eq!(format_date_str(Some("garbage"), &TimeZone::UTC), "N/A");
        assert_eq!(
            format_date_str(Some("2025-03-04T14:05:09Z"), &TimeZone::UTC),
            "Mar 4, 2025, 02:05 PM UTC"
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(format_percent(42.345), "42.3%");
        assert_eq!(format_millis(120.6), "121 ms");
        assert_eq!(format_seconds(1.5), "1.50s");
    }
}
