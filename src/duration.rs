use std::sync::OnceLock;

use chrono::Duration;
use regex::Regex;

use crate::error::{Error, Result};

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:(\d+)d)?(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$").expect("valid duration regex")
    })
}

/// Parses strings like `45s`, `2m30s`, `1h30m` or `2d5h10m`.
///
/// Units are optional but must appear in `d h m s` order, and at least one is required.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let s = raw.trim();
    let invalid = || Error::Validation(format!("Invalid duration: '{}'. Use e.g. 45s, 2m30s, 1h30m.", raw));

    if s.is_empty() {
        return Err(invalid());
    }
    let caps = duration_re().captures(s).ok_or_else(invalid)?;

    let mut total = Duration::zero();
    for (group, unit_seconds) in [(1, 86_400i64), (2, 3_600), (3, 60), (4, 1)] {
        if let Some(m) = caps.get(group) {
            let n: i64 = m.as_str().parse().map_err(|_| invalid())?;
            let secs = n.checked_mul(unit_seconds).ok_or_else(invalid)?;
            let part = Duration::try_seconds(secs).ok_or_else(invalid)?;
            total = total.checked_add(&part).ok_or_else(invalid)?;
        }
    }
    // The store keeps whole microseconds in an i64.
    if total.num_microseconds().is_none() {
        return Err(invalid());
    }
    Ok(total)
}

/// Formats as `H:MM:SS`, prefixed with `Nd ` for a day or more.
pub fn format_duration(d: Duration) -> String {
    let sign = if d < Duration::zero() { "-" } else { "" };
    let total = d.num_seconds().abs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    let days_str = if days > 0 { format!("{}d ", days) } else { String::new() };
    format!("{}{}{}:{:02}:{:02}", sign, days_str, hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_units() {
        assert_eq!(parse_duration("45s").unwrap(), Duration::seconds(45));
        assert_eq!(parse_duration("60m").unwrap(), Duration::hours(1));
        assert_eq!(parse_duration("2h").unwrap(), Duration::hours(2));
        assert_eq!(parse_duration("1d").unwrap(), Duration::days(1));
    }

    #[test]
    fn parses_combined_units() {
        assert_eq!(parse_duration("2m30s").unwrap(), Duration::seconds(150));
        assert_eq!(
            parse_duration(" 2d5h10m ").unwrap(),
            Duration::days(2) + Duration::hours(5) + Duration::minutes(10)
        );
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "   ", "10", "5x", "30s2m", "m", "1h 30m", "-5m"] {
            assert!(
                matches!(parse_duration(bad), Err(Error::Validation(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn rejects_overflowing_input() {
        assert!(parse_duration("99999999999999999999d").is_err());
    }

    #[test]
    fn rejects_durations_the_store_cannot_hold() {
        assert!(matches!(parse_duration("200000000d"), Err(Error::Validation(_))));
        assert!(parse_duration("100000d").is_ok());
    }

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_duration(Duration::zero()), "0:00:00");
        assert_eq!(format_duration(Duration::seconds(90)), "0:01:30");
        assert_eq!(
            format_duration(Duration::hours(5) + Duration::minutes(30) + Duration::seconds(15)),
            "5:30:15"
        );
        assert_eq!(
            format_duration(Duration::days(1) + Duration::hours(2) + Duration::seconds(4)),
            "1d 2:00:04"
        );
        assert_eq!(format_duration(Duration::seconds(-61)), "-0:01:01");
    }
}
