use crate::error::{Result, RigcheckError};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

type TimestampAttempt = fn(&str) -> Option<DateTime<Utc>>;

/// Parse attempts in priority order. The first one that succeeds wins.
const TIMESTAMP_FORMATS: &[(&str, TimestampAttempt)] = &[
    ("rfc3339", parse_rfc3339),
    ("datetime", parse_naive_datetime),
    ("date", parse_date),
];

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Date-time without an offset. Stores write these in UTC.
fn parse_naive_datetime(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a record store's free-form `updated_at` value.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|(_, attempt)| attempt(trimmed))
        .ok_or_else(|| RigcheckError::UnparseableTimestamp(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

static DURATION_RE: OnceLock<Regex> = OnceLock::new();

fn duration_re() -> &'static Regex {
    DURATION_RE.get_or_init(|| {
        Regex::new(r"^(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$").expect("duration regex is valid")
    })
}

/// Parse a duration written as `1h`, `90m`, `1h30m` or `45s`.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let s = raw.trim();
    let invalid = || RigcheckError::InvalidDuration(raw.to_string());
    if s.is_empty() {
        return Err(invalid());
    }
    let caps = duration_re().captures(s).ok_or_else(invalid)?;

    let mut total: i64 = 0;
    for (idx, unit) in [(1, 3600_i64), (2, 60), (3, 1)] {
        if let Some(m) = caps.get(idx) {
            let value: i64 = m.as_str().parse().map_err(|_| invalid())?;
            total = value
                .checked_mul(unit)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(invalid)?;
        }
    }
    Duration::try_seconds(total).ok_or_else(invalid)
}

/// Parse a stale threshold. Same forms as [`parse_duration`], but zero is
/// rejected: every cutoff must lie strictly in the past.
pub fn parse_threshold(raw: &str) -> Result<Duration> {
    let parsed = parse_duration(raw)?;
    if parsed <= Duration::zero() {
        return Err(RigcheckError::InvalidThreshold(raw.trim().to_string()));
    }
    Ok(parsed)
}

/// Render a duration the way Go prints one, truncated to whole seconds:
/// `2h0m0s`, `45m10s`, `12s`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.num_seconds();
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.unsigned_abs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{sign}{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{sign}{m}m{s}s")
    } else {
        format!("{sign}{s}s")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse_timestamp("2026-01-02T15:04:05-08:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 1, 2, 23, 4, 5).unwrap());
    }

    #[test]
    fn parses_rfc3339_with_fraction_and_z() {
        let ts = parse_timestamp("2026-01-02T15:04:05.250Z").unwrap();
        assert_eq!(ts.timestamp(), Utc.with_ymd_and_hms(2026, 1, 2, 15, 4, 5).unwrap().timestamp());
    }

    #[test]
    fn parses_datetime_without_offset_as_utc() {
        let ts = parse_timestamp("2026-01-02T15:04:05").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 1, 2, 15, 4, 5).unwrap());
    }

    #[test]
    fn parses_date_only_as_midnight() {
        let ts = parse_timestamp(" 2026-01-02 ").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        for raw in ["not-a-date", "", "2026-13-40", "02/01/2026"] {
            let err = parse_timestamp(raw).unwrap_err();
            assert!(
                matches!(err, RigcheckError::UnparseableTimestamp(_)),
                "expected unparseable: {raw}"
            );
        }
    }

    #[test]
    fn parse_duration_forms() {
        assert_eq!(parse_duration("1h").unwrap(), Duration::hours(1));
        assert_eq!(parse_duration("90m").unwrap(), Duration::minutes(90));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::minutes(90));
        assert_eq!(parse_duration("2h0m15s").unwrap(), Duration::seconds(7215));
        assert_eq!(parse_duration("45s").unwrap(), Duration::seconds(45));
    }

    #[test]
    fn parse_duration_rejects_bad_input() {
        for raw in ["", "h", "1d", "1.5h", "-1h", "30m1h", "99999999999999999999h"] {
            assert!(parse_duration(raw).is_err(), "expected invalid: {raw}");
        }
    }

    #[test]
    fn parse_threshold_rejects_zero() {
        assert_eq!(parse_threshold("90m").unwrap(), Duration::minutes(90));
        for raw in ["0s", "0h0m0s", " 0m "] {
            let err = parse_threshold(raw).unwrap_err();
            assert!(
                matches!(err, RigcheckError::InvalidThreshold(_)),
                "expected zero rejected: {raw}"
            );
            assert!(err.to_string().contains("duration must be > 0"), "{err}");
        }
        assert!(matches!(
            parse_threshold("soon"),
            Err(RigcheckError::InvalidDuration(_))
        ));
    }

    #[test]
    fn format_duration_matches_go_style() {
        assert_eq!(format_duration(Duration::hours(2)), "2h0m0s");
        assert_eq!(format_duration(Duration::seconds(45 * 60 + 10)), "45m10s");
        assert_eq!(format_duration(Duration::seconds(12)), "12s");
        assert_eq!(format_duration(Duration::milliseconds(400)), "0s");
        assert_eq!(format_duration(Duration::hours(26) + Duration::minutes(3)), "26h3m0s");
    }

    #[test]
    fn format_duration_truncates_subsecond_noise() {
        let d = Duration::hours(2) + Duration::milliseconds(37);
        assert_eq!(format_duration(d), "2h0m0s");
    }
}
