use anyhow::{bail, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};

// Parse a window string like "48h", "2d", "YYYY-MM-DD", or RFC3339 into a UTC timestamp.
// Returns Some(ts) on success; None if unparseable.
pub fn parse_window_str(s: &str) -> Option<DateTime<Utc>> {
    parse_window_at(s, Utc::now())
}

pub fn parse_window_at(s: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let s = s.trim();
    // "48h" -> now - 48 hours
    if let Some(stripped) = s.strip_suffix('h') {
        if let Ok(hours) = stripped.parse::<i64>() {
            if hours > 0 {
                // out-of-range windows are unparseable, not a panic
                return now.checked_sub_signed(Duration::try_hours(hours)?);
            }
        }
    }
    // "2d" -> now - 2 days
    if let Some(stripped) = s.strip_suffix('d') {
        if let Ok(days) = stripped.parse::<i64>() {
            if days > 0 {
                return now.checked_sub_signed(Duration::try_days(days)?);
            }
        }
    }
    // "YYYY-MM-DD"
    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = nd.and_hms_opt(0, 0, 0) {
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
        }
    }
    // RFC3339
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

// Strict variant for CLI flags: an unparseable window is an error, not "no filter"
pub fn parse_since(s: &str) -> Result<DateTime<Utc>> {
    match parse_window_str(s) {
        Some(ts) => Ok(ts),
        None => bail!("invalid window `{s}` (expected e.g. 24h, 2d, 2024-05-01 or RFC3339)"),
    }
}

// Store timestamps are unix millis; keep in-memory values at the same precision.
pub fn now_millis() -> DateTime<Utc> {
    from_millis(Utc::now().timestamp_millis()).unwrap_or_else(Utc::now)
}

pub fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
}
