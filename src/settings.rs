//! Runtime knobs for collection, read from the environment (after `.env`) and overridable by flags.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_DSN: &str = "sqlite://data/brief.db";
pub const DEFAULT_SOURCES: &str = "config/sources.yaml";

const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_AGE_DAYS: u64 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub concurrency: usize,
    pub fetch_timeout: Duration,
    /// `None` keeps entries of any age.
    pub max_age: Option<Duration>,
    pub fetch_articles: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_age: Some(Duration::from_secs(DEFAULT_MAX_AGE_DAYS * 86_400)),
            fetch_articles: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut s = Settings::default();
        if let Some(v) = get("BRIEF_CONCURRENCY") {
            s.concurrency = parse_num::<usize>("BRIEF_CONCURRENCY", &v).and_then(|n| positive("BRIEF_CONCURRENCY", &v, n))?;
        }
        if let Some(v) = get("BRIEF_FETCH_TIMEOUT_SECS") {
            let secs = parse_num::<u64>("BRIEF_FETCH_TIMEOUT_SECS", &v).and_then(|n| positive("BRIEF_FETCH_TIMEOUT_SECS", &v, n))?;
            s.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = get("BRIEF_MAX_AGE_DAYS") {
            s.max_age = max_age_days("BRIEF_MAX_AGE_DAYS", parse_num::<u64>("BRIEF_MAX_AGE_DAYS", &v)?)?;
        }
        if let Some(v) = get("BRIEF_FETCH_ARTICLES") {
            s.fetch_articles = parse_bool("BRIEF_FETCH_ARTICLES", &v)?;
        }
        Ok(s)
    }
}

/// Day count to cutoff age; 0 disables the cutoff. Ages the clock cannot subtract are rejected.
pub fn max_age_days(key: &'static str, days: u64) -> Result<Option<Duration>, ConfigError> {
    if days == 0 {
        return Ok(None);
    }
    i64::try_from(days)
        .ok()
        .and_then(chrono::Duration::try_days)
        .and_then(|d| d.to_std().ok())
        .map(Some)
        .ok_or_else(|| ConfigError::InvalidSetting { key, value: days.to_string() })
}

fn parse_num<T: std::str::FromStr>(key: &'static str, v: &str) -> Result<T, ConfigError> {
    v.trim().parse().map_err(|_| ConfigError::InvalidSetting { key, value: v.to_string() })
}

fn positive<T: PartialOrd + Default>(key: &'static str, v: &str, n: T) -> Result<T, ConfigError> {
    if n > T::default() { Ok(n) } else { Err(ConfigError::InvalidSetting { key, value: v.to_string() }) }
}

fn parse_bool(key: &'static str, v: &str) -> Result<bool, ConfigError> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidSetting { key, value: v.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.concurrency, 4);
        assert_eq!(s.fetch_timeout, Duration::from_secs(30));
        assert_eq!(s.max_age, Some(Duration::from_secs(7 * 86_400)));
        assert!(!s.fetch_articles);
    }

    #[test]
    fn env_overrides_and_zero_age_disables_cutoff() {
        let s = Settings::from_lookup(lookup(&[
            ("BRIEF_CONCURRENCY", "8"),
            ("BRIEF_FETCH_TIMEOUT_SECS", " 5 "),
            ("BRIEF_MAX_AGE_DAYS", "0"),
            ("BRIEF_FETCH_ARTICLES", "yes"),
        ]))
        .unwrap();
        assert_eq!(s.concurrency, 8);
        assert_eq!(s.fetch_timeout, Duration::from_secs(5));
        assert_eq!(s.max_age, None);
        assert!(s.fetch_articles);
    }

    #[test]
    fn invalid_values_name_the_key() {
        let err = Settings::from_lookup(lookup(&[("BRIEF_CONCURRENCY", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { key: "BRIEF_CONCURRENCY", .. }));
        let err = Settings::from_lookup(lookup(&[("BRIEF_FETCH_ARTICLES", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { key: "BRIEF_FETCH_ARTICLES", .. }));
        let err = Settings::from_lookup(lookup(&[("BRIEF_MAX_AGE_DAYS", "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { key: "BRIEF_MAX_AGE_DAYS", .. }));
    }

    #[test]
    fn huge_max_age_is_invalid_not_a_panic() {
        let err = Settings::from_lookup(lookup(&[("BRIEF_MAX_AGE_DAYS", "300000000000000")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { key: "BRIEF_MAX_AGE_DAYS", .. }));
        assert!(max_age_days("BRIEF_MAX_AGE_DAYS", u64::MAX).is_err());
        assert_eq!(max_age_days("BRIEF_MAX_AGE_DAYS", 2).unwrap(), Some(Duration::from_secs(2 * 86_400)));
    }
}
