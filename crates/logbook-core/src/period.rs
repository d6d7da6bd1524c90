// File: crates/logbook-core/src/period.rs
// Summary: Period truncation (day/week/month) and timestamp conversions for time axes.

use std::fmt::{self, Write};
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::configuration::Configuration;
use crate::error::{ChartError, Result};

const DEFAULT_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Daily, Period::Weekly, Period::Monthly];

    pub const fn name(self) -> &'static str {
        match self {
            Period::Daily => "Daily",
            Period::Weekly => "Weekly",
            Period::Monthly => "Monthly",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|p| p.name()).collect()
    }

    /// Start of the period containing `t`. Weeks start on Monday.
    pub fn truncate(self, t: NaiveDateTime) -> NaiveDateTime {
        let date = t.date();
        let start = match self {
            Period::Daily => date,
            Period::Weekly => date - Duration::days(date.weekday().num_days_from_monday() as i64),
            Period::Monthly => date.with_day(1).unwrap_or(date),
        };
        start.and_time(NaiveTime::MIN)
    }

    /// Truncate an epoch-milliseconds value, keeping the same representation.
    pub fn truncate_millis(self, millis: f64) -> Option<f64> {
        from_epoch_millis(millis).map(|t| epoch_millis(self.truncate(t)))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Period {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| ChartError::invalid_directive(s, &Self::names()))
    }
}

pub fn epoch_millis(t: NaiveDateTime) -> f64 {
    t.and_utc().timestamp_millis() as f64
}

pub fn from_epoch_millis(millis: f64) -> Option<NaiveDateTime> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|t| t.naive_utc())
}

/// Parse a configured timestamp: `2024-03-01`, `2024-03-01 06:00` or with seconds
/// (`-` or `/` date separators).
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y/%m/%d %H:%M:%S", "%Y/%m/%d %H:%M"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(t);
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(text, format) {
            return Ok(d.and_time(NaiveTime::MIN));
        }
    }
    Err(ChartError::InvalidTimestamp(text.to_string()))
}

/// Render `t` with the locale's `format.<locale>.dateTime` pattern.
pub fn format_locale(t: NaiveDateTime, configuration: &Configuration, locale: &str) -> Result<String> {
    let key = format!("format.{locale}.dateTime");
    let pattern = configuration
        .get_optional(&key)
        .and_then(|v| v.as_str())
        .unwrap_or(DEFAULT_DATE_TIME_FORMAT);
    // chrono reports a bad pattern as a fmt error instead of at parse time
    let mut out = String::new();
    write!(out, "{}", t.format(pattern))
        .map_err(|_| ChartError::invalid_configuration(key, format!("bad date pattern '{pattern}'")))?;
    Ok(out)
}
