//! Clock collaborator and date/time literal handling

use crate::ast::DateSpec;
use crate::error::EvalError;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// Supplies "now" for keyword dates and bare clock times.
pub trait Clock: fmt::Debug {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Parse a `YYYY-MM-DD` literal.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Parse `H:MM`, `HH:MM:SS`, `9pm`, `10:15am`.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let lower = text.to_ascii_lowercase();
    let (clock, meridiem) = match lower.strip_suffix("am") {
        Some(rest) => (rest, Some(false)),
        None => match lower.strip_suffix("pm") {
            Some(rest) => (rest, Some(true)),
            None => (lower.as_str(), None),
        },
    };

    let mut parts = clock.split(':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = parts.next().map(str::parse).transpose().ok()?.unwrap_or(0);
    let second: u32 = parts.next().map(str::parse).transpose().ok()?.unwrap_or(0);
    if parts.next().is_some() {
        return None;
    }

    let hour = match meridiem {
        Some(_) if hour == 0 || hour > 12 => return None,
        Some(false) => hour % 12,
        Some(true) => hour % 12 + 12,
        None => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Resolve a date spec against the clock.
pub fn resolve(spec: DateSpec, clock: &dyn Clock) -> NaiveDateTime {
    let today = clock.now().date().and_time(NaiveTime::MIN);
    match spec {
        DateSpec::Now => clock.now(),
        DateSpec::Today => today,
        DateSpec::Tomorrow => today + Duration::days(1),
        DateSpec::Yesterday => today - Duration::days(1),
        DateSpec::On(date) => date.and_time(NaiveTime::MIN),
        DateSpec::At(at) => at,
    }
}

/// Shift a timestamp by a (possibly fractional) number of seconds.
pub fn shift(at: NaiveDateTime, seconds: f64) -> Result<NaiveDateTime, EvalError> {
    let out_of_range = || EvalError::InvalidOperation("date out of range".to_string());
    let millis = (seconds * 1000.0).round();
    // `i64::MAX as f64` rounds up to 2^63, so the bound is exclusive
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return Err(out_of_range());
    }
    Duration::try_milliseconds(millis as i64)
        .and_then(|delta| at.checked_add_signed(delta))
        .ok_or_else(out_of_range)
}

/// Seconds from `earlier` to `later`.
pub fn seconds_between(later: NaiveDateTime, earlier: NaiveDateTime) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0
}
