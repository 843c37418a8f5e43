//! Serde adapter for `TimeDelta` written as a time-span string.
//!
//! The tasks file stores durations as `[-][d.]hh:mm:ss[.fffffff]`, where the
//! fraction counts 100 ns ticks. Files written by earlier versions of the
//! tracker use exactly this layout, so both directions stay compatible.

use anyhow::{anyhow, bail, Context, Result};
use chrono::TimeDelta;
use serde::{Deserialize, Deserializer, Serializer};

const NANOS_PER_TICK: i64 = 100;
const TICKS_PER_SECOND: i64 = 10_000_000;
const TICKS_PER_DAY: i64 = TICKS_PER_SECOND * 86_400;
const FRACTION_DIGITS: usize = 7;

pub fn serialize<S>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_span(*value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<TimeDelta, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_span(&raw).map_err(serde::de::Error::custom)
}

fn to_ticks(value: TimeDelta) -> i64 {
    match value.num_nanoseconds() {
        Some(nanos) => nanos / NANOS_PER_TICK,
        None => value.num_microseconds().unwrap_or(i64::MAX / 10).saturating_mul(10),
    }
}

pub fn format_span(value: TimeDelta) -> String {
    let ticks = to_ticks(value);
    let sign = if ticks < 0 { "-" } else { "" };
    let ticks = ticks.unsigned_abs() as i64;

    let days = ticks / TICKS_PER_DAY;
    let within_day = ticks % TICKS_PER_DAY;
    let total_secs = within_day / TICKS_PER_SECOND;
    let fraction = within_day % TICKS_PER_SECOND;

    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut out = String::from(sign);
    if days > 0 {
        out.push_str(&format!("{days}."));
    }
    out.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    if fraction > 0 {
        out.push_str(&format!(".{fraction:07}"));
    }
    out
}

pub fn parse_span(raw: &str) -> Result<TimeDelta> {
    let trimmed = raw.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() != 3 {
        bail!("invalid time span '{raw}': expected [d.]hh:mm:ss[.fffffff]");
    }

    let (days, hours) = match parts[0].split_once('.') {
        Some((days, hours)) => (parse_field(days, "days", raw)?, parse_field(hours, "hours", raw)?),
        None => (0, parse_field(parts[0], "hours", raw)?),
    };
    let minutes = parse_field(parts[1], "minutes", raw)?;

    let (seconds, fraction) = match parts[2].split_once('.') {
        Some((seconds, fraction)) => (parse_field(seconds, "seconds", raw)?, parse_fraction(fraction, raw)?),
        None => (parse_field(parts[2], "seconds", raw)?, 0),
    };

    if hours > 23 || minutes > 59 || seconds > 59 {
        bail!("invalid time span '{raw}': component out of range");
    }

    let ticks = days
        .checked_mul(TICKS_PER_DAY)
        .and_then(|t| t.checked_add(((hours * 60 + minutes) * 60 + seconds) * TICKS_PER_SECOND))
        .and_then(|t| t.checked_add(fraction))
        .ok_or_else(|| anyhow!("invalid time span '{raw}': out of range"))?;

    let delta = TimeDelta::nanoseconds(
        ticks
            .checked_mul(NANOS_PER_TICK)
            .ok_or_else(|| anyhow!("invalid time span '{raw}': out of range"))?,
    );
    Ok(if negative { -delta } else { delta })
}

fn parse_field(value: &str, field: &str, raw: &str) -> Result<i64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        bail!("invalid time span '{raw}': bad {field}");
    }
    value
        .parse::<i64>()
        .with_context(|| format!("invalid time span '{raw}': bad {field}"))
}

fn parse_fraction(value: &str, raw: &str) -> Result<i64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        bail!("invalid time span '{raw}': bad fraction");
    }
    let digits: String = value
        .chars()
        .chain(std::iter::repeat('0'))
        .take(FRACTION_DIGITS)
        .collect();
    parse_field(&digits, "fraction", raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_span(TimeDelta::minutes(90)), "01:30:00");
        assert_eq!(format_span(TimeDelta::zero()), "00:00:00");
    }

    #[test]
    fn formats_days_and_ticks() {
        let value = TimeDelta::days(2) + TimeDelta::hours(3) + TimeDelta::nanoseconds(1_500);
        assert_eq!(format_span(value), "2.03:00:00.0000015");
    }

    #[test]
    fn parses_fraction_with_fewer_digits() {
        let parsed = parse_span("00:00:01.5").expect("valid span");
        assert_eq!(parsed, TimeDelta::milliseconds(1_500));
    }

    #[test]
    fn parses_negative_span() {
        let parsed = parse_span("-00:10:00").expect("valid span");
        assert_eq!(parsed, -TimeDelta::minutes(10));
    }

    #[test]
    fn parses_end_of_day_close() {
        let parsed = parse_span("09:59:59.9999999").expect("valid span");
        assert_eq!(parsed, TimeDelta::hours(10) - TimeDelta::nanoseconds(100));
    }

    #[test]
    fn rejects_malformed_spans() {
        assert!(parse_span("").is_err());
        assert!(parse_span("1:2").is_err());
        assert!(parse_span("aa:00:00").is_err());
        assert!(parse_span("00:61:00").is_err());
        assert!(parse_span("00:00:00.").is_err());
    }
}
