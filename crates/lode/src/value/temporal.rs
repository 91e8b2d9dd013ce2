// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Temporal scalars and their canonical ISO-8601 text forms.

use crate::{Error, Result};
use chrono::{
    DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta, Utc,
};
use std::fmt;

const NANOS_PER_SECOND: i128 = 1_000_000_000;
const NANOS_PER_MINUTE: i128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: i128 = 24 * NANOS_PER_HOUR;

/// Date/time variants carried by the value model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Temporal {
    /// Calendar date, `2018-06-28`.
    Date(NaiveDate),
    /// Wall-clock time, `10:45:00`.
    Time(NaiveTime),
    /// Local date and time, `2018-06-28T10:45:00`.
    DateTime(NaiveDateTime),
    /// Point on the UTC timeline, `1970-01-01T00:00:00.001Z`.
    Instant(DateTime<Utc>),
    /// Elapsed time, `PT2H30M`.
    Duration(TimeDelta),
}

impl Temporal {
    /// Variant name used in coercion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::DateTime(_) => "datetime",
            Self::Instant(_) => "instant",
            Self::Duration(_) => "duration",
        }
    }
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::Instant(i) => f.write_str(&i.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::Duration(d) => f.write_str(&format_duration(*d)),
        }
    }
}

impl From<NaiveDate> for Temporal {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveTime> for Temporal {
    fn from(v: NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<NaiveDateTime> for Temporal {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<DateTime<Utc>> for Temporal {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Instant(v)
    }
}

impl From<TimeDelta> for Temporal {
    fn from(v: TimeDelta) -> Self {
        Self::Duration(v)
    }
}

fn invalid(text: &str, target: &str) -> Error {
    Error::mismatch(format!("string {:?}", text), target)
}

/// Parses `YYYY-MM-DD`.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| invalid(text, "date"))
}

/// Parses `HH:MM[:SS[.fraction]]`.
pub fn parse_time(text: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|_| invalid(text, "time"))
}

/// Parses `YYYY-MM-DDTHH:MM[:SS[.fraction]]`.
pub fn parse_date_time(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .map_err(|_| invalid(text, "datetime"))
}

/// Parses an RFC 3339 timestamp and normalizes it to UTC.
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid(text, "instant"))
}

/// Instant from milliseconds since the Unix epoch.
pub fn instant_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Error::mismatch(format!("number {}", millis), "instant"))
}

/// Duration from a millisecond count.
pub fn duration_from_millis(millis: i64) -> Result<TimeDelta> {
    TimeDelta::try_milliseconds(millis)
        .ok_or_else(|| Error::mismatch(format!("number {}", millis), "duration"))
}

/// Formats a duration as ISO-8601 `PTnHnMn.nS`.
///
/// Days are folded into hours. Negative durations carry the sign on every
/// component (`PT-1H-30M`).
pub fn format_duration(duration: TimeDelta) -> String {
    let total =
        i128::from(duration.num_seconds()) * NANOS_PER_SECOND + i128::from(duration.subsec_nanos());
    if total == 0 {
        return "PT0S".to_string();
    }

    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    let hours = total / NANOS_PER_HOUR;
    let minutes = (total % NANOS_PER_HOUR) / NANOS_PER_MINUTE;
    let seconds = (total % NANOS_PER_MINUTE) / NANOS_PER_SECOND;
    let nanos = total % NANOS_PER_SECOND;

    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{sign}{hours}H"));
    }
    if minutes > 0 {
        out.push_str(&format!("{sign}{minutes}M"));
    }
    if seconds > 0 || nanos > 0 {
        out.push_str(&format!("{sign}{seconds}"));
        if nanos > 0 {
            let fraction = format!("{:09}", nanos);
            out.push('.');
            out.push_str(fraction.trim_end_matches('0'));
        }
        out.push('S');
    }
    out
}

/// Parses ISO-8601 `[-]P[nD][T[nH][nM][n[.n]S]]`.
pub fn parse_duration(text: &str) -> Result<TimeDelta> {
    let err = || invalid(text, "duration");

    let (negate, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let rest = rest
        .strip_prefix('P')
        .or_else(|| rest.strip_prefix('p'))
        .ok_or_else(err)?;

    let (date_part, time_part) = match rest.find(['T', 't']) {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    };
    if date_part.is_empty() && time_part.map_or(true, str::is_empty) {
        return Err(err());
    }

    let mut total: i128 = 0;
    let mut components = 0;

    if !date_part.is_empty() {
        let days = date_part
            .strip_suffix(['D', 'd'])
            .and_then(|n| n.parse::<i64>().ok())
            .ok_or_else(err)?;
        total += i128::from(days) * NANOS_PER_DAY;
        components += 1;
    }

    if let Some(mut time) = time_part {
        for (unit, scale) in [('H', NANOS_PER_HOUR), ('M', NANOS_PER_MINUTE)] {
            if let Some(pos) = time.find([unit, unit.to_ascii_lowercase()]) {
                let n = time[..pos].parse::<i64>().map_err(|_| err())?;
                total += i128::from(n) * scale;
                time = &time[pos + 1..];
                components += 1;
            }
        }
        if !time.is_empty() {
            let number = time.strip_suffix(['S', 's']).ok_or_else(err)?;
            total += parse_seconds(number).ok_or_else(err)?;
            components += 1;
        }
    }

    if components == 0 {
        return Err(err());
    }
    if negate {
        total = -total;
    }

    let secs = i64::try_from(total.div_euclid(NANOS_PER_SECOND)).map_err(|_| err())?;
    let nanos = total.rem_euclid(NANOS_PER_SECOND) as i64;
    TimeDelta::try_seconds(secs)
        .and_then(|d| d.checked_add(&TimeDelta::nanoseconds(nanos)))
        .ok_or_else(err)
}

fn parse_seconds(number: &str) -> Option<i128> {
    let (negative, digits) = match number.strip_prefix('-') {
        Some(d) => (true, d),
        None => (false, number),
    };
    let (whole, fraction) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };
    if whole.is_empty() || fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole = whole.parse::<i64>().ok()?;
    let nanos = if fraction.is_empty() {
        0
    } else {
        format!("{:0<9}", fraction).parse::<i128>().ok()?
    };
    let value = i128::from(whole) * NANOS_PER_SECOND + nanos;
    Some(if negative { -value } else { value })
}
