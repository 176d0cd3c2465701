//! Timestamp literals accepted by `timestamp` options.
//!
//! Layouts are tried in a fixed order and the first one that parses wins,
//! so an ambiguous numeric string such as `20240601` is read as a date, not
//! as epoch seconds. Layouts without a zone are interpreted as UTC.
//!
//! Every numeric field is fixed width: `2024-6-1` matches no layout, and a
//! seven digit number falls through to epoch seconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// `shape` spells the accepted input: `9` is one ASCII digit, anything else
/// must appear literally.
enum Layout {
    DateTime { fmt: &'static str, shape: &'static str },
    Rfc3339,
    Date { fmt: &'static str, shape: &'static str },
}

const LAYOUTS: &[Layout] = &[
    Layout::DateTime {
        fmt: "%Y%m%d%H%M%S",
        shape: "99999999999999",
    },
    Layout::DateTime {
        fmt: "%Y%m%dT%H%M%S",
        shape: "99999999T999999",
    },
    Layout::DateTime {
        fmt: "%Y-%m-%d %H:%M:%S",
        shape: "9999-99-99 99:99:99",
    },
    Layout::DateTime {
        fmt: "%Y-%m-%dT%H:%M:%S",
        shape: "9999-99-99T99:99:99",
    },
    Layout::DateTime {
        fmt: "%Y/%m/%d %H:%M:%S",
        shape: "9999/99/99 99:99:99",
    },
    Layout::DateTime {
        fmt: "%Y/%m/%dT%H:%M:%S",
        shape: "9999/99/99T99:99:99",
    },
    Layout::Rfc3339,
    Layout::Date {
        fmt: "%Y%m%d",
        shape: "99999999",
    },
    Layout::Date {
        fmt: "%Y-%m-%d",
        shape: "9999-99-99",
    },
    Layout::Date {
        fmt: "%Y/%m/%d",
        shape: "9999/99/99",
    },
];

fn has_shape(raw: &str, shape: &str) -> bool {
    raw.len() == shape.len()
        && raw.bytes().zip(shape.bytes()).all(|(b, s)| match s {
            b'9' => b.is_ascii_digit(),
            _ => b == s,
        })
}

impl Layout {
    fn parse(&self, raw: &str) -> Option<DateTime<Utc>> {
        match self {
            Layout::DateTime { fmt, shape } => has_shape(raw, shape)
                .then(|| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .flatten()
                .map(|naive| naive.and_utc()),
            Layout::Rfc3339 => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Layout::Date { fmt, shape } => has_shape(raw, shape)
                .then(|| NaiveDate::parse_from_str(raw, fmt).ok())
                .flatten()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc()),
        }
    }
}

/// Parse a timestamp, falling back to base-10 Unix epoch seconds.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Some(ts) = LAYOUTS.iter().find_map(|layout| layout.parse(raw)) {
        return Ok(ts);
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| "time layout invalid".to_string())
}
