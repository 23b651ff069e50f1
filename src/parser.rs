//! Log line parser
//!
//! Turns a formatted line of the shape
//!
//! ```text
//! <prefix>\t[<YYYY/MM/DD> ][<HH:MM:SS[.ffffff]> ][<file>:<line>: ]<payload>
//! ```
//!
//! into a [`LogRecord`]. The pattern is compiled once per parser and shared
//! read-only, so one parser can serve every worker thread.

use crate::error::ParseError;
use crate::record::LogRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use regex::Regex;

/// Capture groups: prefix, date, time, file tag, payload
const LOG_LINE_PATTERN: &str = r"(?s)^([A-Za-z0-9_]+)\s+([0-9]{4}/[0-9]{2}/[0-9]{2}\s)?([0-9]{2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]+)?\s)?(\S+:[0-9]+:\s)?(.*)$";

const DATE_FORMAT: &str = "%Y/%m/%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// Regex-driven log line parser
#[derive(Debug, Clone)]
pub struct LogParser {
    pattern: Regex,
}

impl LogParser {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(LOG_LINE_PATTERN).expect("Invalid log line regex"),
        }
    }

    /// Parse a raw line, using the current time for missing date/time parts
    pub fn parse(&self, raw: &str) -> Result<LogRecord, ParseError> {
        self.parse_at(raw, Utc::now())
    }

    /// Parse a raw line with an explicit "now"
    ///
    /// - no date, no time: `now`
    /// - time only: the date of `now` combined with the parsed time
    /// - date only: parsed date at midnight
    /// - both: parsed date and time
    pub fn parse_at(&self, raw: &str, now: DateTime<Utc>) -> Result<LogRecord, ParseError> {
        let caps = self.pattern.captures(raw).ok_or(ParseError::InvalidLog)?;

        let prefix = caps.get(1).ok_or(ParseError::InvalidLog)?.as_str();
        let date = caps.get(2).map(|m| m.as_str().trim());
        let time = caps.get(3).map(|m| m.as_str().trim());
        let file = caps.get(4).map(|m| m.as_str().trim()).unwrap_or("");
        let payload = caps.get(5).map(|m| m.as_str()).unwrap_or("");

        let timestamp = parse_timestamp(date, time, now)?;

        Ok(LogRecord::new(prefix, timestamp, file, payload))
    }
}

impl Default for LogParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_timestamp(
    date: Option<&str>,
    time: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ParseError> {
    let naive = match (date, time) {
        (None, None) => return Ok(now),
        (None, Some(t)) => NaiveDateTime::new(now.date_naive(), parse_time(t)?),
        (Some(d), None) => NaiveDateTime::new(parse_date(d)?, NaiveTime::MIN),
        (Some(d), Some(t)) => NaiveDateTime::new(parse_date(d)?, parse_time(t)?),
    };

    Ok(naive.and_utc())
}

fn parse_date(fragment: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(fragment, DATE_FORMAT).map_err(|e| ParseError::InvalidTimestamp {
        fragment: fragment.to_string(),
        reason: e.to_string(),
    })
}

fn parse_time(fragment: &str) -> Result<NaiveTime, ParseError> {
    let time =
        NaiveTime::parse_from_str(fragment, TIME_FORMAT).map_err(|e| ParseError::InvalidTimestamp {
            fragment: fragment.to_string(),
            reason: e.to_string(),
        })?;

    // chrono reads second 60 as a leap second at any minute
    if time.nanosecond() >= 1_000_000_000 {
        return Err(ParseError::InvalidTimestamp {
            fragment: fragment.to_string(),
            reason: "second out of range".to_string(),
        });
    }

    Ok(time)
}
