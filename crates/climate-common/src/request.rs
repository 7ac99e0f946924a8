//! Validated request parameters handed to the pipelines.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{PipeError, PipeResult};

/// A single analysis hour, optionally naming a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRequest {
    pub date: NaiveDate,
    pub hour: u32,
    pub variable: Option<String>,
}

impl HourRequest {
    /// Build from the string fields a client sends (`"2024"`, `"3"`, `"07"`, `"12"`).
    pub fn from_parts(year: &str, month: &str, day: &str, hour: &str) -> PipeResult<Self> {
        let year: i32 = parse_field("year", year)?;
        let month: u32 = parse_field("month", month)?;
        let day: u32 = parse_field("day", day)?;
        let hour: u32 = parse_field("hour", hour)?;

        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            PipeError::InvalidRequest(format!("no such date {}-{}-{}", year, month, day))
        })?;
        if hour > 23 {
            return Err(PipeError::InvalidRequest(format!("hour out of range: {}", hour)));
        }

        Ok(Self {
            date,
            hour,
            variable: None,
        })
    }

    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    /// Requested instant.
    pub fn datetime(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN) + chrono::Duration::hours(self.hour as i64)
    }

    /// `YYYYMMDD` as used in object keys.
    pub fn compact_date(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }
}

/// Point time-series request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRequest {
    pub lon: f64,
    pub lat: f64,
    pub variable: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeSeriesRequest {
    /// Default range used when the client omits dates.
    pub fn default_range() -> (NaiveDateTime, NaiveDateTime) {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap_or_default();
        let end = NaiveDate::from_ymd_opt(2020, 9, 1).unwrap_or_default();
        (start.and_time(NaiveTime::MIN), end.and_time(NaiveTime::MIN))
    }

    pub fn new(lon: f64, lat: f64, variable: impl Into<String>) -> Self {
        let (start, end) = Self::default_range();
        Self {
            lon,
            lat,
            variable: variable.into(),
            start,
            end,
        }
    }

    /// Override the closed interval. Accepts `YYYY-MM-DD` or `YYYY-MM-DD HH:MM`.
    pub fn with_range(mut self, start: &str, end: &str) -> PipeResult<Self> {
        let start = parse_datetime(start)?;
        let end = parse_datetime(end)?;
        if end < start {
            return Err(PipeError::InvalidRequest(format!(
                "end {} precedes start {}",
                end, start
            )));
        }
        self.start = start;
        self.end = end;
        Ok(self)
    }
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM` or `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_datetime(s: &str) -> PipeResult<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| PipeError::InvalidRequest(format!("invalid date: {}", s)))
}

fn parse_field<T: std::str::FromStr>(name: &str, value: &str) -> PipeResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| PipeError::InvalidRequest(format!("invalid {}: '{}'", name, value)))
}
