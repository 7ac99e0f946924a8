//! CF time axis decoding.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{NetCdfError, NetCdfResult};

/// Parsed `"<unit> since <reference>"` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfTimeUnits {
    /// Length of one unit in seconds
    pub seconds_per_unit: i64,
    pub reference: NaiveDateTime,
}

const REFERENCE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

impl CfTimeUnits {
    pub fn parse(units: &str) -> NetCdfResult<Self> {
        let (unit, reference) = units
            .split_once(" since ")
            .ok_or_else(|| NetCdfError::InvalidFormat(format!("time units '{}'", units)))?;

        let seconds_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
            "second" | "seconds" | "sec" | "secs" | "s" => 1,
            "minute" | "minutes" | "min" | "mins" => 60,
            "hour" | "hours" | "hr" | "hrs" | "h" => 3_600,
            "day" | "days" | "d" => 86_400,
            other => {
                return Err(NetCdfError::InvalidFormat(format!(
                    "unsupported time unit '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            seconds_per_unit,
            reference: parse_reference(reference)?,
        })
    }

    /// Timestamp for one encoded value, to the millisecond.
    pub fn decode(&self, value: f64) -> NaiveDateTime {
        let millis = (value * self.seconds_per_unit as f64 * 1000.0).round() as i64;
        self.reference + Duration::milliseconds(millis)
    }
}

fn parse_reference(text: &str) -> NetCdfResult<NaiveDateTime> {
    let text = text
        .trim()
        .trim_end_matches("UTC")
        .trim_end_matches('Z')
        .trim();

    REFERENCE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| NetCdfError::InvalidFormat(format!("time reference '{}'", text)))
}
