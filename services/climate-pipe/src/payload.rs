//! Response payloads.
//!
//! Images and values are flat JSON arrays, one number per byte or value.
//! A payload is either complete or replaced by a failure payload carrying
//! only `STATUS`.

use climate_common::{BoundingBox, PipeError, PipeResult};
use renderer::ScalarRaster;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const SUCCESS: &str = "SUCCESS";

/// Raster visualization of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisPayload {
    #[serde(rename = "STATUS")]
    pub status: String,
    /// `height * width * 4` RGBA bytes, top row first
    pub climate_var_image: Vec<u8>,
    /// `height * width` values rounded to 2 decimals; `null` where missing
    pub climate_var_values: Vec<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_image: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_array: Option<Vec<u8>>,
    /// `[lon_min, lat_min, lon_max, lat_max]` of the final mesh
    pub bounds: [f64; 4],
    pub height: usize,
    pub width: usize,
}

impl VisPayload {
    /// Check every part against the raster size and build the payload.
    pub fn assemble(
        raster: ScalarRaster,
        bounds: BoundingBox,
        wind: Option<Vec<u8>>,
        legend: Option<Vec<u8>>,
    ) -> PipeResult<Self> {
        let cells = raster.height * raster.width;
        if raster.rgba.len() != cells * 4 || raster.values.len() != cells {
            return Err(PipeError::geometry(format!(
                "raster of {}x{} has {} bytes and {} values",
                raster.height,
                raster.width,
                raster.rgba.len(),
                raster.values.len()
            )));
        }
        if let Some(wind) = &wind {
            if wind.len() != cells * 4 {
                return Err(PipeError::geometry(format!(
                    "wind raster has {} bytes, expected {}",
                    wind.len(),
                    cells * 4
                )));
            }
        }
        if bounds.to_array().iter().any(|v| !v.is_finite()) {
            return Err(PipeError::geometry("non-finite bounds"));
        }

        Ok(Self {
            status: SUCCESS.to_string(),
            climate_var_image: raster.rgba,
            climate_var_values: raster.values,
            wind_image: wind,
            legend_array: legend,
            bounds: bounds.to_array(),
            height: raster.height,
            width: raster.width,
        })
    }
}

/// Point time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPayload {
    #[serde(rename = "STATUS")]
    pub status: String,
    /// `YYYY-MM-DD HH:MM`
    #[serde(rename = "DATES")]
    pub dates: Vec<String>,
    /// Parallel to `dates`; `null` where the archive has no value
    #[serde(rename = "DATA")]
    pub data: Vec<Option<f64>>,
}

impl TimeSeriesPayload {
    pub fn assemble(dates: Vec<String>, data: Vec<Option<f64>>) -> PipeResult<Self> {
        if dates.len() != data.len() {
            return Err(PipeError::geometry(format!(
                "{} dates for {} values",
                dates.len(),
                data.len()
            )));
        }
        Ok(Self {
            status: SUCCESS.to_string(),
            dates,
            data,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailurePayload {
    #[serde(rename = "STATUS")]
    pub status: String,
}

/// Whatever a request produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Vis(Box<VisPayload>),
    TimeSeries(TimeSeriesPayload),
    Failure(FailurePayload),
}

impl Payload {
    /// Turn a pipeline result into a payload; errors become failures.
    pub fn from_result<T: Into<Payload>>(result: PipeResult<T>) -> Self {
        match result {
            Ok(payload) => payload.into(),
            Err(err) => {
                warn!(code = err.code(), error = %err, "Request failed");
                err.into()
            }
        }
    }

    pub fn status(&self) -> &str {
        match self {
            Payload::Vis(p) => &p.status,
            Payload::TimeSeries(p) => &p.status,
            Payload::Failure(p) => &p.status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == SUCCESS
    }

    pub fn to_json(&self) -> PipeResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<VisPayload> for Payload {
    fn from(p: VisPayload) -> Self {
        Payload::Vis(Box::new(p))
    }
}

impl From<TimeSeriesPayload> for Payload {
    fn from(p: TimeSeriesPayload) -> Self {
        Payload::TimeSeries(p)
    }
}

impl From<PipeError> for Payload {
    fn from(err: PipeError) -> Self {
        Payload::Failure(FailurePayload {
            status: err.status(),
        })
    }
}
