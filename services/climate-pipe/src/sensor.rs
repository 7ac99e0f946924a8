//! Sensor archive pipeline: hour visualization and point time series.

use std::path::Path;
use std::time::Instant;

use climate_common::{
    is_missing, ConversionStage, HourRequest, PipeError, PipeResult, RegularField,
    TimeSeriesRequest, VariableSpec,
};
use netcdf_parser::SensorArchive;
use renderer::{render_scalar, Colormap, Normalize};
use storage::LocalSource;
use tracing::{info, instrument};

use crate::config::PipeConfig;
use crate::payload::{TimeSeriesPayload, VisPayload};
use crate::style::{RenderStyle, StyleTable};

/// Timestamp format of the `DATES` array.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone)]
pub struct SensorPipe {
    archive: LocalSource,
    styles: StyleTable,
}

impl SensorPipe {
    pub fn from_config(config: &PipeConfig) -> Self {
        Self::new(LocalSource::new(config.sensor_archive.clone()), config.styles.clone())
    }

    pub fn new(archive: LocalSource, styles: StyleTable) -> Self {
        Self { archive, styles }
    }

    /// Raster and values of one variable at the archive time nearest the
    /// requested hour.
    #[instrument(skip(self, req), fields(date = %req.date, hour = req.hour, variable = ?req.variable))]
    pub async fn hour_vis(&self, req: &HourRequest) -> PipeResult<VisPayload> {
        let variable = req
            .variable
            .clone()
            .ok_or_else(|| PipeError::InvalidRequest("climateVar is required".into()))?;
        let path = self.archive.resolve()?;
        let style = self.styles.get(&variable).cloned();
        let when = req.datetime();

        run_blocking(move || {
            let start = Instant::now();
            let archive = open_archive(&path, &variable)?;
            let t = archive
                .nearest_time(when)
                .ok_or_else(|| PipeError::NoData(format!("time steps in {}", path.display())))?;

            let conversion = VariableSpec::conversion_at(&variable, ConversionStage::OnLoad);
            let field = archive
                .read_field(&variable, t)?
                .map_values(|v| conversion.apply(v));

            let style = style.map_or_else(|| fallback_style(&field), Ok)?;
            let cmap = Colormap::by_name(&style.colormap)?;
            let norm = Normalize::new(style.vmin, style.vmax)?;
            let raster = render_scalar(&field, &cmap, norm)?;
            let bounds = field
                .bounds()
                .ok_or_else(|| PipeError::NoData("archive coordinates".into()))?;

            info!(
                time_index = t,
                height = raster.height,
                width = raster.width,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Sensor payload assembled"
            );
            VisPayload::assemble(raster, bounds, None, None)
        })
        .await
    }

    /// Values of one variable at the grid point nearest (`lon`, `lat`) over
    /// the closed requested interval.
    #[instrument(skip(self, req), fields(lon = req.lon, lat = req.lat, variable = %req.variable))]
    pub async fn time_series(&self, req: &TimeSeriesRequest) -> PipeResult<TimeSeriesPayload> {
        let path = self.archive.resolve()?;
        let req = req.clone();

        run_blocking(move || {
            let archive = open_archive(&path, &req.variable)?;
            let (col, row) = archive
                .nearest_point(req.lon, req.lat)
                .ok_or_else(|| PipeError::NoData("archive coordinates".into()))?;
            let range = archive.time_range(req.start, req.end);

            let conversion = VariableSpec::conversion_at(&req.variable, ConversionStage::OnLoad);
            let values = archive.read_point_series(&req.variable, range.clone(), row, col)?;

            let dates = archive.times()[range]
                .iter()
                .map(|t| t.format(DATE_FORMAT).to_string())
                .collect();
            let data = values
                .into_iter()
                .map(|v| {
                    if is_missing(v) {
                        None
                    } else {
                        Some(conversion.apply(v) as f64)
                    }
                })
                .collect();

            info!(
                lon = archive.lon()[col],
                lat = archive.lat()[row],
                "Extracted point series"
            );
            TimeSeriesPayload::assemble(dates, data)
        })
        .await
    }
}

fn open_archive(path: &Path, variable: &str) -> PipeResult<SensorArchive> {
    let archive = SensorArchive::open(path)?;
    if !archive.variable_names().iter().any(|v| v == variable) {
        return Err(PipeError::UnknownVariable(variable.to_string()));
    }
    Ok(archive)
}

/// Range of the data itself for variables without a configured style.
fn fallback_style(field: &RegularField) -> PipeResult<RenderStyle> {
    let (lo, hi) = field
        .values
        .iter()
        .filter(|v| !is_missing(**v))
        .fold(None, |acc: Option<(f32, f32)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or_else(|| PipeError::NoData(format!("values of {}", field.name)))?;
    let (lo, hi) = (lo as f64, hi as f64);
    let hi = if hi > lo { hi } else { lo + 1.0 };
    Ok(RenderStyle::new(lo, hi, &field.name))
}

async fn run_blocking<T, F>(job: F) -> PipeResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> PipeResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| PipeError::source(format!("archive task failed: {}", e)))?
}
