//! RTMA pipeline: locate, fetch, regrid, crop and render one analysis hour.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use climate_common::{
    ConversionStage, HourRequest, PipeError, PipeResult, RegularField, VariableSpec,
};
use grib2_parser::{Grib2File, MessageFilter};
use grid_processor::{regrid_nearest, CropWindow, WorkerPool};
use renderer::{legend_rgba, render_scalar, render_wind, Colormap, LegendStyle, Normalize};
use storage::{locate_rtma, ObjectSource};
use tracing::{debug, info, instrument};

use crate::config::PipeConfig;
use crate::payload::VisPayload;
use crate::style::StyleTable;

const WIND_U: &str = "10u";
const WIND_V: &str = "10v";
const TEMPERATURE: &str = "2t";

pub struct RtmaPipe {
    source: Arc<ObjectSource>,
    pool: Arc<WorkerPool>,
    window: CropWindow,
    dataset: String,
    filters: Vec<MessageFilter>,
    styles: StyleTable,
}

impl RtmaPipe {
    /// Pipeline over the anonymous public bucket described by `config`.
    pub fn from_config(config: &PipeConfig) -> PipeResult<Self> {
        let source = ObjectSource::anonymous_s3(&config.source)?;
        Self::new(source, config)
    }

    pub fn new(source: ObjectSource, config: &PipeConfig) -> PipeResult<Self> {
        Ok(Self {
            source: Arc::new(source),
            pool: Arc::new(WorkerPool::new(config.workers)?),
            window: CropWindow::new(config.crop),
            dataset: config.dataset.clone(),
            filters: MessageFilter::rtma_defaults(),
            styles: config.styles.clone(),
        })
    }

    pub fn source(&self) -> &ObjectSource {
        &self.source
    }

    /// Build the full visualization payload for one hour.
    #[instrument(skip(self, req), fields(date = %req.date, hour = req.hour))]
    pub async fn visualize(&self, req: &HourRequest) -> PipeResult<VisPayload> {
        let start = Instant::now();

        let paths = self.fetch_files(req).await?;

        let pool = self.pool.clone();
        let filters = self.filters.clone();
        let fields = tokio::task::spawn_blocking(move || load_fields(&pool, paths, &filters))
            .await
            .map_err(|e| PipeError::source(format!("regrid task failed: {}", e)))??;

        let cropped = self.window.crop_all(&fields)?;
        let payload = self.render(&cropped)?;

        info!(
            height = payload.height,
            width = payload.width,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "RTMA payload assembled"
        );
        Ok(payload)
    }

    /// Local copies of the first file variant present for the hour.
    ///
    /// The listing cache is cleared afterwards whatever the outcome, so a
    /// later request never sees a listing from this one.
    async fn fetch_files(&self, req: &HourRequest) -> PipeResult<Vec<PathBuf>> {
        let result = self.locate_and_fetch(req).await;
        self.source.invalidate_cache();
        result
    }

    async fn locate_and_fetch(&self, req: &HourRequest) -> PipeResult<Vec<PathBuf>> {
        let keys = locate_rtma(self.source.as_ref(), &self.dataset, req.date, req.hour).await?;
        let mut paths = Vec::with_capacity(keys.len());
        for key in &keys {
            paths.push(self.source.fetch(key).await?);
        }
        Ok(paths)
    }

    fn render(&self, fields: &[RegularField]) -> PipeResult<VisPayload> {
        let u = find_field(fields, WIND_U)?;
        let v = find_field(fields, WIND_V)?;
        let t = find_field(fields, TEMPERATURE)?;

        let style = self
            .styles
            .get(TEMPERATURE)
            .ok_or_else(|| PipeError::Config(format!("no style for {}", TEMPERATURE)))?;
        let cmap = Colormap::by_name(&style.colormap)?;
        let norm = Normalize::new(style.vmin, style.vmax)?;

        let conversion = VariableSpec::conversion_at(TEMPERATURE, ConversionStage::OnRender);
        let display = t.clone().map_values(|k| conversion.apply(k));

        // Converted at render time, so pixels and values are both in display units
        let raster = render_scalar(&display, &cmap, norm)?;

        let wind = render_wind(u, v)?;
        let legend = legend_rgba(&cmap, norm, &LegendStyle::new(style.title.as_str()));

        let bounds = t
            .bounds()
            .ok_or_else(|| PipeError::NoData("grid points inside the crop window".into()))?;
        VisPayload::assemble(raster, bounds, Some(wind), Some(legend))
    }
}

/// Open every file, then regrid every (file, filter) combination on the
/// pool. Fields come back in (file, filter) enumeration order.
fn load_fields(
    pool: &WorkerPool,
    paths: Vec<PathBuf>,
    filters: &[MessageFilter],
) -> PipeResult<Vec<RegularField>> {
    let files = pool.try_map_ordered(paths, |path| {
        Grib2File::open(&path)
            .map(Arc::new)
            .map_err(PipeError::from)
    })?;

    let units: Vec<(Arc<Grib2File>, MessageFilter)> = files
        .iter()
        .flat_map(|file| filters.iter().map(move |f| (file.clone(), f.clone())))
        .collect();
    debug!(files = files.len(), units = units.len(), "Dispatching regrid units");

    pool.try_map_ordered(units, |(file, filter)| regrid_unit(&file, &filter))
}

fn regrid_unit(file: &Grib2File, filter: &MessageFilter) -> PipeResult<RegularField> {
    let field = file
        .read_first(filter)?
        .ok_or_else(|| PipeError::MissingField(filter.to_string()))?;
    let mut regular = regrid_nearest(&field.into_curvilinear()?)?;
    regular.name = filter.field_name();
    Ok(regular)
}

fn find_field<'a>(fields: &'a [RegularField], name: &str) -> PipeResult<&'a RegularField> {
    fields
        .iter()
        .find(|f| f.name == name)
        .ok_or_else(|| PipeError::MissingField(name.to_string()))
}
