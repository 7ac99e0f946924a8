//! Climate pipeline command line.
//!
//! Runs one request and prints its JSON payload on stdout. Logs go to
//! stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use climate_common::{HourRequest, PipeResult, TimeSeriesRequest};
use climate_pipe::{Payload, PipeConfig, RtmaPipe, SensorPipe, StyleTable, VisPayload};
use renderer::{png::encode_rgba, LEGEND_HEIGHT, LEGEND_WIDTH};

#[derive(Parser, Debug)]
#[command(name = "climate-pipe")]
#[command(about = "RTMA and sensor archive visualization payloads")]
struct Args {
    /// RTMA bucket
    #[arg(long, env = "CLIMATE_BUCKET")]
    bucket: Option<String>,

    /// Bucket region
    #[arg(long, env = "CLIMATE_REGION")]
    region: Option<String>,

    /// Directory downloaded RTMA files are kept in
    #[arg(long, env = "CLIMATE_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Sensor NetCDF archive
    #[arg(long, env = "CLIMATE_SENSOR_ARCHIVE")]
    sensor_archive: Option<PathBuf>,

    /// Regridding worker threads
    #[arg(long, env = "CLIMATE_WORKERS")]
    workers: Option<usize>,

    /// Color ramp for every variable (turbo, viridis, greys)
    #[arg(long, env = "CLIMATE_COLORMAP")]
    colormap: Option<String>,

    /// YAML file with per-variable render settings
    #[arg(long, env = "CLIMATE_STYLE_FILE")]
    style_file: Option<PathBuf>,

    /// Write the payload here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the rasters as PNG files into this directory
    #[arg(long)]
    png_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// RTMA temperature, wind and legend rasters for one hour
    Rtma {
        #[arg(long)]
        year: String,
        #[arg(long)]
        month: String,
        #[arg(long)]
        day: String,
        #[arg(long)]
        hour: String,
    },
    /// Sensor archive raster for one hour
    SensorHour {
        #[arg(long)]
        year: String,
        #[arg(long)]
        month: String,
        #[arg(long)]
        day: String,
        #[arg(long)]
        hour: String,
        /// Variable name, e.g. td2m
        #[arg(long = "var")]
        climate_var: String,
    },
    /// Sensor archive values at the grid point nearest a location
    TimeSeries {
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long = "var")]
        climate_var: String,
        /// First timestamp, `YYYY-MM-DD[ HH:MM]`
        #[arg(long)]
        start: Option<String>,
        /// Last timestamp (inclusive)
        #[arg(long)]
        end: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = load_config(&args)?;
    info!(
        bucket = %config.source.bucket,
        archive = %config.sensor_archive.display(),
        workers = config.workers,
        "Loaded configuration"
    );

    let payload = match &args.command {
        Command::Rtma {
            year,
            month,
            day,
            hour,
        } => Payload::from_result(run_rtma(&config, [year, month, day, hour]).await),
        Command::SensorHour {
            year,
            month,
            day,
            hour,
            climate_var,
        } => Payload::from_result(
            run_sensor_hour(&config, [year, month, day, hour], climate_var).await,
        ),
        Command::TimeSeries {
            lon,
            lat,
            climate_var,
            start,
            end,
        } => {
            let result = match time_series_request(*lon, *lat, climate_var, start, end) {
                Ok(req) => SensorPipe::from_config(&config).time_series(&req).await,
                Err(e) => Err(e),
            };
            Payload::from_result(result)
        }
    };

    if let (Some(dir), Payload::Vis(vis)) = (&args.png_dir, &payload) {
        write_pngs(dir, vis)?;
    }

    let json = payload.to_json()?;
    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("writing payload to {}", path.display()))?,
        None => println!("{}", json),
    }

    Ok(if payload.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_rtma(config: &PipeConfig, [y, m, d, h]: [&String; 4]) -> PipeResult<VisPayload> {
    let req = HourRequest::from_parts(y, m, d, h)?;
    RtmaPipe::from_config(config)?.visualize(&req).await
}

async fn run_sensor_hour(
    config: &PipeConfig,
    [y, m, d, h]: [&String; 4],
    climate_var: &str,
) -> PipeResult<VisPayload> {
    let req = HourRequest::from_parts(y, m, d, h)?.with_variable(climate_var);
    SensorPipe::from_config(config).hour_vis(&req).await
}

fn time_series_request(
    lon: f64,
    lat: f64,
    climate_var: &str,
    start: &Option<String>,
    end: &Option<String>,
) -> PipeResult<TimeSeriesRequest> {
    let req = TimeSeriesRequest::new(lon, lat, climate_var);
    if start.is_none() && end.is_none() {
        return Ok(req);
    }
    let (default_start, default_end) = TimeSeriesRequest::default_range();
    let start = start.clone().unwrap_or_else(|| default_start.to_string());
    let end = end.clone().unwrap_or_else(|| default_end.to_string());
    req.with_range(&start, &end)
}

fn load_config(args: &Args) -> Result<PipeConfig> {
    let mut config = PipeConfig::from_env().context("reading CLIMATE_* environment")?;

    if let Some(bucket) = &args.bucket {
        config.source.bucket = bucket.clone();
    }
    if let Some(region) = &args.region {
        config.source.region = region.clone();
    }
    if let Some(dir) = &args.cache_dir {
        config.source.cache_dir = dir.clone();
    }
    if let Some(path) = &args.sensor_archive {
        config.sensor_archive = path.clone();
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(path) = &args.style_file {
        config.styles = StyleTable::from_yaml_file(path)?;
    }
    if let Some(colormap) = &args.colormap {
        config.styles = config.styles.with_colormap(colormap);
    }

    config.validate()?;
    Ok(config)
}

fn write_pngs(dir: &Path, vis: &VisPayload) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut rasters = vec![("climate_var.png", &vis.climate_var_image, vis.width, vis.height)];
    if let Some(wind) = &vis.wind_image {
        rasters.push(("wind.png", wind, vis.width, vis.height));
    }
    if let Some(legend) = &vis.legend_array {
        rasters.push(("legend.png", legend, LEGEND_WIDTH as usize, LEGEND_HEIGHT as usize));
    }
    for (name, pixels, width, height) in rasters {
        let png = encode_rgba(pixels, width, height)?;
        let path = dir.join(name);
        std::fs::write(&path, png)?;
        info!(path = %path.display(), width, height, "Wrote PNG");
    }
    Ok(())
}
