//! Climate visualization pipelines.
//!
//! - [`RtmaPipe`]: RTMA GRIB2 analysis from the public bucket, regridded,
//!   cropped and rendered with a wind raster and legend
//! - [`SensorPipe`]: the local sensor archive, hour rasters and point
//!   time series
//!
//! Both return payloads ready for JSON serialization; failures become a
//! [`Payload::Failure`] through [`Payload::from_result`].

pub mod config;
pub mod payload;
pub mod rtma;
pub mod sensor;
pub mod style;

pub use config::{ConfigError, PipeConfig};
pub use payload::{FailurePayload, Payload, TimeSeriesPayload, VisPayload, SUCCESS};
pub use rtma::RtmaPipe;
pub use sensor::{SensorPipe, DATE_FORMAT};
pub use style::{RenderStyle, StyleTable};
