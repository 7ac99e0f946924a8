//! Rasterization of climate fields.
//!
//! - Scalar rasters through a named color ramp, with the rounded values
//!   alongside
//! - Wind component rasters
//! - Vertical color legends
//! - PNG encoding for inspection dumps

pub mod colormap;
pub mod error;
pub mod legend;
pub mod png;
pub mod raster;
pub mod wind;

pub use colormap::{Colormap, Normalize};
pub use error::{RenderError, Result};
pub use legend::{legend_rgba, render_legend, LegendStyle, LEGEND_HEIGHT, LEGEND_WIDTH};
pub use raster::{render_scalar, ScalarRaster};
pub use wind::render_wind;
