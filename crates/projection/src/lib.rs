//! Coordinate reference system transformations.
//!
//! Only the grid types the climate sources use are implemented: Lambert
//! conformal conic (RTMA) and regular latitude/longitude.

pub mod lambert;
pub mod latlon;
pub mod scan;

pub use lambert::LambertConformal;
pub use latlon::LatLonGrid;
pub use scan::{coordinate_arrays, ScanMode};

/// Maps fractional grid offsets from the first grid point to (lat, lon) degrees.
pub trait GridProjection {
    fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64);

    /// Grid size as (nx, ny).
    fn dimensions(&self) -> (usize, usize);
}

/// Wrap a longitude into [-180, 180).
#[inline]
pub fn normalize_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
