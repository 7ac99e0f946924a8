//! Gridded scalar fields.
//!
//! Two shapes are used by the pipelines:
//! - [`CurvilinearField`]: 2D longitude/latitude arrays co-indexed with the
//!   values, as decoded from projected GRIB2 grids.
//! - [`RegularField`]: independent 1D axes, as produced by the regridder or
//!   read from the sensor archive.
//!
//! Both store values row-major with row 0 at the southern edge. Missing
//! cells carry [`MISSING`].

use crate::bbox::BoundingBox;
use crate::error::{PipeError, PipeResult};

/// Missing-value marker.
pub const MISSING: f32 = f32::NAN;

/// True if `value` is the missing marker.
#[inline]
pub fn is_missing(value: f32) -> bool {
    value.is_nan()
}

/// `n` evenly spaced samples from `start` to `end` inclusive.
///
/// The last sample is exactly `end`; a single sample yields `[start]`.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut axis: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            axis[n - 1] = end;
            axis
        }
    }
}

/// A field whose coordinates are 2D arrays.
#[derive(Debug, Clone)]
pub struct CurvilinearField {
    pub name: String,
    /// Columns (x)
    pub nx: usize,
    /// Rows (y)
    pub ny: usize,
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    pub values: Vec<f32>,
}

impl CurvilinearField {
    pub fn new(
        name: impl Into<String>,
        nx: usize,
        ny: usize,
        lon: Vec<f64>,
        lat: Vec<f64>,
        values: Vec<f32>,
    ) -> PipeResult<Self> {
        let name = name.into();
        let expected = nx * ny;
        if lon.len() != expected || lat.len() != expected || values.len() != expected {
            return Err(PipeError::geometry(format!(
                "{}: expected {} cells ({}x{}), got lon={} lat={} values={}",
                name,
                expected,
                ny,
                nx,
                lon.len(),
                lat.len(),
                values.len()
            )));
        }
        Ok(Self {
            name,
            nx,
            ny,
            lon,
            lat,
            values,
        })
    }

    /// Extent of the coordinate arrays.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_coords(&self.lon, &self.lat)
    }

    /// True when `other` has identical coordinate arrays.
    pub fn same_grid(&self, other: &CurvilinearField) -> bool {
        self.nx == other.nx && self.ny == other.ny && self.lon == other.lon && self.lat == other.lat
    }
}

/// A field on a rectilinear mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularField {
    pub name: String,
    /// Longitude axis, one entry per column
    pub lon: Vec<f64>,
    /// Latitude axis, one entry per row
    pub lat: Vec<f64>,
    /// Row-major values, `lat.len() * lon.len()` entries
    pub values: Vec<f32>,
}

impl RegularField {
    pub fn new(
        name: impl Into<String>,
        lon: Vec<f64>,
        lat: Vec<f64>,
        values: Vec<f32>,
    ) -> PipeResult<Self> {
        let name = name.into();
        if values.len() != lon.len() * lat.len() {
            return Err(PipeError::geometry(format!(
                "{}: {} values for a {}x{} mesh",
                name,
                values.len(),
                lat.len(),
                lon.len()
            )));
        }
        Ok(Self {
            name,
            lon,
            lat,
            values,
        })
    }

    pub fn width(&self) -> usize {
        self.lon.len()
    }

    pub fn height(&self) -> usize {
        self.lat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at (`row`, `col`).
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        Some(self.values[row * self.width() + col])
    }

    /// Bounding box derived from the current axes.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_coords(&self.lon, &self.lat)
    }

    /// True when both fields sit on the same mesh.
    pub fn same_axes(&self, other: &RegularField) -> bool {
        self.lon == other.lon && self.lat == other.lat
    }

    /// Apply `f` to every non-missing value.
    pub fn map_values(mut self, f: impl Fn(f32) -> f32) -> Self {
        for v in self.values.iter_mut().filter(|v| !is_missing(**v)) {
            *v = f(*v);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints() {
        let axis = linspace(-120.0, -110.0, 11);
        assert_eq!(axis.len(), 11);
        assert_eq!(axis[0], -120.0);
        assert_eq!(axis[10], -110.0);
        assert!((axis[5] + 115.0).abs() < 1e-12);
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_regular_field_shape_checked() {
        let err = RegularField::new("t", vec![0.0, 1.0], vec![0.0], vec![1.0]).unwrap_err();
        assert!(matches!(err, PipeError::GeometryMismatch(_)));
    }

    #[test]
    fn test_curvilinear_shape_checked() {
        let err = CurvilinearField::new("u", 2, 2, vec![0.0; 4], vec![0.0; 3], vec![0.0; 4]);
        assert!(err.is_err());
    }

    #[test]
    fn test_map_values_skips_missing() {
        let field = RegularField::new("t", vec![0.0, 1.0], vec![0.0], vec![1.0, MISSING])
            .unwrap()
            .map_values(|v| v * 2.0);
        assert_eq!(field.values[0], 2.0);
        assert!(is_missing(field.values[1]));
    }

    #[test]
    fn test_get_out_of_range() {
        let field = RegularField::new("t", vec![0.0, 1.0], vec![0.0, 1.0], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(field.get(1, 0), Some(3.0));
        assert_eq!(field.get(2, 0), None);
    }
}
