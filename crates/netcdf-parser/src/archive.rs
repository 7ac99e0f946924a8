//! Sensor archive access: axes, time lookup, slabs and point series.

use std::ops::Range;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use climate_common::RegularField;
use tracing::{debug, instrument};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{get_string_attr, missing_markers, silence_hdf5_errors};
use crate::time::CfTimeUnits;

pub const TIME_DIM: &str = "time";
pub const LAT_DIM: &str = "south_north";
pub const LON_DIM: &str = "west_east";

/// An opened sensor archive with its coordinate axes loaded.
pub struct SensorArchive {
    path: PathBuf,
    file: netcdf::File,
    lon: Vec<f64>,
    lat: Vec<f64>,
    times: Vec<NaiveDateTime>,
}

impl std::fmt::Debug for SensorArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorArchive")
            .field("path", &self.path)
            .field("lon", &self.lon.len())
            .field("lat", &self.lat.len())
            .field("times", &self.times.len())
            .finish()
    }
}

impl SensorArchive {
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> NetCdfResult<Self> {
        silence_hdf5_errors();
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(NetCdfError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("sensor archive {} not found", path.display()),
            )));
        }

        let file = netcdf::open(&path)?;
        let lon = read_axis(&file, LON_DIM)?;
        let lat = read_axis(&file, LAT_DIM)?;
        let times = read_times(&file)?;

        debug!(
            nx = lon.len(),
            ny = lat.len(),
            nt = times.len(),
            "Opened sensor archive"
        );
        Ok(Self {
            path,
            file,
            lon,
            lat,
            times,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// Data variables, i.e. every variable spanning all three dimensions.
    pub fn variable_names(&self) -> Vec<String> {
        self.file
            .variables()
            .filter(|v| v.dimensions().len() == 3)
            .map(|v| v.name())
            .collect()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    /// Index of the time step closest to `when`.
    pub fn nearest_time(&self, when: NaiveDateTime) -> Option<usize> {
        self.times
            .iter()
            .enumerate()
            .min_by_key(|(_, t)| (**t - when).num_milliseconds().abs())
            .map(|(i, _)| i)
    }

    /// Column and row of the grid point nearest (`lon`, `lat`), each axis
    /// searched independently.
    pub fn nearest_point(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        Some((nearest_index(&self.lon, lon)?, nearest_index(&self.lat, lat)?))
    }

    /// Time steps inside the closed interval [`start`, `end`].
    ///
    /// Returns an empty range when nothing falls inside.
    pub fn time_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> Range<usize> {
        let first = self.times.iter().position(|t| *t >= start && *t <= end);
        match first {
            Some(first) => {
                let len = self.times[first..]
                    .iter()
                    .take_while(|t| **t <= end)
                    .count();
                first..first + len
            }
            None => 0..0,
        }
    }

    /// The 2D slab of `name` at time step `t`, rows along `south_north`.
    #[instrument(skip(self))]
    pub fn read_field(&self, name: &str, t: usize) -> NetCdfResult<RegularField> {
        if t >= self.times.len() {
            return Err(NetCdfError::InvalidFormat(format!(
                "time index {} out of range ({} steps)",
                t,
                self.times.len()
            )));
        }
        let (var, order) = self.data_variable(name)?;

        let extents = order.extents(t..t + 1, 0..self.lat.len(), 0..self.lon.len());
        let raw: Vec<f32> = var.get_values::<f32, _>(extents)?;
        let mut values = order.to_row_major(raw, self.lat.len(), self.lon.len());
        mask_missing(&mut values, &missing_markers(&var));

        RegularField::new(name, self.lon.clone(), self.lat.clone(), values)
            .map_err(|e| NetCdfError::InvalidFormat(e.to_string()))
    }

    /// Values of `name` at one grid point for the time steps in `range`.
    #[instrument(skip(self))]
    pub fn read_point_series(
        &self,
        name: &str,
        range: Range<usize>,
        row: usize,
        col: usize,
    ) -> NetCdfResult<Vec<f32>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        if row >= self.lat.len() || col >= self.lon.len() || range.end > self.times.len() {
            return Err(NetCdfError::InvalidFormat(format!(
                "point ({}, {}) or time steps {:?} outside archive",
                row, col, range
            )));
        }
        let (var, order) = self.data_variable(name)?;

        let extents = order.extents(range, row..row + 1, col..col + 1);
        let mut values: Vec<f32> = var.get_values::<f32, _>(extents)?;
        mask_missing(&mut values, &missing_markers(&var));
        Ok(values)
    }

    fn data_variable(&self, name: &str) -> NetCdfResult<(netcdf::Variable<'_>, DimOrder)> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| NetCdfError::UnknownVariable(name.to_string()))?;
        let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
        let order = DimOrder::from_names(&dims).ok_or_else(|| {
            NetCdfError::InvalidFormat(format!(
                "{} has dimensions {:?}, expected time, {} and {}",
                name, dims, LAT_DIM, LON_DIM
            ))
        })?;
        Ok((var, order))
    }

    /// Encoded time units of the archive, for diagnostics.
    pub fn time_units(&self) -> Option<String> {
        self.file
            .variable(TIME_DIM)
            .and_then(|v| get_string_attr(&v, "units"))
    }
}

/// Position of each logical dimension in a variable's declared order.
#[derive(Debug, Clone, Copy)]
struct DimOrder {
    time: usize,
    lat: usize,
    lon: usize,
}

type Extents3 = (Range<usize>, Range<usize>, Range<usize>);

impl DimOrder {
    fn from_names(dims: &[String]) -> Option<Self> {
        if dims.len() != 3 {
            return None;
        }
        let pos = |name: &str| dims.iter().position(|d| d == name);
        Some(Self {
            time: pos(TIME_DIM)?,
            lat: pos(LAT_DIM)?,
            lon: pos(LON_DIM)?,
        })
    }

    fn extents(&self, time: Range<usize>, lat: Range<usize>, lon: Range<usize>) -> Extents3 {
        let mut slots = [0..0, 0..0, 0..0];
        slots[self.time] = time;
        slots[self.lat] = lat;
        slots[self.lon] = lon;
        let [a, b, c] = slots;
        (a, b, c)
    }

    /// Reorder a single-time slab into (lat, lon) row-major order.
    fn to_row_major(&self, raw: Vec<f32>, ny: usize, nx: usize) -> Vec<f32> {
        if self.lat < self.lon {
            return raw;
        }
        // Stored as (lon, lat)
        let mut values = vec![0.0; raw.len()];
        for i in 0..nx {
            for j in 0..ny {
                values[j * nx + i] = raw[i * ny + j];
            }
        }
        values
    }
}

fn mask_missing(values: &mut [f32], markers: &[f32]) {
    if markers.is_empty() {
        return;
    }
    for v in values.iter_mut() {
        if markers.iter().any(|m| *v == *m) {
            *v = f32::NAN;
        }
    }
}

fn read_axis(file: &netcdf::File, name: &str) -> NetCdfResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} coordinate variable", name)))?;
    Ok(var.get_values::<f64, _>(..)?)
}

fn read_times(file: &netcdf::File) -> NetCdfResult<Vec<NaiveDateTime>> {
    let var = file
        .variable(TIME_DIM)
        .ok_or_else(|| NetCdfError::MissingData("time coordinate variable".to_string()))?;
    let units = get_string_attr(&var, "units")
        .ok_or_else(|| NetCdfError::MissingData("time units attribute".to_string()))?;
    let units = CfTimeUnits::parse(&units)?;
    let raw: Vec<f64> = var.get_values::<f64, _>(..)?;
    Ok(raw.into_iter().map(|v| units.decode(v)).collect())
}

/// Index of the entry in `axis` closest to `value`; ties go to the lower index.
pub fn nearest_index(axis: &[f64], value: f64) -> Option<usize> {
    if value.is_nan() {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for (i, a) in axis.iter().enumerate() {
        let d = (a - value).abs();
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_index() {
        let axis = [-118.0, -117.5, -117.0];
        assert_eq!(nearest_index(&axis, -117.6), Some(1));
        assert_eq!(nearest_index(&axis, -200.0), Some(0));
        assert_eq!(nearest_index(&axis, 0.0), Some(2));
        assert_eq!(nearest_index(&[], 0.0), None);
    }

    #[test]
    fn test_nearest_index_tie_goes_low() {
        assert_eq!(nearest_index(&[0.0, 1.0], 0.5), Some(0));
    }

    #[test]
    fn test_dim_order_extents() {
        let names: Vec<String> = ["west_east", "time", "south_north"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let order = DimOrder::from_names(&names).unwrap();
        let (a, b, c) = order.extents(2..3, 0..4, 0..5);
        assert_eq!((a, b, c), (0..5, 2..3, 0..4));
    }

    #[test]
    fn test_transposed_slab_reordered() {
        let names: Vec<String> = ["time", "west_east", "south_north"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let order = DimOrder::from_names(&names).unwrap();
        // nx = 3, ny = 2 stored lon-major
        let raw = vec![0.0, 10.0, 1.0, 11.0, 2.0, 12.0];
        assert_eq!(
            order.to_row_major(raw, 2, 3),
            vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]
        );
    }

    #[test]
    fn test_mask_missing() {
        let mut values = vec![1.0, -999.0, 3.0, 1e20];
        mask_missing(&mut values, &[-999.0, 1e20]);
        assert!(values[1].is_nan() && values[3].is_nan());
        assert_eq!(values[0], 1.0);
    }
}
