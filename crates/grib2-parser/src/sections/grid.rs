//! Grid definition (section 3) decoding.

use projection::{coordinate_arrays, LambertConformal, LatLonGrid, ScanMode};

use super::{read_signed_i32, read_u16, read_u32};
use crate::error::{Grib2Error, Result};

/// Supported grid definition templates.
#[derive(Debug, Clone)]
pub enum GridDefinition {
    /// Template 3.0
    LatLon { grid: LatLonGrid, scan: ScanMode },
    /// Template 3.30
    Lambert {
        projection: LambertConformal,
        scan: ScanMode,
    },
}

const MICRO: f64 = 1e-6;

impl GridDefinition {
    /// Decode a full section 3 buffer (including its 5 byte header).
    pub fn parse(sec: &[u8]) -> Result<Self> {
        if sec.len() < 14 {
            return Err(Grib2Error::section(3, "too short for a template number"));
        }
        let template = read_u16(sec, 12);
        match template {
            0 => Self::parse_latlon(sec),
            30 => Self::parse_lambert(sec),
            other => Err(Grib2Error::UnsupportedTemplate {
                section: 3,
                template: other,
            }),
        }
    }

    /// Template number this definition was decoded from.
    pub fn template(&self) -> u16 {
        match self {
            GridDefinition::LatLon { .. } => 0,
            GridDefinition::Lambert { .. } => 30,
        }
    }

    /// Grid size as (nx, ny).
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            GridDefinition::LatLon { grid, .. } => (grid.ni, grid.nj),
            GridDefinition::Lambert { projection, .. } => (projection.nx, projection.ny),
        }
    }

    /// 2D longitude/latitude arrays in value storage order, longitudes in [-180, 180).
    pub fn coordinates(&self) -> (Vec<f64>, Vec<f64>) {
        match self {
            GridDefinition::LatLon { grid, scan } => coordinate_arrays(grid, *scan),
            GridDefinition::Lambert { projection, scan } => coordinate_arrays(projection, *scan),
        }
    }

    fn parse_latlon(sec: &[u8]) -> Result<Self> {
        if sec.len() < 72 {
            return Err(Grib2Error::section(
                3,
                format!("template 3.0 needs 72 bytes, got {}", sec.len()),
            ));
        }
        let ni = read_u32(sec, 30) as usize;
        let nj = read_u32(sec, 34) as usize;

        // Basic angle 0 (or missing) means units of 1e-6 degree
        let basic_angle = read_u32(sec, 38);
        let subdivisions = read_u32(sec, 42);
        let unit = if basic_angle == 0 || basic_angle == u32::MAX || subdivisions == u32::MAX {
            MICRO
        } else {
            basic_angle as f64 / subdivisions as f64
        };

        let lat1 = read_signed_i32(sec, 46) as f64 * unit;
        let lon1 = read_signed_i32(sec, 50) as f64 * unit;
        let di = read_u32(sec, 63) as f64 * unit;
        let dj = read_u32(sec, 67) as f64 * unit;
        let scan = ScanMode(sec[71]);

        Ok(GridDefinition::LatLon {
            grid: LatLonGrid::new(lat1, lon1, di, dj, ni, nj),
            scan,
        })
    }

    fn parse_lambert(sec: &[u8]) -> Result<Self> {
        if sec.len() < 73 {
            return Err(Grib2Error::section(
                3,
                format!("template 3.30 needs 73 bytes, got {}", sec.len()),
            ));
        }
        let radius = earth_radius(sec);
        let nx = read_u32(sec, 30) as usize;
        let ny = read_u32(sec, 34) as usize;
        let la1 = read_signed_i32(sec, 38) as f64 * MICRO;
        let lo1 = read_signed_i32(sec, 42) as f64 * MICRO;
        let lov = read_signed_i32(sec, 51) as f64 * MICRO;
        // Dx/Dy are in units of 1e-3 m
        let dx = read_u32(sec, 55) as f64 * 1e-3;
        let dy = read_u32(sec, 59) as f64 * 1e-3;
        let scan = ScanMode(sec[64]);
        let latin1 = read_signed_i32(sec, 65) as f64 * MICRO;
        let latin2 = read_signed_i32(sec, 69) as f64 * MICRO;

        Ok(GridDefinition::Lambert {
            projection: LambertConformal::with_radius(
                la1, lo1, lov, latin1, latin2, dx, dy, nx, ny, radius,
            ),
            scan,
        })
    }
}

/// Earth radius from the shape code (octet 15) and scaled radius (octets 16-20).
fn earth_radius(sec: &[u8]) -> f64 {
    match sec[14] {
        0 => 6_367_470.0,
        1 => {
            let factor = sec[15] as i32;
            read_u32(sec, 16) as f64 * 10f64.powi(-factor)
        }
        _ => projection::lambert::NCEP_EARTH_RADIUS,
    }
}
