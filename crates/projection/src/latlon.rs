//! Regular latitude/longitude grids (GRIB2 grid template 3.0).

use crate::GridProjection;

/// Equidistant cylindrical grid anchored at its first grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct LatLonGrid {
    pub lat1: f64,
    pub lon1: f64,
    /// Longitude increment along +i (degrees, positive)
    pub di: f64,
    /// Latitude increment along +j (degrees, positive)
    pub dj: f64,
    pub ni: usize,
    pub nj: usize,
}

impl LatLonGrid {
    pub fn new(lat1: f64, lon1: f64, di: f64, dj: f64, ni: usize, nj: usize) -> Self {
        Self {
            lat1,
            lon1,
            di: di.abs(),
            dj: dj.abs(),
            ni,
            nj,
        }
    }
}

impl GridProjection for LatLonGrid {
    fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        (self.lat1 + j * self.dj, self.lon1 + i * self.di)
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.ni, self.nj)
    }
}
