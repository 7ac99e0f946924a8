//! GRIB2 scanning mode (flag table 3.4) and coordinate array generation.

use crate::{normalize_lon, GridProjection};

/// Scanning mode flags (octet 65 of template 3.30, octet 72 of template 3.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanMode(pub u8);

impl ScanMode {
    pub const I_NEGATIVE: u8 = 0x80;
    pub const J_POSITIVE: u8 = 0x40;
    pub const J_CONSECUTIVE: u8 = 0x20;
    pub const BOUSTROPHEDON: u8 = 0x10;

    pub fn i_negative(&self) -> bool {
        self.0 & Self::I_NEGATIVE != 0
    }

    pub fn j_positive(&self) -> bool {
        self.0 & Self::J_POSITIVE != 0
    }

    pub fn j_consecutive(&self) -> bool {
        self.0 & Self::J_CONSECUTIVE != 0
    }

    pub fn boustrophedon(&self) -> bool {
        self.0 & Self::BOUSTROPHEDON != 0
    }

    /// Signed grid offsets (i, j) from the first grid point for the `k`-th
    /// value in storage order.
    pub fn offsets(&self, k: usize, nx: usize, ny: usize) -> (f64, f64) {
        let (mut col, mut row) = if self.j_consecutive() {
            (k / ny, k % ny)
        } else {
            (k % nx, k / nx)
        };

        if self.boustrophedon() {
            if self.j_consecutive() && col % 2 == 1 {
                row = ny - 1 - row;
            } else if !self.j_consecutive() && row % 2 == 1 {
                col = nx - 1 - col;
            }
        }

        let i = if self.i_negative() { -(col as f64) } else { col as f64 };
        let j = if self.j_positive() { row as f64 } else { -(row as f64) };
        (i, j)
    }
}

/// Longitude and latitude for every value of a grid, in storage order.
///
/// Longitudes are normalized into [-180, 180).
pub fn coordinate_arrays<P: GridProjection>(proj: &P, scan: ScanMode) -> (Vec<f64>, Vec<f64>) {
    let (nx, ny) = proj.dimensions();
    let count = nx * ny;
    let mut lon = Vec::with_capacity(count);
    let mut lat = Vec::with_capacity(count);

    for k in 0..count {
        let (i, j) = scan.offsets(k, nx, ny);
        let (y, x) = proj.grid_to_geo(i, j);
        lat.push(y);
        lon.push(normalize_lon(x));
    }

    (lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LatLonGrid;

    #[test]
    fn test_default_scan_runs_north_to_south() {
        let grid = LatLonGrid::new(35.0, 240.0, 1.0, 1.0, 3, 2);
        let (lon, lat) = coordinate_arrays(&grid, ScanMode(0));
        assert_eq!(lat, vec![35.0, 35.0, 35.0, 34.0, 34.0, 34.0]);
        assert_eq!(lon, vec![-120.0, -119.0, -118.0, -120.0, -119.0, -118.0]);
    }

    #[test]
    fn test_j_positive_scan() {
        let grid = LatLonGrid::new(32.0, -118.0, 0.5, 0.5, 2, 2);
        let (lon, lat) = coordinate_arrays(&grid, ScanMode(ScanMode::J_POSITIVE));
        assert_eq!(lat, vec![32.0, 32.0, 32.5, 32.5]);
        assert_eq!(lon, vec![-118.0, -117.5, -118.0, -117.5]);
    }

    #[test]
    fn test_i_negative_and_j_consecutive() {
        let scan = ScanMode(ScanMode::I_NEGATIVE | ScanMode::J_CONSECUTIVE | ScanMode::J_POSITIVE);
        assert_eq!(scan.offsets(0, 3, 2), (0.0, 0.0));
        assert_eq!(scan.offsets(1, 3, 2), (0.0, 1.0));
        assert_eq!(scan.offsets(2, 3, 2), (-1.0, 0.0));
    }

    #[test]
    fn test_boustrophedon_reverses_odd_rows() {
        let scan = ScanMode(ScanMode::J_POSITIVE | ScanMode::BOUSTROPHEDON);
        assert_eq!(scan.offsets(3, 3, 2), (2.0, 1.0));
        assert_eq!(scan.offsets(5, 3, 2), (0.0, 1.0));
    }
}
