//! Lambert Conformal Conic projection.
//!
//! RTMA 2.5 km CONUS analyses are delivered on this projection (GRIB2 grid
//! template 3.30). Grid offsets are measured from the first grid point
//! (La1, Lo1) in units of Dx/Dy.

use std::f64::consts::PI;

use crate::GridProjection;

/// Radius of the spherical earth assumed by NCEP grids (meters).
pub const NCEP_EARTH_RADIUS: f64 = 6_371_229.0;

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian (LoV) in radians
    pub lon0: f64,
    /// First standard parallel in radians
    pub latin1: f64,
    /// Second standard parallel in radians
    pub latin2: f64,
    /// Latitude of first grid point in radians
    pub lat1: f64,
    /// Longitude of first grid point in radians
    pub lon1: f64,
    /// Grid spacing in X direction (meters)
    pub dx: f64,
    /// Grid spacing in Y direction (meters)
    pub dy: f64,
    pub nx: usize,
    pub ny: usize,
    pub earth_radius: f64,
    /// Cone constant
    n: f64,
    f: f64,
    /// Rho at the first grid point
    rho0: f64,
    /// First grid point in projection coordinates
    x0: f64,
    y0: f64,
}

impl LambertConformal {
    /// Build a projection from GRIB2 template 3.30 values (degrees, meters).
    #[allow(clippy::too_many_arguments)]
    pub fn from_grib2(
        lat1_deg: f64,
        lon1_deg: f64,
        lov_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        dx: f64,
        dy: f64,
        nx: usize,
        ny: usize,
    ) -> Self {
        Self::with_radius(
            lat1_deg,
            lon1_deg,
            lov_deg,
            latin1_deg,
            latin2_deg,
            dx,
            dy,
            nx,
            ny,
            NCEP_EARTH_RADIUS,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_radius(
        lat1_deg: f64,
        lon1_deg: f64,
        lov_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        dx: f64,
        dy: f64,
        nx: usize,
        ny: usize,
        earth_radius: f64,
    ) -> Self {
        let to_rad = PI / 180.0;

        let lat1 = lat1_deg * to_rad;
        let lon1 = lon1_deg * to_rad;
        let lon0 = lov_deg * to_rad;
        let latin1 = latin1_deg * to_rad;
        let latin2 = latin2_deg * to_rad;

        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone
            latin1.sin()
        } else {
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = earth_radius * f / (PI / 4.0 + lat1 / 2.0).tan().powf(n);

        let theta0 = n * wrap_pi(lon1 - lon0);
        let x0 = rho0 * theta0.sin();
        let y0 = rho0 - rho0 * theta0.cos();

        Self {
            lon0,
            latin1,
            latin2,
            lat1,
            lon1,
            dx,
            dy,
            nx,
            ny,
            earth_radius,
            n,
            f,
            rho0,
            x0,
            y0,
        }
    }

    /// NDFD/RTMA 2.5 km CONUS grid.
    pub fn rtma_conus() -> Self {
        Self::from_grib2(
            19.228976,  // La1
            233.723448, // Lo1
            265.0,      // LoV
            25.0,       // Latin1
            25.0,       // Latin2
            2539.703,   // Dx
            2539.703,   // Dy
            2345,
            1597,
        )
    }

    /// Geographic (degrees) to fractional grid offsets (i, j).
    pub fn geo_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let lat = lat_deg * to_rad;
        let dlon = wrap_pi(lon_deg * to_rad - self.lon0);

        let rho = self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * dlon;

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();

        ((x - self.x0) / self.dx, (y - self.y0) / self.dy)
    }

    /// Fractional grid offsets to (lat, lon) in degrees.
    ///
    /// Longitude is returned on the same side of the dateline as LoV; callers
    /// normalize it.
    pub fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        let to_deg = 180.0 / PI;

        let x = self.x0 + i * self.dx;
        let y = self.y0 + j * self.dy;

        let rho = (x * x + (self.rho0 - y) * (self.rho0 - y)).sqrt();
        let rho = if self.n < 0.0 { -rho } else { rho };
        let theta = (x / (self.rho0 - y)).atan();

        let lat = 2.0 * ((self.earth_radius * self.f / rho).powf(1.0 / self.n)).atan() - PI / 2.0;
        let lon = self.lon0 + theta / self.n;

        (lat * to_deg, lon * to_deg)
    }
}

impl GridProjection for LambertConformal {
    fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        LambertConformal::grid_to_geo(self, i, j)
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}

fn wrap_pi(mut angle: f64) -> f64 {
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
