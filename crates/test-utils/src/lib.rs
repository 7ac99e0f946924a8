//! Shared test utilities for the climate pipeline workspace.
//!
//! - Synthetic GRIB2 messages on Lambert conformal or lat/lon grids
//! - Synthetic sensor archives in NetCDF
//! - Grid data generators
//! - Approximate-equality assertions and optional test data lookup
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod generators;
pub mod grib2;
pub mod sensor;
pub mod paths;

pub use generators::*;
pub use grib2::{write_grib2, Grib2Builder};
pub use sensor::SensorArchiveBuilder;
pub use paths::*;

/// Skip a test when a real data file is not available.
///
/// ```ignore
/// let path = require_test_file!("rtma2p5.t12z.2dvaranl_ndfd.grb2");
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Test file '{}' not found. Download test data or set TEST_DATA_DIR.",
                    $name
                );
                return;
            }
        }
    }};
}

/// Approximate floating-point equality.
///
/// ```ignore
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}
