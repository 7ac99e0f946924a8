//! Reader for the local sensor-model archive.
//!
//! The archive is a NetCDF file with dimensions `time`, `south_north` and
//! `west_east`, 1D coordinate variables of the same names (longitude along
//! `west_east`, latitude along `south_north`) and one data variable per
//! climate variable. Time is CF encoded (`"<unit> since <timestamp>"`).
//!
//! Reads go through the native netcdf library, one slab or one point series
//! at a time, so the full archive is never loaded.

pub mod archive;
pub mod error;
pub mod native;
pub mod time;

pub use archive::{nearest_index, SensorArchive};
pub use error::{NetCdfError, NetCdfResult};
pub use native::silence_hdf5_errors;
pub use time::CfTimeUnits;
