//! GRIB2 reading for the RTMA pipeline.
//!
//! Sections are walked directly to build a side-car index of every message
//! (product key and grid template) so that variable filters can be applied
//! without decoding data. Selected messages are decoded with the `grib`
//! crate.

pub mod error;
pub mod filter;
pub mod index;
pub mod reader;
pub mod sections;
pub mod tables;

pub use error::{Grib2Error, Result};
pub use filter::MessageFilter;
pub use index::{Grib2Index, IndexEntry};
pub use reader::{Grib2Field, Grib2File};
pub use sections::{GridDefinition, ProductKey};
pub use tables::Grib2Tables;
