//! Grid processing for the climate pipelines.
//!
//! ```text
//! CurvilinearField (2D lon/lat)
//!      │
//!      ▼
//! Regridder::for_field ──► RegularField on a mesh spanning the source bounds
//!      │                   (same column/row counts as the source)
//!      ▼
//! CropWindow::crop_all ──► every field shrunk to the open window,
//!                          one mask shared by all fields
//! ```
//!
//! [`WorkerPool`] runs independent (file × filter) units and joins them in
//! enumeration order.

pub mod crop;
pub mod error;
pub mod pool;
pub mod regrid;

pub use crop::{CropMask, CropWindow};
pub use error::{GridProcessorError, Result};
pub use pool::WorkerPool;
pub use regrid::{regrid_nearest, RegularMesh, Regridder};
