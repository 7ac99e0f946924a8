//! Source location for the climate pipelines.
//!
//! - [`ObjectSource`]: the public RTMA bucket (or any object store), with a
//!   per-directory listing cache and a local download cache
//! - [`LocalSource`]: the fixed sensor archive on local disk
//! - [`locate_rtma`]: the three-pattern RTMA file name fallback

pub mod error;
pub mod local;
pub mod locator;
pub mod object_store;

pub use self::object_store::{ObjectSource, ObjectSourceConfig};
pub use error::{StorageError, StorageResult};
pub use local::LocalSource;
pub use locator::{locate_rtma, rtma_keys, FileLister, RtmaProduct, RTMA_DATASET};
