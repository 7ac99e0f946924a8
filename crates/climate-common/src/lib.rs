//! Common types shared by the climate visualization pipelines.

pub mod bbox;
pub mod error;
pub mod field;
pub mod request;
pub mod variable;

pub use bbox::{BboxParseError, BoundingBox};
pub use error::{PipeError, PipeResult};
pub use field::{is_missing, linspace, CurvilinearField, RegularField, MISSING};
pub use request::{HourRequest, TimeSeriesRequest};
pub use variable::{ConversionStage, UnitConversion, VariableSpec};
