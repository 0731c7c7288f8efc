pub mod compose;
pub mod etl;
pub mod pipeline;
pub mod range_scan;
pub mod records;

pub use crate::domain::model::{ChartInputs, CultivarRecord, TemperatureRange};
pub use crate::domain::plan::GridPlan;
pub use crate::domain::ports::{DataSource, GridWriter, Pipeline};
pub use crate::utils::error::Result;
