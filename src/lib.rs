pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{LocalFiles, PlottersWriter};
pub use config::ChartConfig;
pub use core::{etl::ChartEngine, pipeline::ChartPipeline};
pub use utils::error::{ChartError, Result};
