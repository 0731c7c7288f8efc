// Adapters layer: concrete implementations of the domain ports (local files, plotters).

pub mod files;
pub mod plot;

pub use files::LocalFiles;
pub use plot::PlottersWriter;
