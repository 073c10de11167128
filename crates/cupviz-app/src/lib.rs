// Library root: configuration, figure renderers and the dashboard that ties
// them to a data source.

pub mod config;
pub mod figure;
pub mod figures;
pub mod visualization;

pub use figure::{Figure, FigureSummary};
pub use visualization::{build_assets, Dashboard, Visualization, VizError};
