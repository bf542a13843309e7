/// Two linked views over one percentage metric recorded per country per year:
/// a choropleth for the selected year and a line chart for the selected
/// region. This crate computes what both charts show; drawing is left to the
/// host (Python via the `python` feature, or any JSON consumer).
pub mod aggregation;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod region;
pub mod reshape;
pub mod schema;
pub mod table;
pub mod visualization;

#[cfg(feature = "python")]
mod python;

pub use aggregation::{aggregate, aggregate_table, AggregatedRow};
pub use config::ExplorerConfig;
pub use error::{ExplorerError, Result};
pub use model::{ExplorerModel, Session, ViewState};
pub use region::{Region, RegionCatalog, RegionKey};
pub use reshape::{reshape, TimeSeriesTable};
pub use table::{Observation, RawTable, YearRange};
pub use visualization::{LineSpec, MapSpec, RenderSpecs};
