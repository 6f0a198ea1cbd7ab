//! Customer purchasing behavior report.
//!
//! Loads a customer CSV once, then computes descriptive statistics, regional
//! and age/loyalty segments, spending per visit, and two charts, and lays
//! them out as an ordered text report.

pub mod charts;
pub mod cli;
pub mod enrich;
pub mod error;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod segments;
pub mod summary;
pub mod types;
pub mod util;

pub use cli::Args;
pub use error::{ChartError, CoercionError, DataLoadError, EmptyGroupError};
pub use loader::{load_table, load_table_from_reader, LoadReport};
pub use pipeline::{build_report, ReportOptions};
pub use types::{Column, Record, Table};
