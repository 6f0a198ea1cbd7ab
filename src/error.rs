//! Error types for loading, coercion, grouping and charting.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal failure while reading the dataset. No partial table is returned.
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("required column `{0}` is missing from the header")]
    MissingColumn(&'static str),
}

/// A single cell that could not be converted to its column's type.
///
/// Recovered locally: the cell is treated as missing.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("row {row}: could not read {value:?} as a number for `{column}`")]
pub struct CoercionError {
    /// Zero-based data row (the header is not counted).
    pub row: usize,
    pub column: &'static str,
    pub value: String,
}

/// A requested group has no rows, so its mean is undefined.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("group `{group}` has no rows")]
pub struct EmptyGroupError {
    pub group: String,
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("no data to plot for {0}")]
    NoData(&'static str),
    #[error("drawing failed: {0}")]
    Drawing(String),
    #[error("failed to write chart data: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode chart data: {0}")]
    Json(#[from] serde_json::Error),
}
