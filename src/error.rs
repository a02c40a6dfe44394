//! Error taxonomy for the analytics pipeline

use std::path::PathBuf;
use thiserror::Error;

/// All failure conditions surfaced by the library.
///
/// Each condition the pipeline can hit is a distinct variant so callers can
/// match on exactly what went wrong; nothing is swallowed or retried.
#[derive(Debug, Error)]
pub enum Error {
    /// The input file does not exist.
    #[error("data file not found at {path}")]
    DataNotFound { path: PathBuf },

    /// The input file exists but cannot be parsed as tabular data.
    #[error("failed to parse {path} as CSV")]
    DataFormat {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Writing the processed dataset failed mid-serialization.
    #[error("failed to write processed data to {path}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A grouping factor name does not map to a known column.
    #[error("unknown grouping field '{0}'")]
    UnknownField(String),

    /// A derived column is required but no record carries a value for it.
    #[error("derived feature '{0}' is missing; run transform on the raw data first")]
    MissingDerivedFeature(&'static str),

    /// An argument is outside its documented domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A ratio whose denominator group is empty.
    #[error("division by zero: {0}")]
    DivisionByZero(&'static str),

    /// Chart rendering failed in the drawing backend.
    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
