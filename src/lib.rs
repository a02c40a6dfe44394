//! RiskForge: A Rust CLI application for insurance charge analytics
//!
//! This library ingests a CSV of policyholder records, cleans and enriches it
//! with derived features, and computes the grouped statistics, correlation
//! matrix, and summary insights that drive the generated report and charts.

pub mod analysis;
pub mod cli;
pub mod error;
pub mod etl;
pub mod schema;
pub mod stats;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use error::Error;
pub use etl::{extract, load, transform, TransformReport};
pub use schema::{GroupKey, RawRecord, Record};

/// Common result type used throughout the application
pub type Result<T> = std::result::Result<T, Error>;
