//! Error types shared across ingestion, querying, export and configuration.

use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for engine queries (filter / aggregate / reindex).
pub type QueryResult<T> = Result<T, QueryError>;

/// Convenience result type for CSV export.
pub type ExportResult<T> = Result<T, ExportError>;

/// Convenience result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Error type returned by ingestion functions.
///
/// This is a single error enum shared across CSV and JSON ingestion.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The input does not conform to the provided schema (missing required fields/columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// Error type returned by the aggregation engine.
///
/// An empty result is never an error; see [`crate::query::QueryOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A query referenced a column that is not part of the dataset schema.
    #[error("schema error: column '{column}' not found. columns={available:?}")]
    Schema {
        column: String,
        available: Vec<String>,
    },

    /// A condition or aggregate was applied to a column of an incompatible type.
    #[error("type error: column '{column}' is {found}, expected {expected}")]
    Type {
        column: String,
        expected: String,
        found: String,
    },

    /// A category appeared more than once while reindexing.
    #[error("duplicate category '{value}' in column '{column}'")]
    DuplicateCategory { column: String, value: String },

    /// Two output columns of a query would share the same name.
    #[error("duplicate output column '{column}'")]
    DuplicateColumn { column: String },

    /// An integer sum does not fit in `Int64`.
    #[error("integer overflow summing into column '{column}'")]
    Overflow { column: String },
}

/// Error type returned when writing a dataset as CSV.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Error type returned when loading a [`crate::config::DashboardConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for the expected shape.
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    /// A field has a value the dashboard cannot use.
    #[error("invalid config value for '{field}': {message}")]
    Invalid { field: String, message: String },
}
