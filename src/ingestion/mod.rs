//! Ingestion entrypoints and implementations (the dashboard's data sources).
//!
//! Most callers should use [`ingest_from_path`] or [`ingest_inferred_from_path`] (from
//! [`unified`]) which:
//!
//! - auto-detect format by file extension (or you can override via [`IngestionOptions`])
//! - perform ingestion into an in-memory [`crate::types::DataSet`]
//! - optionally report success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`json`]

pub mod csv;
pub mod json;
pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    StdErrObserver,
};
pub use unified::{ingest_from_path, ingest_inferred_from_path, IngestionFormat, IngestionOptions, IngestionRequest};
