//! `facility-dashboard` computes the tables behind a health-facility analytics dashboard: facility
//! counts per subcounty, per-facility monthly reports, predicted adverse-outcome summaries and
//! map points, all derived from tabular facility data held in memory.
//!
//! The core is a small, pure aggregation engine over [`types::DataSet`]:
//!
//! - [`processing::filter()`]: declarative row filters (equality-in-set, inclusive numeric ranges)
//! - [`processing::aggregate()`]: group-by with `sum`, `count-distinct` and
//!   `count-nonzero-threshold`
//! - [`processing::reindex_by_category()`]: force a result onto a fixed category axis (Jan..Dec)
//!
//! [`query::Query`] chains those stages, and [`query::QueryOutcome`] distinguishes "no query
//! submitted" from "query matched nothing". The [`dashboard`] module composes engine calls into
//! the dashboard pages.
//!
//! ## What you can ingest
//!
//! **File formats (auto-detected by extension, or forced via [`ingestion::IngestionOptions`]):**
//!
//! - **CSV**: `.csv` (force [`ingestion::IngestionFormat::Csv`] for CSV exports saved as `.xls`)
//! - **JSON**: `.json` (array-of-objects) and `.ndjson` (newline-delimited objects)
//!
//! CSV sources can also be read without a schema; column types are inferred from the values.
//! Across formats, empty cells and explicit JSON `null` map to [`types::Value::Null`].
//!
//! ## Quick example: load and aggregate
//!
//! ```no_run
//! use facility_dashboard::ingestion::{ingest_inferred_from_path, IngestionFormat, IngestionOptions};
//! use facility_dashboard::processing::{aggregate, Aggregate, AggregateSpec};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let opts = IngestionOptions {
//!     format: Some(IngestionFormat::Csv),
//!     ..Default::default()
//! };
//! let ds = ingest_inferred_from_path("cleaned_health_data.xls", &opts)?;
//!
//! let per_subcounty = aggregate(
//!     &ds,
//!     &AggregateSpec::new()
//!         .group_by(["subcountydivision"])
//!         .with(Aggregate::count_distinct("health_facility").alias("facilities")),
//! )?;
//! println!("{} subcounties", per_subcounty.row_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Dashboard example
//!
//! ```no_run
//! use facility_dashboard::config::DashboardConfig;
//! use facility_dashboard::dashboard::{overview, Dashboard};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DashboardConfig::from_path("dashboard.json")?;
//! let dashboard = Dashboard::load(&config)?;
//!
//! let selected = vec!["Bwera".to_string(), "Hima".to_string()];
//! let n = overview::facility_count(dashboard.health(), &selected)?;
//! println!("total health facilities: {n}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: schema + in-memory dataset types
//! - [`processing`]: the aggregation engine and supporting transformations
//! - [`query`]: query pipelines and [`query::QueryOutcome`]
//! - [`execution`]: parallel (chunked) filter/aggregate with metrics and observers
//! - [`ingestion`]: CSV/JSON data sources with ingestion observers
//! - [`export`]: CSV export of results
//! - [`config`]: dashboard configuration file
//! - [`dashboard`]: the Overview, Report, Performance Metrics and Geo pages
//! - [`error`]: error types

pub mod config;
pub mod dashboard;
pub mod error;
pub mod execution;
pub mod export;
pub mod ingestion;
pub mod processing;
pub mod query;
pub mod types;

pub use error::{
    ConfigError, ConfigResult, ExportError, ExportResult, IngestionError, IngestionResult, QueryError, QueryResult,
};
