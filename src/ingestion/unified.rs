//! Path-based ingestion with format detection and observer reporting.
//!
//! [`ingest_from_path`] parses a file against a known [`Schema`]; [`ingest_inferred_from_path`]
//! derives the schema from a CSV file first. Both pick the format from
//! [`IngestionOptions::format`] or, when unset, from the file extension, and both report the
//! outcome to [`IngestionOptions::observer`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Schema};

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::{csv, json};

/// Formats a dashboard source can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    Csv,
    /// A JSON array, a single object, or one object per line.
    Json,
}

impl IngestionFormat {
    /// Format for a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            _ => None,
        }
    }

    fn for_path(path: &Path) -> IngestionResult<Self> {
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            return Err(mismatch(format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            )));
        };
        Self::from_extension(ext).ok_or_else(|| {
            mismatch(format!(
                "cannot infer format from extension '{ext}' for path ({})",
                path.display()
            ))
        })
    }
}

/// How a source is read and who hears about it.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Format to read; `None` detects it from the extension.
    ///
    /// Facility exports are sometimes comma-separated text saved as `.xls`. Those need
    /// `Some(IngestionFormat::Csv)`.
    pub format: Option<IngestionFormat>,
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Failures at or above this severity also reach [`IngestionObserver::on_alert`].
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

impl IngestionOptions {
    fn resolve_format(&self, path: &Path) -> IngestionResult<IngestionFormat> {
        match self.format {
            Some(format) => Ok(format),
            None => IngestionFormat::for_path(path),
        }
    }

    fn report(&self, ctx: &IngestionContext, result: &IngestionResult<DataSet>) {
        let Some(observer) = &self.observer else {
            return;
        };
        match result {
            Ok(ds) => observer.on_success(
                ctx,
                IngestionStats {
                    rows: ds.row_count(),
                    columns: ds.schema.fields.len(),
                },
            ),
            Err(err) => {
                let severity = IngestionSeverity::of(err);
                observer.on_failure(ctx, severity, err);
                if severity >= self.alert_at_or_above {
                    observer.on_alert(ctx, severity, err);
                }
            }
        }
    }
}

impl IngestionSeverity {
    /// I/O failures (missing or unreadable files) are critical; bad content is an error.
    fn of(err: &IngestionError) -> Self {
        match err {
            IngestionError::Io(_) => Self::Critical,
            IngestionError::Csv(e) if matches!(e.kind(), ::csv::ErrorKind::Io(_)) => Self::Critical,
            IngestionError::Csv(_) | IngestionError::SchemaMismatch { .. } | IngestionError::ParseError { .. } => {
                Self::Error
            }
        }
    }
}

/// Read `path` into a [`DataSet`] shaped by `schema`.
///
/// A format that cannot be determined fails before the observer is involved.
///
/// # Example
///
/// ```no_run
/// use facility_dashboard::ingestion::{ingest_from_path, IngestionFormat, IngestionOptions};
/// use facility_dashboard::types::{DataType, Field, Schema};
///
/// # fn main() -> Result<(), facility_dashboard::IngestionError> {
/// let schema = Schema::new(vec![
///     Field::new("health_facility", DataType::Utf8),
///     Field::new("deliveries_total", DataType::Int64),
/// ]);
/// let opts = IngestionOptions {
///     format: Some(IngestionFormat::Csv),
///     ..Default::default()
/// };
/// let ds = ingest_from_path("cleaned_health_data.xls", &schema, &opts)?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    options: &IngestionOptions,
) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    ingest_observed(path, options, |format| match format {
        IngestionFormat::Csv => csv::ingest_csv_from_path(path, schema),
        IngestionFormat::Json => json::ingest_json_from_path(path, schema),
    })
}

/// Read `path`, inferring column types from its contents (CSV only).
///
/// A JSON source fails with [`IngestionError::SchemaMismatch`] and is reported like any other
/// failure.
pub fn ingest_inferred_from_path(
    path: impl AsRef<Path>,
    options: &IngestionOptions,
) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    ingest_observed(path, options, |format| match format {
        IngestionFormat::Csv => csv::ingest_csv_inferred_from_path(path),
        IngestionFormat::Json => Err(mismatch(format!(
            "schema inference is only supported for csv input ({})",
            path.display()
        ))),
    })
}

fn ingest_observed<F>(path: &Path, options: &IngestionOptions, read: F) -> IngestionResult<DataSet>
where
    F: FnOnce(IngestionFormat) -> IngestionResult<DataSet>,
{
    let format = options.resolve_format(path)?;
    let ctx = IngestionContext {
        path: path.to_path_buf(),
        format,
    };
    let result = read(format);
    options.report(&ctx, &result);
    result
}

fn mismatch(message: String) -> IngestionError {
    IngestionError::SchemaMismatch { message }
}

/// A source to load at startup: where it is, and optionally the schema it must have.
#[derive(Clone)]
pub struct IngestionRequest {
    pub path: PathBuf,
    /// `None` infers the schema (CSV only).
    pub schema: Option<Schema>,
    pub options: IngestionOptions,
}

impl fmt::Debug for IngestionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionRequest")
            .field("path", &self.path)
            .field("schema_fields", &self.schema.as_ref().map(|s| s.fields.len()))
            .field("options", &self.options)
            .finish()
    }
}

impl IngestionRequest {
    pub fn run(&self) -> IngestionResult<DataSet> {
        match &self.schema {
            Some(schema) => ingest_from_path(&self.path, schema, &self.options),
            None => ingest_inferred_from_path(&self.path, &self.options),
        }
    }
}
