//! Ingestion observers: logging and alerting hooks for data-source loads.
//!
//! The dashboard loads each source once per session; observers are how those loads get logged
//! (stderr, an append-only file, or both via [`CompositeObserver`]).

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::IngestionError;

use super::unified::IngestionFormat;

/// How bad a failed load is. Ordered, so a threshold can be compared against it.
///
/// Config files spell it in lowercase (`"error"`, `"critical"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionSeverity {
    Info,
    Warning,
    /// The source was readable but its content was rejected.
    Error,
    /// The source could not be read at all.
    Critical,
}

impl fmt::Display for IngestionSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        })
    }
}

/// Which source a load event is about.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    pub path: PathBuf,
    pub format: IngestionFormat,
}

/// Shape of a loaded source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    pub rows: usize,
    pub columns: usize,
}

/// Receives the outcome of every source load. All methods default to doing nothing.
pub trait IngestionObserver: Send + Sync {
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// A failure at or above the configured alert threshold, delivered after `on_failure`.
    ///
    /// Defaults to repeating [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Forwards every event to each wrapped observer, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.observers.iter().for_each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.observers.iter().for_each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.observers.iter().for_each(|o| o.on_alert(ctx, severity, error));
    }
}

fn success_line(ctx: &IngestionContext, stats: IngestionStats) -> String {
    format!(
        "loaded source={} format={:?} rows={} columns={}",
        ctx.path.display(),
        ctx.format,
        stats.rows,
        stats.columns
    )
}

fn failure_line(ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) -> String {
    format!(
        "failed source={} format={:?} severity={severity} err={error}",
        ctx.path.display(),
        ctx.format
    )
}

/// One `[ingest]` line per event on stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!("[ingest] {}", success_line(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        eprintln!("[ingest] {}", failure_line(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        eprintln!("[ALERT][ingest] {}", failure_line(ctx, severity, error));
    }
}

/// Appends one timestamped line per event to a log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// The file is opened per event; a log that cannot be written is skipped silently.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {line}", unix_ts());
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append_line(&success_line(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.append_line(&failure_line(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.append_line(&format!("ALERT {}", failure_line(ctx, severity, error)));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
