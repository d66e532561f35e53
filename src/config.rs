//! Dashboard configuration, loaded from a JSON file.
//!
//! ```json
//! {
//!   "health_data": "data/cleaned_health_data.xls",
//!   "predicted_data": "data/predicted_data.csv",
//!   "district": "Kasese",
//!   "alert_at_or_above": "error",
//!   "ingest_log": "logs/ingest.log"
//! }
//! ```
//!
//! Relative paths are resolved against the directory containing the config file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::ingestion::{
    CompositeObserver, FileObserver, IngestionFormat, IngestionObserver, IngestionOptions, IngestionSeverity,
    StdErrObserver,
};

/// Data sources and ingestion settings for a [`crate::dashboard::Dashboard`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Cleaned facility records (Overview and Report pages).
    pub health_data: PathBuf,

    /// Model predictions per facility and month (Performance Metrics page).
    pub predicted_data: PathBuf,

    /// Facility coordinates for the map; defaults to `predicted_data`.
    #[serde(default)]
    pub geo_data: Option<PathBuf>,

    /// District shown on the map (matched case-insensitively).
    #[serde(default = "default_district")]
    pub district: String,

    /// Ingestion failures at or above this severity are raised as alerts.
    #[serde(default = "default_alert_threshold")]
    pub alert_at_or_above: IngestionSeverity,

    /// Log ingestion events to stderr.
    #[serde(default = "default_true")]
    pub log_to_stderr: bool,

    /// Append ingestion events to this file.
    #[serde(default)]
    pub ingest_log: Option<PathBuf>,
}

fn default_district() -> String {
    "Kasese".to_string()
}

fn default_alert_threshold() -> IngestionSeverity {
    IngestionSeverity::Critical
}

fn default_true() -> bool {
    true
}

impl DashboardConfig {
    /// Config for the two required sources with every other setting at its default.
    pub fn new(health_data: impl Into<PathBuf>, predicted_data: impl Into<PathBuf>) -> Self {
        Self {
            health_data: health_data.into(),
            predicted_data: predicted_data.into(),
            geo_data: None,
            district: default_district(),
            alert_at_or_above: default_alert_threshold(),
            log_to_stderr: default_true(),
            ingest_log: None,
        }
    }

    /// Read, parse and validate a config file, resolving relative paths against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        match path.parent() {
            Some(dir) => Ok(config.resolve_relative_to(dir)),
            None => Ok(config),
        }
    }

    /// Parse and validate a config document. Paths are kept as written.
    pub fn from_json_str(input: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Rebase every relative path onto `base`.
    pub fn resolve_relative_to(mut self, base: &Path) -> Self {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        rebase(&mut self.health_data);
        rebase(&mut self.predicted_data);
        self.geo_data.iter_mut().for_each(rebase);
        self.ingest_log.iter_mut().for_each(rebase);
        self
    }

    /// Reject values no dashboard can use.
    pub fn validate(&self) -> ConfigResult<()> {
        let paths = [
            ("health_data", Some(&self.health_data)),
            ("predicted_data", Some(&self.predicted_data)),
            ("geo_data", self.geo_data.as_ref()),
            ("ingest_log", self.ingest_log.as_ref()),
        ];
        for (field, path) in paths {
            if path.is_some_and(|p| p.as_os_str().is_empty()) {
                return Err(invalid(field, "path must not be empty"));
            }
        }
        if self.district.trim().is_empty() {
            return Err(invalid("district", "must not be blank"));
        }
        Ok(())
    }

    /// Source of facility coordinates.
    pub fn geo_path(&self) -> &Path {
        self.geo_data.as_deref().unwrap_or(&self.predicted_data)
    }

    /// Ingestion options for the dashboard's sources.
    ///
    /// All sources are read as CSV regardless of extension. Observers follow `log_to_stderr`
    /// and `ingest_log`.
    pub fn ingestion_options(&self) -> IngestionOptions {
        let mut observers: Vec<Arc<dyn IngestionObserver>> = Vec::new();
        if self.log_to_stderr {
            observers.push(Arc::new(StdErrObserver));
        }
        if let Some(log) = &self.ingest_log {
            observers.push(Arc::new(FileObserver::new(log)));
        }

        let observer: Option<Arc<dyn IngestionObserver>> = match observers.len() {
            0 => None,
            1 => observers.pop(),
            _ => Some(Arc::new(CompositeObserver::new(observers))),
        };

        IngestionOptions {
            format: Some(IngestionFormat::Csv),
            observer,
            alert_at_or_above: self.alert_at_or_above,
        }
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message: message.to_string(),
    }
}
