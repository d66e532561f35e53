use std::fs;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use facility_dashboard::ingestion::{
    ingest_from_path, ingest_inferred_from_path, CompositeObserver, FileObserver, IngestionContext, IngestionFormat,
    IngestionObserver, IngestionOptions, IngestionSeverity, IngestionStats,
};
use facility_dashboard::types::{DataType, Field, Schema};
use facility_dashboard::IngestionError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<IngestionStats>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, _ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn schema_year_only() -> Schema {
    Schema::new(vec![Field::new("year", DataType::Int64)])
}

fn schema_missing_col() -> Schema {
    Schema::new(vec![Field::new("definitely_missing", DataType::Utf8)])
}

fn csv_options(observer: Arc<dyn IngestionObserver>, threshold: IngestionSeverity) -> IngestionOptions {
    IngestionOptions {
        format: Some(IngestionFormat::Csv),
        observer: Some(observer),
        alert_at_or_above: threshold,
    }
}

#[test]
fn observer_receives_stats_on_success() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = csv_options(obs.clone(), IngestionSeverity::Critical);

    ingest_inferred_from_path("tests/fixtures/cleaned_health_data.xls", &opts).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(successes, vec![IngestionStats { rows: 7, columns: 20 }]);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = csv_options(obs.clone(), IngestionSeverity::Critical);

    // Missing file -> Io error -> Critical
    let _ = ingest_from_path("tests/fixtures/does_not_exist.csv", &schema_year_only(), &opts).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![IngestionSeverity::Critical]);
    assert_eq!(alerts, vec![IngestionSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = csv_options(obs.clone(), IngestionSeverity::Critical);

    // Schema mismatch -> Error severity (not Critical) -> should not alert
    let _ = ingest_from_path("tests/fixtures/predicted_data.csv", &schema_missing_col(), &opts).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lower_threshold_alerts_on_schema_errors() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = csv_options(obs.clone(), IngestionSeverity::Error);

    let _ = ingest_from_path("tests/fixtures/predicted_data.csv", &schema_missing_col(), &opts).unwrap_err();

    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
}

#[test]
fn composite_fans_out_and_file_observer_appends_lines() {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let log_path = std::env::temp_dir().join(format!("facility-dashboard-ingest-{nanos}.log"));

    let recording = Arc::new(RecordingObserver::default());
    let file_observer: Arc<dyn IngestionObserver> = Arc::new(FileObserver::new(&log_path));
    let recording_observer: Arc<dyn IngestionObserver> = recording.clone();
    let observers = vec![recording_observer, file_observer];
    let composite = CompositeObserver::new(observers);
    assert_eq!(composite.len(), 2);
    let opts = csv_options(Arc::new(composite), IngestionSeverity::Critical);

    ingest_from_path("tests/fixtures/predicted_data.csv", &schema_year_only(), &opts).unwrap();
    let _ = ingest_from_path("tests/fixtures/does_not_exist.csv", &schema_year_only(), &opts).unwrap_err();

    assert_eq!(recording.successes.lock().unwrap().len(), 1);
    assert_eq!(recording.alerts.lock().unwrap().len(), 1);

    let log = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    // One success, then the failure and its alert.
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("loaded source=tests/fixtures/predicted_data.csv format=Csv rows=6 columns=1"));
    assert!(lines[1].contains("failed source=tests/fixtures/does_not_exist.csv"));
    assert!(lines[2].contains("ALERT failed source=tests/fixtures/does_not_exist.csv"));
    assert!(lines[2].contains("severity=critical"));

    let _ = fs::remove_file(&log_path);
}
