//! The dashboard pages, each a thin composition of engine calls.
//!
//! - [`overview`]: facility counts and AGYW population per subcounty
//! - [`report`]: one facility's monthly indicators and its birth-outcome cascade
//! - [`performance`]: predicted adverse outcomes per facility, month and range
//! - [`geo`]: facility points for the district map
//!
//! Page functions take the [`DataSet`] they read from, so they can be used with or without a
//! loaded [`Dashboard`].

pub mod columns;
pub mod geo;
pub mod overview;
pub mod performance;
pub mod report;

use std::collections::BTreeSet;

use crate::config::DashboardConfig;
use crate::error::{IngestionResult, QueryResult};
use crate::ingestion::ingest_inferred_from_path;
use crate::types::{DataSet, Value};

/// Data sources loaded once at startup and shared read-only by every page.
#[derive(Debug, Clone)]
pub struct Dashboard {
    health: DataSet,
    predicted: DataSet,
    geo: Option<DataSet>,
    district: String,
}

impl Dashboard {
    /// Ingest every source named by `config`, inferring each schema.
    ///
    /// Sources are read as CSV whatever their extension, and loads are reported to the
    /// observers configured in `config`. Without `geo_data` the map reads the predicted data.
    pub fn load(config: &DashboardConfig) -> IngestionResult<Self> {
        let opts = config.ingestion_options();
        let health = ingest_inferred_from_path(&config.health_data, &opts)?;
        let predicted = ingest_inferred_from_path(&config.predicted_data, &opts)?;
        let geo = match &config.geo_data {
            Some(path) => Some(ingest_inferred_from_path(path, &opts)?),
            None => None,
        };
        Ok(Self {
            health,
            predicted,
            geo,
            district: config.district.clone(),
        })
    }

    /// Assemble a dashboard from already-loaded datasets; the map reads `predicted`.
    pub fn from_datasets(health: DataSet, predicted: DataSet, district: impl Into<String>) -> Self {
        Self {
            health,
            predicted,
            geo: None,
            district: district.into(),
        }
    }

    /// Cleaned facility records.
    pub fn health(&self) -> &DataSet {
        &self.health
    }

    /// Predicted outcomes.
    pub fn predicted(&self) -> &DataSet {
        &self.predicted
    }

    /// Source of facility coordinates.
    pub fn geo(&self) -> &DataSet {
        self.geo.as_ref().unwrap_or(&self.predicted)
    }

    /// District shown on the map.
    pub fn district(&self) -> &str {
        &self.district
    }

    /// Map points for `indicator` in the configured district.
    pub fn facility_points(&self, indicator: geo::GeoIndicator) -> QueryResult<Vec<geo::FacilityPoint>> {
        geo::facility_points(self.geo(), &self.district, indicator)
    }
}

/// Selector labels: each value's display text.
fn labels(values: Vec<Value>) -> Vec<String> {
    values.iter().map(Value::to_string).collect()
}

/// Distinct non-missing labels of `column` in order of first appearance.
fn labels_in_order(dataset: &DataSet, column: &str) -> QueryResult<Vec<String>> {
    let mut seen = BTreeSet::new();
    Ok(dataset
        .column(column)?
        .filter(|v| !v.is_missing())
        .map(Value::to_string)
        .filter(|label| seen.insert(label.clone()))
        .collect())
}

/// Whole number for display, truncating toward zero; missing counts as zero.
fn whole(value: &Value) -> i64 {
    value.as_f64().map_or(0, |v| v as i64)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    use super::columns::*;

    fn text(s: &str) -> Value {
        if s.is_empty() { Value::Null } else { Value::from(s) }
    }

    /// A few months of reported indicators for four facilities.
    pub(crate) fn health_data() -> DataSet {
        let mut fields = vec![
            Field::new(DISTRICT, DataType::Utf8),
            Field::new(SUBCOUNTY, DataType::Utf8),
            Field::new(AUTHORITY, DataType::Utf8),
            Field::new(FACILITY, DataType::Utf8),
            Field::new(YEAR, DataType::Int64),
            Field::new(MONTH, DataType::Utf8),
            Field::new(AGYW_POPULATION, DataType::Float64),
        ];
        fields.extend(REPORT_COLUMNS.iter().map(|c| Field::new(*c, DataType::Int64)));

        let records: [(&str, &str, &str, i64, &str, f64, [i64; 13]); 6] = [
            ("Bwera", "Govt", "Bwera HC IV", 2023, "Jan", 1520.0, [40, 22, 0, 1, 35, 3, 2, 10, 4, 1, 0, 2, 0]),
            ("Bwera", "Govt", "Bwera HC IV", 2023, "Feb", 1520.0, [38, 20, 1, 0, 31, 2, 4, 12, 3, 0, 1, 0, 0]),
            ("Bwera", "PNFP", "Kagando Hospital", 2023, "Jan", 1520.0, [90, 61, 0, 2, 80, 7, 5, 30, 8, 2, 2, 1, 1]),
            ("Hima", "Govt", "Hima HC III", 2023, "Jan", 980.6, [15, 9, 0, 0, 12, 0, 1, 4, 2, 0, 0, 0, 0]),
            ("Hima", "Govt", "Hima HC III", 2024, "Jan", 980.6, [18, 11, 0, 0, 14, 1, 0, 5, 1, 0, 0, 0, 0]),
            ("", "Govt", "Mobile Clinic", 2023, "Jan", 0.0, [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        ];
        let rows = records
            .iter()
            .map(|(subcounty, authority, facility, year, month, agyw, counts)| {
                let mut row = vec![
                    Value::from("KASESE"),
                    text(subcounty),
                    Value::from(*authority),
                    Value::from(*facility),
                    Value::Int64(*year),
                    Value::from(*month),
                    Value::Float64(*agyw),
                ];
                row.extend(counts.iter().map(|c| Value::Int64(*c)));
                row
            })
            .collect();
        DataSet::new(Schema::new(fields), rows)
    }

    /// Model outputs with numeric months, some missing predictions, and coordinates.
    pub(crate) fn predicted_data() -> DataSet {
        let schema = Schema::new(vec![
            Field::new(DISTRICT, DataType::Utf8),
            Field::new(FACILITY, DataType::Utf8),
            Field::new(YEAR, DataType::Int64),
            Field::new(MONTH, DataType::Int64),
            Field::new(LATITUDE, DataType::Float64),
            Field::new(LONGITUDE, DataType::Float64),
            Field::new(PREDICTED_ANC, DataType::Float64),
            Field::new(PREDICTED_DELIVERIES, DataType::Float64),
            Field::new(PREDICTED_PRETERM, DataType::Int64),
            Field::new(PREDICTED_LOW_BIRTH_WEIGHT, DataType::Int64),
            Field::new(PREDICTED_NEWBORN, DataType::Int64),
            Field::new(PREDICTED_MATERNAL, DataType::Int64),
        ]);
        let num = |v: Option<f64>| v.map_or(Value::Null, Value::Float64);
        let records: [(&str, &str, i64, i64, Option<f64>, Option<f64>, [i64; 4]); 6] = [
            ("Kasese", "Bwera HC IV", 2023, 1, Some(45.4), Some(30.6), [1, 0, 0, 0]),
            ("Kasese", "Bwera HC IV", 2023, 2, Some(52.5), Some(20.2), [0, 2, 0, 0]),
            ("KASESE", "Kagando Hospital", 2023, 1, Some(120.0), Some(60.0), [3, 1, 1, 1]),
            ("kasese", "Hima HC III", 2023, 3, None, None, [0, 0, 0, 0]),
            ("Kasese", "Hima HC III", 2024, 1, Some(10.0), Some(5.0), [0, 0, 0, 0]),
            ("Bunyangabu", "Kibiito HC IV", 2023, 1, Some(70.0), Some(40.0), [0, 0, 2, 0]),
        ];
        let coords = [
            (Some(0.1333), Some(29.7667)),
            (Some(0.1333), Some(29.7667)),
            (Some(0.1833), Some(30.0500)),
            (None, Some(30.1000)),
            (Some(0.0300), Some(30.1000)),
            (Some(0.6200), Some(30.2500)),
        ];
        let rows = records
            .iter()
            .zip(coords)
            .map(|((district, facility, year, month, anc, deliveries, adverse), (lat, lon))| {
                let mut row = vec![
                    Value::from(*district),
                    Value::from(*facility),
                    Value::Int64(*year),
                    Value::Int64(*month),
                    num(lat),
                    num(lon),
                    num(*anc),
                    num(*deliveries),
                ];
                row.extend(adverse.iter().map(|v| Value::Int64(*v)));
                row
            })
            .collect();
        DataSet::new(schema, rows)
    }
}
