//! Geo Visualizer page: one point per facility record in a district, sized by an indicator.

use std::fmt;

use serde::Serialize;

use crate::error::QueryResult;
use crate::types::{DataSet, Value};

use super::columns::{
    DISTRICT, FACILITY, LATITUDE, LONGITUDE, PREDICTED_ANC, PREDICTED_DELIVERIES, PREDICTED_LOW_BIRTH_WEIGHT,
    PREDICTED_MATERNAL, PREDICTED_NEWBORN, PREDICTED_PRETERM,
};

/// Indicators the map can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "&'static str")]
pub enum GeoIndicator {
    PredictedAnc,
    PredictedDeliveries,
    PredictedMaternal,
    PredictedNewborn,
    PredictedLowBirthWeight,
    PredictedPreterm,
}

impl GeoIndicator {
    pub const ALL: [GeoIndicator; 6] = [
        Self::PredictedAnc,
        Self::PredictedDeliveries,
        Self::PredictedMaternal,
        Self::PredictedNewborn,
        Self::PredictedLowBirthWeight,
        Self::PredictedPreterm,
    ];

    /// Source column, also the selector label.
    pub fn column(self) -> &'static str {
        match self {
            Self::PredictedAnc => PREDICTED_ANC,
            Self::PredictedDeliveries => PREDICTED_DELIVERIES,
            Self::PredictedMaternal => PREDICTED_MATERNAL,
            Self::PredictedNewborn => PREDICTED_NEWBORN,
            Self::PredictedLowBirthWeight => PREDICTED_LOW_BIRTH_WEIGHT,
            Self::PredictedPreterm => PREDICTED_PRETERM,
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.column() == column)
    }
}

impl From<GeoIndicator> for &'static str {
    fn from(indicator: GeoIndicator) -> Self {
        indicator.column()
    }
}

impl fmt::Display for GeoIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A facility marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityPoint {
    pub facility: String,
    pub latitude: f64,
    pub longitude: f64,
    pub indicator: GeoIndicator,
    /// Indicator value; missing or non-numeric counts as 0.
    pub value: f64,
    /// `"{facility}<br>{indicator}: {value}"` with the value as a whole number.
    pub hover: String,
}

/// Read a cell as a number, accepting numeric text.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Utf8(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
        other => other.as_f64(),
    }
}

/// Points for every record of `district` that has coordinates.
///
/// Districts match when their upper-cased text is equal; surrounding whitespace is significant.
///
/// Records are kept in data order; a facility reporting several months yields several points.
///
/// # Errors
///
/// [`crate::QueryError::Schema`] if the district, facility, coordinate or indicator column is
/// absent.
pub fn facility_points(dataset: &DataSet, district: &str, indicator: GeoIndicator) -> QueryResult<Vec<FacilityPoint>> {
    let schema = &dataset.schema;
    let district_idx = schema.require_index(DISTRICT)?;
    let facility_idx = schema.require_index(FACILITY)?;
    let lat_idx = schema.require_index(LATITUDE)?;
    let lon_idx = schema.require_index(LONGITUDE)?;
    let value_idx = schema.require_index(indicator.column())?;

    let wanted = district.to_uppercase();
    let points = dataset
        .rows
        .iter()
        .filter(|row| {
            row[district_idx]
                .as_str()
                .is_some_and(|d| d.to_uppercase() == wanted)
        })
        .filter_map(|row| {
            let latitude = numeric(&row[lat_idx])?;
            let longitude = numeric(&row[lon_idx])?;
            let value = numeric(&row[value_idx]).unwrap_or(0.0);
            let facility = row[facility_idx].to_string();
            let hover = format!("{facility}<br>{indicator}: {}", value as i64);
            Some(FacilityPoint {
                facility,
                latitude,
                longitude,
                indicator,
                value,
                hover,
            })
        })
        .collect();
    Ok(points)
}
