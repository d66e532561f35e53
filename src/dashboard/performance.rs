//! Performance Metrics page: predicted adverse pregnancy outcomes for one year.
//!
//! Every function after [`prepare_year`] expects its output: whole-number predicted ANC1 and
//! delivery counts, and month labels (`Jan`..`Dec`) rather than month numbers.

use std::fmt;

use crate::error::QueryResult;
use crate::processing::{
    aggregate, filter, map_column, month_label, month_order, rename, Aggregate, AggregateSpec, Condition, FilterSpec,
};
use crate::query::{Query, QueryOutcome};
use crate::types::{DataSet, DataType, Value};

use super::columns::{
    FACILITY, MONTH, PREDICTED_ANC, PREDICTED_DELIVERIES, PREDICTED_LOW_BIRTH_WEIGHT, PREDICTED_MATERNAL,
    PREDICTED_NEWBORN, PREDICTED_PRETERM, YEAR,
};
use super::whole;

pub const TOTAL_PRETERM: &str = "Total Predicted Preterm Cases";
pub const TOTAL_LOW_BIRTH_WEIGHT: &str = "Total Predicted Low Birth Weight Cases";
pub const TOTAL_NEWBORN: &str = "Total Predicted Newborn Cases";
pub const TOTAL_MATERNAL: &str = "Total Predicted Maternal Cases";
pub const TOTAL_DELIVERIES: &str = "Total Predicted Deliveries";

/// Predicted column summed into each summary column, in summary column order.
const SUMMARY_COLUMNS: [(&str, &str); 5] = [
    (PREDICTED_PRETERM, TOTAL_PRETERM),
    (PREDICTED_LOW_BIRTH_WEIGHT, TOTAL_LOW_BIRTH_WEIGHT),
    (PREDICTED_NEWBORN, TOTAL_NEWBORN),
    (PREDICTED_MATERNAL, TOTAL_MATERNAL),
    (PREDICTED_DELIVERIES, TOTAL_DELIVERIES),
];

/// Deliveries above this count mark a high-volume facility.
pub const HIGH_DELIVERIES_THRESHOLD: f64 = 50.0;

/// Selector choices for the year, sorted.
pub fn years(dataset: &DataSet) -> QueryResult<Vec<Value>> {
    crate::processing::distinct_values(dataset, YEAR)
}

/// Rows of `year`, normalized for the page.
///
/// - `predicted_anc` and `predicted_deliveries`: missing becomes 0, values are rounded
///   (half away from zero) and stored as `Int64`.
/// - `month`: a numeric month `1..=12` becomes its label; out-of-range numbers become missing.
///   Text months are kept as they are.
///
/// # Errors
///
/// [`crate::QueryError::Schema`] if the data has no `year` column (or lacks either predicted
/// count).
pub fn prepare_year(dataset: &DataSet, year: impl Into<Value>) -> QueryResult<DataSet> {
    let mut rows = filter(dataset, &FilterSpec::new().with(Condition::eq(YEAR, year)))?;
    for column in [PREDICTED_ANC, PREDICTED_DELIVERIES] {
        rows = map_column(&rows, column, DataType::Int64, |v| {
            Value::Int64(v.as_f64().map_or(0, |n| n.round() as i64))
        })?;
    }

    let (_, month) = rows.schema.require_field(MONTH)?;
    if month.data_type.is_numeric() {
        rows = map_column(&rows, MONTH, DataType::Utf8, |v| {
            match v.as_f64().filter(|n| n.fract() == 0.0).and_then(|n| month_label(n as i64)) {
                Some(label) => Value::from(label),
                None => Value::Null,
            }
        })?;
    }
    Ok(rows)
}

/// Per-facility totals of the five predicted outcomes, one row per facility (sorted).
///
/// Columns: `health_facility`, then [`TOTAL_PRETERM`], [`TOTAL_LOW_BIRTH_WEIGHT`],
/// [`TOTAL_NEWBORN`], [`TOTAL_MATERNAL`], [`TOTAL_DELIVERIES`].
pub fn facility_summary(year_rows: &DataSet) -> QueryResult<DataSet> {
    let spec = SUMMARY_COLUMNS
        .iter()
        .fold(AggregateSpec::new().group_by([FACILITY]), |spec, (source, total)| {
            spec.with(Aggregate::sum(*source).alias(*total))
        });
    aggregate(year_rows, &spec)
}

/// Headline counts above the facility summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FacilityCounts {
    /// Facilities with any predicted preterm case.
    pub preterm: usize,
    /// Facilities with any predicted low birth weight case.
    pub low_birth_weight: usize,
    /// Facilities with any predicted newborn adverse outcome.
    pub neonatal: usize,
    /// Facilities with any predicted maternal adverse outcome.
    pub maternal: usize,
    /// Facilities with more than [`HIGH_DELIVERIES_THRESHOLD`] predicted deliveries.
    pub high_deliveries: usize,
}

/// Count facilities of a [`facility_summary`] above each headline threshold.
pub fn facility_counts(summary: &DataSet) -> QueryResult<FacilityCounts> {
    let spec = AggregateSpec::new()
        .with(Aggregate::count_above(TOTAL_PRETERM, 0.0))
        .with(Aggregate::count_above(TOTAL_LOW_BIRTH_WEIGHT, 0.0))
        .with(Aggregate::count_above(TOTAL_NEWBORN, 0.0))
        .with(Aggregate::count_above(TOTAL_MATERNAL, 0.0))
        .with(Aggregate::count_above(TOTAL_DELIVERIES, HIGH_DELIVERIES_THRESHOLD));
    let counted = aggregate(summary, &spec)?;

    let count = |i: usize| counted.rows.first().map_or(0, |row| whole(&row[i]).max(0) as usize);
    Ok(FacilityCounts {
        preterm: count(0),
        low_birth_weight: count(1),
        neonatal: count(2),
        maternal: count(3),
        high_deliveries: count(4),
    })
}

/// Monthly totals of `column` on a complete `Jan`..`Dec` axis; months without rows are 0.
///
/// Columns: `month`, `column`.
pub fn monthly_totals(year_rows: &DataSet, column: &str) -> QueryResult<DataSet> {
    Query::new()
        .aggregate(
            AggregateSpec::new()
                .group_by([MONTH])
                .with(Aggregate::sum(column).alias(column)),
        )
        .reindex(MONTH, month_order())
        .run(year_rows)
}

/// Predicted-count ranges offered by the range selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBucket {
    /// At most 49.
    Low,
    /// 50 through 99.
    Medium,
    /// At least 100.
    High,
}

impl RangeBucket {
    /// Selector entry meaning "no range chosen yet".
    pub const PLACEHOLDER: &'static str = "Choose option";

    pub const ALL: [RangeBucket; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "0-49",
            Self::Medium => "50-99",
            Self::High => ">=100",
        }
    }

    /// Parse a selector entry. The placeholder, and anything unrecognized, is no selection.
    pub fn from_selector(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.label() == label.trim())
    }

    /// Inclusive filter condition on `column`.
    pub fn condition(self, column: &str) -> Condition {
        match self {
            Self::Low => Condition::at_most(column, 49.0),
            Self::Medium => Condition::between(column, 50.0, 99.0),
            Self::High => Condition::at_least(column, 100.0),
        }
    }
}

impl fmt::Display for RangeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per facility and month totals of `column` over the rows within `bucket`.
///
/// Columns: `Health Facility`, `Month`, `title`. No bucket yields
/// [`QueryOutcome::NotSubmitted`].
pub fn range_table(
    year_rows: &DataSet,
    column: &str,
    bucket: Option<RangeBucket>,
    title: &str,
) -> QueryResult<QueryOutcome> {
    let Some(bucket) = bucket else {
        return Ok(QueryOutcome::NotSubmitted);
    };
    let totals = Query::new()
        .filter(FilterSpec::new().with(bucket.condition(column)))
        .aggregate(
            AggregateSpec::new()
                .group_by([FACILITY, MONTH])
                .with(Aggregate::sum(column).alias(title)),
        )
        .run(year_rows)?;
    let table = rename(&totals, &[(FACILITY, "Health Facility"), (MONTH, "Month")])?;
    Ok(QueryOutcome::from_dataset(table))
}

/// Download name for the facility summary: `facility_adverse_summary_{year}.csv`.
pub fn summary_file_name(year: &Value) -> String {
    format!("facility_adverse_summary_{year}.csv")
}
