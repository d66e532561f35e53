//! Report page: one facility's indicators for a chosen year and month.

use crate::error::QueryResult;
use crate::processing::{distinct_values, reduce, Condition, FilterSpec, ReduceOp};
use crate::query::{Query, QueryOutcome};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::columns::{
    DELIVERIES, FACILITY, LOW_BIRTH_WEIGHT, MATERNAL_DEATHS, MONTH, NEWBORN_DEATHS, PRETERM_BIRTHS, REPORT_COLUMNS,
    SUBCOUNTY, YEAR,
};
use super::{labels_in_order, whole};

/// Facilities reporting from `subcounty`, in data order.
pub fn facilities_in_subcounty(dataset: &DataSet, subcounty: &str) -> QueryResult<Vec<String>> {
    let rows = crate::processing::filter(dataset, &FilterSpec::new().with(Condition::eq(SUBCOUNTY, subcounty)))?;
    labels_in_order(&rows, FACILITY)
}

/// Sorted distinct years.
pub fn years(dataset: &DataSet) -> QueryResult<Vec<Value>> {
    distinct_values(dataset, YEAR)
}

/// Sorted distinct months, as stored (labels sort alphabetically, numbers numerically).
pub fn months(dataset: &DataSet) -> QueryResult<Vec<Value>> {
    distinct_values(dataset, MONTH)
}

/// The four selectors of the report page.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSelection {
    pub subcounty: String,
    pub facility: String,
    pub year: Value,
    pub month: Value,
}

impl ReportSelection {
    pub fn new(
        subcounty: impl Into<String>,
        facility: impl Into<String>,
        year: impl Into<Value>,
        month: impl Into<Value>,
    ) -> Self {
        Self {
            subcounty: subcounty.into(),
            facility: facility.into(),
            year: year.into(),
            month: month.into(),
        }
    }

    /// Rows matching all four selectors, projected to [`REPORT_COLUMNS`].
    pub fn query(&self) -> Query {
        Query::new()
            .filter(
                FilterSpec::new()
                    .with(Condition::eq(SUBCOUNTY, self.subcounty.as_str()))
                    .with(Condition::eq(FACILITY, self.facility.as_str()))
                    .with(Condition::eq(YEAR, self.year.clone()))
                    .with(Condition::eq(MONTH, self.month.clone())),
            )
            .select(REPORT_COLUMNS)
    }
}

/// Run the report for `selection`.
///
/// A selection that matches nothing is [`QueryOutcome::Empty`], which the page shows as "no data
/// available for the selected filters".
pub fn facility_report(dataset: &DataSet, selection: &ReportSelection) -> QueryResult<QueryOutcome> {
    selection.query().outcome(dataset)
}

const CASCADE: [(&str, &str); 5] = [
    ("Total Deliveries", DELIVERIES),
    ("Maternal Deaths", MATERNAL_DEATHS),
    ("Preterm Births", PRETERM_BIRTHS),
    ("Births < 2.5kg", LOW_BIRTH_WEIGHT),
    ("Newborn Deaths", NEWBORN_DEATHS),
];

/// Birth-outcome cascade of a report: one `Indicator`/`Count` row per stage, in cascade order.
pub fn birth_outcome_cascade(report: &DataSet) -> QueryResult<DataSet> {
    let schema = Schema::new(vec![
        Field::new("Indicator", DataType::Utf8),
        Field::new("Count", DataType::Int64),
    ]);
    let rows = CASCADE
        .iter()
        .map(|(label, column)| {
            let total = reduce(report, column, ReduceOp::Sum)?;
            Ok(vec![Value::from(*label), Value::Int64(whole(&total))])
        })
        .collect::<QueryResult<Vec<_>>>()?;
    Ok(DataSet::new(schema, rows))
}

/// Download name for a report: `{facility}_analytics_{year}_{month}.csv`.
pub fn report_file_name(selection: &ReportSelection) -> String {
    format!(
        "{}_analytics_{}_{}.csv",
        selection.facility, selection.year, selection.month
    )
}
