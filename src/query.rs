//! Query pipeline and the tri-state query outcome.
//!
//! A [`Query`] chains the engine stages in a fixed order: filter → aggregate → reindex →
//! select. Running it is pure: the same query on the same dataset always produces the same
//! output.
//!
//! [`QueryOutcome`] keeps "nothing asked yet" apart from "asked, and nothing matched", so a
//! presentation layer never has to guess from a zero row count.

use crate::error::QueryResult;
use crate::processing::{aggregate, filter, reindex_by_category, select, AggregateSpec, FilterSpec};
use crate::types::{DataSet, Schema, Value};

/// Result of a (possibly not yet submitted) query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// No query has been submitted (e.g. no selection made yet).
    NotSubmitted,
    /// The query ran and matched no rows. Carries the output schema for headers.
    Empty(Schema),
    /// The query ran and produced at least one row.
    Rows(DataSet),
}

impl QueryOutcome {
    /// Classify a query result as [`QueryOutcome::Empty`] or [`QueryOutcome::Rows`].
    pub fn from_dataset(dataset: DataSet) -> Self {
        if dataset.is_empty() {
            Self::Empty(dataset.schema)
        } else {
            Self::Rows(dataset)
        }
    }

    /// `true` unless [`QueryOutcome::NotSubmitted`].
    pub fn is_submitted(&self) -> bool {
        !matches!(self, Self::NotSubmitted)
    }

    /// `true` only for a submitted query that matched nothing.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    /// Output rows, if the query produced any.
    pub fn dataset(&self) -> Option<&DataSet> {
        match self {
            Self::Rows(ds) => Some(ds),
            _ => None,
        }
    }

    /// Row count of a submitted query; `None` if not submitted.
    pub fn row_count(&self) -> Option<usize> {
        match self {
            Self::NotSubmitted => None,
            Self::Empty(_) => Some(0),
            Self::Rows(ds) => Some(ds.row_count()),
        }
    }

    /// Convert into a dataset; an empty result becomes a dataset with no rows.
    pub fn into_dataset(self) -> Option<DataSet> {
        match self {
            Self::NotSubmitted => None,
            Self::Empty(schema) => Some(DataSet::empty(schema)),
            Self::Rows(ds) => Some(ds),
        }
    }
}

/// A declarative query: optional filter, aggregate, reindex and projection stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filter: Option<FilterSpec>,
    aggregate: Option<AggregateSpec>,
    reindex: Option<(String, Vec<Value>)>,
    select: Option<Vec<String>>,
}

impl Query {
    /// A query that returns the dataset unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter rows first.
    pub fn filter(mut self, spec: FilterSpec) -> Self {
        self.filter = Some(spec);
        self
    }

    /// Aggregate the filtered rows.
    pub fn aggregate(mut self, spec: AggregateSpec) -> Self {
        self.aggregate = Some(spec);
        self
    }

    /// Reorder the result along `categories` of `key_column`.
    pub fn reindex(mut self, key_column: impl Into<String>, categories: Vec<Value>) -> Self {
        self.reindex = Some((key_column.into(), categories));
        self
    }

    /// Project the final columns.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Run the query against `dataset`.
    pub fn run(&self, dataset: &DataSet) -> QueryResult<DataSet> {
        let mut current = match &self.filter {
            Some(spec) => filter(dataset, spec)?,
            None => dataset.clone(),
        };
        if let Some(spec) = &self.aggregate {
            current = aggregate(&current, spec)?;
        }
        if let Some((key, categories)) = &self.reindex {
            current = reindex_by_category(&current, key, categories)?;
        }
        if let Some(columns) = &self.select {
            current = select(&current, columns.as_slice())?;
        }
        Ok(current)
    }

    /// Run the query and classify the result.
    pub fn outcome(&self, dataset: &DataSet) -> QueryResult<QueryOutcome> {
        self.run(dataset).map(QueryOutcome::from_dataset)
    }
}

/// Run `query` if one was submitted, otherwise report [`QueryOutcome::NotSubmitted`].
pub fn run_submitted(query: Option<&Query>, dataset: &DataSet) -> QueryResult<QueryOutcome> {
    match query {
        Some(q) => q.outcome(dataset),
        None => Ok(QueryOutcome::NotSubmitted),
    }
}

#[cfg(test)]
mod tests {
    use super::{run_submitted, Query, QueryOutcome};
    use crate::processing::{month_order, Aggregate, AggregateSpec, Condition, FilterSpec};
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn sample_dataset() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("facility", DataType::Utf8),
            Field::new("month", DataType::Utf8),
            Field::new("deliveries", DataType::Int64),
        ]);
        DataSet::new(
            schema,
            vec![
                vec![Value::from("A"), Value::from("Jan"), Value::Int64(10)],
                vec![Value::from("B"), Value::from("Jan"), Value::Int64(5)],
                vec![Value::from("A"), Value::from("Feb"), Value::Int64(7)],
            ],
        )
    }

    fn monthly_query() -> Query {
        Query::new()
            .aggregate(
                AggregateSpec::new()
                    .group_by(["month"])
                    .with(Aggregate::sum("deliveries").alias("deliveries")),
            )
            .reindex("month", month_order())
    }

    #[test]
    fn pipeline_produces_complete_month_axis() {
        let out = monthly_query().run(&sample_dataset()).unwrap();
        assert_eq!(out.row_count(), 12);
        assert_eq!(out.rows[0], vec![Value::from("Jan"), Value::Int64(15)]);
        assert_eq!(out.rows[1], vec![Value::from("Feb"), Value::Int64(7)]);
    }

    #[test]
    fn running_twice_is_deterministic() {
        let ds = sample_dataset();
        let q = monthly_query();
        assert_eq!(q.run(&ds).unwrap(), q.run(&ds).unwrap());
    }

    #[test]
    fn select_projects_after_filtering() {
        let q = Query::new()
            .filter(FilterSpec::new().with(Condition::eq("facility", "A")))
            .select(["deliveries"]);
        let out = q.run(&sample_dataset()).unwrap();
        assert_eq!(out.rows, vec![vec![Value::Int64(10)], vec![Value::Int64(7)]]);
    }

    #[test]
    fn outcome_distinguishes_not_submitted_from_empty() {
        let ds = sample_dataset();
        let nothing = run_submitted(None, &ds).unwrap();
        assert_eq!(nothing, QueryOutcome::NotSubmitted);
        assert!(!nothing.is_submitted());
        assert_eq!(nothing.row_count(), None);

        let q = Query::new().filter(FilterSpec::new().with(Condition::eq("facility", "Z")));
        let empty = run_submitted(Some(&q), &ds).unwrap();
        assert!(empty.is_submitted());
        assert!(empty.is_empty_result());
        assert_eq!(empty.row_count(), Some(0));
        assert_eq!(empty.into_dataset().unwrap().schema, ds.schema);

        let all = Query::new().outcome(&ds).unwrap();
        assert_eq!(all.dataset(), Some(&ds));
    }

    #[test]
    fn errors_surface_from_any_stage() {
        let q = Query::new().select(["nonexistent_col"]);
        let err = q.run(&sample_dataset()).unwrap_err();
        assert!(err.to_string().contains("nonexistent_col"));
    }
}
