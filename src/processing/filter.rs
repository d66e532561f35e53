//! Row filtering for [`crate::types::DataSet`].
//!
//! [`filter`] evaluates a declarative [`FilterSpec`]: every [`Condition`] must hold for a row to
//! be kept. OR is expressed with a set-membership condition ([`Condition::is_in`]).

use crate::error::QueryResult;
use crate::types::{DataSet, Schema, Value};

/// A single filter condition on one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Keep rows whose value is a member of `values`.
    ///
    /// Numbers compare numerically across integer and float; a `Null` member matches missing
    /// cells.
    In { column: String, values: Vec<Value> },
    /// Keep rows with `lo <= value <= hi`. A `None` bound is unbounded on that side.
    ///
    /// Missing and non-numeric cells never satisfy a range.
    Range {
        column: String,
        lo: Option<f64>,
        hi: Option<f64>,
    },
}

impl Condition {
    /// `column == value`.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::In {
            column: column.into(),
            values: vec![value.into()],
        }
    }

    /// `column ∈ values`.
    pub fn is_in<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// `lo <= column <= hi`, either bound optional.
    pub fn range(column: impl Into<String>, lo: Option<f64>, hi: Option<f64>) -> Self {
        Self::Range {
            column: column.into(),
            lo,
            hi,
        }
    }

    /// `lo <= column <= hi`.
    pub fn between(column: impl Into<String>, lo: f64, hi: f64) -> Self {
        Self::range(column, Some(lo), Some(hi))
    }

    /// `column >= lo`.
    pub fn at_least(column: impl Into<String>, lo: f64) -> Self {
        Self::range(column, Some(lo), None)
    }

    /// `column <= hi`.
    pub fn at_most(column: impl Into<String>, hi: f64) -> Self {
        Self::range(column, None, Some(hi))
    }

    /// Column this condition reads.
    pub fn column(&self) -> &str {
        match self {
            Self::In { column, .. } | Self::Range { column, .. } => column,
        }
    }
}

/// A conjunction of [`Condition`]s. An empty spec keeps every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    /// Conditions, all of which must hold.
    pub conditions: Vec<Condition>,
}

impl FilterSpec {
    /// Create an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition (builder style).
    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Validate the spec against `schema` and resolve column indexes.
    pub(crate) fn compile(&self, schema: &Schema) -> QueryResult<CompiledFilter> {
        let mut checks = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            let (idx, field) = schema.require_field(condition.column())?;
            let check = match condition {
                Condition::In { values, .. } => {
                    for v in values {
                        field.check_value(v)?;
                    }
                    Check::In {
                        idx,
                        values: values.clone(),
                    }
                }
                Condition::Range { lo, hi, .. } => {
                    field.require_numeric()?;
                    Check::Range {
                        idx,
                        lo: *lo,
                        hi: *hi,
                    }
                }
            };
            checks.push(check);
        }
        Ok(CompiledFilter { checks })
    }
}

#[derive(Debug, Clone)]
enum Check {
    In { idx: usize, values: Vec<Value> },
    Range { idx: usize, lo: Option<f64>, hi: Option<f64> },
}

/// A [`FilterSpec`] resolved against a schema.
#[derive(Debug, Clone)]
pub(crate) struct CompiledFilter {
    checks: Vec<Check>,
}

impl CompiledFilter {
    pub(crate) fn matches(&self, row: &[Value]) -> bool {
        self.checks.iter().all(|check| match check {
            Check::In { idx, values } => values.iter().any(|v| row[*idx].matches(v)),
            Check::Range { idx, lo, hi } => match row[*idx].as_f64() {
                Some(x) => lo.is_none_or(|lo| lo <= x) && hi.is_none_or(|hi| x <= hi),
                None => false,
            },
        })
    }
}

/// Returns a new [`DataSet`] containing only rows that satisfy every condition of `spec`.
///
/// An empty result is valid and is not an error.
///
/// # Errors
///
/// - [`crate::QueryError::Schema`] if a condition names a column absent from the schema.
/// - [`crate::QueryError::Type`] for a range on a non-numeric column, or a membership value that
///   cannot match the column type.
pub fn filter(dataset: &DataSet, spec: &FilterSpec) -> QueryResult<DataSet> {
    let compiled = spec.compile(&dataset.schema)?;
    Ok(dataset.filter_rows(|row| compiled.matches(row)))
}

/// Returns the rows that [`filter`] would drop for the same `spec`.
///
/// Together the two outputs partition the input.
pub fn filter_complement(dataset: &DataSet, spec: &FilterSpec) -> QueryResult<DataSet> {
    let compiled = spec.compile(&dataset.schema)?;
    Ok(dataset.filter_rows(|row| !compiled.matches(row)))
}

/// Returns a new [`DataSet`] containing only rows for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`DataSet::filter_rows`] for predicates a
/// [`FilterSpec`] cannot express (e.g. case-insensitive matching).
pub fn filter_where<F>(dataset: &DataSet, predicate: F) -> DataSet
where
    F: FnMut(&[Value]) -> bool,
{
    dataset.filter_rows(predicate)
}
