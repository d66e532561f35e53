//! Group-by aggregation for [`crate::types::DataSet`].
//!
//! [`aggregate`] partitions rows by the values of the group-by columns and computes one output
//! row per group. Rows with a missing value in any group-by column fall into a single dedicated
//! missing group instead of being dropped, so every input row is accounted for exactly once.
//!
//! Output rows are ordered by group key ascending (see [`Value::total_cmp`]); the missing group,
//! if any, comes last.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{QueryError, QueryResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Aggregate functions supported by [`aggregate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateFunction {
    /// Arithmetic sum; missing values count as zero.
    Sum,
    /// Number of distinct non-missing values.
    CountDistinct,
    /// Number of rows whose value is strictly greater than the threshold.
    CountNonzeroThreshold(f64),
}

impl AggregateFunction {
    /// Name used for default output columns (`<name>_<source column>`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::CountDistinct => "count_distinct",
            Self::CountNonzeroThreshold(_) => "count_nonzero_threshold",
        }
    }

    fn output_type(self, source: &Field) -> QueryResult<DataType> {
        match self {
            Self::Sum => {
                source.require_numeric()?;
                Ok(source.data_type)
            }
            Self::CountDistinct => Ok(DataType::Int64),
            Self::CountNonzeroThreshold(_) => {
                source.require_numeric()?;
                Ok(DataType::Int64)
            }
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountNonzeroThreshold(t) => write!(f, "{}({t})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// One requested aggregate: a function over a source column, with an optional output name.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Source column.
    pub column: String,
    /// Function applied to the source column.
    pub function: AggregateFunction,
    /// Output column name. Defaults to `<function>_<column>`.
    pub output: Option<String>,
}

impl Aggregate {
    /// Create an aggregate.
    pub fn new(column: impl Into<String>, function: AggregateFunction) -> Self {
        Self {
            column: column.into(),
            function,
            output: None,
        }
    }

    /// `sum(column)`.
    pub fn sum(column: impl Into<String>) -> Self {
        Self::new(column, AggregateFunction::Sum)
    }

    /// `count_distinct(column)`.
    pub fn count_distinct(column: impl Into<String>) -> Self {
        Self::new(column, AggregateFunction::CountDistinct)
    }

    /// `count(column > threshold)`.
    pub fn count_above(column: impl Into<String>, threshold: f64) -> Self {
        Self::new(column, AggregateFunction::CountNonzeroThreshold(threshold))
    }

    /// Set the output column name.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.output = Some(name.into());
        self
    }

    /// Resolved output column name.
    pub fn output_name(&self) -> String {
        match &self.output {
            Some(name) => name.clone(),
            None => format!("{}_{}", self.function.name(), self.column),
        }
    }
}

/// Group-by columns plus the aggregates to compute per group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSpec {
    /// Group-by column names. Empty means the whole dataset is one group.
    pub group_by: Vec<String>,
    /// Aggregates to compute.
    pub aggregates: Vec<Aggregate>,
}

impl AggregateSpec {
    /// Create an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the group-by columns.
    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add an aggregate.
    pub fn with(mut self, aggregate: Aggregate) -> Self {
        self.aggregates.push(aggregate);
        self
    }

    /// Validate against `schema`, resolving column indexes and the output schema.
    pub(crate) fn compile(&self, schema: &Schema) -> QueryResult<AggregatePlan> {
        let mut fields = Vec::with_capacity(self.group_by.len() + self.aggregates.len());
        let mut group_idxs = Vec::with_capacity(self.group_by.len());
        for name in &self.group_by {
            let (idx, field) = schema.require_field(name)?;
            group_idxs.push(idx);
            fields.push(field.clone());
        }

        let mut inputs = Vec::with_capacity(self.aggregates.len());
        for agg in &self.aggregates {
            let (idx, field) = schema.require_field(&agg.column)?;
            let data_type = agg.function.output_type(field)?;
            inputs.push(AggregateInput {
                idx,
                function: agg.function,
                data_type,
            });
            fields.push(Field::new(agg.output_name(), data_type));
        }

        let mut seen = BTreeSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(QueryError::DuplicateColumn {
                    column: field.name.clone(),
                });
            }
        }

        Ok(AggregatePlan {
            group_idxs,
            inputs,
            output: Schema::new(fields),
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct AggregateInput {
    idx: usize,
    function: AggregateFunction,
    data_type: DataType,
}

/// An [`AggregateSpec`] resolved against a schema.
#[derive(Debug, Clone)]
pub(crate) struct AggregatePlan {
    group_idxs: Vec<usize>,
    inputs: Vec<AggregateInput>,
    output: Schema,
}

impl AggregatePlan {
    fn new_accumulators(&self) -> Vec<Accumulator> {
        self.inputs.iter().map(Accumulator::new).collect()
    }
}

/// Value wrapper ordered by [`Value::total_cmp`], usable as a map key.
#[derive(Debug, Clone)]
pub(crate) struct KeyValue(pub(crate) Value);

impl PartialEq for KeyValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyValue {}

impl PartialOrd for KeyValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Running state of one aggregate within one group.
///
/// Every variant merges associatively and commutatively, which is what lets
/// [`crate::execution::ExecutionEngine`] aggregate chunks independently.
#[derive(Debug, Clone)]
enum Accumulator {
    /// Widened so partial sums never overflow; narrowed back to `i64` when finished.
    IntSum(i128),
    FloatSum(f64),
    Distinct(BTreeSet<KeyValue>),
    Above { threshold: f64, count: i64 },
}

impl Accumulator {
    fn new(input: &AggregateInput) -> Self {
        match (input.function, input.data_type) {
            (AggregateFunction::Sum, DataType::Int64) => Self::IntSum(0),
            (AggregateFunction::Sum, _) => Self::FloatSum(0.0),
            (AggregateFunction::CountDistinct, _) => Self::Distinct(BTreeSet::new()),
            (AggregateFunction::CountNonzeroThreshold(threshold), _) => Self::Above { threshold, count: 0 },
        }
    }

    fn update(&mut self, value: &Value) {
        match self {
            Self::IntSum(acc) => {
                if let Value::Int64(v) = value {
                    *acc += i128::from(*v);
                }
            }
            Self::FloatSum(acc) => {
                if let Some(v) = value.as_f64() {
                    *acc += v;
                }
            }
            Self::Distinct(set) => {
                if !value.is_missing() {
                    set.insert(KeyValue(value.clone()));
                }
            }
            Self::Above { threshold, count } => {
                if value.as_f64().is_some_and(|v| v > *threshold) {
                    *count += 1;
                }
            }
        }
    }

    fn merge(&mut self, other: Self) {
        match (self, other) {
            (Self::IntSum(a), Self::IntSum(b)) => *a += b,
            (Self::FloatSum(a), Self::FloatSum(b)) => *a += b,
            (Self::Distinct(a), Self::Distinct(mut b)) => a.append(&mut b),
            (Self::Above { count: a, .. }, Self::Above { count: b, .. }) => *a += b,
            _ => unreachable!("accumulators of one plan always line up"),
        }
    }

    fn finish(self, column: &str) -> QueryResult<Value> {
        Ok(match self {
            Self::IntSum(v) => Value::Int64(narrow_sum(v, column)?),
            Self::FloatSum(v) => Value::Float64(v),
            Self::Distinct(set) => Value::Int64(set.len() as i64),
            Self::Above { count, .. } => Value::Int64(count),
        })
    }
}

/// Convert a widened integer sum back to `Int64`.
pub(crate) fn narrow_sum(sum: i128, column: &str) -> QueryResult<i64> {
    i64::try_from(sum).map_err(|_| QueryError::Overflow {
        column: column.to_string(),
    })
}

/// Partial aggregation state: the groups seen so far and their accumulators.
#[derive(Debug)]
pub(crate) struct GroupTable<'p> {
    plan: &'p AggregatePlan,
    groups: BTreeMap<Vec<KeyValue>, Vec<Accumulator>>,
    missing: Option<Vec<Accumulator>>,
}

impl<'p> GroupTable<'p> {
    pub(crate) fn new(plan: &'p AggregatePlan) -> Self {
        Self {
            plan,
            groups: BTreeMap::new(),
            missing: None,
        }
    }

    pub(crate) fn update(&mut self, row: &[Value]) {
        let accs = if self.plan.group_idxs.iter().any(|&i| row[i].is_missing()) {
            self.missing.get_or_insert_with(|| self.plan.new_accumulators())
        } else {
            let key: Vec<KeyValue> = self
                .plan
                .group_idxs
                .iter()
                .map(|&i| KeyValue(row[i].clone()))
                .collect();
            self.groups
                .entry(key)
                .or_insert_with(|| self.plan.new_accumulators())
        };
        for (acc, input) in accs.iter_mut().zip(&self.plan.inputs) {
            acc.update(&row[input.idx]);
        }
    }

    /// Fold another partial table (built from the same plan) into this one.
    pub(crate) fn merge(&mut self, other: GroupTable<'p>) {
        for (key, accs) in other.groups {
            match self.groups.get_mut(&key) {
                Some(mine) => merge_accumulators(mine, accs),
                None => {
                    self.groups.insert(key, accs);
                }
            }
        }
        if let Some(accs) = other.missing {
            match self.missing.as_mut() {
                Some(mine) => merge_accumulators(mine, accs),
                None => self.missing = Some(accs),
            }
        }
    }

    pub(crate) fn group_count(&self) -> usize {
        self.groups.len() + usize::from(self.missing.is_some())
    }

    /// Emit one row per group.
    ///
    /// # Errors
    ///
    /// [`QueryError::Overflow`] if an integer sum does not fit in `Int64`.
    pub(crate) fn finish(mut self) -> QueryResult<DataSet> {
        // Without group-by columns the whole input is one group, even when it has no rows.
        if self.plan.group_idxs.is_empty() && self.groups.is_empty() {
            self.groups.insert(Vec::new(), self.plan.new_accumulators());
        }

        let plan = self.plan;
        let key_len = plan.group_idxs.len();
        let names: Vec<&str> = plan.output.fields[key_len..]
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        let finish_row = |mut row: Vec<Value>, accs: Vec<Accumulator>| -> QueryResult<Vec<Value>> {
            for (acc, name) in accs.into_iter().zip(&names) {
                row.push(acc.finish(name)?);
            }
            Ok(row)
        };

        let mut rows = Vec::with_capacity(self.group_count());
        for (key, accs) in self.groups {
            rows.push(finish_row(key.into_iter().map(|k| k.0).collect(), accs)?);
        }
        if let Some(accs) = self.missing {
            rows.push(finish_row(vec![Value::Null; key_len], accs)?);
        }

        Ok(DataSet::new(plan.output.clone(), rows))
    }
}

fn merge_accumulators(into: &mut [Accumulator], from: Vec<Accumulator>) {
    for (a, b) in into.iter_mut().zip(from) {
        a.merge(b);
    }
}

/// Aggregate `dataset` according to `spec`, producing a new dataset.
///
/// The output schema is the group-by columns (with their input types) followed by one column
/// per aggregate. `sum` keeps the numeric type of its source column; the counts are `Int64`.
///
/// # Errors
///
/// - [`QueryError::Schema`] when a group-by or source column is absent.
/// - [`QueryError::Type`] for `sum` or a threshold count over a non-numeric column.
/// - [`QueryError::DuplicateColumn`] when two output columns would share a name.
/// - [`QueryError::Overflow`] when an integer sum leaves the `Int64` range.
///
/// # Example
///
/// ```rust
/// use facility_dashboard::processing::{aggregate, Aggregate, AggregateSpec};
/// use facility_dashboard::types::{DataSet, DataType, Field, Schema, Value};
///
/// let schema = Schema::new(vec![
///     Field::new("month", DataType::Utf8),
///     Field::new("deliveries", DataType::Int64),
/// ]);
/// let ds = DataSet::new(
///     schema,
///     vec![
///         vec![Value::Utf8("Jan".into()), Value::Int64(10)],
///         vec![Value::Utf8("Jan".into()), Value::Int64(5)],
///         vec![Value::Utf8("Feb".into()), Value::Int64(7)],
///     ],
/// );
///
/// let spec = AggregateSpec::new()
///     .group_by(["month"])
///     .with(Aggregate::sum("deliveries").alias("deliveries"));
/// let out = aggregate(&ds, &spec).unwrap();
/// assert_eq!(out.rows[0], vec![Value::Utf8("Feb".into()), Value::Int64(7)]);
/// assert_eq!(out.rows[1], vec![Value::Utf8("Jan".into()), Value::Int64(15)]);
/// ```
pub fn aggregate(dataset: &DataSet, spec: &AggregateSpec) -> QueryResult<DataSet> {
    let plan = spec.compile(&dataset.schema)?;
    let mut table = GroupTable::new(&plan);
    for row in &dataset.rows {
        table.update(row);
    }
    table.finish()
}
