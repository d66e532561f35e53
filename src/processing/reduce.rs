//! Whole-column reductions for [`crate::types::DataSet`].

use crate::error::QueryResult;
use crate::types::{DataSet, DataType, Value};

use super::aggregate::narrow_sum;

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows (including missing values).
    Count,
    /// Sum numeric values; missing values count as zero.
    Sum,
    /// Minimum numeric value, ignoring missing values.
    Min,
    /// Maximum numeric value, ignoring missing values.
    Max,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - `Count` always returns `Value::Int64(row_count)`.
/// - `Sum` keeps the column type and returns zero when there are no values.
/// - `Min`/`Max` return `Value::Null` if there are no non-missing values.
///
/// # Errors
///
/// - [`crate::QueryError::Schema`] if `column` does not exist.
/// - [`crate::QueryError::Type`] for `Sum`/`Min`/`Max` over a non-numeric column.
/// - [`crate::QueryError::Overflow`] when an integer `Sum` leaves the `Int64` range.
pub fn reduce(dataset: &DataSet, column: &str, op: ReduceOp) -> QueryResult<Value> {
    let (idx, field) = dataset.schema.require_field(column)?;

    if op == ReduceOp::Count {
        return Ok(Value::Int64(dataset.row_count() as i64));
    }
    field.require_numeric()?;

    Ok(match field.data_type {
        DataType::Int64 => {
            let values = dataset.rows.iter().filter_map(|row| match row[idx] {
                Value::Int64(v) => Some(v),
                _ => None,
            });
            match op {
                ReduceOp::Sum => Value::Int64(narrow_sum(values.map(i128::from).sum(), column)?),
                ReduceOp::Min => values.min().map_or(Value::Null, Value::Int64),
                _ => values.max().map_or(Value::Null, Value::Int64),
            }
        }
        _ => {
            let values = dataset.rows.iter().filter_map(|row| row[idx].as_f64());
            match op {
                ReduceOp::Sum => Value::Float64(values.sum()),
                ReduceOp::Min => values.reduce(f64::min).map_or(Value::Null, Value::Float64),
                _ => values.reduce(f64::max).map_or(Value::Null, Value::Float64),
            }
        }
    })
}
