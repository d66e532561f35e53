//! Core data model types.
//!
//! Facility data is ingested into an in-memory [`DataSet`], described by a [`Schema`] (a list of
//! typed [`Field`]s). The engine never mutates a [`DataSet`]; every operation returns a new one.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{QueryError, QueryResult};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
}

impl DataType {
    /// Returns `true` for [`DataType::Int64`] and [`DataType::Float64`].
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }

    /// Zero value of this type, used when filling absent categories.
    ///
    /// Non-numeric types have no zero and fill with [`Value::Null`].
    pub fn zero(self) -> Value {
        match self {
            Self::Int64 => Value::Int64(0),
            Self::Float64 => Value::Float64(0.0),
            Self::Bool | Self::Utf8 => Value::Null,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int64 => "Int64",
            Self::Float64 => "Float64",
            Self::Bool => "Bool",
            Self::Utf8 => "Utf8",
        };
        f.write_str(name)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// Check that `value` could be stored in (or compared against) this field.
    ///
    /// Missing values are accepted by every field. Integers and floats are interchangeable.
    pub fn check_value(&self, value: &Value) -> QueryResult<()> {
        let compatible = match value.data_type() {
            None => true,
            Some(t) if t.is_numeric() => self.data_type.is_numeric(),
            Some(t) => t == self.data_type,
        };
        if compatible {
            Ok(())
        } else {
            Err(QueryError::Type {
                column: self.name.clone(),
                expected: format!("a value comparable with {}", self.data_type),
                found: format!("{} value '{value}'", value.type_name()),
            })
        }
    }

    /// Fail with [`QueryError::Type`] unless the field is numeric.
    pub fn require_numeric(&self) -> QueryResult<()> {
        if self.data_type.is_numeric() {
            Ok(())
        } else {
            Err(QueryError::Type {
                column: self.name.clone(),
                expected: "a numeric column (Int64 or Float64)".to_string(),
                found: self.data_type.to_string(),
            })
        }
    }
}

/// A list of fields describing the shape of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the index of a field by name, or a [`QueryError::Schema`] naming the column.
    pub fn require_index(&self, name: &str) -> QueryResult<usize> {
        self.index_of(name).ok_or_else(|| QueryError::Schema {
            column: name.to_string(),
            available: self.field_names().map(str::to_string).collect(),
        })
    }

    /// Returns the field with the given name, or a [`QueryError::Schema`].
    pub fn require_field(&self, name: &str) -> QueryResult<(usize, &Field)> {
        let idx = self.require_index(name)?;
        Ok((idx, &self.fields[idx]))
    }
}

/// A single typed value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float. `NaN` is treated as missing by the engine.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// `true` for [`Value::Null`] and for a floating-point `NaN`.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float64(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the value; `None` for missing and non-numeric values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    /// String view of the value, if it is a [`Value::Utf8`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s),
            _ => None,
        }
    }

    /// The data type this value carries; `None` when missing.
    pub fn data_type(&self) -> Option<DataType> {
        if self.is_missing() {
            return None;
        }
        match self {
            Self::Null => None,
            Self::Int64(_) => Some(DataType::Int64),
            Self::Float64(_) => Some(DataType::Float64),
            Self::Bool(_) => Some(DataType::Bool),
            Self::Utf8(_) => Some(DataType::Utf8),
        }
    }

    fn type_name(&self) -> &'static str {
        match self.data_type() {
            None => "missing",
            Some(DataType::Int64) => "Int64",
            Some(DataType::Float64) => "Float64",
            Some(DataType::Bool) => "Bool",
            Some(DataType::Utf8) => "Utf8",
        }
    }

    /// Equality used by filters and category matching.
    ///
    /// Numbers compare numerically across `Int64`/`Float64`, and two missing values match.
    pub fn matches(&self, other: &Self) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }

    /// Total order over values: booleans, then numbers, then strings, then missing.
    ///
    /// `-0.0` and `0.0` are equal. Used for group keys and for sorting selector lists.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int64(a), Self::Int64(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                // Adding 0.0 turns -0.0 into 0.0.
                (Some(a), Some(b)) => (a + 0.0).total_cmp(&(b + 0.0)),
                _ => self.rank().cmp(&other.rank()).then_with(|| match (self, other) {
                    (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
                    (Self::Utf8(a), Self::Utf8(b)) => a.cmp(b),
                    _ => Ordering::Equal,
                }),
            },
        }
    }

    fn rank(&self) -> u8 {
        if self.is_missing() {
            return 3;
        }
        match self {
            Self::Bool(_) => 0,
            Self::Int64(_) | Self::Float64(_) => 1,
            Self::Utf8(_) => 2,
            Self::Null => 3,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) if v.is_nan() => Ok(()),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Utf8(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Utf8(v)
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Create a dataset with no rows.
    pub fn empty(schema: Schema) -> Self {
        Self::new(schema, Vec::new())
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// `true` when the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate the values of a single column.
    pub fn column(&self, name: &str) -> QueryResult<impl Iterator<Item = &Value>> {
        let idx = self.schema.require_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Create a new dataset by applying `mapper` to every row.
    ///
    /// The returned dataset uses `schema`; pass `self.schema.clone()` to keep the shape.
    ///
    /// # Panics
    ///
    /// Panics if `mapper` returns a row with a different length than the schema field count.
    pub fn map_rows<F>(&self, schema: Schema, mut mapper: F) -> Self
    where
        F: FnMut(&[Value]) -> Vec<Value>,
    {
        let expected_len = schema.fields.len();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let out = mapper(row.as_slice());
                assert!(
                    out.len() == expected_len,
                    "mapped row length {} does not match schema length {}",
                    out.len(),
                    expected_len
                );
                out
            })
            .collect();

        Self { schema, rows }
    }

    /// Reduce (fold) all rows into an accumulator value.
    ///
    /// This is similar to `Iterator::fold`, but provides each row as `&[Value]`.
    pub fn reduce_rows<A, F>(&self, init: A, mut reducer: F) -> A
    where
        F: FnMut(A, &[Value]) -> A,
    {
        self.rows
            .iter()
            .fold(init, |acc, row| reducer(acc, row.as_slice()))
    }
}
