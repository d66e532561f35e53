//! Reordering aggregated rows along a fixed category axis.

use std::collections::BTreeMap;

use crate::error::{QueryError, QueryResult};
use crate::types::{DataSet, Value};

/// Calendar month labels in canonical order.
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// [`MONTHS`] as category values for [`reindex_by_category`].
pub fn month_order() -> Vec<Value> {
    MONTHS.iter().map(|m| Value::from(*m)).collect()
}

/// Label for a 1-based month number (`1` → `"Jan"`); `None` outside `1..=12`.
pub fn month_label(month: i64) -> Option<&'static str> {
    usize::try_from(month)
        .ok()
        .and_then(|m| m.checked_sub(1))
        .and_then(|i| MONTHS.get(i).copied())
}

/// Reorder `dataset` so that `key_column` follows `categories` exactly.
///
/// The output has one row per category, in order:
///
/// - a row whose key matches a category is moved to that category's position;
/// - a category with no matching row gets a filler row: the key is the category, numeric
///   columns are zero of their type, other columns are `Null`;
/// - rows whose key is missing or not listed are dropped.
///
/// # Errors
///
/// - [`QueryError::Schema`] if `key_column` is absent.
/// - [`QueryError::Type`] if a category cannot match the key column's type.
/// - [`QueryError::DuplicateCategory`] if a category is listed twice, or two rows share a key.
pub fn reindex_by_category(
    dataset: &DataSet,
    key_column: &str,
    categories: &[Value],
) -> QueryResult<DataSet> {
    let (key_idx, key_field) = dataset.schema.require_field(key_column)?;

    let mut positions: BTreeMap<CategoryKey, usize> = BTreeMap::new();
    for (pos, category) in categories.iter().enumerate() {
        key_field.check_value(category)?;
        if positions.insert(CategoryKey(category.clone()), pos).is_some() {
            return Err(duplicate(key_column, category));
        }
    }

    let mut slots: Vec<Option<Vec<Value>>> = vec![None; categories.len()];
    for row in &dataset.rows {
        let key = &row[key_idx];
        let Some(&pos) = positions.get(&CategoryKey(key.clone())) else {
            continue;
        };
        if slots[pos].is_some() {
            return Err(duplicate(key_column, key));
        }
        slots[pos] = Some(row.clone());
    }

    let rows = slots
        .into_iter()
        .zip(categories)
        .map(|(slot, category)| {
            slot.unwrap_or_else(|| {
                dataset
                    .schema
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(i, f)| if i == key_idx { category.clone() } else { f.data_type.zero() })
                    .collect()
            })
        })
        .collect();

    Ok(DataSet::new(dataset.schema.clone(), rows))
}

fn duplicate(column: &str, value: &Value) -> QueryError {
    QueryError::DuplicateCategory {
        column: column.to_string(),
        value: value.to_string(),
    }
}

#[derive(Debug, Clone)]
struct CategoryKey(Value);

impl PartialEq for CategoryKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.matches(&other.0)
    }
}

impl Eq for CategoryKey {}

impl PartialOrd for CategoryKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CategoryKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}
