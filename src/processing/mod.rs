//! In-memory dataset transformations: the aggregation engine.
//!
//! Every operation takes a [`crate::types::DataSet`] by reference and returns a new one; inputs
//! are never mutated, and the same inputs always produce the same output.
//!
//! - [`filter()`]: keep rows matching a declarative [`FilterSpec`] (equality-in-set and numeric
//!   ranges, ANDed)
//! - [`aggregate()`]: group-by with `sum`, `count-distinct` and `count-nonzero-threshold`
//! - [`reindex_by_category()`]: force rows onto a fixed category axis (e.g. Jan..Dec)
//! - [`select()`] / [`rename()`]: projection
//! - [`distinct_values()`] / [`drop_duplicates()`]
//! - [`map()`] / [`map_column()`] / [`reduce()`]
//!
//! ## Example: filter → aggregate → reindex
//!
//! ```rust
//! use facility_dashboard::processing::{
//!     aggregate, filter, month_order, reindex_by_category, Aggregate, AggregateSpec, Condition,
//!     FilterSpec,
//! };
//! use facility_dashboard::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("facility", DataType::Utf8),
//!     Field::new("month", DataType::Utf8),
//!     Field::new("deliveries", DataType::Int64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::from("A"), Value::from("Jan"), Value::Int64(10)],
//!         vec![Value::from("B"), Value::from("Jan"), Value::Int64(5)],
//!         vec![Value::from("A"), Value::from("Feb"), Value::Int64(7)],
//!     ],
//! );
//!
//! let busy = filter(&ds, &FilterSpec::new().with(Condition::at_least("deliveries", 5.0))).unwrap();
//! let by_month = aggregate(
//!     &busy,
//!     &AggregateSpec::new()
//!         .group_by(["month"])
//!         .with(Aggregate::sum("deliveries").alias("deliveries")),
//! )
//! .unwrap();
//! let series = reindex_by_category(&by_month, "month", &month_order()).unwrap();
//!
//! assert_eq!(series.row_count(), 12);
//! assert_eq!(series.rows[0], vec![Value::from("Jan"), Value::Int64(15)]);
//! assert_eq!(series.rows[11], vec![Value::from("Dec"), Value::Int64(0)]);
//! ```

pub mod aggregate;
pub mod distinct;
pub mod filter;
pub mod map;
pub mod project;
pub mod reduce;
pub mod reindex;

pub(crate) use aggregate::{AggregatePlan, GroupTable};
pub(crate) use filter::CompiledFilter;

pub use aggregate::{aggregate, Aggregate, AggregateFunction, AggregateSpec};
pub use distinct::{distinct_values, drop_duplicates};
pub use filter::{filter, filter_complement, filter_where, Condition, FilterSpec};
pub use map::{map, map_column};
pub use project::{rename, select};
pub use reduce::{reduce, ReduceOp};
pub use reindex::{month_label, month_order, reindex_by_category, MONTHS};
