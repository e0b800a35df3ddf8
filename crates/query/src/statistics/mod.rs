//! Equi-depth histograms and the `StatisticsTable` the planner reads its
//! cardinality estimates from. Built during `ANALYZE`, outside query
//! planning; consumed read-only, as an immutable snapshot, during it.

pub mod histogram;
pub mod table;

pub use histogram::{build_column, build_index, copy_from_index_columns, Bucket, Histogram};
pub use table::{Bound, Range, StatisticsTable};
