//! `StatisticsTable`: the planner's view of per-column and per-index
//! histograms, and the row-count estimators built on top of them.

use crate::planner::ColumnId;
use crate::statistics::histogram::Histogram;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use cynos_core::Value;

/// One side of a range bound.
#[derive(Clone, Debug, PartialEq)]
pub enum Bound {
    Unbounded,
    Included(Value),
    Excluded(Value),
}

/// A single scan range over a column or an index's composite key.
#[derive(Clone, Debug, PartialEq)]
pub struct Range {
    pub low: Bound,
    pub high: Bound,
}

impl Range {
    pub fn full() -> Self {
        Self {
            low: Bound::Unbounded,
            high: Bound::Unbounded,
        }
    }

    pub fn point(value: Value) -> Self {
        Self {
            low: Bound::Included(value.clone()),
            high: Bound::Included(value),
        }
    }
}

/// Maps column ids and index ids to their histograms, and answers the
/// row-count estimates the planner needs for costing scans.
#[derive(Clone, Debug, Default)]
pub struct StatisticsTable {
    columns: BTreeMap<ColumnId, Histogram>,
    indexes: BTreeMap<String, Histogram>,
    /// Row count of the underlying table, used when no histogram applies
    /// (e.g. a full table scan with no pushed-down predicates).
    row_count: u64,
}

impl StatisticsTable {
    pub fn new(row_count: u64) -> Self {
        Self {
            columns: BTreeMap::new(),
            indexes: BTreeMap::new(),
            row_count,
        }
    }

    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn set_column_histogram(&mut self, col: ColumnId, hist: Histogram) {
        self.columns.insert(col, hist);
    }

    pub fn set_index_histogram(&mut self, index_id: impl Into<String>, hist: Histogram) {
        self.indexes.insert(index_id.into(), hist);
    }

    pub fn column_histogram(&self, col: ColumnId) -> Option<&Histogram> {
        self.columns.get(&col)
    }

    pub fn index_histogram(&self, index_id: &str) -> Option<&Histogram> {
        self.indexes.get(index_id)
    }

    /// Estimated row count for an integer column (typically the primary
    /// key / row handle) restricted to `ranges`.
    pub fn row_count_by_int_column_ranges(&self, col: ColumnId, ranges: &[Range]) -> u64 {
        match self.columns.get(&col) {
            Some(hist) => sum_ranges(hist, ranges),
            // No histogram available: fall back to the whole-table count.
            None => self.row_count,
        }
    }

    /// Estimated row count for an index scan restricted to `ranges`.
    /// `eq_prefix_len` (the count of leading equality-matched columns) is
    /// accepted for interface fidelity; with a single composite-key
    /// histogram per index the equality prefix is already reflected in
    /// the range bounds themselves, so it does not change the estimate
    /// beyond that - a known simplification, noted in DESIGN.md.
    pub fn row_count_by_index_ranges(
        &self,
        index_id: &str,
        ranges: &[Range],
        _eq_prefix_len: usize,
    ) -> u64 {
        match self.indexes.get(index_id) {
            Some(hist) => sum_ranges(hist, ranges),
            None => self.row_count,
        }
    }
}

fn sum_ranges(hist: &Histogram, ranges: &[Range]) -> u64 {
    if ranges.is_empty() {
        return hist.total_count();
    }
    ranges.iter().map(|r| estimate_range(hist, r)).sum()
}

/// Estimates the row count in `[low, high]` using cumulative bucket
/// counts, linearly interpolating when a bound falls strictly inside a
/// bucket rather than exactly on a boundary.
fn estimate_range(hist: &Histogram, range: &Range) -> u64 {
    if hist.buckets.is_empty() {
        return 0;
    }
    let total = hist.total_count();
    let upper = match &range.high {
        Bound::Unbounded => total,
        Bound::Included(v) => row_count_le(hist, v),
        Bound::Excluded(v) => row_count_le(hist, v).saturating_sub(exact_count(hist, v)),
    };
    let lower = match &range.low {
        Bound::Unbounded => 0,
        Bound::Included(v) => row_count_le(hist, v).saturating_sub(exact_count(hist, v)),
        Bound::Excluded(v) => row_count_le(hist, v),
    };
    upper.saturating_sub(lower)
}

/// Rows with value `<= v`, via cumulative bucket counts.
fn row_count_le(hist: &Histogram, v: &Value) -> u64 {
    match hist.buckets.binary_search_by(|b| b.value.cmp(v)) {
        Ok(idx) => hist.buckets[idx].count,
        Err(idx) => {
            if idx == 0 {
                0
            } else if idx >= hist.buckets.len() {
                hist.total_count()
            } else {
                let lo = hist.buckets[idx - 1].count;
                let hi = hist.buckets[idx].count;
                lo + (hi - lo) / 2
            }
        }
    }
}

/// Rows exactly equal to `v`, from the boundary bucket's `repeats` when
/// `v` happens to be a bucket boundary, zero otherwise (a value that
/// isn't a recorded boundary is assumed to occur once at most, which the
/// interpolation in `row_count_le` already accounts for).
fn exact_count(hist: &Histogram, v: &Value) -> u64 {
    match hist.buckets.binary_search_by(|b| b.value.cmp(v)) {
        Ok(idx) => hist.buckets[idx].repeats,
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::histogram::build_index;
    use alloc::vec;

    fn sample_table() -> (StatisticsTable, ColumnId) {
        let col = ColumnId::new(1, 0);
        let rows: Vec<crate::error::Result<Vec<Value>>> =
            (1..=100i64).map(|v| Ok(vec![Value::Int64(v)])).collect();
        let (total, hist) = build_index(rows, 16, false, 1).unwrap();
        let mut table = StatisticsTable::new(total);
        table.set_column_histogram(col, hist);
        (table, col)
    }

    #[test]
    fn test_row_count_full_range() {
        let (table, col) = sample_table();
        let count = table.row_count_by_int_column_ranges(col, &[Range::full()]);
        assert_eq!(count, 100);
    }

    #[test]
    fn test_row_count_point_range() {
        let (table, col) = sample_table();
        let count = table.row_count_by_int_column_ranges(col, &[Range::point(Value::Int64(50))]);
        assert!(count >= 1);
        assert!(count <= 10);
    }

    #[test]
    fn test_row_count_bounded_range_is_monotone() {
        let (table, col) = sample_table();
        let narrow = table.row_count_by_int_column_ranges(
            col,
            &[Range {
                low: Bound::Included(Value::Int64(40)),
                high: Bound::Included(Value::Int64(60)),
            }],
        );
        let wide = table.row_count_by_int_column_ranges(
            col,
            &[Range {
                low: Bound::Included(Value::Int64(10)),
                high: Bound::Included(Value::Int64(90)),
            }],
        );
        assert!(narrow <= wide);
    }

    #[test]
    fn test_row_count_missing_histogram_falls_back_to_table_count() {
        let table = StatisticsTable::new(42);
        let missing = ColumnId::new(9, 9);
        let count = table.row_count_by_int_column_ranges(missing, &[Range::full()]);
        assert_eq!(count, 42);
    }
}
