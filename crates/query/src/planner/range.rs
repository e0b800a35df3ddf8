//! Detaches access-path predicates from a `DataSource`'s condition list
//! into scan `Range`s, leaving the rest as a residual filter condition.
//!
//! Grounded on `optimizer::index_selection`'s `MergedRange` (bound
//! narrowing: a later `>=` tightens an earlier one, equal bounds prefer
//! the exclusive side) and `analyze_predicate`/`compute_range` (mapping a
//! `BinaryOp` to a one-sided bound) - reworked to emit
//! [`crate::statistics::Range`] instead of optimizer-pass-local tuples,
//! and to separate "consumed into a range" from "left behind as a
//! filter" rather than rewriting the plan tree in place.

use crate::ast::{BinaryOp, Expr};
use crate::planner::logical::IndexMeta;
use crate::planner::property::{ColumnId, SchemaColumn};
use crate::statistics::histogram::encode_composite_key;
use crate::statistics::{Bound, Range};
use alloc::vec::Vec;
use cynos_core::Value;
use core::cmp::Ordering;

/// Looks up the stable id of a column reference against a schema, by
/// position first (authoritative) and by name as a fallback for
/// hand-built test fixtures that don't bother lining positions up.
pub fn resolve_column_id(schema: &[SchemaColumn], col: &crate::ast::ColumnRef) -> Option<ColumnId> {
    schema
        .get(col.index)
        .filter(|c| c.column == col.column)
        .or_else(|| schema.iter().find(|c| c.column == col.column))
        .map(|c| c.id)
}

/// Narrowing accumulator for a single column's constraints across a
/// conjunct list, mirroring `MergedRange`'s bound-tightening rules.
#[derive(Default)]
struct ColumnConstraint {
    eq_or_in: Option<Vec<Value>>,
    low: Option<(Value, bool)>,
    high: Option<(Value, bool)>,
}

impl ColumnConstraint {
    fn add_eq(&mut self, value: Value) {
        match &mut self.eq_or_in {
            Some(values) if !values.contains(&value) => values.push(value),
            Some(_) => {}
            None => self.eq_or_in = Some(alloc::vec![value]),
        }
    }

    fn add_in(&mut self, values: Vec<Value>) {
        for v in values {
            self.add_eq(v);
        }
    }

    fn narrow_low(&mut self, value: Value, inclusive: bool) {
        match &self.low {
            None => self.low = Some((value, inclusive)),
            Some((existing, existing_inclusive)) => match value.cmp(existing) {
                Ordering::Greater => self.low = Some((value, inclusive)),
                Ordering::Equal if *existing_inclusive && !inclusive => {
                    self.low = Some((value, inclusive))
                }
                _ => {}
            },
        }
    }

    fn narrow_high(&mut self, value: Value, inclusive: bool) {
        match &self.high {
            None => self.high = Some((value, inclusive)),
            Some((existing, existing_inclusive)) => match value.cmp(existing) {
                Ordering::Less => self.high = Some((value, inclusive)),
                Ordering::Equal if *existing_inclusive && !inclusive => {
                    self.high = Some((value, inclusive))
                }
                _ => {}
            },
        }
    }

    fn is_empty(&self) -> bool {
        self.eq_or_in.is_none() && self.low.is_none() && self.high.is_none()
    }

    /// Point ranges if this column was pinned by `=`/`IN`, else the one
    /// range its low/high bounds describe (full range if neither set).
    fn into_ranges(self) -> Vec<Range> {
        if let Some(values) = self.eq_or_in {
            return values.into_iter().map(Range::point).collect();
        }
        let low = match self.low {
            Some((v, true)) => Bound::Included(v),
            Some((v, false)) => Bound::Excluded(v),
            None => Bound::Unbounded,
        };
        let high = match self.high {
            Some((v, true)) => Bound::Included(v),
            Some((v, false)) => Bound::Excluded(v),
            None => Bound::Unbounded,
        };
        alloc::vec![Range { low, high }]
    }
}

/// A single `col OP literal` (or reversed) comparison against `target`.
fn match_comparison(expr: &Expr, schema: &[SchemaColumn], target: ColumnId) -> Option<(BinaryOp, Value)> {
    if let Expr::BinaryOp { left, op, right } = expr {
        if let (Expr::Column(col), Expr::Literal(val)) = (left.as_ref(), right.as_ref()) {
            if resolve_column_id(schema, col) == Some(target) {
                return Some((*op, val.clone()));
            }
        }
        if let (Expr::Literal(val), Expr::Column(col)) = (left.as_ref(), right.as_ref()) {
            if resolve_column_id(schema, col) == Some(target) {
                let reversed = match op {
                    BinaryOp::Lt => BinaryOp::Gt,
                    BinaryOp::Le => BinaryOp::Ge,
                    BinaryOp::Gt => BinaryOp::Lt,
                    BinaryOp::Ge => BinaryOp::Le,
                    other => *other,
                };
                return Some((reversed, val.clone()));
            }
        }
    }
    None
}

fn match_in_list(expr: &Expr, schema: &[SchemaColumn], target: ColumnId) -> Option<Vec<Value>> {
    if let Expr::In { expr, list } = expr {
        if let Expr::Column(col) = expr.as_ref() {
            if resolve_column_id(schema, col) == Some(target) {
                return list
                    .iter()
                    .map(|e| match e {
                        Expr::Literal(v) => Some(v.clone()),
                        _ => None,
                    })
                    .collect();
            }
        }
    }
    None
}

/// Folds one conjunct into `constraint` if it constrains `target`,
/// returning whether it was consumed.
fn fold_conjunct(conjunct: &Expr, schema: &[SchemaColumn], target: ColumnId, constraint: &mut ColumnConstraint) -> bool {
    if let Some(values) = match_in_list(conjunct, schema, target) {
        constraint.add_in(values);
        return true;
    }
    if let Some((op, value)) = match_comparison(conjunct, schema, target) {
        match op {
            BinaryOp::Eq => constraint.add_eq(value),
            BinaryOp::Lt => constraint.narrow_high(value, false),
            BinaryOp::Le => constraint.narrow_high(value, true),
            BinaryOp::Gt => constraint.narrow_low(value, false),
            BinaryOp::Ge => constraint.narrow_low(value, true),
            _ => return false,
        }
        return true;
    }
    false
}

/// Splits `conditions` into the ranges a `PhysicalTableScan` over the
/// primary key can apply, and the conjuncts that must stay as a filter.
/// Conjuncts not mentioning `pk_column` are always left in the residual.
pub fn detach_table_scan_conditions(
    conditions: &[Expr],
    schema: &[SchemaColumn],
    pk_column: ColumnId,
) -> (Vec<Range>, Vec<Expr>) {
    let mut constraint = ColumnConstraint::default();
    let mut residual = Vec::new();
    for conjunct in conditions {
        if !fold_conjunct(conjunct, schema, pk_column, &mut constraint) {
            residual.push(conjunct.clone());
        }
    }
    let ranges = if constraint.is_empty() {
        alloc::vec![Range::full()]
    } else {
        constraint.into_ranges()
    };
    (ranges, residual)
}

/// Splits `conditions` into the ranges a `PhysicalIndexScan` over
/// `index` can apply, how many leading columns were matched by a plain
/// `=` (`access_equal_count`) versus `=`/`IN` (`access_in_and_eq_count`),
/// and the residual filter. Access stops at the first key column with
/// neither an equality/IN match nor a range bound.
pub fn detach_index_scan_conditions(
    conditions: &[Expr],
    schema: &[SchemaColumn],
    index: &IndexMeta,
) -> (Vec<Range>, usize, usize, Vec<Expr>) {
    let mut residual: Vec<Expr> = conditions.to_vec();
    let mut prefixes: Vec<Vec<Value>> = Vec::new();
    let mut access_equal_count = 0usize;
    let mut access_in_and_eq_count = 0usize;
    let mut trailing_range: Option<ColumnConstraint> = None;

    for key_col in &index.key_columns {
        let mut constraint = ColumnConstraint::default();
        let mut consumed_idx = Vec::new();
        for (i, conjunct) in residual.iter().enumerate() {
            if fold_conjunct(conjunct, schema, *key_col, &mut constraint) {
                consumed_idx.push(i);
            }
        }

        match &constraint.eq_or_in {
            Some(values) if constraint.low.is_none() && constraint.high.is_none() => {
                for &i in consumed_idx.iter().rev() {
                    residual.remove(i);
                }
                if values.len() == 1 {
                    access_equal_count += 1;
                }
                access_in_and_eq_count += 1;
                prefixes.push(values.clone());
                if values.len() > 1 {
                    // An IN list stops the access path here - no further
                    // leading columns can be combined past a fan-out.
                    break;
                }
            }
            _ if !constraint.is_empty() => {
                for &i in consumed_idx.iter().rev() {
                    residual.remove(i);
                }
                trailing_range = Some(constraint);
                break;
            }
            _ => break,
        }
    }

    let ranges = build_index_ranges(&prefixes, trailing_range);
    (ranges, access_equal_count, access_in_and_eq_count, residual)
}

/// Cross-products the fixed equality/IN prefixes with the trailing range
/// (if any), encoding each combination as a single composite-key `Value`
/// per bound the way [`crate::statistics::histogram`] does for index
/// histograms.
fn build_index_ranges(prefixes: &[Vec<Value>], trailing_range: Option<ColumnConstraint>) -> Vec<Range> {
    if prefixes.is_empty() && trailing_range.is_none() {
        return alloc::vec![Range::full()];
    }

    let mut combinations: Vec<Vec<Value>> = alloc::vec![Vec::new()];
    for values in prefixes {
        let mut next = Vec::new();
        for combo in &combinations {
            for v in values {
                let mut extended = combo.clone();
                extended.push(v.clone());
                next.push(extended);
            }
        }
        combinations = next;
    }

    let mut ranges = Vec::new();
    for combo in combinations {
        match &trailing_range {
            None => {
                let key = encode_composite_key(&combo);
                ranges.push(Range::point(key));
            }
            Some(tail) => {
                let low = match &tail.low {
                    Some((v, inclusive)) => {
                        let mut row = combo.clone();
                        row.push(v.clone());
                        let key = encode_composite_key(&row);
                        if *inclusive {
                            Bound::Included(key)
                        } else {
                            Bound::Excluded(key)
                        }
                    }
                    None if combo.is_empty() => Bound::Unbounded,
                    None => Bound::Included(encode_composite_key(&combo)),
                };
                let high = match &tail.high {
                    Some((v, inclusive)) => {
                        let mut row = combo.clone();
                        row.push(v.clone());
                        let key = encode_composite_key(&row);
                        if *inclusive {
                            Bound::Included(key)
                        } else {
                            Bound::Excluded(key)
                        }
                    }
                    None if combo.is_empty() => Bound::Unbounded,
                    None => Bound::Included(encode_composite_key(&combo)),
                };
                ranges.push(Range { low, high });
            }
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;

    fn schema() -> Vec<SchemaColumn> {
        alloc::vec![
            SchemaColumn::new(ColumnId::new(1, 0), "t", "id"),
            SchemaColumn::new(ColumnId::new(1, 1), "t", "a"),
            SchemaColumn::new(ColumnId::new(1, 2), "t", "b"),
        ]
    }

    #[test]
    fn test_detach_table_scan_point_lookup() {
        let s = schema();
        let pk = ColumnId::new(1, 0);
        let conditions = alloc::vec![Expr::eq(Expr::column("t", "id", 0), Expr::literal(7i64))];
        let (ranges, residual) = detach_table_scan_conditions(&conditions, &s, pk);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].low, Bound::Included(Value::Int64(7)));
        assert!(residual.is_empty());
    }

    #[test]
    fn test_detach_table_scan_range_narrows() {
        let s = schema();
        let pk = ColumnId::new(1, 0);
        let conditions = alloc::vec![
            Expr::ge(Expr::column("t", "id", 0), Expr::literal(1i64)),
            Expr::gt(Expr::column("t", "id", 0), Expr::literal(5i64)),
            Expr::lt(Expr::column("t", "id", 0), Expr::literal(100i64)),
        ];
        let (ranges, residual) = detach_table_scan_conditions(&conditions, &s, pk);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].low, Bound::Excluded(Value::Int64(5)));
        assert_eq!(ranges[0].high, Bound::Excluded(Value::Int64(100)));
        assert!(residual.is_empty());
    }

    #[test]
    fn test_detach_table_scan_leaves_unrelated_filter() {
        let s = schema();
        let pk = ColumnId::new(1, 0);
        let conditions = alloc::vec![Expr::eq(Expr::column("t", "a", 1), Expr::literal(9i64))];
        let (ranges, residual) = detach_table_scan_conditions(&conditions, &s, pk);
        assert_eq!(ranges, alloc::vec![Range::full()]);
        assert_eq!(residual.len(), 1);
    }

    #[test]
    fn test_detach_index_scan_equal_prefix_and_trailing_range() {
        let s = schema();
        let index = IndexMeta::new(
            "idx_a_b",
            alloc::vec![ColumnId::new(1, 1), ColumnId::new(1, 2)],
            false,
        );
        let conditions = alloc::vec![
            Expr::eq(Expr::column("t", "a", 1), Expr::literal(3i64)),
            Expr::gt(Expr::column("t", "b", 2), Expr::literal(10i64)),
        ];
        let (ranges, eq_count, in_eq_count, residual) =
            detach_index_scan_conditions(&conditions, &s, &index);
        assert_eq!(eq_count, 1);
        assert_eq!(in_eq_count, 1);
        assert_eq!(ranges.len(), 1);
        assert!(residual.is_empty());
    }

    #[test]
    fn test_detach_index_scan_in_list_fans_out() {
        let s = schema();
        let index = IndexMeta::new("idx_a", alloc::vec![ColumnId::new(1, 1)], false);
        let conditions = alloc::vec![Expr::in_list(
            Expr::column("t", "a", 1),
            alloc::vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)],
        )];
        let (ranges, eq_count, in_eq_count, residual) =
            detach_index_scan_conditions(&conditions, &s, &index);
        assert_eq!(eq_count, 0);
        assert_eq!(in_eq_count, 1);
        assert_eq!(ranges.len(), 3);
        assert!(residual.is_empty());
    }

    #[test]
    fn test_detach_index_scan_no_match_stops_immediately() {
        let s = schema();
        let index = IndexMeta::new("idx_a", alloc::vec![ColumnId::new(1, 1)], false);
        let conditions = alloc::vec![Expr::eq(Expr::column("t", "id", 0), Expr::literal(1i64))];
        let (ranges, eq_count, in_eq_count, residual) =
            detach_index_scan_conditions(&conditions, &s, &index);
        assert_eq!(eq_count, 0);
        assert_eq!(in_eq_count, 0);
        assert_eq!(ranges, alloc::vec![Range::full()]);
        assert_eq!(residual.len(), 1);
    }
}
