//! Conjunct splitting and coprocessor-pushability checks for `Selection`.
//!
//! Grounded on `optimizer::predicate_pushdown`'s tree-shaped push/merge
//! logic and `optimizer::index_selection`'s `extract_predicates_recursive`
//! AND-flattening - both walk the same `Expr::BinaryOp { op: And, .. }`
//! shape this module flattens, just for a different purpose (placement
//! relative to a `Join`/`Scan` there, CopTask-vs-RootTask attachment
//! here).

use crate::ast::{BinaryOp, Expr};
use alloc::vec::Vec;

/// Flattens a top-level chain of ANDs into its conjuncts. A predicate with
/// no top-level AND returns as a single-element vector.
pub fn split_conjuncts(expr: Expr) -> Vec<Expr> {
    let mut out = Vec::new();
    split_conjuncts_into(expr, &mut out);
    out
}

fn split_conjuncts_into(expr: Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOp::And,
            right,
        } => {
            split_conjuncts_into(*left, out);
            split_conjuncts_into(*right, out);
        }
        other => out.push(other),
    }
}

/// Rebuilds a single predicate from a list of conjuncts, `AND`-ing them
/// left to right. Returns `None` for an empty list - the caller should
/// treat that as "no predicate", not as a vacuous truth it must encode.
pub fn conjunction(mut conjuncts: Vec<Expr>) -> Option<Expr> {
    let mut result = conjuncts.pop()?;
    while let Some(next) = conjuncts.pop() {
        result = Expr::and(next, result);
    }
    Some(result)
}

/// True iff a coprocessor-style scan can evaluate `expr` against a row
/// directly, so `Selection` may attach it to a `CopTask` instead of
/// stranding it in the `RootTask`. JSONB path queries and regex matches
/// need the richer evaluator the root task runs with.
pub fn is_coprocessor_pushable(expr: &Expr) -> bool {
    match expr {
        Expr::Column(_) | Expr::Literal(_) => true,
        Expr::BinaryOp { left, right, .. } => {
            is_coprocessor_pushable(left) && is_coprocessor_pushable(right)
        }
        Expr::UnaryOp { expr, .. } => is_coprocessor_pushable(expr),
        Expr::Between { expr, low, high } | Expr::NotBetween { expr, low, high } => {
            is_coprocessor_pushable(expr) && is_coprocessor_pushable(low) && is_coprocessor_pushable(high)
        }
        Expr::In { expr, list } | Expr::NotIn { expr, list } => {
            is_coprocessor_pushable(expr) && list.iter().all(is_coprocessor_pushable)
        }
        Expr::Like { expr, .. } | Expr::NotLike { expr, .. } => is_coprocessor_pushable(expr),
        Expr::Function { .. }
        | Expr::Aggregate { .. }
        | Expr::Match { .. }
        | Expr::NotMatch { .. } => false,
    }
}

/// Splits `predicate`'s conjuncts into what a `CopTask` can evaluate and
/// what must stay above it in the `RootTask`. Either half may come back
/// empty; the caller decides what an empty half means for the task shape.
pub fn split_pushdown(predicate: Expr) -> (Option<Expr>, Option<Expr>) {
    let conjuncts = split_conjuncts(predicate);
    let mut pushable = Vec::new();
    let mut retained = Vec::new();
    for conjunct in conjuncts {
        if is_coprocessor_pushable(&conjunct) {
            pushable.push(conjunct);
        } else {
            retained.push(conjunct);
        }
    }
    (conjunction(pushable), conjunction(retained))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;

    fn col(name: &str) -> Expr {
        Expr::column("t", name, 0)
    }

    #[test]
    fn test_split_conjuncts_flattens_and_chain() {
        let pred = Expr::and(
            Expr::eq(col("a"), Expr::literal(1i64)),
            Expr::and(
                Expr::gt(col("b"), Expr::literal(2i64)),
                Expr::lt(col("c"), Expr::literal(3i64)),
            ),
        );
        let conjuncts = split_conjuncts(pred);
        assert_eq!(conjuncts.len(), 3);
    }

    #[test]
    fn test_split_conjuncts_single_predicate() {
        let pred = Expr::eq(col("a"), Expr::literal(1i64));
        assert_eq!(split_conjuncts(pred).len(), 1);
    }

    #[test]
    fn test_conjunction_roundtrip() {
        let conjuncts = alloc::vec![
            Expr::eq(col("a"), Expr::literal(1i64)),
            Expr::gt(col("b"), Expr::literal(2i64)),
        ];
        let rebuilt = conjunction(conjuncts).unwrap();
        assert_eq!(split_conjuncts(rebuilt).len(), 2);
    }

    #[test]
    fn test_conjunction_empty_is_none() {
        assert!(conjunction(Vec::new()).is_none());
    }

    #[test]
    fn test_jsonb_predicate_not_pushable() {
        let pred = Expr::jsonb_path_eq(col("doc"), "$.a", 1i64.into());
        assert!(!is_coprocessor_pushable(&pred));
    }

    #[test]
    fn test_simple_comparison_pushable() {
        let pred = Expr::eq(col("a"), Expr::literal(1i64));
        assert!(is_coprocessor_pushable(&pred));
    }

    #[test]
    fn test_split_pushdown_separates_jsonb_from_plain() {
        let pred = Expr::and(
            Expr::eq(col("a"), Expr::literal(1i64)),
            Expr::jsonb_path_eq(col("doc"), "$.a", 1i64.into()),
        );
        let (pushable, retained) = split_pushdown(pred);
        assert!(pushable.is_some());
        assert!(retained.is_some());
    }
}
