//! `BoundPlan`: the tree shape the logical-rewrite passes in
//! `crate::optimizer` consume and produce. Predicate pushdown, join
//! reordering, and the other passes in that module run before physical
//! planning even starts - producing this tree is out of scope for the
//! planner itself, which only lowers it (via [`crate::planner::lower`])
//! into a [`crate::planner::arena::LogicalArena`] and takes it from
//! there.
//!
//! A bound query once arrived with index access paths (`IndexScan`,
//! `IndexGet`, `IndexInGet`, the GIN variants) already chosen by a
//! `Filter(Scan)`-rewriting pass. Access path selection is now the
//! planner's own job (§4.6) - by the time a tree reaches physical
//! planning it should describe *what* to read, not *how*, so those
//! variants (and the `Union` relation operator, which this planner has
//! no physical counterpart for) have no place here.

use crate::ast::{AggregateFunc, Expr, JoinType, SortOrder};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

/// A bound logical query tree, pre-physical-planning.
#[derive(Clone, Debug)]
pub enum BoundPlan {
    /// Table scan.
    Scan { table: String },

    /// Filter (WHERE clause).
    Filter {
        input: Box<BoundPlan>,
        predicate: Expr,
    },

    /// Projection (SELECT columns).
    Project {
        input: Box<BoundPlan>,
        columns: Vec<Expr>,
    },

    /// Join two relations.
    Join {
        left: Box<BoundPlan>,
        right: Box<BoundPlan>,
        condition: Expr,
        join_type: JoinType,
    },

    /// Aggregation (GROUP BY).
    Aggregate {
        input: Box<BoundPlan>,
        group_by: Vec<Expr>,
        aggregates: Vec<(AggregateFunc, Expr)>,
    },

    /// Sort (ORDER BY).
    Sort {
        input: Box<BoundPlan>,
        order_by: Vec<(Expr, SortOrder)>,
    },

    /// Limit and offset.
    Limit {
        input: Box<BoundPlan>,
        limit: usize,
        offset: usize,
    },

    /// Cross product (cartesian join).
    CrossProduct {
        left: Box<BoundPlan>,
        right: Box<BoundPlan>,
    },

    /// Empty relation.
    Empty,
}

impl BoundPlan {
    pub fn scan(table: impl Into<String>) -> Self {
        BoundPlan::Scan { table: table.into() }
    }

    pub fn filter(input: BoundPlan, predicate: Expr) -> Self {
        BoundPlan::Filter {
            input: Box::new(input),
            predicate,
        }
    }

    pub fn project(input: BoundPlan, columns: Vec<Expr>) -> Self {
        BoundPlan::Project {
            input: Box::new(input),
            columns,
        }
    }

    pub fn join(left: BoundPlan, right: BoundPlan, condition: Expr, join_type: JoinType) -> Self {
        BoundPlan::Join {
            left: Box::new(left),
            right: Box::new(right),
            condition,
            join_type,
        }
    }

    pub fn inner_join(left: BoundPlan, right: BoundPlan, condition: Expr) -> Self {
        Self::join(left, right, condition, JoinType::Inner)
    }

    pub fn left_join(left: BoundPlan, right: BoundPlan, condition: Expr) -> Self {
        Self::join(left, right, condition, JoinType::LeftOuter)
    }

    pub fn aggregate(input: BoundPlan, group_by: Vec<Expr>, aggregates: Vec<(AggregateFunc, Expr)>) -> Self {
        BoundPlan::Aggregate {
            input: Box::new(input),
            group_by,
            aggregates,
        }
    }

    pub fn sort(input: BoundPlan, order_by: Vec<(Expr, SortOrder)>) -> Self {
        BoundPlan::Sort {
            input: Box::new(input),
            order_by,
        }
    }

    pub fn limit(input: BoundPlan, limit: usize, offset: usize) -> Self {
        BoundPlan::Limit {
            input: Box::new(input),
            limit,
            offset,
        }
    }

    pub fn cross_product(left: BoundPlan, right: BoundPlan) -> Self {
        BoundPlan::CrossProduct {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn inputs(&self) -> Vec<&BoundPlan> {
        match self {
            BoundPlan::Scan { .. } | BoundPlan::Empty => alloc::vec![],
            BoundPlan::Filter { input, .. }
            | BoundPlan::Project { input, .. }
            | BoundPlan::Aggregate { input, .. }
            | BoundPlan::Sort { input, .. }
            | BoundPlan::Limit { input, .. } => alloc::vec![input.as_ref()],
            BoundPlan::Join { left, right, .. } | BoundPlan::CrossProduct { left, right } => {
                alloc::vec![left.as_ref(), right.as_ref()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;

    #[test]
    fn test_bound_plan_builders() {
        let scan = BoundPlan::scan("users");
        assert!(matches!(scan, BoundPlan::Scan { table } if table == "users"));

        let filter = BoundPlan::filter(
            BoundPlan::scan("users"),
            Expr::eq(Expr::column("users", "id", 0), Expr::literal(1i64)),
        );
        assert!(matches!(filter, BoundPlan::Filter { .. }));
    }

    #[test]
    fn test_bound_plan_inputs() {
        let join = BoundPlan::inner_join(
            BoundPlan::scan("a"),
            BoundPlan::scan("b"),
            Expr::eq(Expr::column("a", "id", 0), Expr::column("b", "a_id", 0)),
        );
        assert_eq!(join.inputs().len(), 2);
    }
}
