//! AND predicate pass - breaks down AND predicates into chained Filter nodes.
//!
//! This pass transforms a single Filter node with a complex AND predicate
//! into multiple chained Filter nodes, each with a simple predicate.
//!
//! Example:
//! ```text
//! Filter(a AND b AND c)    =>    Filter(a)
//!        |                          |
//!      Scan                      Filter(b)
//!                                   |
//!                                Filter(c)
//!                                   |
//!                                 Scan
//! ```
//!
//! This transformation enables other optimization passes (like index selection)
//! to work on individual predicates more effectively.

use crate::ast::{BinaryOp, Expr};
use crate::optimizer::OptimizerPass;
use crate::planner::BoundPlan as LogicalPlan;
use alloc::boxed::Box;
use alloc::vec::Vec;

/// Pass that breaks down AND predicates into chained Filter nodes.
pub struct AndPredicatePass;

impl OptimizerPass for AndPredicatePass {
    fn optimize(&self, plan: LogicalPlan) -> LogicalPlan {
        self.traverse(plan)
    }

    fn name(&self) -> &'static str {
        "and_predicate"
    }
}

impl AndPredicatePass {
    /// Recursively traverses the plan tree and transforms AND predicates.
    fn traverse(&self, plan: LogicalPlan) -> LogicalPlan {
        match plan {
            LogicalPlan::Filter { input, predicate } => {
                // First, recursively optimize the input
                let optimized_input = self.traverse(*input);

                // Break down the AND predicate into components
                let predicates = self.break_and_predicate(predicate);

                // Create a chain of Filter nodes
                self.create_filter_chain(optimized_input, predicates)
            }

            LogicalPlan::Project { input, columns } => LogicalPlan::Project {
                input: Box::new(self.traverse(*input)),
                columns,
            },

            LogicalPlan::Join {
                left,
                right,
                condition,
                join_type,
            } => LogicalPlan::Join {
                left: Box::new(self.traverse(*left)),
                right: Box::new(self.traverse(*right)),
                condition,
                join_type,
            },

            LogicalPlan::Aggregate {
                input,
                group_by,
                aggregates,
            } => LogicalPlan::Aggregate {
                input: Box::new(self.traverse(*input)),
                group_by,
                aggregates,
            },

            LogicalPlan::Sort { input, order_by } => LogicalPlan::Sort {
                input: Box::new(self.traverse(*input)),
                order_by,
            },

            LogicalPlan::Limit {
                input,
                limit,
                offset,
            } => LogicalPlan::Limit {
                input: Box::new(self.traverse(*input)),
                limit,
                offset,
            },

            LogicalPlan::CrossProduct { left, right } => LogicalPlan::CrossProduct {
                left: Box::new(self.traverse(*left)),
                right: Box::new(self.traverse(*right)),
            },

            // Leaf nodes - no transformation needed
            plan @ (LogicalPlan::Scan { .. } | LogicalPlan::Empty) => plan,
        }
    }

    /// Recursively breaks down an AND predicate into its components.
    /// OR predicates and other predicate types are left unchanged.
    ///
    /// Example: (a AND (b AND c)) AND (d OR e) becomes [a, b, c, (d OR e)]
    fn break_and_predicate(&self, predicate: Expr) -> Vec<Expr> {
        match predicate {
            Expr::BinaryOp {
                left,
                op: BinaryOp::And,
                right,
            } => {
                let mut result = self.break_and_predicate(*left);
                result.extend(self.break_and_predicate(*right));
                result
            }
            // Non-AND predicates are returned as-is
            other => alloc::vec![other],
        }
    }

    /// Creates a chain of Filter nodes from a list of predicates.
    /// The first predicate becomes the outermost Filter.
    fn create_filter_chain(&self, input: LogicalPlan, predicates: Vec<Expr>) -> LogicalPlan {
        if predicates.is_empty() {
            return input;
        }

        // Build the chain from bottom to top
        let mut result = input;
        for predicate in predicates.into_iter().rev() {
            result = LogicalPlan::Filter {
                input: Box::new(result),
                predicate,
            };
        }
        result
    }
}
