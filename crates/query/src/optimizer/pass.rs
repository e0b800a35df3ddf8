//! Optimizer pass trait.

use crate::planner::BoundPlan;

/// An optimization pass that transforms a bound query tree, ahead of
/// physical planning.
pub trait OptimizerPass {
    /// Optimizes the given plan.
    fn optimize(&self, plan: BoundPlan) -> BoundPlan;

    /// Returns the name of this pass.
    fn name(&self) -> &'static str {
        "unnamed"
    }
}
