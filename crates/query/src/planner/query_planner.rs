//! Unified entry point tying the bound-plan rewrite passes, lowering,
//! and the cost-based physical planner together.
//!
//! ## Pipeline
//!
//! 1. **Logical rewrite** (`crate::optimizer::Optimizer`) - context-free
//!    transformations over a [`BoundPlan`]: AND-splitting, cross-product
//!    flattening, implicit-join detection, outer-join simplification,
//!    predicate pushdown, join reordering.
//! 2. **Lowering** (`crate::planner::lower`) - turns the rewritten
//!    `BoundPlan` into a [`crate::planner::arena::LogicalArena`],
//!    resolving table schemas, primary keys, and indexes from the
//!    [`ExecutionContext`].
//! 3. **Physical planning** (`crate::planner::plan::plan_node`) - the
//!    memoized cost-based search over access paths, join placement, and
//!    ordering enforcement (§4.1-§4.6).
//!
//! ```ignore
//! let planner = QueryPlanner::new(ctx);
//! let physical = planner.plan(bound_plan)?;
//! ```

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::optimizer::Optimizer;
use crate::planner::bound::BoundPlan;
use crate::planner::lower::lower;
use crate::planner::memo::Memo;
use crate::planner::physical::PhysicalPlan;
use crate::planner::plan::plan_node;
use crate::planner::property::RequiredProp;

/// Ties the logical-rewrite optimizer, lowering, and the physical
/// planner together behind a single [`ExecutionContext`].
pub struct QueryPlanner {
    ctx: ExecutionContext,
    optimizer: Optimizer,
}

impl QueryPlanner {
    /// Creates a new planner with the default logical-rewrite passes.
    pub fn new(ctx: ExecutionContext) -> Self {
        Self {
            ctx,
            optimizer: Optimizer::new(),
        }
    }

    /// Creates a planner with a custom logical-rewrite optimizer.
    pub fn with_optimizer(ctx: ExecutionContext, optimizer: Optimizer) -> Self {
        Self { ctx, optimizer }
    }

    /// Returns a reference to the execution context.
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// Runs the logical-rewrite passes only, without lowering or
    /// physical planning. Useful for inspecting the rewritten tree.
    pub fn optimize(&self, plan: BoundPlan) -> BoundPlan {
        self.optimizer.optimize(plan)
    }

    /// Runs the full pipeline: logical rewrite, lowering, then the
    /// cost-based physical planner under no required ordering.
    pub fn plan(&self, plan: BoundPlan) -> Result<PhysicalPlan> {
        let optimized = self.optimizer.optimize(plan);
        let (arena, root) = lower(optimized, &self.ctx)?;
        let mut memo = Memo::new(arena.len());
        let task = plan_node(&arena, root, &RequiredProp::empty(), &self.ctx, &mut memo)?;
        Ok(task.finish().plan)
    }
}
