//! Task profiles: what a partial physical plan looks like while the
//! planner is still deciding whether it will run as a coprocessor-style
//! pushdown or has already been pulled up to the root.
//!
//! A `CopTask` can still have operators attached cheaply (the storage
//! layer evaluates them per row before shipping anything over the
//! wire); a `RootTask` cannot un-become a `CopTask` once it has paid the
//! [`crate::planner::cost::NET_FACTOR`] cost of finishing. `finish()` is
//! therefore one-way, matching §4.1/§4.5's requirement that plans be
//! compared only after both sides have reached the same shape.

use crate::planner::cost::{CPU_FACTOR, NET_FACTOR};
use crate::planner::physical::PhysicalPlan;
use crate::ast::{AggregateFunc, Expr};
use alloc::boxed::Box;
use alloc::vec::Vec;

/// A plan still eligible for coprocessor-side attachment.
///
/// `index_plan` is set whenever the access path started from an index;
/// `table_plan` is set once a double read pulls rows back from the base
/// table (or immediately, for a plain table scan). Both may be set at
/// once - that is precisely what [`CopTask::is_double_read`] reports.
#[derive(Clone, Debug)]
pub struct CopTask {
    pub index_plan: Option<PhysicalPlan>,
    pub table_plan: Option<PhysicalPlan>,
    pub cnt: f64,
    pub cst: f64,
    /// Set once a later operator has attached onto `table_plan` - after
    /// that, `index_plan` may no longer be extended; the index lookup
    /// is locked in as the means of producing handles for the double
    /// read and nothing else.
    pub index_plan_finished: bool,
}

impl CopTask {
    pub fn from_table_plan(plan: PhysicalPlan, cnt: f64, cst: f64) -> Self {
        Self {
            index_plan: None,
            table_plan: Some(plan),
            cnt,
            cst,
            index_plan_finished: false,
        }
    }

    pub fn from_index_plan(plan: PhysicalPlan, cnt: f64, cst: f64) -> Self {
        Self {
            index_plan: Some(plan),
            table_plan: None,
            cnt,
            cst,
            index_plan_finished: false,
        }
    }

    pub fn with_double_read(index_plan: PhysicalPlan, table_plan: PhysicalPlan, cnt: f64, cst: f64) -> Self {
        Self {
            index_plan: Some(index_plan),
            table_plan: Some(table_plan),
            cnt,
            cst,
            index_plan_finished: true,
        }
    }

    /// True iff rows travel index -> table before reaching this point.
    pub fn is_double_read(&self) -> bool {
        self.index_plan.is_some() && self.table_plan.is_some()
    }

    /// The plan producing this task's final rows: the table side of a
    /// double read, else whichever single plan is set.
    fn current_plan(&self) -> &PhysicalPlan {
        self.table_plan
            .as_ref()
            .or(self.index_plan.as_ref())
            .expect("a CopTask always carries at least one plan")
    }

    /// Attaches an operator on top of whichever plan currently produces
    /// this task's rows, and locks `index_plan` against further direct
    /// extension - everything from here on grows the table side.
    fn attach(&mut self, build: impl FnOnce(PhysicalPlan) -> PhysicalPlan) {
        let taken = self
            .table_plan
            .take()
            .or_else(|| self.index_plan.take());
        let plan = build(taken.expect("a CopTask always carries at least one plan"));
        self.table_plan = Some(plan);
        self.index_plan_finished = true;
    }

    /// Attaches a `Selection`, costed at `CPU_FACTOR` per input row.
    pub fn attach_selection(&mut self, predicate: Expr) {
        self.cst += self.cnt * CPU_FACTOR;
        self.attach(|plan| PhysicalPlan::selection(plan, predicate));
    }

    /// Attaches a `Projection`. Free in row-count terms - it narrows
    /// columns, not rows - but still costs `CPU_FACTOR` per row touched.
    pub fn attach_projection(&mut self, exprs: Vec<Expr>, schema: Vec<crate::planner::property::SchemaColumn>) {
        self.cst += self.cnt * CPU_FACTOR;
        self.attach(|plan| PhysicalPlan::projection(plan, exprs, schema));
    }

    /// Attaches an `Aggregation`, after which `cnt` becomes an estimate
    /// of the number of distinct groups rather than input rows.
    pub fn attach_aggregation(
        &mut self,
        group_by: Vec<Expr>,
        aggregates: Vec<(AggregateFunc, Expr)>,
        schema: Vec<crate::planner::property::SchemaColumn>,
        output_row_count: f64,
    ) {
        self.cst += self.cnt * CPU_FACTOR;
        self.attach(|plan| PhysicalPlan::aggregation(plan, group_by, aggregates, schema));
        self.cnt = output_row_count;
    }

    /// Converts this `CopTask` into a `RootTask`, paying
    /// [`NET_FACTOR`] per row to ship results up to the caller. One-way:
    /// the result can no longer accept cheap per-row attachments.
    pub fn finish(self) -> RootTask {
        let cst = self.cst + self.cnt * NET_FACTOR;
        let cnt = self.cnt;
        RootTask {
            plan: self.current_plan().clone(),
            cst,
            cnt,
        }
    }
}

/// A plan that has left the coprocessor: every further operator (sort,
/// limit, another selection) now runs in the SQL layer itself.
#[derive(Clone, Debug)]
pub struct RootTask {
    pub plan: PhysicalPlan,
    pub cst: f64,
    /// Row count estimate, carried over from the `CopTask` this task was
    /// finished from (or set directly for a task that started here).
    pub cnt: f64,
}

impl RootTask {
    pub fn new(plan: PhysicalPlan, cst: f64, cnt: f64) -> Self {
        Self { plan, cst, cnt }
    }

    /// Wraps the plan in an enforcing `Sort`, costed at the classic
    /// `n * log2(n)` comparison-sort estimate.
    pub fn attach_sort(&mut self, order_by: Vec<(crate::planner::property::ColumnId, crate::ast::SortOrder)>) {
        self.cst += self.cnt * libm::log2(self.cnt.max(1.0)) * CPU_FACTOR;
        let plan = core::mem::replace(&mut self.plan, PhysicalPlan::mem_table("", Vec::new()));
        self.plan = PhysicalPlan::sort(plan, order_by);
    }

    pub fn attach_limit(&mut self, offset: usize, count: usize) {
        let plan = core::mem::replace(&mut self.plan, PhysicalPlan::mem_table("", Vec::new()));
        self.plan = PhysicalPlan::limit(plan, offset, count);
        self.cnt = (offset + count) as f64;
    }

    pub fn attach_selection(&mut self, predicate: Expr) {
        self.cst += self.cnt * CPU_FACTOR;
        let plan = core::mem::replace(&mut self.plan, PhysicalPlan::mem_table("", Vec::new()));
        self.plan = PhysicalPlan::selection(plan, predicate);
    }

    pub fn attach_projection(&mut self, exprs: Vec<Expr>, schema: Vec<crate::planner::property::SchemaColumn>) {
        self.cst += self.cnt * CPU_FACTOR;
        let plan = core::mem::replace(&mut self.plan, PhysicalPlan::mem_table("", Vec::new()));
        self.plan = PhysicalPlan::projection(plan, exprs, schema);
    }

    pub fn attach_aggregation(
        &mut self,
        group_by: Vec<Expr>,
        aggregates: Vec<(AggregateFunc, Expr)>,
        schema: Vec<crate::planner::property::SchemaColumn>,
        output_row_count: f64,
    ) {
        self.cst += self.cnt * CPU_FACTOR;
        let plan = core::mem::replace(&mut self.plan, PhysicalPlan::mem_table("", Vec::new()));
        self.plan = PhysicalPlan::aggregation(plan, group_by, aggregates, schema);
        self.cnt = output_row_count;
    }
}

/// Either shape a partially-planned subtree can be in.
#[derive(Clone, Debug)]
pub enum TaskProfile {
    Cop(Box<CopTask>),
    Root(Box<RootTask>),
}

impl TaskProfile {
    pub fn cost(&self) -> f64 {
        match self {
            TaskProfile::Cop(t) => t.cst,
            TaskProfile::Root(t) => t.cst,
        }
    }

    /// Converts a `Cop` task into a `Root` task in place; a no-op on an
    /// already-`Root` task.
    pub fn finish(self) -> RootTask {
        match self {
            TaskProfile::Cop(t) => t.finish(),
            TaskProfile::Root(t) => *t,
        }
    }

    pub fn is_cop(&self) -> bool {
        matches!(self, TaskProfile::Cop(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::property::SchemaColumn;
    use crate::planner::property::ColumnId;

    fn leaf_schema() -> Vec<SchemaColumn> {
        alloc::vec![SchemaColumn::new(ColumnId::new(1, 0), "t", "id")]
    }

    #[test]
    fn test_cop_task_finish_pays_net_factor() {
        let plan = PhysicalPlan::table_scan("t", Vec::new(), true, false, leaf_schema());
        let task = CopTask::from_table_plan(plan, 100.0, 100.0);
        let root = task.finish();
        assert!(root.cst > 100.0);
    }

    #[test]
    fn test_double_read_detection() {
        let idx = PhysicalPlan::index_scan("t", "idx", Vec::new(), 1, 1, false, false, leaf_schema());
        let tbl = PhysicalPlan::table_scan("t", Vec::new(), false, false, leaf_schema());
        let task = CopTask::with_double_read(idx, tbl, 10.0, 10.0);
        assert!(task.is_double_read());
    }

    #[test]
    fn test_attach_selection_increases_cost_monotonically() {
        let plan = PhysicalPlan::table_scan("t", Vec::new(), true, false, leaf_schema());
        let mut task = CopTask::from_table_plan(plan, 50.0, 50.0);
        let before = task.cst;
        task.attach_selection(Expr::eq(Expr::column("t", "id", 0), Expr::literal(1i64)));
        assert!(task.cst > before);
    }

    #[test]
    fn test_finish_is_one_way() {
        let plan = PhysicalPlan::table_scan("t", Vec::new(), true, false, leaf_schema());
        let profile = TaskProfile::Cop(Box::new(CopTask::from_table_plan(plan, 10.0, 10.0)));
        assert!(profile.is_cop());
        let root_profile = TaskProfile::Root(Box::new(profile.finish()));
        assert!(!root_profile.is_cop());
    }
}
