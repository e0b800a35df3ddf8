//! Query planner module.
//!
//! `bound` is what the `crate::optimizer` rewrite passes consume and
//! produce; `lower` turns a bound tree into the `arena`-addressed
//! `logical` tree that `plan` (the memoized cost-based planner proper,
//! per §4.1) walks down into a `physical` plan. `cost`/`task`/`memo`
//! are the planner's own supporting pieces; `predicate`/`range` are
//! shared analysis the planner leans on for push-down and access-path
//! decisions.

mod arena;
mod bound;
mod cost;
mod logical;
mod lower;
mod memo;
mod physical;
mod plan;
mod predicate;
mod property;
mod query_planner;
mod range;
mod task;

pub use arena::{LogicalArena, NodeId};
pub use bound::BoundPlan;
pub use cost::{CPU_FACTOR, DESC_SCAN_FACTOR, NET_FACTOR, SCAN_FACTOR};
pub use logical::{data_source, join, selection, ByItem, ExecLimit, IndexMeta, LogicalKind};
pub use lower::{lower, IdAllocator};
pub use memo::Memo;
pub use physical::{PhysicalIndexScan, PhysicalMemTable, PhysicalPlan, PhysicalTableScan};
pub use plan::plan_node;
pub use property::{ColumnId, RequiredProp, SchemaColumn};
pub use query_planner::QueryPlanner;
pub use task::{CopTask, RootTask, TaskProfile};
