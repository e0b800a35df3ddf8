//! The core recursive planner: `plan_node(node, prop)` returns the
//! cheapest [`TaskProfile`] for a logical subtree under a required
//! ordering, memoized per `(NodeId, RequiredProp)`.
//!
//! §4.1's top-level contract: every node is planned once per distinct
//! `RequiredProp` it is asked for, and a `CopTask` is only compared
//! against a `RootTask` after both have been brought to the same shape
//! (`finish()`-ed) - `finish()` is one-way, so comparing the unfinished
//! cost of one candidate against the finished cost of another would
//! bias the choice toward whichever happened to still be a `CopTask`.

use crate::ast::{Expr, SortOrder};
use crate::context::ExecutionContext;
use crate::error::{PlanError, Result};
use crate::planner::arena::{LogicalArena, NodeId};
use crate::planner::cost::{CPU_FACTOR, DESC_SCAN_FACTOR, SCAN_FACTOR};
use crate::planner::logical::{ByItem, LogicalKind};
use crate::planner::memo::Memo;
use crate::planner::physical::PhysicalPlan;
use crate::planner::predicate::split_pushdown;
use crate::planner::property::{ColumnId, RequiredProp};
use crate::planner::range::{detach_index_scan_conditions, detach_table_scan_conditions, resolve_column_id};
use crate::planner::task::{CopTask, RootTask, TaskProfile};
use alloc::boxed::Box;
use alloc::vec::Vec;

/// Plans `node` under `prop`, consulting and populating `memo`.
pub fn plan_node(
    arena: &LogicalArena,
    node: NodeId,
    prop: &RequiredProp,
    ctx: &ExecutionContext,
    memo: &mut Memo,
) -> Result<TaskProfile> {
    if let Some(cached) = memo.get(node, prop) {
        return Ok(cached.clone());
    }
    let result = plan_uncached(arena, node, prop, ctx, memo)?;
    memo.insert(node, prop.clone(), result.clone());
    Ok(result)
}

fn plan_uncached(
    arena: &LogicalArena,
    node: NodeId,
    prop: &RequiredProp,
    ctx: &ExecutionContext,
    memo: &mut Memo,
) -> Result<TaskProfile> {
    let logical = arena.node(node);
    match &logical.kind {
        LogicalKind::DataSource { .. } => plan_data_source(arena, node, prop, ctx),

        LogicalKind::Selection { predicate } => {
            let child = logical.children.first().copied().ok_or_else(|| {
                PlanError::internal("Selection node has no child")
            })?;
            plan_selection(arena, node, child, predicate.clone(), prop, ctx, memo)
        }

        LogicalKind::Projection { exprs } => {
            let child = logical.children.first().copied().ok_or_else(|| {
                PlanError::internal("Projection node has no child")
            })?;
            plan_projection(arena, child, exprs.clone(), logical.schema.clone(), prop, ctx, memo)
        }

        LogicalKind::Sort { items, exec_limit } => {
            let child = logical.children.first().copied().ok_or_else(|| {
                PlanError::internal("Sort node has no child")
            })?;
            plan_sort(arena, child, items, *exec_limit, ctx, memo)
        }

        LogicalKind::Limit { offset, count } => {
            let child = logical.children.first().copied().ok_or_else(|| {
                PlanError::internal("Limit node has no child")
            })?;
            let child_task = plan_node(arena, child, prop, ctx, memo)?;
            Ok(plan_limit(child_task, *offset, *count))
        }

        LogicalKind::Aggregation {
            group_by,
            aggregates,
        } => {
            let child = logical.children.first().copied().ok_or_else(|| {
                PlanError::internal("Aggregation node has no child")
            })?;
            let child_task = plan_node(arena, child, &RequiredProp::empty(), ctx, memo)?;
            let output_row_count = group_by.len().max(1) as f64;
            let task = plan_aggregation(
                child_task,
                group_by.clone(),
                aggregates.clone(),
                logical.schema.clone(),
                output_row_count,
            );
            // Aggregation gets no specialized push-down rule in §4 (only
            // Projection, Sort, Selection, and DataSource do); it falls
            // back to §4.2's generic enforce branch when the caller
            // still needs an order the grouped output doesn't naturally
            // have, e.g. `GROUP BY a ORDER BY a`.
            Ok(enforce(task, prop))
        }

        LogicalKind::Join { join_type, condition } => {
            let mut children = logical.children.iter().copied();
            let left = children.next().ok_or_else(|| PlanError::internal("Join node has no left child"))?;
            let right = children.next().ok_or_else(|| PlanError::internal("Join node has no right child"))?;
            // §4.2: the enforce/push analysis of the generic operator
            // applies to the first child only; the second is always
            // replanned with the empty property, same as any operator
            // with no push-down rule for that child slot.
            let left_task = plan_node(arena, left, prop, ctx, memo)?;
            let right_task = plan_node(arena, right, &RequiredProp::empty(), ctx, memo)?;
            Ok(plan_join(left_task, right_task, join_type.clone(), condition.clone(), logical.schema.clone()))
        }

        LogicalKind::Empty => Ok(TaskProfile::Root(Box::new(RootTask::new(PhysicalPlan::Empty, 0.0, 0.0)))),
    }
}

/// Joins have no coprocessor counterpart - both sides are finished to
/// the root and the join itself is the opaque generic-strategy node of
/// §4.2 (no algorithm choice, no join-order enumeration).
fn plan_join(
    left: TaskProfile,
    right: TaskProfile,
    join_type: crate::ast::JoinType,
    condition: Expr,
    schema: Vec<crate::planner::property::SchemaColumn>,
) -> TaskProfile {
    let left_root = left.finish();
    let right_root = right.finish();
    let cnt = (left_root.cnt * right_root.cnt).max(1.0);
    let cst = left_root.cst + right_root.cst + left_root.cnt * right_root.cnt * CPU_FACTOR;
    let plan = PhysicalPlan::join(left_root.plan, right_root.plan, condition, join_type, schema);
    TaskProfile::Root(Box::new(RootTask::new(plan, cst, cnt)))
}

/// Enumerates scan alternatives for a `DataSource` (§4.6): a full table
/// scan (if allowed) and one candidate per usable index, each compared
/// on finished cost once brought to satisfy `prop`.
fn plan_data_source(
    arena: &LogicalArena,
    node: NodeId,
    prop: &RequiredProp,
    ctx: &ExecutionContext,
) -> Result<TaskProfile> {
    let logical = arena.node(node);
    let schema = logical.schema.clone();
    let (table, pk_column, indexes, conditions, allow_table_scan, storage_select_supported) =
        match &logical.kind {
            LogicalKind::DataSource {
                table,
                pk_column,
                indexes,
                conditions,
                allow_table_scan,
                storage_select_supported,
                ..
            } => (
                table.clone(),
                *pk_column,
                indexes.clone(),
                conditions.clone(),
                *allow_table_scan,
                *storage_select_supported,
            ),
            _ => return Err(PlanError::internal("plan_data_source called on a non-DataSource node")),
        };

    let row_count = ctx.row_count(&table).max(1) as f64;

    if !storage_select_supported {
        let plan = PhysicalPlan::mem_table(table, schema);
        return Ok(TaskProfile::Root(Box::new(RootTask::new(
            plan,
            row_count * CPU_FACTOR,
            row_count,
        ))));
    }

    let mut candidates: Vec<TaskProfile> = Vec::new();

    if allow_table_scan {
        let candidate = plan_table_scan(&table, &schema, &conditions, pk_column, prop, ctx, row_count);
        candidates.push(candidate);
    }

    for index in &indexes {
        if let Some(candidate) = plan_index_scan(&table, &schema, &conditions, pk_column, index, prop, ctx, row_count) {
            candidates.push(candidate);
        }
    }

    candidates
        .into_iter()
        .min_by(|a, b| a.cost().partial_cmp(&b.cost()).unwrap_or(core::cmp::Ordering::Equal))
        .ok_or_else(|| PlanError::internal("no access path available for data source"))
}

fn plan_table_scan(
    table: &str,
    schema: &[crate::planner::property::SchemaColumn],
    conditions: &[Expr],
    pk_column: Option<ColumnId>,
    prop: &RequiredProp,
    ctx: &ExecutionContext,
    default_row_count: f64,
) -> TaskProfile {
    let pk = pk_column.unwrap_or_default();
    let (ranges, residual) = detach_table_scan_conditions(conditions, schema, pk);

    let estimated_rows = ctx
        .statistics(table)
        .map(|stats| stats.row_count_by_int_column_ranges(pk, &ranges) as f64)
        .unwrap_or(default_row_count);

    let wants_pk_order = prop.is_empty() || (prop.cols.len() == 1 && prop.cols[0] == pk);
    let desc = prop.desc && wants_pk_order;
    let scan_factor = if desc { DESC_SCAN_FACTOR } else { SCAN_FACTOR };

    let plan = PhysicalPlan::table_scan(table, ranges, wants_pk_order, desc, schema.to_vec());
    let mut task = CopTask::from_table_plan(plan, estimated_rows, estimated_rows * scan_factor);

    if let Some(predicate) = crate::planner::predicate::conjunction(residual) {
        task.attach_selection(predicate);
    }

    if wants_pk_order {
        TaskProfile::Cop(Box::new(task))
    } else {
        finish_and_enforce(task, prop)
    }
}

fn plan_index_scan(
    table: &str,
    schema: &[crate::planner::property::SchemaColumn],
    conditions: &[Expr],
    pk_column: Option<ColumnId>,
    index: &crate::planner::logical::IndexMeta,
    prop: &RequiredProp,
    ctx: &ExecutionContext,
    default_row_count: f64,
) -> Option<TaskProfile> {
    let (ranges, access_equal_count, access_in_and_eq_count, residual) =
        detach_index_scan_conditions(conditions, schema, index);

    let estimated_rows = ctx
        .statistics(table)
        .map(|stats| stats.row_count_by_index_ranges(&index.name, &ranges, access_equal_count) as f64)
        .unwrap_or(default_row_count);

    let remaining_key_cols = &index.key_columns[access_equal_count.min(index.key_columns.len())..];
    let order_matches = prop.is_empty()
        || (prop.cols.len() <= remaining_key_cols.len() && remaining_key_cols[..prop.cols.len()] == prop.cols[..]);
    let desc = prop.desc && order_matches && !prop.is_empty();
    let scan_factor = if desc { DESC_SCAN_FACTOR } else { SCAN_FACTOR };

    let covers_schema = schema.iter().all(|c| index.key_columns.contains(&c.id) || Some(c.id) == pk_column);

    let index_plan = PhysicalPlan::index_scan(
        table,
        index.name.clone(),
        ranges,
        access_equal_count,
        access_in_and_eq_count,
        desc,
        !order_matches,
        schema.to_vec(),
    );

    let mut task = if covers_schema {
        CopTask::from_index_plan(index_plan, estimated_rows, estimated_rows * scan_factor)
    } else {
        let pk = pk_column?;
        let table_plan = PhysicalPlan::table_scan(table, Vec::new(), false, false, schema.to_vec());
        CopTask::with_double_read(
            index_plan,
            table_plan,
            estimated_rows,
            estimated_rows * scan_factor + estimated_rows * SCAN_FACTOR,
        )
    };
    if let Some(predicate) = crate::planner::predicate::conjunction(residual) {
        task.attach_selection(predicate);
    }

    Some(if order_matches {
        TaskProfile::Cop(Box::new(task))
    } else {
        finish_and_enforce(task, prop)
    })
}

/// Finishes a `CopTask` and, if it still doesn't satisfy `prop`, wraps
/// it in an enforcing `Sort` at the root - §4.5's "finish before compare"
/// rule applied to the ordering mismatch case.
fn finish_and_enforce(task: CopTask, prop: &RequiredProp) -> TaskProfile {
    let mut root = task.finish();
    if !prop.is_empty() {
        let order_by = prop
            .cols
            .iter()
            .map(|c| (*c, if prop.desc { crate::ast::SortOrder::Desc } else { crate::ast::SortOrder::Asc }))
            .collect();
        root.attach_sort(order_by);
    }
    TaskProfile::Root(Box::new(root))
}

/// Wraps `task` in an enforcing `Sort` if `prop` isn't already vacuous -
/// §4.2's generic-operator enforce branch, shared by every node kind
/// with no specialized push-down rule of its own (and by the ones that
/// do, for their own enforce branch).
fn enforce(task: TaskProfile, prop: &RequiredProp) -> TaskProfile {
    if prop.is_empty() {
        return task;
    }
    let mut root = task.finish();
    let order_by = prop
        .cols
        .iter()
        .map(|c| (*c, if prop.desc { SortOrder::Desc } else { SortOrder::Asc }))
        .collect();
    root.attach_sort(order_by);
    TaskProfile::Root(Box::new(root))
}

/// §4.5's `planCanPushDown(parentKind)` table: whether `node`'s parent
/// can itself still push work further down, which decides whether a
/// `CopTask` ordered branch must be finished before its cost is
/// compared against the enforce branch. A node with no parent (the root
/// of the plan) has nobody left to push into, so it reads as `false`.
fn plan_can_push_down(arena: &LogicalArena, node: NodeId) -> bool {
    let parent = match arena.node(node).parent {
        Some(p) => p,
        None => return false,
    };
    match &arena.node(parent).kind {
        LogicalKind::Selection { predicate } => split_pushdown(predicate.clone()).0.is_some(),
        LogicalKind::Sort { items, .. } => sort_items_push_legal(items),
        LogicalKind::Limit { .. } => true,
        // Conservative over-approximation, not fixed - see DESIGN.md's
        // Open Questions table.
        LogicalKind::Aggregation { .. } => true,
        _ => false,
    }
}

/// Plans a `Selection` per §4.5: an enforce branch (child planned with
/// an empty property, self attached, wrapped in a Sort if `prop` is
/// non-empty) compared against a push branch (child planned with `prop`
/// itself, self attached). If the push branch is still a `CopTask` and
/// the parent can't push any further work down into it, it's finished
/// before the cost comparison - comparing an unfinished `CopTask`
/// against a finished `RootTask` is unfair, since the `CopTask` still
/// owes `NET_FACTOR`.
fn plan_selection(
    arena: &LogicalArena,
    node: NodeId,
    child: NodeId,
    predicate: Expr,
    prop: &RequiredProp,
    ctx: &ExecutionContext,
    memo: &mut Memo,
) -> Result<TaskProfile> {
    let (pushable, retained) = split_pushdown(predicate);
    let attach = |mut task: TaskProfile| -> TaskProfile {
        match &mut task {
            TaskProfile::Cop(t) => {
                if let Some(p) = pushable.clone() {
                    t.attach_selection(p);
                }
            }
            TaskProfile::Root(t) => {
                if let Some(p) = pushable.clone() {
                    t.attach_selection(p);
                }
            }
        }
        match retained.clone() {
            Some(r) => match task {
                TaskProfile::Cop(mut t) => {
                    let mut root = t.finish();
                    root.attach_selection(r);
                    TaskProfile::Root(Box::new(root))
                }
                TaskProfile::Root(mut root) => {
                    root.attach_selection(r);
                    TaskProfile::Root(root)
                }
            },
            None => task,
        }
    };

    let enforce_child = plan_node(arena, child, &RequiredProp::empty(), ctx, memo)?;
    let enforce_branch = enforce(attach(enforce_child), prop);

    if prop.is_empty() {
        return Ok(enforce_branch);
    }

    let pushed_child = plan_node(arena, child, prop, ctx, memo)?;
    let mut push_branch = attach(pushed_child);
    if push_branch.is_cop() && !plan_can_push_down(arena, node) {
        push_branch = TaskProfile::Root(Box::new(push_branch.finish()));
    }

    Ok(if push_branch.cost() < enforce_branch.cost() {
        push_branch
    } else {
        enforce_branch
    })
}

/// §4.3's push-down legality check: locates each of `prop`'s columns in
/// the projection's own output schema and classifies the expression
/// that produced it. A bare column substitutes its child-level column;
/// a constant is vacuous and drops out of the requirement; anything
/// else (a scalar function, in particular) refuses the whole push,
/// since the child has no column that could satisfy an order over a
/// value the projection itself computes.
fn projection_push_down(
    arena: &LogicalArena,
    child: NodeId,
    prop: &RequiredProp,
    exprs: &[Expr],
    schema: &[crate::planner::property::SchemaColumn],
) -> Option<RequiredProp> {
    if prop.is_empty() {
        return Some(RequiredProp::empty());
    }
    let child_schema = &arena.node(child).schema;
    let mut child_cols = Vec::with_capacity(prop.cols.len());
    for col in &prop.cols {
        let idx = schema.iter().position(|s| s.id == *col)?;
        match &exprs[idx] {
            Expr::Column(col_ref) => {
                child_cols.push(resolve_column_id(child_schema, col_ref)?);
            }
            Expr::Literal(_) => {}
            _ => return None,
        }
    }
    Some(RequiredProp::new(child_cols, prop.desc))
}

/// Plans a `Projection` per §4.3: the enforce branch (§4.2, child
/// planned with an empty property) compared against an ordered branch
/// (child planned with the rewritten, push-legal property), kept only
/// if strictly cheaper.
fn plan_projection(
    arena: &LogicalArena,
    child: NodeId,
    exprs: Vec<Expr>,
    schema: Vec<crate::planner::property::SchemaColumn>,
    prop: &RequiredProp,
    ctx: &ExecutionContext,
    memo: &mut Memo,
) -> Result<TaskProfile> {
    let attach = |task: TaskProfile| -> TaskProfile {
        match task {
            TaskProfile::Cop(mut t) => {
                t.attach_projection(exprs.clone(), schema.clone());
                TaskProfile::Cop(t)
            }
            TaskProfile::Root(mut root) => {
                root.attach_projection(exprs.clone(), schema.clone());
                TaskProfile::Root(root)
            }
        }
    };

    let enforce_child = plan_node(arena, child, &RequiredProp::empty(), ctx, memo)?;
    let enforce_branch = enforce(attach(enforce_child), prop);

    if prop.is_empty() {
        return Ok(enforce_branch);
    }

    let pushed = match projection_push_down(arena, child, prop, &exprs, &schema) {
        Some(child_prop) => {
            let ordered_child = plan_node(arena, child, &child_prop, ctx, memo)?;
            Some(attach(ordered_child))
        }
        None => None,
    };

    Ok(match pushed {
        Some(ordered_branch) if ordered_branch.cost() < enforce_branch.cost() => ordered_branch,
        _ => enforce_branch,
    })
}

fn plan_limit(child: TaskProfile, offset: usize, count: usize) -> TaskProfile {
    // Limit always runs at the root: a CopTask's coprocessor has no
    // cross-range notion of "the Nth row overall".
    let mut root = child.finish();
    root.attach_limit(offset, count);
    TaskProfile::Root(Box::new(root))
}

fn plan_aggregation(
    child: TaskProfile,
    group_by: Vec<Expr>,
    aggregates: Vec<(crate::ast::AggregateFunc, Expr)>,
    schema: Vec<crate::planner::property::SchemaColumn>,
    output_row_count: f64,
) -> TaskProfile {
    match child {
        TaskProfile::Cop(mut task) => {
            task.attach_aggregation(group_by, aggregates, schema, output_row_count);
            TaskProfile::Cop(task)
        }
        TaskProfile::Root(mut root) => {
            root.attach_aggregation(group_by, aggregates, schema, output_row_count);
            TaskProfile::Root(root)
        }
    }
}

/// Plans a `Sort`: asks its child for the same ordering unforced first
/// (so a covering index already in the right order can skip the sort
/// entirely), then compares against forcing the order at the root. When
/// `exec_limit` is set (§4.4 scenario 5 - an `ORDER BY ... LIMIT n`
/// riding on this node), a child that can produce the order natively
/// lets the limit ride along without ever materializing more than `n`
/// rows, eliding the sort.
fn plan_sort(
    arena: &LogicalArena,
    child: NodeId,
    items: &[ByItem],
    exec_limit: Option<crate::planner::logical::ExecLimit>,
    ctx: &ExecutionContext,
    memo: &mut Memo,
) -> Result<TaskProfile> {
    let push_legal = sort_items_push_legal(items);
    let cols: Option<Vec<ColumnId>> = if push_legal {
        items
            .iter()
            .map(|item| match &item.expr {
                Expr::Column(col_ref) => {
                    let schema = &arena.node(child).schema;
                    resolve_column_id(schema, col_ref)
                }
                _ => None,
            })
            .collect()
    } else {
        None
    };
    let desc = items.first().map(|i| i.order == SortOrder::Desc).unwrap_or(false);

    let natural_prop = match &cols {
        Some(cols) => RequiredProp::new(cols.clone(), desc),
        None => RequiredProp::empty(),
    };

    // A child already naturally producing this order costs nothing to
    // request ordered - it's the same task it would have planned anyway.
    let ordered_child = if cols.is_some() {
        Some(plan_node(arena, child, &natural_prop, ctx, memo)?)
    } else {
        None
    };

    let order_by: Vec<_> = match &cols {
        Some(cols) => cols
            .iter()
            .map(|c| (*c, if desc { crate::ast::SortOrder::Desc } else { crate::ast::SortOrder::Asc }))
            .collect(),
        None => Vec::new(),
    };

    let best = match ordered_child {
        Some(task) if task_is_already_ordered(&task) => task,
        Some(task) => {
            let mut root = task.finish();
            root.attach_sort(order_by.clone());
            TaskProfile::Root(Box::new(root))
        }
        None => {
            let unordered = plan_node(arena, child, &RequiredProp::empty(), ctx, memo)?;
            let mut root = unordered.finish();
            root.attach_sort(order_by.clone());
            TaskProfile::Root(Box::new(root))
        }
    };

    Ok(match exec_limit {
        Some(lim) => plan_limit(best, lim.offset, lim.count),
        None => best,
    })
}

/// §4.4's Sort push-down legality: every `ByItem` must be a bare column
/// *and* they must all share the same `Desc` flag. A mix of ascending
/// and descending columns (`ORDER BY a ASC, b DESC`) can't be expressed
/// as a single `RequiredProp`, which carries one `desc` flag for the
/// whole column list - so it isn't legal to push at all.
fn sort_items_push_legal(items: &[ByItem]) -> bool {
    match items.first() {
        Some(first) => {
            let desc = first.order == SortOrder::Desc;
            items.iter().all(|item| item.is_bare_column() && (item.order == SortOrder::Desc) == desc)
        }
        None => false,
    }
}

/// A heuristic stand-in for "the plan's physical shape already reflects
/// the requested order": true for an index/table scan that was built
/// with `out_of_order: false`/`keep_order: true`, since those are the
/// only physical nodes this planner produces that claim an order
/// without an explicit enforcing `Sort` wrapping them.
fn task_is_already_ordered(task: &TaskProfile) -> bool {
    let plan = match task {
        TaskProfile::Cop(t) => t.index_plan.as_ref().or(t.table_plan.as_ref()),
        TaskProfile::Root(t) => Some(&t.plan),
    };
    match plan {
        Some(PhysicalPlan::TableScan(s)) => s.keep_order,
        Some(PhysicalPlan::IndexScan(s)) => !s.out_of_order,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionContext;
    use crate::planner::arena::LogicalArena;
    use crate::planner::logical::{data_source, join, limit, projection, selection, sort, ByItem, IndexMeta};
    use crate::planner::property::SchemaColumn;
    use crate::ast::SortOrder;

    fn base_schema() -> Vec<SchemaColumn> {
        alloc::vec![
            SchemaColumn::new(ColumnId::new(1, 0), "t", "id"),
            SchemaColumn::new(ColumnId::new(1, 1), "t", "v"),
        ]
    }

    #[test]
    fn test_plan_simple_table_scan() {
        let mut arena = LogicalArena::new();
        let ds = data_source(
            &mut arena,
            "t",
            base_schema(),
            true,
            Some(ColumnId::new(1, 0)),
            Vec::new(),
            Vec::new(),
            true,
            true,
        );
        arena.link_parents(ds);
        let mut ctx = ExecutionContext::new();
        ctx.register_table(
            "t",
            crate::context::TableStats {
                row_count: 1000,
                is_sorted: true,
                indexes: Vec::new(),
                ..Default::default()
            },
        );
        let mut memo = Memo::new(arena.len());
        let task = plan_node(&arena, ds, &RequiredProp::empty(), &ctx, &mut memo).unwrap();
        assert!(task.cost() > 0.0);
    }

    #[test]
    fn test_plan_point_lookup_picks_index_over_table_scan() {
        let mut arena = LogicalArena::new();
        let index = IndexMeta::new("idx_v", alloc::vec![ColumnId::new(1, 1)], true);
        let conditions = alloc::vec![Expr::eq(Expr::column("t", "v", 1), Expr::literal(5i64))];
        let ds = data_source(
            &mut arena,
            "t",
            base_schema(),
            true,
            Some(ColumnId::new(1, 0)),
            alloc::vec![index],
            conditions,
            true,
            true,
        );
        arena.link_parents(ds);
        let mut ctx = ExecutionContext::new();
        ctx.register_table(
            "t",
            crate::context::TableStats {
                row_count: 10_000,
                is_sorted: true,
                indexes: Vec::new(),
                ..Default::default()
            },
        );
        let mut memo = Memo::new(arena.len());
        let task = plan_node(&arena, ds, &RequiredProp::empty(), &ctx, &mut memo).unwrap();
        // The point-lookup index candidate should win on cost.
        assert!(task.cost() < 10_000.0 * SCAN_FACTOR);
    }

    #[test]
    fn test_plan_sort_with_exec_limit_elides_sort_on_ordered_scan() {
        let mut arena = LogicalArena::new();
        let ds = data_source(
            &mut arena,
            "t",
            base_schema(),
            true,
            Some(ColumnId::new(1, 0)),
            Vec::new(),
            Vec::new(),
            true,
            true,
        );
        let sel = selection(&mut arena, ds, Expr::eq(Expr::column("t", "id", 0), Expr::column("t", "id", 0)));
        let sorted = sort(
            &mut arena,
            sel,
            alloc::vec![ByItem::new(Expr::column("t", "id", 0), SortOrder::Asc)],
            Some(crate::planner::logical::ExecLimit { offset: 0, count: 5 }),
        );
        let _ = limit;
        arena.link_parents(sorted);
        let mut ctx = ExecutionContext::new();
        ctx.register_table(
            "t",
            crate::context::TableStats {
                row_count: 500,
                is_sorted: true,
                indexes: Vec::new(),
                ..Default::default()
            },
        );
        let mut memo = Memo::new(arena.len());
        let task = plan_node(&arena, sorted, &RequiredProp::empty(), &ctx, &mut memo).unwrap();
        match task {
            TaskProfile::Root(root) => assert!(matches!(root.plan, PhysicalPlan::Limit { .. })),
            _ => panic!("expected a RootTask"),
        }
    }

    #[test]
    fn test_plan_projection_refuses_push_for_computed_column() {
        // `a+1 AS x`, required order `[x asc]` (§4.3 scenario 4): the
        // push must be refused since no child column can satisfy an
        // order over a value the projection itself computes, and the
        // enforcing Sort has to land above the Projection.
        let mut arena = LogicalArena::new();
        let ds = data_source(
            &mut arena,
            "t",
            base_schema(),
            true,
            Some(ColumnId::new(1, 0)),
            Vec::new(),
            Vec::new(),
            true,
            true,
        );
        let computed = Expr::BinaryOp {
            left: alloc::boxed::Box::new(Expr::column("t", "id", 0)),
            op: crate::ast::BinaryOp::Add,
            right: alloc::boxed::Box::new(Expr::literal(1i64)),
        };
        let proj_schema = alloc::vec![SchemaColumn::new(ColumnId::new(2, 0), "", "x")];
        let proj = projection(&mut arena, ds, alloc::vec![computed], proj_schema.clone());
        arena.link_parents(proj);

        let mut ctx = ExecutionContext::new();
        ctx.register_table(
            "t",
            crate::context::TableStats {
                row_count: 1000,
                is_sorted: true,
                indexes: Vec::new(),
                ..Default::default()
            },
        );
        let mut memo = Memo::new(arena.len());
        let prop = RequiredProp::new(alloc::vec![proj_schema[0].id], false);
        let task = plan_node(&arena, proj, &prop, &ctx, &mut memo).unwrap();
        match task {
            TaskProfile::Root(root) => assert!(matches!(root.plan, PhysicalPlan::Sort { .. })),
            _ => panic!("expected a RootTask wrapped in an enforcing Sort"),
        }
    }

    #[test]
    fn test_plan_join_finishes_both_sides() {
        let mut arena = LogicalArena::new();
        let left = data_source(
            &mut arena,
            "a",
            base_schema(),
            true,
            Some(ColumnId::new(1, 0)),
            Vec::new(),
            Vec::new(),
            true,
            true,
        );
        let right = data_source(
            &mut arena,
            "b",
            base_schema(),
            true,
            Some(ColumnId::new(2, 0)),
            Vec::new(),
            Vec::new(),
            true,
            true,
        );
        let j = join(
            &mut arena,
            left,
            right,
            crate::ast::JoinType::Inner,
            Expr::eq(Expr::column("a", "id", 0), Expr::column("b", "id", 0)),
        );
        arena.link_parents(j);
        let mut ctx = ExecutionContext::new();
        ctx.register_table(
            "a",
            crate::context::TableStats {
                row_count: 10,
                is_sorted: true,
                indexes: Vec::new(),
                ..Default::default()
            },
        );
        ctx.register_table(
            "b",
            crate::context::TableStats {
                row_count: 20,
                is_sorted: true,
                indexes: Vec::new(),
                ..Default::default()
            },
        );
        let mut memo = Memo::new(arena.len());
        let task = plan_node(&arena, j, &RequiredProp::empty(), &ctx, &mut memo).unwrap();
        match task {
            TaskProfile::Root(root) => assert!(matches!(root.plan, PhysicalPlan::Join { .. })),
            _ => panic!("expected a RootTask"),
        }
    }
}
