//! Lowers a [`crate::planner::bound::BoundPlan`] - the tree shape the
//! `crate::optimizer` rewrite passes produce - into a
//! [`crate::planner::arena::LogicalArena`] the physical planner can walk.
//!
//! This is where table metadata (`ExecutionContext`/`TableStats`) turns
//! into a `DataSource`'s schema, primary key, and index list, and where
//! a `Filter` chain sitting directly above a `Scan` collapses into that
//! `DataSource`'s own `conditions` - access-path selection (§4.6) needs
//! those conditions already attached before it can enumerate scan
//! alternatives.

use crate::ast::{AggregateFunc, Expr, JoinType};
use crate::context::{ExecutionContext, QueryIndexType};
use crate::error::{PlanError, Result};
use crate::planner::arena::{LogicalArena, NodeId};
use crate::planner::bound::BoundPlan;
use crate::planner::logical::{self, ByItem, ExecLimit, IndexMeta};
use crate::planner::property::{ColumnId, SchemaColumn};
use crate::planner::range::resolve_column_id;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;

/// Hands out fresh `ColumnId.from_id` values during one lowering call.
/// Not shared across planner invocations - a self-join of the same
/// table must get distinct column identities each time it's scanned.
pub struct IdAllocator(Cell<u32>);

impl IdAllocator {
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    pub fn next(&self) -> u32 {
        let id = self.0.get();
        self.0.set(id + 1);
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowers `plan` into a fresh arena, returning it alongside the root
/// node id. Links every node's parent before returning.
pub fn lower(plan: BoundPlan, ctx: &ExecutionContext) -> Result<(LogicalArena, NodeId)> {
    let mut arena = LogicalArena::new();
    let ids = IdAllocator::new();
    let root = lower_into(plan, &mut arena, ctx, &ids)?;
    arena.link_parents(root);
    Ok((arena, root))
}

fn lower_into(plan: BoundPlan, arena: &mut LogicalArena, ctx: &ExecutionContext, ids: &IdAllocator) -> Result<NodeId> {
    match plan {
        BoundPlan::Empty => Ok(logical::empty(arena)),

        BoundPlan::Scan { table } => lower_scan(&table, Vec::new(), arena, ctx, ids),

        BoundPlan::Filter { input, predicate } => {
            let mut conditions = crate::planner::predicate::split_conjuncts(predicate);
            let mut base = *input;
            loop {
                match base {
                    BoundPlan::Filter { input, predicate } => {
                        conditions.extend(crate::planner::predicate::split_conjuncts(predicate));
                        base = *input;
                    }
                    BoundPlan::Scan { table } => {
                        return lower_scan(&table, conditions, arena, ctx, ids);
                    }
                    other => {
                        let mut node = lower_into(other, arena, ctx, ids)?;
                        for condition in conditions {
                            node = logical::selection(arena, node, condition);
                        }
                        return Ok(node);
                    }
                }
            }
        }

        BoundPlan::Project { input, columns } => {
            let child = lower_into(*input, arena, ctx, ids)?;
            let child_schema = arena.node(child).schema.clone();
            let from_id = ids.next();
            let mut schema = Vec::with_capacity(columns.len());
            let mut computed_pos = 0u32;
            for expr in &columns {
                let entry = match expr {
                    Expr::Column(col_ref) => match resolve_column_id(&child_schema, col_ref) {
                        Some(id) => SchemaColumn::new(id, col_ref.table.clone(), col_ref.column.clone()),
                        None => {
                            let col = SchemaColumn::new(
                                ColumnId::new(from_id, computed_pos),
                                col_ref.table.clone(),
                                col_ref.column.clone(),
                            );
                            computed_pos += 1;
                            col
                        }
                    },
                    _ => {
                        let col = SchemaColumn::new(
                            ColumnId::new(from_id, computed_pos),
                            "",
                            alloc::format!("expr_{}", computed_pos),
                        );
                        computed_pos += 1;
                        col
                    }
                };
                schema.push(entry);
            }
            Ok(logical::projection(arena, child, columns, schema))
        }

        BoundPlan::Join { left, right, condition, join_type } => {
            let l = lower_into(*left, arena, ctx, ids)?;
            let r = lower_into(*right, arena, ctx, ids)?;
            Ok(logical::join(arena, l, r, join_type, condition))
        }

        BoundPlan::CrossProduct { left, right } => {
            let l = lower_into(*left, arena, ctx, ids)?;
            let r = lower_into(*right, arena, ctx, ids)?;
            Ok(logical::join(arena, l, r, JoinType::Cross, Expr::literal(true)))
        }

        BoundPlan::Aggregate { input, group_by, aggregates } => {
            let child = lower_into(*input, arena, ctx, ids)?;
            let from_id = ids.next();
            let mut schema = Vec::with_capacity(group_by.len() + aggregates.len());
            let mut pos = 0u32;
            for expr in &group_by {
                let entry = match expr {
                    Expr::Column(col_ref) => {
                        SchemaColumn::new(ColumnId::new(from_id, pos), col_ref.table.clone(), col_ref.column.clone())
                    }
                    _ => SchemaColumn::new(ColumnId::new(from_id, pos), "", alloc::format!("group_{}", pos)),
                };
                schema.push(entry);
                pos += 1;
            }
            for (func, _) in &aggregates {
                schema.push(SchemaColumn::new(ColumnId::new(from_id, pos), "", aggregate_func_name(*func)));
                pos += 1;
            }
            Ok(logical::aggregation(arena, child, group_by, aggregates, schema))
        }

        BoundPlan::Sort { input, order_by } => {
            let child = lower_into(*input, arena, ctx, ids)?;
            let items: Vec<ByItem> = order_by.into_iter().map(|(e, o)| ByItem::new(e, o)).collect();
            Ok(logical::sort(arena, child, items, None))
        }

        BoundPlan::Limit { input, limit, offset } => match *input {
            BoundPlan::Sort { input: sort_input, order_by } => {
                let child = lower_into(*sort_input, arena, ctx, ids)?;
                let items: Vec<ByItem> = order_by.into_iter().map(|(e, o)| ByItem::new(e, o)).collect();
                Ok(logical::sort(arena, child, items, Some(ExecLimit { offset, count: limit })))
            }
            other => {
                let child = lower_into(other, arena, ctx, ids)?;
                Ok(logical::limit(arena, child, offset, limit))
            }
        },
    }
}

fn aggregate_func_name(func: AggregateFunc) -> &'static str {
    match func {
        AggregateFunc::Count => "count",
        AggregateFunc::Sum => "sum",
        AggregateFunc::Avg => "avg",
        AggregateFunc::Min => "min",
        AggregateFunc::Max => "max",
        AggregateFunc::Distinct => "distinct",
        AggregateFunc::StdDev => "stddev",
        AggregateFunc::GeoMean => "geomean",
    }
}

fn lower_scan(
    table: &str,
    conditions: Vec<Expr>,
    arena: &mut LogicalArena,
    ctx: &ExecutionContext,
    ids: &IdAllocator,
) -> Result<NodeId> {
    let stats = ctx
        .get_stats(table)
        .ok_or_else(|| PlanError::internal(alloc::format!("unknown table `{}`", table)))?;

    let from_id = ids.next();
    let columns: Vec<SchemaColumn> = stats
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| SchemaColumn::new(ColumnId::new(from_id, i as u32), table, name.clone()))
        .collect();

    let pk_column = stats
        .pk_column
        .as_ref()
        .and_then(|pk| columns.iter().find(|c| &c.column == pk).map(|c| c.id));

    let indexes: Vec<IndexMeta> = stats
        .indexes
        .iter()
        .filter(|idx| idx.index_type == QueryIndexType::BTree)
        .filter_map(|idx| {
            let key_columns: Option<Vec<ColumnId>> = idx
                .columns
                .iter()
                .map(|name| columns.iter().find(|c| &c.column == name).map(|c| c.id))
                .collect();
            key_columns.map(|cols| IndexMeta::new(idx.name.clone(), cols, idx.is_unique))
        })
        .collect();

    Ok(logical::data_source(
        arena,
        String::from(table),
        columns,
        pk_column.is_some(),
        pk_column,
        indexes,
        conditions,
        stats.allow_table_scan,
        !stats.is_memory_table && stats.coprocessor_select_supported,
    ))
}
