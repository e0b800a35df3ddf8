//! Logical plan node kinds.
//!
//! A `LogicalKind` only carries operator-specific fields; the common
//! attributes every node shares (schema, children, parent) live on the
//! [`crate::planner::arena::LogicalNode`] that wraps it. `DataSource`
//! replaces the separate `Scan`/`IndexScan`/`IndexGet` shapes a bound
//! query used to arrive with - scan-alternative enumeration is the
//! planner's own job now (§4.6), not a choice made before planning.

use crate::ast::{AggregateFunc, Expr, JoinType, SortOrder};
use crate::planner::arena::{LogicalArena, NodeId};
use crate::planner::property::{ColumnId, SchemaColumn};
use alloc::string::String;
use alloc::vec::Vec;

/// One `ORDER BY` item: an expression plus its direction.
#[derive(Clone, Debug)]
pub struct ByItem {
    pub expr: Expr,
    pub order: SortOrder,
}

impl ByItem {
    pub fn new(expr: Expr, order: SortOrder) -> Self {
        Self { expr, order }
    }

    /// True iff this item is a bare column reference - the only shape
    /// `Sort`'s push-down analysis (§4.4) accepts.
    pub fn is_bare_column(&self) -> bool {
        matches!(self.expr, Expr::Column(_))
    }
}

/// `LIMIT`/`OFFSET` riding directly on a `Sort`, the top-N form that lets
/// the planner elide the sort entirely when the child can produce rows
/// already in the right order (§4.4, scenario 5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecLimit {
    pub offset: usize,
    pub count: usize,
}

/// One index available on a `DataSource`'s table.
#[derive(Clone, Debug)]
pub struct IndexMeta {
    pub name: String,
    /// Key columns in index order, identified against the table's own
    /// column ids (not the query's, possibly narrower, output schema).
    pub key_columns: Vec<ColumnId>,
    pub unique: bool,
}

impl IndexMeta {
    pub fn new(name: impl Into<String>, key_columns: Vec<ColumnId>, unique: bool) -> Self {
        Self {
            name: name.into(),
            key_columns,
            unique,
        }
    }
}

/// Operator-specific fields of a logical plan node.
#[derive(Clone, Debug)]
pub enum LogicalKind {
    /// A table access. Carries every predicate the upstream logical
    /// rewrite already pushed down to it (out of scope per §1 - by the
    /// time the planner sees this node, `conditions` is already final).
    DataSource {
        table: String,
        pk_is_handle: bool,
        pk_column: Option<ColumnId>,
        indexes: Vec<IndexMeta>,
        conditions: Vec<Expr>,
        /// False when an index hint forbids a full table scan.
        allow_table_scan: bool,
        /// False when the backing table is an in-memory schema or the
        /// storage client has no coprocessor select support - forces a
        /// `PhysicalMemTable` plan.
        storage_select_supported: bool,
    },
    Selection {
        predicate: Expr,
    },
    Projection {
        exprs: Vec<Expr>,
    },
    Sort {
        items: Vec<ByItem>,
        exec_limit: Option<ExecLimit>,
    },
    Limit {
        offset: usize,
        count: usize,
    },
    Aggregation {
        group_by: Vec<Expr>,
        aggregates: Vec<(AggregateFunc, Expr)>,
    },
    /// Kept for completeness of the operator set named in §3; only the
    /// generic default strategy (§4.2) applies to it - join-order
    /// enumeration is an explicit Non-goal.
    Join {
        join_type: JoinType,
        condition: Expr,
    },
    /// The empty relation - zero rows, zero columns. Lowered from a
    /// bound tree whose optimizer passes proved some branch can never
    /// produce a row (e.g. an always-false `CrossProduct` filter).
    Empty,
}

impl LogicalKind {
    pub fn name(&self) -> &'static str {
        match self {
            LogicalKind::DataSource { .. } => "DataSource",
            LogicalKind::Selection { .. } => "Selection",
            LogicalKind::Projection { .. } => "Projection",
            LogicalKind::Sort { .. } => "Sort",
            LogicalKind::Limit { .. } => "Limit",
            LogicalKind::Aggregation { .. } => "Aggregation",
            LogicalKind::Join { .. } => "Join",
            LogicalKind::Empty => "Empty",
        }
    }
}

/// Appends a `DataSource` node. `table_columns` is the table's full
/// column list (this crate treats a `DataSource`'s output schema as the
/// whole table - column pruning is a `Projection` concern above it).
#[allow(clippy::too_many_arguments)]
pub fn data_source(
    arena: &mut LogicalArena,
    table: impl Into<String>,
    table_columns: Vec<SchemaColumn>,
    pk_is_handle: bool,
    pk_column: Option<ColumnId>,
    indexes: Vec<IndexMeta>,
    conditions: Vec<Expr>,
    allow_table_scan: bool,
    storage_select_supported: bool,
) -> NodeId {
    arena.push(
        LogicalKind::DataSource {
            table: table.into(),
            pk_is_handle,
            pk_column,
            indexes,
            conditions,
            allow_table_scan,
            storage_select_supported,
        },
        table_columns,
        Vec::new(),
    )
}

/// Appends a `Selection` node above `input`. Output schema is unchanged
/// from `input` - a filter never adds or removes columns.
pub fn selection(arena: &mut LogicalArena, input: NodeId, predicate: Expr) -> NodeId {
    let schema = arena.node(input).schema.clone();
    arena.push(LogicalKind::Selection { predicate }, schema, alloc::vec![input])
}

/// Appends a `Projection` node above `input` with the given output
/// schema (one entry, and one `exprs` entry, per projected column).
pub fn projection(
    arena: &mut LogicalArena,
    input: NodeId,
    exprs: Vec<Expr>,
    schema: Vec<SchemaColumn>,
) -> NodeId {
    arena.push(LogicalKind::Projection { exprs }, schema, alloc::vec![input])
}

/// Appends a `Sort` node above `input`.
pub fn sort(
    arena: &mut LogicalArena,
    input: NodeId,
    items: Vec<ByItem>,
    exec_limit: Option<ExecLimit>,
) -> NodeId {
    let schema = arena.node(input).schema.clone();
    arena.push(
        LogicalKind::Sort { items, exec_limit },
        schema,
        alloc::vec![input],
    )
}

/// Appends a `Limit` node above `input`.
pub fn limit(arena: &mut LogicalArena, input: NodeId, offset: usize, count: usize) -> NodeId {
    let schema = arena.node(input).schema.clone();
    arena.push(LogicalKind::Limit { offset, count }, schema, alloc::vec![input])
}

/// Appends an `Aggregation` node above `input` with the given output
/// schema (group-by columns followed by aggregate outputs, by
/// convention).
pub fn aggregation(
    arena: &mut LogicalArena,
    input: NodeId,
    group_by: Vec<Expr>,
    aggregates: Vec<(AggregateFunc, Expr)>,
    schema: Vec<SchemaColumn>,
) -> NodeId {
    arena.push(
        LogicalKind::Aggregation { group_by, aggregates },
        schema,
        alloc::vec![input],
    )
}

/// Appends a `Join` node above `left`/`right`. Output schema is the
/// concatenation of both sides' schemas, left then right.
pub fn join(
    arena: &mut LogicalArena,
    left: NodeId,
    right: NodeId,
    join_type: JoinType,
    condition: Expr,
) -> NodeId {
    let mut schema = arena.node(left).schema.clone();
    schema.extend(arena.node(right).schema.clone());
    arena.push(
        LogicalKind::Join { join_type, condition },
        schema,
        alloc::vec![left, right],
    )
}

/// Appends an `Empty` leaf node.
pub fn empty(arena: &mut LogicalArena) -> NodeId {
    arena.push(LogicalKind::Empty, Vec::new(), Vec::new())
}
