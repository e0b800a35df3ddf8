//! Per-node memoization of `(RequiredProp -> TaskProfile)`.
//!
//! Planning the same node under the same required ordering twice is
//! wasted work - a `Selection` over a `DataSource` gets asked for both
//! an unordered and an ordered plan when its parent is a `Join` on one
//! branch and a `Sort` on the other. Keyed by [`NodeId`] first, so a
//! cache hit never has to hash every other node's entries, then by
//! [`RequiredProp`] within that node.

use crate::planner::arena::NodeId;
use crate::planner::property::RequiredProp;
use crate::planner::task::TaskProfile;
use alloc::vec::Vec;
use hashbrown::HashMap;

#[derive(Default)]
pub struct Memo {
    entries: Vec<HashMap<RequiredProp, TaskProfile>>,
}

impl Memo {
    /// Creates a memo sized for `node_count` nodes, one empty map apiece.
    pub fn new(node_count: usize) -> Self {
        let mut entries = Vec::with_capacity(node_count);
        entries.resize_with(node_count, HashMap::new);
        Self { entries }
    }

    pub fn get(&self, node: NodeId, prop: &RequiredProp) -> Option<&TaskProfile> {
        self.entries.get(node.0 as usize)?.get(prop)
    }

    pub fn insert(&mut self, node: NodeId, prop: RequiredProp, task: TaskProfile) {
        if let Some(map) = self.entries.get_mut(node.0 as usize) {
            map.insert(prop, task);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::physical::PhysicalPlan;
    use crate::planner::property::SchemaColumn;
    use crate::planner::property::ColumnId;
    use crate::planner::task::RootTask;
    use alloc::boxed::Box;

    #[test]
    fn test_memo_hit_after_insert() {
        let mut memo = Memo::new(3);
        let node = NodeId(1);
        let prop = RequiredProp::empty();
        let schema = alloc::vec![SchemaColumn::new(ColumnId::new(1, 0), "t", "id")];
        let plan = PhysicalPlan::mem_table("t", schema);
        memo.insert(node, prop.clone(), TaskProfile::Root(Box::new(RootTask::new(plan, 1.0, 1.0))));
        assert!(memo.get(node, &prop).is_some());
    }

    #[test]
    fn test_memo_miss_for_unseen_prop() {
        let memo = Memo::new(2);
        assert!(memo.get(NodeId(0), &RequiredProp::empty()).is_none());
    }

    #[test]
    fn test_memo_distinguishes_props_per_node() {
        let mut memo = Memo::new(1);
        let node = NodeId(0);
        let schema = alloc::vec![SchemaColumn::new(ColumnId::new(1, 0), "t", "id")];
        let ordered = RequiredProp::new(alloc::vec![ColumnId::new(1, 0)], false);
        let plan = PhysicalPlan::mem_table("t", schema);
        memo.insert(node, ordered.clone(), TaskProfile::Root(Box::new(RootTask::new(plan, 1.0, 1.0))));
        assert!(memo.get(node, &ordered).is_some());
        assert!(memo.get(node, &RequiredProp::empty()).is_none());
    }
}
