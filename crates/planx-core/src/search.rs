//! # Subtree Search
//!
//! Fluent search over a plan subtree, resolving group references through
//! [`Lookup`] as it descends. Rules use this for guards that depend on what a
//! subtree contains — e.g. refusing to rewrite above a scan that feeds a
//! DELETE.

use crate::lookup::Lookup;
use crate::plan::PlanNode;

/// Recursive-descent searcher over a plan subtree.
///
/// ```
/// # use planx_core::lookup::NoLookup;
/// # use planx_core::plan::{PlanNode, PlanNodeId, ValuesNode};
/// # use planx_core::search::PlanNodeSearcher;
/// # let plan = PlanNode::Values(ValuesNode {
/// #     id: PlanNodeId(0),
/// #     outputs: Vec::new(),
/// #     rows: Vec::new(),
/// # });
/// let found = PlanNodeSearcher::search_from(&plan, &NoLookup)
///     .matching(|node| matches!(node, PlanNode::TableScan(scan) if scan.for_delete))
///     .matches();
/// assert!(!found);
/// ```
pub struct PlanNodeSearcher<'a> {
    root: &'a PlanNode,
    lookup: &'a dyn Lookup,
    predicate: Box<dyn Fn(&PlanNode) -> bool + 'a>,
}

impl<'a> PlanNodeSearcher<'a> {
    /// Search the subtree rooted at `root`, resolving references through
    /// `lookup`. Without a [`matching`](Self::matching) predicate, every node
    /// matches.
    pub fn search_from(root: &'a PlanNode, lookup: &'a dyn Lookup) -> Self {
        Self {
            root,
            lookup,
            predicate: Box::new(|_| true),
        }
    }

    /// Restrict matches to nodes satisfying `predicate`. The predicate sees
    /// resolved nodes, never group references.
    pub fn matching(mut self, predicate: impl Fn(&PlanNode) -> bool + 'a) -> Self {
        self.predicate = Box::new(predicate);
        self
    }

    /// Whether any node in the subtree matches.
    pub fn matches(&self) -> bool {
        self.find_first().is_some()
    }

    /// The first match in depth-first pre-order, if any.
    pub fn find_first(&self) -> Option<&'a PlanNode> {
        find_recursive(self.root, self.lookup, &*self.predicate)
    }

    /// All matches in depth-first pre-order.
    pub fn find_all(&self) -> Vec<&'a PlanNode> {
        let mut found = Vec::new();
        collect_recursive(self.root, self.lookup, &*self.predicate, &mut found);
        found
    }
}

fn find_recursive<'a>(
    node: &'a PlanNode,
    lookup: &'a dyn Lookup,
    predicate: &dyn Fn(&PlanNode) -> bool,
) -> Option<&'a PlanNode> {
    let resolved = lookup.resolve(node);
    if predicate(resolved) {
        return Some(resolved);
    }
    resolved
        .sources()
        .into_iter()
        .find_map(|child| find_recursive(child, lookup, predicate))
}

fn collect_recursive<'a>(
    node: &'a PlanNode,
    lookup: &'a dyn Lookup,
    predicate: &dyn Fn(&PlanNode) -> bool,
    found: &mut Vec<&'a PlanNode>,
) {
    let resolved = lookup.resolve(node);
    if predicate(resolved) {
        found.push(resolved);
    }
    for child in resolved.sources() {
        collect_recursive(child, lookup, predicate, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Expr, Symbol};
    use crate::lookup::{NoLookup, PlanArena};
    use crate::plan::{
        FilterNode, GroupReference, PlanNodeId, TableScanNode, ValuesNode,
    };

    fn scan(id: u32, table: &str, for_delete: bool) -> PlanNode {
        PlanNode::TableScan(TableScanNode {
            id: PlanNodeId(id),
            table: table.into(),
            outputs: vec![Symbol::new("a")],
            for_delete,
        })
    }

    #[test]
    fn finds_delete_scan_under_filter() {
        let plan = PlanNode::Filter(FilterNode {
            id: PlanNodeId(10),
            source: Box::new(scan(0, "orders", true)),
            predicate: Expr::true_literal(),
        });
        let searcher = PlanNodeSearcher::search_from(&plan, &NoLookup)
            .matching(|node| matches!(node, PlanNode::TableScan(s) if s.for_delete));
        assert!(searcher.matches());
        assert_eq!(searcher.find_all().len(), 1);
    }

    #[test]
    fn no_match_without_delete_scan() {
        let plan = scan(0, "orders", false);
        assert!(!PlanNodeSearcher::search_from(&plan, &NoLookup)
            .matching(|node| matches!(node, PlanNode::TableScan(s) if s.for_delete))
            .matches());
    }

    #[test]
    fn searches_through_group_references() {
        let mut arena = PlanArena::new();
        let group = arena.insert(scan(0, "orders", true));
        let plan = PlanNode::Filter(FilterNode {
            id: PlanNodeId(10),
            source: Box::new(PlanNode::GroupReference(GroupReference {
                id: PlanNodeId(11),
                group,
                outputs: vec![Symbol::new("a")],
            })),
            predicate: Expr::true_literal(),
        });
        assert!(PlanNodeSearcher::search_from(&plan, &arena)
            .matching(|node| matches!(node, PlanNode::TableScan(s) if s.for_delete))
            .matches());
    }

    #[test]
    fn find_all_is_pre_order() {
        let inner = PlanNode::Filter(FilterNode {
            id: PlanNodeId(10),
            source: Box::new(PlanNode::Values(ValuesNode {
                id: PlanNodeId(0),
                outputs: Vec::new(),
                rows: Vec::new(),
            })),
            predicate: Expr::true_literal(),
        });
        let all = PlanNodeSearcher::search_from(&inner, &NoLookup).find_all();
        assert_eq!(all.len(), 2);
        assert!(matches!(all[0], PlanNode::Filter(_)));
        assert!(matches!(all[1], PlanNode::Values(_)));
    }
}
