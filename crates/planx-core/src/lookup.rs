//! # Group References and the Plan Arena
//!
//! The external rule-dispatch engine stores plan subtrees in id-indexed
//! groups and splices [`PlanNode::GroupReference`] leaves into the trees it
//! hands to rules. [`Lookup`] is the indirection that resolves such a
//! reference to the group's current concrete subtree.
//!
//! Resolution is an explicit id-indexed lookup over an arena of plan nodes —
//! there is no mutable object graph to chase, so structural sharing stays
//! cheap and aliasing cannot occur.

use crate::plan::{GroupId, PlanNode};

/// Indirection resolving a logical group reference to its current concrete
/// subtree. Any node that is not a reference resolves to itself.
pub trait Lookup {
    fn resolve<'a>(&'a self, node: &'a PlanNode) -> &'a PlanNode;
}

/// Lookup for plans that contain no group references.
///
/// # Panics
///
/// `resolve` panics when handed a [`PlanNode::GroupReference`]: using this
/// lookup on a plan with unresolved references is a caller contract violation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl Lookup for NoLookup {
    fn resolve<'a>(&'a self, node: &'a PlanNode) -> &'a PlanNode {
        match node {
            PlanNode::GroupReference(reference) => {
                panic!("unexpected group reference to group {}", reference.group)
            }
            other => other,
        }
    }
}

/// Id-indexed arena of plan groups.
///
/// Each group holds the current concrete subtree for one logical reference.
/// Groups are append-only within one optimization pass; a reference stays
/// valid for the arena's lifetime.
#[derive(Debug, Clone, Default)]
pub struct PlanArena {
    groups: Vec<PlanNode>,
}

impl PlanArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a subtree as a new group and return its id.
    pub fn insert(&mut self, node: PlanNode) -> GroupId {
        let id = GroupId(self.groups.len() as u32);
        self.groups.push(node);
        id
    }

    /// The subtree currently held by `id`.
    ///
    /// # Panics
    ///
    /// Panics on a dangling group id.
    pub fn group(&self, id: GroupId) -> &PlanNode {
        self.groups
            .get(id.0 as usize)
            .unwrap_or_else(|| panic!("no group {id} in plan arena"))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Lookup for PlanArena {
    fn resolve<'a>(&'a self, node: &'a PlanNode) -> &'a PlanNode {
        let mut current = node;
        while let PlanNode::GroupReference(reference) = current {
            current = self.group(reference.group);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Symbol;
    use crate::plan::{GroupReference, PlanNodeId, ValuesNode};

    fn values(id: u32, name: &str) -> PlanNode {
        PlanNode::Values(ValuesNode {
            id: PlanNodeId(id),
            outputs: vec![Symbol::new(name)],
            rows: Vec::new(),
        })
    }

    #[test]
    fn arena_resolves_references_transitively() {
        let mut arena = PlanArena::new();
        let leaf = arena.insert(values(0, "a"));
        let via = arena.insert(PlanNode::GroupReference(GroupReference {
            id: PlanNodeId(1),
            group: leaf,
            outputs: vec![Symbol::new("a")],
        }));
        let reference = PlanNode::GroupReference(GroupReference {
            id: PlanNodeId(2),
            group: via,
            outputs: vec![Symbol::new("a")],
        });
        assert_eq!(arena.resolve(&reference), &values(0, "a"));
    }

    #[test]
    fn arena_resolve_of_concrete_node_is_identity() {
        let arena = PlanArena::new();
        let node = values(0, "a");
        assert_eq!(arena.resolve(&node), &node);
    }

    #[test]
    #[should_panic(expected = "unexpected group reference")]
    fn no_lookup_rejects_references() {
        let reference = PlanNode::GroupReference(GroupReference {
            id: PlanNodeId(0),
            group: GroupId(0),
            outputs: Vec::new(),
        });
        NoLookup.resolve(&reference);
    }
}
