//! # Join-Graph Flattening
//!
//! Converts a subtree of nested binary INNER joins into one canonical
//! multi-way join value: the flattened sources, a single combined predicate,
//! and the root's ordered output columns. The cost-based join-order
//! enumerator consumes this value to pick a physical join order; producing
//! the canonical input is this module's whole job, choosing the order is not.
//!
//! ## Canonical equality
//!
//! [`MultiJoinNode`] equality is deliberately asymmetric:
//!
//! - `sources` compare as a **set** — the enumerator is free to reorder them
//! - `filter` compares as the **set of its conjuncts** — conjunct order is an
//!   artifact of traversal order, not a contract
//! - `outputs` compare as an **ordered sequence** — column order is visible
//!   to the consumer and must survive
//!
//! ## Boundaries
//!
//! Flattening recurses only into INNER joins with deterministic residual
//! filters, and only while the source limit leaves room for both children of
//! the next join. Everything else — outer joins, non-join nodes, subtrees
//! past the limit — is kept as one opaque source, unexamined. The limit is
//! checked before recursing, so reaching it mid-traversal freezes whichever
//! subtree is being visited; the truncation is asymmetric and order-dependent
//! by design, and never raises.

use planx_core::expr::{Expr, Symbol};
use planx_core::lookup::Lookup;
use planx_core::plan::{JoinNode, JoinType, PlanNode};
use planx_core::predicates::{and, extract_conjuncts, DeterminismEvaluator};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Canonical multi-way join: flattened sources, one combined filter, ordered
/// outputs.
///
/// Built fresh inside one [`to_multi_join_node`] call, consumed immediately
/// by the caller, never mutated afterwards, never persisted.
#[derive(Debug, Clone)]
pub struct MultiJoinNode {
    /// Insertion-ordered; compares as a set.
    sources: Vec<PlanNode>,
    /// Conjunction; compares as the set of its conjuncts.
    filter: Expr,
    /// Compares as an ordered sequence.
    outputs: Vec<Symbol>,
}

impl MultiJoinNode {
    pub fn builder() -> MultiJoinNodeBuilder {
        MultiJoinNodeBuilder::default()
    }

    pub fn sources(&self) -> &[PlanNode] {
        &self.sources
    }

    pub fn filter(&self) -> &Expr {
        &self.filter
    }

    pub fn outputs(&self) -> &[Symbol] {
        &self.outputs
    }
}

impl PartialEq for MultiJoinNode {
    fn eq(&self, other: &Self) -> bool {
        let sources: HashSet<&PlanNode> = self.sources.iter().collect();
        let other_sources: HashSet<&PlanNode> = other.sources.iter().collect();
        let conjuncts: HashSet<&Expr> = extract_conjuncts(&self.filter).into_iter().collect();
        let other_conjuncts: HashSet<&Expr> =
            extract_conjuncts(&other.filter).into_iter().collect();
        sources == other_sources
            && conjuncts == other_conjuncts
            && self.outputs == other.outputs
    }
}

impl Eq for MultiJoinNode {}

/// Staged builder for [`MultiJoinNode`].
#[derive(Debug, Default)]
pub struct MultiJoinNodeBuilder {
    sources: Vec<PlanNode>,
    filter: Option<Expr>,
    outputs: Option<Vec<Symbol>>,
}

impl MultiJoinNodeBuilder {
    pub fn set_sources(mut self, sources: impl IntoIterator<Item = PlanNode>) -> Self {
        self.sources = sources.into_iter().collect();
        self
    }

    pub fn set_filter(mut self, filter: Expr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn set_outputs(mut self, outputs: impl IntoIterator<Item = Symbol>) -> Self {
        self.outputs = Some(outputs.into_iter().collect());
        self
    }

    /// Finalize. An unset filter defaults to the constant `TRUE`.
    ///
    /// # Panics
    ///
    /// Panics if no sources were set or outputs are unset — finalizing an
    /// incomplete builder is a caller contract violation.
    pub fn build(self) -> MultiJoinNode {
        assert!(
            !self.sources.is_empty(),
            "multi-join requires at least one source"
        );
        let Some(outputs) = self.outputs else {
            panic!("multi-join outputs must be set");
        };
        MultiJoinNode {
            sources: self.sources,
            filter: self.filter.unwrap_or_else(Expr::true_literal),
            outputs,
        }
    }
}

/// Flatten the inner-join tree rooted at `root` into a [`MultiJoinNode`] with
/// at most `join_limit` sources.
///
/// `root`'s declared output list becomes the result's outputs unchanged —
/// upstream column-pruning decisions are preserved, never recomputed from the
/// visited leaves. Children are resolved through `lookup`, but the nodes
/// recorded as sources are the original, unresolved ones, so group references
/// survive into the result.
///
/// # Panics
///
/// Panics if `root` is not an INNER join or `join_limit < 2` — both are
/// caller contract violations, never silently degraded.
pub fn to_multi_join_node(
    root: &JoinNode,
    lookup: &dyn Lookup,
    join_limit: usize,
    determinism: &dyn DeterminismEvaluator,
) -> MultiJoinNode {
    assert!(
        root.join_type == JoinType::Inner,
        "join type must be INNER, got {}",
        root.join_type
    );
    assert!(join_limit >= 2, "join limit must be at least 2, got {join_limit}");

    let mut flattener = JoinNodeFlattener {
        lookup,
        determinism,
        sources: Vec::new(),
        filters: Vec::new(),
    };
    if flattener.has_deterministic_filter(root) {
        flattener.flatten_join(root, join_limit);
    } else {
        // A non-deterministic root filter pins the whole tree: it becomes the
        // single opaque source and contributes no conjuncts.
        flattener.sources.push(PlanNode::Join(root.clone()));
    }
    debug!(
        sources = flattener.sources.len(),
        conjuncts = flattener.filters.len(),
        "flattened join tree"
    );
    MultiJoinNode::builder()
        .set_sources(flattener.sources)
        .set_filter(and(flattener.filters))
        .set_outputs(root.outputs.iter().cloned())
        .build()
}

struct JoinNodeFlattener<'a> {
    lookup: &'a dyn Lookup,
    determinism: &'a dyn DeterminismEvaluator,
    sources: Vec<PlanNode>,
    filters: Vec<Expr>,
}

impl JoinNodeFlattener<'_> {
    fn flatten_node(&mut self, node: &PlanNode, limit: usize) {
        let resolved = self.lookup.resolve(node);
        let PlanNode::Join(join) = resolved else {
            self.sources.push(node.clone());
            return;
        };
        // Recursing adds both children, so stop unless there is room for two
        // more sources.
        if self.sources.len() + 1 >= limit {
            trace!(node = %node.id(), "join limit reached, keeping subtree opaque");
            self.sources.push(node.clone());
            return;
        }
        if join.join_type != JoinType::Inner || !self.has_deterministic_filter(join) {
            self.sources.push(node.clone());
            return;
        }
        self.flatten_join(join, limit);
    }

    fn flatten_join(&mut self, join: &JoinNode, limit: usize) {
        // The left child is visited with one slot reserved for the right.
        self.flatten_node(&join.left, limit - 1);
        self.flatten_node(&join.right, limit);
        for clause in &join.criteria {
            self.filters.push(clause.to_expression());
        }
        if let Some(filter) = &join.filter {
            self.filters.push(filter.clone());
        }
    }

    fn has_deterministic_filter(&self, join: &JoinNode) -> bool {
        join.filter
            .as_ref()
            .map_or(true, |filter| self.determinism.is_deterministic(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planx_core::plan::{PlanNodeId, ValuesNode};

    fn values(id: u32, names: &[&str]) -> PlanNode {
        PlanNode::Values(ValuesNode {
            id: PlanNodeId(id),
            outputs: names.iter().map(|name| Symbol::new(*name)).collect(),
            rows: Vec::new(),
        })
    }

    fn eq_conjunct(left: &str, right: &str) -> Expr {
        Expr::equals(
            Expr::variable(&Symbol::new(left)),
            Expr::variable(&Symbol::new(right)),
        )
    }

    #[test]
    fn equality_ignores_source_and_conjunct_order() {
        let a = values(0, &["a"]);
        let b = values(1, &["b"]);
        let left = MultiJoinNode::builder()
            .set_sources([a.clone(), b.clone()])
            .set_filter(and(vec![eq_conjunct("a", "b"), eq_conjunct("b", "c")]))
            .set_outputs([Symbol::new("a"), Symbol::new("b")])
            .build();
        let right = MultiJoinNode::builder()
            .set_sources([b, a])
            .set_filter(and(vec![eq_conjunct("b", "c"), eq_conjunct("a", "b")]))
            .set_outputs([Symbol::new("a"), Symbol::new("b")])
            .build();
        assert_eq!(left, right);
    }

    #[test]
    fn equality_respects_output_order() {
        let a = values(0, &["a"]);
        let left = MultiJoinNode::builder()
            .set_sources([a.clone()])
            .set_outputs([Symbol::new("a"), Symbol::new("b")])
            .build();
        let right = MultiJoinNode::builder()
            .set_sources([a])
            .set_outputs([Symbol::new("b"), Symbol::new("a")])
            .build();
        assert_ne!(left, right);
    }

    #[test]
    fn equality_distinguishes_conjunct_membership() {
        let a = values(0, &["a"]);
        let left = MultiJoinNode::builder()
            .set_sources([a.clone()])
            .set_filter(eq_conjunct("a", "b"))
            .set_outputs([Symbol::new("a")])
            .build();
        let right = MultiJoinNode::builder()
            .set_sources([a])
            .set_filter(eq_conjunct("a", "c"))
            .set_outputs([Symbol::new("a")])
            .build();
        assert_ne!(left, right);
    }

    #[test]
    fn unset_filter_defaults_to_true() {
        let built = MultiJoinNode::builder()
            .set_sources([values(0, &["a"])])
            .set_outputs([Symbol::new("a")])
            .build();
        assert!(built.filter().is_true());
    }

    #[test]
    #[should_panic(expected = "at least one source")]
    fn build_rejects_empty_sources() {
        MultiJoinNode::builder()
            .set_outputs([Symbol::new("a")])
            .build();
    }

    #[test]
    #[should_panic(expected = "outputs must be set")]
    fn build_rejects_unset_outputs() {
        MultiJoinNode::builder()
            .set_sources([values(0, &["a"])])
            .build();
    }
}
