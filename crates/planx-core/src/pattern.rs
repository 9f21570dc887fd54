//! # Declarative Patterns for Rewrite Rules
//!
//! Each rule declares a [`Pattern`] describing the plan shape it can rewrite.
//! The external dispatch engine checks the pattern before calling
//! [`Rule::apply`](crate::rule::Rule::apply), so rules are not invoked on
//! shapes they cannot handle.
//!
//! Child nodes are resolved through [`Lookup`] before matching, so a pattern
//! sees through group references the same way a rule does.

use crate::lookup::Lookup;
use crate::plan::{PlanNode, PlanNodeKind};

/// Pattern over plan-node shapes.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Match a node of the given kind whose children match the given child
    /// patterns, positionally.
    Node(PlanNodeKind, Vec<Pattern>),
    /// Match any subtree.
    Any,
    /// Match a node without children.
    Leaf,
}

impl Pattern {
    /// A join with two unconstrained children.
    pub fn join() -> Self {
        Pattern::Node(PlanNodeKind::Join, vec![Pattern::Any, Pattern::Any])
    }

    /// A filter with an unconstrained source.
    pub fn filter() -> Self {
        Pattern::Node(PlanNodeKind::Filter, vec![Pattern::Any])
    }

    /// A semi-join with unconstrained probe and filtering sides.
    pub fn semi_join() -> Self {
        Pattern::Node(PlanNodeKind::SemiJoin, vec![Pattern::Any, Pattern::Any])
    }

    /// A filter whose source is a semi-join.
    pub fn filter_over_semi_join() -> Self {
        Pattern::Node(PlanNodeKind::Filter, vec![Pattern::semi_join()])
    }
}

/// Check whether `node`, resolved through `lookup`, matches `pattern`.
pub fn matches(pattern: &Pattern, node: &PlanNode, lookup: &dyn Lookup) -> bool {
    match pattern {
        Pattern::Any => true,
        Pattern::Leaf => lookup.resolve(node).sources().is_empty(),
        Pattern::Node(kind, child_patterns) => {
            let resolved = lookup.resolve(node);
            if resolved.kind() != *kind {
                return false;
            }
            let children = resolved.sources();
            children.len() == child_patterns.len()
                && children
                    .iter()
                    .zip(child_patterns.iter())
                    .all(|(child, child_pattern)| matches(child_pattern, child, lookup))
        }
    }
}
