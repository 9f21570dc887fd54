//! # Filtering Semi-Join to Inner Join
//!
//! Transforms:
//!
//! ```text
//! Filter (semi_output AND predicate)
//!   SemiJoin (semi_output <- a IN b)
//!     source:           plan producing a
//!     filtering source: plan producing b
//! ```
//!
//! into:
//!
//! ```text
//! Project (semi_output <- TRUE)
//!   Join[INNER] on a = b, filter: predicate with semi_output replaced by TRUE
//!     source
//!     Aggregation distinct(b)
//! ```
//!
//! The distinct aggregation over the filtering side keeps the inner join from
//! multiplying probe rows, and the wrapping projection restores the
//! semi-join's output symbol — constant `TRUE` for every surviving row — for
//! downstream consumers that still reference it. Same rows, same columns.

use planx_core::error::Result;
use planx_core::expr::Expr;
use planx_core::pattern::Pattern;
use planx_core::plan::{
    AggregationNode, Assignments, EquiJoinClause, JoinNode, JoinType, PlanNode, ProjectNode,
};
use planx_core::predicates::{and, extract_conjuncts, inline_variables};
use planx_core::rule::{Rule, RuleContext, RuleResult};
use planx_core::search::PlanNodeSearcher;
use planx_core::session::SessionConfig;
use tracing::trace;

/// Rewrites a filtering semi-join into an inner join against a deduplicated
/// probe side. Gated by
/// [`SessionConfig::rewrite_filtering_semi_join_to_inner_join`].
pub struct TransformFilteringSemiJoinToInnerJoin;

impl Rule for TransformFilteringSemiJoinToInnerJoin {
    fn name(&self) -> &str {
        "TransformFilteringSemiJoinToInnerJoin"
    }

    fn pattern(&self) -> Pattern {
        Pattern::filter_over_semi_join()
    }

    fn is_enabled(&self, session: &SessionConfig) -> bool {
        session.rewrite_filtering_semi_join_to_inner_join
    }

    fn apply(&self, node: &PlanNode, context: &mut RuleContext<'_>) -> Result<RuleResult> {
        let lookup = context.lookup;
        let PlanNode::Filter(filter) = lookup.resolve(node) else {
            return Ok(RuleResult::NoChange);
        };
        let PlanNode::SemiJoin(semi_join) = lookup.resolve(&filter.source) else {
            return Ok(RuleResult::NoChange);
        };

        // Do not transform a semi-join in the context of a DELETE: the
        // rewritten join no longer carries the scanned rows' identity.
        if PlanNodeSearcher::search_from(&semi_join.source, lookup)
            .matching(|n| matches!(n, PlanNode::TableScan(scan) if scan.for_delete))
            .matches()
        {
            return Ok(RuleResult::NoChange);
        }

        let semi_join_reference = Expr::variable(&semi_join.semi_join_output);
        let conjuncts = extract_conjuncts(&filter.predicate);
        if !conjuncts.iter().any(|c| **c == semi_join_reference) {
            return Ok(RuleResult::NoChange);
        }

        let filtered_predicate = and(conjuncts
            .into_iter()
            .filter(|c| **c != semi_join_reference)
            .cloned()
            .collect());

        // The symbol may also occur nested inside a larger boolean
        // expression, not only as a bare conjunct.
        let semi_join_output = semi_join.semi_join_output.clone();
        let simplified_predicate = inline_variables(
            |variable| {
                if *variable == semi_join_output {
                    Expr::true_literal()
                } else {
                    Expr::variable(variable)
                }
            },
            &filtered_predicate,
        );

        let join_filter = if simplified_predicate.is_true() {
            None
        } else {
            Some(simplified_predicate)
        };

        let filtering_source_distinct = AggregationNode {
            id: context.id_allocator.next_id(),
            source: semi_join.filtering_source.clone(),
            aggregations: Vec::new(),
            grouping_keys: vec![semi_join.filtering_source_join_symbol.clone()],
        };

        let outputs = semi_join.source.output_symbols();
        let inner_join = JoinNode {
            id: semi_join.id,
            join_type: JoinType::Inner,
            left: semi_join.source.clone(),
            right: Box::new(PlanNode::Aggregation(filtering_source_distinct)),
            criteria: vec![EquiJoinClause::new(
                semi_join.source_join_symbol.clone(),
                semi_join.filtering_source_join_symbol.clone(),
            )],
            outputs: outputs.clone(),
            filter: join_filter,
        };

        let mut assignments = Assignments::identity(outputs);
        assignments.put(semi_join.semi_join_output.clone(), Expr::true_literal());

        let project = ProjectNode {
            id: context.id_allocator.next_id(),
            source: Box::new(PlanNode::Join(inner_join)),
            assignments,
        };
        trace!(filter = %filter.id, "rewrote filtering semi-join to inner join");
        Ok(RuleResult::Rewritten(PlanNode::Project(project)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_metadata() {
        let rule = TransformFilteringSemiJoinToInnerJoin;
        assert_eq!(rule.name(), "TransformFilteringSemiJoinToInnerJoin");
        assert!(!rule.is_enabled(&SessionConfig::default()));
        let mut session = SessionConfig::default();
        session.rewrite_filtering_semi_join_to_inner_join = true;
        assert!(rule.is_enabled(&session));
    }
}
