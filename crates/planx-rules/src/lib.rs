//! # planx-rules: Flattening & Rewrite Rules
//!
//! This crate builds on `planx-core` and provides:
//!
//! - **`multi_join`**: The join-graph flattener. Converts a subtree of nested
//!   binary INNER joins into a canonical [`MultiJoinNode`] — the input the
//!   cost-based join-order enumerator works from.
//! - **`semi_join_rewrite`**: `TransformFilteringSemiJoinToInnerJoin`, which
//!   turns a filtering semi-join plus its enclosing predicate into an
//!   equivalent inner join against a deduplicated probe side.
//!
//! Rules here are pure functions of their input subtree: re-applying a rule
//! to its own output when nothing further matches reports no change, which is
//! what lets the external fixpoint dispatch loop terminate.
//!
//! [`MultiJoinNode`]: multi_join::MultiJoinNode

pub mod multi_join;
pub mod semi_join_rewrite;

use planx_core::rule::Rule;

/// Default rule set handed to the dispatch engine.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(
        semi_join_rewrite::TransformFilteringSemiJoinToInnerJoin,
    )]
}
