//! # Rule Seam
//!
//! The trait boundary between this crate and the external rule-dispatch
//! engine. The engine walks the plan, matches each rule's [`Pattern`] against
//! candidate nodes, and calls [`Rule::apply`] on matches, re-running the whole
//! rule set until a fixpoint — no rule reports a change — is reached. That
//! loop lives outside this crate; only the seam is defined here.
//!
//! Rules are pure: they never mutate the matched subtree, and re-applying a
//! rule to its own output when no further match applies must return
//! [`RuleResult::NoChange`]. The fixpoint loop terminates because of this.

use crate::error::Result;
use crate::expr::SymbolAllocator;
use crate::lookup::Lookup;
use crate::pattern::Pattern;
use crate::plan::{PlanNode, PlanNodeIdAllocator};
use crate::session::SessionConfig;

/// Outcome of applying a rule to a matched node.
///
/// A semantic no-op — the rule matched but found nothing to do — is
/// `NoChange`, not an error.
#[derive(Debug, Clone)]
pub enum RuleResult {
    NoChange,
    /// Replacement subtree for the matched node, wholesale.
    Rewritten(PlanNode),
}

impl RuleResult {
    pub fn is_no_change(&self) -> bool {
        matches!(self, RuleResult::NoChange)
    }

    pub fn into_plan(self) -> Option<PlanNode> {
        match self {
            RuleResult::NoChange => None,
            RuleResult::Rewritten(plan) => Some(plan),
        }
    }
}

/// Per-application context handed to a rule by the dispatch engine.
///
/// Everything a rule needs is passed in per call — there is no shared mutable
/// state, which is what lets the engine optimize independent queries on
/// separate threads.
pub struct RuleContext<'a> {
    /// Resolves group references in the matched subtree.
    pub lookup: &'a dyn Lookup,
    /// Issues ids for nodes the rule creates.
    pub id_allocator: &'a mut PlanNodeIdAllocator,
    /// Issues symbols for columns the rule creates; also carries the type
    /// table.
    pub symbol_allocator: &'a mut SymbolAllocator,
    /// Session flags gating individual rules.
    pub session: &'a SessionConfig,
}

/// A rewrite rule driven by the external fixpoint engine.
pub trait Rule: Send + Sync {
    /// Unique name, used in logs when the engine isolates a failed rule.
    fn name(&self) -> &str;

    /// Shape of subtrees this rule can rewrite.
    fn pattern(&self) -> Pattern;

    /// Whether the session enables this rule. Checked before matching.
    fn is_enabled(&self, _session: &SessionConfig) -> bool {
        true
    }

    /// Apply the rule to a node the engine matched against [`Rule::pattern`].
    ///
    /// Returns the replacement subtree, or `NoChange` when a guard trips or
    /// the node offers nothing to rewrite. An `Err` aborts only this rule
    /// application; the engine logs and skips it.
    fn apply(&self, node: &PlanNode, context: &mut RuleContext<'_>) -> Result<RuleResult>;
}
