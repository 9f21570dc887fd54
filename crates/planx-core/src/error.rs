//! Error taxonomy for plan transformation.
//!
//! Classification guidance:
//! - [`PlanError::InvalidPlan`]: the plan handed to a rule or helper violates
//!   a structural expectation that should have been established upstream
//! - [`PlanError::RuleApplication`]: a rule failed mid-application; the
//!   dispatch engine isolates it (skip + log) and continues with other rules
//! - [`PlanError::UnsupportedExpression`]: an expression shape this subsystem
//!   does not operate on
//!
//! Caller contract violations — a non-INNER root passed to the flattener, a
//! builder finalized without its required fields, a dangling group reference —
//! are panics, not errors: they are programming faults and are never recovered
//! locally.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// Structurally invalid input plan.
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    /// A rule failed while building its replacement subtree.
    #[error("rule {rule} failed: {message}")]
    RuleApplication { rule: String, message: String },

    /// Expression shape outside this subsystem's algebra.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),
}

/// Standard result alias for plan transformations.
pub type Result<T> = std::result::Result<T, PlanError>;
