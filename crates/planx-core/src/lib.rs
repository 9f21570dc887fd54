//! # planx-core: Logical Plan & Rule Infrastructure
//!
//! This crate holds the shared infrastructure of the planx query optimizer:
//! the immutable logical plan representation, the predicate algebra used to
//! manipulate boolean filter expressions, and the seams through which the
//! external rule-dispatch engine drives rewrite rules.
//!
//! ## Module Overview
//!
//! - **`expr`**: Symbols, types, and the scalar expression tree.
//! - **`plan`**: The `PlanNode` tagged union and its supporting value types.
//! - **`predicates`**: Conjunct splitting/recombination and variable inlining.
//! - **`lookup`**: Group references and the id-indexed plan arena.
//! - **`pattern`**: Declarative shape patterns rules declare to the engine.
//! - **`rule`**: The `Rule` trait, rule context, and rule results.
//! - **`search`**: Fluent subtree search used by rule guards.
//! - **`session`**: Named per-session optimizer flags.
//! - **`error`**: Error taxonomy shared by rule applications.
//!
//! Everything here is single-threaded and purely functional over immutable
//! input; allocators and lookups are passed in per call, so independent
//! queries can be optimized concurrently without shared state.

pub mod error;
pub mod expr;
pub mod lookup;
pub mod pattern;
pub mod plan;
pub mod predicates;
pub mod rule;
pub mod search;
pub mod session;
