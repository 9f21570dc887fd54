//! # Session Configuration
//!
//! Named per-session knobs consulted by rewrite rules. The external dispatch
//! engine owns a `SessionConfig` per query and passes it to
//! [`Rule::is_enabled`](crate::rule::Rule::is_enabled) before attempting a
//! match.

use serde::{Deserialize, Serialize};

/// Session-scoped optimizer flags and limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Enables rewriting a filtering semi-join into an inner join against a
    /// deduplicated probe side.
    pub rewrite_filtering_semi_join_to_inner_join: bool,
    /// Upper bound on the number of sources a flattened multi-way join may
    /// expose; the flattener keeps any excess subtree opaque.
    pub max_reordered_joins: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rewrite_filtering_semi_join_to_inner_join: false,
            max_reordered_joins: 9,
        }
    }
}
