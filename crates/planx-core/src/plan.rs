//! # Logical Plan Nodes
//!
//! The logical plan is an immutable tree of [`PlanNode`] values. A rewrite
//! never mutates a node in place: a "change" is always a freshly built
//! replacement subtree sharing untouched children.
//!
//! Heterogeneous node kinds are a single tagged union matched exhaustively
//! wherever a rule inspects the plan. Any kind a rule does not explicitly
//! handle falls through to an "opaque subtree" default — that default is a
//! contract, and new node kinds added here must keep it intact.
//!
//! Indirection into a [`PlanArena`](crate::lookup::PlanArena) is itself a node
//! kind ([`PlanNode::GroupReference`]), resolved through
//! [`Lookup`](crate::lookup::Lookup) before inspection.

use crate::expr::{Expr, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a plan node, issued by a [`PlanNodeIdAllocator`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlanNodeId(pub u32);

impl fmt::Display for PlanNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues sequential plan-node ids. One allocator per optimized plan.
#[derive(Debug, Clone, Default)]
pub struct PlanNodeIdAllocator {
    next: u32,
}

impl PlanNodeIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> PlanNodeId {
        let id = PlanNodeId(self.next);
        self.next += 1;
        id
    }
}

/// Identifier of a group in a [`PlanArena`](crate::lookup::PlanArena).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// SQL join variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL",
        };
        write!(f, "{name}")
    }
}

/// A pair of symbols asserted equal as a join condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EquiJoinClause {
    pub left: Symbol,
    pub right: Symbol,
}

impl EquiJoinClause {
    pub fn new(left: Symbol, right: Symbol) -> Self {
        Self { left, right }
    }

    pub fn flip(&self) -> EquiJoinClause {
        EquiJoinClause {
            left: self.right.clone(),
            right: self.left.clone(),
        }
    }

    /// Render this clause as the equality expression `left = right`.
    pub fn to_expression(&self) -> Expr {
        Expr::equals(Expr::variable(&self.left), Expr::variable(&self.right))
    }
}

impl fmt::Display for EquiJoinClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.left, self.right)
    }
}

/// Insertion-ordered symbol-to-expression bindings of a projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Assignments {
    entries: Vec<(Symbol, Expr)>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind each symbol to a reference to itself.
    pub fn identity(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let mut assignments = Self::new();
        for symbol in symbols {
            let expr = Expr::variable(&symbol);
            assignments.put(symbol, expr);
        }
        assignments
    }

    /// Bind `symbol` to `expr`, replacing any existing binding for it.
    pub fn put(&mut self, symbol: Symbol, expr: Expr) {
        if let Some(entry) = self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            entry.1 = expr;
        } else {
            self.entries.push((symbol, expr));
        }
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Expr> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, e)| e)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter().map(|(s, _)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Expr)> {
        self.entries.iter().map(|(s, e)| (s, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Leaf scan of a base table. `for_delete` marks a scan whose rows feed a
/// DELETE statement and must keep their identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableScanNode {
    pub id: PlanNodeId,
    pub table: String,
    pub outputs: Vec<Symbol>,
    pub for_delete: bool,
}

/// Leaf literal rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValuesNode {
    pub id: PlanNodeId,
    pub outputs: Vec<Symbol>,
    pub rows: Vec<Vec<Expr>>,
}

/// Binary join. `criteria` holds the equi-join clauses; `filter` is the
/// residual non-equi condition, if any. `outputs` is the declared output
/// column list — it reflects upstream pruning decisions and is never
/// recomputed from the children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinNode {
    pub id: PlanNodeId,
    pub join_type: JoinType,
    pub left: Box<PlanNode>,
    pub right: Box<PlanNode>,
    pub criteria: Vec<EquiJoinClause>,
    pub outputs: Vec<Symbol>,
    pub filter: Option<Expr>,
}

/// Predicate applied to a single source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterNode {
    pub id: PlanNodeId,
    pub source: Box<PlanNode>,
    pub predicate: Expr,
}

/// Projection computing `assignments` over its source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectNode {
    pub id: PlanNodeId,
    pub source: Box<PlanNode>,
    pub assignments: Assignments,
}

/// Grouped aggregation. An empty `aggregations` list with non-empty grouping
/// keys is a pure DISTINCT over those keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregationNode {
    pub id: PlanNodeId,
    pub source: Box<PlanNode>,
    /// Output symbol and aggregate call, in output order.
    pub aggregations: Vec<(Symbol, Expr)>,
    pub grouping_keys: Vec<Symbol>,
}

impl AggregationNode {
    pub fn is_distinct(&self) -> bool {
        self.aggregations.is_empty()
    }
}

/// Semi-join: emits the probe side (`source`) plus one boolean column
/// (`semi_join_output`) indicating whether `source_join_symbol` has a match
/// among the filtering side's `filtering_source_join_symbol` values. Never
/// multiplies rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemiJoinNode {
    pub id: PlanNodeId,
    pub source: Box<PlanNode>,
    pub filtering_source: Box<PlanNode>,
    pub source_join_symbol: Symbol,
    pub filtering_source_join_symbol: Symbol,
    pub semi_join_output: Symbol,
}

/// Reference to a group in a [`PlanArena`](crate::lookup::PlanArena). Carries
/// the group's output columns so that output resolution does not require the
/// arena.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupReference {
    pub id: PlanNodeId,
    pub group: GroupId,
    pub outputs: Vec<Symbol>,
}

/// Polymorphic node of a logical plan tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanNode {
    TableScan(TableScanNode),
    Values(ValuesNode),
    Join(JoinNode),
    Filter(FilterNode),
    Project(ProjectNode),
    Aggregation(AggregationNode),
    SemiJoin(SemiJoinNode),
    GroupReference(GroupReference),
}

/// Kind discriminant for pattern matching (without data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanNodeKind {
    TableScan,
    Values,
    Join,
    Filter,
    Project,
    Aggregation,
    SemiJoin,
    GroupReference,
}

impl PlanNode {
    pub fn id(&self) -> PlanNodeId {
        match self {
            PlanNode::TableScan(node) => node.id,
            PlanNode::Values(node) => node.id,
            PlanNode::Join(node) => node.id,
            PlanNode::Filter(node) => node.id,
            PlanNode::Project(node) => node.id,
            PlanNode::Aggregation(node) => node.id,
            PlanNode::SemiJoin(node) => node.id,
            PlanNode::GroupReference(node) => node.id,
        }
    }

    pub fn kind(&self) -> PlanNodeKind {
        match self {
            PlanNode::TableScan(_) => PlanNodeKind::TableScan,
            PlanNode::Values(_) => PlanNodeKind::Values,
            PlanNode::Join(_) => PlanNodeKind::Join,
            PlanNode::Filter(_) => PlanNodeKind::Filter,
            PlanNode::Project(_) => PlanNodeKind::Project,
            PlanNode::Aggregation(_) => PlanNodeKind::Aggregation,
            PlanNode::SemiJoin(_) => PlanNodeKind::SemiJoin,
            PlanNode::GroupReference(_) => PlanNodeKind::GroupReference,
        }
    }

    /// Immediate children in plan order. Group references are leaves here;
    /// resolving them is the caller's job.
    pub fn sources(&self) -> Vec<&PlanNode> {
        match self {
            PlanNode::TableScan(_) | PlanNode::Values(_) | PlanNode::GroupReference(_) => {
                Vec::new()
            }
            PlanNode::Join(node) => vec![&node.left, &node.right],
            PlanNode::Filter(node) => vec![&node.source],
            PlanNode::Project(node) => vec![&node.source],
            PlanNode::Aggregation(node) => vec![&node.source],
            PlanNode::SemiJoin(node) => vec![&node.source, &node.filtering_source],
        }
    }

    /// Declared output columns, in order.
    pub fn output_symbols(&self) -> Vec<Symbol> {
        match self {
            PlanNode::TableScan(node) => node.outputs.clone(),
            PlanNode::Values(node) => node.outputs.clone(),
            PlanNode::Join(node) => node.outputs.clone(),
            PlanNode::Filter(node) => node.source.output_symbols(),
            PlanNode::Project(node) => node.assignments.symbols().cloned().collect(),
            PlanNode::Aggregation(node) => {
                let mut outputs = node.grouping_keys.clone();
                outputs.extend(node.aggregations.iter().map(|(symbol, _)| symbol.clone()));
                outputs
            }
            PlanNode::SemiJoin(node) => {
                let mut outputs = node.source.output_symbols();
                outputs.push(node.semi_join_output.clone());
                outputs
            }
            PlanNode::GroupReference(node) => node.outputs.clone(),
        }
    }

    /// Indented textual rendering for logs and test output.
    pub fn display(&self, indent: usize) -> String {
        let pad = "  ".repeat(indent);
        let mut out = match self {
            PlanNode::TableScan(node) => {
                let marker = if node.for_delete { " for-delete" } else { "" };
                format!("{pad}TableScan[{}]{marker}\n", node.table)
            }
            PlanNode::Values(node) => {
                format!("{pad}Values[{}]\n", join_symbols(&node.outputs))
            }
            PlanNode::Join(node) => {
                let criteria = node
                    .criteria
                    .iter()
                    .map(|clause| clause.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                let filter = match &node.filter {
                    Some(expr) => format!(" filter={expr}"),
                    None => String::new(),
                };
                format!("{pad}Join[{}] criteria=({criteria}){filter}\n", node.join_type)
            }
            PlanNode::Filter(node) => format!("{pad}Filter[{}]\n", node.predicate),
            PlanNode::Project(node) => {
                let bindings = node
                    .assignments
                    .iter()
                    .map(|(symbol, expr)| format!("{symbol} := {expr}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{pad}Project[{bindings}]\n")
            }
            PlanNode::Aggregation(node) => {
                let label = if node.is_distinct() { "distinct" } else { "aggregate" };
                format!(
                    "{pad}Aggregation[{label} by {}]\n",
                    join_symbols(&node.grouping_keys)
                )
            }
            PlanNode::SemiJoin(node) => format!(
                "{pad}SemiJoin[{} IN {} -> {}]\n",
                node.source_join_symbol, node.filtering_source_join_symbol, node.semi_join_output
            ),
            PlanNode::GroupReference(node) => format!("{pad}GroupReference[{}]\n", node.group),
        };
        for child in self.sources() {
            out.push_str(&child.display(indent + 1));
        }
        out
    }
}

fn join_symbols(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(Symbol::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
