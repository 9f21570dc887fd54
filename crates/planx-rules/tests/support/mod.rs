//! Shared plan-construction helpers for integration tests.

#![allow(dead_code)]

use planx_core::expr::{Expr, Symbol, SymbolAllocator, Type};
use planx_core::plan::{
    AggregationNode, EquiJoinClause, FilterNode, JoinNode, JoinType, PlanNode,
    PlanNodeIdAllocator, ProjectNode, SemiJoinNode, TableScanNode, ValuesNode,
};

/// Builds plan fragments with allocator-issued ids, in the shape the external
/// planner would hand to a rule.
pub struct PlanBuilder {
    pub id_allocator: PlanNodeIdAllocator,
    pub symbol_allocator: SymbolAllocator,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self {
            id_allocator: PlanNodeIdAllocator::new(),
            symbol_allocator: SymbolAllocator::new(),
        }
    }

    pub fn symbol(&mut self, name: &str) -> Symbol {
        self.symbol_allocator.declare(name, Type::Bigint)
    }

    pub fn boolean_symbol(&mut self, name: &str) -> Symbol {
        self.symbol_allocator.declare(name, Type::Boolean)
    }

    pub fn values(&mut self, outputs: Vec<Symbol>) -> PlanNode {
        PlanNode::Values(ValuesNode {
            id: self.id_allocator.next_id(),
            outputs,
            rows: Vec::new(),
        })
    }

    pub fn table_scan(&mut self, table: &str, outputs: Vec<Symbol>) -> PlanNode {
        self.scan(table, outputs, false)
    }

    pub fn table_scan_for_delete(&mut self, table: &str, outputs: Vec<Symbol>) -> PlanNode {
        self.scan(table, outputs, true)
    }

    fn scan(&mut self, table: &str, outputs: Vec<Symbol>, for_delete: bool) -> PlanNode {
        PlanNode::TableScan(TableScanNode {
            id: self.id_allocator.next_id(),
            table: table.into(),
            outputs,
            for_delete,
        })
    }

    pub fn join(
        &mut self,
        join_type: JoinType,
        left: PlanNode,
        right: PlanNode,
        criteria: Vec<EquiJoinClause>,
        outputs: Vec<Symbol>,
        filter: Option<Expr>,
    ) -> PlanNode {
        PlanNode::Join(JoinNode {
            id: self.id_allocator.next_id(),
            join_type,
            left: Box::new(left),
            right: Box::new(right),
            criteria,
            outputs,
            filter,
        })
    }

    pub fn filter(&mut self, source: PlanNode, predicate: Expr) -> PlanNode {
        PlanNode::Filter(FilterNode {
            id: self.id_allocator.next_id(),
            source: Box::new(source),
            predicate,
        })
    }

    pub fn project(
        &mut self,
        source: PlanNode,
        assignments: planx_core::plan::Assignments,
    ) -> PlanNode {
        PlanNode::Project(ProjectNode {
            id: self.id_allocator.next_id(),
            source: Box::new(source),
            assignments,
        })
    }

    pub fn distinct(&mut self, source: PlanNode, grouping_keys: Vec<Symbol>) -> PlanNode {
        PlanNode::Aggregation(AggregationNode {
            id: self.id_allocator.next_id(),
            source: Box::new(source),
            aggregations: Vec::new(),
            grouping_keys,
        })
    }

    pub fn semi_join(
        &mut self,
        source: PlanNode,
        filtering_source: PlanNode,
        source_join_symbol: Symbol,
        filtering_source_join_symbol: Symbol,
        semi_join_output: Symbol,
    ) -> PlanNode {
        PlanNode::SemiJoin(SemiJoinNode {
            id: self.id_allocator.next_id(),
            source: Box::new(source),
            filtering_source: Box::new(filtering_source),
            source_join_symbol,
            filtering_source_join_symbol,
            semi_join_output,
        })
    }
}

pub fn equi(left: &Symbol, right: &Symbol) -> EquiJoinClause {
    EquiJoinClause::new(left.clone(), right.clone())
}

/// The equality expression an equi-join clause flattens into.
pub fn equals(left: &Symbol, right: &Symbol) -> Expr {
    Expr::equals(Expr::variable(left), Expr::variable(right))
}

/// Unwrap a `PlanNode::Join`, panicking with context otherwise.
pub fn expect_join(node: &PlanNode) -> &JoinNode {
    match node {
        PlanNode::Join(join) => join,
        other => panic!("expected a join, got:\n{}", other.display(0)),
    }
}
