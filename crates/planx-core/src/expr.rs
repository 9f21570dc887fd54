//! # Symbols, Types, and Scalar Expressions
//!
//! This module defines the value layer of the plan representation:
//!
//! ## Symbols (`Symbol`)
//! A symbol is a name-identified column reference scoped to a single plan.
//! Symbols carry no type; their SQL types live in the external [`TypeProvider`]
//! table so that expression equality stays purely name-based.
//!
//! ## Scalar Expressions (`Expr`)
//! Scalar expressions represent computations on individual rows: variable
//! references, literal constants, function calls, and the boolean special
//! forms (AND/OR). They appear inside filter predicates, join conditions, and
//! projection assignments. Expressions are immutable values with structural
//! equality — rewrite rules never mutate an expression, they build a new one.
//!
//! ## Allocation (`SymbolAllocator`)
//! Fresh symbols are issued by a `SymbolAllocator`, which also records the
//! declared type of every symbol it has seen. Each query optimization owns its
//! own allocator; nothing here is shared across plans.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A name-identified column reference, scoped to one plan.
///
/// Equality is by name only. The symbol's SQL type is resolved through the
/// [`TypeProvider`] of the owning plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SQL types known to the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Boolean,
    Bigint,
    Double,
    Varchar,
    Date,
}

/// External type table resolving symbols to their SQL types.
///
/// Kept outside the expression tree on purpose: variable references compare by
/// name, and the type of a symbol is a property of the plan, not of any single
/// reference to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeProvider {
    types: HashMap<Symbol, Type>,
}

impl TypeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, symbol: Symbol, ty: Type) {
        self.types.insert(symbol, ty);
    }

    pub fn get(&self, symbol: &Symbol) -> Option<Type> {
        self.types.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.types.contains_key(symbol)
    }
}

/// Issues fresh, uniquely named symbols and records their types.
///
/// Each optimization run owns one allocator; rules receive it through the
/// rule context and never share it across plans.
#[derive(Debug, Clone, Default)]
pub struct SymbolAllocator {
    types: TypeProvider,
}

impl SymbolAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a symbol under a caller-chosen name, e.g. when translating an
    /// incoming plan whose column names are fixed.
    pub fn declare(&mut self, name: impl Into<String>, ty: Type) -> Symbol {
        let symbol = Symbol::new(name);
        self.types.put(symbol.clone(), ty);
        symbol
    }

    /// Allocate a fresh symbol named after `hint`, suffixing a counter until
    /// the name is unused.
    pub fn new_symbol(&mut self, hint: &str, ty: Type) -> Symbol {
        let mut candidate = Symbol::new(hint);
        let mut suffix = 0;
        while self.types.contains(&candidate) {
            suffix += 1;
            candidate = Symbol::new(format!("{hint}_{suffix}"));
        }
        self.types.put(candidate.clone(), ty);
        candidate
    }

    pub fn types(&self) -> &TypeProvider {
        &self.types
    }
}

/// Constant literal value.
///
/// `Double` is wrapped in `OrderedFloat` so that expressions containing
/// floating-point literals still satisfy `Eq` and `Hash`, which conjunct-set
/// comparison relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Bigint(i64),
    Double(OrderedFloat<f64>),
    Varchar(String),
    /// Days since the Unix epoch.
    Date(i32),
}

/// Well-known function names used by the planner when it synthesizes calls.
pub mod functions {
    /// Two-argument conjunction expressed as a call rather than the dedicated
    /// AND form. The predicate algebra treats both spellings uniformly.
    pub const AND: &str = "and";
    pub const EQUAL: &str = "$equal";
    pub const NOT_EQUAL: &str = "$not_equal";
    pub const GREATER_THAN: &str = "$greater_than";
    pub const LESS_THAN: &str = "$less_than";
    pub const ADD: &str = "$add";
}

/// Boolean connective of a [`Expr::SpecialForm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Form {
    And,
    Or,
}

/// Scalar expression tree with structural equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    /// Reference to a column by symbol.
    Variable(Symbol),
    /// Constant literal.
    Constant(ScalarValue),
    /// Named function call, including comparison and arithmetic operators.
    Call { function: String, args: Vec<Expr> },
    /// Boolean connective (AND/OR) over two or more operands.
    SpecialForm { form: Form, args: Vec<Expr> },
}

impl Expr {
    /// The boolean constant `TRUE`.
    pub const fn true_literal() -> Expr {
        Expr::Constant(ScalarValue::Boolean(true))
    }

    pub fn variable(symbol: &Symbol) -> Expr {
        Expr::Variable(symbol.clone())
    }

    pub fn bigint(value: i64) -> Expr {
        Expr::Constant(ScalarValue::Bigint(value))
    }

    pub fn call(function: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            function: function.into(),
            args,
        }
    }

    pub fn equals(left: Expr, right: Expr) -> Expr {
        Expr::call(functions::EQUAL, vec![left, right])
    }

    pub fn not_equal(left: Expr, right: Expr) -> Expr {
        Expr::call(functions::NOT_EQUAL, vec![left, right])
    }

    pub fn greater_than(left: Expr, right: Expr) -> Expr {
        Expr::call(functions::GREATER_THAN, vec![left, right])
    }

    pub fn less_than(left: Expr, right: Expr) -> Expr {
        Expr::call(functions::LESS_THAN, vec![left, right])
    }

    pub fn add(left: Expr, right: Expr) -> Expr {
        Expr::call(functions::ADD, vec![left, right])
    }

    pub fn or(args: Vec<Expr>) -> Expr {
        Expr::SpecialForm {
            form: Form::Or,
            args,
        }
    }

    /// Whether this expression is the constant `TRUE`.
    pub fn is_true(&self) -> bool {
        matches!(self, Expr::Constant(ScalarValue::Boolean(true)))
    }

    /// Operands of this node if it is a conjunction — either the dedicated
    /// AND form or an `and` call. `None` for every other node kind.
    pub fn conjunction_args(&self) -> Option<&[Expr]> {
        match self {
            Expr::SpecialForm {
                form: Form::And,
                args,
            } => Some(args),
            Expr::Call { function, args } if function == functions::AND => Some(args),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "null"),
            ScalarValue::Boolean(v) => write!(f, "{v}"),
            ScalarValue::Bigint(v) => write!(f, "{v}"),
            ScalarValue::Double(v) => write!(f, "{v}"),
            ScalarValue::Varchar(v) => write!(f, "'{v}'"),
            ScalarValue::Date(v) => write!(f, "date {v}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Variable(symbol) => write!(f, "{symbol}"),
            Expr::Constant(value) => write!(f, "{value}"),
            Expr::Call { function, args } => {
                if let (Some(op), [left, right]) = (operator_token(function), args.as_slice()) {
                    write!(f, "({left} {op} {right})")
                } else {
                    write!(f, "{function}(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ")")
                }
            }
            Expr::SpecialForm { form, args } => {
                let connective = match form {
                    Form::And => "AND",
                    Form::Or => "OR",
                };
                write!(f, "(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {connective} ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

fn operator_token(function: &str) -> Option<&'static str> {
    match function {
        functions::EQUAL => Some("="),
        functions::NOT_EQUAL => Some("<>"),
        functions::GREATER_THAN => Some(">"),
        functions::LESS_THAN => Some("<"),
        functions::ADD => Some("+"),
        functions::AND => Some("AND"),
        _ => None,
    }
}
