//! # Predicate Algebra
//!
//! Pure helpers over boolean expression trees. Rewrite rules use these to take
//! a filter predicate apart into conjuncts, drop or rewrite some of them, and
//! put the remainder back together without changing meaning.
//!
//! None of these functions inspects plan nodes, allocates ids, or decides
//! whether duplicating a predicate is safe — determinism is an injected
//! capability ([`DeterminismEvaluator`]), and the caller applies it.

use crate::expr::{Expr, Form, Symbol};
use std::collections::HashSet;

/// Split a predicate into its top-level conjuncts.
///
/// Nested conjunctions (the dedicated AND form as well as `and` calls) are
/// flattened depth-first, left to right; every non-AND operand is returned in
/// that order. A non-conjunction input yields a singleton.
pub fn extract_conjuncts(expr: &Expr) -> Vec<&Expr> {
    let mut conjuncts = Vec::new();
    collect_conjuncts(expr, &mut conjuncts);
    conjuncts
}

fn collect_conjuncts<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    match expr.conjunction_args() {
        Some(args) => {
            for arg in args {
                collect_conjuncts(arg, out);
            }
        }
        None => out.push(expr),
    }
}

/// Combine conjuncts into a single predicate.
///
/// An empty list yields the constant `TRUE`; a single conjunct is returned
/// unchanged; anything longer folds left to right into nested two-argument
/// AND forms. Duplicate conjuncts are preserved — deduplication is a semantic
/// decision that belongs to the caller.
pub fn and(conjuncts: Vec<Expr>) -> Expr {
    let mut iter = conjuncts.into_iter();
    let Some(first) = iter.next() else {
        return Expr::true_literal();
    };
    iter.fold(first, |left, right| Expr::SpecialForm {
        form: Form::And,
        args: vec![left, right],
    })
}

/// Rewrite every variable reference through `mapping`, leaving all other node
/// kinds structurally intact.
///
/// The mapping sees each referenced symbol, including references nested deep
/// inside larger boolean expressions; returning `Expr::Variable` of the same
/// symbol keeps a reference unchanged.
pub fn inline_variables<F>(mapping: F, expr: &Expr) -> Expr
where
    F: Fn(&Symbol) -> Expr,
{
    inline(&mapping, expr)
}

fn inline<F>(mapping: &F, expr: &Expr) -> Expr
where
    F: Fn(&Symbol) -> Expr,
{
    match expr {
        Expr::Variable(symbol) => mapping(symbol),
        Expr::Constant(_) => expr.clone(),
        Expr::Call { function, args } => Expr::Call {
            function: function.clone(),
            args: args.iter().map(|arg| inline(mapping, arg)).collect(),
        },
        Expr::SpecialForm { form, args } => Expr::SpecialForm {
            form: *form,
            args: args.iter().map(|arg| inline(mapping, arg)).collect(),
        },
    }
}

/// Decides whether an expression is free of non-deterministic calls.
///
/// Injected capability: the algebra and the flattener consult it but never
/// implement the decision themselves.
pub trait DeterminismEvaluator {
    fn is_deterministic(&self, expr: &Expr) -> bool;
}

/// Name-based evaluator: a call is non-deterministic iff its function name is
/// registered as such.
#[derive(Debug, Clone)]
pub struct DefaultDeterminismEvaluator {
    non_deterministic: HashSet<String>,
}

impl DefaultDeterminismEvaluator {
    pub fn new(non_deterministic: impl IntoIterator<Item = String>) -> Self {
        Self {
            non_deterministic: non_deterministic.into_iter().collect(),
        }
    }
}

impl Default for DefaultDeterminismEvaluator {
    fn default() -> Self {
        Self::new(
            ["random", "rand", "uuid", "now"]
                .into_iter()
                .map(String::from),
        )
    }
}

impl DeterminismEvaluator for DefaultDeterminismEvaluator {
    fn is_deterministic(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Variable(_) | Expr::Constant(_) => true,
            Expr::Call { function, args } => {
                !self.non_deterministic.contains(function)
                    && args.iter().all(|arg| self.is_deterministic(arg))
            }
            Expr::SpecialForm { args, .. } => {
                args.iter().all(|arg| self.is_deterministic(arg))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::functions;

    fn var(name: &str) -> Expr {
        Expr::Variable(Symbol::new(name))
    }

    #[test]
    fn extract_flattens_nested_ands_left_to_right() {
        // ((a AND b) AND (c AND d)) -> [a, b, c, d]
        let nested = and(vec![var("a"), var("b"), var("c"), var("d")]);
        let conjuncts = extract_conjuncts(&nested);
        assert_eq!(
            conjuncts,
            vec![&var("a"), &var("b"), &var("c"), &var("d")]
        );
    }

    #[test]
    fn extract_flattens_and_calls_uniformly() {
        let call_form = Expr::call(
            functions::AND,
            vec![
                var("a"),
                Expr::SpecialForm {
                    form: Form::And,
                    args: vec![var("b"), var("c")],
                },
            ],
        );
        let conjuncts = extract_conjuncts(&call_form);
        assert_eq!(conjuncts, vec![&var("a"), &var("b"), &var("c")]);
    }

    #[test]
    fn extract_of_non_conjunction_is_singleton() {
        let leaf = Expr::greater_than(var("x"), Expr::bigint(0));
        assert_eq!(extract_conjuncts(&leaf), vec![&leaf]);
    }

    #[test]
    fn and_of_empty_is_true() {
        assert!(and(Vec::new()).is_true());
    }

    #[test]
    fn and_of_singleton_is_unchanged() {
        let leaf = Expr::less_than(var("x"), Expr::bigint(7));
        assert_eq!(and(vec![leaf.clone()]), leaf);
    }

    #[test]
    fn and_preserves_duplicates() {
        let dup = and(vec![var("a"), var("a")]);
        assert_eq!(extract_conjuncts(&dup), vec![&var("a"), &var("a")]);
    }

    #[test]
    fn inline_replaces_nested_references() {
        let s = Symbol::new("s");
        let predicate = Expr::or(vec![
            Expr::variable(&s),
            Expr::greater_than(var("x"), Expr::bigint(0)),
        ]);
        let inlined = inline_variables(
            |symbol| {
                if *symbol == s {
                    Expr::true_literal()
                } else {
                    Expr::variable(symbol)
                }
            },
            &predicate,
        );
        assert_eq!(
            inlined,
            Expr::or(vec![
                Expr::true_literal(),
                Expr::greater_than(var("x"), Expr::bigint(0)),
            ])
        );
    }

    #[test]
    fn default_evaluator_flags_registered_functions() {
        let evaluator = DefaultDeterminismEvaluator::default();
        let pure = Expr::greater_than(var("x"), Expr::bigint(0));
        let impure = Expr::greater_than(Expr::call("random", vec![]), Expr::bigint(0));
        assert!(evaluator.is_deterministic(&pure));
        assert!(!evaluator.is_deterministic(&impure));
    }
}
