use crate::diagnostics::Span;
use crate::surface::parse_expression;

use super::*;

fn infer(source: &str) -> Result<InferOutcome, TypeError> {
    let expr = parse_expression(source).expect("parse failed");
    infer_with_trace(&expr)
}

fn infer_ty(source: &str) -> String {
    infer(source).expect("inference failed").ty.to_string()
}

#[test]
fn fresh_variables_are_distinct() {
    let mut checker = Typechecker::new();
    let a = checker.fresh_var();
    let b = checker.fresh_var();
    assert_ne!(a, b);
}

#[test]
fn apply_resolves_variable_chains() {
    let mut checker = Typechecker::new();
    let a = checker.fresh_var();
    let b = checker.fresh_var();
    checker
        .unify(a.clone(), b.clone(), Span::unknown())
        .expect("unify failed");
    checker
        .unify(b, Type::Int, Span::unknown())
        .expect("unify failed");
    assert_eq!(checker.apply(a), Type::Int);
}

#[test]
fn apply_is_idempotent() {
    let mut checker = Typechecker::new();
    let a = checker.fresh_var();
    let b = checker.fresh_var();
    checker
        .unify(a.clone(), Type::func(b.clone(), Type::Bool), Span::unknown())
        .expect("unify failed");
    checker
        .unify(b, Type::Int, Span::unknown())
        .expect("unify failed");

    let ty = Type::func(a.clone(), Type::list(a));
    let once = checker.apply(ty.clone());
    let twice = checker.apply(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn unify_threads_substitution_through_functions() {
    let mut checker = Typechecker::new();
    let a = checker.fresh_var();
    let b = checker.fresh_var();
    checker
        .unify(
            Type::func(a.clone(), a.clone()),
            Type::func(Type::Int, b.clone()),
            Span::unknown(),
        )
        .expect("unify failed");
    assert_eq!(checker.apply(a), Type::Int);
    assert_eq!(checker.apply(b), Type::Int);
}

#[test]
fn unify_rejects_mismatched_base_types() {
    let mut checker = Typechecker::new();
    let err = checker
        .unify(Type::Int, Type::Bool, Span::unknown())
        .expect_err("expected mismatch");
    assert!(matches!(err, TypeError::Mismatch { .. }));
}

#[test]
fn occurs_check_rejects_infinite_types() {
    let mut checker = Typechecker::new();
    let a = checker.fresh_var();
    let err = checker
        .unify(a.clone(), Type::func(a, Type::Int), Span::unknown())
        .expect_err("expected occurs check failure");
    assert!(matches!(err, TypeError::InfiniteType { .. }));
}

#[test]
fn occurs_check_sees_through_the_substitution() {
    let mut checker = Typechecker::new();
    let a = checker.fresh_var();
    let b = checker.fresh_var();
    checker
        .unify(b.clone(), Type::list(a.clone()), Span::unknown())
        .expect("unify failed");
    // a ~ Func(b, Int) would make a contain itself via b.
    let err = checker
        .unify(a, Type::func(b, Type::Int), Span::unknown())
        .expect_err("expected occurs check failure");
    assert!(matches!(err, TypeError::InfiniteType { .. }));
}

#[test]
fn identity_lambda_has_open_function_type() {
    assert_eq!(infer_ty("\\x -> x"), "t0 -> t0");
}

#[test]
fn self_application_is_an_infinite_type() {
    let err = infer("\\x -> x x").expect_err("expected inference failure");
    assert!(matches!(err, TypeError::InfiniteType { .. }));
}

#[test]
fn unbound_names_are_reported_with_their_span() {
    let err = infer("missing").expect_err("expected inference failure");
    let TypeError::UnboundVariable { name, span } = err else {
        panic!("expected unbound variable error");
    };
    assert_eq!(name, "missing");
    assert_eq!(span.start.column, 1);
}

#[test]
fn let_binding_shadows_without_leaking() {
    let mut checker = Typechecker::new();
    let outer = checker.builtins().extend("x", Type::Bool);
    let expr = parse_expression("let x = 1 in x").expect("parse failed");
    let ty = checker.infer_expr(&expr, &outer).expect("inference failed");
    assert_eq!(checker.apply(ty), Type::Int);
    // The outer context still sees the original binding.
    assert_eq!(outer.get("x"), Some(&Type::Bool));
}

#[test]
fn empty_list_keeps_an_unconstrained_element() {
    let outcome = infer("[]").expect("inference failed");
    assert!(matches!(outcome.ty, Type::List(ref elem) if matches!(**elem, Type::Var(_))));
}

#[test]
fn trace_records_children_before_parents() {
    let outcome = infer("(\\x -> x + 1) 5").expect("inference failed");
    let exprs: Vec<&str> = outcome.steps.iter().map(|step| step.expr.as_str()).collect();
    assert_eq!(
        exprs,
        vec![
            "add",
            "x",
            "add x",
            "1",
            "add x 1",
            "\\x -> add x 1",
            "5",
            "(\\x -> add x 1) 5",
        ]
    );
    for (index, step) in outcome.steps.iter().enumerate() {
        assert_eq!(step.seq, index);
    }
}

#[test]
fn trace_types_are_resolved_against_the_final_substitution() {
    let outcome = infer("(\\x -> x + 1) 5").expect("inference failed");
    // The lambda binder starts as a fresh variable and must end up as Int
    // everywhere it appears in the trace.
    let lambda_step = outcome
        .steps
        .iter()
        .find(|step| step.expr.starts_with('\\'))
        .expect("missing lambda step");
    assert_eq!(lambda_step.ty, "Int -> Int");
    let binder_step = outcome
        .steps
        .iter()
        .find(|step| step.expr == "x")
        .expect("missing binder step");
    assert_eq!(binder_step.ty, "Int");
}

#[test]
fn trace_contexts_snapshot_local_bindings() {
    let outcome = infer("\\x -> x").expect("inference failed");
    let binder_step = outcome
        .steps
        .iter()
        .find(|step| step.expr == "x")
        .expect("missing binder step");
    assert!(binder_step.context.contains_key("x"));
    let lambda_step = outcome
        .steps
        .iter()
        .find(|step| step.expr.starts_with('\\'))
        .expect("missing lambda step");
    assert!(!lambda_step.context.contains_key("x"));
}

#[test]
fn inference_is_deterministic() {
    let source = "let rec fac = \\n -> if n == 0 then 1 else n * fac (n - 1) in fac 5";
    let first = infer(source).expect("inference failed");
    let second = infer(source).expect("inference failed");
    assert_eq!(first.ty, second.ty);
    assert_eq!(first.steps.len(), second.steps.len());
    for (a, b) in first.steps.iter().zip(second.steps.iter()) {
        assert_eq!(a.seq, b.seq);
        assert_eq!(a.expr, b.expr);
        assert_eq!(a.ty, b.ty);
    }
}
