use crate::surface::parse_expression;

use super::*;

fn run(source: &str) -> Result<Value, RuntimeError> {
    let expr = parse_expression(source).expect("parse failed");
    run_program(&expr)
}

fn run_int(source: &str) -> i64 {
    match run(source).expect("evaluation failed") {
        Value::Int(value) => value,
        other => panic!("expected Int, got {}", format_value(&other)),
    }
}

#[test]
fn arithmetic_desugars_and_evaluates() {
    assert_eq!(run_int("add 3 (multiply 4 5)"), 23);
    assert_eq!(run_int("1 + 2 * 3"), 7);
    assert_eq!(run_int("10 - 4 - 3"), 3);
}

#[test]
fn lambda_application() {
    assert_eq!(run_int("(\\x -> x + 1) 5"), 6);
}

#[test]
fn builtins_curry_one_argument_at_a_time() {
    let value = run("add 1").expect("evaluation failed");
    assert!(matches!(value, Value::Builtin(ref b) if b.args.len() == 1));
    assert_eq!(run_int("let inc = add 1 in inc 41"), 42);
}

#[test]
fn if_selects_branches() {
    assert_eq!(run_int("if 1 == 1 then 10 else 20"), 10);
    assert_eq!(run_int("if 1 == 2 then 10 else 20"), 20);
}

#[test]
fn let_binds_and_shadows() {
    assert_eq!(run_int("let x = 1 in let x = x + 1 in x"), 2);
}

#[test]
fn shadowing_scope_does_not_leak_to_siblings() {
    assert_eq!(run_int("let x = 1 in (let x = 2 in x) + x"), 3);
}

#[test]
fn recursive_factorial() {
    let source = "let rec fac = \\n -> if n == 0 then 1 else n * fac (n - 1) in fac 5";
    assert_eq!(run_int(source), 120);
}

#[test]
fn mutual_recursion_through_nesting() {
    let source = "let rec even = \\n -> if n == 0 then true else \
                  (let rec odd = \\m -> if m == 0 then false else even (m - 1) in odd (n - 1)) \
                  in even 10";
    match run(source).expect("evaluation failed") {
        Value::Bool(value) => assert!(value),
        other => panic!("expected Bool, got {}", format_value(&other)),
    }
}

#[test]
fn lists_evaluate_in_order() {
    match run("[1, 1 + 1, 3]").expect("evaluation failed") {
        Value::List(items) => {
            let rendered: Vec<String> = items.iter().map(format_value).collect();
            assert_eq!(rendered, vec!["1", "2", "3"]);
        }
        other => panic!("expected List, got {}", format_value(&other)),
    }
}

#[test]
fn closures_capture_their_defining_scope() {
    assert_eq!(
        run_int("let y = 10 in let f = \\x -> x + y in let y = 0 in f 1"),
        11
    );
}

#[test]
fn applying_a_non_function_is_a_runtime_error() {
    // The evaluator never sees this after inference; driven directly it
    // must fail cleanly rather than panic.
    let err = run("1 2").expect_err("expected runtime error");
    assert!(matches!(err, RuntimeError::Message(_)));
}

#[test]
fn strict_self_reference_is_an_unbound_name() {
    let err = run("let rec x = x + 1 in x").expect_err("expected runtime error");
    assert!(matches!(err, RuntimeError::UnboundName(ref name) if name == "x"));
}

#[test]
fn builtin_rejects_non_integer_operands() {
    let err = run("add true 1").expect_err("expected runtime error");
    assert!(matches!(err, RuntimeError::Message(_)));
}

#[test]
fn format_value_renders_compound_values() {
    let value = run("[1 == 1, false]").expect("evaluation failed");
    assert_eq!(format_value(&value), "[true, false]");
    let closure = run("\\x -> x").expect("evaluation failed");
    assert_eq!(format_value(&closure), "<closure \\x -> ...>");
}
