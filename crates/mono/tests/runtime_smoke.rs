use mono::{compile, format_value, parse_expression, run_program, Value};

#[test]
fn pipeline_evaluates_simple_application() {
    let output = compile("(\\x -> x + 1) 5").expect("compile failed");
    assert_eq!(output.value, "6");
}

#[test]
fn pipeline_evaluates_recursive_factorial() {
    let output = compile("let rec fac = \\n -> if n == 0 then 1 else n * fac (n - 1) in fac 5")
        .expect("compile failed");
    assert_eq!(output.ty, "Int");
    assert_eq!(output.value, "120");
}

#[test]
fn pipeline_evaluates_list_literals() {
    let output = compile("[1, 2, 1 + 2]").expect("compile failed");
    assert_eq!(output.ty, "List Int");
    assert_eq!(output.value, "[1, 2, 3]");
}

#[test]
fn evaluator_runs_independently_of_inference() {
    // The branches disagree in type, so this program never passes the
    // checker; the evaluator still reduces it on its own.
    let expr = parse_expression(
        "if (\\x1 -> equals 20 x1) 25 // comment\nthen true\nelse add 3 (4 * 5)",
    )
    .expect("parse failed");
    let value = run_program(&expr).expect("evaluation failed");
    match value {
        Value::Int(value) => assert_eq!(value, 23),
        other => panic!("expected Int, got {}", format_value(&other)),
    }
}

#[test]
fn curried_builtins_flow_through_let() {
    let output = compile("let inc = add 1 in [inc 1, inc 2]").expect("compile failed");
    assert_eq!(output.ty, "List Int");
    assert_eq!(output.value, "[2, 3]");
}
