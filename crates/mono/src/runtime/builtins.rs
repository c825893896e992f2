use std::sync::Arc;

use super::environment::Env;
use super::values::{BuiltinFunc, BuiltinImpl, BuiltinValue, Value};
use super::RuntimeError;

pub(crate) fn register_builtins(globals: &Env) {
    register_int_binary(globals, "add", |a, b| Value::Int(a.wrapping_add(b)));
    register_int_binary(globals, "subtract", |a, b| Value::Int(a.wrapping_sub(b)));
    register_int_binary(globals, "multiply", |a, b| Value::Int(a.wrapping_mul(b)));
    register_int_binary(globals, "equals", |a, b| Value::Bool(a == b));
}

fn register_int_binary(
    globals: &Env,
    name: &str,
    op: impl Fn(i64, i64) -> Value + Send + Sync + 'static,
) {
    let builtin_name = name.to_string();
    let func: Arc<BuiltinFunc> = Arc::new(move |mut args: Vec<Value>| {
        let right = args.pop();
        let left = args.pop();
        match (left, right) {
            (Some(Value::Int(a)), Some(Value::Int(b))) => Ok(op(a, b)),
            _ => Err(RuntimeError::Message(format!(
                "{builtin_name} expects integer operands"
            ))),
        }
    });
    globals.set(
        name.to_string(),
        Value::Builtin(BuiltinValue {
            imp: Arc::new(BuiltinImpl {
                name: name.to_string(),
                arity: 2,
                func,
            }),
            args: Vec::new(),
        }),
    );
}
