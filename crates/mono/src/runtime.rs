use std::sync::Arc;

use crate::surface::Expr;

mod builtins;
mod environment;
mod values;

#[cfg(test)]
mod tests;

use self::builtins::register_builtins;
use self::environment::Env;
pub use self::values::{BuiltinValue, ClosureValue, Value};

/// Evaluation failures. For a program that passed inference these indicate
/// an internal inconsistency, not a user-facing type error.
#[derive(Debug, Clone)]
pub enum RuntimeError {
    Message(String),
    UnboundName(String),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::Message(message) => write!(f, "{message}"),
            RuntimeError::UnboundName(name) => write!(f, "unbound name '{name}'"),
        }
    }
}

/// Evaluate an expression under a fresh global environment holding only the
/// builtin operators.
pub fn run_program(expr: &Expr) -> Result<Value, RuntimeError> {
    let globals = Env::root();
    register_builtins(&globals);
    eval_expr(expr, &globals)
}

fn eval_expr(expr: &Expr, env: &Env) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Number { value, .. } => Ok(Value::Int(*value)),
        Expr::Boolean { value, .. } => Ok(Value::Bool(*value)),
        Expr::Var { name, .. } => env
            .get(name)
            .ok_or_else(|| RuntimeError::UnboundName(name.clone())),
        Expr::Lambda { binder, body, .. } => Ok(Value::Closure(Arc::new(ClosureValue {
            param: binder.clone(),
            body: body.as_ref().clone(),
            env: env.clone(),
        }))),
        Expr::Apply { func, arg, .. } => {
            let func_value = eval_expr(func, env)?;
            let arg_value = eval_expr(arg, env)?;
            apply_value(func_value, arg_value)
        }
        Expr::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => match eval_expr(cond, env)? {
            Value::Bool(true) => eval_expr(then_branch, env),
            Value::Bool(false) => eval_expr(else_branch, env),
            other => Err(RuntimeError::Message(format!(
                "if condition evaluated to non-boolean value {}",
                format_value(&other)
            ))),
        },
        Expr::Let {
            recursive,
            binder,
            bound,
            body,
            ..
        } => {
            let local = env.child();
            if *recursive {
                // The binder's slot in `local` is the indirection cell: the
                // bound expression is evaluated in the scope that will hold
                // it, and closures it produces capture that scope. The slot
                // is filled before the body runs; reading the binder earlier
                // (a strict self-reference) fails as an unbound name.
                let value = eval_expr(bound, &local)?;
                local.set(binder.clone(), value);
            } else {
                let value = eval_expr(bound, env)?;
                local.set(binder.clone(), value);
            }
            eval_expr(body, &local)
        }
        Expr::List { items, .. } => {
            let mut values = Vec::new();
            for item in items {
                values.push(eval_expr(item, env)?);
            }
            Ok(Value::List(Arc::new(values)))
        }
    }
}

fn apply_value(func: Value, arg: Value) -> Result<Value, RuntimeError> {
    match func {
        Value::Closure(closure) => {
            let local = closure.env.child();
            local.set(closure.param.clone(), arg);
            eval_expr(&closure.body, &local)
        }
        Value::Builtin(builtin) => builtin.apply(arg),
        other => Err(RuntimeError::Message(format!(
            "cannot apply non-function value {}",
            format_value(&other)
        ))),
    }
}

impl BuiltinValue {
    fn apply(&self, arg: Value) -> Result<Value, RuntimeError> {
        let mut args = self.args.clone();
        args.push(arg);
        if args.len() == self.imp.arity {
            (self.imp.func)(args)
        } else {
            Ok(Value::Builtin(BuiltinValue {
                imp: self.imp.clone(),
                args,
            }))
        }
    }
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::Int(value) => value.to_string(),
        Value::Bool(value) => value.to_string(),
        Value::List(items) => {
            let rendered: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Closure(closure) => format!("<closure \\{} -> ...>", closure.param),
        Value::Builtin(builtin) => format!("<builtin {}>", builtin.imp.name),
    }
}
