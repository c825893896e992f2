use std::sync::Arc;

use crate::surface::Expr;

use super::environment::Env;
use super::RuntimeError;

pub(crate) type BuiltinFunc = dyn Fn(Vec<Value>) -> Result<Value, RuntimeError> + Send + Sync;

/// Runtime values. Call-by-value; lists and closures are shared via `Arc`.
#[derive(Clone)]
pub enum Value {
    Int(i64),
    Bool(bool),
    List(Arc<Vec<Value>>),
    Closure(Arc<ClosureValue>),
    Builtin(BuiltinValue),
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::runtime::format_value(self))
    }
}

pub struct ClosureValue {
    pub(crate) param: String,
    pub(crate) body: Expr,
    pub(crate) env: Env,
}

/// A builtin with its already-applied arguments. Application is curried:
/// the implementation runs once `args` reaches `arity`.
#[derive(Clone)]
pub struct BuiltinValue {
    pub(crate) imp: Arc<BuiltinImpl>,
    pub(crate) args: Vec<Value>,
}

pub struct BuiltinImpl {
    pub(crate) name: String,
    pub(crate) arity: usize,
    pub(crate) func: Arc<BuiltinFunc>,
}
