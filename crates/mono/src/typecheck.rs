use std::collections::HashMap;

use crate::surface::Expr;

mod infer_expr;
mod trace;
mod types;
mod unify_and_substitute;

#[cfg(test)]
mod infer_tests;

pub use self::trace::{TraceRecord, TraceRecorder, TraceStep};
pub use self::types::{Context, Type, TypeError, TypeVarId};

/// One inference run over one expression tree. The fresh-variable counter,
/// the substitution and the trace recorder are owned by this instance and
/// must not be shared across runs.
pub struct Typechecker {
    next_var: u32,
    subst: HashMap<TypeVarId, Type>,
    builtins: Context,
    recorder: TraceRecorder,
}

impl Default for Typechecker {
    fn default() -> Self {
        Self::new()
    }
}

impl Typechecker {
    pub fn new() -> Self {
        Self {
            next_var: 0,
            subst: HashMap::new(),
            builtins: builtin_context(),
            recorder: TraceRecorder::new(),
        }
    }

    pub fn builtins(&self) -> &Context {
        &self.builtins
    }

    pub fn recorder(&self) -> &TraceRecorder {
        &self.recorder
    }

    pub fn fresh_var(&mut self) -> Type {
        let id = TypeVarId(self.next_var);
        self.next_var += 1;
        Type::Var(id)
    }

    /// Rewrite every recorded type through the final substitution. Runs once
    /// after inference succeeds; each record is independent.
    pub fn resolve_records(&mut self) {
        let mut records = self.recorder.take_records();
        for record in records.iter_mut() {
            record.ty = self.apply(record.ty.clone());
        }
        self.recorder.put_records(records);
    }
}

/// Result of a successful inference run: the resolved top-level type plus
/// the ordered, resolved trace of per-node type assignments.
#[derive(Debug)]
pub struct InferOutcome {
    pub ty: Type,
    pub steps: Vec<TraceStep>,
}

/// Infer the type of `expr` under the builtin context, recording one trace
/// entry per visited node. On failure the partial trace is discarded and
/// only the first error is reported.
pub fn infer_with_trace(expr: &Expr) -> Result<InferOutcome, TypeError> {
    let mut checker = Typechecker::new();
    let ctx = checker.builtins.clone();
    let ty = checker.infer_expr(expr, &ctx)?;
    let ty = checker.apply(ty);
    checker.resolve_records();
    let steps = checker.recorder.steps();
    Ok(InferOutcome { ty, steps })
}

/// Types of the builtin operator names. Shared (by value) by every run;
/// read-only after construction.
fn builtin_context() -> Context {
    let int_binary = Type::func(Type::Int, Type::func(Type::Int, Type::Int));
    let int_comparison = Type::func(Type::Int, Type::func(Type::Int, Type::Bool));
    Context::new()
        .extend("add", int_binary.clone())
        .extend("subtract", int_binary.clone())
        .extend("multiply", int_binary)
        .extend("equals", int_comparison)
}
