use crate::diagnostics::Span;

use super::types::{Type, TypeError, TypeVarId};
use super::Typechecker;

impl Typechecker {
    /// Solve `left ~ right` immediately, extending the substitution. Both
    /// sides are resolved through the current substitution first. `left` is
    /// the type the surrounding construct expects; mismatches report it as
    /// `expected` and `right` as `found`.
    pub fn unify(&mut self, left: Type, right: Type, span: Span) -> Result<(), TypeError> {
        let left = self.apply(left);
        let right = self.apply(right);
        match (left, right) {
            (Type::Var(a), Type::Var(b)) if a == b => Ok(()),
            (Type::Var(var), ty) | (ty, Type::Var(var)) => self.bind_var(var, ty, span),
            (Type::Int, Type::Int) | (Type::Bool, Type::Bool) => Ok(()),
            (Type::Func(param_a, result_a), Type::Func(param_b, result_b)) => {
                self.unify(*param_a, *param_b, span.clone())?;
                self.unify(*result_a, *result_b, span)
            }
            (Type::List(elem_a), Type::List(elem_b)) => self.unify(*elem_a, *elem_b, span),
            (expected, found) => Err(TypeError::Mismatch {
                expected: Box::new(expected),
                found: Box::new(found),
                span,
            }),
        }
    }

    fn bind_var(&mut self, var: TypeVarId, ty: Type, span: Span) -> Result<(), TypeError> {
        if let Type::Var(other) = &ty {
            if *other == var {
                return Ok(());
            }
        }
        if self.occurs(var, &ty) {
            return Err(TypeError::InfiniteType {
                var,
                ty: Box::new(ty),
                span,
            });
        }
        self.subst.insert(var, ty);
        Ok(())
    }

    /// Occurs check: does `var` appear anywhere in `ty` (after resolution)?
    fn occurs(&mut self, var: TypeVarId, ty: &Type) -> bool {
        match self.apply(ty.clone()) {
            Type::Var(id) => id == var,
            Type::Int | Type::Bool => false,
            Type::Func(param, result) => self.occurs(var, &param) || self.occurs(var, &result),
            Type::List(element) => self.occurs(var, &element),
        }
    }

    /// Resolve a type through the substitution to a fixed point. Resolved
    /// chains are compressed back into the substitution, which keeps
    /// repeated application cheap and idempotent.
    pub fn apply(&mut self, ty: Type) -> Type {
        match ty {
            Type::Var(id) => {
                if let Some(replacement) = self.subst.get(&id).cloned() {
                    let applied = self.apply(replacement);
                    self.subst.insert(id, applied.clone());
                    applied
                } else {
                    Type::Var(id)
                }
            }
            Type::Int => Type::Int,
            Type::Bool => Type::Bool,
            Type::Func(param, result) => Type::func(self.apply(*param), self.apply(*result)),
            Type::List(element) => Type::list(self.apply(*element)),
        }
    }
}
