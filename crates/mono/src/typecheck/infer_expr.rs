use crate::surface::{expr_span, Expr};

use super::types::{Context, Type, TypeError};
use super::Typechecker;

impl Typechecker {
    /// Assign a type to `expr` under `ctx`, solving constraints eagerly at
    /// the point they arise. Children are inferred (and recorded) before
    /// their parent; exactly one trace record is appended per visited node,
    /// after the node's own type is known.
    pub fn infer_expr(&mut self, expr: &Expr, ctx: &Context) -> Result<Type, TypeError> {
        let ty = match expr {
            Expr::Number { .. } => Type::Int,
            Expr::Boolean { .. } => Type::Bool,
            Expr::Var { name, span } => {
                ctx.get(name)
                    .cloned()
                    .ok_or_else(|| TypeError::UnboundVariable {
                        name: name.clone(),
                        span: span.clone(),
                    })?
            }
            Expr::Lambda { binder, body, .. } => {
                let param = self.fresh_var();
                let body_ty = self.infer_expr(body, &ctx.extend(binder.clone(), param.clone()))?;
                Type::func(param, body_ty)
            }
            Expr::Apply { func, arg, .. } => {
                let func_ty = self.infer_expr(func, ctx)?;
                let arg_ty = self.infer_expr(arg, ctx)?;
                let result = self.fresh_var();
                self.unify(
                    func_ty,
                    Type::func(arg_ty, result.clone()),
                    expr_span(arg),
                )?;
                result
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                let cond_ty = self.infer_expr(cond, ctx)?;
                self.unify(Type::Bool, cond_ty, expr_span(cond))?;
                let then_ty = self.infer_expr(then_branch, ctx)?;
                let else_ty = self.infer_expr(else_branch, ctx)?;
                self.unify(then_ty.clone(), else_ty, expr_span(else_branch))?;
                then_ty
            }
            Expr::Let {
                recursive,
                binder,
                bound,
                body,
                ..
            } => {
                // A recursive binding sees itself (monomorphically) while its
                // own definition is inferred; a plain binding does not.
                let bound_ty = if *recursive {
                    let var = self.fresh_var();
                    let ty =
                        self.infer_expr(bound, &ctx.extend(binder.clone(), var.clone()))?;
                    self.unify(ty, var.clone(), expr_span(bound))?;
                    var
                } else {
                    self.infer_expr(bound, ctx)?
                };
                self.infer_expr(body, &ctx.extend(binder.clone(), bound_ty))?
            }
            Expr::List { items, .. } => {
                let element = self.fresh_var();
                for item in items {
                    let item_ty = self.infer_expr(item, ctx)?;
                    self.unify(element.clone(), item_ty, expr_span(item))?;
                }
                // An empty literal keeps its element variable unconstrained;
                // later unification at a use site may still fix it.
                Type::list(element)
            }
        };
        self.recorder.record(ctx, expr, &ty);
        Ok(ty)
    }
}
