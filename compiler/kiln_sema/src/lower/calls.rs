//! Calls and generic instantiation.
//!
//! A call to a function with `comptime` parameters first evaluates those
//! arguments, then looks up (or creates) the instance for that binding in
//! the instantiation cache. The instance is registered before its body is
//! lowered, so a recursive call with the same binding finds it. A cache hit
//! discards the scope the arguments were bound in.

use kiln_ir::{DeclId, ExprId, FnDecl, FnId, ItemKind, Name, Span, TypeId};
use kiln_types::{FnFlags, GenericArg};

use super::{lower_function, Lowerer, Operand};
use crate::decl::fn_sig;
use crate::problem::LowerProblem;
use crate::scope::{Binding, ScopeKind};

impl Lowerer<'_> {
    pub(crate) fn lower_call(&mut self, callee: Name, args: &[ExprId], span: Span) -> Operand {
        let module = self.module;
        let Some(decl) = self.ctx.scopes.lookup_decl(self.scope, callee) else {
            return self.report(LowerProblem::UnknownFn { span, name: callee });
        };
        let ItemKind::Fn(func) = &module.item(decl).kind else {
            return self.report(LowerProblem::NotCallable { span, name: callee });
        };

        let mut ops = Vec::with_capacity(args.len());
        for &arg in args {
            let op = self.lower_expr(arg);
            if op.is_diverged() {
                return op;
            }
            ops.push(op);
        }
        if self.ctx.is_invalid(decl) {
            return Operand::invalid();
        }

        if func.is_generic() {
            return self.lower_generic_call(decl, func, ops, args, span);
        }
        match self.ctx.fn_for_decl(decl) {
            Some(fn_id) => self.emit_call(fn_id, ops, args, span),
            None => Operand::invalid(),
        }
    }

    /// Coerce arguments to the callee's parameter types and emit the call.
    fn emit_call(
        &mut self,
        fn_id: FnId,
        ops: Vec<Operand>,
        arg_exprs: &[ExprId],
        span: Span,
    ) -> Operand {
        let fn_ty = self.ctx.function(fn_id).ty;
        let Some(sig) = self.ctx.types.fn_sig(fn_ty).cloned() else {
            return Operand::invalid();
        };
        let var_args = sig.flags.contains(FnFlags::VAR_ARGS);
        if ops.len() < sig.params.len() || (!var_args && ops.len() > sig.params.len()) {
            return self.report(LowerProblem::ArgCount {
                span,
                expected: sig.params.len(),
                found: ops.len(),
            });
        }

        let mut coerced = Vec::with_capacity(ops.len());
        for (i, (op, &expr)) in ops.into_iter().zip(arg_exprs).enumerate() {
            let arg_span = self.span(expr);
            let op = match sig.params.get(i) {
                Some(&param) => self.coerce(op, param, arg_span),
                None => self.coerce_var_arg(op, arg_span),
            };
            coerced.push((op, arg_span));
        }
        if coerced.iter().any(|(op, _)| op.is_invalid()) {
            return Operand::invalid();
        }
        let mut ids = Vec::with_capacity(coerced.len());
        for (op, arg_span) in &coerced {
            let Some(id) = self.materialize(op, *arg_span) else {
                return Operand::diverged();
            };
            ids.push(id);
        }

        let ret = sig.ret;
        let call = self.builder.emit_call(fn_id, ids, ret, Some(span));
        match self.ctx.types.canonical(ret) {
            TypeId::NORETURN => {
                self.builder.unreachable(Some(span));
                Operand::diverged()
            }
            TypeId::VOID => Operand::void(),
            _ => Operand::runtime(call, ret),
        }
    }

    /// Variadic arguments get a concrete runtime type.
    fn coerce_var_arg(&mut self, op: Operand, span: Span) -> Operand {
        match self.ctx.types.canonical(op.ty) {
            TypeId::COMPTIME_INT => self.coerce(op, TypeId::I32, span),
            TypeId::COMPTIME_FLOAT => self.coerce(op, TypeId::F64, span),
            ty if self.ctx.types.is_comptime_only(ty) => self.report(LowerProblem::NotComptime {
                span,
                what: "variadic argument type",
            }),
            _ => op,
        }
    }

    fn lower_generic_call(
        &mut self,
        decl: DeclId,
        func: &FnDecl,
        ops: Vec<Operand>,
        arg_exprs: &[ExprId],
        span: Span,
    ) -> Operand {
        if ops.len() != func.params.len() {
            return self.report(LowerProblem::ArgCount {
                span,
                expected: func.params.len(),
                found: ops.len(),
            });
        }
        if ops.iter().any(Operand::is_invalid) {
            return Operand::invalid();
        }
        let Some(fn_id) = self.instantiate(decl, func, &ops, arg_exprs) else {
            return Operand::invalid();
        };

        let mut runtime_ops = Vec::with_capacity(ops.len());
        let mut runtime_exprs = Vec::with_capacity(ops.len());
        for ((param, op), &expr) in func.params.iter().zip(ops).zip(arg_exprs) {
            if !param.is_comptime {
                runtime_ops.push(op);
                runtime_exprs.push(expr);
            }
        }
        self.emit_call(fn_id, runtime_ops, &runtime_exprs, span)
    }

    /// The instance of `decl` for the comptime arguments among `ops`.
    fn instantiate(
        &mut self,
        decl: DeclId,
        func: &FnDecl,
        ops: &[Operand],
        arg_exprs: &[ExprId],
    ) -> Option<FnId> {
        let mark = self.ctx.scopes.len();
        let root = self.ctx.scopes.root();
        let fn_scope = self.ctx.scopes.push(root, ScopeKind::Function);

        let mut generic_args = Vec::new();
        for ((param, op), &expr) in func.params.iter().zip(ops).zip(arg_exprs) {
            if !param.is_comptime {
                continue;
            }
            let arg_span = self.span(expr);
            let param_ty = self.in_scope(fn_scope, |this| this.resolve(&param.ty, param.span));
            let op = self.coerce(op.clone(), param_ty, arg_span);
            if op.is_invalid() {
                return None;
            }
            let Some(value) = op.as_comptime().cloned() else {
                self.report(LowerProblem::NotComptime {
                    span: arg_span,
                    what: "argument for a comptime parameter",
                });
                return None;
            };
            if value.is_undef() {
                self.report(LowerProblem::UseOfUndefined { span: arg_span });
                return None;
            }
            generic_args.push(GenericArg::from(value.clone()));
            let binding = Binding::Value(Operand::comptime(value));
            if let Err(previous) = self
                .ctx
                .scopes
                .add_var(fn_scope, param.name, binding, param.span)
            {
                self.report(LowerProblem::Redeclared {
                    span: param.span,
                    name: param.name,
                    previous,
                });
                return None;
            }
        }

        if let Some(fn_id) = self.ctx.instance(decl, &generic_args) {
            // Nothing refers to the binding scope after a hit.
            self.ctx.scopes.truncate(mark);
            return Some(fn_id);
        }

        let decl_span = self.module.item(decl).span;
        let (params, ret) = self.in_scope(fn_scope, |this| {
            let params: Vec<TypeId> = func
                .params
                .iter()
                .filter(|p| !p.is_comptime)
                .map(|p| this.resolve(&p.ty, p.span))
                .collect();
            let ret = this.resolve(&func.ret, decl_span);
            (params, ret)
        });
        if ret.is_invalid() || params.iter().any(|p| p.is_invalid()) {
            return None;
        }
        let ty = self.ctx.types.get_fn(fn_sig(params, ret, func.flags));
        let fn_id = self.ctx.alloc_fn(decl, func.name, ty, generic_args.clone());
        self.ctx.record_instance(decl, generic_args, fn_id);
        tracing::debug!(?decl, ?fn_id, "instantiating generic function");

        lower_function(self.ctx, self.module, self.arena, fn_id, func, fn_scope);
        Some(fn_id)
    }
}
