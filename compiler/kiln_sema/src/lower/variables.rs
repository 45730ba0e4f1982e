//! `let`/`var` bindings and assignment.

use kiln_ir::{ExprId, Name, ParsedType, Span, Stmt};

use super::{Lowerer, Operand};
use crate::problem::LowerProblem;
use crate::scope::Binding;

impl Lowerer<'_> {
    pub(crate) fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let {
                name,
                mutable,
                ty,
                init,
                span,
            } => self.lower_let(*name, *mutable, ty.as_ref(), *init, *span),
            Stmt::Assign {
                target,
                value,
                span,
            } => self.lower_assign(*target, *value, *span),
            Stmt::Expr(e) => {
                let _ = self.lower_expr_expecting(*e, None);
            }
        }
    }

    fn lower_let(
        &mut self,
        name: Name,
        mutable: bool,
        ty: Option<&ParsedType>,
        init: ExprId,
        span: Span,
    ) {
        let declared = ty.map(|t| self.resolve(t, span));
        let value = self.lower_expr_expecting(init, declared);
        if value.is_diverged() {
            return;
        }
        let value = match declared {
            Some(ty) => self.coerce(value, ty, self.span(init)),
            None => value,
        };

        let binding = if mutable && value.is_usable() {
            match self.declare_slot(name, &value, span) {
                Some(binding) => binding,
                None => Binding::Value(Operand::invalid()),
            }
        } else {
            Binding::Value(value)
        };
        if let Err(previous) = self.ctx.scopes.add_var(self.scope, name, binding, span) {
            self.report(LowerProblem::Redeclared {
                span,
                name,
                previous,
            });
        }
    }

    /// Stack slot for a `var`, initialized with `value` unless it is
    /// `undefined`.
    fn declare_slot(&mut self, name: Name, value: &Operand, span: Span) -> Option<Binding> {
        let ty = value.ty;
        if self.ctx.types.is_comptime_only(ty) {
            self.report(LowerProblem::ComptimeOnlyVar { span, ty });
            return None;
        }

        let ptr_ty = self.ctx.types.get_pointer(ty, false);
        let ptr = self.builder.emit_alloca(Some(name), ptr_ty, Some(span));
        let is_undef = value
            .as_comptime()
            .is_some_and(kiln_const::ConstValue::is_undef);
        if !is_undef {
            let id = self.materialize(value, span)?;
            self.builder.emit_store(ptr, id, Some(span));
        }
        Some(Binding::Slot { ptr, ty })
    }

    fn lower_assign(&mut self, target: ExprId, value: ExprId, span: Span) {
        let Some(place) = self.lower_place(target) else {
            return;
        };
        let op = self.lower_expr_expecting(value, Some(place.ty));
        let op = self.coerce(op, place.ty, self.span(value));
        if !op.is_usable() {
            return;
        }
        let Some(id) = self.materialize(&op, span) else {
            return;
        };
        self.builder.emit_store(place.ptr, id, Some(span));
    }
}
