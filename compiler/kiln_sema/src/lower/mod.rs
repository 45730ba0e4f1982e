//! AST → SSA IR lowering.
//!
//! Walks a function body and emits IR through an [`IrBuilder`], folding
//! everything known at compile time on the way. Each expression lowers to
//! an [`Operand`]: either a compile-time value (no instruction emitted) or
//! the instruction holding the runtime result. A compile-time value is
//! materialized as a `Const` instruction only when a runtime instruction
//! consumes it.
//!
//! # Architecture
//!
//! - [`Lowerer`]: per-body state (builder, current scope, return type)
//! - `expr`: dispatch, literals, names, operators
//! - `calls`: calls and generic instantiation
//! - `coerce`: peer-type resolution and implicit coercion
//! - `access`: places, field and element access, aggregate initializers
//! - `control_flow`: blocks, `if`, `while`, `break`/`continue`, `return`
//! - `switch`: case analysis, exhaustiveness and switch lowering
//! - `variables`: `let`/`var` bindings and assignment
//!
//! # Divergence
//!
//! Once the current block is sealed (after `return`, `break`,
//! `unreachable`, ...) lowering yields [`OperandKind::Diverged`] and emits
//! nothing further into it.

mod access;
mod calls;
mod coerce;
mod control_flow;
mod expr;
mod switch;
mod variables;

use kiln_const::ConstValue;
use kiln_ir::{ExprArena, ExprId, FnDecl, FnId, Module, Span, TypeId};
use kiln_ssa::{
    eliminate_dead_instrs, remove_unreachable_blocks, validate, InstrId, IrBuilder, IrParam,
};

use crate::context::CompilationContext;
use crate::problem::LowerProblem;
use crate::scope::{Binding, ScopeId};

// ── Operand ─────────────────────────────────────────────────────────

/// Result of lowering one expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operand {
    pub ty: TypeId,
    pub kind: OperandKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperandKind {
    /// Known during compilation. May be `Undef` or `Zeroes`.
    Comptime(ConstValue),
    /// Produced by an instruction at runtime.
    Runtime(InstrId),
    /// Control never reaches the use.
    Diverged,
}

impl Operand {
    pub fn comptime(value: ConstValue) -> Self {
        Operand {
            ty: value.ty,
            kind: OperandKind::Comptime(value),
        }
    }

    pub fn runtime(id: InstrId, ty: TypeId) -> Self {
        Operand {
            ty,
            kind: OperandKind::Runtime(id),
        }
    }

    pub fn void() -> Self {
        Self::comptime(ConstValue::void())
    }

    /// Placeholder after a reported error. Uses of it report nothing.
    pub fn invalid() -> Self {
        Self::comptime(ConstValue::undef(TypeId::INVALID))
    }

    pub fn diverged() -> Self {
        Operand {
            ty: TypeId::NORETURN,
            kind: OperandKind::Diverged,
        }
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.ty.is_invalid()
    }

    #[inline]
    pub fn is_diverged(&self) -> bool {
        matches!(self.kind, OperandKind::Diverged)
    }

    /// Neither diverged nor invalid.
    #[inline]
    pub fn is_usable(&self) -> bool {
        !self.is_invalid() && !self.is_diverged()
    }

    pub fn as_comptime(&self) -> Option<&ConstValue> {
        match &self.kind {
            OperandKind::Comptime(value) => Some(value),
            _ => None,
        }
    }

    /// The type denoted by a comptime `type` value.
    pub fn as_type(&self) -> Option<TypeId> {
        self.as_comptime().and_then(ConstValue::as_type)
    }
}

// ── Lowerer ─────────────────────────────────────────────────────────

/// Lowering state for one function body.
pub(crate) struct Lowerer<'a> {
    pub(crate) ctx: &'a mut CompilationContext,
    pub(crate) module: &'a Module,
    pub(crate) arena: &'a ExprArena,
    pub(crate) builder: IrBuilder,
    pub(crate) scope: ScopeId,
    pub(crate) return_type: TypeId,
    /// An error was reported while lowering this body.
    pub(crate) failed: bool,
}

impl<'a> Lowerer<'a> {
    pub(crate) fn new(
        ctx: &'a mut CompilationContext,
        module: &'a Module,
        arena: &'a ExprArena,
        scope: ScopeId,
        return_type: TypeId,
    ) -> Self {
        Lowerer {
            ctx,
            module,
            arena,
            builder: IrBuilder::new(),
            scope,
            return_type,
            failed: false,
        }
    }

    /// Report a problem and return the invalid placeholder.
    #[cold]
    pub(crate) fn report(&mut self, problem: LowerProblem) -> Operand {
        if !problem.is_warning() {
            self.failed = true;
        }
        self.ctx.report_lower(&problem);
        Operand::invalid()
    }

    #[inline]
    pub(crate) fn span(&self, id: ExprId) -> Span {
        self.arena.span(id)
    }

    pub(crate) fn safety_on(&self) -> bool {
        !self.ctx.scopes.safety_off(self.scope)
    }

    /// Instruction holding `op` at runtime, emitting a `Const` for
    /// compile-time values. `None` once control has diverged.
    pub(crate) fn materialize(&mut self, op: &Operand, span: Span) -> Option<InstrId> {
        match &op.kind {
            OperandKind::Runtime(id) => Some(*id),
            OperandKind::Comptime(value) => {
                if self.builder.is_sealed() {
                    return None;
                }
                Some(self.builder.emit_const(value.clone(), Some(span)))
            }
            OperandKind::Diverged => None,
        }
    }

    /// Run `f` with `scope` as the current scope.
    pub(crate) fn in_scope<T>(&mut self, scope: ScopeId, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.scope, scope);
        let out = f(self);
        self.scope = saved;
        out
    }
}

// ── Function bodies ─────────────────────────────────────────────────

/// Lower the body of `decl` into the function `fn_id`.
///
/// `scope` is the function scope; comptime parameters of a generic
/// instance are already bound in it. Runtime parameters are bound here in
/// declaration order and numbered from zero.
#[tracing::instrument(level = "debug", skip_all, fields(fn_id = ?fn_id))]
pub(crate) fn lower_function(
    ctx: &mut CompilationContext,
    module: &Module,
    arena: &ExprArena,
    fn_id: FnId,
    decl: &FnDecl,
    scope: ScopeId,
) {
    let Some(body) = decl.body else {
        return;
    };
    let fn_ty = ctx.function(fn_id).ty;
    let Some(sig) = ctx.types.fn_sig(fn_ty).cloned() else {
        ctx.function_mut(fn_id).invalid = true;
        return;
    };

    let mut lowerer = Lowerer::new(ctx, module, arena, scope, sig.ret);
    let mut params = Vec::with_capacity(sig.params.len());
    let runtime_params = decl.params.iter().filter(|p| !p.is_comptime);
    for ((index, param), &ty) in (0u32..).zip(runtime_params).zip(&sig.params) {
        let id = lowerer.builder.emit_param(index, ty, Some(param.span));
        let binding = Binding::Value(Operand::runtime(id, ty));
        if let Err(previous) = lowerer
            .ctx
            .scopes
            .add_var(scope, param.name, binding, param.span)
        {
            lowerer.report(LowerProblem::Redeclared {
                span: param.span,
                name: param.name,
                previous,
            });
        }
        params.push(IrParam {
            name: param.name,
            ty,
        });
    }

    let span = arena.span(body);
    let result = lowerer.lower_expr_expecting(body, Some(sig.ret));
    if !result.is_diverged() {
        lowerer.emit_return(result, span);
    }

    let Lowerer {
        ctx,
        builder,
        failed,
        ..
    } = lowerer;
    let mut func = builder.finish(decl.name, fn_id, params, sig.ret);
    remove_unreachable_blocks(&mut func);
    eliminate_dead_instrs(&mut func);

    let mut failed = failed;
    if let Err(violations) = validate(&func) {
        for violation in violations {
            failed = true;
            ctx.report_lower(&LowerProblem::Internal {
                span,
                message: format!("malformed IR: {violation}"),
            });
        }
    }

    tracing::debug!(
        blocks = func.blocks.len(),
        instrs = func.instrs.len(),
        failed,
        "lowered function body"
    );
    let entry = ctx.function_mut(fn_id);
    entry.ir = Some(func);
    entry.invalid |= failed;
}
