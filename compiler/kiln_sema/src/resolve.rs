//! `ParsedType` → `TypeId` resolution.
//!
//! Names resolve against comptime `type` locals first (generic
//! parameters bound in the instance scope), then module declarations.
//! Aliases resolve lazily on first use, so an alias may refer to one
//! declared after it.

use kiln_ir::{DeclId, ItemKind, Module, Name, ParsedType, Span, TypeId};
use kiln_types::{FnFlags, FnSig};

use crate::context::{CompilationContext, DeclState};
use crate::problem::TypeProblem;
use crate::scope::{Binding, ScopeId};

/// Resolve `ty` as seen from `scope`. Unknown names are reported and
/// yield `TypeId::INVALID`.
pub(crate) fn resolve_type(
    ctx: &mut CompilationContext,
    module: &Module,
    scope: ScopeId,
    ty: &ParsedType,
    span: Span,
) -> TypeId {
    match ty {
        ParsedType::Primitive(id) => *id,
        ParsedType::Int { signed, bits } => ctx.types.get_int(*signed, *bits),
        ParsedType::Named(name) => resolve_name(ctx, module, scope, *name, span),
        ParsedType::Pointer { child, is_const } => {
            let child = resolve_type(ctx, module, scope, child, span);
            ctx.types.get_pointer(child, *is_const)
        }
        ParsedType::Array { child, len } => {
            let child = resolve_type(ctx, module, scope, child, span);
            ctx.types.get_array(child, *len)
        }
        ParsedType::Slice { child, is_const } => {
            let child = resolve_type(ctx, module, scope, child, span);
            ctx.types.get_slice(child, *is_const)
        }
        ParsedType::Optional(child) => {
            let child = resolve_type(ctx, module, scope, child, span);
            ctx.types.get_optional(child)
        }
        ParsedType::ErrorUnion(child) => {
            let child = resolve_type(ctx, module, scope, child, span);
            ctx.types.get_error_union(child)
        }
        ParsedType::Fn {
            params,
            ret,
            var_args,
        } => {
            let params = params
                .iter()
                .map(|p| resolve_type(ctx, module, scope, p, span))
                .collect();
            let ret = resolve_type(ctx, module, scope, ret, span);
            let mut flags = FnFlags::empty();
            flags.set(FnFlags::VAR_ARGS, *var_args);
            ctx.types.get_fn(FnSig::new(params, ret).with_flags(flags))
        }
    }
}

fn resolve_name(
    ctx: &mut CompilationContext,
    module: &Module,
    scope: ScopeId,
    name: Name,
    span: Span,
) -> TypeId {
    if let Some(entry) = ctx.scopes.lookup_var(scope, name) {
        if let Binding::Value(op) = &entry.binding {
            if let Some(ty) = op.as_type() {
                return ty;
            }
        }
        ctx.report_type(&TypeProblem::NotAType { span, name });
        return TypeId::INVALID;
    }
    match ctx.scopes.lookup_decl(scope, name) {
        Some(decl) => decl_type(ctx, module, decl, span),
        None => {
            ctx.report_type(&TypeProblem::UnknownType { span, name });
            TypeId::INVALID
        }
    }
}

/// Type introduced by a type declaration.
fn decl_type(ctx: &mut CompilationContext, module: &Module, decl: DeclId, span: Span) -> TypeId {
    let item = module.item(decl);
    match &item.kind {
        ItemKind::Fn(f) => {
            ctx.report_type(&TypeProblem::NotAType { span, name: f.name });
            TypeId::INVALID
        }
        ItemKind::TypeAlias(_) => resolve_alias(ctx, module, decl),
        ItemKind::Struct(_) | ItemKind::Union(_) | ItemKind::Enum(_) => {
            if ctx.is_invalid(decl) {
                return TypeId::INVALID;
            }
            ctx.types.decl_type(decl).unwrap_or(TypeId::INVALID)
        }
    }
}

/// Resolve the alias `decl`, once.
pub(crate) fn resolve_alias(
    ctx: &mut CompilationContext,
    module: &Module,
    decl: DeclId,
) -> TypeId {
    if let Some(ty) = ctx.types.decl_type(decl) {
        return ty;
    }
    let item = module.item(decl);
    let ItemKind::TypeAlias(alias) = &item.kind else {
        return TypeId::INVALID;
    };
    match ctx.decl_state(decl) {
        Some(DeclState::Invalid) => return TypeId::INVALID,
        Some(DeclState::InProgress) => {
            ctx.report_type(&TypeProblem::AliasCycle {
                span: item.span,
                name: alias.name,
            });
            ctx.set_decl_state(decl, DeclState::Invalid);
            return TypeId::INVALID;
        }
        Some(DeclState::Valid) | None => {}
    }

    ctx.set_decl_state(decl, DeclState::InProgress);
    let root = ctx.scopes.root();
    let target = resolve_type(ctx, module, root, &alias.target, item.span);
    if target.is_invalid() {
        ctx.set_decl_state(decl, DeclState::Invalid);
        return TypeId::INVALID;
    }
    ctx.set_decl_state(decl, DeclState::Valid);
    ctx.types.declare_type_alias(decl, alias.name, target)
}

#[cfg(test)]
mod tests;
