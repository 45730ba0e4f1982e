//! Module-level analysis.
//!
//! Runs in passes so that declarations may refer to each other in any
//! order:
//!
//! 1. Register every declaration name in the module scope.
//! 2. Create the nominal types (struct, union, enum) without bodies.
//! 3. Complete type bodies and resolve aliases.
//! 4. Resolve function signatures and allocate function IDs.
//! 5. Lower non-generic function bodies. Generic functions are lowered
//!    per instantiation, from their call sites.

use kiln_diagnostic::ErrorGuaranteed;
use kiln_ir::{
    DeclId, EnumDecl, ExprArena, FnDecl, FnDeclFlags, ItemKind, Module, Name, Span, StructDecl,
    TypeId,
};
use kiln_types::{CallConv, FnFlags, FnSig};
use num_bigint::BigInt;
use rustc_hash::FxHashMap;

use crate::context::{CompilationContext, DeclState};
use crate::lower::lower_function;
use crate::problem::TypeProblem;
use crate::resolve::{resolve_alias, resolve_type};
use crate::scope::ScopeKind;

/// Analyse `module` and lower every function body into `ctx`.
///
/// Declarations that fail are marked invalid and skipped by their users
/// without further reports. Returns `Err` if any error was reported.
#[tracing::instrument(level = "debug", skip_all, fields(items = module.items.len()))]
pub fn analyze_module(
    ctx: &mut CompilationContext,
    module: &Module,
    arena: &ExprArena,
) -> Result<(), ErrorGuaranteed> {
    register_decls(ctx, module);
    declare_types(ctx, module);
    complete_types(ctx, module);
    resolve_signatures(ctx, module);
    lower_bodies(ctx, module, arena);

    tracing::debug!(
        functions = ctx.functions().len(),
        instances = ctx.instance_count(),
        types = ctx.types.len(),
        "module analysed"
    );
    match ctx.has_errors() {
        Some(guar) => Err(guar),
        None => Ok(()),
    }
}

// ── Passes ──────────────────────────────────────────────────────────

fn register_decls(ctx: &mut CompilationContext, module: &Module) {
    let root = ctx.scopes.root();
    for item in &module.items {
        let name = item.name();
        if let Err(previous) = ctx.scopes.add_decl(root, name, item.id, item.span) {
            ctx.report_type(&TypeProblem::Redeclared {
                span: item.span,
                name,
                previous,
            });
            ctx.set_decl_state(item.id, DeclState::Invalid);
        }
    }
}

fn declare_types(ctx: &mut CompilationContext, module: &Module) {
    for item in &module.items {
        if ctx.is_invalid(item.id) {
            continue;
        }
        match &item.kind {
            ItemKind::Struct(s) => {
                ctx.types.declare_struct(item.id, s.name);
            }
            ItemKind::Union(s) => {
                ctx.types.declare_union(item.id, s.name);
            }
            ItemKind::Enum(e) => {
                ctx.types.declare_enum(item.id, e.name);
            }
            ItemKind::Fn(_) | ItemKind::TypeAlias(_) => {}
        }
    }
}

fn complete_types(ctx: &mut CompilationContext, module: &Module) {
    for item in &module.items {
        if ctx.is_invalid(item.id) {
            continue;
        }
        let before = ctx.errors_reported();
        match &item.kind {
            ItemKind::Struct(s) => complete_struct_like(ctx, module, item.id, s, false, item.span),
            ItemKind::Union(s) => complete_struct_like(ctx, module, item.id, s, true, item.span),
            ItemKind::Enum(e) => complete_enum(ctx, module, item.id, e, item.span),
            ItemKind::TypeAlias(_) => {
                resolve_alias(ctx, module, item.id);
            }
            ItemKind::Fn(_) => continue,
        }
        if ctx.is_invalid(item.id) {
            continue;
        }
        let state = if ctx.errors_reported() > before {
            DeclState::Invalid
        } else {
            DeclState::Valid
        };
        ctx.set_decl_state(item.id, state);
    }
}

fn complete_struct_like(
    ctx: &mut CompilationContext,
    module: &Module,
    decl: DeclId,
    s: &StructDecl,
    is_union: bool,
    span: Span,
) {
    let Some(id) = ctx.types.decl_type(decl) else {
        return;
    };
    let root = ctx.scopes.root();
    let mut seen: FxHashMap<Name, Span> = FxHashMap::default();
    let mut fields = Vec::with_capacity(s.fields.len());
    for field in &s.fields {
        if let Some(&previous) = seen.get(&field.name) {
            ctx.report_type(&TypeProblem::DuplicateMember {
                span: field.span,
                kind: "field",
                name: field.name,
                previous,
            });
            continue;
        }
        seen.insert(field.name, field.span);
        let ty = resolve_type(ctx, module, root, &field.ty, field.span);
        if !ty.is_invalid() && ctx.types.is_comptime_only(ty) {
            ctx.report_type(&TypeProblem::ComptimeOnlyType {
                span: field.span,
                ty,
            });
        }
        fields.push((field.name, ty));
    }
    tracing::trace!(?decl, fields = fields.len(), is_union, ?span, "completing type");
    if is_union {
        ctx.types.complete_union(id, fields);
    } else {
        ctx.types.complete_struct(id, fields);
    }
}

fn complete_enum(
    ctx: &mut CompilationContext,
    module: &Module,
    decl: DeclId,
    e: &EnumDecl,
    span: Span,
) {
    let Some(id) = ctx.types.decl_type(decl) else {
        return;
    };
    let root = ctx.scopes.root();
    let tag_type = e.tag_type.as_ref().and_then(|t| {
        let ty = resolve_type(ctx, module, root, t, span);
        if ty.is_invalid() {
            return None;
        }
        let fixed_int = ctx.types.int_info(ty).is_some();
        if !fixed_int {
            ctx.report_type(&TypeProblem::InvalidTagType { span, found: ty });
            return None;
        }
        Some(ty)
    });

    let mut names: FxHashMap<Name, Span> = FxHashMap::default();
    let mut values: FxHashMap<BigInt, Span> = FxHashMap::default();
    let mut fields = Vec::with_capacity(e.variants.len());
    let mut next = BigInt::from(0);
    for variant in &e.variants {
        let value = variant.value.clone().unwrap_or_else(|| next.clone());
        next = value.clone() + 1;
        if let Some(&previous) = names.get(&variant.name) {
            ctx.report_type(&TypeProblem::DuplicateMember {
                span: variant.span,
                kind: "variant",
                name: variant.name,
                previous,
            });
            continue;
        }
        if let Some(&previous) = values.get(&value) {
            ctx.report_type(&TypeProblem::DuplicateEnumValue {
                span: variant.span,
                value,
                previous,
            });
            continue;
        }
        if let Some(tag) = tag_type {
            if !kiln_const::fits(&value, ctx.types.num_kind(tag)) {
                ctx.report_type(&TypeProblem::TagDoesNotFit {
                    span: variant.span,
                    value,
                    tag_type: tag,
                });
                continue;
            }
        }
        names.insert(variant.name, variant.span);
        values.insert(value.clone(), variant.span);
        fields.push((variant.name, value));
    }
    let tag = ctx.types.complete_enum(id, tag_type, fields);
    tracing::trace!(?decl, ?tag, "completed enum");
}

fn resolve_signatures(ctx: &mut CompilationContext, module: &Module) {
    for item in &module.items {
        let ItemKind::Fn(func) = &item.kind else {
            continue;
        };
        if ctx.is_invalid(item.id) {
            continue;
        }
        if func.is_generic() {
            ctx.types.get_generic_fn(item.id, func.name);
            ctx.set_decl_state(item.id, DeclState::Valid);
            continue;
        }

        let before = ctx.errors_reported();
        let ty = fn_type(ctx, module, func, item.span);
        let fn_id = ctx.alloc_fn(item.id, func.name, ty, Vec::new());
        ctx.bind_decl_fn(item.id, fn_id);
        let state = if ctx.errors_reported() > before {
            DeclState::Invalid
        } else {
            DeclState::Valid
        };
        ctx.set_decl_state(item.id, state);
    }
}

/// Function type of a non-generic declaration; `TypeId::INVALID` if any
/// part of the signature failed.
fn fn_type(ctx: &mut CompilationContext, module: &Module, func: &FnDecl, span: Span) -> TypeId {
    let root = ctx.scopes.root();
    let mut params = Vec::with_capacity(func.params.len());
    let mut ok = true;
    for param in &func.params {
        let ty = resolve_type(ctx, module, root, &param.ty, param.span);
        if ty.is_invalid() {
            ok = false;
        } else if ctx.types.is_comptime_only(ty) {
            ctx.report_type(&TypeProblem::ComptimeOnlyType {
                span: param.span,
                ty,
            });
            ok = false;
        }
        params.push(ty);
    }
    let ret = resolve_type(ctx, module, root, &func.ret, span);
    if ret.is_invalid() {
        ok = false;
    } else if ctx.types.is_comptime_only(ret) {
        ctx.report_type(&TypeProblem::ComptimeOnlyType { span, ty: ret });
        ok = false;
    }
    if !ok {
        return TypeId::INVALID;
    }
    ctx.types.get_fn(fn_sig(params, ret, func.flags))
}

/// Signature with the type-relevant modifiers of `flags`.
pub(crate) fn fn_sig(params: Vec<TypeId>, ret: TypeId, flags: FnDeclFlags) -> FnSig {
    let cc = if flags.contains(FnDeclFlags::NAKED) {
        CallConv::Naked
    } else if flags.contains(FnDeclFlags::EXTERN) {
        CallConv::C
    } else {
        CallConv::Kiln
    };
    FnSig::new(params, ret)
        .with_flags(FnFlags::from_decl(flags))
        .with_cc(cc)
}

fn lower_bodies(ctx: &mut CompilationContext, module: &Module, arena: &ExprArena) {
    for item in &module.items {
        let ItemKind::Fn(func) = &item.kind else {
            continue;
        };
        if func.is_generic() || ctx.is_invalid(item.id) {
            continue;
        }
        let Some(fn_id) = ctx.fn_for_decl(item.id) else {
            continue;
        };
        let root = ctx.scopes.root();
        let scope = ctx.scopes.push(root, ScopeKind::Function);
        lower_function(ctx, module, arena, fn_id, func, scope);
        if ctx.function(fn_id).invalid {
            ctx.set_decl_state(item.id, DeclState::Invalid);
        }
    }
}
