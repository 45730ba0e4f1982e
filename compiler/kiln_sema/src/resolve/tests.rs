use std::sync::Arc;

use kiln_diagnostic::ErrorCode;
use kiln_ir::{Module, ParsedType, Span, StringInterner, TypeId};
use pretty_assertions::assert_eq;

use super::resolve_type;
use crate::testing::{codes, prim, AstBuilder};
use crate::{CompilationContext, SemaConfig};

fn empty_ctx() -> (CompilationContext, Module) {
    let interner = Arc::new(StringInterner::new());
    (
        CompilationContext::new(interner, SemaConfig::for_tests()),
        Module::new(),
    )
}

fn resolve(ctx: &mut CompilationContext, module: &Module, ty: &ParsedType) -> TypeId {
    let root = ctx.scopes.root();
    resolve_type(ctx, module, root, ty, Span::new(0, 1))
}

#[test]
fn primitives_resolve_to_themselves() {
    let (mut ctx, module) = empty_ctx();
    for ty in [TypeId::VOID, TypeId::BOOL, TypeId::U8, TypeId::ISIZE, TypeId::F64] {
        assert_eq!(resolve(&mut ctx, &module, &prim(ty)), ty);
    }
    assert_eq!(codes(&mut ctx), vec![]);
}

#[test]
fn compound_types_are_uniqued() {
    let (mut ctx, module) = empty_ctx();
    let i7 = ParsedType::Int {
        signed: true,
        bits: 7,
    };
    let a = resolve(&mut ctx, &module, &i7);
    let b = resolve(&mut ctx, &module, &i7);
    assert_eq!(a, b);
    assert_eq!(ctx.types.int_info(a).map(|i| (i.signed, i.bits)), Some((true, 7)));

    let ptr = ParsedType::pointer(prim(TypeId::U8), true);
    let p1 = resolve(&mut ctx, &module, &ptr);
    let p2 = resolve(&mut ctx, &module, &ptr);
    assert_eq!(p1, p2);
    let mutable = resolve(&mut ctx, &module, &ParsedType::pointer(prim(TypeId::U8), false));
    assert_ne!(p1, mutable);

    let arr = resolve(&mut ctx, &module, &ParsedType::array(prim(TypeId::I32), 4));
    assert_eq!(ctx.types.array_info(arr), Some((TypeId::I32, 4)));
}

#[test]
fn fn_type_keeps_var_args() {
    let (mut ctx, module) = empty_ctx();
    let ty = ParsedType::Fn {
        params: vec![prim(TypeId::I32)],
        ret: Box::new(prim(TypeId::VOID)),
        var_args: true,
    };
    let id = resolve(&mut ctx, &module, &ty);
    let sig = ctx.types.fn_sig(id).unwrap();
    assert_eq!(sig.params, vec![TypeId::I32]);
    assert!(sig.flags.contains(kiln_types::FnFlags::VAR_ARGS));
}

#[test]
fn unknown_name_is_invalid() {
    let (mut ctx, module) = empty_ctx();
    let name = ctx.interner.intern("Nope");
    let id = resolve(&mut ctx, &module, &ParsedType::Named(name));
    assert!(id.is_invalid());
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E2001]);
}

#[test]
fn invalid_child_poisons_the_compound() {
    let (mut ctx, module) = empty_ctx();
    let name = ctx.interner.intern("Nope");
    let ty = ParsedType::optional(ParsedType::Named(name));
    let id = resolve(&mut ctx, &module, &ty);
    assert_eq!(id, TypeId::INVALID);
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E2001]);
}

#[test]
fn function_name_is_not_a_type() {
    let mut b = AstBuilder::new();
    let block = b.block(vec![], None);
    b.func("helper", vec![], prim(TypeId::VOID), block);
    let helper = b.named("helper");
    let px = b.param("x", helper);
    let block = b.block(vec![], None);
    b.func("f", vec![px], prim(TypeId::VOID), block);

    let (mut ctx, result) = b.analyze();
    assert!(result.is_err());
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E2002]);
}
