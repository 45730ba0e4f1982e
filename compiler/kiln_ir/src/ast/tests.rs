use num_bigint::BigInt;
use pretty_assertions::assert_eq;

use super::*;
use crate::{DeclId, Name, ParsedType, Span, TypeId};

#[test]
fn arena_alloc_returns_sequential_ids() {
    let mut arena = ExprArena::new();
    let a = arena.alloc(ExprKind::Bool(true), Span::new(0, 4));
    let b = arena.alloc(
        ExprKind::Int {
            value: BigInt::from(7),
            overflowed: false,
        },
        Span::new(5, 6),
    );
    assert_eq!(a.raw(), 0);
    assert_eq!(b.raw(), 1);
    assert_eq!(arena.len(), 2);
    assert_eq!(arena.span(b), Span::new(5, 6));
    assert_eq!(arena.kind(a), &ExprKind::Bool(true));
}

#[test]
fn switch_range_item_spans_both_bounds() {
    let mut arena = ExprArena::new();
    let lo = arena.alloc(ExprKind::Undefined, Span::new(4, 5));
    let hi = arena.alloc(ExprKind::Undefined, Span::new(8, 10));
    assert_eq!(SwitchItem::Single(hi).span(&arena), Span::new(8, 10));
    assert_eq!(
        SwitchItem::Range { start: lo, end: hi }.span(&arena),
        Span::new(4, 10)
    );
}

#[test]
fn module_push_assigns_decl_ids() {
    let mut module = Module::new();
    let s = module.push(
        ItemKind::Struct(StructDecl {
            name: Name::from_raw(1),
            fields: vec![],
        }),
        Span::DUMMY,
    );
    let a = module.push(
        ItemKind::TypeAlias(TypeAliasDecl {
            name: Name::from_raw(2),
            target: ParsedType::Primitive(TypeId::U8),
        }),
        Span::DUMMY,
    );
    assert_eq!(s, DeclId::new(0));
    assert_eq!(a, DeclId::new(1));
    assert_eq!(module.item(a).name(), Name::from_raw(2));
}

#[test]
fn fn_with_comptime_param_is_generic() {
    let param = |is_comptime| Param {
        name: Name::from_raw(1),
        ty: ParsedType::Primitive(TypeId::TYPE),
        is_comptime,
        span: Span::DUMMY,
    };
    let mut decl = FnDecl {
        name: Name::from_raw(3),
        params: vec![param(false)],
        ret: ParsedType::Primitive(TypeId::VOID),
        body: None,
        flags: FnDeclFlags::empty(),
    };
    assert!(!decl.is_generic());
    decl.params.push(param(true));
    assert!(decl.is_generic());
}
