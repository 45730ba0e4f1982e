#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use kiln_const::ConstValue;
use kiln_diagnostic::ErrorCode;
use kiln_ir::{BinaryOp, ParsedType, TypeId};
use kiln_ssa::{InstrKind, IrFunction};
use pretty_assertions::assert_eq;

use crate::testing::{body, codes, count, prim, returned_const, AstBuilder};

/// `fn f(x: from) to { x }`
fn pass_through(from: ParsedType, to: ParsedType) -> AstBuilder {
    let mut b = AstBuilder::new();
    let x = b.ident("x");
    let px = b.param("x", from);
    b.func("f", vec![px], to, x);
    b
}

fn casts(f: &IrFunction) -> Vec<TypeId> {
    f.placed_instrs()
        .filter(|&id| matches!(f.instr(id).kind, InstrKind::Cast { .. }))
        .map(|id| f.instr(id).ty)
        .collect()
}

#[test]
fn literal_that_fits_takes_the_target_type() {
    let mut b = AstBuilder::new();
    let v = b.int(255);
    b.func("f", vec![], prim(TypeId::U8), v);

    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    let f = body(&ctx, "f").unwrap();
    assert_eq!(returned_const(f), Some(&ConstValue::int(TypeId::U8, 255)));
}

#[test]
fn literal_that_does_not_fit() {
    let mut b = AstBuilder::new();
    let v = b.int(300);
    let bind = b.let_("x", Some(prim(TypeId::U8)), v);
    let block = b.block(vec![bind], None);
    b.func("f", vec![], prim(TypeId::VOID), block);

    let (mut ctx, result) = b.analyze();
    assert!(result.is_err());
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E2006]);
}

#[test]
fn negative_literal_into_unsigned() {
    let mut b = AstBuilder::new();
    let v = b.int(-1);
    b.func("f", vec![], prim(TypeId::U32), v);

    let (mut ctx, _) = b.analyze();
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E2006]);
}

#[test]
fn integer_literal_into_float() {
    let mut b = AstBuilder::new();
    let v = b.int(3);
    b.func("f", vec![], prim(TypeId::F32), v);

    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    let f = body(&ctx, "f").unwrap();
    assert_eq!(returned_const(f), Some(&ConstValue::float(TypeId::F32, 3.0)));
}

#[test]
fn float_literal_into_integer_is_rejected() {
    let mut b = AstBuilder::new();
    let v = b.float(1.5);
    b.func("f", vec![], prim(TypeId::I32), v);

    let (mut ctx, _) = b.analyze();
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E2002]);
}

#[test]
fn runtime_int_widens_with_a_cast() {
    let b = pass_through(prim(TypeId::U8), prim(TypeId::U16));
    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(casts(body(&ctx, "f").unwrap()), vec![TypeId::U16]);
}

#[test]
fn unsigned_widens_into_larger_signed() {
    let b = pass_through(prim(TypeId::U8), prim(TypeId::I16));
    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(casts(body(&ctx, "f").unwrap()), vec![TypeId::I16]);
}

#[test]
fn narrowing_runtime_int_is_rejected() {
    for (from, to) in [
        (TypeId::I32, TypeId::U8),
        (TypeId::U16, TypeId::I16),
        (TypeId::I8, TypeId::U64),
    ] {
        let b = pass_through(prim(from), prim(to));
        let (mut ctx, result) = b.analyze();
        assert!(result.is_err(), "{from:?} -> {to:?}");
        assert_eq!(codes(&mut ctx), vec![ErrorCode::E2002]);
    }
}

#[test]
fn float_widens_but_does_not_narrow() {
    let b = pass_through(prim(TypeId::F32), prim(TypeId::F64));
    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(casts(body(&ctx, "f").unwrap()), vec![TypeId::F64]);

    let b = pass_through(prim(TypeId::F64), prim(TypeId::F32));
    let (mut ctx, _) = b.analyze();
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E2002]);
}

#[test]
fn value_wraps_into_optional() {
    let b = pass_through(prim(TypeId::I32), ParsedType::optional(prim(TypeId::I32)));
    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    let f = body(&ctx, "f").unwrap();
    let optional = ctx.types.optional_child(f.return_type);
    assert_eq!(optional, Some(TypeId::I32));
    assert_eq!(casts(f), vec![f.return_type]);
}

#[test]
fn comptime_value_wraps_into_optional() {
    let mut b = AstBuilder::new();
    let v = b.int(7);
    b.func("f", vec![], ParsedType::optional(prim(TypeId::U8)), v);

    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    let f = body(&ctx, "f").unwrap();
    assert_eq!(
        returned_const(f),
        Some(&ConstValue::optional(
            f.return_type,
            Some(ConstValue::int(TypeId::U8, 7))
        ))
    );
}

#[test]
fn literal_operand_takes_the_peer_type() {
    let mut b = AstBuilder::new();
    let x = b.ident("x");
    let one = b.int(1);
    let sum = b.binary(BinaryOp::Add, x, one);
    let px = b.param("x", prim(TypeId::U8));
    b.func("f", vec![px], prim(TypeId::U8), sum);

    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    let f = body(&ctx, "f").unwrap();
    let add = f
        .placed_instrs()
        .find(|&id| matches!(f.instr(id).kind, InstrKind::BinOp { .. }))
        .unwrap();
    assert_eq!(f.instr(add).ty, TypeId::U8);
    assert_eq!(count(f, |k| matches!(k, InstrKind::Cast { .. })), 0);
}

#[test]
fn mixed_width_operands_widen() {
    let mut b = AstBuilder::new();
    let x = b.ident("x");
    let y = b.ident("y");
    let sum = b.binary(BinaryOp::Add, x, y);
    let px = b.param("x", prim(TypeId::U8));
    let py = b.param("y", prim(TypeId::U32));
    b.func("f", vec![px, py], prim(TypeId::U32), sum);

    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(casts(body(&ctx, "f").unwrap()), vec![TypeId::U32]);
}

#[test]
fn incompatible_operands_have_no_peer_type() {
    let mut b = AstBuilder::new();
    let x = b.ident("x");
    let y = b.ident("y");
    let sum = b.binary(BinaryOp::Add, x, y);
    let px = b.param("x", prim(TypeId::I32));
    let py = b.param("y", prim(TypeId::F32));
    b.func("f", vec![px, py], prim(TypeId::I32), sum);

    let (mut ctx, _) = b.analyze();
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E2002]);
}

#[test]
fn undefined_coerces_to_anything() {
    let mut b = AstBuilder::new();
    let u1 = b.undefined();
    let u2 = b.undefined();
    let a = b.let_("a", Some(prim(TypeId::I32)), u1);
    let c = b.let_("c", Some(ParsedType::array(prim(TypeId::U8), 4)), u2);
    let block = b.block(vec![a, c], None);
    b.func("f", vec![], prim(TypeId::VOID), block);

    let (mut ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(codes(&mut ctx), vec![]);
}

#[test]
fn alias_is_the_same_type() {
    let mut b = AstBuilder::new();
    b.alias("Byte", prim(TypeId::U8));
    let x = b.ident("x");
    let px = b.param("x", prim(TypeId::U8));
    let ret = b.named("Byte");
    b.func("f", vec![px], ret, x);

    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(casts(body(&ctx, "f").unwrap()), vec![]);
}
