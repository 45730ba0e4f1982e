#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use kiln_const::ConstValue;
use kiln_diagnostic::ErrorCode;
use kiln_ir::{BinaryOp, ParsedType, TypeId, UnaryOp};
use kiln_ssa::InstrKind;
use pretty_assertions::assert_eq;

use crate::testing::{block_names, body, codes, count, prim, returned_const, AstBuilder};

/// `fn f(x: ty) ty { <op>(x, rhs) }` with a literal right operand.
fn runtime_op(op: BinaryOp, ty: TypeId, rhs: i64) -> AstBuilder {
    let mut b = AstBuilder::new();
    let x = b.ident("x");
    let r = b.int(rhs);
    let e = b.binary(op, x, r);
    let px = b.param("x", prim(ty));
    b.func("f", vec![px], prim(ty), e);
    b
}

/// `fn f() ret { e }` with `e` built by `build`.
fn constant(ret: ParsedType, build: impl FnOnce(&mut AstBuilder) -> kiln_ir::ExprId) -> AstBuilder {
    let mut b = AstBuilder::new();
    let e = build(&mut b);
    b.func("f", vec![], ret, e);
    b
}

// ── Arithmetic ──────────────────────────────────────────────────────

#[test]
fn comptime_division_by_zero() {
    let b = constant(prim(TypeId::I32), |b| {
        let ten = b.int(10);
        let zero = b.int(0);
        b.binary(BinaryOp::Div, ten, zero)
    });
    let (mut ctx, result) = b.analyze();
    assert!(result.is_err());
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E4001]);
}

#[test]
fn runtime_division_by_literal_zero() {
    for op in [BinaryOp::Div, BinaryOp::Rem] {
        let b = runtime_op(op, TypeId::U32, 0);
        let (mut ctx, _) = b.analyze();
        assert_eq!(codes(&mut ctx), vec![ErrorCode::E4001], "{op:?}");
    }
}

#[test]
fn shift_amount_must_be_below_bit_width() {
    let b = runtime_op(BinaryOp::Shl, TypeId::U32, 40);
    let (mut ctx, _) = b.analyze();
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E4003]);

    let b = runtime_op(BinaryOp::Shr, TypeId::U32, 31);
    let (mut ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(codes(&mut ctx), vec![]);
}

#[test]
fn fixed_width_arithmetic_wraps() {
    let b = constant(prim(TypeId::U8), |b| {
        let x = b.int(250);
        let bind = b.let_("x", Some(prim(TypeId::U8)), x);
        let xr = b.ident("x");
        let ten = b.int(10);
        let sum = b.binary(BinaryOp::Add, xr, ten);
        b.block(vec![bind], Some(sum))
    });
    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(
        returned_const(body(&ctx, "f").unwrap()),
        Some(&ConstValue::int(TypeId::U8, 4))
    );
}

#[test]
fn comptime_int_does_not_wrap() {
    let b = constant(prim(TypeId::U64), |b| {
        let big = b.int(1_u64 << 40);
        let also = b.int(1_u64 << 40);
        let product = b.binary(BinaryOp::Mul, big, also);
        let shift = b.int(60);
        b.binary(BinaryOp::Shr, product, shift)
    });
    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(
        returned_const(body(&ctx, "f").unwrap()),
        Some(&ConstValue::int(TypeId::U64, 1_u64 << 20))
    );
}

#[test]
fn overflowed_literal_is_rejected() {
    let b = constant(prim(TypeId::U64), AstBuilder::overflowed_int);
    let (mut ctx, _) = b.analyze();
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E2007]);
}

#[test]
fn negating_a_bool_is_unsupported() {
    let b = constant(prim(TypeId::BOOL), |b| {
        let t = b.bool(true);
        b.unary(UnaryOp::Neg, t)
    });
    let (mut ctx, _) = b.analyze();
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E2012]);
}

#[test]
fn bit_not_folds_at_the_operand_width() {
    let b = constant(prim(TypeId::U8), |b| {
        let one = b.int(1);
        let bind = b.let_("x", Some(prim(TypeId::U8)), one);
        let x = b.ident("x");
        let not = b.unary(UnaryOp::BitNot, x);
        b.block(vec![bind], Some(not))
    });
    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(
        returned_const(body(&ctx, "f").unwrap()),
        Some(&ConstValue::int(TypeId::U8, 254))
    );
}

// ── Casts ───────────────────────────────────────────────────────────

#[test]
fn explicit_cast_truncates() {
    let b = constant(prim(TypeId::U8), |b| {
        let v = b.int(300);
        b.cast(v, prim(TypeId::U8))
    });
    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(
        returned_const(body(&ctx, "f").unwrap()),
        Some(&ConstValue::int(TypeId::U8, 44))
    );
}

#[test]
fn runtime_narrowing_cast_emits_cast() {
    let mut b = AstBuilder::new();
    let x = b.ident("x");
    let c = b.cast(x, prim(TypeId::U8));
    let px = b.param("x", prim(TypeId::I64));
    b.func("f", vec![px], prim(TypeId::U8), c);

    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    let f = body(&ctx, "f").unwrap();
    assert_eq!(count(f, |k| matches!(k, InstrKind::Cast { .. })), 1);
}

#[test]
fn cast_between_unrelated_types_is_a_mismatch() {
    let b = constant(prim(TypeId::BOOL), |b| {
        let v = b.int(1);
        b.cast(v, prim(TypeId::BOOL))
    });
    let (mut ctx, _) = b.analyze();
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E2002]);
}

// ── Logical operators ───────────────────────────────────────────────

#[test]
fn runtime_and_short_circuits_through_a_phi() {
    let mut b = AstBuilder::new();
    let a = b.ident("a");
    let c = b.ident("c");
    let both = b.binary(BinaryOp::And, a, c);
    let pa = b.param("a", prim(TypeId::BOOL));
    let pc = b.param("c", prim(TypeId::BOOL));
    b.func("f", vec![pa, pc], prim(TypeId::BOOL), both);

    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    let f = body(&ctx, "f").unwrap();
    assert_eq!(block_names(f), vec!["entry", "and_rhs", "and_end"]);
    assert_eq!(count(f, |k| matches!(k, InstrKind::Phi { .. })), 1);
}

#[test]
fn decided_left_operand_skips_the_right() {
    let b = constant(prim(TypeId::BOOL), |b| {
        let f = b.bool(false);
        let unknown = b.call("not_declared", vec![]);
        b.binary(BinaryOp::And, f, unknown)
    });
    let (mut ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(codes(&mut ctx), vec![]);

    let b = constant(prim(TypeId::BOOL), |b| {
        let t = b.bool(true);
        let unknown = b.call("not_declared", vec![]);
        b.binary(BinaryOp::Or, t, unknown)
    });
    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(
        returned_const(body(&ctx, "f").unwrap()),
        Some(&ConstValue::bool(true))
    );
}

// ── Comparison ──────────────────────────────────────────────────────

#[test]
fn enum_values_compare_at_compile_time() {
    let mut b = AstBuilder::new();
    b.enum_decl("Color", None, &[("red", None), ("green", None)]);
    let red = b.enum_value("Color", "red");
    let green = b.enum_value("Color", "green");
    let eq = b.binary(BinaryOp::Eq, red, green);
    b.func("f", vec![], prim(TypeId::BOOL), eq);

    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(
        returned_const(body(&ctx, "f").unwrap()),
        Some(&ConstValue::bool(false))
    );
}

#[test]
fn ordering_bools_is_unsupported() {
    let b = constant(prim(TypeId::BOOL), |b| {
        let t = b.bool(true);
        let f = b.bool(false);
        b.binary(BinaryOp::Lt, t, f)
    });
    let (mut ctx, _) = b.analyze();
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E2012]);
}

#[test]
fn unknown_variant() {
    let mut b = AstBuilder::new();
    b.enum_decl("Color", None, &[("red", None)]);
    let blue = b.enum_value("Color", "blue");
    b.func("f", vec![], prim(TypeId::BOOL), blue);

    let (mut ctx, _) = b.analyze();
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E2005]);
}

// ── Strings ─────────────────────────────────────────────────────────

#[test]
fn concatenated_strings_form_one_array() {
    let b = constant(prim(TypeId::U8), |b| {
        let ab = b.string("ab");
        let cd = b.string("cd");
        let s = b.binary(BinaryOp::Concat, ab, cd);
        let bind = b.let_("s", None, s);
        let sr = b.ident("s");
        let three = b.int(3);
        let last = b.index(sr, three);
        b.block(vec![bind], Some(last))
    });
    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(
        returned_const(body(&ctx, "f").unwrap()),
        Some(&ConstValue::int(TypeId::U8, u32::from(b'd')))
    );
}

#[test]
fn concatenated_c_strings_keep_one_terminator() {
    let read = |at: i64| {
        constant(prim(TypeId::U8), |b| {
            let ab = b.c_string("ab");
            let cd = b.c_string("cd");
            let s = b.binary(BinaryOp::Concat, ab, cd);
            let bind = b.let_("s", None, s);
            let sr = b.ident("s");
            let i = b.int(at);
            let e = b.index(sr, i);
            b.block(vec![bind], Some(e))
        })
    };

    let (ctx, result) = read(3).analyze();
    assert!(result.is_ok());
    assert_eq!(
        returned_const(body(&ctx, "f").unwrap()),
        Some(&ConstValue::int(TypeId::U8, u32::from(b'd')))
    );

    let (ctx, result) = read(4).analyze();
    assert!(result.is_ok());
    assert_eq!(
        returned_const(body(&ctx, "f").unwrap()),
        Some(&ConstValue::int(TypeId::U8, 0))
    );
}

#[test]
fn concatenation_needs_comptime_operands() {
    let mut b = AstBuilder::new();
    let x = b.ident("x");
    let s = b.string("ab");
    let cat = b.binary(BinaryOp::Concat, x, s);
    let bind = b.let_("s", None, cat);
    let block = b.block(vec![bind], None);
    let px = b.param("x", ParsedType::array(prim(TypeId::U8), 2));
    b.func("f", vec![px], prim(TypeId::VOID), block);

    let (mut ctx, _) = b.analyze();
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E4005]);
}

#[test]
fn concatenating_huge_zeroes_is_rejected() {
    let mut b = AstBuilder::new();
    let huge = b.zeroes(ParsedType::array(prim(TypeId::U8), 1 << 60));
    let one = b.int(1);
    let tail = b.array_init(prim(TypeId::U8), vec![one]);
    let cat = b.binary(BinaryOp::Concat, huge, tail);
    let bind = b.let_("s", None, cat);
    let block = b.block(vec![bind], None);
    b.func("f", vec![], prim(TypeId::VOID), block);

    let (mut ctx, result) = b.analyze();
    assert!(result.is_err());
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E4006]);
}

#[test]
fn concatenating_zeroes_with_large_elements_is_rejected() {
    // Few elements, but each one expands to a large row.
    let row = || ParsedType::array(prim(TypeId::U8), 1024);
    let mut b = AstBuilder::new();
    let grid = b.zeroes(ParsedType::array(row(), 4096));
    let extra = b.zeroes(ParsedType::array(row(), 1));
    let cat = b.binary(BinaryOp::Concat, grid, extra);
    let bind = b.let_("s", None, cat);
    let block = b.block(vec![bind], None);
    b.func("f", vec![], prim(TypeId::VOID), block);

    let (mut ctx, result) = b.analyze();
    assert!(result.is_err());
    assert_eq!(codes(&mut ctx), vec![ErrorCode::E4006]);
}

#[test]
fn concatenating_small_zeroes_expands_them() {
    let b = constant(prim(TypeId::U8), |b| {
        let zeros = b.zeroes(ParsedType::array(prim(TypeId::U8), 3));
        let seven = b.int(7);
        let tail = b.array_init(prim(TypeId::U8), vec![seven]);
        let cat = b.binary(BinaryOp::Concat, zeros, tail);
        let bind = b.let_("s", None, cat);
        let sr = b.ident("s");
        let three = b.int(3);
        let last = b.index(sr, three);
        b.block(vec![bind], Some(last))
    });
    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(
        returned_const(body(&ctx, "f").unwrap()),
        Some(&ConstValue::int(TypeId::U8, 7))
    );
}

#[test]
fn string_length_is_known() {
    let mut b = AstBuilder::new();
    let s = b.string("hello");
    let decl = b.var("s", None, s);
    let sr = b.ident("s");
    let len = b.field(sr, "len");
    let block = b.block(vec![decl], Some(len));
    b.func("f", vec![], prim(TypeId::USIZE), block);

    let (ctx, result) = b.analyze();
    assert!(result.is_ok());
    assert_eq!(
        returned_const(body(&ctx, "f").unwrap()),
        Some(&ConstValue::int(TypeId::USIZE, 5))
    );
}
