use kiln_const::ConstValue;
use kiln_ir::{FnId, StringInterner, TypeId};
use kiln_types::TypeTable;
use pretty_assertions::assert_eq;

use crate::builder::IrBuilder;
use crate::ir::{IrParam, SwitchCase};
use crate::test_helpers::{diamond, with_dead_add};

#[test]
fn straight_line_dump() {
    let expected = "\
fn fn#0() u32 {
bb0 entry:
  %0 = param u32 0
  %1 = const u32 7
  %2 = add u32 %0, %1
  ret %0
}
";
    assert_eq!(with_dead_add().to_string(), expected);
}

#[test]
fn diamond_dump() {
    let expected = "\
fn fn#0() u32 {
bb0 entry:
  %0 = param bool 0
  cond_br %0, bb1, bb2
bb1 then:
  %2 = const u32 1
  br bb3
bb2 else:
  %4 = const u32 2
  br bb3
bb3 merge:
  %6 = phi u32 [bb1: %2], [bb2: %4]
  ret %6
}
";
    assert_eq!(diamond().to_string(), expected);
}

#[test]
fn pretty_resolves_compound_types_and_names() {
    let interner = StringInterner::new();
    let mut types = TypeTable::default();
    let ptr_u8 = types.get_pointer(TypeId::U8, false);

    let mut builder = IrBuilder::new();
    let slot = builder.emit_alloca(None, ptr_u8, None);
    let byte = builder.emit_param(0, TypeId::U8, None);
    builder.emit_store(slot, byte, None);
    let arm = builder.new_block("arm");
    let dflt = builder.new_block("default");
    builder.switch_br(
        byte,
        vec![SwitchCase {
            value: ConstValue::int(TypeId::U8, 10),
            target: arm,
        }],
        dflt,
        None,
    );
    builder.position_at(arm);
    builder.ret(None, None);
    builder.position_at(dflt);
    builder.unreachable(None);

    let func = builder.finish(
        interner.intern("poke"),
        FnId::new(3),
        vec![IrParam {
            name: interner.intern("b"),
            ty: TypeId::U8,
        }],
        TypeId::VOID,
    );

    let expected = "\
fn poke(u8) void {
bb0 entry:
  %0 = alloca *u8
  %1 = param u8 0
  store %0, %1
  switch_br %1 [10 => bb1], default bb2
bb1 arm:
  ret void
bb2 default:
  unreachable
}
";
    assert_eq!(func.pretty(&types, &interner), expected);
}
