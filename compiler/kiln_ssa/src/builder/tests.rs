use kiln_const::ConstValue;
use kiln_ir::{BinaryOp, TypeId};

use crate::ir::{BlockId, InstrKind, PhiIncoming};
use crate::test_helpers::{diamond, finish};

use super::*;

#[test]
fn builder_creates_open_entry_block() {
    let builder = IrBuilder::new();
    assert_eq!(builder.current_block(), BlockId::new(0));
    assert_eq!(builder.entry_block(), BlockId::new(0));
    assert!(!builder.is_sealed());
    assert_eq!(builder.block(BlockId::new(0)).name_hint, "entry");
}

#[test]
fn emit_bumps_operand_ref_counts() {
    let mut builder = IrBuilder::new();
    let a = builder.emit_const(ConstValue::int(TypeId::U32, 1), None);
    let b = builder.emit_const(ConstValue::int(TypeId::U32, 2), None);
    let sum = builder.emit_binop(BinaryOp::Add, a, a, TypeId::U32, None);
    builder.emit_binop(BinaryOp::Mul, sum, b, TypeId::U32, None);

    assert_eq!(builder.instr(a).ref_count, 2);
    assert_eq!(builder.instr(b).ref_count, 1);
    assert_eq!(builder.instr(sum).ref_count, 1);
    assert_eq!(builder.ty_of(sum), TypeId::U32);
}

#[test]
fn terminator_seals_block_and_counts_edges() {
    let mut builder = IrBuilder::new();
    let target = builder.new_block("next");
    builder.br(target, None);
    assert!(builder.is_sealed());
    assert_eq!(builder.block(target).ref_count, 1);

    builder.position_at(target);
    assert!(!builder.is_sealed());
}

#[test]
fn switch_counts_every_edge() {
    let mut builder = IrBuilder::new();
    let a = builder.new_block("a");
    let dflt = builder.new_block("default");
    let subject = builder.emit_param(0, TypeId::U8, None);
    builder.switch_br(
        subject,
        vec![
            SwitchCase {
                value: ConstValue::int(TypeId::U8, 0),
                target: a,
            },
            SwitchCase {
                value: ConstValue::int(TypeId::U8, 1),
                target: a,
            },
        ],
        dflt,
        None,
    );
    assert_eq!(builder.block(a).ref_count, 2);
    assert_eq!(builder.block(dflt).ref_count, 1);
    assert_eq!(builder.instr(subject).ref_count, 1);
}

#[test]
#[should_panic(expected = "sealed block")]
fn append_to_sealed_block_panics() {
    let mut builder = IrBuilder::new();
    builder.ret(None, None);
    builder.emit_const(ConstValue::bool(true), None);
}

#[test]
#[should_panic(expected = "phi must precede")]
fn phi_after_non_phi_panics() {
    let mut builder = IrBuilder::new();
    let c = builder.emit_const(ConstValue::bool(true), None);
    builder.emit_phi(
        TypeId::BOOL,
        vec![PhiIncoming {
            block: BlockId::new(0),
            value: c,
        }],
        None,
    );
}

#[test]
fn phis_may_stack_at_block_front() {
    let mut builder = IrBuilder::new();
    let c = builder.emit_const(ConstValue::bool(true), None);
    let merge = builder.new_block("merge");
    builder.br(merge, None);
    builder.position_at(merge);
    let p0 = builder.emit_phi(TypeId::BOOL, vec![], None);
    let p1 = builder.emit_phi(TypeId::BOOL, vec![], None);
    builder.add_phi_incoming(p0, BlockId::new(0), c);
    builder.add_phi_incoming(p1, BlockId::new(0), c);
    assert_eq!(builder.instr(c).ref_count, 2);
    assert!(matches!(
        &builder.instr(p1).kind,
        InstrKind::Phi { incoming } if incoming.len() == 1
    ));
}

#[test]
fn finish_seals_open_blocks_with_unreachable() {
    let mut builder = IrBuilder::new();
    builder.new_block("orphan");
    builder.ret(None, None);
    let func = finish(builder, TypeId::VOID);

    let orphan = func.block(BlockId::new(1));
    assert!(orphan.sealed);
    let term = func.terminator(BlockId::new(1)).map(|t| &t.kind);
    assert_eq!(term, Some(&InstrKind::Unreachable));
}

#[test]
fn diamond_shape() {
    let func = diamond();
    assert_eq!(func.blocks.len(), 4);
    assert!(func.blocks.iter().all(|b| b.sealed));
    assert_eq!(func.block(BlockId::new(3)).ref_count, 2);
    assert_eq!(func.successors(BlockId::new(0)).as_slice(), &[BlockId::new(1), BlockId::new(2)]);
}
