//! Shared test utilities for IR passes. Only compiled in test builds.

use kiln_const::ConstValue;
use kiln_ir::{BinaryOp, FnId, Name, TypeId};

use crate::builder::IrBuilder;
use crate::ir::{BlockId, InstrId, IrFunction, PhiIncoming};

/// Shorthand for `InstrId::new(n)`.
pub(crate) fn i(n: u32) -> InstrId {
    InstrId::new(n)
}

/// Shorthand for `BlockId::new(n)`.
pub(crate) fn b(n: u32) -> BlockId {
    BlockId::new(n)
}

/// Finish a builder with a default name and `FnId(0)`.
pub(crate) fn finish(builder: IrBuilder, return_type: TypeId) -> IrFunction {
    builder.finish(Name::from_raw(1), FnId::new(0), vec![], return_type)
}

/// Diamond: `entry -> then|else -> merge`, merge returns a phi of two
/// constants.
///
/// ```text
/// bb0 entry: %0 = param 0; cond_br %0, bb1, bb2
/// bb1 then:  %2 = const 1; br bb3
/// bb2 else:  %4 = const 2; br bb3
/// bb3 merge: %6 = phi [bb1 %2] [bb2 %4]; ret %6
/// ```
pub(crate) fn diamond() -> IrFunction {
    let mut builder = IrBuilder::new();
    let then_bb = builder.new_block("then");
    let else_bb = builder.new_block("else");
    let merge_bb = builder.new_block("merge");

    let cond = builder.emit_param(0, TypeId::BOOL, None);
    builder.cond_br(cond, then_bb, else_bb, None);

    builder.position_at(then_bb);
    let one = builder.emit_const(ConstValue::int(TypeId::U32, 1), None);
    builder.br(merge_bb, None);

    builder.position_at(else_bb);
    let two = builder.emit_const(ConstValue::int(TypeId::U32, 2), None);
    builder.br(merge_bb, None);

    builder.position_at(merge_bb);
    let phi = builder.emit_phi(
        TypeId::U32,
        vec![
            PhiIncoming {
                block: then_bb,
                value: one,
            },
            PhiIncoming {
                block: else_bb,
                value: two,
            },
        ],
        None,
    );
    builder.ret(Some(phi), None);
    finish(builder, TypeId::U32)
}

/// Straight line with one unused add: `%0 = param; %1 = const; %2 = add; ret %0`.
pub(crate) fn with_dead_add() -> IrFunction {
    let mut builder = IrBuilder::new();
    let p = builder.emit_param(0, TypeId::U32, None);
    let c = builder.emit_const(ConstValue::int(TypeId::U32, 7), None);
    builder.emit_binop(BinaryOp::Add, p, c, TypeId::U32, None);
    builder.ret(Some(p), None);
    finish(builder, TypeId::U32)
}
