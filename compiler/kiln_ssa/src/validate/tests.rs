use kiln_const::ConstValue;
use kiln_ir::TypeId;
use pretty_assertions::assert_eq;

use crate::builder::IrBuilder;
use crate::ir::PhiIncoming;
use crate::test_helpers::{b, diamond, finish, i, with_dead_add};

use super::*;

#[test]
fn built_functions_validate() {
    assert_eq!(validate(&diamond()), Ok(()));
    assert_eq!(validate(&with_dead_add()), Ok(()));
}

#[test]
fn missing_terminator_is_reported() {
    let mut func = diamond();
    func.blocks[3].instrs.pop();
    func.blocks[3].sealed = false;

    let errs = validate(&func).err().unwrap_or_default();
    assert!(errs.contains(&IrViolation::Unsealed { block: b(3) }));
    assert!(errs.contains(&IrViolation::MissingTerminator { block: b(3) }));
}

#[test]
fn terminator_in_middle_is_reported() {
    let mut func = diamond();
    // bb1: const, br  ->  br, const
    func.blocks[1].instrs.swap(0, 1);

    let errs = validate(&func).err().unwrap_or_default();
    assert!(errs.contains(&IrViolation::TerminatorNotLast {
        block: b(1),
        instr: i(3)
    }));
    assert!(errs.contains(&IrViolation::MissingTerminator { block: b(1) }));
}

#[test]
fn phi_missing_a_predecessor_is_reported() {
    let mut func = diamond();
    if let InstrKind::Phi { incoming } = &mut func.instrs[6].kind {
        incoming.pop();
    }
    assert_eq!(
        validate(&func),
        Err(vec![IrViolation::PhiIncomingMismatch {
            block: b(3),
            instr: i(6)
        }])
    );
}

#[test]
fn phi_with_duplicate_predecessor_is_reported() {
    let mut func = diamond();
    if let InstrKind::Phi { incoming } = &mut func.instrs[6].kind {
        incoming.push(PhiIncoming {
            block: b(1),
            value: i(2),
        });
    }
    assert!(validate(&func).is_err());
}

#[test]
fn phi_after_non_phi_is_reported() {
    let mut builder = IrBuilder::new();
    let c = builder.emit_const(ConstValue::bool(false), None);
    let merge = builder.new_block("merge");
    builder.br(merge, None);
    builder.position_at(merge);
    builder.emit_phi(
        TypeId::BOOL,
        vec![PhiIncoming {
            block: b(0),
            value: c,
        }],
        None,
    );
    builder.ret(None, None);
    let mut func = finish(builder, TypeId::VOID);
    // Move the const into the merge block ahead of the phi.
    func.blocks[0].instrs.remove(0);
    func.blocks[1].instrs.insert(0, c);
    func.instrs[c.index()].block = b(1);

    let errs = validate(&func).err().unwrap_or_default();
    assert!(errs.contains(&IrViolation::PhiAfterNonPhi {
        block: b(1),
        instr: i(2)
    }));
}

#[test]
fn dangling_references_are_reported() {
    let mut func = diamond();
    func.instrs[3].kind = InstrKind::Br { target: b(9) };
    func.instrs[6].kind = InstrKind::Load { ptr: i(99) };

    let errs = validate(&func).err().unwrap_or_default();
    assert!(errs.contains(&IrViolation::BlockOutOfRange {
        instr: i(3),
        target: b(9)
    }));
    assert!(errs.contains(&IrViolation::OperandOutOfRange {
        instr: i(6),
        operand: i(99)
    }));
}

#[test]
fn violations_render_readably() {
    let err = IrViolation::Unsealed { block: b(2) };
    assert_eq!(err.to_string(), "block BlockId(2) is not sealed");
}
