//! Structural IR checks.
//!
//! Run after lowering and after every pass that rewrites the block graph.
//! A violation is always a compiler bug, never a user error, so the
//! checker collects every problem it sees instead of stopping at the first.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::graph;
use crate::ir::{BlockId, InstrId, InstrKind, IrFunction};

/// A broken IR invariant.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IrViolation {
    #[error("block {block:?} is not sealed")]
    Unsealed { block: BlockId },

    #[error("block {block:?} does not end in a terminator")]
    MissingTerminator { block: BlockId },

    #[error("terminator {instr:?} is not the last instruction of block {block:?}")]
    TerminatorNotLast { block: BlockId, instr: InstrId },

    #[error("phi {instr:?} follows a non-phi instruction in block {block:?}")]
    PhiAfterNonPhi { block: BlockId, instr: InstrId },

    #[error("phi {instr:?} in block {block:?} does not have exactly one entry per live predecessor")]
    PhiIncomingMismatch { block: BlockId, instr: InstrId },

    #[error("instruction {instr:?} refers to missing instruction {operand:?}")]
    OperandOutOfRange { instr: InstrId, operand: InstrId },

    #[error("instruction {instr:?} refers to missing block {target:?}")]
    BlockOutOfRange { instr: InstrId, target: BlockId },

    #[error("instruction {instr:?} is placed in block {actual:?} but records block {recorded:?}")]
    BlockMismatch {
        instr: InstrId,
        recorded: BlockId,
        actual: BlockId,
    },
}

/// Check every structural invariant of `func`.
pub fn validate(func: &IrFunction) -> Result<(), Vec<IrViolation>> {
    let mut violations = Vec::new();
    let num_blocks = func.blocks.len();
    let num_instrs = func.instrs.len();
    let reachable = graph::reachability(func);
    let preds = graph::predecessors(func);

    for block in &func.blocks {
        if !block.sealed {
            violations.push(IrViolation::Unsealed { block: block.id });
        }

        let last_pos = block.instrs.len().checked_sub(1);
        let mut seen_non_phi = false;
        for (pos, &id) in block.instrs.iter().enumerate() {
            let Some(instr) = func.instrs.get(id.index()) else {
                violations.push(IrViolation::OperandOutOfRange {
                    instr: id,
                    operand: id,
                });
                continue;
            };
            if instr.block != block.id {
                violations.push(IrViolation::BlockMismatch {
                    instr: id,
                    recorded: instr.block,
                    actual: block.id,
                });
            }

            if instr.kind.is_terminator() && Some(pos) != last_pos {
                violations.push(IrViolation::TerminatorNotLast {
                    block: block.id,
                    instr: id,
                });
            }

            if let InstrKind::Phi { incoming } = &instr.kind {
                if seen_non_phi {
                    violations.push(IrViolation::PhiAfterNonPhi {
                        block: block.id,
                        instr: id,
                    });
                }
                if reachable[block.id.index()] {
                    let live_preds: FxHashSet<BlockId> = preds[block.id.index()]
                        .iter()
                        .copied()
                        .filter(|p| reachable[p.index()])
                        .collect();
                    let from: FxHashSet<BlockId> = incoming.iter().map(|inc| inc.block).collect();
                    if from.len() != incoming.len() || from != live_preds {
                        violations.push(IrViolation::PhiIncomingMismatch {
                            block: block.id,
                            instr: id,
                        });
                    }
                }
            } else {
                seen_non_phi = true;
            }

            for operand in instr.kind.operands() {
                if operand.index() >= num_instrs {
                    violations.push(IrViolation::OperandOutOfRange { instr: id, operand });
                }
            }
            for target in instr.kind.successors() {
                if target.index() >= num_blocks {
                    violations.push(IrViolation::BlockOutOfRange { instr: id, target });
                }
            }
        }

        let terminated = block
            .last()
            .and_then(|id| func.instrs.get(id.index()))
            .is_some_and(|instr| instr.kind.is_terminator());
        if !terminated {
            violations.push(IrViolation::MissingTerminator { block: block.id });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests;
