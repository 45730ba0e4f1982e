//! Dead instruction elimination and unreachable block removal.
//!
//! Both passes keep `ref_count` consistent: after either one, every
//! instruction's count equals the number of operand slots naming it, and
//! every block's count equals the number of terminator edges into it.

use crate::graph;
use crate::ir::{BlockId, InstrKind, IrFunction};

/// Rebuild every instruction and block `ref_count` from the placed
/// instructions.
pub fn recompute_ref_counts(func: &mut IrFunction) {
    for instr in &mut func.instrs {
        instr.ref_count = 0;
    }
    for block in &mut func.blocks {
        block.ref_count = 0;
    }

    for b in 0..func.blocks.len() {
        for pos in 0..func.blocks[b].instrs.len() {
            let id = func.blocks[b].instrs[pos];
            let kind = &func.instrs[id.index()].kind;
            let operands = kind.operands();
            let succs = kind.successors();
            for operand in operands {
                func.instrs[operand.index()].ref_count += 1;
            }
            for succ in succs {
                func.blocks[succ.index()].ref_count += 1;
            }
        }
    }
}

/// Remove unused side-effect-free instructions until none remain.
///
/// Terminators, stores and calls are always kept. Returns the number of
/// instructions removed. Arena slots are kept so `InstrId`s stay valid.
pub fn eliminate_dead_instrs(func: &mut IrFunction) -> usize {
    recompute_ref_counts(func);

    let mut removed = vec![false; func.instrs.len()];
    let mut worklist: Vec<_> = func
        .placed_instrs()
        .filter(|&id| func.instr(id).is_dead())
        .collect();
    let mut count = 0;

    while let Some(id) = worklist.pop() {
        if removed[id.index()] {
            continue;
        }
        removed[id.index()] = true;
        count += 1;

        for operand in func.instrs[id.index()].kind.operands() {
            let op = &mut func.instrs[operand.index()];
            op.ref_count = op.ref_count.saturating_sub(1);
            if !removed[operand.index()] && op.is_dead() {
                worklist.push(operand);
            }
        }
    }

    if count > 0 {
        for block in &mut func.blocks {
            block.instrs.retain(|id| !removed[id.index()]);
        }
        tracing::debug!(
            function = func.name.raw(),
            removed = count,
            "eliminated dead instructions"
        );
    }
    count
}

/// Drop blocks not reachable from the entry and renumber the rest.
///
/// Phi entries naming a removed predecessor are pruned so each phi still
/// has one entry per live predecessor. Returns the number of blocks
/// removed.
#[allow(
    clippy::cast_possible_truncation,
    reason = "block indices never exceed u32"
)]
pub fn remove_unreachable_blocks(func: &mut IrFunction) -> usize {
    let reachable = graph::reachability(func);
    let removed = reachable.iter().filter(|r| !**r).count();
    if removed == 0 {
        return 0;
    }

    let mut remap: Vec<Option<BlockId>> = vec![None; func.blocks.len()];
    let mut next = 0u32;
    for (old, &live) in reachable.iter().enumerate() {
        if live {
            remap[old] = Some(BlockId::new(next));
            next += 1;
        }
    }

    let old_blocks = std::mem::take(&mut func.blocks);
    for mut block in old_blocks {
        let Some(new_id) = remap[block.id.index()] else {
            continue;
        };
        block.id = new_id;
        for &id in &block.instrs {
            let instr = &mut func.instrs[id.index()];
            instr.block = new_id;
            if let InstrKind::Phi { incoming } = &mut instr.kind {
                incoming.retain(|inc| remap[inc.block.index()].is_some());
            }
            instr
                .kind
                .map_blocks(|old| remap[old.index()].unwrap_or(old));
        }
        func.blocks.push(block);
    }
    func.entry = remap[func.entry.index()].unwrap_or(func.entry);

    recompute_ref_counts(func);
    tracing::debug!(
        function = func.name.raw(),
        removed,
        "removed unreachable blocks"
    );
    removed
}
