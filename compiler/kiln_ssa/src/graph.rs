//! Shared CFG utilities.
//!
//! Generic graph operations on [`IrFunction`] that validation, dead-code
//! removal and the printer all need. Passes depend on this module and
//! never on each other.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::ir::{BlockId, IrFunction};

/// Successor blocks of `block`, in terminator order (duplicates kept).
#[inline]
pub fn successors(func: &IrFunction, block: BlockId) -> SmallVec<[BlockId; 4]> {
    func.successors(block)
}

/// Distinct predecessors of every block, indexed by block index.
///
/// A `cond_br` or `switch_br` with several edges into the same block
/// contributes one predecessor.
pub fn predecessors(func: &IrFunction) -> Vec<Vec<BlockId>> {
    let num_blocks = func.blocks.len();
    let mut preds: Vec<Vec<BlockId>> = vec![Vec::new(); num_blocks];

    for block in &func.blocks {
        let mut seen = FxHashSet::default();
        for succ in func.successors(block.id) {
            if succ.index() < num_blocks && seen.insert(succ) {
                preds[succ.index()].push(block.id);
            }
        }
    }

    preds
}

/// Postorder traversal from the entry block, visiting only reachable
/// blocks.
///
/// Iterative DFS with an explicit stack so deeply nested control flow
/// cannot overflow the call stack.
pub fn postorder(func: &IrFunction) -> Vec<BlockId> {
    let num_blocks = func.blocks.len();
    let mut visited = vec![false; num_blocks];
    let mut order = Vec::with_capacity(num_blocks);

    // (block, children_pushed)
    let mut stack: Vec<(BlockId, bool)> = vec![(func.entry, false)];

    while let Some(&mut (block, ref mut children_done)) = stack.last_mut() {
        if *children_done {
            order.push(block);
            stack.pop();
            continue;
        }
        *children_done = true;

        if block.index() >= num_blocks || visited[block.index()] {
            stack.pop();
            continue;
        }
        visited[block.index()] = true;

        for succ in func.successors(block) {
            if succ.index() < num_blocks && !visited[succ.index()] {
                stack.push((succ, false));
            }
        }
    }

    order
}

/// Blocks reachable from the entry, in reverse postorder (entry first).
pub fn reachable_blocks(func: &IrFunction) -> Vec<BlockId> {
    let mut order = postorder(func);
    order.reverse();
    order
}

/// Reachability bitmap indexed by block index.
pub fn reachability(func: &IrFunction) -> Vec<bool> {
    let mut reachable = vec![false; func.blocks.len()];
    for block in postorder(func) {
        reachable[block.index()] = true;
    }
    reachable
}

#[cfg(test)]
mod tests;
