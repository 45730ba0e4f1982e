//! SSA basic-block IR for the Kiln compiler.
//!
//! The semantic analyser lowers every function body into an [`IrFunction`]
//! through an [`IrBuilder`]. The finished graph is what the native backend
//! translates straight-line, block by block.
//!
//! # Modules
//!
//! - `ir`: instruction, block and function types
//! - `builder`: open/sealed block state machine with ref counting
//! - `range_set`: interval sets deciding switch exhaustiveness
//! - `graph`: predecessors, successors, reachability
//! - `validate`: structural invariant checks
//! - `dce`: dead instruction and unreachable block removal
//! - `print`: textual dumps

mod builder;
mod dce;
pub mod graph;
mod ir;
mod print;
mod range_set;
mod validate;

#[cfg(test)]
mod test_helpers;

pub use builder::IrBuilder;
pub use dce::{eliminate_dead_instrs, recompute_ref_counts, remove_unreachable_blocks};
pub use ir::{
    BlockId, InstrId, InstrKind, IrBlock, IrFunction, IrInstr, IrParam, PhiIncoming, SwitchCase,
};
pub use range_set::{RangeSet, RangeWithSrc};
pub use validate::{validate, IrViolation};
