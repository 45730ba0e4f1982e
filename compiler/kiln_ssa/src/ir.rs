//! SSA IR: basic blocks of typed, reference-counted instructions.
//!
//! # Architecture
//!
//! - **[`IrFunction`]**: parameters, blocks, and the instruction arena
//! - **[`IrBlock`]**: an ordered list of [`InstrId`]s ending in a terminator
//! - **[`IrInstr`]**: one operation with its result type and `ref_count`
//!
//! Instructions live in one arena per function and blocks refer to them by
//! ID. Removing an instruction from a block leaves its arena slot in place,
//! so IDs stay stable across passes.
//!
//! Unlike a block-parameter IR, control-flow merges use [`InstrKind::Phi`]
//! instructions at the front of the confluence block.

use kiln_const::ConstValue;
use kiln_ir::{BackendHandle, BinaryOp, FnId, Name, Span, TypeId, UnaryOp};
use smallvec::{smallvec, SmallVec};

// ── ID newtypes ─────────────────────────────────────────────────────

/// Instruction ID within an [`IrFunction`].
///
/// Allocated sequentially from 0 in the function's instruction arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct InstrId(u32);

impl InstrId {
    /// Create a new instruction ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Basic block ID within an [`IrFunction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    /// Create a new block ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── Operand helpers ─────────────────────────────────────────────────

/// One `(literal, target)` arm of a [`InstrKind::SwitchBr`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SwitchCase {
    pub value: ConstValue,
    pub target: BlockId,
}

/// One `(predecessor, value)` pair of a [`InstrKind::Phi`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PhiIncoming {
    pub block: BlockId,
    pub value: InstrId,
}

// ── Instructions ────────────────────────────────────────────────────

/// The operation an instruction performs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstrKind {
    /// A compile-time constant materialized for runtime use.
    Const(ConstValue),
    /// The function's `index`-th runtime parameter.
    Param { index: u32 },
    BinOp {
        op: BinaryOp,
        lhs: InstrId,
        rhs: InstrId,
    },
    UnOp {
        op: UnaryOp,
        operand: InstrId,
    },
    /// Numeric or pointer conversion to the instruction's type.
    Cast { value: InstrId },
    Call { callee: FnId, args: Vec<InstrId> },
    /// Stack slot; the instruction's type is a pointer to the slot type.
    Alloca { name: Option<Name> },
    Load { ptr: InstrId },
    Store { ptr: InstrId, value: InstrId },
    /// Address of field `field` (generated index) of the struct behind `base`.
    FieldPtr { base: InstrId, field: u32 },
    /// Address of element `index` of the array behind `base`.
    ElemPtr { base: InstrId, index: InstrId },
    Phi { incoming: Vec<PhiIncoming> },

    // Terminators
    Br { target: BlockId },
    CondBr {
        cond: InstrId,
        then_block: BlockId,
        else_block: BlockId,
    },
    SwitchBr {
        subject: InstrId,
        cases: Vec<SwitchCase>,
        default: BlockId,
    },
    Return { value: Option<InstrId> },
    Unreachable,
}

impl InstrKind {
    /// Whether this kind ends a basic block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Self::Br { .. }
                | Self::CondBr { .. }
                | Self::SwitchBr { .. }
                | Self::Return { .. }
                | Self::Unreachable
        )
    }

    #[inline]
    pub fn is_phi(&self) -> bool {
        matches!(self, Self::Phi { .. })
    }

    /// Instructions that must be kept even when nothing uses their result.
    pub fn has_side_effects(&self) -> bool {
        self.is_terminator() || matches!(self, Self::Store { .. } | Self::Call { .. })
    }

    /// Instruction operands, in source order.
    pub fn operands(&self) -> SmallVec<[InstrId; 4]> {
        match self {
            Self::Const(_)
            | Self::Param { .. }
            | Self::Alloca { .. }
            | Self::Br { .. }
            | Self::Unreachable => SmallVec::new(),
            Self::BinOp { lhs, rhs, .. } => smallvec![*lhs, *rhs],
            Self::UnOp { operand, .. } => smallvec![*operand],
            Self::Cast { value } => smallvec![*value],
            Self::Call { args, .. } => args.iter().copied().collect(),
            Self::Load { ptr } => smallvec![*ptr],
            Self::Store { ptr, value } => smallvec![*ptr, *value],
            Self::FieldPtr { base, .. } => smallvec![*base],
            Self::ElemPtr { base, index } => smallvec![*base, *index],
            Self::Phi { incoming } => incoming.iter().map(|inc| inc.value).collect(),
            Self::CondBr { cond, .. } => smallvec![*cond],
            Self::SwitchBr { subject, .. } => smallvec![*subject],
            Self::Return { value } => value.iter().copied().collect(),
        }
    }

    /// Successor blocks of a terminator; empty for everything else.
    ///
    /// Returns `SmallVec<[BlockId; 4]>` to avoid heap allocation for the
    /// common case (max 2 successors except switch with many cases).
    pub fn successors(&self) -> SmallVec<[BlockId; 4]> {
        match self {
            Self::Br { target } => smallvec![*target],
            Self::CondBr {
                then_block,
                else_block,
                ..
            } => smallvec![*then_block, *else_block],
            Self::SwitchBr { cases, default, .. } => {
                let mut targets = SmallVec::with_capacity(cases.len() + 1);
                for case in cases {
                    targets.push(case.target);
                }
                targets.push(*default);
                targets
            }
            _ => SmallVec::new(),
        }
    }

    /// Rewrite every block reference (successors and phi predecessors).
    pub fn map_blocks(&mut self, mut f: impl FnMut(BlockId) -> BlockId) {
        match self {
            Self::Br { target } => *target = f(*target),
            Self::CondBr {
                then_block,
                else_block,
                ..
            } => {
                *then_block = f(*then_block);
                *else_block = f(*else_block);
            }
            Self::SwitchBr { cases, default, .. } => {
                for case in cases {
                    case.target = f(case.target);
                }
                *default = f(*default);
            }
            Self::Phi { incoming } => {
                for inc in incoming {
                    inc.block = f(inc.block);
                }
            }
            _ => {}
        }
    }

    /// Printer mnemonic.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Const(_) => "const",
            Self::Param { .. } => "param",
            Self::BinOp { op, .. } => op.mnemonic(),
            Self::UnOp { op, .. } => op.mnemonic(),
            Self::Cast { .. } => "cast",
            Self::Call { .. } => "call",
            Self::Alloca { .. } => "alloca",
            Self::Load { .. } => "load",
            Self::Store { .. } => "store",
            Self::FieldPtr { .. } => "field_ptr",
            Self::ElemPtr { .. } => "elem_ptr",
            Self::Phi { .. } => "phi",
            Self::Br { .. } => "br",
            Self::CondBr { .. } => "cond_br",
            Self::SwitchBr { .. } => "switch_br",
            Self::Return { .. } => "ret",
            Self::Unreachable => "unreachable",
        }
    }
}

/// A single instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrInstr {
    pub kind: InstrKind,
    /// Result type. Terminators and stores have `noreturn`/`void`.
    pub ty: TypeId,
    /// Number of instruction operands referring to this result.
    pub ref_count: u32,
    pub span: Option<Span>,
    /// The block this instruction was appended to.
    pub block: BlockId,
    /// Set by the native backend after it lowers this instruction.
    pub backend: Option<BackendHandle>,
}

impl IrInstr {
    /// Dead: unused and free of side effects.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.ref_count == 0 && !self.kind.has_side_effects()
    }
}

// ── Blocks and functions ────────────────────────────────────────────

/// A basic block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrBlock {
    pub id: BlockId,
    /// Printer hint (`entry`, `then`, `merge`, ...).
    pub name_hint: &'static str,
    pub instrs: Vec<InstrId>,
    /// Number of terminator edges targeting this block.
    pub ref_count: u32,
    /// A terminator has been appended; no further appends allowed.
    pub sealed: bool,
}

impl IrBlock {
    pub(crate) fn new(id: BlockId, name_hint: &'static str) -> Self {
        Self {
            id,
            name_hint,
            instrs: Vec::new(),
            ref_count: 0,
            sealed: false,
        }
    }

    /// The last instruction, which is the terminator once sealed.
    #[inline]
    pub fn last(&self) -> Option<InstrId> {
        self.instrs.last().copied()
    }
}

/// A runtime function parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IrParam {
    pub name: Name,
    pub ty: TypeId,
}

/// A lowered function body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrFunction {
    pub name: Name,
    pub fn_id: FnId,
    pub params: Vec<IrParam>,
    pub return_type: TypeId,
    pub blocks: Vec<IrBlock>,
    pub instrs: Vec<IrInstr>,
    pub entry: BlockId,
}

impl IrFunction {
    #[inline]
    pub fn block(&self, id: BlockId) -> &IrBlock {
        &self.blocks[id.index()]
    }

    #[inline]
    pub fn instr(&self, id: InstrId) -> &IrInstr {
        &self.instrs[id.index()]
    }

    #[inline]
    pub fn instr_mut(&mut self, id: InstrId) -> &mut IrInstr {
        &mut self.instrs[id.index()]
    }

    /// The terminator of `block`, if it is sealed.
    pub fn terminator(&self, block: BlockId) -> Option<&IrInstr> {
        let b = self.block(block);
        let last = b.last()?;
        let instr = self.instr(last);
        instr.kind.is_terminator().then_some(instr)
    }

    /// Successors of `block` (empty for unsealed or exiting blocks).
    pub fn successors(&self, block: BlockId) -> SmallVec<[BlockId; 4]> {
        self.terminator(block)
            .map(|t| t.kind.successors())
            .unwrap_or_default()
    }

    /// Instructions still placed in some block, in block order.
    pub fn placed_instrs(&self) -> impl Iterator<Item = InstrId> + '_ {
        self.blocks.iter().flat_map(|b| b.instrs.iter().copied())
    }

    /// Attach a backend handle to an instruction.
    pub fn set_backend_handle(&mut self, id: InstrId, handle: BackendHandle) {
        self.instrs[id.index()].backend = Some(handle);
    }
}
