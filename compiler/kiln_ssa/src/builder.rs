//! Instruction builder with per-block open/sealed state.
//!
//! Follows the "position at a block, emit instructions, terminate" pattern
//! of LLVM's `IRBuilder`. Every emit bumps the `ref_count` of its operands;
//! every terminator seals the current block and bumps the `ref_count` of
//! each successor block.
//!
//! Misuse (appending to a sealed block, a phi after a non-phi) is a
//! compiler bug and panics.

use kiln_const::ConstValue;
use kiln_ir::{BinaryOp, FnId, Name, Span, TypeId, UnaryOp};

use crate::ir::{
    BlockId, InstrId, InstrKind, IrBlock, IrFunction, IrInstr, IrParam, PhiIncoming, SwitchCase,
};

/// Builder for an in-progress [`IrFunction`].
///
/// Consumed by [`finish`](IrBuilder::finish).
pub struct IrBuilder {
    blocks: Vec<IrBlock>,
    instrs: Vec<IrInstr>,
    current_block: BlockId,
}

impl Default for IrBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IrBuilder {
    /// Create a builder with an open entry block.
    pub fn new() -> Self {
        Self {
            blocks: vec![IrBlock::new(BlockId::new(0), "entry")],
            instrs: Vec::new(),
            current_block: BlockId::new(0),
        }
    }

    // ── Block management ────────────────────────────────────────────

    /// Allocate a new open block and return its ID.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "block indices never exceed u32"
    )]
    pub fn new_block(&mut self, name_hint: &'static str) -> BlockId {
        let id = BlockId::new(self.blocks.len() as u32);
        self.blocks.push(IrBlock::new(id, name_hint));
        id
    }

    /// Set the insertion point.
    pub fn position_at(&mut self, block: BlockId) {
        assert!(
            block.index() < self.blocks.len(),
            "BlockId {} out of bounds (have {} blocks)",
            block.raw(),
            self.blocks.len(),
        );
        self.current_block = block;
    }

    #[inline]
    pub fn current_block(&self) -> BlockId {
        self.current_block
    }

    #[inline]
    pub fn entry_block(&self) -> BlockId {
        BlockId::new(0)
    }

    /// Whether the current block already has its terminator.
    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.blocks[self.current_block.index()].sealed
    }

    #[inline]
    pub fn block(&self, id: BlockId) -> &IrBlock {
        &self.blocks[id.index()]
    }

    #[inline]
    pub fn instr(&self, id: InstrId) -> &IrInstr {
        &self.instrs[id.index()]
    }

    /// Result type of an emitted instruction.
    #[inline]
    pub fn ty_of(&self, id: InstrId) -> TypeId {
        self.instrs[id.index()].ty
    }

    // ── Core append ─────────────────────────────────────────────────

    #[allow(
        clippy::cast_possible_truncation,
        reason = "instruction indices never exceed u32"
    )]
    fn append(&mut self, kind: InstrKind, ty: TypeId, span: Option<Span>) -> InstrId {
        let block_id = self.current_block;
        let block = &self.blocks[block_id.index()];
        assert!(
            !block.sealed,
            "cannot append `{}` to sealed block {}",
            kind.mnemonic(),
            block_id.raw(),
        );
        if kind.is_phi() {
            let all_phis = block
                .instrs
                .iter()
                .all(|id| self.instrs[id.index()].kind.is_phi());
            assert!(
                all_phis,
                "phi must precede every non-phi instruction in block {}",
                block_id.raw(),
            );
        }

        for operand in kind.operands() {
            self.instrs[operand.index()].ref_count += 1;
        }
        let is_terminator = kind.is_terminator();
        if is_terminator {
            for succ in kind.successors() {
                self.blocks[succ.index()].ref_count += 1;
            }
        }

        let id = InstrId::new(self.instrs.len() as u32);
        self.instrs.push(IrInstr {
            kind,
            ty,
            ref_count: 0,
            span,
            block: block_id,
            backend: None,
        });
        let block = &mut self.blocks[block_id.index()];
        block.instrs.push(id);
        block.sealed = is_terminator;
        id
    }

    // ── Value instructions ──────────────────────────────────────────

    pub fn emit_const(&mut self, value: ConstValue, span: Option<Span>) -> InstrId {
        let ty = value.ty;
        self.append(InstrKind::Const(value), ty, span)
    }

    pub fn emit_param(&mut self, index: u32, ty: TypeId, span: Option<Span>) -> InstrId {
        self.append(InstrKind::Param { index }, ty, span)
    }

    pub fn emit_binop(
        &mut self,
        op: BinaryOp,
        lhs: InstrId,
        rhs: InstrId,
        ty: TypeId,
        span: Option<Span>,
    ) -> InstrId {
        self.append(InstrKind::BinOp { op, lhs, rhs }, ty, span)
    }

    pub fn emit_unop(
        &mut self,
        op: UnaryOp,
        operand: InstrId,
        ty: TypeId,
        span: Option<Span>,
    ) -> InstrId {
        self.append(InstrKind::UnOp { op, operand }, ty, span)
    }

    pub fn emit_cast(&mut self, value: InstrId, ty: TypeId, span: Option<Span>) -> InstrId {
        self.append(InstrKind::Cast { value }, ty, span)
    }

    pub fn emit_call(
        &mut self,
        callee: FnId,
        args: Vec<InstrId>,
        ty: TypeId,
        span: Option<Span>,
    ) -> InstrId {
        self.append(InstrKind::Call { callee, args }, ty, span)
    }

    /// Allocate a stack slot. `ptr_ty` is the pointer-to-slot type.
    pub fn emit_alloca(&mut self, name: Option<Name>, ptr_ty: TypeId, span: Option<Span>) -> InstrId {
        self.append(InstrKind::Alloca { name }, ptr_ty, span)
    }

    pub fn emit_load(&mut self, ptr: InstrId, ty: TypeId, span: Option<Span>) -> InstrId {
        self.append(InstrKind::Load { ptr }, ty, span)
    }

    pub fn emit_store(&mut self, ptr: InstrId, value: InstrId, span: Option<Span>) -> InstrId {
        self.append(InstrKind::Store { ptr, value }, TypeId::VOID, span)
    }

    pub fn emit_field_ptr(
        &mut self,
        base: InstrId,
        field: u32,
        ptr_ty: TypeId,
        span: Option<Span>,
    ) -> InstrId {
        self.append(InstrKind::FieldPtr { base, field }, ptr_ty, span)
    }

    pub fn emit_elem_ptr(
        &mut self,
        base: InstrId,
        index: InstrId,
        ptr_ty: TypeId,
        span: Option<Span>,
    ) -> InstrId {
        self.append(InstrKind::ElemPtr { base, index }, ptr_ty, span)
    }

    /// Emit a phi at the front of the current block.
    ///
    /// Panics if a non-phi instruction was already appended.
    pub fn emit_phi(
        &mut self,
        ty: TypeId,
        incoming: Vec<PhiIncoming>,
        span: Option<Span>,
    ) -> InstrId {
        self.append(InstrKind::Phi { incoming }, ty, span)
    }

    /// Extend a phi with another `(predecessor, value)` pair.
    pub fn add_phi_incoming(&mut self, phi: InstrId, block: BlockId, value: InstrId) {
        let InstrKind::Phi { incoming } = &mut self.instrs[phi.index()].kind else {
            panic!("add_phi_incoming on non-phi instruction {}", phi.raw());
        };
        incoming.push(PhiIncoming { block, value });
        self.instrs[value.index()].ref_count += 1;
    }

    // ── Terminators ─────────────────────────────────────────────────

    /// Unconditional branch.
    pub fn br(&mut self, target: BlockId, span: Option<Span>) -> InstrId {
        self.append(InstrKind::Br { target }, TypeId::NORETURN, span)
    }

    pub fn cond_br(
        &mut self,
        cond: InstrId,
        then_block: BlockId,
        else_block: BlockId,
        span: Option<Span>,
    ) -> InstrId {
        self.append(
            InstrKind::CondBr {
                cond,
                then_block,
                else_block,
            },
            TypeId::NORETURN,
            span,
        )
    }

    pub fn switch_br(
        &mut self,
        subject: InstrId,
        cases: Vec<SwitchCase>,
        default: BlockId,
        span: Option<Span>,
    ) -> InstrId {
        self.append(
            InstrKind::SwitchBr {
                subject,
                cases,
                default,
            },
            TypeId::NORETURN,
            span,
        )
    }

    pub fn ret(&mut self, value: Option<InstrId>, span: Option<Span>) -> InstrId {
        self.append(InstrKind::Return { value }, TypeId::NORETURN, span)
    }

    pub fn unreachable(&mut self, span: Option<Span>) -> InstrId {
        self.append(InstrKind::Unreachable, TypeId::NORETURN, span)
    }

    // ── Finalization ────────────────────────────────────────────────

    /// Consume the builder and produce the finished function.
    ///
    /// Open blocks get `Unreachable` as a fallback (with a tracing warning).
    pub fn finish(
        mut self,
        name: Name,
        fn_id: FnId,
        params: Vec<IrParam>,
        return_type: TypeId,
    ) -> IrFunction {
        for index in 0..self.blocks.len() {
            if !self.blocks[index].sealed {
                tracing::warn!(block = index, "unterminated block in IR, adding Unreachable");
                self.current_block = self.blocks[index].id;
                self.unreachable(None);
            }
        }

        IrFunction {
            name,
            fn_id,
            params,
            return_type,
            blocks: self.blocks,
            instrs: self.instrs,
            entry: BlockId::new(0),
        }
    }
}

#[cfg(test)]
mod tests;
