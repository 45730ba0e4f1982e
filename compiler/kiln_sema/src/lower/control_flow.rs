//! Blocks, `if`, `while`, `break`/`continue` and `return`.
//!
//! Branching constructs lower each arm into its own block and join the
//! live arms at a merge block, with a phi when the result is a runtime
//! value. A compile-time condition selects one arm and emits no branch at
//! all; the other arm is not analysed.

use kiln_ir::{ExprId, Name, Span, Stmt, TypeId};
use kiln_ssa::{BlockId, PhiIncoming};

use super::{Lowerer, Operand};
use crate::problem::LowerProblem;
use crate::scope::{LoopTargets, ScopeKind};

impl Lowerer<'_> {
    // ── Merging ────────────────────────────────────────────────────

    /// Join the arms that fall through to `merge`.
    ///
    /// `arms` holds each live arm's result with the block it ended in.
    /// Arms that diverged are left out by the caller.
    pub(crate) fn merge_arms(
        &mut self,
        arms: Vec<(Operand, BlockId)>,
        merge: BlockId,
        expected: Option<TypeId>,
        span: Span,
    ) -> Operand {
        if arms.is_empty() {
            self.builder.position_at(merge);
            self.builder.unreachable(Some(span));
            return Operand::diverged();
        }
        if arms.iter().any(|(op, _)| op.is_invalid()) {
            self.branch_all(&arms, merge);
            return Operand::invalid();
        }

        let mut peer = arms[0].0.ty;
        for (op, _) in &arms[1..] {
            match self.peer_type(peer, op.ty) {
                Some(ty) => peer = ty,
                None => {
                    let problem = LowerProblem::NoPeerType {
                        span,
                        lhs: peer,
                        rhs: op.ty,
                    };
                    self.branch_all(&arms, merge);
                    return self.report(problem);
                }
            }
        }

        let ty = match expected {
            Some(exp)
                if self.ctx.types.is_comptime_only(peer)
                    && !exp.is_invalid()
                    && !self.ctx.types.is_comptime_only(exp) =>
            {
                exp
            }
            _ => peer,
        };

        let mut values = Vec::with_capacity(arms.len());
        for (op, end) in arms {
            self.builder.position_at(end);
            let op = self.coerce(op, ty, span);
            values.push((op, end));
        }
        if values.iter().any(|(op, _)| op.is_invalid()) {
            self.branch_all(&values, merge);
            return Operand::invalid();
        }

        // Every arm yields the same compile-time value: no phi needed.
        let first = values[0].0.as_comptime().cloned();
        if let Some(value) = first {
            if values.iter().all(|(op, _)| op.as_comptime() == Some(&value)) {
                self.branch_all(&values, merge);
                return Operand::comptime(value);
            }
        }
        if self.ctx.types.is_comptime_only(ty) {
            self.branch_all(&values, merge);
            return self.report(LowerProblem::NotComptime {
                span,
                what: "branch result of a compile-time-only type",
            });
        }

        let mut incoming = Vec::with_capacity(values.len());
        for (op, end) in &values {
            self.builder.position_at(*end);
            let Some(value) = self.materialize(op, span) else {
                continue;
            };
            incoming.push(PhiIncoming { block: *end, value });
            self.builder.br(merge, None);
        }
        self.builder.position_at(merge);
        let phi = self.builder.emit_phi(ty, incoming, Some(span));
        Operand::runtime(phi, ty)
    }

    /// Branch from every arm end to `merge` and continue there.
    fn branch_all(&mut self, arms: &[(Operand, BlockId)], merge: BlockId) {
        for &(_, end) in arms {
            self.builder.position_at(end);
            if !self.builder.is_sealed() {
                self.builder.br(merge, None);
            }
        }
        self.builder.position_at(merge);
    }

    /// Lower a branch condition as `bool`. `Err` carries the operand to
    /// return when no branch can be taken.
    fn lower_condition(&mut self, cond: ExprId) -> Result<Operand, Operand> {
        let span = self.span(cond);
        let c = self.lower_expr(cond);
        let c = self.coerce(c, TypeId::BOOL, span);
        if !c.is_usable() {
            return Err(c);
        }
        if c.as_comptime().is_some_and(kiln_const::ConstValue::is_undef) {
            return Err(self.report(LowerProblem::UseOfUndefined { span }));
        }
        Ok(c)
    }

    // ── If ─────────────────────────────────────────────────────────

    pub(crate) fn lower_if(
        &mut self,
        cond: ExprId,
        then_branch: ExprId,
        else_branch: Option<ExprId>,
        expected: Option<TypeId>,
        span: Span,
    ) -> Operand {
        let c = match self.lower_condition(cond) {
            Ok(c) => c,
            Err(op) => return op,
        };

        if let Some(taken) = c.as_comptime().and_then(kiln_const::ConstValue::as_bool) {
            return match (taken, else_branch) {
                (true, Some(_)) => self.lower_expr_expecting(then_branch, expected),
                (false, Some(e)) => self.lower_expr_expecting(e, expected),
                (true, None) => self.lower_void_arm(then_branch),
                (false, None) => Operand::void(),
            };
        }

        let Some(cond_id) = self.materialize(&c, span) else {
            return Operand::diverged();
        };
        let then_block = self.builder.new_block("if_then");
        let Some(else_expr) = else_branch else {
            let end = self.builder.new_block("if_end");
            self.builder.cond_br(cond_id, then_block, end, Some(span));
            self.builder.position_at(then_block);
            let result = self.lower_void_arm(then_branch);
            if !self.builder.is_sealed() {
                self.builder.br(end, None);
            }
            self.builder.position_at(end);
            return if result.is_invalid() {
                result
            } else {
                Operand::void()
            };
        };

        let else_block = self.builder.new_block("if_else");
        let end = self.builder.new_block("if_end");
        self.builder.cond_br(cond_id, then_block, else_block, Some(span));

        let mut arms = Vec::with_capacity(2);
        for (block, body) in [(then_block, then_branch), (else_block, else_expr)] {
            self.builder.position_at(block);
            let result = self.lower_expr_expecting(body, expected);
            if !self.builder.is_sealed() {
                arms.push((result, self.builder.current_block()));
            }
        }
        self.merge_arms(arms, end, expected, span)
    }

    /// An arm whose value is discarded must be `void`.
    fn lower_void_arm(&mut self, body: ExprId) -> Operand {
        let result = self.lower_expr_expecting(body, Some(TypeId::VOID));
        self.coerce(result, TypeId::VOID, self.span(body))
    }

    // ── Loops ──────────────────────────────────────────────────────

    pub(crate) fn lower_while(
        &mut self,
        label: Option<Name>,
        cond: ExprId,
        body: ExprId,
        span: Span,
    ) -> Operand {
        let cond_block = self.builder.new_block("while_cond");
        self.builder.br(cond_block, Some(span));
        self.builder.position_at(cond_block);

        let c = match self.lower_condition(cond) {
            Ok(c) => c,
            Err(op) if op.is_diverged() => return op,
            Err(_) => {
                let end = self.builder.new_block("while_end");
                self.builder.br(end, None);
                self.builder.position_at(end);
                return Operand::invalid();
            }
        };
        let taken = c.as_comptime().and_then(kiln_const::ConstValue::as_bool);
        if taken == Some(false) {
            let end = self.builder.new_block("while_end");
            self.builder.br(end, None);
            self.builder.position_at(end);
            return Operand::void();
        }
        let body_block = self.builder.new_block("while_body");
        let end = self.builder.new_block("while_end");
        if taken.is_some() {
            self.builder.br(body_block, None);
        } else {
            let Some(cond_id) = self.materialize(&c, span) else {
                return Operand::diverged();
            };
            self.builder.cond_br(cond_id, body_block, end, Some(span));
        }

        let targets = LoopTargets {
            break_block: end,
            continue_block: cond_block,
        };
        let loop_scope = self.ctx.scopes.push_loop(self.scope, targets, label);
        self.builder.position_at(body_block);
        let result = self.in_scope(loop_scope, |this| this.lower_void_arm(body));
        if !self.builder.is_sealed() {
            self.builder.br(cond_block, None);
        }
        self.builder.position_at(end);
        if result.is_invalid() {
            result
        } else {
            Operand::void()
        }
    }

    /// `break` (`is_break`) or `continue`, optionally to a labelled loop.
    pub(crate) fn lower_jump(&mut self, label: Option<Name>, is_break: bool, span: Span) -> Operand {
        let targets = match label {
            Some(label) => self.ctx.scopes.lookup_label(self.scope, label).ok_or(
                LowerProblem::UnknownLabel { span, label },
            ),
            None => self.ctx.scopes.enclosing_loop(self.scope).ok_or(
                LowerProblem::BreakOutsideLoop {
                    span,
                    keyword: if is_break { "break" } else { "continue" },
                },
            ),
        };
        match targets {
            Ok(targets) => {
                let target = if is_break {
                    targets.break_block
                } else {
                    targets.continue_block
                };
                self.builder.br(target, Some(span));
                Operand::diverged()
            }
            Err(problem) => self.report(problem),
        }
    }

    // ── Blocks ─────────────────────────────────────────────────────

    pub(crate) fn lower_block(
        &mut self,
        stmts: &[Stmt],
        result: Option<ExprId>,
        expected: Option<TypeId>,
    ) -> Operand {
        let scope = self.ctx.scopes.push(self.scope, ScopeKind::Block);
        self.in_scope(scope, |this| {
            for stmt in stmts {
                if this.builder.is_sealed() {
                    let span = this.stmt_span(stmt);
                    this.report(LowerProblem::UnreachableCode { span });
                    return Operand::diverged();
                }
                this.lower_stmt(stmt);
            }
            match result {
                Some(e) if this.builder.is_sealed() => {
                    let span = this.span(e);
                    this.report(LowerProblem::UnreachableCode { span });
                    Operand::diverged()
                }
                Some(e) => this.lower_expr_expecting(e, expected),
                None if this.builder.is_sealed() => Operand::diverged(),
                None => Operand::void(),
            }
        })
    }

    fn stmt_span(&self, stmt: &Stmt) -> Span {
        match stmt {
            Stmt::Let { span, .. } | Stmt::Assign { span, .. } => *span,
            Stmt::Expr(e) => self.span(*e),
        }
    }

    // ── Return ─────────────────────────────────────────────────────

    pub(crate) fn lower_return(&mut self, value: Option<ExprId>, span: Span) -> Operand {
        let op = match value {
            Some(e) => self.lower_expr_expecting(e, Some(self.return_type)),
            None => Operand::void(),
        };
        if op.is_diverged() {
            return op;
        }
        self.emit_return(op, span);
        Operand::diverged()
    }

    /// Terminate the current block with a return of `op`.
    pub(crate) fn emit_return(&mut self, op: Operand, span: Span) {
        let op = self.coerce(op, self.return_type, span);
        if op.is_diverged() {
            return;
        }
        if op.is_invalid() {
            self.builder.unreachable(Some(span));
            return;
        }
        if self.ctx.types.canonical(self.return_type) == TypeId::VOID {
            self.builder.ret(None, Some(span));
            return;
        }
        match self.materialize(&op, span) {
            Some(id) => {
                self.builder.ret(Some(id), Some(span));
            }
            None => {
                self.builder.unreachable(Some(span));
            }
        }
    }
}
