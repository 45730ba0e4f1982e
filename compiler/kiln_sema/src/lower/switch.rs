//! `switch` case analysis and lowering.
//!
//! Case items are compile-time values of the subject type (ranges for
//! integers). Every item lands in a [`RangeSet`]; an overlap is a
//! duplicate case. The switch is exhaustive when the items span the
//! subject's full value range, or name every variant of an enum.

use kiln_const::ConstValue;
use kiln_ir::{BinaryOp, ExprId, Span, SwitchItem, SwitchProng, TypeId};
use kiln_ssa::{BlockId, InstrId, RangeSet, SwitchCase};
use num_bigint::BigInt;

use super::{Lowerer, Operand};
use crate::problem::LowerProblem;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SubjectKind {
    Int,
    Bool,
    Enum,
}

/// Analysed case items of one prong.
#[derive(Default)]
struct ProngCases {
    singles: Vec<(BigInt, ConstValue)>,
    ranges: Vec<(BigInt, BigInt, ConstValue, ConstValue)>,
}

impl ProngCases {
    fn matches(&self, key: &BigInt) -> bool {
        self.singles.iter().any(|(k, _)| k == key)
            || self
                .ranges
                .iter()
                .any(|(lo, hi, _, _)| lo <= key && key <= hi)
    }
}

struct SwitchAnalysis {
    prongs: Vec<ProngCases>,
    else_prong: Option<usize>,
}

/// Integer key of a case value in the [`RangeSet`].
fn case_key(value: &ConstValue) -> Option<BigInt> {
    value
        .as_int()
        .or_else(|| value.as_bool().map(|b| BigInt::from(u8::from(b))))
}

impl Lowerer<'_> {
    pub(crate) fn lower_switch(
        &mut self,
        subject: ExprId,
        prongs: &[SwitchProng],
        expected: Option<TypeId>,
        span: Span,
    ) -> Operand {
        let subj = self.lower_expr(subject);
        if !subj.is_usable() {
            return subj;
        }
        let ty = subj.ty;
        let types = &self.ctx.types;
        let kind = if types.is_int(ty) {
            SubjectKind::Int
        } else if types.canonical(ty) == TypeId::BOOL {
            SubjectKind::Bool
        } else if types.enum_type(ty).is_some() {
            SubjectKind::Enum
        } else {
            return self.report(LowerProblem::UnsupportedOp {
                span: self.span(subject),
                op: "switch",
                ty,
            });
        };

        let Some(analysis) = self.analyze_cases(ty, kind, prongs, span) else {
            return Operand::invalid();
        };

        if let Some(value) = subj.as_comptime() {
            let Some(key) = case_key(value) else {
                return self.report(LowerProblem::UseOfUndefined {
                    span: self.span(subject),
                });
            };
            let taken = analysis
                .prongs
                .iter()
                .position(|p| p.matches(&key))
                .or(analysis.else_prong);
            return match taken {
                Some(i) => self.lower_expr_expecting(prongs[i].body, expected),
                None => self.report(LowerProblem::NoMatchingProng {
                    span: self.span(subject),
                    value: key,
                }),
            };
        }

        let Some(subject_id) = self.materialize(&subj, span) else {
            return Operand::diverged();
        };
        self.lower_runtime_switch(subject_id, prongs, analysis, expected, span)
    }

    // ── Case analysis ──────────────────────────────────────────────

    /// Check every case item and the switch's exhaustiveness. `None`
    /// after a reported error.
    fn analyze_cases(
        &mut self,
        ty: TypeId,
        kind: SubjectKind,
        prongs: &[SwitchProng],
        span: Span,
    ) -> Option<SwitchAnalysis> {
        let mut seen: RangeSet<Span> = RangeSet::new();
        let mut else_prong: Option<(usize, Span)> = None;
        let mut cases = Vec::with_capacity(prongs.len());
        let mut ok = true;

        for (i, prong) in prongs.iter().enumerate() {
            let mut prong_cases = ProngCases::default();
            if prong.is_else {
                if let Some((_, previous)) = else_prong {
                    self.report(LowerProblem::DuplicateElse {
                        span: prong.span,
                        previous,
                    });
                    ok = false;
                } else {
                    else_prong = Some((i, prong.span));
                }
            }
            for item in &prong.items {
                let item_span = item.span(self.arena);
                match *item {
                    SwitchItem::Single(e) => {
                        let Some(value) = self.case_value(e, ty) else {
                            ok = false;
                            continue;
                        };
                        let Some(key) = case_key(&value) else {
                            ok = false;
                            continue;
                        };
                        if let Some(previous) = seen.add_range(key.clone(), key.clone(), item_span)
                        {
                            self.report(LowerProblem::DuplicateCase {
                                span: item_span,
                                previous,
                            });
                            ok = false;
                            continue;
                        }
                        prong_cases.singles.push((key, value));
                    }
                    SwitchItem::Range { start, end } => {
                        if kind != SubjectKind::Int {
                            self.report(LowerProblem::UnsupportedOp {
                                span: item_span,
                                op: "range case",
                                ty,
                            });
                            ok = false;
                            continue;
                        }
                        let (Some(lo), Some(hi)) = (self.case_value(start, ty), self.case_value(end, ty))
                        else {
                            ok = false;
                            continue;
                        };
                        let (Some(lo_key), Some(hi_key)) = (case_key(&lo), case_key(&hi)) else {
                            ok = false;
                            continue;
                        };
                        if lo_key > hi_key {
                            self.report(LowerProblem::InvertedRange {
                                span: item_span,
                                start: lo_key,
                                end: hi_key,
                            });
                            ok = false;
                            continue;
                        }
                        if let Some(previous) =
                            seen.add_range(lo_key.clone(), hi_key.clone(), item_span)
                        {
                            self.report(LowerProblem::DuplicateCase {
                                span: item_span,
                                previous,
                            });
                            ok = false;
                            continue;
                        }
                        prong_cases.ranges.push((lo_key, hi_key, lo, hi));
                    }
                }
            }
            cases.push(prong_cases);
        }
        if !ok {
            return None;
        }

        let types = &self.ctx.types;
        let exhaustive = match kind {
            SubjectKind::Int | SubjectKind::Bool => types
                .int_range(ty)
                .is_some_and(|(min, max)| seen.spans(&min, &max)),
            SubjectKind::Enum => types
                .enum_type(ty)
                .is_some_and(|en| en.fields.iter().all(|f| seen.covers(&f.value))),
        };
        tracing::debug!(
            prongs = prongs.len(),
            ranges = seen.len(),
            exhaustive,
            "analysed switch cases"
        );
        match (exhaustive, else_prong) {
            (true, Some((_, else_span))) => {
                self.report(LowerProblem::RedundantElse { span: else_span });
                None
            }
            (false, None) => {
                self.report(LowerProblem::NonExhaustive { span, ty });
                None
            }
            _ => Some(SwitchAnalysis {
                prongs: cases,
                else_prong: else_prong.map(|(i, _)| i),
            }),
        }
    }

    /// A case item as a compile-time value of the subject type.
    fn case_value(&mut self, e: ExprId, ty: TypeId) -> Option<ConstValue> {
        let span = self.span(e);
        let value = self.lower_expr(e);
        if !value.is_usable() {
            return None;
        }
        if value.as_comptime().is_none() {
            self.report(LowerProblem::CaseNotComptime { span });
            return None;
        }
        let value = self.coerce(value, ty, span);
        if !value.is_usable() {
            return None;
        }
        let value = value.as_comptime()?.clone();
        if value.is_undef() {
            self.report(LowerProblem::UseOfUndefined { span });
            return None;
        }
        Some(value)
    }

    // ── Lowering ───────────────────────────────────────────────────

    fn lower_runtime_switch(
        &mut self,
        subject: InstrId,
        prongs: &[SwitchProng],
        analysis: SwitchAnalysis,
        expected: Option<TypeId>,
        span: Span,
    ) -> Operand {
        let prong_blocks: Vec<BlockId> = prongs
            .iter()
            .map(|_| self.builder.new_block("switch_prong"))
            .collect();
        let merge = self.builder.new_block("switch_end");
        let fallback = match analysis.else_prong {
            Some(i) => prong_blocks[i],
            None => self.builder.new_block("switch_unreachable"),
        };

        let mut cases = Vec::new();
        let mut ranges = Vec::new();
        for (cases_of, &target) in analysis.prongs.into_iter().zip(&prong_blocks) {
            for (_, value) in cases_of.singles {
                cases.push(SwitchCase { value, target });
            }
            for (_, _, lo, hi) in cases_of.ranges {
                ranges.push((lo, hi, target));
            }
        }

        let range_blocks: Vec<BlockId> = ranges
            .iter()
            .map(|_| self.builder.new_block("switch_range"))
            .collect();
        let default = range_blocks.first().copied().unwrap_or(fallback);
        self.builder.switch_br(subject, cases, default, Some(span));

        for (i, (lo, hi, target)) in ranges.into_iter().enumerate() {
            self.builder.position_at(range_blocks[i]);
            let lo = self.builder.emit_const(lo, Some(span));
            let hi = self.builder.emit_const(hi, Some(span));
            let above = self
                .builder
                .emit_binop(BinaryOp::GtEq, subject, lo, TypeId::BOOL, Some(span));
            let below = self
                .builder
                .emit_binop(BinaryOp::LtEq, subject, hi, TypeId::BOOL, Some(span));
            let inside = self
                .builder
                .emit_binop(BinaryOp::And, above, below, TypeId::BOOL, Some(span));
            let next = range_blocks.get(i + 1).copied().unwrap_or(fallback);
            self.builder.cond_br(inside, target, next, Some(span));
        }

        if analysis.else_prong.is_none() {
            self.builder.position_at(fallback);
            self.builder.unreachable(Some(span));
        }

        let mut arms = Vec::with_capacity(prongs.len());
        for (prong, &block) in prongs.iter().zip(&prong_blocks) {
            self.builder.position_at(block);
            let result = self.lower_expr_expecting(prong.body, expected);
            if !self.builder.is_sealed() {
                arms.push((result, self.builder.current_block()));
            }
        }
        self.merge_arms(arms, merge, expected, span)
    }
}
