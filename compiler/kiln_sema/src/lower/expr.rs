//! Expression dispatch, literals, names and operators.

use kiln_const::{
    concat, fold_binary, fold_unary, int_cast, ConstPayload, ConstValue, MATERIALIZE_LIMIT,
};
use kiln_ir::{
    BinaryOp, ExprId, ExprKind, ItemKind, Name, ParsedType, Span, TypeId, UnaryOp,
};
use kiln_ssa::PhiIncoming;
use num_traits::{ToPrimitive, Zero};

use super::{Lowerer, Operand};
use crate::problem::LowerProblem;
use crate::resolve::resolve_type;
use crate::scope::Binding;

impl Lowerer<'_> {
    // ── Main dispatch ──────────────────────────────────────────────

    pub(crate) fn lower_expr(&mut self, id: ExprId) -> Operand {
        self.lower_expr_expecting(id, None)
    }

    /// Lower `id`. `expected` is the type the result will be coerced to,
    /// if known; branching expressions use it to give compile-time-only
    /// branch results a runtime type.
    pub(crate) fn lower_expr_expecting(&mut self, id: ExprId, expected: Option<TypeId>) -> Operand {
        if self.builder.is_sealed() {
            return Operand::diverged();
        }
        let arena = self.arena;
        let expr = arena.get(id);
        let span = expr.span;

        match &expr.kind {
            // ── Literals ───────────────────────────────────────
            ExprKind::Int { value, overflowed } => {
                if *overflowed {
                    return self.report(LowerProblem::LiteralOverflow { span });
                }
                Operand::comptime(ConstValue::int(TypeId::COMPTIME_INT, value.clone()))
            }
            ExprKind::Float(bits) => Operand::comptime(ConstValue::float(
                TypeId::COMPTIME_FLOAT,
                f64::from_bits(*bits),
            )),
            ExprKind::Bool(b) => Operand::comptime(ConstValue::bool(*b)),
            ExprKind::Str { bytes, c_str } => self.lower_string(bytes, *c_str),
            ExprKind::Undefined => Operand::comptime(ConstValue::undef(TypeId::UNDEFINED)),
            ExprKind::ZeroInit(ty) => {
                let ty = self.resolve(ty, span);
                if ty.is_invalid() {
                    return Operand::invalid();
                }
                if let Some(en) = self.ctx.types.enum_without_zero(ty) {
                    return self.report(LowerProblem::NoZeroValue { span, ty: en });
                }
                Operand::comptime(self.ctx.types.zero_value(ty))
            }
            ExprKind::TypeExpr(ty) => {
                let ty = self.resolve(ty, span);
                if ty.is_invalid() {
                    return Operand::invalid();
                }
                Operand::comptime(ConstValue::type_value(ty))
            }

            // ── Names ──────────────────────────────────────────
            ExprKind::Ident(name) => self.lower_ident(*name, span),
            ExprKind::EnumValue { ty, variant } => {
                let ty = self.resolve(&ParsedType::Named(*ty), span);
                if ty.is_invalid() {
                    return Operand::invalid();
                }
                self.enum_variant(ty, *variant, span)
            }

            // ── Operators ──────────────────────────────────────
            ExprKind::Binary { op, lhs, rhs } => self.lower_binary(*op, *lhs, *rhs, span),
            ExprKind::Unary { op, operand } => self.lower_unary(*op, *operand, span),
            ExprKind::Cast { expr, ty } => self.lower_cast(*expr, ty, span),

            // ── Access and aggregates ──────────────────────────
            ExprKind::Field { base, field } => self.lower_field(*base, *field, span),
            ExprKind::Index { base, index } => self.lower_index(*base, *index, span),
            ExprKind::StructInit { ty, fields } => self.lower_struct_init(ty, fields, span),
            ExprKind::ArrayInit(init) => self.lower_array_init(init, span),

            ExprKind::Call { callee, args } => self.lower_call(*callee, args, span),

            // ── Control flow ───────────────────────────────────
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.lower_if(*cond, *then_branch, *else_branch, expected, span),
            ExprKind::Switch { subject, prongs } => {
                self.lower_switch(*subject, prongs, expected, span)
            }
            ExprKind::While { label, cond, body } => self.lower_while(*label, *cond, *body, span),
            ExprKind::Break { label } => self.lower_jump(*label, true, span),
            ExprKind::Continue { label } => self.lower_jump(*label, false, span),
            ExprKind::Block { stmts, result } => self.lower_block(stmts, *result, expected),
            ExprKind::Return(value) => self.lower_return(*value, span),
            ExprKind::Unreachable => {
                self.builder.unreachable(Some(span));
                Operand::diverged()
            }
        }
    }

    /// Resolve a type annotation in the current scope.
    pub(crate) fn resolve(&mut self, ty: &ParsedType, span: Span) -> TypeId {
        let before = self.ctx.errors_reported();
        let id = resolve_type(self.ctx, self.module, self.scope, ty, span);
        if self.ctx.errors_reported() > before {
            self.failed = true;
        }
        id
    }

    // ── Literals ───────────────────────────────────────────────────

    fn lower_string(&mut self, bytes: &[u8], c_str: bool) -> Operand {
        let len = bytes.len() as u64;
        if c_str {
            let array_ty = self.ctx.types.get_array(TypeId::U8, len + 1);
            let ptr_ty = self.ctx.types.get_pointer(TypeId::U8, true);
            return Operand::comptime(self.ctx.consts.c_string(bytes, array_ty, ptr_ty));
        }
        let array_ty = self.ctx.types.get_array(TypeId::U8, len);
        let elems = bytes
            .iter()
            .map(|&b| ConstValue::int(TypeId::U8, b))
            .collect();
        Operand::comptime(ConstValue::array(array_ty, elems))
    }

    // ── Names ──────────────────────────────────────────────────────

    fn lower_ident(&mut self, name: Name, span: Span) -> Operand {
        if let Some(entry) = self.ctx.scopes.lookup_var(self.scope, name) {
            return match entry.binding.clone() {
                Binding::Value(op) => op,
                Binding::Slot { ptr, ty } => {
                    let id = self.builder.emit_load(ptr, ty, Some(span));
                    Operand::runtime(id, ty)
                }
            };
        }

        let module = self.module;
        let Some(decl) = self.ctx.scopes.lookup_decl(self.scope, name) else {
            return self.report(LowerProblem::UnknownIdent { span, name });
        };
        if self.ctx.is_invalid(decl) {
            return Operand::invalid();
        }
        match &module.item(decl).kind {
            ItemKind::Fn(_) => match self.ctx.fn_for_decl(decl) {
                Some(fn_id) => {
                    let ty = self.ctx.function(fn_id).ty;
                    Operand::comptime(ConstValue::fn_ref(ty, fn_id))
                }
                None => {
                    let ty = self.ctx.types.decl_type(decl).unwrap_or(TypeId::INVALID);
                    self.report(LowerProblem::UnsupportedOp {
                        span,
                        op: "reference to generic function",
                        ty,
                    })
                }
            },
            ItemKind::Struct(_) | ItemKind::Union(_) | ItemKind::Enum(_) | ItemKind::TypeAlias(_) => {
                let ty = self.resolve(&ParsedType::Named(name), span);
                if ty.is_invalid() {
                    return Operand::invalid();
                }
                Operand::comptime(ConstValue::type_value(ty))
            }
        }
    }

    /// `Enum.variant` as a compile-time tag value.
    pub(crate) fn enum_variant(&mut self, ty: TypeId, variant: Name, span: Span) -> Operand {
        let tag = self
            .ctx
            .types
            .enum_type(ty)
            .and_then(|en| en.field(variant))
            .map(|f| f.value.clone());
        match tag {
            Some(tag) => Operand::comptime(ConstValue::enum_value(ty, tag)),
            None => self.report(LowerProblem::NoSuchMember {
                span,
                ty,
                name: variant,
            }),
        }
    }

    // ── Binary operators ───────────────────────────────────────────

    fn supports(&self, op: BinaryOp, ty: TypeId) -> bool {
        let types = &self.ctx.types;
        let ty = types.canonical(ty);
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                types.is_numeric(ty)
            }
            BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::BitXor => types.is_int(ty),
            BinaryOp::Eq | BinaryOp::NotEq => {
                types.is_numeric(ty)
                    || ty == TypeId::BOOL
                    || ty == TypeId::TYPE
                    || types.enum_type(ty).is_some()
                    || types.pointer_child(ty).is_some()
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => types.is_numeric(ty),
            BinaryOp::And | BinaryOp::Or => ty == TypeId::BOOL,
            BinaryOp::Concat => false,
        }
    }

    fn lower_binary(&mut self, op: BinaryOp, l: ExprId, r: ExprId, span: Span) -> Operand {
        if op.is_logical() {
            return self.lower_short_circuit(op, l, r, span);
        }
        let lhs = self.lower_expr(l);
        if lhs.is_diverged() {
            return lhs;
        }
        let rhs = self.lower_expr(r);
        if rhs.is_diverged() {
            return rhs;
        }
        if lhs.is_invalid() || rhs.is_invalid() {
            return Operand::invalid();
        }
        if op == BinaryOp::Concat {
            return self.lower_concat(&lhs, &rhs, span);
        }

        let Some(peer) = self.peer_type(lhs.ty, rhs.ty) else {
            return self.report(LowerProblem::NoPeerType {
                span,
                lhs: lhs.ty,
                rhs: rhs.ty,
            });
        };
        if !self.supports(op, peer) {
            return self.report(LowerProblem::UnsupportedOp {
                span,
                op: op.as_symbol(),
                ty: peer,
            });
        }
        let lhs = self.coerce(lhs, peer, self.span(l));
        let rhs = self.coerce(rhs, peer, self.span(r));
        if lhs.is_invalid() || rhs.is_invalid() {
            return Operand::invalid();
        }
        let result_ty = if op.is_comparison() {
            TypeId::BOOL
        } else {
            peer
        };

        if let (Some(a), Some(b)) = (lhs.as_comptime(), rhs.as_comptime()) {
            let kind = self.ctx.types.num_kind(peer);
            return match fold_binary(op, a, b, result_ty, kind) {
                Ok(value) => Operand::comptime(value),
                Err(err) => self.report(LowerProblem::from_const_error(err, span)),
            };
        }

        if let Some(problem) = self.check_runtime_rhs(op, &rhs, peer, span) {
            return self.report(problem);
        }
        let (Some(a), Some(b)) = (self.materialize(&lhs, span), self.materialize(&rhs, span))
        else {
            return Operand::diverged();
        };
        let id = self.builder.emit_binop(op, a, b, result_ty, Some(span));
        Operand::runtime(id, result_ty)
    }

    /// Errors detectable from a compile-time right operand of a runtime
    /// operation.
    fn check_runtime_rhs(
        &self,
        op: BinaryOp,
        rhs: &Operand,
        ty: TypeId,
        span: Span,
    ) -> Option<LowerProblem> {
        let value = rhs.as_comptime()?.as_int()?;
        match op {
            BinaryOp::Div | BinaryOp::Rem if value.is_zero() => {
                Some(LowerProblem::DivisionByZero { span })
            }
            BinaryOp::Shl | BinaryOp::Shr => {
                let bits = self.ctx.types.int_info(ty)?.bits;
                let in_range = value.to_u32().is_some_and(|n| n < u32::from(bits));
                (!in_range).then_some(LowerProblem::ShiftOverflow {
                    span,
                    amount: value,
                    bits,
                })
            }
            _ => None,
        }
    }

    /// `and`/`or`: the right operand only runs when the left one does not
    /// decide the result.
    fn lower_short_circuit(&mut self, op: BinaryOp, l: ExprId, r: ExprId, span: Span) -> Operand {
        let is_and = op == BinaryOp::And;
        let lhs = self.lower_expr(l);
        let lhs = self.coerce(lhs, TypeId::BOOL, self.span(l));
        if !lhs.is_usable() {
            return lhs;
        }

        if let Some(value) = lhs.as_comptime() {
            let Some(decided) = value.as_bool() else {
                return self.report(LowerProblem::UseOfUndefined { span: self.span(l) });
            };
            if decided != is_and {
                return Operand::comptime(ConstValue::bool(decided));
            }
            let rhs = self.lower_expr(r);
            return self.coerce(rhs, TypeId::BOOL, self.span(r));
        }

        let Some(lhs_id) = self.materialize(&lhs, span) else {
            return Operand::diverged();
        };
        let short = self.builder.emit_const(ConstValue::bool(!is_and), Some(span));
        let lhs_block = self.builder.current_block();
        let (rhs_block, merge) = if is_and {
            (
                self.builder.new_block("and_rhs"),
                self.builder.new_block("and_end"),
            )
        } else {
            (
                self.builder.new_block("or_rhs"),
                self.builder.new_block("or_end"),
            )
        };
        if is_and {
            self.builder.cond_br(lhs_id, rhs_block, merge, Some(span));
        } else {
            self.builder.cond_br(lhs_id, merge, rhs_block, Some(span));
        }

        self.builder.position_at(rhs_block);
        let rhs = self.lower_expr(r);
        let rhs = self.coerce(rhs, TypeId::BOOL, self.span(r));
        let rhs_id = if rhs.is_usable() {
            self.materialize(&rhs, span)
        } else {
            None
        };
        let rhs_end = self.builder.current_block();
        if !self.builder.is_sealed() {
            self.builder.br(merge, None);
        }
        self.builder.position_at(merge);

        match rhs_id {
            Some(rhs_id) => {
                let incoming = vec![
                    PhiIncoming {
                        block: lhs_block,
                        value: short,
                    },
                    PhiIncoming {
                        block: rhs_end,
                        value: rhs_id,
                    },
                ];
                let phi = self.builder.emit_phi(TypeId::BOOL, incoming, Some(span));
                Operand::runtime(phi, TypeId::BOOL)
            }
            None if rhs.is_invalid() => Operand::invalid(),
            // Only the short-circuit edge reaches the merge.
            None => Operand::comptime(ConstValue::bool(!is_and)),
        }
    }

    /// Compile-time `++` of arrays and C strings.
    fn lower_concat(&mut self, lhs: &Operand, rhs: &Operand, span: Span) -> Operand {
        let (Some(a), Some(b)) = (lhs.as_comptime().cloned(), rhs.as_comptime().cloned()) else {
            return self.report(LowerProblem::NotComptime {
                span,
                what: "operand of `++`",
            });
        };
        let Some((l_elem, l_len, l_c)) = self.concat_info(&a) else {
            return self.report(LowerProblem::UnsupportedOp {
                span,
                op: "++",
                ty: lhs.ty,
            });
        };
        let Some((r_elem, r_len, r_c)) = self.concat_info(&b) else {
            return self.report(LowerProblem::UnsupportedOp {
                span,
                op: "++",
                ty: rhs.ty,
            });
        };
        if self.ctx.types.canonical(l_elem) != self.ctx.types.canonical(r_elem) {
            return self.report(LowerProblem::NoPeerType {
                span,
                lhs: lhs.ty,
                rhs: rhs.ty,
            });
        }

        // The result type is fixed before the arena is borrowed mutably.
        let total = l_len
            .checked_add(r_len)
            .and_then(|n| n.checked_add(u64::from(l_c || r_c)))
            .filter(|&n| n <= MATERIALIZE_LIMIT);
        let Some(total) = total else {
            return self.report(LowerProblem::TooLarge {
                span,
                limit: MATERIALIZE_LIMIT,
            });
        };
        let array_ty = self.ctx.types.get_array(l_elem, total);
        let ctx = &mut *self.ctx;
        match concat(&mut ctx.consts, &ctx.types, &a, &b, |_| array_ty) {
            Ok(value) => Operand::comptime(value),
            Err(err) => self.report(LowerProblem::from_const_error(err, span)),
        }
    }

    /// Element type, element count (without terminator) and C-string-ness
    /// of a `++` operand.
    fn concat_info(&self, value: &ConstValue) -> Option<(TypeId, u64, bool)> {
        if let Some((elem, len)) = self.ctx.types.array_info(value.ty) {
            return Some((elem, len, false));
        }
        let ptr = value.as_ptr().filter(|p| p.is_c_str)?;
        let len = self.ctx.consts.c_str_bytes(ptr).ok()?.len() as u64;
        Some((TypeId::U8, len, true))
    }

    // ── Unary operators and casts ──────────────────────────────────

    fn lower_unary(&mut self, op: UnaryOp, operand: ExprId, span: Span) -> Operand {
        let value = self.lower_expr(operand);
        if !value.is_usable() {
            return value;
        }
        let ty = value.ty;
        let types = &self.ctx.types;
        let supported = match op {
            UnaryOp::Neg => types.is_numeric(ty),
            UnaryOp::Not => types.canonical(ty) == TypeId::BOOL,
            UnaryOp::BitNot => types.is_int(ty),
        };
        if !supported {
            return self.report(LowerProblem::UnsupportedOp {
                span,
                op: op.as_symbol(),
                ty,
            });
        }

        if let Some(v) = value.as_comptime() {
            let kind = self.ctx.types.num_kind(ty);
            return match fold_unary(op, v, ty, kind) {
                Ok(folded) => Operand::comptime(folded),
                Err(err) => self.report(LowerProblem::from_const_error(err, span)),
            };
        }
        let Some(id) = self.materialize(&value, span) else {
            return Operand::diverged();
        };
        let result = self.builder.emit_unop(op, id, ty, Some(span));
        Operand::runtime(result, ty)
    }

    /// Explicit conversion. Numeric conversions may truncate; anything
    /// else must be a valid implicit coercion.
    fn lower_cast(&mut self, expr: ExprId, ty: &ParsedType, span: Span) -> Operand {
        let target = self.resolve(ty, span);
        let value = self.lower_expr(expr);
        if !value.is_usable() {
            return value;
        }
        if target.is_invalid() {
            return Operand::invalid();
        }

        let types = &self.ctx.types;
        let src = types.canonical(value.ty);
        let dst = types.canonical(target);
        let int_like_src =
            types.is_int(src) || src == TypeId::BOOL || types.enum_type(src).is_some();
        let to_int = types.is_int(dst) && dst != TypeId::COMPTIME_INT && (int_like_src || types.is_float(src));
        let to_float = types.is_float(dst) && (types.is_int(src) || types.is_float(src));
        if !(to_int || to_float) {
            return self.coerce(value, target, span);
        }

        if let Some(v) = value.as_comptime() {
            let converted = if to_int {
                int_cast(v, target, types.num_kind(dst))
            } else {
                Ok(comptime_to_float(v, target))
            };
            return match converted {
                Ok(c) => Operand::comptime(c),
                Err(err) => self.report(LowerProblem::from_const_error(err, span)),
            };
        }
        let Some(id) = self.materialize(&value, span) else {
            return Operand::diverged();
        };
        let cast = self.builder.emit_cast(id, target, Some(span));
        Operand::runtime(cast, target)
    }
}

/// Convert a compile-time number to the float type `ty`.
fn comptime_to_float(value: &ConstValue, ty: TypeId) -> ConstValue {
    if value.is_undef() {
        return ConstValue::undef(ty);
    }
    let f = match value.payload() {
        Some(ConstPayload::Float(bits)) => Some(f64::from_bits(*bits)),
        _ => value.as_int().and_then(|v| v.to_f64()),
    };
    match f {
        Some(f) => ConstValue::float(ty, f),
        None => ConstValue::undef(ty),
    }
}

#[cfg(test)]
mod tests;
