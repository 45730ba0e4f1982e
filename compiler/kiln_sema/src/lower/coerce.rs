//! Peer-type resolution and implicit coercion.
//!
//! Implicit conversions never lose information:
//! - `comptime_int`/`comptime_float` to any numeric type the value fits
//! - a compile-time integer to any integer type holding its value
//! - a runtime integer to a wider integer (`u8` → `u16`, `u8` → `i16`)
//! - `f32` → `f64`
//! - `T` → `?T`
//! - `undefined` to anything

use kiln_const::{fits, ConstValue};
use kiln_ir::{Span, TypeId};
use kiln_ssa::InstrId;
use num_traits::ToPrimitive;

use super::{Lowerer, Operand, OperandKind};
use crate::problem::LowerProblem;

impl Lowerer<'_> {
    /// Whether every runtime value of `from` is representable in `to`.
    pub(crate) fn int_widens(&self, from: TypeId, to: TypeId) -> bool {
        let (Some(f), Some(t)) = (self.ctx.types.int_info(from), self.ctx.types.int_info(to))
        else {
            return false;
        };
        (f.signed == t.signed && f.bits <= t.bits) || (!f.signed && t.signed && f.bits < t.bits)
    }

    fn float_bits(&self, ty: TypeId) -> Option<u16> {
        match self.ctx.types.num_kind(ty) {
            kiln_const::NumKind::Float { bits } => Some(bits),
            _ => None,
        }
    }

    /// Common type of two operands of a binary operator or of merging
    /// branches.
    pub(crate) fn peer_type(&self, a: TypeId, b: TypeId) -> Option<TypeId> {
        let types = &self.ctx.types;
        let (ca, cb) = (types.canonical(a), types.canonical(b));
        if ca == cb {
            return Some(a);
        }
        for (x, y, other) in [(ca, cb, b), (cb, ca, a)] {
            if x == TypeId::NORETURN || x == TypeId::UNDEFINED {
                return Some(other);
            }
            if x == TypeId::COMPTIME_INT && types.is_numeric(y) {
                return Some(other);
            }
            if x == TypeId::COMPTIME_FLOAT && types.is_float(y) {
                return Some(other);
            }
        }
        if self.int_widens(ca, cb) {
            return Some(b);
        }
        if self.int_widens(cb, ca) {
            return Some(a);
        }
        match (self.float_bits(ca), self.float_bits(cb)) {
            (Some(x), Some(y)) => Some(if x >= y { a } else { b }),
            _ => None,
        }
    }

    /// Convert `op` to `target`, reporting E2002/E2006 when it cannot be.
    pub(crate) fn coerce(&mut self, op: Operand, target: TypeId, span: Span) -> Operand {
        if op.is_diverged() || op.is_invalid() {
            return op;
        }
        if target.is_invalid() {
            return Operand::invalid();
        }
        let src = self.ctx.types.canonical(op.ty);
        let dst = self.ctx.types.canonical(target);
        if src == TypeId::NORETURN {
            return op;
        }
        if src == dst {
            return retag(op, target);
        }
        match &op.kind {
            OperandKind::Comptime(value) => {
                let value = value.clone();
                self.coerce_comptime(&value, src, target, span)
            }
            OperandKind::Runtime(id) => {
                let id = *id;
                self.coerce_runtime(id, src, target, span)
            }
            OperandKind::Diverged => Operand::diverged(),
        }
    }

    fn coerce_comptime(
        &mut self,
        value: &ConstValue,
        src: TypeId,
        target: TypeId,
        span: Span,
    ) -> Operand {
        if value.is_undef() {
            return Operand::comptime(ConstValue::undef(target));
        }
        let dst = self.ctx.types.canonical(target);
        if let Some(child) = self.ctx.types.optional_child(dst) {
            let inner = self.coerce(Operand::comptime(value.clone()), child, span);
            if inner.is_invalid() {
                return inner;
            }
            return match inner.kind {
                OperandKind::Comptime(v) => {
                    Operand::comptime(ConstValue::optional(target, Some(v)))
                }
                OperandKind::Runtime(id) => {
                    let cast = self.builder.emit_cast(id, target, Some(span));
                    Operand::runtime(cast, target)
                }
                OperandKind::Diverged => inner,
            };
        }

        let types = &self.ctx.types;
        if types.is_int(src) && types.is_int(dst) {
            let Some(v) = value.as_int() else {
                return self.mismatch(target, src, span);
            };
            if !fits(&v, types.num_kind(dst)) {
                return self.report(LowerProblem::DoesNotFit {
                    span,
                    value: v,
                    ty: target,
                });
            }
            return Operand::comptime(ConstValue::int(target, v));
        }

        if types.is_float(dst) {
            let as_float = if types.is_int(src) && src == TypeId::COMPTIME_INT {
                value.as_int().and_then(|v| v.to_f64())
            } else if types.is_float(src)
                && (src == TypeId::COMPTIME_FLOAT
                    || self.float_bits(src) <= self.float_bits(dst))
            {
                match value.payload() {
                    Some(kiln_const::ConstPayload::Float(bits)) => Some(f64::from_bits(*bits)),
                    _ => None,
                }
            } else {
                None
            };
            if let Some(f) = as_float {
                return Operand::comptime(ConstValue::float(target, f));
            }
        }

        self.mismatch(target, src, span)
    }

    fn coerce_runtime(&mut self, id: InstrId, src: TypeId, target: TypeId, span: Span) -> Operand {
        let dst = self.ctx.types.canonical(target);
        if let Some(child) = self.ctx.types.optional_child(dst) {
            let inner = self.coerce_runtime(id, src, child, span);
            return match inner.kind {
                OperandKind::Runtime(inner_id) => {
                    let cast = self.builder.emit_cast(inner_id, target, Some(span));
                    Operand::runtime(cast, target)
                }
                _ => inner,
            };
        }
        if self.ctx.types.canonical(src) == dst {
            return Operand::runtime(id, target);
        }
        let float_widens = matches!(
            (self.float_bits(src), self.float_bits(dst)),
            (Some(from), Some(to)) if from <= to
        );
        if self.int_widens(src, dst) || float_widens {
            let cast = self.builder.emit_cast(id, target, Some(span));
            return Operand::runtime(cast, target);
        }
        self.mismatch(target, src, span)
    }

    #[cold]
    fn mismatch(&mut self, expected: TypeId, found: TypeId, span: Span) -> Operand {
        self.report(LowerProblem::Mismatch {
            span,
            expected,
            found,
        })
    }
}

/// Same operand viewed at an equivalent type (an alias of it).
fn retag(op: Operand, ty: TypeId) -> Operand {
    match op.kind {
        OperandKind::Comptime(mut value) => {
            value.ty = ty;
            Operand::comptime(value)
        }
        OperandKind::Runtime(id) => Operand::runtime(id, ty),
        OperandKind::Diverged => op,
    }
}

#[cfg(test)]
mod tests;
