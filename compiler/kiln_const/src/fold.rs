//! Constant folding of operators.
//!
//! Status precedence is fixed: a `Runtime` operand makes the result
//! `Runtime`, otherwise an `Undef` operand makes it `Undef`. Only two
//! concrete operands (`Static`, or `Zeroes` read as zero) are computed.

use kiln_ir::{BinaryOp, TypeId, UnaryOp};
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive, Zero};

use crate::{wrap_int, ConstError, ConstKind, ConstPayload, ConstValue, NumKind};

/// Largest shift accepted for `comptime_int` operands.
const MAX_COMPTIME_SHIFT: u32 = 65_535;

/// A concrete scalar operand.
enum Scalar<'a> {
    Int(BigInt),
    Float(f64),
    Bool(bool),
    Other(&'a ConstPayload),
}

impl<'a> Scalar<'a> {
    fn read(value: &'a ConstValue, kind: NumKind, op: &'static str) -> Result<Self, ConstError> {
        match &value.kind {
            ConstKind::Zeroes => match kind {
                NumKind::ComptimeInt | NumKind::Int { .. } => Ok(Scalar::Int(BigInt::zero())),
                NumKind::Float { .. } | NumKind::ComptimeFloat => Ok(Scalar::Float(0.0)),
                NumKind::Bool => Ok(Scalar::Bool(false)),
                NumKind::Other => Err(ConstError::InvalidOperands { op }),
            },
            ConstKind::Static(ConstPayload::Int(v)) => Ok(Scalar::Int(v.clone())),
            ConstKind::Static(ConstPayload::Float(bits)) => Ok(Scalar::Float(f64::from_bits(*bits))),
            ConstKind::Static(ConstPayload::Bool(b)) => Ok(Scalar::Bool(*b)),
            ConstKind::Static(other) => Ok(Scalar::Other(other)),
            ConstKind::Runtime | ConstKind::Undef => Err(ConstError::NotComptime),
        }
    }
}

/// Fold `lhs op rhs`.
///
/// `kind` describes the operand type; `result_ty` is `bool` for
/// comparisons and the operand type otherwise.
pub fn fold_binary(
    op: BinaryOp,
    lhs: &ConstValue,
    rhs: &ConstValue,
    result_ty: TypeId,
    kind: NumKind,
) -> Result<ConstValue, ConstError> {
    if lhs.is_runtime() || rhs.is_runtime() {
        return Ok(ConstValue::runtime(result_ty));
    }
    if lhs.is_undef() || rhs.is_undef() {
        return Ok(ConstValue::undef(result_ty));
    }

    let sym = op.as_symbol();
    let l = Scalar::read(lhs, kind, sym)?;
    let r = Scalar::read(rhs, kind, sym)?;

    match (l, r) {
        (Scalar::Int(a), Scalar::Int(b)) => fold_int(op, &a, &b, result_ty, kind),
        (Scalar::Float(a), Scalar::Float(b)) => fold_float(op, a, b, result_ty, kind),
        (Scalar::Bool(a), Scalar::Bool(b)) => fold_bool(op, a, b, result_ty),
        (Scalar::Other(a), Scalar::Other(b)) => match op {
            BinaryOp::Eq => Ok(ConstValue::bool(a == b)),
            BinaryOp::NotEq => Ok(ConstValue::bool(a != b)),
            _ => Err(ConstError::InvalidOperands { op: sym }),
        },
        _ => Err(ConstError::InvalidOperands { op: sym }),
    }
}

fn wrap_to(kind: NumKind, value: BigInt) -> BigInt {
    match kind {
        NumKind::Int { signed, bits } => wrap_int(&value, signed, bits),
        _ => value,
    }
}

fn shift_amount(amount: &BigInt, kind: NumKind) -> Result<usize, ConstError> {
    let limit = match kind {
        NumKind::Int { bits, .. } => u32::from(bits),
        _ => MAX_COMPTIME_SHIFT + 1,
    };
    let bits = u16::try_from(limit).unwrap_or(u16::MAX);
    match amount.to_u32() {
        Some(n) if n < limit => Ok(n as usize),
        _ => Err(ConstError::ShiftOverflow {
            amount: amount.clone(),
            bits,
        }),
    }
}

fn fold_int(
    op: BinaryOp,
    a: &BigInt,
    b: &BigInt,
    result_ty: TypeId,
    kind: NumKind,
) -> Result<ConstValue, ConstError> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::Rem if b.is_zero() => return Err(ConstError::DivisionByZero),
        // Truncating division, remainder takes the sign of the dividend.
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        BinaryOp::Shl => a << shift_amount(b, kind)?,
        // Arithmetic shift: rounds toward negative infinity.
        BinaryOp::Shr => a >> shift_amount(b, kind)?,
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::Eq => return Ok(ConstValue::bool(a == b)),
        BinaryOp::NotEq => return Ok(ConstValue::bool(a != b)),
        BinaryOp::Lt => return Ok(ConstValue::bool(a < b)),
        BinaryOp::LtEq => return Ok(ConstValue::bool(a <= b)),
        BinaryOp::Gt => return Ok(ConstValue::bool(a > b)),
        BinaryOp::GtEq => return Ok(ConstValue::bool(a >= b)),
        BinaryOp::And | BinaryOp::Or | BinaryOp::Concat => {
            return Err(ConstError::InvalidOperands {
                op: op.as_symbol(),
            })
        }
    };
    Ok(ConstValue::new_static(
        result_ty,
        ConstPayload::Int(wrap_to(kind, value)),
    ))
}

#[allow(clippy::float_cmp, reason = "comptime float comparison is exact by definition")]
fn fold_float(
    op: BinaryOp,
    a: f64,
    b: f64,
    result_ty: TypeId,
    kind: NumKind,
) -> Result<ConstValue, ConstError> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        BinaryOp::Eq => return Ok(ConstValue::bool(a == b)),
        BinaryOp::NotEq => return Ok(ConstValue::bool(a != b)),
        BinaryOp::Lt => return Ok(ConstValue::bool(a < b)),
        BinaryOp::LtEq => return Ok(ConstValue::bool(a <= b)),
        BinaryOp::Gt => return Ok(ConstValue::bool(a > b)),
        BinaryOp::GtEq => return Ok(ConstValue::bool(a >= b)),
        _ => {
            return Err(ConstError::InvalidOperands {
                op: op.as_symbol(),
            })
        }
    };
    Ok(ConstValue::float(result_ty, round_float(value, kind)))
}

#[allow(clippy::cast_possible_truncation, reason = "f32 rounding is the intent")]
fn round_float(value: f64, kind: NumKind) -> f64 {
    match kind {
        NumKind::Float { bits: 32 } => f64::from(value as f32),
        _ => value,
    }
}

fn fold_bool(op: BinaryOp, a: bool, b: bool, result_ty: TypeId) -> Result<ConstValue, ConstError> {
    let value = match op {
        BinaryOp::And | BinaryOp::BitAnd => a && b,
        BinaryOp::Or | BinaryOp::BitOr => a || b,
        BinaryOp::BitXor | BinaryOp::NotEq => a != b,
        BinaryOp::Eq => a == b,
        _ => {
            return Err(ConstError::InvalidOperands {
                op: op.as_symbol(),
            })
        }
    };
    Ok(ConstValue::new_static(result_ty, ConstPayload::Bool(value)))
}

/// Fold `op operand`.
pub fn fold_unary(
    op: UnaryOp,
    operand: &ConstValue,
    result_ty: TypeId,
    kind: NumKind,
) -> Result<ConstValue, ConstError> {
    if operand.is_runtime() {
        return Ok(ConstValue::runtime(result_ty));
    }
    if operand.is_undef() {
        return Ok(ConstValue::undef(result_ty));
    }

    let sym = op.as_symbol();
    match (op, Scalar::read(operand, kind, sym)?) {
        (UnaryOp::Neg, Scalar::Int(v)) => Ok(ConstValue::new_static(
            result_ty,
            ConstPayload::Int(wrap_to(kind, -v)),
        )),
        (UnaryOp::Neg, Scalar::Float(v)) => Ok(ConstValue::float(result_ty, -v)),
        (UnaryOp::Not, Scalar::Bool(b)) => {
            Ok(ConstValue::new_static(result_ty, ConstPayload::Bool(!b)))
        }
        (UnaryOp::BitNot, Scalar::Int(v)) => Ok(ConstValue::new_static(
            result_ty,
            ConstPayload::Int(wrap_to(kind, !v)),
        )),
        _ => Err(ConstError::InvalidOperands { op: sym }),
    }
}

/// Convert a scalar to the integer type `ty`, wrapping to its width.
pub fn int_cast(value: &ConstValue, ty: TypeId, kind: NumKind) -> Result<ConstValue, ConstError> {
    let raw = match &value.kind {
        ConstKind::Runtime => return Ok(ConstValue::runtime(ty)),
        ConstKind::Undef => return Ok(ConstValue::undef(ty)),
        ConstKind::Zeroes => BigInt::zero(),
        ConstKind::Static(ConstPayload::Int(v) | ConstPayload::Enum { tag: v, .. }) => v.clone(),
        ConstKind::Static(ConstPayload::Bool(b)) => BigInt::from(u8::from(*b)),
        ConstKind::Static(ConstPayload::Float(bits)) => BigInt::from_f64(f64::from_bits(*bits).trunc())
            .ok_or(ConstError::InvalidOperands { op: "@intCast" })?,
        ConstKind::Static(_) => return Err(ConstError::InvalidOperands { op: "@intCast" }),
    };
    if !kind.is_int() {
        return Err(ConstError::InvalidOperands { op: "@intCast" });
    }
    Ok(ConstValue::new_static(ty, ConstPayload::Int(wrap_to(kind, raw))))
}
