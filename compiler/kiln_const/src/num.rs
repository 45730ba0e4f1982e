//! Numeric kind of an operand type and integer wraparound.

use num_bigint::BigInt;
use num_traits::{One, Zero};

/// How arithmetic on a type's values behaves at compile time.
///
/// The type table produces this from a `TypeId`; folding never needs the
/// table itself.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NumKind {
    /// Arbitrary precision, never wraps.
    ComptimeInt,
    /// Fixed-width integer, wraps to `bits` two's-complement bits.
    Int { signed: bool, bits: u16 },
    /// `f32` or `f64`.
    Float { bits: u16 },
    ComptimeFloat,
    Bool,
    /// Not numeric (types, pointers, aggregates, enums).
    Other,
}

impl NumKind {
    pub fn is_int(self) -> bool {
        matches!(self, NumKind::ComptimeInt | NumKind::Int { .. })
    }

    pub fn is_float(self) -> bool {
        matches!(self, NumKind::Float { .. } | NumKind::ComptimeFloat)
    }
}

/// Inclusive `(min, max)` of a fixed-width integer.
pub fn int_range(signed: bool, bits: u16) -> (BigInt, BigInt) {
    if bits == 0 {
        return (BigInt::zero(), BigInt::zero());
    }
    if signed {
        let half = BigInt::one() << (bits - 1);
        (-half.clone(), half - 1)
    } else {
        (BigInt::zero(), (BigInt::one() << bits) - 1)
    }
}

/// Reduce `value` modulo `2^bits` into the two's-complement range.
pub fn wrap_int(value: &BigInt, signed: bool, bits: u16) -> BigInt {
    if bits == 0 {
        return BigInt::zero();
    }
    let modulus = BigInt::one() << bits;
    let mut r = value % &modulus;
    if r < BigInt::zero() {
        r += &modulus;
    }
    if signed && r >= (BigInt::one() << (bits - 1)) {
        r -= modulus;
    }
    r
}

/// Whether `value` is representable in `kind` without wrapping.
pub fn fits(value: &BigInt, kind: NumKind) -> bool {
    match kind {
        NumKind::ComptimeInt => true,
        NumKind::Int { signed, bits } => {
            let (min, max) = int_range(signed, bits);
            *value >= min && *value <= max
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests;
