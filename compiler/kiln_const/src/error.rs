use num_bigint::BigInt;
use thiserror::Error;

/// Failure of a compile-time operation.
///
/// Runtime and undefined operands are not errors for folding (they
/// propagate); these are the cases where no result value exists at all.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConstError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("shift amount {amount} is out of range for a {bits}-bit integer")]
    ShiftOverflow { amount: BigInt, bits: u16 },
    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: u64, len: u64 },
    #[error("value is not known at compile time")]
    NotComptime,
    #[error("use of undefined value")]
    Undefined,
    #[error("invalid operands to `{op}`")]
    InvalidOperands { op: &'static str },
    #[error("value is not an aggregate")]
    NotAggregate,
    #[error("value only exists at compile time")]
    ComptimeOnly,
    /// Expanding a `Zeroes` aggregate would create more than `limit` values.
    #[error("aggregate is too large to expand at compile time (limit {limit} values)")]
    TooLarge { limit: u64 },
}
