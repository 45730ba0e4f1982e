//! Compile-time values for the Kiln semantic core.
//!
//! A [`ConstValue`] is a value known during compilation, or an explicit
//! marker that it is not:
//!
//! - `Runtime`: only known when the program runs
//! - `Static`: fully known, payload populated
//! - `Undef`: deliberately undefined bits (poison)
//! - `Zeroes`: bulk zero-fill, materialized on demand
//!
//! Nested payloads are owned by their container. Pointer constants refer to
//! an aggregate stored in the [`ConstArena`] by [`ConstId`]; they never own
//! the pointee.
//!
//! # Modules
//!
//! - `value`: the value types and constructors
//! - `num`: integer width descriptions and wraparound
//! - `fold`: binary/unary folding with Runtime/Undef propagation
//! - `aggregate`: field/element reads, zero materialization, concatenation
//! - `arena`: out-of-line storage for pointer targets
//! - `lower`: walking a value for the native backend

mod aggregate;
mod arena;
mod error;
mod fold;
mod lower;
mod num;
mod value;

pub use aggregate::{concat, Shape, ValueShape, MATERIALIZE_LIMIT};
pub use arena::{ConstArena, ConstId};
pub use error::ConstError;
pub use fold::{fold_binary, fold_unary, int_cast};
pub use lower::{lower_const, ConstLowering};
pub use num::{fits, int_range, wrap_int, NumKind};
pub use value::{ConstArray, ConstKind, ConstPayload, ConstPtr, ConstStatus, ConstValue, ErrorUnionValue};
