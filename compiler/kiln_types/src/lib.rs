//! Type table for the Kiln compiler.
//!
//! Every type is interned: one [`TypeId`] per distinct structural
//! description. Structural equality is therefore `TypeId` equality.
//!
//! # Key Types
//!
//! - [`TypeTable`]: the interning arena plus per-kind lookup maps
//! - [`TypeData`]: the sum type describing one entry
//! - [`FnSig`]: structural key of function types
//! - [`InstantiationCache`]: one instantiation per generic binding
//!
//! # Invalid Propagation
//!
//! Building a type out of [`TypeId::INVALID`] yields `TypeId::INVALID`
//! instead of failing, so analysis of sibling declarations continues after a
//! type error.

mod data;
mod flags;
mod generic;
mod table;

pub use data::{CallConv, EnumField, EnumType, FnSig, IntInfo, StructField, StructType, TypeData};
pub use flags::{FnFlags, TypeFlags};
pub use generic::{GenericArg, InstantiationCache};
pub use kiln_ir::TypeId;
pub use table::TypeTable;
