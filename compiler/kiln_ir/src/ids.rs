//! ID newtypes shared across compiler layers.
//!
//! All IDs are 32-bit `Copy` indices. They replace the raw pointers a
//! pointer-graph design would use: identity comparison is integer
//! comparison, and no ID owns what it refers to.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an ID from a raw index.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw `u32` value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Get the index as `usize` (for indexing into `Vec`s).
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Index into an [`ExprArena`](crate::ExprArena).
    ///
    /// Doubles as the identity of the AST node: switch case ranges record
    /// the `ExprId` of the item they came from for diagnostics.
    ExprId,
    "expr#"
);

define_id!(
    /// Identity of a top-level declaration node.
    ///
    /// Nominal types (structs, enums, unions) and generic instantiations
    /// are keyed by the `DeclId` that introduced them.
    DeclId,
    "decl#"
);

define_id!(
    /// Identity of an analysed function body (a plain function or one
    /// instantiation of a generic function).
    FnId,
    "fn#"
);

/// Opaque handle the native-code backend attaches to a type or an
/// instruction after lowering it.
///
/// The core never interprets the value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BackendHandle(pub u64);
