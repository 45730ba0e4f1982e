//! Type identity handle.
//!
//! `TypeId` is the canonical reference to an entry of the type table.
//! Types are interned, so structural equality of two types is `TypeId`
//! equality (O(1)).
//!
//! Primitive types are pre-interned at fixed indices so that every layer
//! can name them without a table at hand.

use std::fmt;

/// A 32-bit index into the type table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    // === Primitive Types (indices 0-19) ===

    /// `void` (zero-sized).
    pub const VOID: Self = Self(0);
    /// `bool`.
    pub const BOOL: Self = Self(1);
    /// `noreturn` (type of `return`, `unreachable`, diverging branches).
    pub const NORETURN: Self = Self(2);
    /// `type` (the type of types used as comptime values).
    pub const TYPE: Self = Self(3);
    /// Marker for a type that failed to resolve. Propagates silently.
    pub const INVALID: Self = Self(4);
    /// Arbitrary-precision integer only existing at compile time.
    pub const COMPTIME_INT: Self = Self(5);
    /// Float literal type only existing at compile time.
    pub const COMPTIME_FLOAT: Self = Self(6);
    /// Type of a bare `undefined` literal before coercion.
    pub const UNDEFINED: Self = Self(7);
    pub const U8: Self = Self(8);
    pub const I8: Self = Self(9);
    pub const U16: Self = Self(10);
    pub const I16: Self = Self(11);
    pub const U32: Self = Self(12);
    pub const I32: Self = Self(13);
    pub const U64: Self = Self(14);
    pub const I64: Self = Self(15);
    /// Pointer-sized unsigned integer; width set by the target.
    pub const USIZE: Self = Self(16);
    /// Pointer-sized signed integer; width set by the target.
    pub const ISIZE: Self = Self(17);
    pub const F32: Self = Self(18);
    pub const F64: Self = Self(19);

    /// Number of pre-interned primitive types.
    pub const PRIMITIVE_COUNT: u32 = 20;

    /// First index for dynamically interned types.
    ///
    /// Indices between `PRIMITIVE_COUNT` and `FIRST_DYNAMIC` are reserved.
    pub const FIRST_DYNAMIC: u32 = 32;

    /// Create an ID from a raw index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this is a pre-interned primitive.
    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::PRIMITIVE_COUNT
    }

    /// Check if this is the invalid marker.
    #[inline]
    pub const fn is_invalid(self) -> bool {
        self.0 == Self::INVALID.0
    }

    /// Human-readable name for primitive types, `None` for compound types
    /// (which need the table to render).
    pub const fn primitive_name(self) -> Option<&'static str> {
        Some(match self.0 {
            0 => "void",
            1 => "bool",
            2 => "noreturn",
            3 => "type",
            4 => "<invalid>",
            5 => "comptime_int",
            6 => "comptime_float",
            7 => "@TypeOf(undefined)",
            8 => "u8",
            9 => "i8",
            10 => "u16",
            11 => "i16",
            12 => "u32",
            13 => "i32",
            14 => "u64",
            15 => "i64",
            16 => "usize",
            17 => "isize",
            18 => "f32",
            19 => "f64",
            _ => return None,
        })
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.primitive_name() {
            Some(name) => write!(f, "TypeId({name})"),
            None => write!(f, "TypeId({})", self.0),
        }
    }
}

#[cfg(test)]
mod tests;
