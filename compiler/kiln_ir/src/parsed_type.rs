//! Parsed type representation.
//!
//! `ParsedType` keeps the full structure of a type annotation as the parser
//! saw it. Semantic analysis resolves it into a [`TypeId`] through the type
//! table.

use crate::{Name, TypeId};

/// A parsed type expression, preserving full structure.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParsedType {
    /// A primitive with a fixed identity: `void`, `bool`, `u8`, `usize`, ...
    Primitive(TypeId),

    /// A user-declared name (struct, enum, union, alias or comptime `type`
    /// parameter).
    Named(Name),

    /// An arbitrary-width integer: `i7`, `u48`.
    Int { signed: bool, bits: u16 },

    /// `*T` / `*const T`
    Pointer { child: Box<ParsedType>, is_const: bool },

    /// `[N]T`
    Array { child: Box<ParsedType>, len: u64 },

    /// `[]T` / `[]const T`
    Slice { child: Box<ParsedType>, is_const: bool },

    /// `?T`
    Optional(Box<ParsedType>),

    /// `!T`
    ErrorUnion(Box<ParsedType>),

    /// `fn(A, B) R`
    Fn {
        params: Vec<ParsedType>,
        ret: Box<ParsedType>,
        var_args: bool,
    },
}

impl ParsedType {
    pub fn pointer(child: ParsedType, is_const: bool) -> Self {
        ParsedType::Pointer {
            child: Box::new(child),
            is_const,
        }
    }

    pub fn array(child: ParsedType, len: u64) -> Self {
        ParsedType::Array {
            child: Box::new(child),
            len,
        }
    }

    pub fn slice(child: ParsedType, is_const: bool) -> Self {
        ParsedType::Slice {
            child: Box::new(child),
            is_const,
        }
    }

    pub fn optional(child: ParsedType) -> Self {
        ParsedType::Optional(Box::new(child))
    }

    pub fn error_union(child: ParsedType) -> Self {
        ParsedType::ErrorUnion(Box::new(child))
    }
}
