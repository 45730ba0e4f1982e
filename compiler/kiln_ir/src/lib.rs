//! Kiln IR - shared vocabulary of the compiler core.
//!
//! This crate holds the small, dependency-free types every other layer
//! agrees on:
//! - Spans for source locations
//! - Names for interned identifiers
//! - ID newtypes (`ExprId`, `DeclId`, `FnId`, `TypeId`, `BackendHandle`)
//! - Binary and unary operators
//! - The input AST handed over by the parser (consumed, never produced here)
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → `Name(u32)`, Types → `TypeId(u32)`
//! - **Flatten Everything**: No `Box<Expr>`, use `ExprId(u32)` indices
//! - **IDs, not pointers**: every cross-reference is a `Copy` index

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod ast;
mod ids;
mod interner;
mod name;
mod operators;
mod parsed_type;
mod span;
mod type_id;

pub use ast::{
    ArrayInit, EnumDecl, EnumVariantDecl, Expr, ExprArena, ExprKind, FieldDecl, FieldInit,
    FnDecl, FnDeclFlags, Item, ItemKind, Module, Param, Stmt, StructDecl, SwitchItem,
    SwitchProng, TypeAliasDecl,
};
pub use ids::{BackendHandle, DeclId, ExprId, FnId};
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use operators::{BinaryOp, UnaryOp};
pub use parsed_type::ParsedType;
pub use span::Span;
pub use type_id::TypeId;

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{DeclId, ExprId, Name, Span, TypeId};
    static_assert_size!(Span, 8);
    static_assert_size!(Name, 4);
    static_assert_size!(ExprId, 4);
    static_assert_size!(DeclId, 4);
    static_assert_size!(TypeId, 4);
}
