//! Flat AST handed over by the parser.
//!
//! - No `Box<Expr>`, children are `ExprId(u32)` indices into an [`ExprArena`]
//! - Declarations carry a `DeclId` so nominal types and generic
//!   instantiations can be keyed by declaration identity
//!
//! # Module Structure
//!
//! - `expr`: expression nodes and the arena
//! - `stmt`: block statements
//! - `items`: module-level declarations

mod expr;
mod items;
mod stmt;

pub use expr::{ArrayInit, Expr, ExprArena, ExprKind, FieldInit, SwitchItem, SwitchProng};
pub use items::{
    EnumDecl, EnumVariantDecl, FieldDecl, FnDecl, FnDeclFlags, Item, ItemKind, Module, Param,
    StructDecl, TypeAliasDecl,
};
pub use stmt::Stmt;

#[cfg(test)]
mod tests;
