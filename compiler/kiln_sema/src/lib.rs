//! Semantic analysis for the Kiln compiler.
//!
//! Takes a parsed [`Module`](kiln_ir::Module), resolves its declarations
//! into the [`TypeTable`](kiln_types::TypeTable), evaluates everything
//! known at compile time and lowers each function body (and each
//! instantiation of a generic function) into SSA IR.
//!
//! # Modules
//!
//! - `context`: the per-compilation [`CompilationContext`]
//! - `scope`: lexical scope tree
//! - `resolve`: type annotation resolution
//! - `decl`: module-level passes ([`analyze_module`])
//! - `lower`: AST → IR lowering with constant folding
//! - `problem`: structured problems and their diagnostics
//! - `testing`: AST construction helpers for tests

mod config;
mod context;
mod decl;
mod lower;
mod problem;
mod resolve;
mod scope;
pub mod testing;
mod tracing_setup;

pub use config::SemaConfig;
pub use context::{CompilationContext, DeclState, FnEntry};
pub use decl::analyze_module;
pub use lower::{Operand, OperandKind};
pub use problem::{HasSpan, LowerProblem, TypeProblem};
pub use scope::{Binding, BlockContext, LoopTargets, ScopeId, ScopeKind, ScopeTree, VarEntry};
pub use tracing_setup::init_tracing;
