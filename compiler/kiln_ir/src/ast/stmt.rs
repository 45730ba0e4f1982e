//! Statement types for block expressions.

use crate::{ExprId, Name, ParsedType, Span};

/// Statement inside a block.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Stmt {
    /// `let x = e;` (immutable) or `var x = e;` (`mutable`).
    Let {
        name: Name,
        mutable: bool,
        ty: Option<ParsedType>,
        init: ExprId,
        span: Span,
    },
    /// `target = value;` where `target` is a place expression.
    Assign {
        target: ExprId,
        value: ExprId,
        span: Span,
    },
    /// Expression evaluated for its effect.
    Expr(ExprId),
}
