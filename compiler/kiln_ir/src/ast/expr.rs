//! Expression nodes and their arena.

use num_bigint::BigInt;

use super::Stmt;
use crate::{BinaryOp, ExprId, Name, ParsedType, Span, UnaryOp};

/// Expression node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression variants.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    // ── Literals ──
    /// Integer literal. `overflowed` is set by the parser when the source
    /// text did not fit its own literal representation; the value is then
    /// meaningless and analysis reports it instead of truncating silently.
    Int { value: BigInt, overflowed: bool },
    /// Float literal as `f64` bits.
    Float(u64),
    Bool(bool),
    /// String literal. `c_str` literals denote a NUL-terminated pointer,
    /// others a `[N]u8` array.
    Str { bytes: Vec<u8>, c_str: bool },
    /// `undefined`
    Undefined,
    /// `zeroes(T)`: bulk zero value of `T`.
    ZeroInit(ParsedType),
    /// A type used as a comptime value (`u8` passed as `comptime T: type`).
    TypeExpr(ParsedType),

    // ── Names ──
    Ident(Name),
    /// `Enum.Variant`
    EnumValue { ty: Name, variant: Name },

    // ── Operators ──
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Unary { op: UnaryOp, operand: ExprId },
    /// `@as(T, expr)` style explicit cast.
    Cast { expr: ExprId, ty: ParsedType },

    // ── Access ──
    Field { base: ExprId, field: Name },
    Index { base: ExprId, index: ExprId },

    // ── Aggregates ──
    StructInit {
        ty: ParsedType,
        fields: Vec<FieldInit>,
    },
    ArrayInit(ArrayInit),

    Call { callee: Name, args: Vec<ExprId> },

    // ── Control flow ──
    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: Option<ExprId>,
    },
    Switch {
        subject: ExprId,
        prongs: Vec<SwitchProng>,
    },
    While {
        label: Option<Name>,
        cond: ExprId,
        body: ExprId,
    },
    Break { label: Option<Name> },
    Continue { label: Option<Name> },
    Block {
        stmts: Vec<Stmt>,
        result: Option<ExprId>,
    },
    Return(Option<ExprId>),
    Unreachable,
}

/// `.field = value` inside a struct initializer.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldInit {
    pub name: Name,
    pub value: ExprId,
    pub span: Span,
}

/// `[N]T{ a, b, c }`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ArrayInit {
    pub elem_ty: ParsedType,
    pub elems: Vec<ExprId>,
}

/// One arm of a `switch`.
///
/// An `else` prong has no items.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SwitchProng {
    pub items: Vec<SwitchItem>,
    pub is_else: bool,
    pub body: ExprId,
    pub span: Span,
}

/// A case item: one value or an inclusive `start...end` range.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SwitchItem {
    Single(ExprId),
    Range { start: ExprId, end: ExprId },
}

impl SwitchItem {
    /// Source range of the item; a range covers both bounds.
    pub fn span(self, arena: &ExprArena) -> Span {
        match self {
            SwitchItem::Single(id) => arena.span(id),
            SwitchItem::Range { start, end } => arena.span(start).merge(arena.span(end)),
        }
    }
}

/// Arena owning every expression of a module.
#[derive(Clone, Default, Debug)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression and return its ID.
    ///
    /// # Panics
    /// Panics if the arena exceeds `u32::MAX` expressions.
    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let idx = u32::try_from(self.exprs.len())
            .unwrap_or_else(|_| panic!("expression arena exceeded u32::MAX entries"));
        self.exprs.push(Expr { kind, span });
        ExprId::new(idx)
    }

    /// # Panics
    /// Panics if `id` was not allocated by this arena.
    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.get(id).kind
    }

    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.get(id).span
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}
