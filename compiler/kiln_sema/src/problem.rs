//! Structured problem types.
//!
//! Problems describe what went wrong as data; [`into_diagnostic`] renders
//! them for the user. Declaration and type resolution produce
//! [`TypeProblem`]s, body lowering produces [`LowerProblem`]s.
//!
//! [`into_diagnostic`]: LowerProblem::into_diagnostic

use kiln_const::ConstError;
use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::{Name, Span, StringInterner, TypeId};
use kiln_types::TypeTable;
use num_bigint::BigInt;

/// Trait for problem types with a primary source location.
pub trait HasSpan {
    fn span(&self) -> Span;
}

/// Generate `HasSpan` for an enum whose variants all carry `span`.
macro_rules! impl_has_span {
    ($enum_name:ident { $($variant:ident),* $(,)? }) => {
        impl HasSpan for $enum_name {
            fn span(&self) -> Span {
                match self {
                    $( $enum_name::$variant { span, .. } => *span, )*
                }
            }
        }
    };
}

// ── Declaration / type problems ─────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeProblem {
    UnknownType {
        span: Span,
        name: Name,
    },
    /// A declaration name that does not denote a type.
    NotAType {
        span: Span,
        name: Name,
    },
    AliasCycle {
        span: Span,
        name: Name,
    },
    Redeclared {
        span: Span,
        name: Name,
        previous: Span,
    },
    DuplicateMember {
        span: Span,
        kind: &'static str,
        name: Name,
        previous: Span,
    },
    DuplicateEnumValue {
        span: Span,
        value: BigInt,
        previous: Span,
    },
    TagDoesNotFit {
        span: Span,
        value: BigInt,
        tag_type: TypeId,
    },
    InvalidTagType {
        span: Span,
        found: TypeId,
    },
    /// A type whose values only exist at compile time used where a
    /// runtime type is needed.
    ComptimeOnlyType {
        span: Span,
        ty: TypeId,
    },
}

impl_has_span!(TypeProblem {
    UnknownType,
    NotAType,
    AliasCycle,
    Redeclared,
    DuplicateMember,
    DuplicateEnumValue,
    TagDoesNotFit,
    InvalidTagType,
    ComptimeOnlyType,
});

impl TypeProblem {
    pub fn into_diagnostic(&self, interner: &StringInterner, types: &TypeTable) -> Diagnostic {
        let ty_name = |ty: TypeId| types.display(ty, interner);
        match self {
            TypeProblem::UnknownType { span, name } => Diagnostic::error(ErrorCode::E2001)
                .with_message(format!("unknown type `{}`", interner.lookup(*name)))
                .with_label(*span, "not found in this scope"),
            TypeProblem::NotAType { span, name } => Diagnostic::error(ErrorCode::E2002)
                .with_message(format!("`{}` is not a type", interner.lookup(*name)))
                .with_label(*span, "expected a type"),
            TypeProblem::AliasCycle { span, name } => Diagnostic::error(ErrorCode::E2001)
                .with_message(format!(
                    "type alias `{}` refers to itself",
                    interner.lookup(*name)
                ))
                .with_label(*span, "cyclic alias"),
            TypeProblem::Redeclared {
                span,
                name,
                previous,
            } => redeclared(interner.lookup(*name), *span, *previous),
            TypeProblem::DuplicateMember {
                span,
                kind,
                name,
                previous,
            } => Diagnostic::error(ErrorCode::E2004)
                .with_message(format!("duplicate {kind} `{}`", interner.lookup(*name)))
                .with_label(*span, format!("duplicate {kind}"))
                .with_secondary_label(*previous, "first declared here"),
            TypeProblem::DuplicateEnumValue {
                span,
                value,
                previous,
            } => Diagnostic::error(ErrorCode::E2004)
                .with_message(format!("enum tag value {value} is used twice"))
                .with_label(*span, "duplicate tag value")
                .with_secondary_label(*previous, "first used here"),
            TypeProblem::TagDoesNotFit {
                span,
                value,
                tag_type,
            } => Diagnostic::error(ErrorCode::E2006)
                .with_message(format!(
                    "tag value {value} does not fit in `{}`",
                    ty_name(*tag_type)
                ))
                .with_label(*span, "out of range"),
            TypeProblem::InvalidTagType { span, found } => Diagnostic::error(ErrorCode::E2002)
                .with_message(format!(
                    "enum tag type must be an integer, found `{}`",
                    ty_name(*found)
                ))
                .with_label(*span, "not an integer type"),
            TypeProblem::ComptimeOnlyType { span, ty } => Diagnostic::error(ErrorCode::E4005)
                .with_message(format!(
                    "values of type `{}` only exist at compile time",
                    ty_name(*ty)
                ))
                .with_label(*span, "needs a runtime type"),
        }
    }
}

// ── Lowering problems ───────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LowerProblem {
    UnknownIdent {
        span: Span,
        name: Name,
    },
    Mismatch {
        span: Span,
        expected: TypeId,
        found: TypeId,
    },
    /// Two operand types with no common peer type.
    NoPeerType {
        span: Span,
        lhs: TypeId,
        rhs: TypeId,
    },
    Redeclared {
        span: Span,
        name: Name,
        previous: Span,
    },
    DuplicateFieldInit {
        span: Span,
        name: Name,
        previous: Span,
    },
    NoSuchMember {
        span: Span,
        ty: TypeId,
        name: Name,
    },
    MissingField {
        span: Span,
        ty: TypeId,
        name: Name,
    },
    DoesNotFit {
        span: Span,
        value: BigInt,
        ty: TypeId,
    },
    /// Zero-filling would give enum `ty` a tag that names no variant.
    NoZeroValue {
        span: Span,
        ty: TypeId,
    },
    LiteralOverflow {
        span: Span,
    },
    ArgCount {
        span: Span,
        expected: usize,
        found: usize,
    },
    UnknownFn {
        span: Span,
        name: Name,
    },
    NotCallable {
        span: Span,
        name: Name,
    },
    AssignToImmutable {
        span: Span,
        name: Name,
    },
    NotAssignable {
        span: Span,
    },
    BreakOutsideLoop {
        span: Span,
        keyword: &'static str,
    },
    UnknownLabel {
        span: Span,
        label: Name,
    },
    UnsupportedOp {
        span: Span,
        op: &'static str,
        ty: TypeId,
    },
    DuplicateCase {
        span: Span,
        previous: Span,
    },
    DuplicateElse {
        span: Span,
        previous: Span,
    },
    NonExhaustive {
        span: Span,
        ty: TypeId,
    },
    /// A compile-time subject whose value no prong handles.
    NoMatchingProng {
        span: Span,
        value: BigInt,
    },
    CaseNotComptime {
        span: Span,
    },
    InvertedRange {
        span: Span,
        start: BigInt,
        end: BigInt,
    },
    RedundantElse {
        span: Span,
    },
    UnreachableCode {
        span: Span,
    },
    DivisionByZero {
        span: Span,
    },
    UseOfUndefined {
        span: Span,
    },
    ShiftOverflow {
        span: Span,
        amount: BigInt,
        bits: u16,
    },
    IndexOutOfBounds {
        span: Span,
        index: u64,
        len: u64,
    },
    NotComptime {
        span: Span,
        what: &'static str,
    },
    /// `var` of a type whose values only exist at compile time.
    ComptimeOnlyVar {
        span: Span,
        ty: TypeId,
    },
    UnionInitCount {
        span: Span,
        found: usize,
    },
    /// Expanding a zero-initialized aggregate would exceed `limit` values.
    TooLarge {
        span: Span,
        limit: u64,
    },
    Internal {
        span: Span,
        message: String,
    },
}

impl_has_span!(LowerProblem {
    UnknownIdent,
    Mismatch,
    NoPeerType,
    Redeclared,
    DuplicateFieldInit,
    NoSuchMember,
    MissingField,
    DoesNotFit,
    NoZeroValue,
    LiteralOverflow,
    ArgCount,
    UnknownFn,
    NotCallable,
    AssignToImmutable,
    NotAssignable,
    BreakOutsideLoop,
    UnknownLabel,
    UnsupportedOp,
    DuplicateCase,
    DuplicateElse,
    NonExhaustive,
    NoMatchingProng,
    CaseNotComptime,
    InvertedRange,
    RedundantElse,
    UnreachableCode,
    DivisionByZero,
    UseOfUndefined,
    ShiftOverflow,
    IndexOutOfBounds,
    NotComptime,
    ComptimeOnlyVar,
    UnionInitCount,
    TooLarge,
    Internal,
});

impl LowerProblem {
    /// Map a compile-time evaluation failure at `span`.
    #[cold]
    pub fn from_const_error(err: ConstError, span: Span) -> Self {
        match err {
            ConstError::DivisionByZero => LowerProblem::DivisionByZero { span },
            ConstError::ShiftOverflow { amount, bits } => {
                LowerProblem::ShiftOverflow { span, amount, bits }
            }
            ConstError::IndexOutOfBounds { index, len } => {
                LowerProblem::IndexOutOfBounds { span, index, len }
            }
            ConstError::Undefined => LowerProblem::UseOfUndefined { span },
            ConstError::NotComptime => LowerProblem::NotComptime {
                span,
                what: "operand",
            },
            ConstError::ComptimeOnly => LowerProblem::NotComptime {
                span,
                what: "compile-time-only value",
            },
            ConstError::TooLarge { limit } => LowerProblem::TooLarge { span, limit },
            err @ (ConstError::InvalidOperands { .. } | ConstError::NotAggregate) => {
                LowerProblem::Internal {
                    span,
                    message: err.to_string(),
                }
            }
        }
    }

    /// Whether this problem is reported as a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, LowerProblem::UnreachableCode { .. })
    }

    #[allow(clippy::too_many_lines, reason = "one arm per problem")]
    pub fn into_diagnostic(&self, interner: &StringInterner, types: &TypeTable) -> Diagnostic {
        let ty_name = |ty: TypeId| types.display(ty, interner);
        match self {
            LowerProblem::UnknownIdent { span, name } => Diagnostic::error(ErrorCode::E2001)
                .with_message(format!("unknown identifier `{}`", interner.lookup(*name)))
                .with_label(*span, "not found in this scope"),
            LowerProblem::Mismatch {
                span,
                expected,
                found,
            } => Diagnostic::error(ErrorCode::E2002)
                .with_message(format!(
                    "expected `{}`, found `{}`",
                    ty_name(*expected),
                    ty_name(*found)
                ))
                .with_label(*span, format!("has type `{}`", ty_name(*found))),
            LowerProblem::NoPeerType { span, lhs, rhs } => Diagnostic::error(ErrorCode::E2002)
                .with_message(format!(
                    "incompatible types `{}` and `{}`",
                    ty_name(*lhs),
                    ty_name(*rhs)
                ))
                .with_label(*span, "operands must have a common type"),
            LowerProblem::Redeclared {
                span,
                name,
                previous,
            } => redeclared(interner.lookup(*name), *span, *previous),
            LowerProblem::DuplicateFieldInit {
                span,
                name,
                previous,
            } => Diagnostic::error(ErrorCode::E2004)
                .with_message(format!(
                    "field `{}` initialized twice",
                    interner.lookup(*name)
                ))
                .with_label(*span, "duplicate initializer")
                .with_secondary_label(*previous, "first initialized here"),
            LowerProblem::NoSuchMember { span, ty, name } => Diagnostic::error(ErrorCode::E2005)
                .with_message(format!(
                    "`{}` has no member named `{}`",
                    ty_name(*ty),
                    interner.lookup(*name)
                ))
                .with_label(*span, "unknown member"),
            LowerProblem::MissingField { span, ty, name } => Diagnostic::error(ErrorCode::E2005)
                .with_message(format!(
                    "missing field `{}` in initializer of `{}`",
                    interner.lookup(*name),
                    ty_name(*ty)
                ))
                .with_label(*span, "field not initialized"),
            LowerProblem::DoesNotFit { span, value, ty } => Diagnostic::error(ErrorCode::E2006)
                .with_message(format!("value {value} does not fit in `{}`", ty_name(*ty)))
                .with_label(*span, "out of range"),
            LowerProblem::NoZeroValue { span, ty } => Diagnostic::error(ErrorCode::E2006)
                .with_message(format!(
                    "`{}` has no variant with value 0, so it has no zero value",
                    ty_name(*ty)
                ))
                .with_label(*span, "zero-initialized here"),
            LowerProblem::LiteralOverflow { span } => Diagnostic::error(ErrorCode::E2007)
                .with_message("integer literal overflowed while parsing")
                .with_label(*span, "literal too large"),
            LowerProblem::ArgCount {
                span,
                expected,
                found,
            } => Diagnostic::error(ErrorCode::E2008)
                .with_message(format!("expected {expected} argument(s), found {found}"))
                .with_label(*span, "wrong number of arguments"),
            LowerProblem::UnknownFn { span, name } => Diagnostic::error(ErrorCode::E2009)
                .with_message(format!("unknown function `{}`", interner.lookup(*name)))
                .with_label(*span, "function not found"),
            LowerProblem::NotCallable { span, name } => Diagnostic::error(ErrorCode::E2009)
                .with_message(format!("`{}` is not a function", interner.lookup(*name)))
                .with_label(*span, "cannot be called"),
            LowerProblem::AssignToImmutable { span, name } => Diagnostic::error(ErrorCode::E2010)
                .with_message(format!(
                    "cannot assign to immutable binding `{}`",
                    interner.lookup(*name)
                ))
                .with_label(*span, "declared with `let`")
                .with_note("use `var` to declare a mutable variable"),
            LowerProblem::NotAssignable { span } => Diagnostic::error(ErrorCode::E2010)
                .with_message("invalid assignment target")
                .with_label(*span, "not a place expression"),
            LowerProblem::BreakOutsideLoop { span, keyword } => {
                Diagnostic::error(ErrorCode::E2011)
                    .with_message(format!("`{keyword}` outside of a loop"))
                    .with_label(*span, "no enclosing loop")
            }
            LowerProblem::UnknownLabel { span, label } => Diagnostic::error(ErrorCode::E2011)
                .with_message(format!("unknown loop label `{}`", interner.lookup(*label)))
                .with_label(*span, "label not found"),
            LowerProblem::UnsupportedOp { span, op, ty } => Diagnostic::error(ErrorCode::E2012)
                .with_message(format!(
                    "operator `{op}` is not supported for `{}`",
                    ty_name(*ty)
                ))
                .with_label(*span, "unsupported operand type"),
            LowerProblem::DuplicateCase { span, previous } => {
                Diagnostic::error(ErrorCode::E3001)
                    .with_message("duplicate switch case")
                    .with_label(*span, "overlaps an earlier case")
                    .with_secondary_label(*previous, "previous case here")
            }
            LowerProblem::DuplicateElse { span, previous } => {
                Diagnostic::error(ErrorCode::E3001)
                    .with_message("multiple `else` prongs in switch")
                    .with_label(*span, "second `else`")
                    .with_secondary_label(*previous, "first `else` here")
            }
            LowerProblem::NonExhaustive { span, ty } => Diagnostic::error(ErrorCode::E3002)
                .with_message(format!(
                    "switch must handle all possible values of `{}`",
                    ty_name(*ty)
                ))
                .with_label(*span, "not all values handled")
                .with_note("add the missing cases or an `else` prong"),
            LowerProblem::NoMatchingProng { span, value } => Diagnostic::error(ErrorCode::E3002)
                .with_message(format!("switch value {value} matches no prong"))
                .with_label(*span, "value known at compile time"),
            LowerProblem::CaseNotComptime { span } => Diagnostic::error(ErrorCode::E3003)
                .with_message("switch case value must be known at compile time")
                .with_label(*span, "runtime value"),
            LowerProblem::InvertedRange { span, start, end } => {
                Diagnostic::error(ErrorCode::E3004)
                    .with_message(format!("range start {start} is greater than end {end}"))
                    .with_label(*span, "empty range")
            }
            LowerProblem::RedundantElse { span } => Diagnostic::error(ErrorCode::E3005)
                .with_message("unreachable `else` prong")
                .with_label(*span, "every value is already handled"),
            LowerProblem::UnreachableCode { span } => Diagnostic::warning(ErrorCode::E3006)
                .with_message("unreachable code")
                .with_label(*span, "control never reaches this"),
            LowerProblem::DivisionByZero { span } => Diagnostic::error(ErrorCode::E4001)
                .with_message("division by zero")
                .with_label(*span, "divisor is zero"),
            LowerProblem::UseOfUndefined { span } => Diagnostic::error(ErrorCode::E4002)
                .with_message("use of undefined value")
                .with_label(*span, "value is `undefined` here"),
            LowerProblem::ShiftOverflow { span, amount, bits } => {
                Diagnostic::error(ErrorCode::E4003)
                    .with_message(format!("shift amount {amount} exceeds bit width {bits}"))
                    .with_label(*span, "shift out of range")
            }
            LowerProblem::IndexOutOfBounds { span, index, len } => {
                Diagnostic::error(ErrorCode::E4004)
                    .with_message(format!("index {index} out of bounds for length {len}"))
                    .with_label(*span, "index out of bounds")
            }
            LowerProblem::NotComptime { span, what } => Diagnostic::error(ErrorCode::E4005)
                .with_message(format!("{what} must be known at compile time"))
                .with_label(*span, "not compile-time known"),
            LowerProblem::ComptimeOnlyVar { span, ty } => Diagnostic::error(ErrorCode::E4005)
                .with_message(format!(
                    "variable of type `{}` must be immutable",
                    ty_name(*ty)
                ))
                .with_label(*span, "declared with `var`")
                .with_note("use `let` or give the variable a runtime type"),
            LowerProblem::UnionInitCount { span, found } => Diagnostic::error(ErrorCode::E2005)
                .with_message(format!(
                    "union initializer must set exactly one field, found {found}"
                ))
                .with_label(*span, "invalid union initializer"),
            LowerProblem::TooLarge { span, limit } => Diagnostic::error(ErrorCode::E4006)
                .with_message(format!(
                    "aggregate is too large to expand at compile time (limit {limit} values)"
                ))
                .with_label(*span, "expanded here"),
            LowerProblem::Internal { span, message } => {
                kiln_diagnostic::queue::internal_error(message.clone(), *span)
            }
        }
    }
}

#[cold]
fn redeclared(name: &str, span: Span, previous: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2003)
        .with_message(format!("redeclaration of `{name}`"))
        .with_label(span, "redeclared here")
        .with_secondary_label(previous, "previously declared here")
}
