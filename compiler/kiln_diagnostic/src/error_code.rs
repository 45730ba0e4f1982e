//! Error codes for all diagnostics of the semantic core.
//!
//! Each error code is a unique identifier (e.g., `E2001`) with the first digit
//! indicating the compiler phase.

use std::fmt;

/// Error codes for all diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E2xxx: Type and declaration errors
/// - E3xxx: Switch and control-flow errors
/// - E4xxx: Compile-time evaluation errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Type Errors (E2xxx)
    /// Unknown type or identifier
    E2001,
    /// Type mismatch
    E2002,
    /// Redeclaration of a name in the same scope
    E2003,
    /// Duplicate struct field or enum variant
    E2004,
    /// No such field or variant
    E2005,
    /// Value does not fit in the destination type
    E2006,
    /// Integer literal overflowed while parsing
    E2007,
    /// Wrong number of call arguments
    E2008,
    /// Unknown function
    E2009,
    /// Assignment to an immutable binding or non-place expression
    E2010,
    /// `break`/`continue` outside of a loop, or unknown label
    E2011,
    /// Operator not supported for the operand type
    E2012,

    // Switch / Control-Flow Errors (E3xxx)
    /// Duplicate or overlapping switch case
    E3001,
    /// Switch does not handle every value
    E3002,
    /// Switch case value is not known at compile time
    E3003,
    /// Switch range start is greater than its end
    E3004,
    /// `else` prong on a switch that is already exhaustive
    E3005,
    /// Unreachable code (warning)
    E3006,

    // Compile-time Evaluation Errors (E4xxx)
    /// Division or remainder by zero
    E4001,
    /// Use of an undefined value where a defined one is required
    E4002,
    /// Shift amount out of range
    E4003,
    /// Index out of bounds
    E4004,
    /// Value must be known at compile time
    E4005,
    /// Compile-time aggregate too large to expand
    E4006,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E4005 => "E4005",
            ErrorCode::E4006 => "E4006",
            ErrorCode::E9001 => "E9001",
        }
    }

    pub fn is_type_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    pub fn is_switch_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    pub fn is_comptime_error(&self) -> bool {
        self.as_str().starts_with("E4")
    }

    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001)
    }

    /// Codes that are reported as warnings rather than errors.
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::E3006)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
