//! Error codes for all diagnostics.
//!
//! Each code is a unique identifier (e.g. `E2001`) whose first digit names the
//! analysis that raises it. Codes are stable: tooling and documentation key on
//! them.

use std::fmt;

/// Error codes.
///
/// Format: E#### where the first digit indicates the pass:
/// - E1xxx: type and runtime model
/// - E2xxx: boxing (escape) analysis
/// - E3xxx: async (blocking) analysis
/// - E9xxx: internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    // Type model (E1xxx)
    /// Unresolved type reference
    E1001,
    /// Unresolved member (field or method)
    E1002,
    /// Ambiguous promoted member
    E1003,
    /// Unsatisfiable generic constraint
    E1004,
    /// Wrong number of type arguments
    E1005,
    /// Invalid recursive type
    E1006,
    /// Same method embedded twice with different signatures
    E1007,

    // Boxing (E2xxx)
    /// Address of an unaddressable operand
    E2001,
    /// Pointer-receiver method called on an unaddressable operand
    E2002,

    // Async (E3xxx)
    /// `go`/`defer` operand is not a call
    E3001,
    /// Call target cannot be analyzed
    E3002,

    // Internal (E9xxx)
    /// Annotated program invariant violated
    E9001,
    /// Typed node without a type descriptor
    E9002,
}

impl ErrorCode {
    /// All codes, in numeric order.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E9001,
        ErrorCode::E9002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// One-line explanation for `--explain` style lookups.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "a type reference could not be resolved to a declaration",
            ErrorCode::E1002 => "a selector names no field or method of the operand type",
            ErrorCode::E1003 => {
                "a selector matches members of two embedded types at the same depth"
            }
            ErrorCode::E1004 => "a type argument does not satisfy its type parameter's constraint",
            ErrorCode::E1005 => "a generic type or function was given the wrong number of type arguments",
            ErrorCode::E1006 => "a named type's underlying type refers back to itself",
            ErrorCode::E1007 => {
                "an interface gets one method name from two places with different signatures"
            }
            ErrorCode::E2001 => {
                "the operand of `&` is not a variable, field, element, or composite literal"
            }
            ErrorCode::E2002 => {
                "a method with a pointer receiver is called on an operand that has no address"
            }
            ErrorCode::E3001 => "the operand of `go` or `defer` must be a function call",
            ErrorCode::E3002 => "the callee of a call expression is not a function value",
            ErrorCode::E9001 => "the merged analysis results are inconsistent",
            ErrorCode::E9002 => "a typed node has no type descriptor",
        }
    }

    pub fn is_type_model_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_boxing_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    pub fn is_async_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    pub fn is_internal_error(&self) -> bool {
        self.as_str().starts_with("E9")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}
