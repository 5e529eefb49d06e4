//! Problems found while building the type model.
//!
//! All of them are fatal: the model is only handed out when the list is empty.

use strand_diagnostic::ErrorCode;
use strand_ir::Span;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TypeProblem {
    #[error("unresolved type reference: {detail}")]
    UnresolvedType { span: Span, detail: String },

    #[error("`{ty}` has no field or method `{member}`")]
    UnresolvedMember {
        span: Span,
        member: String,
        ty: String,
    },

    #[error("ambiguous selector `{member}` on `{ty}`: {} members at depth {depth}", candidates.len())]
    AmbiguousPromotion {
        span: Span,
        member: String,
        ty: String,
        depth: usize,
        /// Spans of the colliding declarations.
        candidates: Vec<Span>,
    },

    #[error("`{arg}` does not satisfy the constraint of `{param}`: {reason}")]
    UnsatisfiableConstraint {
        span: Span,
        param: String,
        arg: String,
        reason: String,
    },

    #[error("`{generic}` expects {expected} type arguments, found {found}")]
    TypeArgCount {
        span: Span,
        generic: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid recursive type `{name}`")]
    RecursiveType { span: Span, name: String },

    #[error("duplicate method `{method}` with conflicting signatures `{first}` and `{second}`")]
    DuplicateMethod {
        span: Span,
        method: String,
        first: String,
        second: String,
    },
}

impl TypeProblem {
    pub fn span(&self) -> Span {
        match self {
            TypeProblem::UnresolvedType { span, .. }
            | TypeProblem::UnresolvedMember { span, .. }
            | TypeProblem::AmbiguousPromotion { span, .. }
            | TypeProblem::UnsatisfiableConstraint { span, .. }
            | TypeProblem::TypeArgCount { span, .. }
            | TypeProblem::RecursiveType { span, .. }
            | TypeProblem::DuplicateMethod { span, .. } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            TypeProblem::UnresolvedType { .. } => ErrorCode::E1001,
            TypeProblem::UnresolvedMember { .. } => ErrorCode::E1002,
            TypeProblem::AmbiguousPromotion { .. } => ErrorCode::E1003,
            TypeProblem::UnsatisfiableConstraint { .. } => ErrorCode::E1004,
            TypeProblem::TypeArgCount { .. } => ErrorCode::E1005,
            TypeProblem::RecursiveType { .. } => ErrorCode::E1006,
            TypeProblem::DuplicateMethod { .. } => ErrorCode::E1007,
        }
    }
}
