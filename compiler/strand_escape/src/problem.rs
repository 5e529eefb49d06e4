//! Constructs the boxing analysis cannot model.

use strand_diagnostic::ErrorCode;
use strand_ir::Span;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoxingProblem {
    /// `&` applied to something without a storage location.
    #[error("cannot take the address of {construct}")]
    UnsupportedConstruct { span: Span, construct: &'static str },

    /// A pointer-receiver method called on a value that has no address.
    #[error("method `{method}` has a pointer receiver but is called on {construct}")]
    UnaddressableReceiver {
        span: Span,
        method: String,
        construct: &'static str,
    },
}

impl BoxingProblem {
    pub fn span(&self) -> Span {
        match self {
            BoxingProblem::UnsupportedConstruct { span, .. }
            | BoxingProblem::UnaddressableReceiver { span, .. } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            BoxingProblem::UnsupportedConstruct { .. } => ErrorCode::E2001,
            BoxingProblem::UnaddressableReceiver { .. } => ErrorCode::E2002,
        }
    }
}
