//! Shapes the async analysis rejects.

use strand_diagnostic::ErrorCode;
use strand_ir::Span;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AsyncProblem {
    /// `go` or `defer` applied to something other than a call.
    #[error("expression in `{keyword}` must be a function call")]
    NotACall { span: Span, keyword: &'static str },

    /// The callee's type has no function signature.
    #[error("cannot call a value of type `{ty}`")]
    NotCallable { span: Span, ty: String },
}

impl AsyncProblem {
    pub fn span(&self) -> Span {
        match self {
            AsyncProblem::NotACall { span, .. } | AsyncProblem::NotCallable { span, .. } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AsyncProblem::NotACall { .. } => ErrorCode::E3001,
            AsyncProblem::NotCallable { .. } => ErrorCode::E3002,
        }
    }
}
