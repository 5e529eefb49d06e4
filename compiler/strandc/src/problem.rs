//! Problems from every pass, as diagnostics.
//!
//! Each analysis crate reports its own structured problem enum; this module
//! owns the presentation: message, labels, notes and the [`Pass`] tag.

use strand_async::AsyncProblem;
use strand_diagnostic::{Diagnostic, Pass};
use strand_escape::BoxingProblem;
use strand_types::TypeProblem;

use crate::validate::Violation;

/// Conversion of a pass problem into a user-facing diagnostic.
pub trait IntoDiagnostic {
    fn into_diagnostic(&self) -> Diagnostic;
}

impl IntoDiagnostic for TypeProblem {
    fn into_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code())
            .with_pass(Pass::TypeModel)
            .with_message(self.to_string());
        match self {
            TypeProblem::AmbiguousPromotion { span, candidates, .. } => candidates.iter().fold(
                diag.with_label(*span, "ambiguous selector"),
                |diag, &candidate| diag.with_secondary_label(candidate, "candidate declared here"),
            ),
            TypeProblem::UnresolvedMember { span, member, .. } => {
                diag.with_label(*span, format!("no member `{member}`"))
            }
            TypeProblem::UnsatisfiableConstraint { span, .. } => diag
                .with_label(*span, "type argument used here")
                .with_note("constraints are checked against the type argument's method set and type set"),
            TypeProblem::RecursiveType { span, .. } => diag
                .with_label(*span, "declared here")
                .with_suggestion("break the cycle with a pointer, slice, map or channel"),
            TypeProblem::DuplicateMethod { span, method, .. } => {
                diag.with_label(*span, format!("`{method}` has two signatures in this interface"))
            }
            _ => diag.with_label(self.span(), ""),
        }
    }
}

impl IntoDiagnostic for BoxingProblem {
    fn into_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code())
            .with_pass(Pass::Boxing)
            .with_message(self.to_string());
        match self {
            BoxingProblem::UnsupportedConstruct { span, .. } => diag
                .with_label(*span, "address taken here")
                .with_note("only variables, fields, slice and array elements, and composite literals are addressable"),
            BoxingProblem::UnaddressableReceiver { span, .. } => diag
                .with_label(*span, "this operand has no address")
                .with_suggestion("assign the value to a variable first"),
        }
    }
}

impl IntoDiagnostic for AsyncProblem {
    fn into_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code())
            .with_pass(Pass::Async)
            .with_message(self.to_string());
        match self {
            AsyncProblem::NotACall { span, keyword } => {
                diag.with_label(*span, format!("`{keyword}` needs a call here"))
            }
            AsyncProblem::NotCallable { span, .. } => diag.with_label(*span, "called here"),
        }
    }
}

impl IntoDiagnostic for Violation {
    fn into_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code())
            .with_pass(Pass::Merge)
            .with_message(self.to_string())
            .with_note("this is a bug in the analyses, not in the program");
        let span = self.span();
        if span.is_dummy() {
            diag
        } else {
            diag.with_label(span, "")
        }
    }
}

#[cfg(test)]
mod tests;
