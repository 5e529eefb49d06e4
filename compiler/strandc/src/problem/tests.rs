use pretty_assertions::assert_eq;
use strand_diagnostic::{ErrorCode, Severity};
use strand_ir::{FileId, Span};

use super::*;

fn span(start: u32) -> Span {
    Span::new(FileId::from_usize(0), start, start + 1)
}

#[test]
fn ambiguous_promotion_points_at_every_candidate() {
    let problem = TypeProblem::AmbiguousPromotion {
        span: span(10),
        member: "G".to_owned(),
        ty: "main.Outer".to_owned(),
        depth: 1,
        candidates: vec![span(1), span(5)],
    };
    let diag = problem.into_diagnostic();

    assert_eq!(diag.code, ErrorCode::E1003);
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.pass, Some(Pass::TypeModel));
    assert_eq!(diag.primary_span(), Some(span(10)));
    let secondary: Vec<_> = diag
        .labels
        .iter()
        .filter(|l| !l.is_primary)
        .map(|l| l.span)
        .collect();
    assert_eq!(secondary, vec![span(1), span(5)]);
    assert_eq!(
        diag.message,
        "ambiguous selector `G` on `main.Outer`: 2 members at depth 1"
    );
}

#[test]
fn every_pass_is_tagged() {
    let boxing = BoxingProblem::UnaddressableReceiver {
        span: span(3),
        method: "Inc".to_owned(),
        construct: "a call result",
    }
    .into_diagnostic();
    assert_eq!(boxing.code, ErrorCode::E2002);
    assert_eq!(boxing.pass, Some(Pass::Boxing));
    assert_eq!(boxing.suggestions.len(), 1);

    let asyncs = AsyncProblem::NotACall {
        span: span(4),
        keyword: "go",
    }
    .into_diagnostic();
    assert_eq!(asyncs.code, ErrorCode::E3001);
    assert_eq!(asyncs.pass, Some(Pass::Async));
    assert_eq!(asyncs.primary_span(), Some(span(4)));

    let unresolved = TypeProblem::UnresolvedType {
        span: span(2),
        detail: "Missing".to_owned(),
    }
    .into_diagnostic();
    assert_eq!(unresolved.code, ErrorCode::E1001);
    assert_eq!(unresolved.primary_span(), Some(span(2)));
}

#[test]
fn internal_violations_are_merge_errors() {
    let with_span = Violation::MissingExprType { span: span(8) }.into_diagnostic();
    assert_eq!(with_span.code, ErrorCode::E9002);
    assert_eq!(with_span.pass, Some(Pass::Merge));
    assert_eq!(with_span.notes.len(), 1);
    assert_eq!(with_span.primary_span(), Some(span(8)));

    let without_span = Violation::UnknownBoxedSymbol { index: 3 }.into_diagnostic();
    assert_eq!(without_span.code, ErrorCode::E9001);
    assert!(without_span.labels.is_empty());
}
