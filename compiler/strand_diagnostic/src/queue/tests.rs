use pretty_assertions::assert_eq;
use strand_ir::{FileId, Span};

use super::*;
use crate::{ErrorCode, Pass};

fn at(start: u32) -> Span {
    Span::new(FileId::new(0), start, start + 1)
}

fn err(code: ErrorCode, start: u32) -> Diagnostic {
    Diagnostic::error(code)
        .with_message(format!("problem at {start}"))
        .with_label(at(start), "here")
}

#[test]
fn flush_sorts_by_position() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(err(ErrorCode::E2001, 30));
    queue.add(err(ErrorCode::E1001, 10));
    queue.add(Diagnostic::error(ErrorCode::E9001).with_message("no span"));
    queue.add(err(ErrorCode::E3001, 20));

    let codes: Vec<_> = queue.flush().into_iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![ErrorCode::E1001, ErrorCode::E3001, ErrorCode::E2001, ErrorCode::E9001]
    );
}

#[test]
fn same_position_orders_by_pass() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(err(ErrorCode::E3002, 5).with_pass(Pass::Async));
    queue.add(err(ErrorCode::E1002, 5).with_pass(Pass::TypeModel));

    let passes: Vec<_> = queue.flush().into_iter().map(|d| d.pass).collect();
    assert_eq!(passes, vec![Some(Pass::TypeModel), Some(Pass::Async)]);
}

#[test]
fn duplicates_are_dropped() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(err(ErrorCode::E2001, 3)));
    assert!(!queue.add(err(ErrorCode::E2001, 3)));
    assert_eq!(queue.error_count(), 1);
}

#[test]
fn error_limit_counts_suppressed() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: true,
    });
    for start in 0..5 {
        queue.add(err(ErrorCode::E1001, start));
    }
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.suppressed_count(), 3);
}

#[test]
fn guarantee_tracks_errors_only() {
    let mut queue = DiagnosticQueue::new();
    queue.add(Diagnostic::warning(ErrorCode::E9001).with_message("odd"));
    assert!(queue.guarantee().is_none());
    let _ = queue.emit_error(err(ErrorCode::E1004, 0));
    assert!(queue.guarantee().is_some());
    assert!(queue.has_errors());
}
