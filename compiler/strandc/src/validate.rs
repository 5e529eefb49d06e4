//! Consistency checks over the merged results.
//!
//! The analyses are independent, so nothing forces their outputs to agree.
//! Before an [`AnnotatedProgram`] is handed out, the driver checks the facts
//! the code generator relies on:
//!
//! - every suspension point sits in an async function
//! - every caller of an async function (outside `go` and the allow-list) is async
//! - every expression and symbol has a type descriptor
//! - every boxed symbol exists
//! - no alias names a boxed symbol, and no boxed pointer is an alias
//!
//! A violation is a bug in an analysis, reported as an internal error.

use strand_async::SuspendSite;
use strand_diagnostic::ErrorCode;
use strand_ir::{Span, SymbolId};
use thiserror::Error;
use tracing::debug;

use crate::AnnotatedProgram;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("suspension point in `{func}`, which is not async")]
    SuspensionInSyncFunc { span: Span, func: String },

    #[error("`{caller}` calls async `{callee}` but is not async")]
    BrokenContagion {
        span: Span,
        caller: String,
        callee: String,
    },

    #[error("expression has no type descriptor")]
    MissingExprType { span: Span },

    #[error("symbol `{name}` has no type descriptor")]
    MissingSymbolType { span: Span, name: String },

    #[error("boxed symbol #{index} does not exist")]
    UnknownBoxedSymbol { index: usize },

    #[error("`{pointer}` is rewritten as an alias of `{target}`, but one of them is boxed")]
    BoxedAlias {
        span: Span,
        pointer: String,
        target: String,
    },
}

impl Violation {
    pub fn span(&self) -> Span {
        match self {
            Violation::SuspensionInSyncFunc { span, .. }
            | Violation::BrokenContagion { span, .. }
            | Violation::MissingExprType { span }
            | Violation::MissingSymbolType { span, .. }
            | Violation::BoxedAlias { span, .. } => *span,
            Violation::UnknownBoxedSymbol { .. } => Span::DUMMY,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Violation::MissingExprType { .. } | Violation::MissingSymbolType { .. } => ErrorCode::E9002,
            _ => ErrorCode::E9001,
        }
    }
}

pub fn validate(annotated: &AnnotatedProgram<'_>) -> Vec<Violation> {
    let mut out = Vec::new();
    check_async(annotated, &mut out);
    check_types(annotated, &mut out);
    check_boxing(annotated, &mut out);
    debug!(violations = out.len(), "annotated program validated");
    out
}

fn check_async(annotated: &AnnotatedProgram<'_>, out: &mut Vec<Violation>) {
    let program = annotated.program();
    for point in annotated.suspension_points() {
        if !annotated.is_async(point.func) {
            let span = match point.site {
                SuspendSite::Expr(e) => program.expr(e).span,
                SuspendSite::Stmt(s) => program.stmt(s).span,
            };
            out.push(Violation::SuspensionInSyncFunc {
                span,
                func: program.qualified_name(point.func),
            });
        }
    }
    for edge in annotated.call_graph().edges() {
        if edge.context.propagates()
            && annotated.is_async(edge.callee)
            && !annotated.is_async(edge.caller)
            && !annotated.func_async(edge.caller).allowlisted
        {
            out.push(Violation::BrokenContagion {
                span: program.expr(edge.site).span,
                caller: program.qualified_name(edge.caller),
                callee: program.qualified_name(edge.callee),
            });
        }
    }
}

fn check_types(annotated: &AnnotatedProgram<'_>, out: &mut Vec<Violation>) {
    let program = annotated.program();
    let model = annotated.model();
    out.extend(
        program
            .expr_ids()
            .filter(|&e| model.expr_type(e).is_none())
            .map(|e| Violation::MissingExprType {
                span: program.expr(e).span,
            }),
    );
    out.extend(
        program
            .symbol_ids()
            .filter(|&s| model.symbol_type(s).is_none())
            .map(|s| {
                let symbol = program.symbol(s);
                Violation::MissingSymbolType {
                    span: symbol.span,
                    name: program.name(symbol.name).to_owned(),
                }
            }),
    );
}

fn check_boxing(annotated: &AnnotatedProgram<'_>, out: &mut Vec<Violation>) {
    let program = annotated.program();
    let boxing = annotated.boxing();
    for symbol in boxing.boxed_symbols() {
        if program.get_symbol(symbol).is_none() {
            out.push(Violation::UnknownBoxedSymbol {
                index: symbol.index(),
            });
        }
    }
    let name = |s: SymbolId| {
        program
            .get_symbol(s)
            .map_or_else(|| format!("#{}", s.index()), |sym| program.name(sym.name).to_owned())
    };
    for (pointer, target) in boxing.aliases() {
        if boxing.is_boxed(pointer) || boxing.is_boxed(target) {
            out.push(Violation::BoxedAlias {
                span: program.get_symbol(pointer).map_or(Span::DUMMY, |s| s.span),
                pointer: name(pointer),
                target: name(target),
            });
        }
    }
}
