//! The pipeline: type model, then boxing and async side by side, then merge.
//!
//! Every stage is all-or-nothing. When a stage reports problems the driver
//! stops after it (both analyses of the middle stage always run, so their
//! problems are reported together) and returns the diagnostics instead of
//! a partial result.

use strand_async::analyze_async;
use strand_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode, ErrorGuaranteed, Pass};
use strand_escape::analyze_boxing;
use strand_ir::Program;
use strand_types::build_type_model;
use thiserror::Error;
use tracing::{debug, debug_span};

use crate::problem::IntoDiagnostic;
use crate::validate::validate;
use crate::{AnnotatedProgram, CompilerConfig};

/// Compilation stopped with errors.
#[derive(Debug, Error)]
#[error("compilation failed with {error_count} error(s)")]
pub struct CompileError {
    /// Sorted by position; see [`DiagnosticQueue::flush`].
    pub diagnostics: Vec<Diagnostic>,
    pub error_count: usize,
    pub guarantee: ErrorGuaranteed,
}

/// Run every analysis over `program` and merge the results.
///
/// # Errors
///
/// Returns the diagnostics of the first stage that rejected the program.
pub fn compile<'p>(program: &'p Program, config: &CompilerConfig) -> Result<AnnotatedProgram<'p>, CompileError> {
    let _span = debug_span!("compile", funcs = program.func_count(), exprs = program.expr_count()).entered();
    let mut queue = DiagnosticQueue::with_config(config.diagnostics.clone());

    let model = match build_type_model(program) {
        Ok(model) => model,
        Err(problems) => return Err(fail(&mut queue, problems.iter().map(IntoDiagnostic::into_diagnostic))),
    };

    let (boxing, asyncs) = if config.parallel {
        rayon::join(
            || analyze_boxing(program, &model),
            || analyze_async(program, &model, &config.async_config),
        )
    } else {
        (
            analyze_boxing(program, &model),
            analyze_async(program, &model, &config.async_config),
        )
    };
    let (boxing, asyncs) = match (boxing, asyncs) {
        (Ok(boxing), Ok(asyncs)) => (boxing, asyncs),
        (boxing, asyncs) => {
            let mut diags = Vec::new();
            if let Err(problems) = boxing {
                diags.extend(problems.iter().map(IntoDiagnostic::into_diagnostic));
            }
            if let Err(problems) = asyncs {
                diags.extend(problems.iter().map(IntoDiagnostic::into_diagnostic));
            }
            return Err(fail(&mut queue, diags));
        }
    };

    let annotated = AnnotatedProgram::new(program, model, boxing, asyncs);
    let violations = validate(&annotated);
    if !violations.is_empty() {
        return Err(fail(&mut queue, violations.iter().map(IntoDiagnostic::into_diagnostic)));
    }
    debug!(summary = ?annotated.summary(), "compilation complete");
    Ok(annotated)
}

fn fail(queue: &mut DiagnosticQueue, diags: impl IntoIterator<Item = Diagnostic>) -> CompileError {
    let mut guarantee = None;
    for diag in diags {
        guarantee = Some(queue.emit_error(diag));
    }
    let guarantee = guarantee.unwrap_or_else(|| {
        queue.emit_error(
            Diagnostic::error(ErrorCode::E9001)
                .with_pass(Pass::Merge)
                .with_message("an analysis failed without reporting a problem"),
        )
    });
    let error_count = queue.error_count();
    debug!(error_count, suppressed = queue.suppressed_count(), "compilation failed");
    CompileError {
        diagnostics: queue.flush(),
        error_count,
        guarantee,
    }
}
