//! Diagnostic queue for collecting, deduplicating, and sorting diagnostics.
//!
//! The analyses run to completion and report every problem they find; the
//! queue decides what reaches the user:
//! - error limit to keep output readable
//! - deduplication of identical diagnostics reported by several walks
//! - stable ordering by source position, then pass

use rustc_hash::FxHashSet;

use crate::{Diagnostic, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    /// Drop diagnostics identical to one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 25,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// No limits (for tests).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<Diagnostic>,
    error_count: usize,
    /// Errors reported after the limit was hit.
    suppressed: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            seen: FxHashSet::default(),
            error_count: 0,
            suppressed: 0,
            config,
        }
    }

    /// Queue a diagnostic.
    ///
    /// Returns `true` if it was kept, `false` if filtered as a duplicate or
    /// over the error limit.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        if self.config.deduplicate && self.seen.contains(&diag) {
            return false;
        }
        if diag.is_error() {
            if self.config.error_limit > 0 && self.error_count >= self.config.error_limit {
                self.suppressed += 1;
                return false;
            }
            self.error_count += 1;
        }
        if self.config.deduplicate {
            self.seen.insert(diag.clone());
        }
        self.diagnostics.push(diag);
        true
    }

    /// Queue an error and return proof that it was reported.
    ///
    /// The proof is returned even when the error itself was filtered: a
    /// filtered error always duplicates or follows a kept one.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        self.add(diag);
        ErrorGuaranteed::new_emitted()
    }

    pub fn extend(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
        for diag in diags {
            self.add(diag);
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Errors dropped by the error limit.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Proof of reported errors, if any were.
    pub fn guarantee(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Take all diagnostics sorted by primary span, then pass, then code.
    /// Diagnostics without a span sort last.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut out = std::mem::take(&mut self.diagnostics);
        out.sort_by_key(|d| {
            let span = d.primary_span();
            (
                span.is_none(),
                span.map(|s| (s.file, s.start, s.end)),
                d.pass,
                d.code,
            )
        });
        self.seen.clear();
        out
    }
}

#[cfg(test)]
mod tests;
