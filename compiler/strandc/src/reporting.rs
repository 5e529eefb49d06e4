//! Diagnostic rendering.
//!
//! Two emitters share the [`DiagnosticEmitter`] trait:
//! - [`PlainEmitter`]: one `path:line:col` line per label, for logs and tests
//! - [`AriadneEmitter`]: source snippets with underlined labels
//!
//! Both resolve spans against the program's [`SourceMap`].

use std::io::Write;
use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind};
use strand_diagnostic::{Diagnostic, Severity};
use strand_ir::{SourceMap, Span};

/// Writes diagnostics somewhere.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    /// Closing "aborting due to" line; nothing when there were no errors.
    fn emit_summary(&mut self, error_count: usize);
}

fn summary_line(error_count: usize) -> Option<String> {
    match error_count {
        0 => None,
        1 => Some("error: aborting due to previous error".to_owned()),
        n => Some(format!("error: aborting due to {n} previous errors")),
    }
}

fn location(sources: &SourceMap, span: Span) -> String {
    sources
        .position(span)
        .map_or_else(|| "<generated>".to_owned(), |p| p.to_string())
}

/// Plain-text emitter.
pub struct PlainEmitter<'s, W: Write> {
    writer: W,
    sources: &'s SourceMap,
}

impl<'s, W: Write> PlainEmitter<'s, W> {
    pub fn new(writer: W, sources: &'s SourceMap) -> Self {
        PlainEmitter { writer, sources }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticEmitter for PlainEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let _ = writeln!(self.writer, "{diagnostic}");
        for label in &diagnostic.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            let at = location(self.sources, label.span);
            if label.message.is_empty() {
                let _ = writeln!(self.writer, "  {marker} {at}");
            } else {
                let _ = writeln!(self.writer, "  {marker} {at}: {}", label.message);
            }
        }
        for note in &diagnostic.notes {
            let _ = writeln!(self.writer, "  = note: {note}");
        }
        for suggestion in &diagnostic.suggestions {
            let _ = writeln!(self.writer, "  = help: {suggestion}");
        }
    }

    fn emit_summary(&mut self, error_count: usize) {
        if let Some(line) = summary_line(error_count) {
            let _ = writeln!(self.writer, "{line}");
        }
    }
}

/// Snippet emitter backed by `ariadne`.
///
/// Diagnostics without a source position fall back to the plain format.
pub struct AriadneEmitter<'s, W: Write> {
    writer: W,
    sources: &'s SourceMap,
    color: bool,
}

impl<'s, W: Write> AriadneEmitter<'s, W> {
    pub fn new(writer: W, sources: &'s SourceMap, color: bool) -> Self {
        AriadneEmitter {
            writer,
            sources,
            color,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// `(path, char range)` of a span; ariadne counts characters, spans count bytes.
    fn resolve(&self, span: Span) -> Option<(String, Range<usize>)> {
        let file = self.sources.file(span.file)?;
        let chars = |byte: u32| {
            let byte = usize::try_from(byte).unwrap_or(usize::MAX).min(file.text.len());
            file.text.get(..byte).map_or(byte, |prefix| prefix.chars().count())
        };
        Some((file.path.clone(), chars(span.start)..chars(span.end)))
    }

    fn render(&mut self, diagnostic: &Diagnostic) -> Option<()> {
        let (path, primary) = self.resolve(diagnostic.primary_span()?)?;
        let kind = match diagnostic.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Note => ReportKind::Advice,
        };
        let message = match diagnostic.pass {
            Some(pass) => format!("{} (in {pass})", diagnostic.message),
            None => diagnostic.message.clone(),
        };
        let mut report = Report::build(kind, path, primary.start)
            .with_code(diagnostic.code.as_str())
            .with_message(message)
            .with_config(Config::default().with_color(self.color));
        for label in &diagnostic.labels {
            let Some(resolved) = self.resolve(label.span) else {
                continue;
            };
            let mut ariadne_label = Label::new(resolved);
            if !label.message.is_empty() {
                ariadne_label = ariadne_label.with_message(&label.message);
            }
            if label.is_primary {
                ariadne_label = ariadne_label.with_order(-1);
            }
            report = report.with_label(ariadne_label);
        }
        for note in &diagnostic.notes {
            report = report.with_note(note);
        }
        for suggestion in &diagnostic.suggestions {
            report = report.with_help(suggestion);
        }

        let cache = ariadne::sources(
            self.sources
                .files()
                .map(|(_, f)| (f.path.clone(), f.text.clone())),
        );
        report.finish().write(cache, &mut self.writer).ok()
    }
}

impl<W: Write> DiagnosticEmitter for AriadneEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        if self.render(diagnostic).is_none() {
            let mut plain = PlainEmitter::new(&mut self.writer, self.sources);
            plain.emit(diagnostic);
        }
    }

    fn emit_summary(&mut self, error_count: usize) {
        if let Some(line) = summary_line(error_count) {
            let _ = writeln!(self.writer, "{line}");
        }
    }
}

/// Render every diagnostic as plain text.
pub fn render_plain(sources: &SourceMap, diagnostics: &[Diagnostic]) -> String {
    let mut emitter = PlainEmitter::new(Vec::new(), sources);
    emitter.emit_all(diagnostics);
    String::from_utf8_lossy(&emitter.into_inner()).into_owned()
}

#[cfg(test)]
mod tests;
