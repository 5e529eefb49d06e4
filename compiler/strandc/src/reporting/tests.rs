use pretty_assertions::assert_eq;
use strand_diagnostic::{Diagnostic, ErrorCode, Pass};
use strand_ir::{SourceMap, Span};

use super::*;

const SOURCE: &str = "package main\n\nfunc main() {\n\tp := &x\n}\n";

fn sources() -> (SourceMap, Span) {
    let mut map = SourceMap::new();
    let file = map.add_file("main.go", SOURCE);
    // `&x` on line 4
    (map, Span::new(file, 34, 36))
}

#[test]
fn plain_output_lists_labels_notes_and_help() {
    let (map, span) = sources();
    let diag = Diagnostic::error(ErrorCode::E2002)
        .with_pass(Pass::Boxing)
        .with_message("cannot take the address")
        .with_label(span, "this operand has no address")
        .with_note("first note")
        .with_suggestion("assign the value to a variable first");

    assert_eq!(
        render_plain(&map, &[diag]),
        "error[E2002]: cannot take the address (in boxing analysis)\n\
         \x20 --> main.go:4:7: this operand has no address\n\
         \x20 = note: first note\n\
         \x20 = help: assign the value to a variable first\n"
    );
}

#[test]
fn secondary_labels_and_dummy_spans() {
    let (map, span) = sources();
    let diag = Diagnostic::error(ErrorCode::E9001)
        .with_message("internal")
        .with_label(Span::DUMMY, "")
        .with_secondary_label(span, "related");

    assert_eq!(
        render_plain(&map, &[diag]),
        "error[E9001]: internal\n\
         \x20 --> <generated>\n\
         \x20     main.go:4:7: related\n"
    );
}

#[test]
fn summary_line_counts_errors() {
    let map = SourceMap::new();
    let mut emitter = PlainEmitter::new(Vec::new(), &map);
    emitter.emit_summary(0);
    emitter.emit_summary(1);
    emitter.emit_summary(3);
    assert_eq!(
        String::from_utf8_lossy(&emitter.into_inner()),
        "error: aborting due to previous error\nerror: aborting due to 3 previous errors\n"
    );
}

#[test]
fn ariadne_falls_back_without_a_source_position() {
    let map = SourceMap::new();
    let diag = Diagnostic::error(ErrorCode::E9001)
        .with_message("internal")
        .with_label(Span::DUMMY, "");
    let mut emitter = AriadneEmitter::new(Vec::new(), &map, false);
    emitter.emit(&diag);
    assert_eq!(
        String::from_utf8_lossy(&emitter.into_inner()),
        render_plain(&map, &[diag])
    );
}

#[test]
fn ariadne_renders_code_and_label() {
    let (map, span) = sources();
    let diag = Diagnostic::error(ErrorCode::E2001)
        .with_pass(Pass::Boxing)
        .with_message("unsupported address-of")
        .with_label(span, "address taken here");
    let mut emitter = AriadneEmitter::new(Vec::new(), &map, false);
    emitter.emit(&diag);
    let out = String::from_utf8_lossy(&emitter.into_inner()).into_owned();
    assert!(out.contains("E2001"), "{out}");
    assert!(out.contains("unsupported address-of"), "{out}");
    assert!(out.contains("address taken here"), "{out}");
    assert!(out.contains("main.go"), "{out}");
}
