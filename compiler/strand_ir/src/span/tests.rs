use pretty_assertions::assert_eq;

use super::*;

#[test]
fn line_col_is_one_based() {
    let file = SourceFile::new("main.src", "var x int\np := &x\n");
    assert_eq!(file.line_col(0), (1, 1));
    assert_eq!(file.line_col(4), (1, 5));
    assert_eq!(file.line_col(10), (2, 1));
    assert_eq!(file.line_col(15), (2, 6));
}

#[test]
fn position_resolves_through_map() {
    let mut map = SourceMap::new();
    let id = map.add_file("pkg/a.src", "func f() {\n\t<-ch\n}\n");
    let pos = map.position(Span::new(id, 12, 16)).expect("file exists");
    assert_eq!(pos.to_string(), "pkg/a.src:2:2");
}

#[test]
fn dummy_span_has_no_position() {
    let map = SourceMap::new();
    assert!(Span::DUMMY.is_dummy());
    assert_eq!(map.position(Span::DUMMY), None);
}

#[test]
fn merge_covers_both_spans_in_same_file() {
    let file = FileId::new(0);
    let merged = Span::new(file, 10, 12).merge(Span::new(file, 4, 8));
    assert_eq!(merged, Span::new(file, 4, 12));
}

#[test]
fn merge_across_files_keeps_left() {
    let left = Span::new(FileId::new(0), 1, 2);
    let right = Span::new(FileId::new(1), 5, 9);
    assert_eq!(left.merge(right), left);
}
