use super::*;

#[test]
fn zero_errors_give_no_guarantee() {
    assert!(ErrorGuaranteed::from_error_count(0).is_none());
}

#[test]
fn nonzero_errors_give_guarantee() {
    let g = ErrorGuaranteed::from_error_count(3).expect("errors were counted");
    assert_eq!(g.to_string(), "error(s) emitted");
}
