use pretty_assertions::assert_eq;

use super::*;

#[test]
fn default_is_invalid() {
    assert!(!ExprId::default().is_valid());
    assert_eq!(SymbolId::default(), SymbolId::INVALID);
}

#[test]
fn from_usize_round_trips_index() {
    let id = FuncId::from_usize(42);
    assert_eq!(id.index(), 42);
    assert_eq!(id.raw(), 42);
    assert!(id.is_valid());
}

#[test]
fn debug_names_the_handle_kind() {
    assert_eq!(format!("{:?}", StmtId::new(3)), "StmtId(3)");
    assert_eq!(format!("{:?}", TypeDeclId::INVALID), "TypeDeclId::INVALID");
}

#[test]
fn handles_order_by_index() {
    let mut ids = vec![ExprId::new(5), ExprId::new(1), ExprId::new(3)];
    ids.sort();
    assert_eq!(ids, vec![ExprId::new(1), ExprId::new(3), ExprId::new(5)]);
}
