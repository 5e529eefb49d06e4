use pretty_assertions::assert_eq;
use strand_ir::{ExprId, FuncId, ProgramBuilder, Signature, TypeDeclId};

use super::*;
use crate::{build_type_model, AssertionSite, MemberKind};

struct Shapes {
    shape: TypeDeclId,
    namer: TypeDeclId,
    square: TypeDeclId,
    circle: TypeDeclId,
    square_area: FuncId,
    to_square: ExprId,
    to_circle: ExprId,
    any_to_shape: ExprId,
    shape_to_namer: ExprId,
}

/// `Shape{Area() int}` implemented by `Square` (value receiver). `Circle`
/// has `Area() string` and does not implement it. `Namer{Name() string}`
/// has no implementations.
fn shapes(b: &mut ProgramBuilder, namer_open: bool) -> Shapes {
    let int = b.int();
    let string = b.string();
    let area_sig = Signature {
        params: Vec::new(),
        results: vec![int],
        variadic: false,
    };
    let area = b.method_spec("Area", area_sig);
    let shape_body = b.interface_type(vec![area], Vec::new());
    let shape = b.type_decl("Shape", shape_body);
    let name_sig = Signature {
        params: Vec::new(),
        results: vec![string],
        variadic: false,
    };
    let name = b.method_spec("Name", name_sig);
    let namer_body = b.interface_type(vec![name], Vec::new());
    let namer = b.type_decl("Namer", namer_body);
    b.decl_mut(namer).open = namer_open;

    let empty = b.struct_type(&[]);
    let square = b.type_decl("Square", empty);
    let square_area = b.method(square, false, "Area", &[], &[int]);
    let circle = b.type_decl("Circle", empty);
    b.method(circle, false, "Area", &[], &[string]);

    let shape_ty = b.named(shape);
    let namer_ty = b.named(namer);
    let square_ty = b.named(square);
    let circle_ty = b.named(circle);
    let any = b.interface_type(Vec::new(), Vec::new());

    let main = b.func("main", &[], &[]);
    let s = b.local(main, "s", shape_ty);
    let a = b.local(main, "a", any);
    let s1 = b.ident(s);
    let to_square = b.type_assert(s1, square_ty, false);
    let s2 = b.ident(s);
    let to_circle = b.type_assert(s2, circle_ty, true);
    let a1 = b.ident(a);
    let any_to_shape = b.type_assert(a1, shape_ty, false);
    let s3 = b.ident(s);
    let shape_to_namer = b.type_assert(s3, namer_ty, false);
    let stmts = [to_square, to_circle, any_to_shape, shape_to_namer].map(|e| b.expr_stmt(e));
    b.set_body(main, stmts.to_vec());

    Shapes {
        shape,
        namer,
        square,
        circle,
        square_area,
        to_square,
        to_circle,
        any_to_shape,
        shape_to_namer,
    }
}

fn decl_idx(model: &TypeModel, decl: TypeDeclId) -> Idx {
    model.decl_type(decl).unwrap_or(Idx::NONE)
}

#[test]
fn satisfaction_matches_full_signatures() {
    let mut b = ProgramBuilder::new();
    let s = shapes(&mut b, false);
    let area = b.name("Area");
    let program = b.finish();
    let model = build_type_model(&program).expect("model builds");

    let shape = decl_idx(&model, s.shape);
    let square = decl_idx(&model, s.square);
    let circle = decl_idx(&model, s.circle);

    let entry = model.satisfaction().get(square, shape).expect("entry for Square");
    assert!(entry.satisfied);
    assert_eq!(entry.thunks.len(), 1);
    assert!(matches!(entry.thunks[0].kind, MemberKind::Method { func, .. } if func == s.square_area));

    // Same name, different result type.
    let entry = model.satisfaction().get(circle, shape).expect("entry for Circle");
    assert!(!entry.satisfied);
    assert_eq!(entry.missing, vec![area]);

    // Value methods are in the pointer's method set too.
    let implementors = model.satisfaction().implementors(shape);
    assert_eq!(implementors.len(), 2);
    assert!(implementors.contains(&square));
    assert!(model.implements(square, shape));
}

#[test]
fn interface_calls_dispatch_to_every_implementation() {
    let mut b = ProgramBuilder::new();
    let s = shapes(&mut b, false);
    let area = b.name("Area");
    let program = b.finish();
    let model = build_type_model(&program).expect("model builds");

    let shape = decl_idx(&model, s.shape);
    assert_eq!(model.method_targets(shape, area), vec![s.square_area]);
    let namer = decl_idx(&model, s.namer);
    assert!(model.method_targets(namer, area).is_empty());
}

#[test]
fn assertion_outcomes_are_decided_statically_where_possible() {
    let mut b = ProgramBuilder::new();
    let s = shapes(&mut b, false);
    let program = b.finish();
    let model = build_type_model(&program).expect("model builds");

    let square = decl_idx(&model, s.square);
    assert_eq!(
        model.assertion(AssertionSite::Expr(s.to_square)),
        Some(&AssertionOutcome::Dynamic {
            candidates: vec![square]
        })
    );
    assert_eq!(
        model.assertion(AssertionSite::Expr(s.to_circle)),
        Some(&AssertionOutcome::AlwaysFails)
    );
    match model.assertion(AssertionSite::Expr(s.any_to_shape)) {
        Some(AssertionOutcome::Dynamic { candidates }) => assert!(candidates.contains(&square)),
        other => panic!("expected dynamic outcome, got {other:?}"),
    }
    // Closed interface without implementations.
    assert_eq!(
        model.assertion(AssertionSite::Expr(s.shape_to_namer)),
        Some(&AssertionOutcome::AlwaysFails)
    );
}

#[test]
fn open_interfaces_keep_assertions_dynamic() {
    let mut b = ProgramBuilder::new();
    let s = shapes(&mut b, true);
    let program = b.finish();
    let model = build_type_model(&program).expect("model builds");

    assert!(model.is_open_interface(decl_idx(&model, s.namer)));
    assert_eq!(
        model.assertion(AssertionSite::Expr(s.shape_to_namer)),
        Some(&AssertionOutcome::Dynamic {
            candidates: Vec::new()
        })
    );
}

#[test]
fn interface_to_wider_interface_always_succeeds() {
    let mut b = ProgramBuilder::new();
    let s = shapes(&mut b, false);
    let program = b.finish();
    let model = build_type_model(&program).expect("model builds");

    let shape = decl_idx(&model, s.shape);
    let any = model
        .pool()
        .iter()
        .find(|(_, d)| matches!(d, crate::TypeData::Interface(i) if i.methods.is_empty() && i.terms.is_empty()))
        .map(|(idx, _)| idx)
        .expect("any is interned");
    assert_eq!(model.assertion_outcome(shape, any), AssertionOutcome::AlwaysSucceeds);
    assert_eq!(model.assertion_outcome(shape, Idx::NIL), AssertionOutcome::Dynamic { candidates: Vec::new() });
    assert_eq!(model.assertion_outcome(Idx::INT, Idx::INT), AssertionOutcome::AlwaysSucceeds);
}
