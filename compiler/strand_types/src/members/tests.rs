use pretty_assertions::assert_eq;
use strand_ir::{ExprId, ProgramBuilder, TypeDeclId};

use super::*;
use crate::{build_type_model, TypeProblem};

fn decl_idx(model: &TypeModel, decl: TypeDeclId) -> Idx {
    model.decl_type(decl).unwrap_or(Idx::NONE)
}

fn pointer_to(model: &TypeModel, elem: Idx) -> Idx {
    model
        .pool()
        .iter()
        .find(|(_, data)| **data == TypeData::Pointer(elem))
        .map_or(Idx::NONE, |(idx, _)| idx)
}

/// `type Inner struct{ X int }` with value method `M`, embedded in
/// `type Outer struct{ Inner; Y string }`. Returns the selector `o.M` on a
/// local `o Outer`.
struct Embedding {
    inner: TypeDeclId,
    outer: TypeDeclId,
    m: FuncId,
    selector: ExprId,
}

fn embedding(b: &mut ProgramBuilder) -> Embedding {
    let int = b.int();
    let string = b.string();
    let inner_body = b.struct_type(&[("X", int)]);
    let inner = b.type_decl("Inner", inner_body);
    let m = b.method(inner, false, "M", &[], &[]);
    let inner_ty = b.named(inner);
    let embed = b.field("Inner", inner_ty, true);
    let y = b.field("Y", string, false);
    let outer_body = b.struct_type_with(vec![embed, y]);
    let outer = b.type_decl("Outer", outer_body);
    let outer_ty = b.named(outer);

    let main = b.func("main", &[], &[]);
    let o = b.local(main, "o", outer_ty);
    let o_ref = b.ident(o);
    let selector = b.method_value(o_ref, m);
    let call = b.call(selector, vec![]);
    let stmt = b.expr_stmt(call);
    b.set_body(main, vec![stmt]);
    Embedding {
        inner,
        outer,
        m,
        selector,
    }
}

#[test]
fn promoted_method_resolves_through_embedded_field() {
    let mut b = ProgramBuilder::new();
    let e = embedding(&mut b);
    let inner_name = b.name("Inner");
    let program = b.finish();
    let model = build_type_model(&program).expect("model builds");

    let sel = model.selection(e.selector).expect("selector resolved");
    assert!(!sel.indirect);
    assert_eq!(sel.member.depth(), 1);
    assert_eq!(sel.member.path[0].field, inner_name);
    assert!(!sel.member.path[0].pointer);
    assert!(matches!(
        sel.member.kind,
        MemberKind::Method { func, pointer_receiver: false, .. } if func == e.m
    ));

    // The embedded field itself is a depth-0 member.
    let outer = decl_idx(&model, e.outer);
    match model.members_of(outer).lookup(inner_name) {
        Some(MemberLookup::Found(member)) => {
            assert_eq!(member.depth(), 0);
            assert!(matches!(member.kind, MemberKind::Field { .. }));
        }
        other => panic!("expected field, got {other:?}"),
    }

    // Promoted value method is in both method sets of Outer.
    assert!(model.method_set(outer).get(sel.member.name).is_some());
    let inner = decl_idx(&model, e.inner);
    assert!(model.method_set(inner).get(sel.member.name).is_some());
}

#[test]
fn shallower_member_shadows_deeper() {
    let mut b = ProgramBuilder::new();
    let int = b.int();
    let string = b.string();
    let inner_body = b.struct_type(&[("X", int)]);
    let inner = b.type_decl("Inner", inner_body);
    let inner_ty = b.named(inner);
    let embed = b.field("Inner", inner_ty, true);
    let x = b.field("X", string, false);
    let outer_body = b.struct_type_with(vec![embed, x]);
    let outer = b.type_decl("Outer", outer_body);
    let x_name = b.name("X");
    let program = b.finish();
    let model = build_type_model(&program).expect("model builds");

    let outer = decl_idx(&model, outer);
    match model.members_of(outer).lookup(x_name) {
        Some(MemberLookup::Found(member)) => {
            assert_eq!(member.depth(), 0);
            assert!(matches!(member.kind, MemberKind::Field { ty, .. } if ty == Idx::STRING));
        }
        other => panic!("expected outer field, got {other:?}"),
    }
}

/// `A` and `B` both declare `M`; `C` embeds both.
fn colliding(b: &mut ProgramBuilder) -> (TypeDeclId, TypeDeclId) {
    let empty = b.struct_type(&[]);
    let a = b.type_decl("A", empty);
    let bb = b.type_decl("B", empty);
    b.method(a, false, "M", &[], &[]);
    b.method(bb, false, "M", &[], &[]);
    let a_ty = b.named(a);
    let b_ty = b.named(bb);
    let fa = b.field("A", a_ty, true);
    let fb = b.field("B", b_ty, true);
    let body = b.struct_type_with(vec![fa, fb]);
    let c = b.type_decl("C", body);

    let spec = b.method_spec("M", strand_ir::Signature::default());
    let iface_body = b.interface_type(vec![spec], Vec::new());
    let iface = b.type_decl("Mer", iface_body);
    (c, iface)
}

#[test]
fn equal_depth_collision_is_excluded_from_method_set() {
    let mut b = ProgramBuilder::new();
    let (c, iface) = colliding(&mut b);
    let m = b.name("M");
    let program = b.finish();
    let model = build_type_model(&program).expect("unselected collision is not an error");

    let c = decl_idx(&model, c);
    match model.members_of(c).lookup(m) {
        Some(MemberLookup::Ambiguous { depth, candidates }) => {
            assert_eq!(*depth, 1);
            assert_eq!(candidates.len(), 2);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
    assert!(model.method_set(c).get(m).is_none());
    assert!(!model.implements(c, decl_idx(&model, iface)));
}

#[test]
fn selecting_ambiguous_member_fails() {
    let mut b = ProgramBuilder::new();
    let (c, _) = colliding(&mut b);
    let c_ty = b.named(c);
    let main = b.func("main", &[], &[]);
    let local = b.local(main, "c", c_ty);
    let c_ref = b.ident(local);
    let sig = b.func_type(Vec::new(), Vec::new());
    let sel = b.selector(c_ref, "M", sig);
    let stmt = b.expr_stmt(sel);
    b.set_body(main, vec![stmt]);
    let program = b.finish();

    let problems = build_type_model(&program).expect_err("ambiguous selector");
    assert_eq!(problems.len(), 1);
    match &problems[0] {
        TypeProblem::AmbiguousPromotion {
            member,
            depth,
            candidates,
            ..
        } => {
            assert_eq!(member, "M");
            assert_eq!(*depth, 1);
            assert_eq!(candidates.len(), 2);
        }
        other => panic!("unexpected problem {other:?}"),
    }
    assert_eq!(problems[0].code(), strand_diagnostic::ErrorCode::E1003);
}

#[test]
fn pointer_receiver_methods_need_an_address() {
    let mut b = ProgramBuilder::new();
    let empty = b.struct_type(&[]);
    let t = b.type_decl("T", empty);
    b.method(t, true, "P", &[], &[]);
    b.method(t, false, "V", &[], &[]);
    let t_ty = b.named(t);
    let t_ptr = b.pointer(t_ty);
    let embed = b.field("T", t_ptr, true);
    let body = b.struct_type_with(vec![embed]);
    let w = b.type_decl("W", body);
    let p = b.name("P");
    let v = b.name("V");
    let program = b.finish();
    let model = build_type_model(&program).expect("model builds");

    let t = decl_idx(&model, t);
    let value_set = model.method_set(t);
    assert!(value_set.get(p).is_none());
    assert!(value_set.get(v).is_some());

    let ptr_set = model.method_set(pointer_to(&model, t));
    assert_eq!(ptr_set.len(), 2);

    // Embedding *T promotes pointer methods into W's value method set.
    let w = decl_idx(&model, w);
    let w_set = model.method_set(w);
    let promoted = w_set.get(p).expect("promoted through pointer");
    assert!(promoted.through_pointer());
    assert!(w_set.get(v).is_some());
}

#[test]
fn selector_on_pointer_is_indirect() {
    let mut b = ProgramBuilder::new();
    let int = b.int();
    let body = b.struct_type(&[("X", int)]);
    let s = b.type_decl("S", body);
    let s_ty = b.named(s);
    let s_ptr = b.pointer(s_ty);
    let main = b.func("main", &[], &[]);
    let p = b.local(main, "p", s_ptr);
    let p_ref = b.ident(p);
    let field = b.selector(p_ref, "X", int);
    let stmt = b.expr_stmt(field);
    b.set_body(main, vec![stmt]);
    let program = b.finish();
    let model = build_type_model(&program).expect("model builds");

    let sel = model.selection(field).expect("resolved");
    assert!(sel.indirect);
    assert_eq!(sel.member.depth(), 0);
    assert!(matches!(sel.member.kind, MemberKind::Field { ty, .. } if ty == Idx::INT));
}

#[test]
fn unknown_member_is_reported() {
    let mut b = ProgramBuilder::new();
    let int = b.int();
    let body = b.struct_type(&[("X", int)]);
    let s = b.type_decl("S", body);
    let s_ty = b.named(s);
    let main = b.func("main", &[], &[]);
    let local = b.local(main, "s", s_ty);
    let s_ref = b.ident(local);
    let field = b.selector(s_ref, "Nope", int);
    let stmt = b.expr_stmt(field);
    b.set_body(main, vec![stmt]);
    let program = b.finish();

    let problems = build_type_model(&program).expect_err("unknown member");
    assert_eq!(
        problems,
        vec![TypeProblem::UnresolvedMember {
            span: program.expr(field).span,
            member: "Nope".to_owned(),
            ty: "main.S".to_owned(),
        }]
    );
}
