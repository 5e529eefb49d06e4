//! End-to-end runs of the whole pipeline over small programs.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use strand_diagnostic::{ErrorCode, Pass};
use strand_ir::{ChanDir, FuncId, Program, ProgramBuilder, Signature, Span, TypeDeclId};
use strand_types::{AssertionOutcome, AssertionSite, Idx, MemberKind};
use strandc::{compile, reporting, AnnotatedProgram, CompileError, CompilerConfig};

fn compiled(program: &Program) -> AnnotatedProgram<'_> {
    compile(program, &CompilerConfig::default()).expect("program compiles")
}

fn rejected(program: &Program) -> CompileError {
    compile(program, &CompilerConfig::default()).expect_err("program is rejected")
}

fn decl_idx(annotated: &AnnotatedProgram<'_>, decl: TypeDeclId) -> Idx {
    annotated.model().decl_type(decl).unwrap_or(Idx::NONE)
}

#[test]
fn pointer_to_pointer_boxes_the_inner_links() {
    // var x int; p := &x; p2 := &p
    let mut b = ProgramBuilder::new();
    let int = b.int();
    let main = b.func("main", &[], &[]);
    let x = b.local(main, "x", int);
    let decl_x = b.var_decl(vec![x], vec![]);
    let x_ref = b.ident(x);
    let addr = b.address_of(x_ref);
    let (p, decl_p) = b.define(main, "p", addr);
    let p_ref = b.ident(p);
    let addr = b.address_of(p_ref);
    let (p2, decl_p2) = b.define(main, "p2", addr);
    b.set_body(main, vec![decl_x, decl_p, decl_p2]);
    let program = b.finish();

    let annotated = compiled(&program);
    assert!(annotated.is_boxed(x));
    assert!(annotated.is_boxed(p));
    assert!(!annotated.is_boxed(p2));
    let info = annotated.symbol(x);
    assert!(info.address_taken);
    assert_eq!(info.alias_of, None);
    assert_eq!(info.ty, annotated.model().symbol_type(x));
}

#[test]
fn receiving_makes_the_function_and_its_callers_async() {
    // var ch chan int
    // func recvOne() int { return <-ch }
    // func caller() int { return recvOne() }
    // func sibling() int { return 1 }
    let mut b = ProgramBuilder::new();
    let int = b.int();
    let chan = b.chan(int, ChanDir::Both);
    let ch = b.global("ch", chan, None);
    let recv_one = b.func("recvOne", &[], &[int]);
    let ch_ref = b.ident(ch);
    let recv = b.recv(ch_ref);
    let ret = b.ret(vec![recv]);
    b.set_body(recv_one, vec![ret]);
    let caller = b.func("caller", &[], &[int]);
    let call = b.call_func(recv_one, vec![]);
    let ret = b.ret(vec![call]);
    b.set_body(caller, vec![ret]);
    let sibling = b.func("sibling", &[], &[int]);
    let one = b.int_lit(1);
    let ret = b.ret(vec![one]);
    b.set_body(sibling, vec![ret]);
    let program = b.finish();

    let annotated = compiled(&program);
    assert!(annotated.is_async(recv_one));
    assert!(annotated.is_async(caller));
    assert!(!annotated.is_async(sibling));
    assert!(annotated.func_async(recv_one).directly_blocking);
    assert!(!annotated.func_async(caller).directly_blocking);
    let funcs: Vec<FuncId> = annotated.suspension_points().iter().map(|p| p.func).collect();
    assert_eq!(funcs, vec![recv_one, caller]);
    assert_eq!(annotated.summary().async_funcs, 2);
}

#[test]
fn assertions_and_satisfaction_are_precomputed() {
    // type A struct{}; func (A) M() int
    // type B struct{}; func (B) M() int
    // type I interface{ M() int }; type J interface{ M() string }
    // var v any; _ = v.(I); _ = v.(J)
    let mut b = ProgramBuilder::new();
    let int = b.int();
    let string = b.string();
    let empty = b.struct_type(&[]);
    let a = b.type_decl("A", empty);
    b.method(a, false, "M", &[], &[int]);
    let bb = b.type_decl("B", empty);
    b.method(bb, false, "M", &[], &[int]);
    let m_int = b.method_spec(
        "M",
        Signature {
            params: Vec::new(),
            results: vec![int],
            variadic: false,
        },
    );
    let i_body = b.interface_type(vec![m_int], Vec::new());
    let i = b.type_decl("I", i_body);
    let m_string = b.method_spec(
        "M",
        Signature {
            params: Vec::new(),
            results: vec![string],
            variadic: false,
        },
    );
    let j_body = b.interface_type(vec![m_string], Vec::new());
    let j = b.type_decl("J", j_body);

    let any = b.interface_type(Vec::new(), Vec::new());
    let i_ty = b.named(i);
    let j_ty = b.named(j);
    let main = b.func("main", &[], &[]);
    let v = b.local(main, "v", any);
    let decl_v = b.var_decl(vec![v], vec![]);
    let v_ref = b.ident(v);
    let to_i = b.type_assert(v_ref, i_ty, false);
    let v_ref = b.ident(v);
    let to_j = b.type_assert(v_ref, j_ty, false);
    let stmts = [to_i, to_j].map(|e| b.expr_stmt(e));
    b.set_body(main, [vec![decl_v], stmts.to_vec()].concat());
    let program = b.finish();

    let annotated = compiled(&program);
    let (a, bb, i, j) = (
        decl_idx(&annotated, a),
        decl_idx(&annotated, bb),
        decl_idx(&annotated, i),
        decl_idx(&annotated, j),
    );
    match annotated.assertion(AssertionSite::Expr(to_i)) {
        Some(AssertionOutcome::Dynamic { candidates }) => {
            assert!(candidates.contains(&a));
            assert!(candidates.contains(&bb));
        }
        other => panic!("expected a dynamic outcome, got {other:?}"),
    }
    assert_eq!(
        annotated.assertion(AssertionSite::Expr(to_j)),
        Some(&AssertionOutcome::AlwaysFails)
    );
    assert!(annotated.satisfaction().satisfies(a, i));
    assert!(!annotated.satisfaction().satisfies(a, j));
    assert!(annotated.satisfaction().implementors(j).is_empty());
}

#[test]
fn struct_copies_are_marked_without_boxing() {
    // type S struct{ V int }
    // a := S{V: 1}; b := a; b.V = 2; c := b
    let mut bld = ProgramBuilder::new();
    let int = bld.int();
    let body = bld.struct_type(&[("V", int)]);
    let s = bld.type_decl("S", body);
    let s_ty = bld.named(s);
    let main = bld.func("main", &[], &[]);
    let one = bld.int_lit(1);
    let lit = bld.composite(s_ty, &[(Some("V"), one)]);
    let (a, decl_a) = bld.define(main, "a", lit);
    let a_ref = bld.ident(a);
    let (b, decl_b) = bld.define(main, "b", a_ref);
    let b_ref = bld.ident(b);
    let field = bld.selector(b_ref, "V", int);
    let two = bld.int_lit(2);
    let store = bld.assign(vec![field], vec![two]);
    // Copying the copy is again a plain value copy.
    let b_again = bld.ident(b);
    let (_, decl_c) = bld.define(main, "c", b_again);
    bld.set_body(main, vec![decl_a, decl_b, store, decl_c]);
    let program = bld.finish();

    let annotated = compiled(&program);
    let copy = annotated.copy_point(a_ref).expect("`b := a` copies");
    assert!(!copy.into_cell);
    assert_eq!(copy.ty, annotated.expr_type(a_ref));
    let again = annotated.copy_point(b_again).expect("`c := b` copies");
    assert_eq!(*again, strand_escape::CopyPoint { value: b_again, ..*copy });
    assert!(annotated.copy_point(lit).is_none());
    assert!(!annotated.is_boxed(a));
    assert!(!annotated.is_boxed(b));
    assert_eq!(annotated.summary().copy_points, 2);
}

#[test]
fn promoted_methods_resolve_and_ambiguity_is_rejected() {
    // type Inner struct{}; func (Inner) F()
    // type Outer struct{ Inner }; var outer Outer; outer.F()
    let mut b = ProgramBuilder::new();
    let empty = b.struct_type(&[]);
    let inner = b.type_decl("Inner", empty);
    let inner_f = b.method(inner, false, "F", &[], &[]);
    let inner_ty = b.named(inner);
    let embed = b.field("Inner", inner_ty, true);
    let outer_body = b.struct_type_with(vec![embed]);
    let outer = b.type_decl("Outer", outer_body);
    let outer_ty = b.named(outer);
    let main = b.func("main", &[], &[]);
    let o = b.local(main, "outer", outer_ty);
    let o_ref = b.ident(o);
    let selector = b.method_value(o_ref, inner_f);
    let call = b.call(selector, vec![]);
    let stmt = b.expr_stmt(call);
    b.set_body(main, vec![stmt]);
    let program = b.finish();

    let annotated = compiled(&program);
    let selection = annotated.selection(selector).expect("selector resolved");
    assert_eq!(selection.member.depth(), 1);
    assert!(matches!(
        selection.member.kind,
        MemberKind::Method { func, .. } if func == inner_f
    ));

    // type A struct{}; type B struct{} both with G(); Outer2 embeds both; o.G
    let mut b = ProgramBuilder::new();
    let file = b.add_file("main.go", "package main\n\nfunc main() { o.G() }\n");
    let empty = b.struct_type(&[]);
    let a = b.type_decl("A", empty);
    let bb = b.type_decl("B", empty);
    b.method(a, false, "G", &[], &[]);
    b.method(bb, false, "G", &[], &[]);
    let a_ty = b.named(a);
    let b_ty = b.named(bb);
    let fa = b.field("A", a_ty, true);
    let fb = b.field("B", b_ty, true);
    let body = b.struct_type_with(vec![fa, fb]);
    let outer2 = b.type_decl("Outer2", body);
    let outer2_ty = b.named(outer2);
    let main = b.func("main", &[], &[]);
    let o = b.local(main, "o", outer2_ty);
    // `o.G` starts at byte 28, line 3 column 15.
    b.at(Span::new(file, 28, 31));
    let o_ref = b.ident(o);
    let sig = b.func_type(Vec::new(), Vec::new());
    let sel = b.selector(o_ref, "G", sig);
    b.at(Span::DUMMY);
    let stmt = b.expr_stmt(sel);
    b.set_body(main, vec![stmt]);
    let program = b.finish();

    let err = rejected(&program);
    assert_eq!(err.error_count, 1);
    let diag = &err.diagnostics[0];
    assert_eq!(diag.code, ErrorCode::E1003);
    assert_eq!(diag.pass, Some(Pass::TypeModel));
    let rendered = reporting::render_plain(program.sources(), &err.diagnostics);
    assert!(rendered.starts_with("error[E1003]: ambiguous selector `G`"), "{rendered}");
    assert!(rendered.contains("--> main.go:3:15: ambiguous selector"), "{rendered}");
}

#[test]
fn boxing_and_async_problems_are_reported_together() {
    // func make() int; func wait()
    // func main() { _ = &make(); go wait }
    let mut b = ProgramBuilder::new();
    let int = b.int();
    let make = b.func("make", &[], &[int]);
    let wait = b.func("wait", &[], &[]);
    let main = b.func("main", &[], &[]);
    let call = b.call_func(make, vec![]);
    let addr = b.address_of(call);
    let take = b.expr_stmt(addr);
    let value = b.func_ref(wait);
    let go = b.go(value);
    b.set_body(main, vec![take, go]);
    let program = b.finish();

    for parallel in [true, false] {
        let config = CompilerConfig::default().with_parallel(parallel);
        let err = compile(&program, &config).expect_err("program is rejected");
        let mut codes: Vec<ErrorCode> = err.diagnostics.iter().map(|d| d.code).collect();
        codes.sort();
        assert_eq!(codes, vec![ErrorCode::E2001, ErrorCode::E3001]);
        assert_eq!(err.error_count, 2);
        assert_eq!(err.to_string(), "compilation failed with 2 error(s)");
    }
}

#[test]
fn allowlisted_functions_stay_synchronous() {
    // var ch chan int; func drain() { <-ch }; func main() { drain() }
    let mut b = ProgramBuilder::new();
    let int = b.int();
    let chan = b.chan(int, ChanDir::Both);
    let ch = b.global("ch", chan, None);
    let drain = b.func("drain", &[], &[]);
    let ch_ref = b.ident(ch);
    let recv = b.recv(ch_ref);
    let body = b.expr_stmt(recv);
    b.set_body(drain, vec![body]);
    let main = b.func("main", &[], &[]);
    let call = b.call_func(drain, vec![]);
    let body = b.expr_stmt(call);
    b.set_body(main, vec![body]);
    let program = b.finish();

    let config = CompilerConfig::default().with_sync("main.drain");
    let annotated = compile(&program, &config).expect("program compiles");
    assert!(!annotated.is_async(drain));
    assert!(!annotated.is_async(main));
    assert!(annotated.suspension_points().is_empty());
}

/// `n` functions in a row, each calling the next; the last one receives when
/// `blocks`. `depth` pointer links hang off a local in `main`.
fn chain_program(n: usize, blocks: bool, depth: usize) -> Program {
    let mut b = ProgramBuilder::new();
    let int = b.int();
    let chan = b.chan(int, ChanDir::Both);
    let ch = b.global("ch", chan, None);
    let funcs: Vec<FuncId> = (0..n).map(|i| b.func(&format!("f{i}"), &[], &[])).collect();
    for (i, &func) in funcs.iter().enumerate() {
        let stmt = match funcs.get(i + 1) {
            Some(&next) => {
                let call = b.call_func(next, vec![]);
                b.expr_stmt(call)
            }
            None if blocks => {
                let ch_ref = b.ident(ch);
                let recv = b.recv(ch_ref);
                b.expr_stmt(recv)
            }
            None => {
                let one = b.int_lit(1);
                b.expr_stmt(one)
            }
        };
        b.set_body(func, vec![stmt]);
    }

    let main = b.func("main", &[], &[]);
    let x = b.local(main, "x", int);
    let mut stmts = vec![b.var_decl(vec![x], vec![])];
    let mut prev = x;
    for i in 0..depth {
        let prev_ref = b.ident(prev);
        let addr = b.address_of(prev_ref);
        let (p, decl) = b.define(main, &format!("p{i}"), addr);
        stmts.push(decl);
        prev = p;
    }
    if let Some(&first) = funcs.first() {
        let call = b.call_func(first, vec![]);
        stmts.push(b.expr_stmt(call));
    }
    b.set_body(main, stmts);
    b.finish()
}

proptest! {
    #[test]
    fn parallel_and_sequential_runs_agree(n in 1usize..6, blocks in any::<bool>(), depth in 0usize..5) {
        let program = chain_program(n, blocks, depth);
        let parallel = compile(&program, &CompilerConfig::default().with_parallel(true))
            .expect("program compiles");
        let sequential = compile(&program, &CompilerConfig::default().with_parallel(false))
            .expect("program compiles");

        prop_assert_eq!(parallel.summary(), sequential.summary());
        let expected_async = if blocks { n + 1 } else { 0 };
        prop_assert_eq!(parallel.summary().async_funcs, expected_async);
        // Every link but the outermost pointer is boxed once there are two.
        let expected_boxed = if depth >= 2 { depth } else { 0 };
        prop_assert_eq!(parallel.summary().boxed, expected_boxed);
    }
}
