use pretty_assertions::assert_eq;
use proptest::prelude::*;
use strand_diagnostic::ErrorCode;
use strand_ir::{ChanDir, CommClause, ExprId, FuncId, Program, ProgramBuilder, Signature, StmtId, TypeDeclId};
use strand_types::build_type_model;

use super::*;
use crate::CallKind;

fn analyze_with(program: &Program, config: &AsyncConfig) -> AsyncResult {
    let model = build_type_model(program).expect("model builds");
    analyze_async(program, &model, config).expect("async analysis succeeds")
}

fn analyze(program: &Program) -> AsyncResult {
    analyze_with(program, &AsyncConfig::empty())
}

/// `<-ch` on a fresh global `ch chan int`.
fn recv_global(b: &mut ProgramBuilder) -> ExprId {
    let int = b.int();
    let chan = b.chan(int, ChanDir::Both);
    let ch = b.global("ch", chan, None);
    let ch_ref = b.ident(ch);
    b.recv(ch_ref)
}

/// `func name() { <-ch }`
fn blocker(b: &mut ProgramBuilder, name: &str) -> (FuncId, ExprId) {
    let f = b.func(name, &[], &[]);
    let recv = recv_global(b);
    let stmt = b.expr_stmt(recv);
    b.set_body(f, vec![stmt]);
    (f, recv)
}

/// `func name() { callee() }`
fn calling(b: &mut ProgramBuilder, name: &str, callee: FuncId) -> (FuncId, ExprId) {
    let f = b.func(name, &[], &[]);
    let call = b.call_func(callee, vec![]);
    let stmt = b.expr_stmt(call);
    b.set_body(f, vec![stmt]);
    (f, call)
}

#[test]
fn blocking_spreads_to_callers_only() {
    let mut b = ProgramBuilder::new();
    let (wait, recv) = blocker(&mut b, "wait");
    let (run, call) = calling(&mut b, "run", wait);
    let idle = b.func("idle", &[], &[]);
    let one = b.int_lit(1);
    let (_, decl) = b.define(idle, "x", one);
    b.set_body(idle, vec![decl]);
    let program = b.finish();

    let result = analyze(&program);
    assert_eq!(result.async_funcs(), vec![wait, run]);
    assert_eq!(
        result.func(wait),
        FuncAsync {
            is_async: true,
            directly_blocking: true,
            allowlisted: false,
            reason: Some(AsyncReason::Blocking(SuspendSite::Expr(recv))),
        }
    );
    assert_eq!(
        result.func(run).reason,
        Some(AsyncReason::Calls { callee: wait, site: call })
    );
    assert!(!result.func(run).directly_blocking);
    assert!(!result.is_async(idle));
    assert_eq!(
        result.suspension_points(),
        &[
            SuspensionPoint {
                func: wait,
                site: SuspendSite::Expr(recv),
                kind: SuspendKind::Recv,
            },
            SuspensionPoint {
                func: run,
                site: SuspendSite::Expr(call),
                kind: SuspendKind::Call,
            },
        ]
    );
}

#[test]
fn select_blocks_unless_it_has_a_default() {
    let mut b = ProgramBuilder::new();
    let polling = b.func("polling", &[], &[]);
    let recv = recv_global(&mut b);
    let case = ProgramBuilder::select_case(
        CommClause::Recv {
            recv,
            bind: vec![],
            assign: vec![],
        },
        vec![],
    );
    let default = ProgramBuilder::select_case(CommClause::Default, vec![]);
    let select = b.select(vec![case, default]);
    b.set_body(polling, vec![select]);

    let waiting = b.func("waiting", &[], &[]);
    let recv = recv_global(&mut b);
    let case = ProgramBuilder::select_case(
        CommClause::Recv {
            recv,
            bind: vec![],
            assign: vec![],
        },
        vec![],
    );
    let select = b.select(vec![case]);
    b.set_body(waiting, vec![select]);
    let program = b.finish();

    let result = analyze(&program);
    assert!(!result.is_async(polling));
    assert!(result.is_async(waiting));
    // The case's receive is part of the select, not a suspension of its own.
    assert_eq!(
        result.suspension_points(),
        &[SuspensionPoint {
            func: waiting,
            site: SuspendSite::Stmt(select),
            kind: SuspendKind::Select,
        }]
    );
}

#[test]
fn send_and_channel_range_block() {
    let mut b = ProgramBuilder::new();
    let int = b.int();
    let chan = b.chan(int, ChanDir::Both);
    let producer = b.func("producer", &[("ch", chan)], &[]);
    let ch = b.params(producer)[0];
    let ch_ref = b.ident(ch);
    let one = b.int_lit(1);
    let send = b.send(ch_ref, one);
    b.set_body(producer, vec![send]);

    let consumer = b.func("consumer", &[("ch", chan)], &[]);
    let ch = b.params(consumer)[0];
    let v = b.local(consumer, "v", int);
    let ch_ref = b.ident(ch);
    let range = b.range(ch_ref, vec![v], vec![]);
    b.set_body(consumer, vec![range]);
    let program = b.finish();

    let result = analyze(&program);
    assert!(result.func(producer).directly_blocking);
    assert!(result.func(consumer).directly_blocking);
    let kinds: Vec<SuspendKind> = result.suspension_points().iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![SuspendKind::Send, SuspendKind::RangeChan]);
    assert!(result.is_suspension(SuspendSite::Stmt(send)));
}

#[test]
fn go_does_not_spread_but_defer_does() {
    let mut b = ProgramBuilder::new();
    let (wait, _) = blocker(&mut b, "wait");

    let spawner = b.func("spawner", &[], &[]);
    let spawned = b.call_func(wait, vec![]);
    let go = b.go(spawned);
    b.set_body(spawner, vec![go]);

    let deferrer = b.func("deferrer", &[], &[]);
    let deferred = b.call_func(wait, vec![]);
    let defer = b.defer(deferred);
    b.set_body(deferrer, vec![defer]);
    let program = b.finish();

    let result = analyze(&program);
    assert!(!result.is_async(spawner));
    assert!(result.is_async(deferrer));

    let edge = result.call_graph().edges_at(spawned).next().expect("go edge recorded");
    assert_eq!(edge.context, CallContext::Spawned);
    assert!(!result.is_suspension(SuspendSite::Expr(spawned)));
    assert_eq!(
        result.suspension_at(SuspendSite::Expr(deferred)).map(|p| p.kind),
        Some(SuspendKind::DeferredCall)
    );
}

#[test]
fn configured_primitives_block() {
    let mut b = ProgramBuilder::new();
    let int = b.int();
    b.package("time");
    let sleep = b.func("Sleep", &[("d", int)], &[]);
    b.package("main");
    let nap = b.func("nap", &[], &[]);
    let one = b.int_lit(1);
    let call = b.call_func(sleep, vec![one]);
    let stmt = b.expr_stmt(call);
    b.set_body(nap, vec![stmt]);
    let program = b.finish();

    let result = analyze(&program);
    assert!(!result.is_async(sleep));

    let result = analyze_with(&program, &AsyncConfig::default());
    assert_eq!(result.func(sleep).reason, Some(AsyncReason::Primitive));
    let info = result.func(nap);
    assert!(info.is_async);
    assert!(info.directly_blocking);
    assert_eq!(info.reason, Some(AsyncReason::Calls { callee: sleep, site: call }));
}

#[test]
fn pointer_receiver_primitives_match_by_qualified_name() {
    let mut b = ProgramBuilder::new();
    b.package("sync");
    let fields = b.struct_type(&[]);
    let mutex = b.type_decl("Mutex", fields);
    let lock = b.method(mutex, true, "Lock", &[], &[]);
    b.package("main");
    let mutex_ty = b.named(mutex);
    let guarded = b.func("guarded", &[], &[]);
    let m = b.local(guarded, "m", mutex_ty);
    let decl = b.var_decl(vec![m], vec![]);
    let m_ref = b.ident(m);
    let call = b.method_call(m_ref, lock, vec![]);
    let stmt = b.expr_stmt(call);
    b.set_body(guarded, vec![decl, stmt]);
    let program = b.finish();

    let result = analyze_with(&program, &AsyncConfig::default());
    assert!(result.is_async(lock));
    assert!(result.is_async(guarded));
    let edge = result.call_graph().edges_at(call).next().expect("method edge");
    assert_eq!(edge.kind, CallKind::Method);
}

#[test]
fn allowlist_overrides_everything() {
    let mut b = ProgramBuilder::new();
    let (wait, wait_recv) = blocker(&mut b, "wait");
    let trusted = b.func("trusted", &[], &[]);
    let call = b.call_func(wait, vec![]);
    let call_stmt = b.expr_stmt(call);
    let recv = recv_global(&mut b);
    let recv_stmt = b.expr_stmt(recv);
    b.set_body(trusted, vec![call_stmt, recv_stmt]);
    let (outer, _) = calling(&mut b, "outer", trusted);
    let program = b.finish();

    let config = AsyncConfig::empty().with_sync("main.trusted");
    let result = analyze_with(&program, &config);
    assert!(result.is_async(wait));
    let info = result.func(trusted);
    assert!(info.allowlisted);
    assert!(!info.is_async);
    assert!(!info.directly_blocking);
    assert!(!result.is_async(outer));
    assert_eq!(
        result.suspension_points(),
        &[SuspensionPoint {
            func: wait,
            site: SuspendSite::Expr(wait_recv),
            kind: SuspendKind::Recv,
        }]
    );
}

struct Waiters {
    waiter: TypeDeclId,
    slow_wait: FuncId,
    fast_wait: FuncId,
    use_it: FuncId,
    call: ExprId,
}

/// `Waiter{Wait()}` implemented by `Slow` (receives) and optionally `Fast`
/// (does nothing), called from `useIt(w Waiter)`.
fn waiters(b: &mut ProgramBuilder, slow_implements: bool) -> Waiters {
    let sig = Signature {
        params: Vec::new(),
        results: Vec::new(),
        variadic: false,
    };
    let spec = b.method_spec("Wait", sig);
    let body = b.interface_type(vec![spec], Vec::new());
    let waiter = b.type_decl("Waiter", body);

    let empty = b.struct_type(&[]);
    let slow = b.type_decl("Slow", empty);
    let int = b.int();
    // Different signature: Slow no longer implements Waiter.
    let slow_wait = if slow_implements {
        b.method(slow, false, "Wait", &[], &[])
    } else {
        b.method(slow, false, "Wait", &[], &[int])
    };
    let recv = recv_global(b);
    let stmt = b.expr_stmt(recv);
    b.set_body(slow_wait, vec![stmt]);
    let fast = b.type_decl("Fast", empty);
    let fast_wait = b.method(fast, false, "Wait", &[], &[]);
    b.set_body(fast_wait, vec![]);

    let waiter_ty = b.named(waiter);
    let use_it = b.func("useIt", &[("w", waiter_ty)], &[]);
    let w = b.params(use_it)[0];
    let w_ref = b.ident(w);
    let fty = b.func_type(vec![], vec![]);
    let callee = b.selector(w_ref, "Wait", fty);
    let call = b.call(callee, vec![]);
    let stmt = b.expr_stmt(call);
    b.set_body(use_it, vec![stmt]);

    Waiters {
        waiter,
        slow_wait,
        fast_wait,
        use_it,
        call,
    }
}

#[test]
fn interface_call_is_async_if_any_implementation_blocks() {
    let mut b = ProgramBuilder::new();
    let w = waiters(&mut b, true);
    let program = b.finish();

    let result = analyze(&program);
    assert!(result.is_async(w.slow_wait));
    assert!(!result.is_async(w.fast_wait));
    assert!(result.is_async(w.use_it));
    let mut callees: Vec<FuncId> = result.call_graph().edges_at(w.call).map(|e| e.callee).collect();
    callees.sort_unstable();
    assert_eq!(callees, vec![w.slow_wait, w.fast_wait]);
    assert!(result
        .call_graph()
        .edges_at(w.call)
        .all(|e| e.kind == CallKind::Interface));
}

#[test]
fn interface_call_without_blocking_implementations_stays_sync() {
    let mut b = ProgramBuilder::new();
    let w = waiters(&mut b, false);
    let program = b.finish();

    let result = analyze(&program);
    assert!(result.is_async(w.slow_wait));
    assert!(!result.is_async(w.use_it));
    assert!(!result.is_suspension(SuspendSite::Expr(w.call)));
}

#[test]
fn methods_promoted_through_unnamed_structs_are_interface_targets() {
    // type AB interface{ A(); B() }
    // func (X) A() { <-ch }; func (Y) B() {}
    // var both AB = struct{ X; Y }{}
    // func useIt(w AB) { w.A() }
    let mut b = ProgramBuilder::new();
    let sig = Signature {
        params: Vec::new(),
        results: Vec::new(),
        variadic: false,
    };
    let a_spec = b.method_spec("A", sig.clone());
    let b_spec = b.method_spec("B", sig);
    let body = b.interface_type(vec![a_spec, b_spec], Vec::new());
    let ab = b.type_decl("AB", body);

    let empty = b.struct_type(&[]);
    let x = b.type_decl("X", empty);
    let x_a = b.method(x, false, "A", &[], &[]);
    let recv = recv_global(&mut b);
    let stmt = b.expr_stmt(recv);
    b.set_body(x_a, vec![stmt]);
    let y = b.type_decl("Y", empty);
    let y_b = b.method(y, false, "B", &[], &[]);
    b.set_body(y_b, vec![]);

    let x_ty = b.named(x);
    let y_ty = b.named(y);
    let fields = vec![b.field("X", x_ty, true), b.field("Y", y_ty, true)];
    let both_ty = b.struct_type_with(fields);
    let value = b.composite(both_ty, &[]);
    let ab_ty = b.named(ab);
    b.global("both", ab_ty, Some(value));

    let use_it = b.func("useIt", &[("w", ab_ty)], &[]);
    let w = b.params(use_it)[0];
    let w_ref = b.ident(w);
    let fty = b.func_type(vec![], vec![]);
    let callee = b.selector(w_ref, "A", fty);
    let call = b.call(callee, vec![]);
    let stmt = b.expr_stmt(call);
    b.set_body(use_it, vec![stmt]);
    let program = b.finish();

    let result = analyze(&program);
    assert!(result.is_async(x_a));
    assert!(result.is_async(use_it));
    let callees: Vec<FuncId> = result.call_graph().edges_at(call).map(|e| e.callee).collect();
    assert_eq!(callees, vec![x_a]);
}

#[test]
fn open_interfaces_are_assumed_to_block() {
    let mut b = ProgramBuilder::new();
    let w = waiters(&mut b, false);
    b.decl_mut(w.waiter).open = true;
    let program = b.finish();

    let result = analyze(&program);
    assert!(result.is_async(w.use_it));
    assert_eq!(result.func(w.use_it).reason, Some(AsyncReason::OpenCall(w.call)));
    assert_eq!(
        result.suspension_at(SuspendSite::Expr(w.call)).map(|p| p.kind),
        Some(SuspendKind::OpenCall)
    );
}

#[test]
fn open_world_makes_every_interface_call_async() {
    let mut b = ProgramBuilder::new();
    let w = waiters(&mut b, false);
    let program = b.finish();

    let config = AsyncConfig::empty().with_closed_world(false);
    let result = analyze_with(&program, &config);
    assert!(result.is_async(w.use_it));
    assert_eq!(result.call_graph().open_sites().len(), 1);
}

#[test]
fn calls_through_variables_follow_their_assignments() {
    let mut b = ProgramBuilder::new();
    let (wait, _) = blocker(&mut b, "wait");
    let run = b.func("run", &[], &[]);
    let value = b.func_ref(wait);
    let (f, decl) = b.define(run, "f", value);
    let f_ref = b.ident(f);
    let call = b.call(f_ref, vec![]);
    let stmt = b.expr_stmt(call);
    b.set_body(run, vec![decl, stmt]);
    let program = b.finish();

    let result = analyze(&program);
    assert!(result.is_async(run));
    let edges: Vec<_> = result.call_graph().edges_at(call).map(|e| (e.callee, e.kind)).collect();
    assert_eq!(edges, vec![(wait, CallKind::FuncValue)]);
}

#[test]
fn parameters_resolve_to_functions_with_the_same_signature() {
    let mut b = ProgramBuilder::new();
    let (wait, _) = blocker(&mut b, "wait");
    let other = b.func("other", &[], &[]);
    b.set_body(other, vec![]);

    let fty = b.func_type(vec![], vec![]);
    let apply = b.func("apply", &[("f", fty)], &[]);
    let f = b.params(apply)[0];
    let f_ref = b.ident(f);
    let call = b.call(f_ref, vec![]);
    let stmt = b.expr_stmt(call);
    b.set_body(apply, vec![stmt]);

    let main = b.func("main", &[], &[]);
    let arg = b.func_ref(wait);
    let apply_call = b.call_func(apply, vec![arg]);
    let stmt = b.expr_stmt(apply_call);
    b.set_body(main, vec![stmt]);
    let program = b.finish();

    let result = analyze(&program);
    let callees: Vec<FuncId> = result.call_graph().edges_at(call).map(|e| e.callee).collect();
    assert_eq!(callees, vec![wait]);
    assert!(result.is_async(apply));
    assert!(result.is_async(main));
    assert!(!result.is_async(other));
}

#[test]
fn recursion_converges() {
    let mut b = ProgramBuilder::new();
    let a = b.func("a", &[], &[]);
    let bf = b.func("b", &[], &[]);
    let call_b = b.call_func(bf, vec![]);
    let stmt = b.expr_stmt(call_b);
    b.set_body(a, vec![stmt]);
    let call_a = b.call_func(a, vec![]);
    let stmt_a = b.expr_stmt(call_a);
    let recv = recv_global(&mut b);
    let stmt_recv = b.expr_stmt(recv);
    b.set_body(bf, vec![stmt_a, stmt_recv]);

    let c = b.func("c", &[], &[]);
    let d = b.func("d", &[], &[]);
    let call_d = b.call_func(d, vec![]);
    let stmt = b.expr_stmt(call_d);
    b.set_body(c, vec![stmt]);
    let call_c = b.call_func(c, vec![]);
    let stmt = b.expr_stmt(call_c);
    b.set_body(d, vec![stmt]);
    let program = b.finish();

    let result = analyze(&program);
    assert!(result.is_async(a));
    assert!(result.is_async(bf));
    assert!(!result.is_async(c));
    assert!(!result.is_async(d));
}

#[test]
fn closures_are_analyzed_as_functions() {
    let mut b = ProgramBuilder::new();
    let main = b.func("main", &[], &[]);
    let closure = b.closure(main, &[], &[]);
    let recv = recv_global(&mut b);
    let stmt = b.expr_stmt(recv);
    b.set_body(closure, vec![stmt]);
    let lit = b.func_lit(closure);
    let call = b.call(lit, vec![]);
    let stmt = b.expr_stmt(call);
    b.set_body(main, vec![stmt]);
    let program = b.finish();

    let result = analyze(&program);
    assert!(result.is_async(closure));
    assert!(result.is_async(main));
    assert_eq!(
        result.suspension_at(SuspendSite::Expr(recv)).map(|p| p.func),
        Some(closure)
    );
}

#[test]
fn go_on_a_non_call_is_rejected() {
    let mut b = ProgramBuilder::new();
    let (wait, _) = blocker(&mut b, "wait");
    let main = b.func("main", &[], &[]);
    let value = b.func_ref(wait);
    let go = b.go(value);
    b.set_body(main, vec![go]);
    let program = b.finish();

    let model = build_type_model(&program).expect("model builds");
    let problems = analyze_async(&program, &model, &AsyncConfig::empty()).expect_err("analysis fails");
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].code(), ErrorCode::E3001);
    assert_eq!(problems[0].to_string(), "expression in `go` must be a function call");
}

/// Functions and their callees; `true` marks a function that receives.
fn call_graphs() -> impl Strategy<Value = (Vec<bool>, Vec<(usize, usize)>)> {
    (1usize..8).prop_flat_map(|n| {
        (
            prop::collection::vec(any::<bool>(), n),
            prop::collection::vec((0..n, 0..n), 0..16),
        )
    })
}

fn reaches_blocking(blocking: &[bool], edges: &[(usize, usize)], from: usize) -> bool {
    let mut seen = vec![false; blocking.len()];
    let mut stack = vec![from];
    while let Some(f) = stack.pop() {
        if std::mem::replace(&mut seen[f], true) {
            continue;
        }
        if blocking[f] {
            return true;
        }
        stack.extend(edges.iter().filter(|e| e.0 == f).map(|e| e.1));
    }
    false
}

proptest! {
    #[test]
    fn async_iff_a_blocking_function_is_reachable((blocking, edges) in call_graphs()) {
        let mut b = ProgramBuilder::new();
        let funcs: Vec<FuncId> = (0..blocking.len())
            .map(|i| b.func(&format!("f{i}"), &[], &[]))
            .collect();
        for (i, &f) in funcs.iter().enumerate() {
            let mut body: Vec<StmtId> = edges
                .iter()
                .filter(|e| e.0 == i)
                .map(|e| {
                    let call = b.call_func(funcs[e.1], vec![]);
                    b.expr_stmt(call)
                })
                .collect();
            if blocking[i] {
                let recv = recv_global(&mut b);
                body.push(b.expr_stmt(recv));
            }
            b.set_body(f, body);
        }
        let program = b.finish();

        let result = analyze(&program);
        for (i, &f) in funcs.iter().enumerate() {
            prop_assert_eq!(result.is_async(f), reaches_blocking(&blocking, &edges, i));
            prop_assert_eq!(result.func(f).directly_blocking, blocking[i]);
        }
    }
}
