//! Async contagion.
//!
//! A function is async when it can suspend: it performs a blocking
//! operation itself, or it calls (directly, through an interface, or
//! through a function value) a function that can.
//!
//! # Algorithm
//!
//! 1. **Collect**: gather function values program-wide, then every call
//!    edge, open call site and blocking operation (see `collect`).
//! 2. **Seed**: blocking primitives, functions with a blocking operation of
//!    their own, and functions with an open call site are async.
//! 3. **Propagate**: pop an async function and mark every caller reached
//!    over a non-`go` edge. Allow-listed functions absorb the effect. A
//!    function is pushed at most once, so cycles converge.
//! 4. **Annotate**: blocking operations and calls of async functions become
//!    suspension points; effectful operands evaluated before one become
//!    order hazards.

use rustc_hash::FxHashSet;
use strand_ir::Program;
use strand_types::TypeModel;
use tracing::{debug, trace};

use crate::collect::{collect, BlockingSite};
use crate::hazards::find_hazards;
use crate::{
    AsyncConfig, AsyncProblem, AsyncReason, AsyncResult, CallContext, CallGraph, FuncAsync,
    SuspendKind, SuspendSite, SuspensionPoint,
};

/// Classify every function of the program as async or not.
///
/// # Errors
///
/// Returns `go`/`defer` statements without a call and calls of values that
/// are not functions.
pub fn analyze_async(program: &Program, model: &TypeModel, config: &AsyncConfig) -> Result<AsyncResult, Vec<AsyncProblem>> {
    let collected = collect(program, model, config);
    if !collected.problems.is_empty() {
        debug!(problems = collected.problems.len(), "async analysis failed");
        return Err(collected.problems);
    }
    let graph = CallGraph::new(program.func_count(), collected.edges, collected.open_sites);

    let mut funcs = classify(program, config);
    let worklist = seed(&graph, &mut funcs, &collected.blocking);
    let seeds = worklist.len();
    propagate(&graph, &mut funcs, worklist);

    let suspension_points = suspension_points(&graph, &funcs, &collected.blocking);
    let order_hazards = find_hazards(program, &funcs, &suspension_points);
    debug!(
        seeds,
        async_funcs = funcs.iter().filter(|f| f.is_async).count(),
        edges = graph.edges().len(),
        suspension_points = suspension_points.len(),
        order_hazards = order_hazards.len(),
        "async analysis complete"
    );
    Ok(AsyncResult {
        funcs,
        graph,
        suspension_points,
        order_hazards,
    })
}

/// Allow-list membership and blocking primitives by qualified name.
fn classify(program: &Program, config: &AsyncConfig) -> Vec<FuncAsync> {
    let mut funcs = vec![FuncAsync::default(); program.func_count()];
    let primitives = config.primitive_set();
    let allowlist = config.allowlist_set();
    if primitives.is_empty() && allowlist.is_empty() {
        return funcs;
    }
    for id in program.func_ids() {
        if program.func(id).parent.is_some() {
            continue;
        }
        let name = program.qualified_name(id);
        let info = &mut funcs[id.index()];
        info.allowlisted = allowlist.contains(name.as_str());
        if !info.allowlisted && primitives.contains(name.as_str()) {
            info.is_async = true;
            info.directly_blocking = true;
            info.reason = Some(AsyncReason::Primitive);
        }
    }
    funcs
}

fn mark(funcs: &mut [FuncAsync], worklist: &mut Vec<strand_ir::FuncId>, func: strand_ir::FuncId, reason: AsyncReason) {
    let info = &mut funcs[func.index()];
    if info.allowlisted || info.is_async {
        return;
    }
    info.is_async = true;
    info.reason = Some(reason);
    worklist.push(func);
}

fn seed(graph: &CallGraph, funcs: &mut [FuncAsync], blocking: &[BlockingSite]) -> Vec<strand_ir::FuncId> {
    let mut worklist: Vec<_> = funcs
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_async)
        .map(|(i, _)| strand_ir::FuncId::from_usize(i))
        .collect();

    for site in blocking {
        if !funcs[site.func.index()].allowlisted {
            funcs[site.func.index()].directly_blocking = true;
        }
        mark(funcs, &mut worklist, site.func, AsyncReason::Blocking(site.site));
    }
    for open in graph.open_sites() {
        if open.context.propagates() {
            mark(funcs, &mut worklist, open.func, AsyncReason::OpenCall(open.site));
        }
    }
    // Calling a primitive is a blocking operation of the caller.
    for edge in graph.edges() {
        let callee = funcs[edge.callee.index()];
        if edge.context.propagates() && callee.reason == Some(AsyncReason::Primitive) {
            let caller = &mut funcs[edge.caller.index()];
            caller.directly_blocking |= !caller.allowlisted;
        }
    }
    worklist
}

fn propagate(graph: &CallGraph, funcs: &mut [FuncAsync], mut worklist: Vec<strand_ir::FuncId>) {
    while let Some(callee) = worklist.pop() {
        for edge in graph.callers(callee) {
            if !edge.context.propagates() {
                continue;
            }
            let caller = &mut funcs[edge.caller.index()];
            if caller.is_async || caller.allowlisted {
                continue;
            }
            caller.is_async = true;
            caller.reason = Some(AsyncReason::Calls {
                callee,
                site: edge.site,
            });
            trace!(caller = ?edge.caller, ?callee, "async by contagion");
            worklist.push(edge.caller);
        }
    }
}

fn suspension_points(graph: &CallGraph, funcs: &[FuncAsync], blocking: &[BlockingSite]) -> Vec<SuspensionPoint> {
    let mut points: Vec<SuspensionPoint> = blocking
        .iter()
        .filter(|b| !funcs[b.func.index()].allowlisted)
        .map(|b| SuspensionPoint {
            func: b.func,
            site: b.site,
            kind: b.kind,
        })
        .collect();

    let mut seen = FxHashSet::default();
    for edge in graph.edges() {
        if !edge.context.propagates()
            || funcs[edge.caller.index()].allowlisted
            || !funcs[edge.callee.index()].is_async
            || !seen.insert(edge.site)
        {
            continue;
        }
        let kind = match edge.context {
            CallContext::Deferred => SuspendKind::DeferredCall,
            CallContext::Normal | CallContext::Spawned => SuspendKind::Call,
        };
        points.push(SuspensionPoint {
            func: edge.caller,
            site: SuspendSite::Expr(edge.site),
            kind,
        });
    }
    for open in graph.open_sites() {
        if open.context.propagates() && !funcs[open.func.index()].allowlisted && seen.insert(open.site) {
            points.push(SuspensionPoint {
                func: open.func,
                site: SuspendSite::Expr(open.site),
                kind: SuspendKind::OpenCall,
            });
        }
    }
    points.sort_by_key(|p| (p.func, p.site));
    points
}

#[cfg(test)]
mod tests;
