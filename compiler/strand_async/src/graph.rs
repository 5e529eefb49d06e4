//! Whole-program call graph.
//!
//! Edges are stored once in a flat list; per-function callee and caller
//! lists index into it, so walking predecessors during propagation costs
//! nothing extra.

use strand_ir::{ExprId, FuncId};

/// How a call site reaches its target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallKind {
    /// Named function, generic instance, or immediately invoked closure.
    Direct,
    /// Method resolved through the static receiver type.
    Method,
    /// Interface method; one edge per implementation.
    Interface,
    /// Call through a function value; one edge per possible value.
    FuncValue,
}

/// Statement context of a call site.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallContext {
    #[default]
    Normal,
    /// `defer f()`: runs when the caller returns, in the caller's task.
    Deferred,
    /// `go f()`: runs in a new task and never suspends the spawner.
    Spawned,
}

impl CallContext {
    /// Whether a suspension of the callee suspends the caller.
    #[inline]
    pub const fn propagates(self) -> bool {
        !matches!(self, CallContext::Spawned)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallEdge {
    pub site: ExprId,
    pub caller: FuncId,
    pub callee: FuncId,
    pub kind: CallKind,
    pub context: CallContext,
}

/// A call site whose target set may include functions outside the program.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpenSite {
    pub func: FuncId,
    pub site: ExprId,
    pub context: CallContext,
}

#[derive(Clone, Debug, Default)]
pub struct CallGraph {
    edges: Vec<CallEdge>,
    callees: Vec<Vec<usize>>,
    callers: Vec<Vec<usize>>,
    open_sites: Vec<OpenSite>,
}

impl CallGraph {
    pub(crate) fn new(func_count: usize, edges: Vec<CallEdge>, open_sites: Vec<OpenSite>) -> Self {
        let mut callees = vec![Vec::new(); func_count];
        let mut callers = vec![Vec::new(); func_count];
        for (i, edge) in edges.iter().enumerate() {
            if let Some(list) = callees.get_mut(edge.caller.index()) {
                list.push(i);
            }
            if let Some(list) = callers.get_mut(edge.callee.index()) {
                list.push(i);
            }
        }
        CallGraph {
            edges,
            callees,
            callers,
            open_sites,
        }
    }

    pub fn edges(&self) -> &[CallEdge] {
        &self.edges
    }

    pub fn callees(&self, func: FuncId) -> impl Iterator<Item = &CallEdge> {
        self.indexed(&self.callees, func)
    }

    /// Incoming edges, including `go` edges.
    pub fn callers(&self, func: FuncId) -> impl Iterator<Item = &CallEdge> {
        self.indexed(&self.callers, func)
    }

    /// Every edge leaving one call site.
    pub fn edges_at(&self, site: ExprId) -> impl Iterator<Item = &CallEdge> {
        self.edges.iter().filter(move |e| e.site == site)
    }

    pub fn open_sites(&self) -> &[OpenSite] {
        &self.open_sites
    }

    /// Whether `to` is reachable from `from` over propagating edges.
    pub fn reaches(&self, from: FuncId, to: FuncId) -> bool {
        let mut seen = vec![false; self.callees.len()];
        let mut stack = vec![from];
        while let Some(f) = stack.pop() {
            if f == to {
                return true;
            }
            match seen.get_mut(f.index()) {
                Some(s) if !*s => *s = true,
                _ => continue,
            }
            stack.extend(
                self.callees(f)
                    .filter(|e| e.context.propagates())
                    .map(|e| e.callee),
            );
        }
        false
    }

    fn indexed<'g>(&'g self, index: &'g [Vec<usize>], func: FuncId) -> impl Iterator<Item = &'g CallEdge> {
        index
            .get(func.index())
            .into_iter()
            .flatten()
            .filter_map(move |&i| self.edges.get(i))
    }
}
