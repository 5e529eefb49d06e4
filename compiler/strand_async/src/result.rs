//! Output of the async analysis.

use strand_ir::{ExprId, FuncId, StmtId};

use crate::CallGraph;

/// Where execution can suspend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SuspendSite {
    /// A call or a channel receive.
    Expr(ExprId),
    /// A send, a `select`, or a `range` over a channel.
    Stmt(StmtId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SuspendKind {
    Send,
    Recv,
    RangeChan,
    Select,
    /// Call of an async function.
    Call,
    /// Call of an async function deferred to the end of the caller.
    DeferredCall,
    /// Call whose target set is not closed.
    OpenCall,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuspensionPoint {
    pub func: FuncId,
    pub site: SuspendSite,
    pub kind: SuspendKind,
}

/// An operand with side effects evaluated before a suspending sibling. The
/// generator evaluates it into a temporary ahead of the suspension so the
/// source's left-to-right order survives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderHazard {
    pub func: FuncId,
    pub operand: ExprId,
    /// The first suspending expression among the later siblings.
    pub suspension: ExprId,
}

/// Why a function is async.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AsyncReason {
    /// Configured blocking primitive.
    Primitive,
    /// A blocking operation in its own body.
    Blocking(SuspendSite),
    /// A call whose targets may include unknown functions.
    OpenCall(ExprId),
    /// A call of an async function.
    Calls { callee: FuncId, site: ExprId },
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FuncAsync {
    pub is_async: bool,
    /// Blocks in its own body (or is a blocking primitive).
    pub directly_blocking: bool,
    /// Trusted synchronous.
    pub allowlisted: bool,
    /// The first fact that made the function async.
    pub reason: Option<AsyncReason>,
}

#[derive(Clone, Debug, Default)]
pub struct AsyncResult {
    pub(crate) funcs: Vec<FuncAsync>,
    pub(crate) graph: CallGraph,
    pub(crate) suspension_points: Vec<SuspensionPoint>,
    pub(crate) order_hazards: Vec<OrderHazard>,
}

impl AsyncResult {
    pub fn is_async(&self, func: FuncId) -> bool {
        self.funcs.get(func.index()).is_some_and(|f| f.is_async)
    }

    pub fn func(&self, func: FuncId) -> FuncAsync {
        self.funcs.get(func.index()).copied().unwrap_or_default()
    }

    /// Async functions in ID order.
    pub fn async_funcs(&self) -> Vec<FuncId> {
        self.funcs
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_async)
            .map(|(i, _)| FuncId::from_usize(i))
            .collect()
    }

    pub fn call_graph(&self) -> &CallGraph {
        &self.graph
    }

    /// Sorted by function, then site.
    pub fn suspension_points(&self) -> &[SuspensionPoint] {
        &self.suspension_points
    }

    pub fn suspension_at(&self, site: SuspendSite) -> Option<&SuspensionPoint> {
        self.suspension_points.iter().find(|p| p.site == site)
    }

    pub fn is_suspension(&self, site: SuspendSite) -> bool {
        self.suspension_at(site).is_some()
    }

    pub fn order_hazards(&self) -> &[OrderHazard] {
        &self.order_hazards
    }
}
