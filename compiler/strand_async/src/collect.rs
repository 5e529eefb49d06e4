//! First pass: call edges and blocking operations.
//!
//! Function values are resolved before any edge is built. Every function
//! used as a value and every assignment to a function-typed variable is
//! collected program-wide first, so the edges of a call through a variable
//! do not depend on the order bodies are visited in.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use strand_ir::visitor::{walk_expr, walk_function, walk_stmt, Visitor};
use strand_ir::{
    CommClause, ExprId, ExprKind, FuncId, Literal, Name, Program, StmtId, StmtKind, SymbolId, SymbolKind,
};
use strand_types::{Idx, MemberKind, TypeModel};
use tracing::trace;

use crate::graph::{CallContext, CallEdge, CallKind, OpenSite};
use crate::{AsyncConfig, AsyncProblem, SuspendKind, SuspendSite};

/// A blocking operation in a function body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct BlockingSite {
    pub func: FuncId,
    pub site: SuspendSite,
    pub kind: SuspendKind,
}

pub(crate) struct Collected {
    pub edges: Vec<CallEdge>,
    pub open_sites: Vec<OpenSite>,
    pub blocking: Vec<BlockingSite>,
    pub problems: Vec<AsyncProblem>,
}

pub(crate) fn collect(program: &Program, model: &TypeModel, config: &AsyncConfig) -> Collected {
    let values = FuncValues::gather(program, model);
    let mut collector = Collector {
        model,
        config,
        values: &values,
        func: FuncId::INVALID,
        contexts: FxHashMap::default(),
        quiet: FxHashSet::default(),
        edges: Vec::new(),
        open_sites: Vec::new(),
        blocking: Vec::new(),
        problems: Vec::new(),
    };
    for func in program.func_ids() {
        collector.func = func;
        walk_function(&mut collector, program, func);
    }
    Collected {
        edges: collector.edges,
        open_sites: collector.open_sites,
        blocking: collector.blocking,
        problems: collector.problems,
    }
}

fn peel(program: &Program, mut id: ExprId) -> ExprId {
    while let ExprKind::Paren(inner) = program.expr(id).kind {
        id = inner;
    }
    id
}

// Function values

/// What a function-typed variable may hold.
#[derive(Clone, Debug, Default)]
struct VarSources {
    funcs: SmallVec<[FuncId; 2]>,
    /// Copied from these variables.
    vars: SmallVec<[SymbolId; 2]>,
    /// Assigned something untraceable.
    opaque: bool,
}

enum ValueSource {
    Func(FuncId),
    Var(SymbolId),
    Nil,
    Opaque,
}

#[derive(Default)]
struct FuncValues {
    /// Functions used other than by calling them directly.
    escaped: Vec<FuncId>,
    vars: FxHashMap<SymbolId, VarSources>,
}

impl FuncValues {
    fn gather(program: &Program, model: &TypeModel) -> Self {
        let mut gatherer = ValueGatherer {
            model,
            callees: FxHashSet::default(),
            values: FuncValues::default(),
        };
        for global in program.globals() {
            if let Some(value) = global.value {
                gatherer.assign(program, global.symbol, Some(value));
                gatherer.visit_expr(program, value);
            }
        }
        for func in program.func_ids() {
            walk_function(&mut gatherer, program, func);
        }
        let mut values = gatherer.values;
        values.escaped.sort_unstable();
        values.escaped.dedup();
        values
    }

    /// Every function `symbol` may hold, or `None` if some source is
    /// untraceable.
    fn resolve(&self, program: &Program, symbol: SymbolId) -> Option<Vec<FuncId>> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        let mut stack = vec![symbol];
        while let Some(s) = stack.pop() {
            if !seen.insert(s) {
                continue;
            }
            if program.symbol(s).kind == SymbolKind::Param {
                return None;
            }
            let Some(sources) = self.vars.get(&s) else {
                continue;
            };
            if sources.opaque {
                return None;
            }
            out.extend(sources.funcs.iter().copied());
            stack.extend(sources.vars.iter().copied());
        }
        out.sort_unstable();
        out.dedup();
        Some(out)
    }
}

struct ValueGatherer<'a> {
    model: &'a TypeModel,
    /// Expressions in callee position.
    callees: FxHashSet<ExprId>,
    values: FuncValues,
}

impl ValueGatherer<'_> {
    fn is_func_typed(&self, symbol: SymbolId) -> bool {
        self.model
            .pool()
            .func_sig(self.model.symbol_type(symbol))
            .is_some()
    }

    fn assign(&mut self, program: &Program, symbol: SymbolId, value: Option<ExprId>) {
        if !self.is_func_typed(symbol) {
            return;
        }
        let source = value.map_or(ValueSource::Opaque, |v| self.source(program, v));
        let entry = self.values.vars.entry(symbol).or_default();
        match source {
            ValueSource::Func(f) => entry.funcs.push(f),
            ValueSource::Var(v) => entry.vars.push(v),
            ValueSource::Nil => {}
            ValueSource::Opaque => entry.opaque = true,
        }
    }

    fn source(&self, program: &Program, value: ExprId) -> ValueSource {
        let value = peel(program, value);
        match &program.expr(value).kind {
            ExprKind::FuncRef(f) | ExprKind::FuncLit(f) | ExprKind::Instantiate { func: f, .. } => {
                ValueSource::Func(*f)
            }
            ExprKind::Selector { .. } => match self.model.selection(value).map(|s| &s.member.kind) {
                Some(MemberKind::Method { func, .. }) => ValueSource::Func(*func),
                _ => ValueSource::Opaque,
            },
            ExprKind::Ident(symbol) => ValueSource::Var(*symbol),
            ExprKind::Lit(Literal::Nil) => ValueSource::Nil,
            _ => ValueSource::Opaque,
        }
    }
}

impl<'p> Visitor<'p> for ValueGatherer<'_> {
    fn visit_stmt(&mut self, program: &'p Program, id: StmtId) {
        match &program.stmt(id).kind {
            StmtKind::VarDecl { symbols, values } if symbols.len() == values.len() => {
                for (&symbol, &value) in symbols.iter().zip(values) {
                    self.assign(program, symbol, Some(value));
                }
            }
            StmtKind::VarDecl { symbols, values } if !values.is_empty() => {
                for &symbol in symbols {
                    self.assign(program, symbol, None);
                }
            }
            StmtKind::Assign { op: None, lhs, rhs } => {
                let paired = lhs.len() == rhs.len();
                for (i, &target) in lhs.iter().enumerate() {
                    if let ExprKind::Ident(symbol) = program.expr(peel(program, target)).kind {
                        self.assign(program, symbol, paired.then(|| rhs[i]));
                    }
                }
            }
            StmtKind::Range { define, assign, .. } => {
                for &symbol in define {
                    self.assign(program, symbol, None);
                }
                for &target in assign {
                    if let ExprKind::Ident(symbol) = program.expr(peel(program, target)).kind {
                        self.assign(program, symbol, None);
                    }
                }
            }
            StmtKind::Select(cases) => {
                for case in cases {
                    if let CommClause::Recv { bind, assign, .. } = &case.comm {
                        for &symbol in bind {
                            self.assign(program, symbol, None);
                        }
                        for &target in assign {
                            if let ExprKind::Ident(symbol) = program.expr(peel(program, target)).kind {
                                self.assign(program, symbol, None);
                            }
                        }
                    }
                }
            }
            StmtKind::TypeSwitch { cases, .. } => {
                for symbol in cases.iter().filter_map(|c| c.binding) {
                    self.assign(program, symbol, None);
                }
            }
            _ => {}
        }
        walk_stmt(self, program, id);
    }

    fn visit_expr(&mut self, program: &'p Program, id: ExprId) {
        match &program.expr(id).kind {
            ExprKind::Call { callee, .. } => {
                let mut c = *callee;
                self.callees.insert(c);
                while let ExprKind::Paren(inner) = program.expr(c).kind {
                    c = inner;
                    self.callees.insert(c);
                }
            }
            ExprKind::FuncRef(f) | ExprKind::FuncLit(f) | ExprKind::Instantiate { func: f, .. }
                if !self.callees.contains(&id) =>
            {
                self.values.escaped.push(*f);
            }
            ExprKind::Selector { .. } if !self.callees.contains(&id) => {
                if let Some(MemberKind::Method { func, .. }) = self.model.selection(id).map(|s| &s.member.kind) {
                    self.values.escaped.push(*func);
                }
            }
            ExprKind::AddressOf(operand) => {
                // Writes through the pointer are invisible here.
                if let ExprKind::Ident(symbol) = program.expr(peel(program, *operand)).kind {
                    self.assign(program, symbol, None);
                }
            }
            _ => {}
        }
        walk_expr(self, program, id);
    }
}

// Edges and blocking operations

struct Collector<'a> {
    model: &'a TypeModel,
    config: &'a AsyncConfig,
    values: &'a FuncValues,
    func: FuncId,
    /// `go`/`defer` calls.
    contexts: FxHashMap<ExprId, CallContext>,
    /// Receives that are select cases, not blocking on their own.
    quiet: FxHashSet<ExprId>,
    edges: Vec<CallEdge>,
    open_sites: Vec<OpenSite>,
    blocking: Vec<BlockingSite>,
    problems: Vec<AsyncProblem>,
}

/// Resolved targets of one call site.
struct Targets {
    kind: CallKind,
    funcs: Vec<FuncId>,
    open: bool,
}

impl Collector<'_> {
    fn block(&mut self, site: SuspendSite, kind: SuspendKind) {
        trace!(func = ?self.func, ?site, ?kind, "blocking operation");
        self.blocking.push(BlockingSite {
            func: self.func,
            site,
            kind,
        });
    }

    fn call(&mut self, program: &Program, site: ExprId, callee: ExprId) {
        let context = self.contexts.get(&site).copied().unwrap_or_default();
        let callee_ty = self.model.expr_type(callee);
        if self.model.pool().func_sig(callee_ty).is_none() {
            self.problems.push(AsyncProblem::NotCallable {
                span: program.expr(callee).span,
                ty: self.model.pool().display(callee_ty, program),
            });
            return;
        }
        let targets = self.resolve(program, callee, callee_ty);
        for &callee in &targets.funcs {
            self.edges.push(CallEdge {
                site,
                caller: self.func,
                callee,
                kind: targets.kind,
                context,
            });
        }
        if targets.open {
            self.open_sites.push(OpenSite {
                func: self.func,
                site,
                context,
            });
        }
    }

    fn resolve(&self, program: &Program, callee: ExprId, callee_ty: Idx) -> Targets {
        let callee = peel(program, callee);
        match &program.expr(callee).kind {
            ExprKind::FuncRef(f) | ExprKind::FuncLit(f) | ExprKind::Instantiate { func: f, .. } => Targets {
                kind: CallKind::Direct,
                funcs: vec![*f],
                open: false,
            },
            ExprKind::Selector { base, name } => match self.model.selection(callee) {
                Some(selection) => match &selection.member.kind {
                    MemberKind::Method { func, .. } => Targets {
                        kind: CallKind::Method,
                        funcs: vec![*func],
                        open: false,
                    },
                    // Any instantiation may supply the method.
                    MemberKind::InterfaceMethod { .. }
                        if self.model.pool().is_type_param(self.model.expr_type(*base)) =>
                    {
                        Targets {
                            kind: CallKind::Interface,
                            funcs: methods_named(program, *name),
                            open: !self.config.closed_world,
                        }
                    }
                    MemberKind::InterfaceMethod { iface, .. } => Targets {
                        kind: CallKind::Interface,
                        funcs: self.model.method_targets(*iface, selection.member.name),
                        open: !self.config.closed_world || self.model.is_open_interface(*iface),
                    },
                    // Function-typed field.
                    MemberKind::Field { .. } => self.by_signature(callee_ty),
                },
                None => self.by_signature(callee_ty),
            },
            ExprKind::Ident(symbol) => match self.values.resolve(program, *symbol) {
                Some(funcs) => Targets {
                    kind: CallKind::FuncValue,
                    funcs,
                    open: false,
                },
                None => self.by_signature(callee_ty),
            },
            _ => self.by_signature(callee_ty),
        }
    }

    /// Every function used as a value whose signature matches.
    fn by_signature(&self, callee_ty: Idx) -> Targets {
        let pool = self.model.pool();
        let wanted = pool.underlying(callee_ty);
        let funcs = self
            .values
            .escaped
            .iter()
            .copied()
            .filter(|&f| pool.underlying(self.model.func_sig(f)) == wanted)
            .collect();
        Targets {
            kind: CallKind::FuncValue,
            funcs,
            open: !self.config.closed_world,
        }
    }
}

/// Declared methods called `name`, on any type.
fn methods_named(program: &Program, name: Name) -> Vec<FuncId> {
    let mut out: Vec<FuncId> = program
        .decl_ids()
        .flat_map(|d| program.decl(d).methods.iter().copied())
        .filter(|&m| program.func(m).name == name)
        .collect();
    out.sort_unstable();
    out
}

impl<'p> Visitor<'p> for Collector<'_> {
    fn visit_stmt(&mut self, program: &'p Program, id: StmtId) {
        match &program.stmt(id).kind {
            StmtKind::Send { .. } => self.block(SuspendSite::Stmt(id), SuspendKind::Send),
            StmtKind::Range { subject, .. } if self.model.pool().is_chan(self.model.expr_type(*subject)) => {
                self.block(SuspendSite::Stmt(id), SuspendKind::RangeChan);
            }
            StmtKind::Select(cases) => {
                if !cases.iter().any(|c| matches!(c.comm, CommClause::Default)) {
                    self.block(SuspendSite::Stmt(id), SuspendKind::Select);
                }
                for case in cases {
                    if let CommClause::Recv { recv, .. } = &case.comm {
                        self.quiet.insert(peel(program, *recv));
                    }
                }
            }
            StmtKind::Go(e) | StmtKind::Defer(e) => {
                let (keyword, context) = match program.stmt(id).kind {
                    StmtKind::Go(_) => ("go", CallContext::Spawned),
                    _ => ("defer", CallContext::Deferred),
                };
                let call = peel(program, *e);
                match program.expr(call).kind {
                    ExprKind::Call { .. } => {
                        self.contexts.insert(call, context);
                    }
                    ExprKind::BuiltinCall { .. } => {}
                    _ => self.problems.push(AsyncProblem::NotACall {
                        span: program.stmt(id).span,
                        keyword,
                    }),
                }
            }
            _ => {}
        }
        walk_stmt(self, program, id);
    }

    fn visit_expr(&mut self, program: &'p Program, id: ExprId) {
        match &program.expr(id).kind {
            ExprKind::Recv(_) if !self.quiet.contains(&id) => {
                self.block(SuspendSite::Expr(id), SuspendKind::Recv);
            }
            ExprKind::Call { callee, .. } => self.call(program, id, *callee),
            _ => {}
        }
        walk_expr(self, program, id);
    }
}
