//! Address-escape analysis.
//!
//! The target has no pointers to local storage. A variable whose address
//! outlives the expression that takes it must live in a reference cell
//! instead, and every read and write of it goes through the cell. This pass
//! decides which symbols need that treatment.
//!
//! # Algorithm
//!
//! 1. **Scan**: walk every function body and package initializer once,
//!    carrying how the value of each expression is consumed ([`Use`]).
//!    Record each address-of (explicit `&` and implicit pointer receivers),
//!    the pointer bindings `p = &x` and `p = q`, how each pointer local is
//!    used, and every aggregate copy site.
//! 2. **Alias**: `p := &x` stays unboxed when `p` is a local assigned only
//!    there, never addressed, never captured by a closure and only ever
//!    dereferenced or selected through. The generator rewrites `*p` to `x`.
//!    Every other binding of `&x` escapes.
//! 3. **Propagate**: escaping roots seed a worklist. Boxing a pointer
//!    variable boxes every pointee bound to it, transitively; boxing a struct
//!    field boxes every structurally identical alias of that field.
//! 4. **Copies**: decide for each aggregate copy whether it writes into an
//!    existing cell.
//!
//! The boxed set only grows and each symbol is expanded once, so step 3
//! terminates on cyclic pointer bindings.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use strand_ir::{
    ensure_sufficient_stack, BasicKind, CommClause, CompositeKey, ExprId, ExprKind, FuncId,
    Program, StmtId, StmtKind, SymbolId, SymbolKind,
};
use strand_types::{Idx, MemberKind, TypeData, TypeModel};
use tracing::{debug, trace};

use crate::{AddressEvent, AddressRoot, BoxingProblem, BoxingResult, CopyPoint};

/// Compute the boxed symbols, pointer aliases and copy points of a program.
///
/// # Errors
///
/// Returns every construct whose address cannot be modeled: `&` of a map
/// element, call result or other value without storage, and pointer-receiver
/// calls on such values.
pub fn analyze_boxing(program: &Program, model: &TypeModel) -> Result<BoxingResult, Vec<BoxingProblem>> {
    let mut scanner = Scanner::new(program, model);
    scanner.scan_program();
    if !scanner.problems.is_empty() {
        debug!(problems = scanner.problems.len(), "boxing analysis failed");
        return Err(scanner.problems);
    }
    let result = scanner.finish();
    debug!(
        boxed = result.boxed.len(),
        aliases = result.aliases.len(),
        copies = result.copy_points.len(),
        "boxing analysis complete"
    );
    Ok(result)
}

/// How the value of an expression is consumed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Use {
    /// Operand of `*`, or indexed/sliced through.
    Deref,
    /// Operand of a field selector or method call that does not keep it.
    Select,
    /// Evaluated and dropped.
    Discard,
    /// Initial value of a declaration of this symbol.
    Define(SymbolId),
    /// Stored, passed, returned, compared or converted.
    Escape,
}

impl Use {
    fn is_local(self) -> bool {
        matches!(self, Use::Deref | Use::Select | Use::Discard)
    }
}

/// Where a pointer variable's value came from.
#[derive(Copy, Clone, Debug)]
enum Binding {
    Addr(SymbolId),
    Copy(SymbolId),
}

#[derive(Copy, Clone, Debug)]
enum CopyDest {
    /// A newly declared variable.
    Fresh,
    /// An assignment target.
    Place(ExprId),
    /// An argument, result, element or sent value.
    Value,
}

struct AliasCandidate {
    pointer: SymbolId,
    target: SymbolId,
    event: usize,
}

#[derive(Copy, Clone, Debug, Default)]
struct SymbolUse {
    escaping: bool,
    captured: bool,
    reassigned: bool,
}

struct Scanner<'a> {
    program: &'a Program,
    model: &'a TypeModel,
    func: Option<FuncId>,
    events: Vec<AddressEvent>,
    address_taken: FxHashSet<SymbolId>,
    seeds: Vec<SymbolId>,
    candidates: Vec<AliasCandidate>,
    bindings: FxHashMap<SymbolId, SmallVec<[Binding; 2]>>,
    uses: FxHashMap<SymbolId, SymbolUse>,
    copies: Vec<(ExprId, CopyDest)>,
    problems: Vec<BoxingProblem>,
}

impl<'a> Scanner<'a> {
    fn new(program: &'a Program, model: &'a TypeModel) -> Self {
        Scanner {
            program,
            model,
            func: None,
            events: Vec::new(),
            address_taken: FxHashSet::default(),
            seeds: Vec::new(),
            candidates: Vec::new(),
            bindings: FxHashMap::default(),
            uses: FxHashMap::default(),
            copies: Vec::new(),
            problems: Vec::new(),
        }
    }

    fn scan_program(&mut self) {
        let program = self.program;
        self.func = None;
        for global in program.globals() {
            if let Some(value) = global.value {
                self.expr(value, Use::Escape);
                self.bind(global.symbol, value);
                self.copies.push((value, CopyDest::Fresh));
            }
        }
        for func in program.func_ids() {
            if let Some(body) = program.func(func).body {
                self.func = Some(func);
                self.stmt(body);
            }
        }
    }

    // Statements

    fn stmts(&mut self, ids: &[StmtId]) {
        for &id in ids {
            self.stmt(id);
        }
    }

    fn opt_stmt(&mut self, id: Option<StmtId>) {
        if let Some(id) = id {
            self.stmt(id);
        }
    }

    fn stmt(&mut self, id: StmtId) {
        let program = self.program;
        ensure_sufficient_stack(|| match &program.stmt(id).kind {
            StmtKind::Block(stmts) => self.stmts(stmts),
            StmtKind::Expr(e) | StmtKind::Go(e) | StmtKind::Defer(e) => self.expr(*e, Use::Discard),
            StmtKind::VarDecl { symbols, values } => self.var_decl(symbols, values),
            StmtKind::Assign { op, lhs, rhs } => self.assign(op.is_some(), lhs, rhs),
            StmtKind::IncDec { target, .. } => self.place(*target),
            StmtKind::Send { chan, value } => {
                self.expr(*chan, Use::Discard);
                self.expr(*value, Use::Escape);
                self.copies.push((*value, CopyDest::Value));
            }
            StmtKind::Return(values) => {
                for &value in values {
                    self.expr(value, Use::Escape);
                    self.copies.push((value, CopyDest::Value));
                }
            }
            StmtKind::If {
                init,
                cond,
                then,
                els,
            } => {
                self.opt_stmt(*init);
                self.expr(*cond, Use::Discard);
                self.stmt(*then);
                self.opt_stmt(*els);
            }
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                self.opt_stmt(*init);
                if let Some(cond) = cond {
                    self.expr(*cond, Use::Discard);
                }
                self.stmt(*body);
                self.opt_stmt(*post);
            }
            StmtKind::Range {
                subject,
                define,
                assign,
                body,
            } => {
                let subject_use = self.container_use(*subject);
                self.expr(*subject, subject_use);
                for &symbol in define {
                    self.uses.entry(symbol).or_default().reassigned = true;
                }
                for &target in assign {
                    self.place(target);
                }
                self.stmt(*body);
            }
            StmtKind::Switch { init, tag, cases } => {
                self.opt_stmt(*init);
                if let Some(tag) = tag {
                    self.expr(*tag, Use::Escape);
                }
                for case in cases {
                    for &e in &case.exprs {
                        self.expr(e, Use::Escape);
                    }
                    self.stmts(&case.body);
                }
            }
            StmtKind::TypeSwitch {
                init,
                subject,
                cases,
            } => {
                self.opt_stmt(*init);
                self.expr(*subject, Use::Escape);
                for case in cases {
                    self.stmts(&case.body);
                }
            }
            StmtKind::Select(cases) => {
                for case in cases {
                    match &case.comm {
                        CommClause::Send { chan, value } => {
                            self.expr(*chan, Use::Discard);
                            self.expr(*value, Use::Escape);
                            self.copies.push((*value, CopyDest::Value));
                        }
                        CommClause::Recv { recv, assign, .. } => {
                            self.expr(*recv, Use::Discard);
                            for &target in assign {
                                self.place(target);
                            }
                        }
                        CommClause::Default => {}
                    }
                    self.stmts(&case.body);
                }
            }
            StmtKind::Labeled { body, .. } => self.stmt(*body),
            StmtKind::Branch { .. } | StmtKind::Empty => {}
        });
    }

    fn var_decl(&mut self, symbols: &[SymbolId], values: &[ExprId]) {
        if symbols.len() != values.len() {
            // Zero values, or one multi-value call.
            for &value in values {
                self.expr(value, Use::Escape);
            }
            return;
        }
        for (&symbol, &value) in symbols.iter().zip(values) {
            self.expr(value, Use::Define(symbol));
            self.bind(symbol, value);
            self.copies.push((value, CopyDest::Fresh));
        }
    }

    fn assign(&mut self, compound: bool, lhs: &[ExprId], rhs: &[ExprId]) {
        for &target in lhs {
            self.place(target);
        }
        if compound || lhs.len() != rhs.len() {
            for &value in rhs {
                self.expr(value, Use::Escape);
            }
            return;
        }
        for (&target, &value) in lhs.iter().zip(rhs) {
            self.expr(value, Use::Escape);
            if let ExprKind::Ident(symbol) = self.program.expr(self.peel(target)).kind {
                self.bind(symbol, value);
            }
            self.copies.push((value, CopyDest::Place(target)));
        }
    }

    /// Assignment target.
    fn place(&mut self, target: ExprId) {
        let target = self.peel(target);
        match self.program.expr(target).kind {
            ExprKind::Ident(symbol) => {
                let captured = self.is_captured(symbol);
                let entry = self.uses.entry(symbol).or_default();
                entry.reassigned = true;
                entry.captured |= captured;
            }
            _ => self.expr(target, Use::Discard),
        }
    }

    // Expressions

    fn expr(&mut self, id: ExprId, usage: Use) {
        let program = self.program;
        ensure_sufficient_stack(|| match &program.expr(id).kind {
            ExprKind::Ident(symbol) => self.use_symbol(*symbol, usage),
            ExprKind::FuncRef(_)
            | ExprKind::Instantiate { .. }
            | ExprKind::Lit(_)
            | ExprKind::FuncLit(_) => {}
            ExprKind::Paren(inner) => self.expr(*inner, usage),
            ExprKind::Unary { operand, .. } => self.expr(*operand, Use::Discard),
            ExprKind::Binary { lhs, rhs, .. } => {
                self.expr(*lhs, Use::Escape);
                self.expr(*rhs, Use::Escape);
            }
            ExprKind::AddressOf(operand) => self.address_of(id, *operand, usage),
            ExprKind::Deref(inner) => self.expr(*inner, Use::Deref),
            ExprKind::Selector { base, .. } => self.selector(id, *base),
            ExprKind::Index { base, index } => {
                let base_use = self.container_use(*base);
                self.expr(*base, base_use);
                self.expr(*index, Use::Escape);
            }
            ExprKind::SliceExpr {
                base,
                low,
                high,
                max,
            } => {
                let base_use = self.container_use(*base);
                self.expr(*base, base_use);
                for bound in [low, high, max].into_iter().flatten() {
                    self.expr(*bound, Use::Discard);
                }
            }
            ExprKind::Call { callee, args, .. } => {
                self.expr(*callee, Use::Discard);
                for &arg in args {
                    self.expr(arg, Use::Escape);
                    self.copies.push((arg, CopyDest::Value));
                }
            }
            ExprKind::BuiltinCall { args, .. } => {
                for &arg in args {
                    self.expr(arg, Use::Escape);
                }
            }
            ExprKind::CompositeLit { elems, .. } => {
                for elem in elems {
                    if let Some(CompositeKey::Index(key)) = elem.key {
                        self.expr(key, Use::Escape);
                    }
                    self.expr(elem.value, Use::Escape);
                    self.copies.push((elem.value, CopyDest::Value));
                }
            }
            ExprKind::Recv(chan) => self.expr(*chan, Use::Discard),
            ExprKind::TypeAssert { operand, .. } | ExprKind::Convert { operand, .. } => {
                self.expr(*operand, Use::Escape);
            }
        });
    }

    fn use_symbol(&mut self, symbol: SymbolId, usage: Use) {
        let captured = self.is_captured(symbol);
        let entry = self.uses.entry(symbol).or_default();
        entry.captured |= captured;
        entry.escaping |= !usage.is_local();
    }

    fn address_of(&mut self, id: ExprId, operand: ExprId, usage: Use) {
        let operand = self.peel(operand);
        let program = self.program;
        match &program.expr(operand).kind {
            ExprKind::Ident(symbol) => self.address_of_symbol(id, *symbol, usage),
            ExprKind::Selector { base, .. } => match self.selected_field(operand) {
                Some(field) => {
                    self.expr(*base, Use::Select);
                    let field = self.model.canonical_field(field);
                    self.address_taken.insert(field);
                    let escaping = !usage.is_local();
                    self.push_event(id, AddressRoot::Field(field), escaping, false);
                    if escaping {
                        self.seeds.push(field);
                    }
                }
                None => self.unsupported(operand, "a method value"),
            },
            ExprKind::Index { base, index } => {
                let base_ty = self.model.expr_type(*base);
                if let Some(construct) = self.unaddressable_element(base_ty) {
                    self.unsupported(operand, construct);
                    return;
                }
                let base_use = self.container_use(*base);
                self.expr(*base, base_use);
                self.expr(*index, Use::Escape);
                self.push_event(id, AddressRoot::Element, !usage.is_local(), false);
            }
            ExprKind::Deref(pointer) => {
                let pointer_use = if usage.is_local() { usage } else { Use::Escape };
                self.expr(*pointer, pointer_use);
                self.push_event(id, AddressRoot::Pointer, !usage.is_local(), false);
            }
            ExprKind::CompositeLit { .. } => {
                self.expr(operand, Use::Escape);
                self.push_event(id, AddressRoot::Composite, !usage.is_local(), false);
            }
            other => self.unsupported(operand, describe(other)),
        }
    }

    fn address_of_symbol(&mut self, id: ExprId, symbol: SymbolId, usage: Use) {
        self.address_taken.insert(symbol);
        match usage {
            u if u.is_local() => {
                self.push_event(id, AddressRoot::Symbol(symbol), false, false);
            }
            // `&p` of a pointer variable always escapes.
            Use::Define(pointer) if !self.is_pointer_symbol(symbol) => {
                let event = self.push_event(id, AddressRoot::Symbol(symbol), false, false);
                self.candidates.push(AliasCandidate {
                    pointer,
                    target: symbol,
                    event,
                });
            }
            _ => {
                self.push_event(id, AddressRoot::Symbol(symbol), true, false);
                self.seeds.push(symbol);
            }
        }
    }

    fn selector(&mut self, id: ExprId, base: ExprId) {
        let model = self.model;
        let Some(selection) = model.selection(id) else {
            self.expr(base, Use::Select);
            return;
        };
        let MemberKind::Method {
            func,
            pointer_receiver: true,
            ..
        } = selection.member.kind
        else {
            self.expr(base, Use::Select);
            return;
        };

        let struct_receiver = self.receiver_is_struct(func);
        match selection.member.path.last() {
            // The embedded pointer is the receiver.
            Some(step) if step.pointer => self.expr(base, Use::Select),
            // `&base.Embedded` is the receiver.
            Some(step) => {
                self.expr(base, Use::Select);
                let field = self.model.canonical_field(step.symbol);
                self.address_taken.insert(field);
                self.push_event(id, AddressRoot::Field(field), !struct_receiver, true);
                if !struct_receiver {
                    self.seeds.push(field);
                }
            }
            // The operand is already a pointer and becomes the receiver.
            None if selection.indirect => {
                let base_use = if struct_receiver { Use::Select } else { Use::Escape };
                self.expr(base, base_use);
            }
            None => {
                self.expr(base, Use::Select);
                self.implicit_address(id, base, func, struct_receiver);
            }
        }
    }

    /// `v.M()` where `M` has a pointer receiver and `v` is not a pointer.
    /// Struct values already have reference identity on the target; any
    /// other addressed root escapes into the method.
    fn implicit_address(&mut self, id: ExprId, base: ExprId, method: FuncId, struct_receiver: bool) {
        let base = self.peel(base);
        let program = self.program;
        let root = match &program.expr(base).kind {
            ExprKind::Ident(symbol) => Some(AddressRoot::Symbol(*symbol)),
            ExprKind::Selector { .. } => self
                .selected_field(base)
                .map(|f| AddressRoot::Field(self.model.canonical_field(f))),
            ExprKind::Index { base: container, .. } => {
                let container_ty = self.model.expr_type(*container);
                self.unaddressable_element(container_ty)
                    .is_none()
                    .then_some(AddressRoot::Element)
            }
            ExprKind::Deref(_) => Some(AddressRoot::Pointer),
            _ => None,
        };
        let Some(root) = root else {
            let construct = match &program.expr(base).kind {
                ExprKind::Index { .. } => "a map element",
                other => describe(other),
            };
            self.problems.push(BoxingProblem::UnaddressableReceiver {
                span: program.expr(id).span,
                method: program.name(program.func(method).name).to_owned(),
                construct,
            });
            return;
        };

        let escaping = !struct_receiver;
        if let AddressRoot::Symbol(s) | AddressRoot::Field(s) = root {
            self.address_taken.insert(s);
            if escaping {
                self.seeds.push(s);
            }
        }
        self.push_event(id, root, escaping, true);
    }

    // Bindings

    /// Remember where a pointer variable's value came from.
    fn bind(&mut self, symbol: SymbolId, value: ExprId) {
        if !self.is_pointer_symbol(symbol) {
            return;
        }
        if let Some(binding) = self.pointer_source(value) {
            self.bindings.entry(symbol).or_default().push(binding);
        }
    }

    fn pointer_source(&self, value: ExprId) -> Option<Binding> {
        match self.program.expr(self.peel(value)).kind {
            ExprKind::AddressOf(inner) => match self.program.expr(self.peel(inner)).kind {
                ExprKind::Ident(target) => Some(Binding::Addr(target)),
                ExprKind::Deref(pointer) => self.pointer_source(pointer),
                _ => None,
            },
            ExprKind::Ident(source) => Some(Binding::Copy(source)),
            _ => None,
        }
    }

    // Resolution

    fn finish(mut self) -> BoxingResult {
        let mut aliases = FxHashMap::default();
        for candidate in std::mem::take(&mut self.candidates) {
            if self.alias_eligible(candidate.pointer) {
                aliases.insert(candidate.pointer, candidate.target);
            } else {
                self.events[candidate.event].escaping = true;
                self.seeds.push(candidate.target);
            }
        }

        let boxed = self.propagate();
        // A boxed pointee is reached through its cell; no rewrite needed.
        aliases.retain(|_, target| !boxed.contains(target));

        let copy_points = self.resolve_copies(&boxed);
        BoxingResult {
            boxed,
            address_taken: self.address_taken,
            aliases,
            events: self.events,
            copy_points,
        }
    }

    fn alias_eligible(&self, pointer: SymbolId) -> bool {
        let symbol = self.program.symbol(pointer);
        if symbol.kind != SymbolKind::Local || self.address_taken.contains(&pointer) {
            return false;
        }
        !self
            .uses
            .get(&pointer)
            .is_some_and(|u| u.escaping || u.captured || u.reassigned)
    }

    fn propagate(&mut self) -> FxHashSet<SymbolId> {
        let mut boxed = FxHashSet::default();
        let mut worklist = std::mem::take(&mut self.seeds);
        while let Some(symbol) = worklist.pop() {
            if !boxed.insert(symbol) {
                continue;
            }
            trace!(
                symbol = self.program.name(self.program.symbol(symbol).name),
                "boxed"
            );
            if self.program.symbol(symbol).kind == SymbolKind::Field {
                let canonical = self.model.canonical_field(symbol);
                worklist.push(canonical);
                worklist.extend(self.model.field_aliases_of(canonical));
            }
            worklist.extend(self.pointees(symbol));
        }
        boxed
    }

    /// Every variable whose address may be stored in `pointer`.
    fn pointees(&self, pointer: SymbolId) -> Vec<SymbolId> {
        let mut out = Vec::new();
        let mut visited = FxHashSet::default();
        let mut stack = vec![pointer];
        while let Some(p) = stack.pop() {
            if !visited.insert(p) {
                continue;
            }
            for binding in self.bindings.get(&p).into_iter().flatten() {
                match *binding {
                    Binding::Addr(target) => out.push(target),
                    Binding::Copy(source) => stack.push(source),
                }
            }
        }
        out
    }

    fn resolve_copies(&self, boxed: &FxHashSet<SymbolId>) -> Vec<CopyPoint> {
        let mut out = Vec::new();
        for &(value, dest) in &self.copies {
            let ty = self.model.expr_type(value);
            if !self.model.category(ty).needs_copy() || self.is_fresh(value) {
                continue;
            }
            let into_cell = match dest {
                CopyDest::Place(target) => self.is_cell(target, boxed),
                CopyDest::Fresh | CopyDest::Value => false,
            };
            out.push(CopyPoint {
                value,
                ty,
                into_cell,
            });
        }
        out
    }

    /// The value is a new aggregate nobody else refers to.
    fn is_fresh(&self, value: ExprId) -> bool {
        matches!(
            self.program.expr(self.peel(value)).kind,
            ExprKind::CompositeLit { .. }
                | ExprKind::Call { .. }
                | ExprKind::BuiltinCall { .. }
                | ExprKind::Recv(_)
        )
    }

    fn is_cell(&self, target: ExprId, boxed: &FxHashSet<SymbolId>) -> bool {
        let target = self.peel(target);
        match self.program.expr(target).kind {
            ExprKind::Ident(symbol) => boxed.contains(&symbol),
            ExprKind::Deref(_) => true,
            ExprKind::Selector { .. } => self
                .selected_field(target)
                .is_some_and(|f| boxed.contains(&self.model.canonical_field(f))),
            _ => false,
        }
    }

    // Helpers

    fn peel(&self, mut id: ExprId) -> ExprId {
        while let ExprKind::Paren(inner) = self.program.expr(id).kind {
            id = inner;
        }
        id
    }

    fn push_event(&mut self, expr: ExprId, root: AddressRoot, escaping: bool, implicit: bool) -> usize {
        self.events.push(AddressEvent {
            expr,
            func: self.func,
            root,
            escaping,
            implicit,
        });
        self.events.len() - 1
    }

    fn unsupported(&mut self, expr: ExprId, construct: &'static str) {
        self.problems.push(BoxingProblem::UnsupportedConstruct {
            span: self.program.expr(expr).span,
            construct,
        });
    }

    fn is_captured(&self, symbol: SymbolId) -> bool {
        let owner = self.program.symbol(symbol).owner;
        owner.is_some() && owner != self.func
    }

    fn is_pointer_symbol(&self, symbol: SymbolId) -> bool {
        self.model.pool().is_pointer(self.model.symbol_type(symbol))
    }

    /// Indexing or slicing a pointer to an array goes through the pointer.
    fn container_use(&self, base: ExprId) -> Use {
        if self.model.pool().is_pointer(self.model.expr_type(base)) {
            Use::Deref
        } else {
            Use::Discard
        }
    }

    fn selected_field(&self, selector: ExprId) -> Option<SymbolId> {
        match self.model.selection(selector)?.member.kind {
            MemberKind::Field { symbol, .. } => Some(symbol),
            MemberKind::Method { .. } | MemberKind::InterfaceMethod { .. } => None,
        }
    }

    fn unaddressable_element(&self, container: Idx) -> Option<&'static str> {
        let pool = self.model.pool();
        match pool.get(pool.underlying(container)) {
            Some(TypeData::Map { .. }) => Some("a map element"),
            Some(TypeData::Basic(BasicKind::String)) => Some("a string byte"),
            _ => None,
        }
    }

    fn receiver_is_struct(&self, method: FuncId) -> bool {
        self.program
            .func(method)
            .receiver
            .and_then(|r| self.model.decl_type(r.decl))
            .is_some_and(|ty| self.model.pool().is_struct(ty))
    }
}

fn describe(kind: &ExprKind) -> &'static str {
    match kind {
        ExprKind::Call { .. } => "a function call result",
        ExprKind::BuiltinCall { .. } => "a builtin call result",
        ExprKind::Lit(_) => "a literal",
        ExprKind::Unary { .. } | ExprKind::Binary { .. } => "an operator expression",
        ExprKind::Recv(_) => "a channel receive",
        ExprKind::TypeAssert { .. } => "a type assertion",
        ExprKind::Convert { .. } => "a conversion",
        ExprKind::FuncRef(_) | ExprKind::Instantiate { .. } | ExprKind::FuncLit(_) => "a function",
        ExprKind::SliceExpr { .. } => "a slice expression",
        ExprKind::Selector { .. } => "a method value",
        ExprKind::Index { .. } => "an index expression",
        ExprKind::CompositeLit { .. } => "a composite literal",
        ExprKind::AddressOf(_) => "an address",
        ExprKind::Ident(_) | ExprKind::Paren(_) | ExprKind::Deref(_) => "an expression",
    }
}
