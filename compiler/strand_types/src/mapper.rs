//! Builds the [`TypeModel`] from a typed program.
//!
//! Runs in three phases:
//!
//! 1. **Lowering**: every type expression is interned into the pool; named
//!    types are interned by `(decl, args)` without touching their bodies.
//! 2. **Expansion**: underlying types and method signatures of named types
//!    (including generic instances discovered along the way) are resolved
//!    until no pending named type remains.
//! 3. **Derivation**: read-only over the finished pool: method sets,
//!    satisfaction table, selector resolution, constraint checks, assertion
//!    outcomes and the runtime registry.

use rustc_hash::{FxHashMap, FxHashSet};
use strand_ir::{
    ensure_sufficient_stack, ExprKind, FieldDecl, FuncId, GenericOwner, InterfaceDecl, Program, Signature,
    Span, StmtId, StmtKind, TypeDeclId, TypeExprId, TypeExprKind, TypeParamDecl,
};
use tracing::{debug, trace};

use crate::generics::ConstraintViolation;
use crate::registry::build_registry;
use crate::{
    AssertionSite, DeclaredMethod, FieldInfo, FuncSig, GenericInstance, Idx, InterfaceInfo,
    MethodSig, NamedInfo, SelectError, TypeData, TypeModel, TypeProblem, TypeTerm,
};

/// Upper bound on named-type expansion rounds. Each round resolves the named
/// types interned by the previous one; a generic type that keeps producing
/// new instances of itself never converges.
const MAX_EXPANSION_ROUNDS: usize = 64;

/// Build the type model, or every problem that prevents it.
pub fn build_type_model(program: &Program) -> Result<TypeModel, Vec<TypeProblem>> {
    let mut mapper = TypeMapper::new(program);
    mapper.lower_program();
    mapper.expand_named();
    mapper.derive_tables();
    mapper.finish()
}

/// Constraint check deferred until the pool is complete.
struct PendingCheck {
    instance: usize,
    param: usize,
    constraint: Idx,
}

struct TypeMapper<'p> {
    program: &'p Program,
    model: TypeModel,
    memo: Vec<Option<Idx>>,
    /// Named types whose underlying type is being resolved.
    resolving: FxHashSet<Idx>,
    /// Alias declarations being expanded.
    aliases: FxHashSet<TypeDeclId>,
    /// First source position of each named type.
    named_spans: FxHashMap<Idx, Span>,
    instance_keys: FxHashMap<(GenericOwner, Vec<Idx>), usize>,
    pending_checks: Vec<PendingCheck>,
    problems: Vec<TypeProblem>,
}

impl<'p> TypeMapper<'p> {
    fn new(program: &'p Program) -> Self {
        TypeMapper {
            program,
            model: TypeModel::default(),
            memo: vec![None; program.type_expr_ids().count()],
            resolving: FxHashSet::default(),
            aliases: FxHashSet::default(),
            named_spans: FxHashMap::default(),
            instance_keys: FxHashMap::default(),
            pending_checks: Vec::new(),
            problems: Vec::new(),
        }
    }

    fn finish(self) -> Result<TypeModel, Vec<TypeProblem>> {
        if self.problems.is_empty() {
            debug!(
                types = self.model.pool.len(),
                named = self.model.named.len(),
                instances = self.model.instances.len(),
                "type model built"
            );
            Ok(self.model)
        } else {
            debug!(problems = self.problems.len(), "type model failed");
            Err(self.problems)
        }
    }

    // Phase 1: lowering

    fn lower_program(&mut self) {
        let program = self.program;

        for decl in program.decl_ids() {
            let d = program.decl(decl);
            if d.alias {
                continue;
            }
            let args = self.identity_args(GenericOwner::Type(decl), d.type_params.len());
            let idx = self.model.pool.intern(TypeData::Named { decl, args });
            self.named_spans.entry(idx).or_insert(d.span);
            self.lower_constraints(GenericOwner::Type(decl), &d.type_params);
        }

        self.model.func_sigs = program
            .func_ids()
            .map(|f| {
                let func = program.func(f);
                self.lower_constraints(GenericOwner::Func(f), &func.type_params);
                self.lower(func.sig, func.span)
            })
            .collect();

        self.model.symbol_types = program
            .symbol_ids()
            .map(|s| {
                let sym = program.symbol(s);
                self.lower(sym.ty, sym.span)
            })
            .collect();

        // Type expressions not reachable from a typed node (type-switch
        // cases, conversion targets) are lowered here too.
        for id in program.type_expr_ids() {
            let span = program.type_expr(id).span;
            self.lower(id, span);
        }

        self.model.expr_types = program
            .expr_ids()
            .map(|e| {
                let expr = program.expr(e);
                self.lower(expr.ty, expr.span)
            })
            .collect();

        for e in program.expr_ids() {
            let expr = program.expr(e);
            if let ExprKind::Instantiate { func, type_args } = &expr.kind {
                self.instantiate_func(*func, type_args, expr.span);
            }
        }

        trace!(types = self.model.pool.len(), "lowering done");
    }

    fn identity_args(&mut self, owner: GenericOwner, count: usize) -> Vec<Idx> {
        (0..count)
            .map(|i| {
                let index = u32::try_from(i).unwrap_or(u32::MAX);
                self.model.pool.intern(TypeData::TypeParam { owner, index })
            })
            .collect()
    }

    fn lower_constraints(&mut self, owner: GenericOwner, params: &[TypeParamDecl]) {
        let ids = self.identity_args(owner, params.len());
        for (param, tp) in params.iter().zip(ids) {
            let constraint = self.lower(param.constraint, param.span);
            if constraint.is_none() {
                continue;
            }
            self.ensure_named(constraint);
            self.model.constraints.insert(tp, constraint);
        }
    }

    /// Intern a type expression. Reports and returns `NONE` when it cannot
    /// be resolved.
    fn lower(&mut self, id: TypeExprId, span: Span) -> Idx {
        if let Some(Some(idx)) = self.memo.get(id.index()) {
            return *idx;
        }
        let Some(node) = self.program.get_type_expr(id) else {
            self.problems.push(TypeProblem::UnresolvedType {
                span,
                detail: "expression has no resolved type".to_owned(),
            });
            return Idx::NONE;
        };
        let idx = ensure_sufficient_stack(|| self.lower_kind(&node.kind, node.span));
        if let Some(slot) = self.memo.get_mut(id.index()) {
            *slot = Some(idx);
        }
        idx
    }

    fn lower_list(&mut self, ids: &[TypeExprId], span: Span) -> Option<Vec<Idx>> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            let idx = self.lower(id, span);
            if idx.is_none() {
                return None;
            }
            out.push(idx);
        }
        Some(out)
    }

    fn lower_sig(&mut self, sig: &Signature, span: Span) -> Option<FuncSig> {
        Some(FuncSig {
            params: self.lower_list(&sig.params, span)?,
            results: self.lower_list(&sig.results, span)?,
            variadic: sig.variadic,
        })
    }

    fn lower_kind(&mut self, kind: &TypeExprKind, span: Span) -> Idx {
        match kind {
            TypeExprKind::Basic(basic) => Idx::basic(*basic),
            TypeExprKind::Nil => Idx::NIL,
            TypeExprKind::Named { decl, args } => self.lower_named(*decl, args, span),
            TypeExprKind::Interface(iface) => self.lower_interface(iface, span),
            TypeExprKind::Struct(fields) => self.lower_struct(fields),
            _ => match self.lower_structural(kind, span) {
                Some(data) => self.model.pool.intern(data),
                None => Idx::NONE,
            },
        }
    }

    /// Descriptors built directly from their lowered children.
    fn lower_structural(&mut self, kind: &TypeExprKind, span: Span) -> Option<TypeData> {
        let data = match kind {
            TypeExprKind::TypeParam { owner, index } => TypeData::TypeParam {
                owner: *owner,
                index: *index,
            },
            TypeExprKind::Pointer(elem) => TypeData::Pointer(self.lower_child(*elem, span)?),
            TypeExprKind::Slice(elem) => TypeData::Slice(self.lower_child(*elem, span)?),
            TypeExprKind::Array { elem, len } => TypeData::Array {
                elem: self.lower_child(*elem, span)?,
                len: *len,
            },
            TypeExprKind::Map { key, value } => TypeData::Map {
                key: self.lower_child(*key, span)?,
                value: self.lower_child(*value, span)?,
            },
            TypeExprKind::Chan { elem, dir } => TypeData::Chan {
                elem: self.lower_child(*elem, span)?,
                dir: *dir,
            },
            TypeExprKind::Func(sig) => TypeData::Func(self.lower_sig(sig, span)?),
            TypeExprKind::Tuple(elems) => TypeData::Tuple(self.lower_list(elems, span)?),
            TypeExprKind::Basic(_)
            | TypeExprKind::Nil
            | TypeExprKind::Named { .. }
            | TypeExprKind::Interface(_)
            | TypeExprKind::Struct(_) => return None,
        };
        Some(data)
    }

    fn lower_named(&mut self, decl: TypeDeclId, args: &[TypeExprId], span: Span) -> Idx {
        let program = self.program;
        let Some(d) = program.get_decl(decl) else {
            self.problems.push(TypeProblem::UnresolvedType {
                span,
                detail: format!("unknown type declaration {decl:?}"),
            });
            return Idx::NONE;
        };

        if d.alias {
            if !self.aliases.insert(decl) {
                self.problems.push(TypeProblem::RecursiveType {
                    span: d.span,
                    name: program.qualified_decl_name(decl),
                });
                return Idx::NONE;
            }
            let target = self.lower(d.underlying, d.span);
            self.aliases.remove(&decl);
            return target;
        }

        let args = if args.is_empty() {
            self.identity_args(GenericOwner::Type(decl), d.type_params.len())
        } else {
            if args.len() != d.type_params.len() {
                self.problems.push(TypeProblem::TypeArgCount {
                    span,
                    generic: program.qualified_decl_name(decl),
                    expected: d.type_params.len(),
                    found: args.len(),
                });
                return Idx::NONE;
            }
            let Some(args) = self.lower_list(args, span) else {
                return Idx::NONE;
            };
            args
        };
        let idx = self.model.pool.intern(TypeData::Named { decl, args });
        self.named_spans.entry(idx).or_insert(span);
        idx
    }

    fn lower_struct(&mut self, fields: &[FieldDecl]) -> Idx {
        let mut infos = Vec::with_capacity(fields.len());
        for field in fields {
            let ty = self.lower(field.ty, field.span);
            if ty.is_none() {
                return Idx::NONE;
            }
            infos.push(FieldInfo {
                name: field.name,
                ty,
                embedded: field.embedded,
            });
        }
        let idx = self.model.pool.intern(TypeData::Struct(infos));
        let declared: Vec<_> = fields.iter().map(|f| f.symbol).collect();
        self.model.pool.record_field_symbols(idx, declared.clone());

        // A structurally identical struct declared earlier owns the canonical
        // field symbols; later declarations alias them.
        let canonical = self.model.pool.field_symbols(idx).to_vec();
        for (decl_sym, canon) in declared.into_iter().zip(canonical) {
            if decl_sym != canon && decl_sym.is_valid() {
                self.model.field_aliases.insert(decl_sym, canon);
            }
        }
        idx
    }

    fn lower_interface(&mut self, iface: &InterfaceDecl, span: Span) -> Idx {
        let mut info = InterfaceInfo {
            comparable: iface.comparable,
            ..InterfaceInfo::default()
        };
        for m in &iface.methods {
            let Some(sig) = self.lower_sig(&m.sig, m.span) else {
                return Idx::NONE;
            };
            info.methods.push(MethodSig { name: m.name, sig });
        }
        let mut unrestricted = false;
        for term in &iface.union {
            let ty = self.lower(term.ty, span);
            if ty.is_none() {
                return Idx::NONE;
            }
            // A constraint interface in a union contributes its own type set.
            self.ensure_named(ty);
            match self.model.pool.interface(ty) {
                Some(inner) if inner.terms.is_empty() => unrestricted = true,
                Some(inner) => info.terms.extend(inner.terms.iter().copied()),
                None => info.terms.push(TypeTerm {
                    tilde: term.tilde,
                    ty,
                }),
            }
        }
        if unrestricted {
            info.terms.clear();
        }
        for &embedded in &iface.embedded {
            let ty = self.lower(embedded, span);
            if ty.is_none() {
                return Idx::NONE;
            }
            self.ensure_named(ty);
            match self.model.pool.interface(ty).cloned() {
                Some(inner) => {
                    info.methods.extend(inner.methods);
                    info.comparable |= inner.comparable;
                    if info.terms.is_empty() {
                        info.terms = inner.terms;
                    } else if !inner.terms.is_empty() {
                        info.terms.retain(|t| inner.terms.contains(t));
                    }
                }
                None => info.terms.push(TypeTerm { tilde: false, ty }),
            }
        }
        info.methods.sort_by(|a, b| a.name.cmp(&b.name));
        info.terms.dedup();
        for pair in info.methods.windows(2) {
            if pair[0].name == pair[1].name && pair[0].sig != pair[1].sig {
                let pool = &self.model.pool;
                let method = self.program.name(pair[0].name).to_owned();
                self.problems.push(TypeProblem::DuplicateMethod {
                    span,
                    first: format!("{method}{}", pool.display_sig(&pair[0].sig, self.program)),
                    second: format!("{method}{}", pool.display_sig(&pair[1].sig, self.program)),
                    method,
                });
            }
        }
        info.methods.dedup_by(|a, b| a.name == b.name);
        self.model.pool.intern(TypeData::Interface(info))
    }

    fn lower_child(&mut self, id: TypeExprId, span: Span) -> Option<Idx> {
        let idx = self.lower(id, span);
        (!idx.is_none()).then_some(idx)
    }

    // Substitution

    /// Replace the type parameters of `owner` in `ty` by `args`.
    fn substitute(&mut self, ty: Idx, owner: GenericOwner, args: &[Idx]) -> Idx {
        if ty.is_none() || !self.model.pool.flags(ty).has_type_param() {
            return ty;
        }
        let data = self.model.pool.data(ty).clone();
        ensure_sufficient_stack(|| self.substitute_data(ty, data, owner, args))
    }

    fn substitute_list(&mut self, items: &[Idx], owner: GenericOwner, args: &[Idx]) -> Vec<Idx> {
        items.iter().map(|&t| self.substitute(t, owner, args)).collect()
    }

    fn substitute_sig(&mut self, sig: &FuncSig, owner: GenericOwner, args: &[Idx]) -> FuncSig {
        FuncSig {
            params: self.substitute_list(&sig.params, owner, args),
            results: self.substitute_list(&sig.results, owner, args),
            variadic: sig.variadic,
        }
    }

    fn substitute_data(&mut self, ty: Idx, data: TypeData, owner: GenericOwner, args: &[Idx]) -> Idx {
        let new = match data {
            TypeData::TypeParam { owner: o, index } if o == owner => {
                return args.get(index as usize).copied().unwrap_or(ty);
            }
            TypeData::TypeParam { .. } | TypeData::Basic(_) | TypeData::Nil => return ty,
            TypeData::Named { decl, args: inner } => TypeData::Named {
                decl,
                args: self.substitute_list(&inner, owner, args),
            },
            TypeData::Pointer(elem) => TypeData::Pointer(self.substitute(elem, owner, args)),
            TypeData::Slice(elem) => TypeData::Slice(self.substitute(elem, owner, args)),
            TypeData::Array { elem, len } => TypeData::Array {
                elem: self.substitute(elem, owner, args),
                len,
            },
            TypeData::Map { key, value } => TypeData::Map {
                key: self.substitute(key, owner, args),
                value: self.substitute(value, owner, args),
            },
            TypeData::Chan { elem, dir } => TypeData::Chan {
                elem: self.substitute(elem, owner, args),
                dir,
            },
            TypeData::Func(sig) => TypeData::Func(self.substitute_sig(&sig, owner, args)),
            TypeData::Tuple(elems) => TypeData::Tuple(self.substitute_list(&elems, owner, args)),
            TypeData::Struct(fields) => {
                let fields = fields
                    .into_iter()
                    .map(|f| FieldInfo {
                        ty: self.substitute(f.ty, owner, args),
                        ..f
                    })
                    .collect();
                let new = self.model.pool.intern(TypeData::Struct(fields));
                let symbols = self.model.pool.field_symbols(ty).to_vec();
                self.model.pool.record_field_symbols(new, symbols);
                return new;
            }
            TypeData::Interface(info) => {
                let methods = info
                    .methods
                    .into_iter()
                    .map(|m| MethodSig {
                        name: m.name,
                        sig: self.substitute_sig(&m.sig, owner, args),
                    })
                    .collect();
                let terms = info
                    .terms
                    .into_iter()
                    .map(|t| TypeTerm {
                        tilde: t.tilde,
                        ty: self.substitute(t.ty, owner, args),
                    })
                    .collect();
                TypeData::Interface(InterfaceInfo {
                    methods,
                    terms,
                    comparable: info.comparable,
                })
            }
        };
        let idx = self.model.pool.intern(new);
        if let Some(&span) = self.named_spans.get(&ty) {
            self.named_spans.entry(idx).or_insert(span);
        }
        idx
    }

    // Phase 2: expansion

    fn instantiate_func(&mut self, func: FuncId, type_args: &[TypeExprId], span: Span) {
        let program = self.program;
        let Some(f) = program.get_func(func) else {
            return;
        };
        if type_args.len() != f.type_params.len() {
            self.problems.push(TypeProblem::TypeArgCount {
                span,
                generic: program.qualified_name(func),
                expected: f.type_params.len(),
                found: type_args.len(),
            });
            return;
        }
        let Some(args) = self.lower_list(type_args, span) else {
            return;
        };
        let sig = self.model.func_sig(func);
        let owner = GenericOwner::Func(func);
        let ty = self.substitute(sig, owner, &args);
        self.add_instance(owner, args, ty, span, &f.type_params);
    }

    fn add_instance(
        &mut self,
        owner: GenericOwner,
        args: Vec<Idx>,
        ty: Idx,
        span: Span,
        params: &[TypeParamDecl],
    ) -> bool {
        if self.instance_keys.contains_key(&(owner, args.clone())) {
            return false;
        }
        let instance = self.model.instances.len();
        for (param, decl) in params.iter().enumerate() {
            let constraint = self.lower(decl.constraint, decl.span);
            if constraint.is_none() {
                continue;
            }
            let constraint = self.substitute(constraint, owner, &args);
            self.pending_checks.push(PendingCheck {
                instance,
                param,
                constraint,
            });
        }
        self.instance_keys.insert((owner, args.clone()), instance);
        trace!(?owner, ?args, "generic instance");
        self.model.instances.push(GenericInstance {
            owner,
            args,
            ty,
            span,
        });
        true
    }

    /// Record every concrete instance of a generic named type.
    fn collect_type_instances(&mut self) -> bool {
        let program = self.program;
        let found: Vec<(Idx, TypeDeclId, Vec<Idx>)> = self
            .model
            .pool
            .iter()
            .filter_map(|(idx, data)| match data {
                TypeData::Named { decl, args } if !args.is_empty() => {
                    Some((idx, *decl, args.clone()))
                }
                _ => None,
            })
            .filter(|(idx, ..)| !self.model.pool.flags(*idx).has_type_param())
            .collect();

        let mut added = false;
        for (idx, decl, args) in found {
            let span = self.named_spans.get(&idx).copied().unwrap_or(Span::DUMMY);
            let params = &program.decl(decl).type_params;
            added |= self.add_instance(GenericOwner::Type(decl), args, idx, span, params);
        }
        added
    }

    fn expand_named(&mut self) {
        for round in 0.. {
            let pending: Vec<Idx> = self
                .model
                .pool
                .iter()
                .filter(|(idx, data)| {
                    matches!(data, TypeData::Named { .. }) && !self.model.pool.has_underlying(*idx)
                })
                .map(|(idx, _)| idx)
                .collect();
            for &idx in &pending {
                self.ensure_named(idx);
            }
            let added = self.collect_type_instances();
            if pending.is_empty() && !added {
                trace!(rounds = round, "named expansion converged");
                return;
            }
            if round == MAX_EXPANSION_ROUNDS {
                let (span, name) = pending.first().map_or((Span::DUMMY, String::new()), |&idx| {
                    (
                        self.named_spans.get(&idx).copied().unwrap_or(Span::DUMMY),
                        self.model.pool.display(idx, self.program),
                    )
                });
                self.problems.push(TypeProblem::RecursiveType { span, name });
                return;
            }
        }
    }

    /// Resolve the underlying type and methods of a named type.
    fn ensure_named(&mut self, idx: Idx) {
        if self.model.pool.has_underlying(idx) {
            return;
        }
        let Some(TypeData::Named { decl, args }) = self.model.pool.get(idx).cloned() else {
            return;
        };
        let program = self.program;
        let d = program.decl(decl);

        if !self.resolving.insert(idx) {
            self.problems.push(TypeProblem::RecursiveType {
                span: d.span,
                name: program.qualified_decl_name(decl),
            });
            self.model.pool.set_underlying(idx, Idx::NONE);
            return;
        }

        let underlying = if d.underlying.is_valid() {
            let owner = GenericOwner::Type(decl);
            let base = self.lower(d.underlying, d.span);
            let mut underlying = self.substitute(base, owner, &args);
            if self.model.pool.is_named(underlying) {
                ensure_sufficient_stack(|| self.ensure_named(underlying));
                underlying = self.model.pool.underlying(underlying);
            }
            underlying
        } else {
            self.problems.push(TypeProblem::UnresolvedType {
                span: d.span,
                detail: format!("type `{}` has no underlying type", program.qualified_decl_name(decl)),
            });
            Idx::NONE
        };
        self.resolving.remove(&idx);
        if !self.model.pool.has_underlying(idx) {
            self.model.pool.set_underlying(idx, underlying);
        }

        let owner = GenericOwner::Type(decl);
        let mut methods = Vec::with_capacity(d.methods.len());
        for &method in &d.methods {
            let func = program.func(method);
            let sig = self.lower(func.sig, func.span);
            let sig = self.substitute(sig, owner, &args);
            methods.push(DeclaredMethod {
                name: func.name,
                func: method,
                pointer_receiver: func.receiver.is_some_and(|r| r.pointer),
                sig: self.model.pool.func_sig(sig).cloned().unwrap_or_default(),
            });
        }
        methods.sort_by(|a, b| a.name.cmp(&b.name));

        self.model.named.insert(
            idx,
            NamedInfo {
                decl,
                args,
                underlying: self.model.pool.underlying(idx),
                methods,
            },
        );
    }

    // Phase 3: derivation

    fn derive_tables(&mut self) {
        let program = self.program;

        for decl in program.decl_ids() {
            let d = program.decl(decl);
            if d.open && !d.alias {
                let args = self.identity_args(GenericOwner::Type(decl), d.type_params.len());
                let idx = self.model.pool.intern(TypeData::Named { decl, args });
                self.model.open_interfaces.insert(idx);
                let underlying = self.model.pool.underlying(idx);
                if !underlying.is_none() {
                    self.model.open_interfaces.insert(underlying);
                }
            }
        }

        let concrete = self.concrete_types();
        let promoting = self.promoting_structs();
        let interfaces = self.interface_types();

        let mut sets = Vec::with_capacity(concrete.len() + promoting.len() + interfaces.len());
        for &ty in concrete.iter().chain(&promoting).chain(&interfaces) {
            sets.push((ty, self.model.compute_method_set(ty)));
        }
        self.model.method_sets.extend(sets);

        for &ty in concrete.iter().chain(&promoting) {
            for &iface in &interfaces {
                let entry = self.model.check_satisfaction(ty, iface);
                self.model.satisfaction.insert(ty, iface, entry);
            }
        }
        debug!(
            concrete = concrete.len(),
            interfaces = interfaces.len(),
            entries = self.model.satisfaction.len(),
            "satisfaction table built"
        );

        self.resolve_selections();
        self.check_constraints();
        self.resolve_assertions();
        self.model.registry = build_registry(&self.model, program, &concrete);
    }

    /// Concrete named non-interface types and the pointers to them.
    fn concrete_types(&mut self) -> Vec<Idx> {
        let pool = &self.model.pool;
        let mut named: Vec<Idx> = self
            .model
            .named
            .keys()
            .copied()
            .filter(|&idx| {
                !pool.flags(idx).has_type_param()
                    && !pool.underlying(idx).is_none()
                    && !pool.is_interface(idx)
            })
            .collect();
        named.sort_unstable();

        let mut out = Vec::with_capacity(named.len() * 2);
        for idx in named {
            out.push(idx);
            if !self.model.pool.is_pointer(idx) {
                out.push(self.model.pool.intern(TypeData::Pointer(idx)));
            }
        }
        out
    }

    /// Unnamed struct types that promote methods from embedded fields, and
    /// the pointers to them. Their values reach interfaces without a name.
    fn promoting_structs(&mut self) -> Vec<Idx> {
        let pool = &self.model.pool;
        let structs: Vec<Idx> = pool
            .iter()
            .filter(|&(idx, data)| {
                matches!(data, TypeData::Struct(fields) if fields.iter().any(|f| f.embedded))
                    && !pool.flags(idx).has_type_param()
            })
            .map(|(idx, _)| idx)
            .collect();

        let mut out = Vec::with_capacity(structs.len() * 2);
        for idx in structs {
            out.push(idx);
            out.push(self.model.pool.intern(TypeData::Pointer(idx)));
        }
        out
    }

    /// Ordinary interface types (named or literal) without type parameters.
    fn interface_types(&self) -> Vec<Idx> {
        let pool = &self.model.pool;
        pool.iter()
            .map(|(idx, _)| idx)
            .filter(|&idx| {
                !pool.flags(idx).has_type_param()
                    && pool.interface(idx).is_some_and(InterfaceInfo::is_basic)
            })
            .collect()
    }

    fn resolve_selections(&mut self) {
        let program = self.program;
        for e in program.expr_ids() {
            let expr = program.expr(e);
            let ExprKind::Selector { base, name } = expr.kind else {
                continue;
            };
            let base_ty = self.model.expr_type(base);
            if base_ty.is_none() {
                continue;
            }
            match self.model.select(base_ty, name) {
                Ok(selection) => {
                    self.model.selections.insert(e, selection);
                }
                Err(SelectError::NotFound) => self.problems.push(TypeProblem::UnresolvedMember {
                    span: expr.span,
                    member: program.name(name).to_owned(),
                    ty: self.model.pool.display(base_ty, program),
                }),
                Err(SelectError::Ambiguous { depth, candidates }) => {
                    self.problems.push(TypeProblem::AmbiguousPromotion {
                        span: expr.span,
                        member: program.name(name).to_owned(),
                        ty: self.model.pool.display(base_ty, program),
                        depth,
                        candidates: candidates.iter().map(|m| m.span(program)).collect(),
                    });
                }
            }
        }
    }

    fn check_constraints(&mut self) {
        let program = self.program;
        for check in &self.pending_checks {
            let instance = &self.model.instances[check.instance];
            let Some(&arg) = instance.args.get(check.param) else {
                continue;
            };
            let Err(violation) = self.model.check_constraint(arg, check.constraint) else {
                continue;
            };
            let (generic, param) = match instance.owner {
                GenericOwner::Func(f) => (
                    program.qualified_name(f),
                    program.func(f).type_params.get(check.param).map(|p| p.name),
                ),
                GenericOwner::Type(d) => (
                    program.qualified_decl_name(d),
                    program.decl(d).type_params.get(check.param).map(|p| p.name),
                ),
            };
            let reason = match violation {
                ConstraintViolation::MissingMethod(name) => {
                    format!("missing method `{}`", program.name(name))
                }
                ConstraintViolation::NotInTypeSet => "not in the constraint's type set".to_owned(),
                ConstraintViolation::NotComparable => "type is not comparable".to_owned(),
            };
            self.problems.push(TypeProblem::UnsatisfiableConstraint {
                span: instance.span,
                param: format!("{generic}.{}", param.map_or("?", |p| program.name(p))),
                arg: self.model.pool.display(arg, program),
                reason,
            });
        }
    }

    fn resolve_assertions(&mut self) {
        let program = self.program;
        let mut outcomes = Vec::new();

        for e in program.expr_ids() {
            if let ExprKind::TypeAssert { operand, target, .. } = program.expr(e).kind {
                let operand_ty = self.model.expr_type(operand);
                let target_ty = self.memo_type(target);
                if !operand_ty.is_none() && !target_ty.is_none() {
                    outcomes.push((AssertionSite::Expr(e), operand_ty, target_ty));
                }
            }
        }

        for s in (0..program.stmt_count()).map(StmtId::from_usize) {
            let StmtKind::TypeSwitch { subject, cases, .. } = &program.stmt(s).kind else {
                continue;
            };
            let operand_ty = self.model.expr_type(*subject);
            if operand_ty.is_none() {
                continue;
            }
            for (case, clause) in cases.iter().enumerate() {
                for (index, &target) in clause.types.iter().enumerate() {
                    let target_ty = self.memo_type(target);
                    if target_ty.is_none() {
                        continue;
                    }
                    let site = AssertionSite::TypeCase {
                        stmt: s,
                        case: u32::try_from(case).unwrap_or(u32::MAX),
                        index: u32::try_from(index).unwrap_or(u32::MAX),
                    };
                    outcomes.push((site, operand_ty, target_ty));
                }
            }
        }

        for (site, operand, target) in outcomes {
            let outcome = self.model.assertion_outcome(operand, target);
            self.model.assertions.insert(site, outcome);
        }
    }

    /// Already-lowered type of a type expression.
    fn memo_type(&self, id: TypeExprId) -> Idx {
        self.memo.get(id.index()).copied().flatten().unwrap_or(Idx::NONE)
    }
}
