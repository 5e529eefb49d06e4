//! The finished type and runtime model.
//!
//! Built once by [`build_type_model`](crate::build_type_model) and read-only
//! afterwards: the boxing and async analyses share it by `&` while running in
//! parallel.

use rustc_hash::{FxHashMap, FxHashSet};
use strand_ir::{ExprId, FuncId, Name, StmtId, SymbolId, TypeDeclId};

use crate::{
    FuncSig, GenericInstance, Idx, MethodSet, Pool, RuntimeRegistry, SatisfactionTable, Selection,
    ValueCategory,
};

/// Method declared directly on a named type, with its signature
/// instantiated for the named type's type arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclaredMethod {
    pub name: Name,
    pub func: FuncId,
    pub pointer_receiver: bool,
    pub sig: FuncSig,
}

/// Per named type (or generic instance) data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedInfo {
    pub decl: TypeDeclId,
    pub args: Vec<Idx>,
    pub underlying: Idx,
    pub methods: Vec<DeclaredMethod>,
}

impl NamedInfo {
    /// Named types with methods over a non-struct, non-interface underlying
    /// type are emitted as wrapper classes so they can dispatch methods and
    /// be told apart at type assertions.
    pub fn needs_wrapper(&self, pool: &Pool) -> bool {
        !self.methods.is_empty()
            && !pool.is_struct(self.underlying)
            && !pool.is_interface(self.underlying)
    }
}

/// A type assertion `x.(T)` or one type of a type-switch case.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssertionSite {
    Expr(ExprId),
    TypeCase { stmt: StmtId, case: u32, index: u32 },
}

/// What is statically known about an assertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssertionOutcome {
    /// Succeeds for every non-nil operand.
    AlwaysSucceeds,
    /// No dynamic type of the operand can satisfy the target.
    AlwaysFails,
    /// Depends on the dynamic type; `candidates` are the program's concrete
    /// types that satisfy both the operand and the target type.
    Dynamic { candidates: Vec<Idx> },
}

#[derive(Debug, Default)]
pub struct TypeModel {
    pub(crate) pool: Pool,
    pub(crate) named: FxHashMap<Idx, NamedInfo>,
    /// Type parameter `Idx` to its constraint interface.
    pub(crate) constraints: FxHashMap<Idx, Idx>,
    pub(crate) expr_types: Vec<Idx>,
    pub(crate) symbol_types: Vec<Idx>,
    pub(crate) func_sigs: Vec<Idx>,
    pub(crate) selections: FxHashMap<ExprId, Selection>,
    pub(crate) method_sets: FxHashMap<Idx, MethodSet>,
    pub(crate) satisfaction: SatisfactionTable,
    pub(crate) assertions: FxHashMap<AssertionSite, AssertionOutcome>,
    pub(crate) instances: Vec<GenericInstance>,
    pub(crate) registry: RuntimeRegistry,
    pub(crate) field_aliases: FxHashMap<SymbolId, SymbolId>,
    pub(crate) open_interfaces: FxHashSet<Idx>,
}

impl TypeModel {
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Resolved type of an expression.
    #[inline]
    pub fn expr_type(&self, expr: ExprId) -> Idx {
        self.expr_types.get(expr.index()).copied().unwrap_or(Idx::NONE)
    }

    #[inline]
    pub fn symbol_type(&self, symbol: SymbolId) -> Idx {
        self.symbol_types.get(symbol.index()).copied().unwrap_or(Idx::NONE)
    }

    /// Signature type of a function (without receiver).
    #[inline]
    pub fn func_sig(&self, func: FuncId) -> Idx {
        self.func_sigs.get(func.index()).copied().unwrap_or(Idx::NONE)
    }

    pub fn expr_types(&self) -> &[Idx] {
        &self.expr_types
    }

    pub fn named_info(&self, named: Idx) -> Option<&NamedInfo> {
        self.named.get(&named)
    }

    pub fn named_types(&self) -> impl Iterator<Item = (Idx, &NamedInfo)> {
        self.named.iter().map(|(&idx, info)| (idx, info))
    }

    /// The type a declaration introduces: for generic declarations, the
    /// instance over its own type parameters.
    pub fn decl_type(&self, decl: TypeDeclId) -> Option<Idx> {
        self.named
            .iter()
            .find(|(_, info)| {
                info.decl == decl && info.args.iter().all(|&a| self.pool.is_type_param(a))
            })
            .map(|(&idx, _)| idx)
    }

    pub fn constraint_of(&self, type_param: Idx) -> Option<Idx> {
        self.constraints.get(&type_param).copied()
    }

    #[inline]
    pub fn category(&self, ty: Idx) -> ValueCategory {
        self.pool.category(ty)
    }

    /// Resolved selector, if `expr` is a selector expression.
    pub fn selection(&self, expr: ExprId) -> Option<&Selection> {
        self.selections.get(&expr)
    }

    pub fn selections(&self) -> &FxHashMap<ExprId, Selection> {
        &self.selections
    }

    pub fn satisfaction(&self) -> &SatisfactionTable {
        &self.satisfaction
    }

    pub fn assertion(&self, site: AssertionSite) -> Option<&AssertionOutcome> {
        self.assertions.get(&site)
    }

    pub fn assertions(&self) -> &FxHashMap<AssertionSite, AssertionOutcome> {
        &self.assertions
    }

    pub fn instances(&self) -> &[GenericInstance] {
        &self.instances
    }

    pub fn registry(&self) -> &RuntimeRegistry {
        &self.registry
    }

    /// Canonical symbol of a struct field. Structurally identical anonymous
    /// struct types share one descriptor; their fields share the symbols of
    /// the first declaration.
    pub fn canonical_field(&self, field: SymbolId) -> SymbolId {
        self.field_aliases.get(&field).copied().unwrap_or(field)
    }

    /// Declared field symbols that alias `canonical` (not including itself).
    pub fn field_aliases_of(&self, canonical: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        self.field_aliases
            .iter()
            .filter(move |&(_, &c)| c == canonical)
            .map(|(&alias, _)| alias)
    }

    /// Whether implementations of this interface may exist outside the program.
    pub fn is_open_interface(&self, iface: Idx) -> bool {
        self.open_interfaces.contains(&iface)
    }

    /// Declared functions that an interface method call may dispatch to:
    /// the concrete methods behind every satisfying type, following methods
    /// promoted from embedded interfaces.
    pub fn method_targets(&self, iface: Idx, method: Name) -> Vec<FuncId> {
        let mut out = Vec::new();
        let mut visited = FxHashSet::default();
        self.collect_targets(iface, method, &mut visited, &mut out);
        out.sort_unstable();
        out.dedup();
        out
    }

    fn collect_targets(&self, iface: Idx, method: Name, visited: &mut FxHashSet<Idx>, out: &mut Vec<FuncId>) {
        if !visited.insert(iface) {
            return;
        }
        for &concrete in self.satisfaction.implementors(iface) {
            let Some(entry) = self.satisfaction.get(concrete, iface) else {
                continue;
            };
            for thunk in entry.thunks.iter().filter(|t| t.name == method) {
                match thunk.kind {
                    crate::MemberKind::Method { func, .. } => out.push(func),
                    crate::MemberKind::InterfaceMethod { iface: inner, .. } => {
                        self.collect_targets(inner, method, visited, out);
                    }
                    crate::MemberKind::Field { .. } => {}
                }
            }
        }
    }
}
