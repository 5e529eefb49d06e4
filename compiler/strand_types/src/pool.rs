//! Type pool: the single owner of every type descriptor.
//!
//! # Design
//!
//! - Every descriptor is interned once; `Idx` equality is type identity.
//! - Basic types and `nil` are pre-interned at fixed indices.
//! - Named types are interned by `(decl, args)`; their underlying type is
//!   attached afterwards with [`Pool::set_underlying`], which is what makes
//!   recursive types representable.

use std::fmt::Write as _;

use rustc_hash::{FxHashMap, FxHashSet};
use strand_ir::{BasicKind, ChanDir, GenericOwner, Program, SymbolId};

use crate::{FieldInfo, FuncSig, Idx, InterfaceInfo, TypeData, TypeFlags, ValueCategory};

#[derive(Clone, Debug)]
pub struct Pool {
    items: Vec<TypeData>,
    flags: Vec<TypeFlags>,
    map: FxHashMap<TypeData, Idx>,
    underlying: FxHashMap<Idx, Idx>,
    field_symbols: FxHashMap<Idx, Vec<SymbolId>>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    pub fn new() -> Self {
        let mut pool = Pool {
            items: Vec::with_capacity(256),
            flags: Vec::with_capacity(256),
            map: FxHashMap::default(),
            underlying: FxHashMap::default(),
            field_symbols: FxHashMap::default(),
        };
        for kind in BasicKind::ALL {
            pool.intern(TypeData::Basic(kind));
        }
        pool.intern(TypeData::Nil);
        debug_assert_eq!(pool.items.len(), Idx::PRIMITIVE_COUNT as usize);
        pool
    }

    /// Intern a descriptor, returning the existing index if present.
    pub fn intern(&mut self, data: TypeData) -> Idx {
        if let Some(&idx) = self.map.get(&data) {
            return idx;
        }
        let idx = Idx::from_raw(u32::try_from(self.items.len()).unwrap_or(u32::MAX));
        let flags = self.compute_flags(&data);
        self.items.push(data.clone());
        self.flags.push(flags);
        self.map.insert(data, idx);
        idx
    }

    fn child_flags(&self, children: &[Idx]) -> TypeFlags {
        children
            .iter()
            .fold(TypeFlags::empty(), |acc, &c| acc | self.flags(c).propagated())
    }

    fn compute_flags(&self, data: &TypeData) -> TypeFlags {
        match data {
            TypeData::Basic(_) | TypeData::Nil => TypeFlags::IS_BASIC,
            TypeData::Named { args, .. } => TypeFlags::IS_NAMED | self.child_flags(args),
            TypeData::Pointer(elem) => {
                TypeFlags::IS_POINTER | TypeFlags::IS_REFERENCE | self.flags(*elem).propagated()
            }
            TypeData::Slice(elem) => {
                TypeFlags::IS_REFERENCE | TypeFlags::NOT_COMPARABLE | self.flags(*elem).propagated()
            }
            TypeData::Map { key, value } => {
                TypeFlags::IS_REFERENCE
                    | TypeFlags::NOT_COMPARABLE
                    | self.child_flags(&[*key, *value])
            }
            TypeData::Chan { elem, .. } => {
                TypeFlags::IS_CHAN | TypeFlags::IS_REFERENCE | self.flags(*elem).propagated()
            }
            TypeData::Func(sig) => {
                TypeFlags::IS_FUNC
                    | TypeFlags::IS_REFERENCE
                    | TypeFlags::NOT_COMPARABLE
                    | self.child_flags(&sig.params)
                    | self.child_flags(&sig.results)
            }
            TypeData::Array { elem, .. } => {
                let elem_flags = self.flags(*elem);
                TypeFlags::IS_AGGREGATE
                    | elem_flags.propagated()
                    | (elem_flags & TypeFlags::NOT_COMPARABLE)
            }
            TypeData::Struct(fields) => {
                let mut flags = TypeFlags::IS_STRUCT | TypeFlags::IS_AGGREGATE;
                for field in fields {
                    let f = self.flags(field.ty);
                    flags |= f.propagated() | (f & TypeFlags::NOT_COMPARABLE);
                }
                flags
            }
            TypeData::Interface(iface) => {
                let mut flags = TypeFlags::IS_INTERFACE | TypeFlags::IS_REFERENCE;
                for m in &iface.methods {
                    flags |= self.child_flags(&m.sig.params) | self.child_flags(&m.sig.results);
                }
                for t in &iface.terms {
                    flags |= self.flags(t.ty).propagated();
                }
                flags
            }
            TypeData::TypeParam { .. } => TypeFlags::IS_TYPE_PARAM | TypeFlags::HAS_TYPE_PARAM,
            TypeData::Tuple(elems) => self.child_flags(elems),
        }
    }

    // Queries

    #[inline]
    pub fn data(&self, idx: Idx) -> &TypeData {
        &self.items[idx.index()]
    }

    #[inline]
    pub fn get(&self, idx: Idx) -> Option<&TypeData> {
        self.items.get(idx.index())
    }

    /// Flags of `idx`; `NONE` has no flags.
    #[inline]
    pub fn flags(&self, idx: Idx) -> TypeFlags {
        self.flags.get(idx.index()).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Idx, &TypeData)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, d)| (Idx::from_raw(u32::try_from(i).unwrap_or(u32::MAX)), d))
    }

    // Named types

    pub fn set_underlying(&mut self, named: Idx, underlying: Idx) {
        self.underlying.insert(named, underlying);
    }

    pub fn has_underlying(&self, named: Idx) -> bool {
        self.underlying.contains_key(&named)
    }

    /// Underlying type: the type itself unless it is named. A named type
    /// whose underlying type is not yet known maps to `NONE`.
    pub fn underlying(&self, idx: Idx) -> Idx {
        match self.get(idx) {
            Some(TypeData::Named { .. }) => self.underlying.get(&idx).copied().unwrap_or(Idx::NONE),
            Some(_) => idx,
            None => Idx::NONE,
        }
    }

    fn underlying_data(&self, idx: Idx) -> Option<&TypeData> {
        self.get(self.underlying(idx))
    }

    // Struct field symbols

    /// Remember the declaring symbols of a struct type's fields. Only the
    /// first declaration of a structurally identical struct is kept.
    pub fn record_field_symbols(&mut self, strukt: Idx, symbols: Vec<SymbolId>) {
        self.field_symbols.entry(strukt).or_insert(symbols);
    }

    /// Canonical field symbols of a struct type.
    pub fn field_symbols(&self, strukt: Idx) -> &[SymbolId] {
        self.field_symbols.get(&strukt).map_or(&[], Vec::as_slice)
    }

    // Shape queries (through named types)

    pub fn is_named(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_NAMED)
    }

    pub fn is_interface(&self, idx: Idx) -> bool {
        matches!(self.underlying_data(idx), Some(TypeData::Interface(_)))
    }

    pub fn is_pointer(&self, idx: Idx) -> bool {
        matches!(self.underlying_data(idx), Some(TypeData::Pointer(_)))
    }

    pub fn is_chan(&self, idx: Idx) -> bool {
        matches!(self.underlying_data(idx), Some(TypeData::Chan { .. }))
    }

    pub fn is_struct(&self, idx: Idx) -> bool {
        matches!(self.underlying_data(idx), Some(TypeData::Struct(_)))
    }

    pub fn is_type_param(&self, idx: Idx) -> bool {
        matches!(self.get(idx), Some(TypeData::TypeParam { .. }))
    }

    pub fn pointer_elem(&self, idx: Idx) -> Option<Idx> {
        match self.underlying_data(idx) {
            Some(TypeData::Pointer(elem)) => Some(*elem),
            _ => None,
        }
    }

    pub fn chan_elem(&self, idx: Idx) -> Option<(Idx, ChanDir)> {
        match self.underlying_data(idx) {
            Some(TypeData::Chan { elem, dir }) => Some((*elem, *dir)),
            _ => None,
        }
    }

    pub fn struct_fields(&self, idx: Idx) -> Option<&[FieldInfo]> {
        match self.underlying_data(idx) {
            Some(TypeData::Struct(fields)) => Some(fields),
            _ => None,
        }
    }

    pub fn interface(&self, idx: Idx) -> Option<&InterfaceInfo> {
        match self.underlying_data(idx) {
            Some(TypeData::Interface(iface)) => Some(iface),
            _ => None,
        }
    }

    pub fn func_sig(&self, idx: Idx) -> Option<&FuncSig> {
        match self.underlying_data(idx) {
            Some(TypeData::Func(sig)) => Some(sig),
            _ => None,
        }
    }

    /// Assignment semantics. Type parameters are treated as aggregates: the
    /// generated clone is the identity for non-aggregate instantiations.
    pub fn category(&self, idx: Idx) -> ValueCategory {
        match self.underlying_data(idx) {
            Some(TypeData::Struct(_) | TypeData::Array { .. } | TypeData::TypeParam { .. }) => {
                ValueCategory::Aggregate
            }
            Some(
                TypeData::Pointer(_)
                | TypeData::Slice(_)
                | TypeData::Map { .. }
                | TypeData::Chan { .. }
                | TypeData::Func(_)
                | TypeData::Interface(_),
            ) => ValueCategory::Reference,
            Some(TypeData::Basic(_) | TypeData::Nil | TypeData::Tuple(_) | TypeData::Named { .. })
            | None => ValueCategory::Scalar,
        }
    }

    /// Whether `==` is defined on values of this type.
    pub fn is_comparable(&self, idx: Idx) -> bool {
        let mut visiting = FxHashSet::default();
        self.comparable_inner(idx, &mut visiting)
    }

    fn comparable_inner(&self, idx: Idx, visiting: &mut FxHashSet<Idx>) -> bool {
        if !visiting.insert(idx) {
            return true;
        }
        let flags = self.flags(idx);
        if flags.contains(TypeFlags::NOT_COMPARABLE) {
            return false;
        }
        match self.get(idx) {
            Some(TypeData::Named { .. }) => {
                let u = self.underlying(idx);
                !u.is_none() && self.comparable_inner(u, visiting)
            }
            Some(TypeData::Struct(fields)) => fields.iter().all(|f| self.comparable_inner(f.ty, visiting)),
            Some(TypeData::Array { elem, .. }) => self.comparable_inner(*elem, visiting),
            Some(TypeData::Slice(_) | TypeData::Map { .. } | TypeData::Func(_) | TypeData::Tuple(_))
            | None => false,
            Some(_) => true,
        }
    }

    // Display

    /// Source-like rendering for diagnostics and the runtime registry.
    pub fn display(&self, idx: Idx, program: &Program) -> String {
        let mut out = String::new();
        self.write_type(&mut out, idx, program);
        out
    }

    /// Parameter and result lists of `sig`, as in a method declaration.
    pub fn display_sig(&self, sig: &FuncSig, program: &Program) -> String {
        let mut out = String::new();
        self.write_sig(&mut out, sig, program);
        out
    }

    fn write_list(&self, out: &mut String, items: &[Idx], program: &Program) {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_type(out, item, program);
        }
    }

    fn write_sig(&self, out: &mut String, sig: &FuncSig, program: &Program) {
        out.push('(');
        for (i, &p) in sig.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if sig.variadic && i + 1 == sig.params.len() {
                out.push_str("...");
                let elem = match self.get(p) {
                    Some(TypeData::Slice(elem)) => *elem,
                    _ => p,
                };
                self.write_type(out, elem, program);
            } else {
                self.write_type(out, p, program);
            }
        }
        out.push(')');
        match sig.results.as_slice() {
            [] => {}
            [single] => {
                out.push(' ');
                self.write_type(out, *single, program);
            }
            many => {
                out.push_str(" (");
                self.write_list(out, many, program);
                out.push(')');
            }
        }
    }

    fn write_type(&self, out: &mut String, idx: Idx, program: &Program) {
        let Some(data) = self.get(idx) else {
            out.push_str("<invalid>");
            return;
        };
        match data {
            TypeData::Basic(kind) => out.push_str(kind.as_str()),
            TypeData::Nil => out.push_str("nil"),
            TypeData::Named { decl, args } => {
                out.push_str(&program.qualified_decl_name(*decl));
                if !args.is_empty() {
                    out.push('[');
                    self.write_list(out, args, program);
                    out.push(']');
                }
            }
            TypeData::Pointer(elem) => {
                out.push('*');
                self.write_type(out, *elem, program);
            }
            TypeData::Slice(elem) => {
                out.push_str("[]");
                self.write_type(out, *elem, program);
            }
            TypeData::Array { elem, len } => {
                let _ = write!(out, "[{len}]");
                self.write_type(out, *elem, program);
            }
            TypeData::Map { key, value } => {
                out.push_str("map[");
                self.write_type(out, *key, program);
                out.push(']');
                self.write_type(out, *value, program);
            }
            TypeData::Chan { elem, dir } => {
                out.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.write_type(out, *elem, program);
            }
            TypeData::Func(sig) => {
                out.push_str("func");
                self.write_sig(out, sig, program);
            }
            TypeData::Struct(fields) => {
                out.push_str("struct{");
                for (i, f) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    if !f.embedded {
                        out.push_str(program.name(f.name));
                        out.push(' ');
                    }
                    self.write_type(out, f.ty, program);
                }
                out.push('}');
            }
            TypeData::Interface(iface) => {
                if iface.methods.is_empty() && iface.terms.is_empty() {
                    out.push_str(if iface.comparable { "comparable" } else { "any" });
                    return;
                }
                out.push_str("interface{");
                let mut first = true;
                for m in &iface.methods {
                    if !first {
                        out.push_str("; ");
                    }
                    first = false;
                    out.push_str(program.name(m.name));
                    self.write_sig(out, &m.sig, program);
                }
                if !iface.terms.is_empty() {
                    if !first {
                        out.push_str("; ");
                    }
                    for (i, t) in iface.terms.iter().enumerate() {
                        if i > 0 {
                            out.push_str(" | ");
                        }
                        if t.tilde {
                            out.push('~');
                        }
                        self.write_type(out, t.ty, program);
                    }
                }
                out.push('}');
            }
            TypeData::TypeParam { owner, index } => {
                let name = match owner {
                    GenericOwner::Func(f) => program
                        .get_func(*f)
                        .and_then(|f| f.type_params.get(*index as usize))
                        .map(|p| p.name),
                    GenericOwner::Type(d) => program
                        .get_decl(*d)
                        .and_then(|d| d.type_params.get(*index as usize))
                        .map(|p| p.name),
                };
                match name {
                    Some(name) => out.push_str(program.name(name)),
                    None => {
                        let _ = write!(out, "T{index}");
                    }
                }
            }
            TypeData::Tuple(elems) => {
                out.push('(');
                self.write_list(out, elems, program);
                out.push(')');
            }
        }
    }
}
