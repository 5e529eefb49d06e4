//! Field and method lookup with embedded-member promotion.
//!
//! Members are searched breadth-first through embedded fields. A name found
//! at a shallower depth shadows every deeper one; a name found more than once
//! at the same (shallowest) depth is ambiguous. Ambiguous names are not part
//! of any method set and selecting one is an error.

use std::borrow::Cow;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use strand_ir::{FuncId, Name, Program, Span, SymbolId};

use crate::{FuncSig, Idx, TypeData, TypeModel};

/// One embedded field traversed to reach a promoted member.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EmbedStep {
    pub field: Name,
    pub symbol: SymbolId,
    /// The embedded field is a pointer (`struct{ *Inner }`).
    pub pointer: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Field {
        symbol: SymbolId,
        ty: Idx,
    },
    /// Method declared on a named type.
    Method {
        func: FuncId,
        pointer_receiver: bool,
        sig: FuncSig,
    },
    /// Method of an interface: either the operand is an interface value or a
    /// type parameter, or the method is promoted from an embedded interface.
    InterfaceMethod {
        iface: Idx,
        sig: FuncSig,
    },
}

/// A resolved member and the embedded path leading to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub name: Name,
    pub kind: MemberKind,
    pub path: SmallVec<[EmbedStep; 2]>,
}

impl Member {
    /// Embedding depth (0 = declared on the type itself).
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Some embedded step dereferences a pointer.
    pub fn through_pointer(&self) -> bool {
        self.path.iter().any(|s| s.pointer)
    }

    pub fn sig(&self) -> Option<&FuncSig> {
        match &self.kind {
            MemberKind::Method { sig, .. } | MemberKind::InterfaceMethod { sig, .. } => Some(sig),
            MemberKind::Field { .. } => None,
        }
    }

    pub fn is_method(&self) -> bool {
        !matches!(self.kind, MemberKind::Field { .. })
    }

    /// Source location of the member's declaration.
    pub fn span(&self, program: &Program) -> Span {
        match self.kind {
            MemberKind::Field { symbol, .. } => program
                .get_symbol(symbol)
                .map_or(Span::DUMMY, |s| s.span),
            MemberKind::Method { func, .. } => program.get_func(func).map_or(Span::DUMMY, |f| f.span),
            MemberKind::InterfaceMethod { .. } => Span::DUMMY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberLookup {
    Found(Member),
    Ambiguous { depth: usize, candidates: Vec<Member> },
}

/// Every member name reachable from a type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberTable {
    entries: FxHashMap<Name, MemberLookup>,
}

impl MemberTable {
    pub fn lookup(&self, name: Name) -> Option<&MemberLookup> {
        self.entries.get(&name)
    }

    /// Unambiguous members.
    pub fn found(&self) -> impl Iterator<Item = &Member> {
        self.entries.values().filter_map(|l| match l {
            MemberLookup::Found(m) => Some(m),
            MemberLookup::Ambiguous { .. } => None,
        })
    }
}

/// Methods callable on a receiver type, sorted by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MethodSet {
    entries: Vec<Member>,
}

impl MethodSet {
    pub fn get(&self, name: Name) -> Option<&Member> {
        self.entries
            .binary_search_by(|m| m.name.cmp(&name))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolved selector expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub member: Member,
    /// The operand is a pointer and is dereferenced implicitly.
    pub indirect: bool,
}

/// Failure to resolve a selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectError {
    NotFound,
    Ambiguous { depth: usize, candidates: Vec<Member> },
}

impl TypeModel {
    /// All members of `root`, with promotion through embedded fields.
    pub fn members_of(&self, root: Idx) -> MemberTable {
        let mut table = MemberTable::default();
        let mut level: Vec<(Idx, SmallVec<[EmbedStep; 2]>)> = vec![(root, SmallVec::new())];
        // Types expanded at shallower depths; re-expanding them cannot
        // produce anything new and would loop on `type T struct{ *T }`.
        let mut expanded = FxHashSet::default();

        while !level.is_empty() {
            let mut found: FxHashMap<Name, Vec<Member>> = FxHashMap::default();
            let mut next = Vec::new();
            let mut this_level = Vec::new();

            for (ty, path) in level {
                if expanded.contains(&ty) {
                    continue;
                }
                this_level.push(ty);
                self.collect_direct(ty, &path, &mut found, &mut next);
            }
            expanded.extend(this_level);

            for (name, mut members) in found {
                if table.entries.contains_key(&name) {
                    continue;
                }
                let lookup = if members.len() == 1 {
                    MemberLookup::Found(members.remove(0))
                } else {
                    let depth = members[0].depth();
                    MemberLookup::Ambiguous {
                        depth,
                        candidates: members,
                    }
                };
                table.entries.insert(name, lookup);
            }
            level = next;
        }
        table
    }

    /// Members declared directly on `ty`, and the embedded types to search next.
    fn collect_direct(
        &self,
        ty: Idx,
        path: &SmallVec<[EmbedStep; 2]>,
        found: &mut FxHashMap<Name, Vec<Member>>,
        next: &mut Vec<(Idx, SmallVec<[EmbedStep; 2]>)>,
    ) {
        let pool = &self.pool;

        if pool.is_type_param(ty) {
            if let Some(constraint) = self.constraint_of(ty) {
                self.collect_interface_methods(constraint, path, found);
            }
            return;
        }

        if let Some(info) = self.named.get(&ty) {
            for m in &info.methods {
                found.entry(m.name).or_default().push(Member {
                    name: m.name,
                    kind: MemberKind::Method {
                        func: m.func,
                        pointer_receiver: m.pointer_receiver,
                        sig: m.sig.clone(),
                    },
                    path: path.clone(),
                });
            }
        }

        let underlying = pool.underlying(ty);
        match pool.get(underlying) {
            Some(TypeData::Struct(fields)) => {
                let symbols = pool.field_symbols(underlying);
                for (i, field) in fields.iter().enumerate() {
                    let symbol = symbols.get(i).copied().unwrap_or(SymbolId::INVALID);
                    found.entry(field.name).or_default().push(Member {
                        name: field.name,
                        kind: MemberKind::Field {
                            symbol,
                            ty: field.ty,
                        },
                        path: path.clone(),
                    });
                    if field.embedded {
                        let (target, pointer) = match pool.get(field.ty) {
                            Some(TypeData::Pointer(elem)) => (*elem, true),
                            _ => (field.ty, false),
                        };
                        let mut sub = path.clone();
                        sub.push(EmbedStep {
                            field: field.name,
                            symbol,
                            pointer,
                        });
                        next.push((target, sub));
                    }
                }
            }
            Some(TypeData::Interface(_)) => self.collect_interface_methods(ty, path, found),
            _ => {}
        }
    }

    fn collect_interface_methods(
        &self,
        iface: Idx,
        path: &SmallVec<[EmbedStep; 2]>,
        found: &mut FxHashMap<Name, Vec<Member>>,
    ) {
        let Some(info) = self.pool.interface(iface) else {
            return;
        };
        for m in &info.methods {
            found.entry(m.name).or_default().push(Member {
                name: m.name,
                kind: MemberKind::InterfaceMethod {
                    iface,
                    sig: m.sig.clone(),
                },
                path: path.clone(),
            });
        }
    }

    /// Resolve `x.name` for an operand of type `ty`. Pointers to non-interface
    /// types are dereferenced implicitly.
    pub fn select(&self, ty: Idx, name: Name) -> Result<Selection, SelectError> {
        let (base, indirect) = match self.pool.pointer_elem(ty) {
            Some(elem) if !self.pool.is_interface(elem) => (elem, true),
            _ => (ty, false),
        };
        match self.members_of(base).lookup(name) {
            Some(MemberLookup::Found(member)) => Ok(Selection {
                member: member.clone(),
                indirect,
            }),
            Some(MemberLookup::Ambiguous { depth, candidates }) => Err(SelectError::Ambiguous {
                depth: *depth,
                candidates: candidates.clone(),
            }),
            None => Err(SelectError::NotFound),
        }
    }

    /// Method set of a receiver type.
    ///
    /// For a value type `T`, pointer-receiver methods are included only when
    /// reached through an embedded pointer; `*T` includes every method.
    pub fn compute_method_set(&self, recv: Idx) -> MethodSet {
        let pool = &self.pool;
        let mut entries: Vec<Member> = Vec::new();

        if let Some(info) = pool.interface(recv) {
            entries.extend(info.methods.iter().map(|m| Member {
                name: m.name,
                kind: MemberKind::InterfaceMethod {
                    iface: recv,
                    sig: m.sig.clone(),
                },
                path: SmallVec::new(),
            }));
        } else {
            let (base, addressable) = match pool.get(recv) {
                Some(TypeData::Pointer(elem)) => (*elem, true),
                _ => (recv, false),
            };
            if addressable && (pool.is_pointer(base) || pool.is_interface(base)) {
                return MethodSet::default();
            }
            let table = self.members_of(base);
            entries.extend(
                table
                    .found()
                    .filter(|m| match m.kind {
                        MemberKind::Method {
                            pointer_receiver, ..
                        } => addressable || !pointer_receiver || m.through_pointer(),
                        MemberKind::InterfaceMethod { .. } => true,
                        MemberKind::Field { .. } => false,
                    })
                    .cloned(),
            );
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        MethodSet { entries }
    }

    /// Method set of `recv`, from the cache when it was precomputed.
    pub fn method_set(&self, recv: Idx) -> Cow<'_, MethodSet> {
        match self.method_sets.get(&recv) {
            Some(set) => Cow::Borrowed(set),
            None => Cow::Owned(self.compute_method_set(recv)),
        }
    }
}

#[cfg(test)]
mod tests;
