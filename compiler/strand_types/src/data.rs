//! Interned type descriptors.
//!
//! `TypeData` is both the descriptor and its interning key. Children are
//! referenced by [`Idx`], so recursive types (a struct holding a pointer to its
//! own named type) are finite: the recursion goes through the named type's
//! `Idx`, whose underlying type is stored separately in the pool.

use strand_ir::{BasicKind, ChanDir, GenericOwner, Name, TypeDeclId};

use crate::Idx;

/// Canonical function signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct FuncSig {
    pub params: Vec<Idx>,
    pub results: Vec<Idx>,
    pub variadic: bool,
}

/// Struct field. Identity ignores the declaring symbol, see [`Pool::field_symbols`](crate::Pool::field_symbols).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldInfo {
    pub name: Name,
    pub ty: Idx,
    pub embedded: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSig {
    pub name: Name,
    pub sig: FuncSig,
}

/// One term of a type set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeTerm {
    pub tilde: bool,
    pub ty: Idx,
}

/// Interface with embedded interfaces flattened in.
///
/// `methods` is sorted by name and free of duplicates.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct InterfaceInfo {
    pub methods: Vec<MethodSig>,
    /// Empty means "no type-set restriction".
    pub terms: Vec<TypeTerm>,
    pub comparable: bool,
}

impl InterfaceInfo {
    pub fn method(&self, name: Name) -> Option<&MethodSig> {
        self.methods
            .binary_search_by(|m| m.name.cmp(&name))
            .ok()
            .map(|i| &self.methods[i])
    }

    /// Usable as an ordinary (non-constraint) interface type.
    pub fn is_basic(&self) -> bool {
        self.terms.is_empty() && !self.comparable
    }
}

/// Type descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Basic(BasicKind),
    Nil,
    /// Declared type. Its underlying descriptor and methods live in the pool
    /// and the model, keyed by this entry's `Idx`.
    Named {
        decl: TypeDeclId,
        args: Vec<Idx>,
    },
    Pointer(Idx),
    Slice(Idx),
    Array {
        elem: Idx,
        len: u64,
    },
    Map {
        key: Idx,
        value: Idx,
    },
    Chan {
        elem: Idx,
        dir: ChanDir,
    },
    Func(FuncSig),
    Struct(Vec<FieldInfo>),
    Interface(InterfaceInfo),
    TypeParam {
        owner: GenericOwner,
        index: u32,
    },
    Tuple(Vec<Idx>),
}
