//! Resolved type expressions.
//!
//! The frontend has already resolved every identifier in a type position, so
//! these nodes reference declarations by [`TypeDeclId`] and type parameters by
//! position. They are syntax, not semantics: `strand_types` interns them into
//! canonical descriptors where structurally identical types share one `Idx`.

use smallvec::SmallVec;

use crate::{FuncId, Name, Span, SymbolId, TypeDeclId, TypeExprId};

/// Predeclared scalar types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UnsafePointer,
}

impl BasicKind {
    /// Every basic kind, in declaration order.
    pub const ALL: [BasicKind; 18] = [
        BasicKind::Bool,
        BasicKind::Int,
        BasicKind::Int8,
        BasicKind::Int16,
        BasicKind::Int32,
        BasicKind::Int64,
        BasicKind::Uint,
        BasicKind::Uint8,
        BasicKind::Uint16,
        BasicKind::Uint32,
        BasicKind::Uint64,
        BasicKind::Uintptr,
        BasicKind::Float32,
        BasicKind::Float64,
        BasicKind::Complex64,
        BasicKind::Complex128,
        BasicKind::String,
        BasicKind::UnsafePointer,
    ];

    /// Source spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::String => "string",
            BasicKind::UnsafePointer => "unsafe.Pointer",
        }
    }

    /// Integer, float, or complex.
    pub const fn is_numeric(self) -> bool {
        !matches!(
            self,
            BasicKind::Bool | BasicKind::String | BasicKind::UnsafePointer
        )
    }
}

/// Channel direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// Function signature. A variadic signature's last parameter is the slice type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Signature {
    pub params: Vec<TypeExprId>,
    pub results: Vec<TypeExprId>,
    pub variadic: bool,
}

/// Struct field declaration.
///
/// Each field carries its own [`SymbolId`] so the boxing analysis can mark
/// fields whose address escapes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: TypeExprId,
    pub embedded: bool,
    pub symbol: SymbolId,
    pub span: Span,
}

/// Interface method declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSpec {
    pub name: Name,
    pub sig: Signature,
    pub span: Span,
}

/// One term of a constraint union: `T` or `~T`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnionTerm {
    pub tilde: bool,
    pub ty: TypeExprId,
}

/// Interface body. Interfaces used only as constraints may carry a type set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct InterfaceDecl {
    pub methods: Vec<MethodSpec>,
    pub embedded: Vec<TypeExprId>,
    pub union: Vec<UnionTerm>,
    pub comparable: bool,
}

/// Declaration a type parameter belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GenericOwner {
    Func(FuncId),
    Type(TypeDeclId),
}

/// Type expression variants.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeExprKind {
    Basic(BasicKind),
    /// Reference to a declared named type, with type arguments when generic.
    Named {
        decl: TypeDeclId,
        args: Vec<TypeExprId>,
    },
    Pointer(TypeExprId),
    Slice(TypeExprId),
    Array {
        elem: TypeExprId,
        len: u64,
    },
    Map {
        key: TypeExprId,
        value: TypeExprId,
    },
    Chan {
        elem: TypeExprId,
        dir: ChanDir,
    },
    Func(Signature),
    Struct(Vec<FieldDecl>),
    Interface(InterfaceDecl),
    /// The `index`th type parameter of `owner`.
    TypeParam {
        owner: GenericOwner,
        index: u32,
    },
    /// Result list of a multi-value call.
    Tuple(Vec<TypeExprId>),
    /// Type of the untyped `nil` literal.
    Nil,
}

impl TypeExprKind {
    /// Directly referenced child type expressions.
    pub fn children(&self) -> SmallVec<[TypeExprId; 4]> {
        let mut out = SmallVec::new();
        match self {
            TypeExprKind::Basic(_) | TypeExprKind::TypeParam { .. } | TypeExprKind::Nil => {}
            TypeExprKind::Named { args, .. } => out.extend(args.iter().copied()),
            TypeExprKind::Pointer(elem)
            | TypeExprKind::Slice(elem)
            | TypeExprKind::Array { elem, .. }
            | TypeExprKind::Chan { elem, .. } => out.push(*elem),
            TypeExprKind::Map { key, value } => {
                out.push(*key);
                out.push(*value);
            }
            TypeExprKind::Func(sig) => {
                out.extend(sig.params.iter().copied());
                out.extend(sig.results.iter().copied());
            }
            TypeExprKind::Struct(fields) => out.extend(fields.iter().map(|f| f.ty)),
            TypeExprKind::Interface(iface) => {
                for m in &iface.methods {
                    out.extend(m.sig.params.iter().copied());
                    out.extend(m.sig.results.iter().copied());
                }
                out.extend(iface.embedded.iter().copied());
                out.extend(iface.union.iter().map(|t| t.ty));
            }
            TypeExprKind::Tuple(elems) => out.extend(elems.iter().copied()),
        }
        out
    }
}

/// A type expression with its source location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeExprNode {
    pub kind: TypeExprKind,
    pub span: Span,
}

/// Type parameter declaration (`T Constraint`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamDecl {
    pub name: Name,
    pub constraint: TypeExprId,
    pub span: Span,
}

/// Named type declaration (`type Celsius float64`, `type List[T any] struct{...}`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeDecl {
    pub name: Name,
    /// Package path, e.g. `sync` or `example.com/app/model`.
    pub package: Name,
    pub span: Span,
    pub type_params: Vec<TypeParamDecl>,
    pub underlying: TypeExprId,
    /// Declared methods (value and pointer receivers).
    pub methods: Vec<FuncId>,
    /// `type A = B`: the declaration introduces no new type.
    pub alias: bool,
    /// For interfaces: implementations may live outside this program.
    pub open: bool,
}
