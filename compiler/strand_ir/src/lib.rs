//! Strand IR - the typed program consumed by every analysis.
//!
//! - Arena IDs for expressions, statements, symbols, functions and types
//! - Interned names and the shared string interner
//! - Spans and the source map used to position diagnostics
//! - Resolved type expressions and the typed syntax tree
//! - [`ProgramBuilder`] for frontends and tests
//!
//! # Design
//!
//! - **Flatten everything**: no `Box<Expr>`, nodes reference each other by ID.
//! - **Resolve once**: the frontend binds every identifier; nothing here
//!   performs name lookup.
//! - **Read-only after build**: a finished [`Program`] is shared by `&` between
//!   analyses running in parallel.

mod ast;
mod builder;
mod ids;
mod name;
mod program;
mod span;
mod stack;
mod types;
pub mod visitor;

pub use ast::{
    BinaryOp, BranchKind, Builtin, CommClause, CompositeElem, CompositeKey, Expr, ExprKind,
    FuncKind, Function, GlobalVar, Literal, Receiver, SelectCase, Stmt, StmtKind, SwitchCase,
    Symbol, SymbolKind, TypeCase, UnaryOp,
};
pub use builder::ProgramBuilder;
pub use ids::{ExprId, FileId, FuncId, StmtId, SymbolId, TypeDeclId, TypeExprId};
pub use name::{InternError, Name, SharedInterner, StringInterner};
pub use program::Program;
pub use span::{SourceFile, SourceMap, SourcePosition, Span};
pub use stack::ensure_sufficient_stack;
pub use types::{
    BasicKind, ChanDir, FieldDecl, GenericOwner, InterfaceDecl, MethodSpec, Signature, TypeDecl,
    TypeExprKind, TypeExprNode, TypeParamDecl, UnionTerm,
};
