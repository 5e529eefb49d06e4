//! The whole typed program.
//!
//! Arenas are append-only while the frontend (or [`ProgramBuilder`](crate::ProgramBuilder))
//! assembles them and read-only afterwards. Analyses borrow `&Program` and can
//! run in parallel.

use std::fmt::Write as _;

use crate::{
    Expr, ExprId, FuncId, Function, GlobalVar, Name, SharedInterner, SourceMap, Stmt, StmtId,
    Symbol, SymbolId, TypeDecl, TypeDeclId, TypeExprId, TypeExprNode,
};

/// Fully resolved typed program.
#[derive(Debug)]
pub struct Program {
    pub(crate) interner: SharedInterner,
    pub(crate) sources: SourceMap,
    pub(crate) exprs: Vec<Expr>,
    pub(crate) stmts: Vec<Stmt>,
    pub(crate) type_exprs: Vec<TypeExprNode>,
    pub(crate) decls: Vec<TypeDecl>,
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) funcs: Vec<Function>,
    pub(crate) globals: Vec<GlobalVar>,
}

impl Program {
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    /// Resolve an interned name.
    #[inline]
    pub fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    // Node access. Indexing with an ID from another program panics; the IDs
    // handed out by the builder are always in range.

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn type_expr(&self, id: TypeExprId) -> &TypeExprNode {
        &self.type_exprs[id.index()]
    }

    #[inline]
    pub fn decl(&self, id: TypeDeclId) -> &TypeDecl {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    #[inline]
    pub fn func(&self, id: FuncId) -> &Function {
        &self.funcs[id.index()]
    }

    // Checked access for validation of externally produced programs.

    pub fn get_expr(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id.index())
    }

    pub fn get_type_expr(&self, id: TypeExprId) -> Option<&TypeExprNode> {
        self.type_exprs.get(id.index())
    }

    pub fn get_decl(&self, id: TypeDeclId) -> Option<&TypeDecl> {
        self.decls.get(id.index())
    }

    pub fn get_symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    pub fn get_func(&self, id: FuncId) -> Option<&Function> {
        self.funcs.get(id.index())
    }

    // Counts and iteration.

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn func_count(&self) -> usize {
        self.funcs.len()
    }

    pub fn expr_ids(&self) -> impl Iterator<Item = ExprId> {
        (0..self.exprs.len()).map(ExprId::from_usize)
    }

    pub fn symbol_ids(&self) -> impl Iterator<Item = SymbolId> {
        (0..self.symbols.len()).map(SymbolId::from_usize)
    }

    pub fn func_ids(&self) -> impl Iterator<Item = FuncId> {
        (0..self.funcs.len()).map(FuncId::from_usize)
    }

    pub fn decl_ids(&self) -> impl Iterator<Item = TypeDeclId> {
        (0..self.decls.len()).map(TypeDeclId::from_usize)
    }

    pub fn type_expr_ids(&self) -> impl Iterator<Item = TypeExprId> {
        (0..self.type_exprs.len()).map(TypeExprId::from_usize)
    }

    pub fn globals(&self) -> &[GlobalVar] {
        &self.globals
    }

    /// Closures whose enclosing function is `parent`.
    pub fn closures_of(&self, parent: FuncId) -> impl Iterator<Item = FuncId> + '_ {
        self.func_ids()
            .filter(move |&f| self.func(f).parent == Some(parent))
    }

    /// Fully qualified name used to match external symbols:
    /// `time.Sleep`, `sync.(*Mutex).Lock`, `bytes.Buffer.Len`.
    ///
    /// Closures are named after their enclosing function with a `$n` suffix.
    pub fn qualified_name(&self, id: FuncId) -> String {
        let func = self.func(id);
        if let Some(parent) = func.parent {
            let n = self
                .closures_of(parent)
                .position(|c| c == id)
                .unwrap_or_default();
            return format!("{}${}", self.qualified_name(parent), n + 1);
        }

        let mut out = String::new();
        let package = self.name(func.package);
        if !package.is_empty() {
            out.push_str(package);
            out.push('.');
        }
        if let Some(recv) = func.receiver {
            let type_name = self.name(self.decl(recv.decl).name);
            if recv.pointer {
                let _ = write!(out, "(*{type_name}).");
            } else {
                let _ = write!(out, "{type_name}.");
            }
        }
        out.push_str(self.name(func.name));
        out
    }

    /// Qualified display name of a type declaration: `sync.Mutex`.
    pub fn qualified_decl_name(&self, id: TypeDeclId) -> String {
        let decl = self.decl(id);
        let package = self.name(decl.package);
        if package.is_empty() {
            self.name(decl.name).to_owned()
        } else {
            format!("{package}.{}", self.name(decl.name))
        }
    }
}
