//! Incremental construction of a [`Program`].
//!
//! Frontends lower their resolved trees through this builder; tests use it to
//! assemble small programs without a parser. Every node is stamped with the
//! builder's current span (see [`ProgramBuilder::at`]).

use crate::{
    BasicKind, Builtin, ChanDir, CommClause, CompositeElem, CompositeKey, Expr, ExprId, ExprKind,
    FieldDecl, FileId, FuncId, FuncKind, Function, GenericOwner, GlobalVar, InterfaceDecl,
    Literal, MethodSpec, Name, Program, Receiver, SelectCase, Signature, SourceMap, Span, Stmt,
    StmtId, StmtKind, StringInterner, SwitchCase, Symbol, SymbolId, SymbolKind, TypeCase,
    TypeDecl, TypeDeclId, TypeExprId, TypeExprKind, TypeExprNode, TypeParamDecl, UnionTerm,
};

pub struct ProgramBuilder {
    program: Program,
    package: Name,
    cursor: Span,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramBuilder {
    /// Start an empty program in package `main`.
    pub fn new() -> Self {
        let interner = StringInterner::shared();
        let package = interner.intern("main");
        ProgramBuilder {
            program: Program {
                interner,
                sources: SourceMap::new(),
                exprs: Vec::new(),
                stmts: Vec::new(),
                type_exprs: Vec::new(),
                decls: Vec::new(),
                symbols: Vec::new(),
                funcs: Vec::new(),
                globals: Vec::new(),
            },
            package,
            cursor: Span::DUMMY,
        }
    }

    pub fn finish(self) -> Program {
        self.program
    }

    /// Read access to what has been built so far.
    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn name(&self, s: &str) -> Name {
        self.program.interner.intern(s)
    }

    /// Package path for subsequently declared types and functions.
    pub fn package(&mut self, path: &str) -> &mut Self {
        self.package = self.name(path);
        self
    }

    pub fn add_file(&mut self, path: &str, text: &str) -> FileId {
        self.program.sources.add_file(path, text)
    }

    /// Span stamped on subsequently created nodes.
    pub fn at(&mut self, span: Span) -> &mut Self {
        self.cursor = span;
        self
    }

    // Arena pushes

    fn push_type(&mut self, kind: TypeExprKind) -> TypeExprId {
        let id = TypeExprId::from_usize(self.program.type_exprs.len());
        self.program.type_exprs.push(TypeExprNode {
            kind,
            span: self.cursor,
        });
        id
    }

    fn push_expr(&mut self, kind: ExprKind, ty: TypeExprId) -> ExprId {
        let id = ExprId::from_usize(self.program.exprs.len());
        self.program.exprs.push(Expr {
            kind,
            ty,
            span: self.cursor,
        });
        id
    }

    pub fn stmt(&mut self, kind: StmtKind) -> StmtId {
        let id = StmtId::from_usize(self.program.stmts.len());
        self.program.stmts.push(Stmt {
            kind,
            span: self.cursor,
        });
        id
    }

    fn push_symbol(&mut self, name: &str, ty: TypeExprId, kind: SymbolKind, owner: Option<FuncId>) -> SymbolId {
        let id = SymbolId::from_usize(self.program.symbols.len());
        let name = self.name(name);
        self.program.symbols.push(Symbol {
            name,
            ty,
            kind,
            owner,
            span: self.cursor,
        });
        id
    }

    // Type expressions

    pub fn basic(&mut self, kind: BasicKind) -> TypeExprId {
        self.push_type(TypeExprKind::Basic(kind))
    }

    pub fn int(&mut self) -> TypeExprId {
        self.basic(BasicKind::Int)
    }

    pub fn string(&mut self) -> TypeExprId {
        self.basic(BasicKind::String)
    }

    pub fn bool(&mut self) -> TypeExprId {
        self.basic(BasicKind::Bool)
    }

    pub fn named(&mut self, decl: TypeDeclId) -> TypeExprId {
        self.push_type(TypeExprKind::Named {
            decl,
            args: Vec::new(),
        })
    }

    pub fn named_generic(&mut self, decl: TypeDeclId, args: Vec<TypeExprId>) -> TypeExprId {
        self.push_type(TypeExprKind::Named { decl, args })
    }

    pub fn pointer(&mut self, elem: TypeExprId) -> TypeExprId {
        self.push_type(TypeExprKind::Pointer(elem))
    }

    pub fn slice(&mut self, elem: TypeExprId) -> TypeExprId {
        self.push_type(TypeExprKind::Slice(elem))
    }

    pub fn array(&mut self, elem: TypeExprId, len: u64) -> TypeExprId {
        self.push_type(TypeExprKind::Array { elem, len })
    }

    pub fn map(&mut self, key: TypeExprId, value: TypeExprId) -> TypeExprId {
        self.push_type(TypeExprKind::Map { key, value })
    }

    pub fn chan(&mut self, elem: TypeExprId, dir: ChanDir) -> TypeExprId {
        self.push_type(TypeExprKind::Chan { elem, dir })
    }

    pub fn func_type(&mut self, params: Vec<TypeExprId>, results: Vec<TypeExprId>) -> TypeExprId {
        self.push_type(TypeExprKind::Func(Signature {
            params,
            results,
            variadic: false,
        }))
    }

    pub fn signature_type(&mut self, sig: Signature) -> TypeExprId {
        self.push_type(TypeExprKind::Func(sig))
    }

    pub fn tuple(&mut self, elems: Vec<TypeExprId>) -> TypeExprId {
        self.push_type(TypeExprKind::Tuple(elems))
    }

    pub fn nil_type(&mut self) -> TypeExprId {
        self.push_type(TypeExprKind::Nil)
    }

    pub fn type_param(&mut self, owner: GenericOwner, index: u32) -> TypeExprId {
        self.push_type(TypeExprKind::TypeParam { owner, index })
    }

    /// Struct type; each field gets a `Field` symbol.
    pub fn struct_type(&mut self, fields: &[(&str, TypeExprId)]) -> TypeExprId {
        let decls: Vec<FieldDecl> = fields
            .iter()
            .map(|&(name, ty)| self.field(name, ty, false))
            .collect();
        self.push_type(TypeExprKind::Struct(decls))
    }

    /// Struct type from explicit field declarations (for embedded fields).
    pub fn struct_type_with(&mut self, fields: Vec<FieldDecl>) -> TypeExprId {
        self.push_type(TypeExprKind::Struct(fields))
    }

    /// Field declaration with a fresh symbol. Embedded fields are named after
    /// their type by the caller.
    pub fn field(&mut self, name: &str, ty: TypeExprId, embedded: bool) -> FieldDecl {
        let symbol = self.push_symbol(name, ty, SymbolKind::Field, None);
        FieldDecl {
            name: self.name(name),
            ty,
            embedded,
            symbol,
            span: self.cursor,
        }
    }

    pub fn method_spec(&self, name: &str, sig: Signature) -> MethodSpec {
        MethodSpec {
            name: self.name(name),
            sig,
            span: self.cursor,
        }
    }

    pub fn interface_type(&mut self, methods: Vec<MethodSpec>, embedded: Vec<TypeExprId>) -> TypeExprId {
        self.push_type(TypeExprKind::Interface(InterfaceDecl {
            methods,
            embedded,
            union: Vec::new(),
            comparable: false,
        }))
    }

    /// Constraint interface with a type set.
    pub fn constraint_type(&mut self, union: Vec<UnionTerm>, comparable: bool) -> TypeExprId {
        self.push_type(TypeExprKind::Interface(InterfaceDecl {
            methods: Vec::new(),
            embedded: Vec::new(),
            union,
            comparable,
        }))
    }

    pub fn interface_decl_type(&mut self, iface: InterfaceDecl) -> TypeExprId {
        self.push_type(TypeExprKind::Interface(iface))
    }

    // Declarations

    /// Declare a named type whose underlying type is set later with
    /// [`Self::define_type`]; needed for self-referential types.
    pub fn declare_type(&mut self, name: &str) -> TypeDeclId {
        let id = TypeDeclId::from_usize(self.program.decls.len());
        let name = self.name(name);
        self.program.decls.push(TypeDecl {
            name,
            package: self.package,
            span: self.cursor,
            type_params: Vec::new(),
            underlying: TypeExprId::INVALID,
            methods: Vec::new(),
            alias: false,
            open: false,
        });
        id
    }

    pub fn define_type(&mut self, decl: TypeDeclId, underlying: TypeExprId) {
        self.program.decls[decl.index()].underlying = underlying;
    }

    /// Declare and define a named type.
    pub fn type_decl(&mut self, name: &str, underlying: TypeExprId) -> TypeDeclId {
        let id = self.declare_type(name);
        self.define_type(id, underlying);
        id
    }

    pub fn decl_mut(&mut self, decl: TypeDeclId) -> &mut TypeDecl {
        &mut self.program.decls[decl.index()]
    }

    pub fn add_type_param(&mut self, decl: TypeDeclId, name: &str, constraint: TypeExprId) -> TypeExprId {
        let param = TypeParamDecl {
            name: self.name(name),
            constraint,
            span: self.cursor,
        };
        let params = &mut self.program.decls[decl.index()].type_params;
        let index = u32::try_from(params.len()).unwrap_or(u32::MAX);
        params.push(param);
        self.type_param(GenericOwner::Type(decl), index)
    }

    fn new_function(&mut self, name: &str, kind: FuncKind, params: &[(&str, TypeExprId)], results: &[TypeExprId]) -> FuncId {
        let id = FuncId::from_usize(self.program.funcs.len());
        let sig = self.func_type(params.iter().map(|p| p.1).collect(), results.to_vec());
        let name = self.name(name);
        self.program.funcs.push(Function {
            name,
            package: self.package,
            kind,
            span: self.cursor,
            sig,
            receiver: None,
            parent: None,
            type_params: Vec::new(),
            params: Vec::new(),
            results: Vec::new(),
            body: None,
        });
        let param_syms: Vec<SymbolId> = params
            .iter()
            .map(|&(n, ty)| self.push_symbol(n, ty, SymbolKind::Param, Some(id)))
            .collect();
        self.program.funcs[id.index()].params = param_syms;
        id
    }

    /// Top-level function without a body; give it one with [`Self::set_body`].
    pub fn func(&mut self, name: &str, params: &[(&str, TypeExprId)], results: &[TypeExprId]) -> FuncId {
        self.new_function(name, FuncKind::Func, params, results)
    }

    /// Method on `decl`, with a receiver named `recv`.
    pub fn method(
        &mut self,
        decl: TypeDeclId,
        pointer: bool,
        name: &str,
        params: &[(&str, TypeExprId)],
        results: &[TypeExprId],
    ) -> FuncId {
        let id = self.new_function(name, FuncKind::Method, params, results);
        let named = self.named(decl);
        let recv_ty = if pointer { self.pointer(named) } else { named };
        let symbol = self.push_symbol("recv", recv_ty, SymbolKind::Receiver, Some(id));
        self.program.funcs[id.index()].receiver = Some(Receiver {
            symbol: Some(symbol),
            decl,
            pointer,
        });
        self.program.decls[decl.index()].methods.push(id);
        id
    }

    /// Closure owned by `parent`.
    pub fn closure(&mut self, parent: FuncId, params: &[(&str, TypeExprId)], results: &[TypeExprId]) -> FuncId {
        let id = self.new_function("", FuncKind::Closure, params, results);
        self.program.funcs[id.index()].parent = Some(parent);
        id
    }

    pub fn func_mut(&mut self, func: FuncId) -> &mut Function {
        &mut self.program.funcs[func.index()]
    }

    pub fn add_func_type_param(&mut self, func: FuncId, name: &str, constraint: TypeExprId) -> TypeExprId {
        let param = TypeParamDecl {
            name: self.name(name),
            constraint,
            span: self.cursor,
        };
        let params = &mut self.program.funcs[func.index()].type_params;
        let index = u32::try_from(params.len()).unwrap_or(u32::MAX);
        params.push(param);
        self.type_param(GenericOwner::Func(func), index)
    }

    /// Declare named results; the function's signature is left unchanged.
    pub fn named_results(&mut self, func: FuncId, results: &[(&str, TypeExprId)]) -> Vec<SymbolId> {
        let syms: Vec<SymbolId> = results
            .iter()
            .map(|&(n, ty)| self.push_symbol(n, ty, SymbolKind::NamedResult, Some(func)))
            .collect();
        self.program.funcs[func.index()].results.clone_from(&syms);
        syms
    }

    pub fn params(&self, func: FuncId) -> Vec<SymbolId> {
        self.program.funcs[func.index()].params.clone()
    }

    pub fn receiver(&self, func: FuncId) -> Option<SymbolId> {
        self.program.funcs[func.index()].receiver.and_then(|r| r.symbol)
    }

    pub fn set_body(&mut self, func: FuncId, stmts: Vec<StmtId>) -> StmtId {
        let body = self.stmt(StmtKind::Block(stmts));
        self.program.funcs[func.index()].body = Some(body);
        body
    }

    pub fn local(&mut self, func: FuncId, name: &str, ty: TypeExprId) -> SymbolId {
        self.push_symbol(name, ty, SymbolKind::Local, Some(func))
    }

    pub fn global(&mut self, name: &str, ty: TypeExprId, value: Option<ExprId>) -> SymbolId {
        let symbol = self.push_symbol(name, ty, SymbolKind::Global, None);
        self.program.globals.push(GlobalVar { symbol, value });
        symbol
    }

    // Expressions

    pub fn expr(&mut self, kind: ExprKind, ty: TypeExprId) -> ExprId {
        self.push_expr(kind, ty)
    }

    pub fn expr_type(&self, expr: ExprId) -> TypeExprId {
        self.program.exprs[expr.index()].ty
    }

    pub fn ident(&mut self, symbol: SymbolId) -> ExprId {
        let ty = self.program.symbols[symbol.index()].ty;
        self.push_expr(ExprKind::Ident(symbol), ty)
    }

    pub fn func_ref(&mut self, func: FuncId) -> ExprId {
        let ty = self.program.funcs[func.index()].sig;
        self.push_expr(ExprKind::FuncRef(func), ty)
    }

    pub fn instantiate(&mut self, func: FuncId, type_args: Vec<TypeExprId>, ty: TypeExprId) -> ExprId {
        self.push_expr(ExprKind::Instantiate { func, type_args }, ty)
    }

    pub fn lit(&mut self, lit: Literal, ty: TypeExprId) -> ExprId {
        self.push_expr(ExprKind::Lit(lit), ty)
    }

    pub fn int_lit(&mut self, value: i128) -> ExprId {
        let ty = self.int();
        self.lit(Literal::Int(value), ty)
    }

    pub fn str_lit(&mut self, value: &str) -> ExprId {
        let ty = self.string();
        let name = self.name(value);
        self.lit(Literal::Str(name), ty)
    }

    pub fn bool_lit(&mut self, value: bool) -> ExprId {
        let ty = self.bool();
        self.lit(Literal::Bool(value), ty)
    }

    pub fn nil(&mut self) -> ExprId {
        let ty = self.nil_type();
        self.lit(Literal::Nil, ty)
    }

    pub fn paren(&mut self, inner: ExprId) -> ExprId {
        let ty = self.expr_type(inner);
        self.push_expr(ExprKind::Paren(inner), ty)
    }

    pub fn unary(&mut self, op: crate::UnaryOp, operand: ExprId) -> ExprId {
        let ty = self.expr_type(operand);
        self.push_expr(ExprKind::Unary { op, operand }, ty)
    }

    pub fn binary(&mut self, op: crate::BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        let ty = if op.is_comparison() {
            self.bool()
        } else {
            self.expr_type(lhs)
        };
        self.push_expr(ExprKind::Binary { op, lhs, rhs }, ty)
    }

    pub fn address_of(&mut self, operand: ExprId) -> ExprId {
        let elem = self.expr_type(operand);
        let ty = self.pointer(elem);
        self.push_expr(ExprKind::AddressOf(operand), ty)
    }

    pub fn deref(&mut self, operand: ExprId) -> ExprId {
        let ty = match self.program.type_exprs[self.expr_type(operand).index()].kind {
            TypeExprKind::Pointer(elem) => elem,
            _ => TypeExprId::INVALID,
        };
        self.push_expr(ExprKind::Deref(operand), ty)
    }

    /// Field selection or method value with an explicit result type.
    pub fn selector(&mut self, base: ExprId, name: &str, ty: TypeExprId) -> ExprId {
        let name = self.name(name);
        self.push_expr(ExprKind::Selector { base, name }, ty)
    }

    /// `recv.method` typed as the method's signature.
    pub fn method_value(&mut self, recv: ExprId, method: FuncId) -> ExprId {
        let (name, sig) = {
            let f = &self.program.funcs[method.index()];
            (f.name, f.sig)
        };
        self.push_expr(ExprKind::Selector { base: recv, name }, sig)
    }

    /// `recv.method(args)` against a declared method.
    pub fn method_call(&mut self, recv: ExprId, method: FuncId, args: Vec<ExprId>) -> ExprId {
        let callee = self.method_value(recv, method);
        self.call(callee, args)
    }

    pub fn index(&mut self, base: ExprId, index: ExprId, ty: TypeExprId) -> ExprId {
        self.push_expr(ExprKind::Index { base, index }, ty)
    }

    /// Call typed from the callee's function type.
    pub fn call(&mut self, callee: ExprId, args: Vec<ExprId>) -> ExprId {
        let callee_ty = self.expr_type(callee);
        let results = match &self.program.type_exprs[callee_ty.index()].kind {
            TypeExprKind::Func(sig) => sig.results.clone(),
            _ => Vec::new(),
        };
        let ty = if results.len() == 1 {
            results[0]
        } else {
            self.tuple(results)
        };
        self.push_expr(
            ExprKind::Call {
                callee,
                args,
                spread: false,
            },
            ty,
        )
    }

    /// Direct call of a declared function.
    pub fn call_func(&mut self, func: FuncId, args: Vec<ExprId>) -> ExprId {
        let callee = self.func_ref(func);
        self.call(callee, args)
    }

    pub fn builtin(&mut self, builtin: Builtin, args: Vec<ExprId>, type_arg: Option<TypeExprId>, ty: TypeExprId) -> ExprId {
        self.push_expr(
            ExprKind::BuiltinCall {
                builtin,
                args,
                type_arg,
            },
            ty,
        )
    }

    /// Composite literal; keyed elements use field names.
    pub fn composite(&mut self, ty: TypeExprId, elems: &[(Option<&str>, ExprId)]) -> ExprId {
        let elems: Vec<CompositeElem> = elems
            .iter()
            .map(|&(key, value)| CompositeElem {
                key: key.map(|k| CompositeKey::Field(self.name(k))),
                value,
            })
            .collect();
        self.push_expr(ExprKind::CompositeLit { ty, elems }, ty)
    }

    pub fn func_lit(&mut self, func: FuncId) -> ExprId {
        let ty = self.program.funcs[func.index()].sig;
        self.push_expr(ExprKind::FuncLit(func), ty)
    }

    pub fn recv(&mut self, chan: ExprId) -> ExprId {
        let ty = match self.program.type_exprs[self.expr_type(chan).index()].kind {
            TypeExprKind::Chan { elem, .. } => elem,
            _ => TypeExprId::INVALID,
        };
        self.push_expr(ExprKind::Recv(chan), ty)
    }

    pub fn type_assert(&mut self, operand: ExprId, target: TypeExprId, comma_ok: bool) -> ExprId {
        let ty = if comma_ok {
            let ok = self.bool();
            self.tuple(vec![target, ok])
        } else {
            target
        };
        self.push_expr(
            ExprKind::TypeAssert {
                operand,
                target,
                comma_ok,
            },
            ty,
        )
    }

    pub fn convert(&mut self, ty: TypeExprId, operand: ExprId) -> ExprId {
        self.push_expr(ExprKind::Convert { ty, operand }, ty)
    }

    // Statements

    pub fn block(&mut self, stmts: Vec<StmtId>) -> StmtId {
        self.stmt(StmtKind::Block(stmts))
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn var_decl(&mut self, symbols: Vec<SymbolId>, values: Vec<ExprId>) -> StmtId {
        self.stmt(StmtKind::VarDecl { symbols, values })
    }

    /// `name := value` in `func`, returning the new symbol and the statement.
    pub fn define(&mut self, func: FuncId, name: &str, value: ExprId) -> (SymbolId, StmtId) {
        let ty = self.expr_type(value);
        let symbol = self.local(func, name, ty);
        let stmt = self.var_decl(vec![symbol], vec![value]);
        (symbol, stmt)
    }

    pub fn assign(&mut self, lhs: Vec<ExprId>, rhs: Vec<ExprId>) -> StmtId {
        self.stmt(StmtKind::Assign { op: None, lhs, rhs })
    }

    pub fn send(&mut self, chan: ExprId, value: ExprId) -> StmtId {
        self.stmt(StmtKind::Send { chan, value })
    }

    pub fn ret(&mut self, values: Vec<ExprId>) -> StmtId {
        self.stmt(StmtKind::Return(values))
    }

    pub fn if_stmt(&mut self, cond: ExprId, then: Vec<StmtId>, els: Option<Vec<StmtId>>) -> StmtId {
        let then = self.block(then);
        let els = els.map(|e| self.block(e));
        self.stmt(StmtKind::If {
            init: None,
            cond,
            then,
            els,
        })
    }

    pub fn for_loop(&mut self, cond: Option<ExprId>, body: Vec<StmtId>) -> StmtId {
        let body = self.block(body);
        self.stmt(StmtKind::For {
            init: None,
            cond,
            post: None,
            body,
        })
    }

    pub fn range(&mut self, subject: ExprId, define: Vec<SymbolId>, body: Vec<StmtId>) -> StmtId {
        let body = self.block(body);
        self.stmt(StmtKind::Range {
            subject,
            define,
            assign: Vec::new(),
            body,
        })
    }

    pub fn switch(&mut self, tag: Option<ExprId>, cases: Vec<SwitchCase>) -> StmtId {
        self.stmt(StmtKind::Switch {
            init: None,
            tag,
            cases,
        })
    }

    pub fn type_switch(&mut self, subject: ExprId, cases: Vec<TypeCase>) -> StmtId {
        self.stmt(StmtKind::TypeSwitch {
            init: None,
            subject,
            cases,
        })
    }

    pub fn select(&mut self, cases: Vec<SelectCase>) -> StmtId {
        self.stmt(StmtKind::Select(cases))
    }

    pub fn select_case(comm: CommClause, body: Vec<StmtId>) -> SelectCase {
        SelectCase { comm, body }
    }

    pub fn go(&mut self, call: ExprId) -> StmtId {
        self.stmt(StmtKind::Go(call))
    }

    pub fn defer(&mut self, call: ExprId) -> StmtId {
        self.stmt(StmtKind::Defer(call))
    }
}
