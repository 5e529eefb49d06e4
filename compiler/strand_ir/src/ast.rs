//! Typed syntax tree.
//!
//! Every node is stored flat in the [`Program`](crate::Program) arenas and
//! referenced by ID. Expressions carry their resolved static type; identifiers
//! carry their resolved [`SymbolId`] or [`FuncId`]. No name resolution happens
//! after the frontend.

use smallvec::SmallVec;

use crate::{ExprId, FuncId, Name, Span, StmtId, SymbolId, TypeDeclId, TypeExprId, TypeParamDecl};

/// Constant value of a literal.
///
/// Floats are stored as bits so the tree stays `Eq + Hash`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Bool(bool),
    Int(i128),
    Float(u64),
    Imag(u64),
    Rune(char),
    Str(Name),
    Nil,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    AndNot,
    Shl,
    Shr,
    LogicalAnd,
    LogicalOr,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl BinaryOp {
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }

    /// `&&` and `||` evaluate the right operand conditionally.
    pub const fn is_short_circuit(self) -> bool {
        matches!(self, BinaryOp::LogicalAnd | BinaryOp::LogicalOr)
    }
}

/// Predeclared functions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Append,
    Cap,
    Clear,
    Close,
    Complex,
    Copy,
    Delete,
    Imag,
    Len,
    Make,
    Max,
    Min,
    New,
    Panic,
    Print,
    Println,
    Real,
    Recover,
}

impl Builtin {
    /// Builtins with no observable side effect on program state.
    pub const fn is_pure(self) -> bool {
        matches!(
            self,
            Builtin::Cap
                | Builtin::Complex
                | Builtin::Imag
                | Builtin::Len
                | Builtin::Max
                | Builtin::Min
                | Builtin::Real
        )
    }
}

/// Key of a composite literal element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CompositeKey {
    Field(Name),
    Index(ExprId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompositeElem {
    pub key: Option<CompositeKey>,
    pub value: ExprId,
}

/// Expression variants.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// Variable, parameter, or global.
    Ident(SymbolId),
    /// Reference to a declared top-level function.
    FuncRef(FuncId),
    /// Explicit or inferred instantiation of a generic function.
    Instantiate {
        func: FuncId,
        type_args: Vec<TypeExprId>,
    },
    Lit(Literal),
    Paren(ExprId),
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    /// `&operand`
    AddressOf(ExprId),
    /// `*operand`
    Deref(ExprId),
    /// `base.name`: field access, method value, or (when the callee of a
    /// call) method call. Promotion through embedded fields is resolved by
    /// the type model.
    Selector {
        base: ExprId,
        name: Name,
    },
    Index {
        base: ExprId,
        index: ExprId,
    },
    SliceExpr {
        base: ExprId,
        low: Option<ExprId>,
        high: Option<ExprId>,
        max: Option<ExprId>,
    },
    Call {
        callee: ExprId,
        args: Vec<ExprId>,
        /// `f(xs...)`
        spread: bool,
    },
    BuiltinCall {
        builtin: Builtin,
        args: Vec<ExprId>,
        /// Type operand of `make` and `new`.
        type_arg: Option<TypeExprId>,
    },
    CompositeLit {
        ty: TypeExprId,
        elems: Vec<CompositeElem>,
    },
    /// Closure; the body is a separate [`Function`] owned by the enclosing one.
    FuncLit(FuncId),
    /// `<-operand`
    Recv(ExprId),
    /// `operand.(target)`
    TypeAssert {
        operand: ExprId,
        target: TypeExprId,
        comma_ok: bool,
    },
    /// `T(operand)`
    Convert {
        ty: TypeExprId,
        operand: ExprId,
    },
}

impl ExprKind {
    /// Child expressions in evaluation order.
    pub fn children(&self) -> SmallVec<[ExprId; 4]> {
        let mut out = SmallVec::new();
        match self {
            ExprKind::Ident(_)
            | ExprKind::FuncRef(_)
            | ExprKind::Instantiate { .. }
            | ExprKind::Lit(_)
            | ExprKind::FuncLit(_) => {}
            ExprKind::Paren(e)
            | ExprKind::Unary { operand: e, .. }
            | ExprKind::AddressOf(e)
            | ExprKind::Deref(e)
            | ExprKind::Selector { base: e, .. }
            | ExprKind::Recv(e)
            | ExprKind::TypeAssert { operand: e, .. }
            | ExprKind::Convert { operand: e, .. } => out.push(*e),
            ExprKind::Binary { lhs, rhs, .. } => {
                out.push(*lhs);
                out.push(*rhs);
            }
            ExprKind::Index { base, index } => {
                out.push(*base);
                out.push(*index);
            }
            ExprKind::SliceExpr {
                base,
                low,
                high,
                max,
            } => {
                out.push(*base);
                out.extend([*low, *high, *max].into_iter().flatten());
            }
            ExprKind::Call { callee, args, .. } => {
                out.push(*callee);
                out.extend(args.iter().copied());
            }
            ExprKind::BuiltinCall { args, .. } => out.extend(args.iter().copied()),
            ExprKind::CompositeLit { elems, .. } => {
                for elem in elems {
                    if let Some(CompositeKey::Index(k)) = elem.key {
                        out.push(k);
                    }
                    out.push(elem.value);
                }
            }
        }
        out
    }
}

/// Expression node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Expr {
    pub kind: ExprKind,
    /// Resolved static type.
    pub ty: TypeExprId,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SwitchCase {
    /// Empty for `default`.
    pub exprs: Vec<ExprId>,
    pub body: Vec<StmtId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeCase {
    /// Empty for `default`. A `nil` case is the [`TypeExprKind::Nil`](crate::TypeExprKind::Nil) type.
    pub types: Vec<TypeExprId>,
    /// Implicit per-clause variable of `switch v := x.(type)`.
    pub binding: Option<SymbolId>,
    pub body: Vec<StmtId>,
}

/// Communication clause of a `select` case.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommClause {
    Send {
        chan: ExprId,
        value: ExprId,
    },
    /// `case v, ok := <-ch` (bind) or `case x = <-ch` (assign).
    Recv {
        recv: ExprId,
        bind: Vec<SymbolId>,
        assign: Vec<ExprId>,
    },
    Default,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SelectCase {
    pub comm: CommClause,
    pub body: Vec<StmtId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

/// Statement variants.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StmtKind {
    Block(Vec<StmtId>),
    Expr(ExprId),
    /// `var a, b = x, y` and `a, b := x, y`. `values` is empty for zero
    /// initialization and has one element for a multi-value call.
    VarDecl {
        symbols: Vec<SymbolId>,
        values: Vec<ExprId>,
    },
    /// `lhs = rhs` or `lhs op= rhs`.
    Assign {
        op: Option<BinaryOp>,
        lhs: Vec<ExprId>,
        rhs: Vec<ExprId>,
    },
    IncDec {
        target: ExprId,
        inc: bool,
    },
    Send {
        chan: ExprId,
        value: ExprId,
    },
    Return(Vec<ExprId>),
    If {
        init: Option<StmtId>,
        cond: ExprId,
        then: StmtId,
        els: Option<StmtId>,
    },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        post: Option<StmtId>,
        body: StmtId,
    },
    /// `for k, v := range subject` (define) or `for k, v = range subject` (assign).
    Range {
        subject: ExprId,
        define: Vec<SymbolId>,
        assign: Vec<ExprId>,
        body: StmtId,
    },
    Switch {
        init: Option<StmtId>,
        tag: Option<ExprId>,
        cases: Vec<SwitchCase>,
    },
    TypeSwitch {
        init: Option<StmtId>,
        subject: ExprId,
        cases: Vec<TypeCase>,
    },
    Select(Vec<SelectCase>),
    /// `go call`
    Go(ExprId),
    /// `defer call`
    Defer(ExprId),
    Labeled {
        label: Name,
        body: StmtId,
    },
    Branch {
        kind: BranchKind,
        label: Option<Name>,
    },
    Empty,
}

/// Statement node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// What a symbol names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Local,
    Param,
    Receiver,
    NamedResult,
    Field,
    Global,
}

/// A variable, parameter, named result, struct field, or global.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub name: Name,
    pub ty: TypeExprId,
    pub kind: SymbolKind,
    /// Declaring function; `None` for globals and fields.
    pub owner: Option<FuncId>,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FuncKind {
    Func,
    Method,
    Closure,
}

/// Method receiver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Receiver {
    /// `None` for an unnamed receiver.
    pub symbol: Option<SymbolId>,
    pub decl: TypeDeclId,
    /// `func (r *T)` rather than `func (r T)`.
    pub pointer: bool,
}

/// Function, method, or closure.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Function {
    /// Empty for closures.
    pub name: Name,
    pub package: Name,
    pub kind: FuncKind,
    pub span: Span,
    /// Function type of the declaration (without the receiver).
    pub sig: TypeExprId,
    pub receiver: Option<Receiver>,
    /// Enclosing function of a closure.
    pub parent: Option<FuncId>,
    pub type_params: Vec<TypeParamDecl>,
    pub params: Vec<SymbolId>,
    /// Named results; empty when results are unnamed.
    pub results: Vec<SymbolId>,
    /// `None` for functions implemented outside the program.
    pub body: Option<StmtId>,
}

impl Function {
    #[inline]
    pub fn is_external(&self) -> bool {
        self.body.is_none()
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// Package-level variable with its optional initializer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GlobalVar {
    pub symbol: SymbolId,
    pub value: Option<ExprId>,
}
