//! Read-only traversal of function bodies.
//!
//! Override `visit_*` to observe nodes and call the matching `walk_*` to
//! continue into children. Children are visited depth-first in source
//! evaluation order.
//!
//! Closure bodies are separate [`Function`](crate::Function)s: `walk_expr`
//! reports a `FuncLit` through [`Visitor::visit_func_lit`] and does not enter
//! it. Analyses that treat closures as part of their parent override that hook.

use crate::{
    ensure_sufficient_stack, CommClause, ExprId, FuncId, Program, StmtId, StmtKind,
};

pub trait Visitor<'p> {
    fn visit_stmt(&mut self, program: &'p Program, id: StmtId) {
        walk_stmt(self, program, id);
    }

    fn visit_expr(&mut self, program: &'p Program, id: ExprId) {
        walk_expr(self, program, id);
    }

    /// A closure literal. Not entered by default.
    fn visit_func_lit(&mut self, program: &'p Program, func: FuncId) {
        let _ = (program, func);
    }
}

/// Walk a function body, if it has one.
pub fn walk_function<'p, V: Visitor<'p> + ?Sized>(visitor: &mut V, program: &'p Program, func: FuncId) {
    if let Some(body) = program.func(func).body {
        visitor.visit_stmt(program, body);
    }
}

pub fn walk_expr<'p, V: Visitor<'p> + ?Sized>(visitor: &mut V, program: &'p Program, id: ExprId) {
    let expr = program.expr(id);
    if let crate::ExprKind::FuncLit(func) = expr.kind {
        visitor.visit_func_lit(program, func);
        return;
    }
    ensure_sufficient_stack(|| {
        for child in expr.kind.children() {
            visitor.visit_expr(program, child);
        }
    });
}

fn walk_opt_stmt<'p, V: Visitor<'p> + ?Sized>(visitor: &mut V, program: &'p Program, id: Option<StmtId>) {
    if let Some(id) = id {
        visitor.visit_stmt(program, id);
    }
}

fn walk_stmts<'p, V: Visitor<'p> + ?Sized>(visitor: &mut V, program: &'p Program, ids: &'p [StmtId]) {
    for &id in ids {
        visitor.visit_stmt(program, id);
    }
}

fn walk_exprs<'p, V: Visitor<'p> + ?Sized>(visitor: &mut V, program: &'p Program, ids: &'p [ExprId]) {
    for &id in ids {
        visitor.visit_expr(program, id);
    }
}

pub fn walk_stmt<'p, V: Visitor<'p> + ?Sized>(visitor: &mut V, program: &'p Program, id: StmtId) {
    ensure_sufficient_stack(|| match &program.stmt(id).kind {
        StmtKind::Block(stmts) => walk_stmts(visitor, program, stmts),
        StmtKind::Expr(e) | StmtKind::Go(e) | StmtKind::Defer(e) => visitor.visit_expr(program, *e),
        StmtKind::VarDecl { values, .. } => walk_exprs(visitor, program, values),
        StmtKind::Assign { lhs, rhs, .. } => {
            walk_exprs(visitor, program, lhs);
            walk_exprs(visitor, program, rhs);
        }
        StmtKind::IncDec { target, .. } => visitor.visit_expr(program, *target),
        StmtKind::Send { chan, value } => {
            visitor.visit_expr(program, *chan);
            visitor.visit_expr(program, *value);
        }
        StmtKind::Return(values) => walk_exprs(visitor, program, values),
        StmtKind::If {
            init,
            cond,
            then,
            els,
        } => {
            walk_opt_stmt(visitor, program, *init);
            visitor.visit_expr(program, *cond);
            visitor.visit_stmt(program, *then);
            walk_opt_stmt(visitor, program, *els);
        }
        StmtKind::For {
            init,
            cond,
            post,
            body,
        } => {
            walk_opt_stmt(visitor, program, *init);
            if let Some(cond) = cond {
                visitor.visit_expr(program, *cond);
            }
            visitor.visit_stmt(program, *body);
            walk_opt_stmt(visitor, program, *post);
        }
        StmtKind::Range {
            subject,
            assign,
            body,
            ..
        } => {
            visitor.visit_expr(program, *subject);
            walk_exprs(visitor, program, assign);
            visitor.visit_stmt(program, *body);
        }
        StmtKind::Switch { init, tag, cases } => {
            walk_opt_stmt(visitor, program, *init);
            if let Some(tag) = tag {
                visitor.visit_expr(program, *tag);
            }
            for case in cases {
                walk_exprs(visitor, program, &case.exprs);
                walk_stmts(visitor, program, &case.body);
            }
        }
        StmtKind::TypeSwitch {
            init,
            subject,
            cases,
        } => {
            walk_opt_stmt(visitor, program, *init);
            visitor.visit_expr(program, *subject);
            for case in cases {
                walk_stmts(visitor, program, &case.body);
            }
        }
        StmtKind::Select(cases) => {
            for case in cases {
                match &case.comm {
                    CommClause::Send { chan, value } => {
                        visitor.visit_expr(program, *chan);
                        visitor.visit_expr(program, *value);
                    }
                    CommClause::Recv { recv, assign, .. } => {
                        visitor.visit_expr(program, *recv);
                        walk_exprs(visitor, program, assign);
                    }
                    CommClause::Default => {}
                }
                walk_stmts(visitor, program, &case.body);
            }
        }
        StmtKind::Labeled { body, .. } => visitor.visit_stmt(program, *body),
        StmtKind::Branch { .. } | StmtKind::Empty => {}
    });
}
