//! Evaluation-order hazards around suspension points.
//!
//! Operands are evaluated left to right. When a later operand of the same
//! expression (or statement) contains a suspension point, every earlier
//! operand with a side effect must be evaluated into a temporary first, so
//! that lowering the suspension cannot move it across those effects.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use strand_ir::visitor::{walk_expr, walk_function, walk_stmt, Visitor};
use strand_ir::{ensure_sufficient_stack, ExprId, ExprKind, FuncId, Program, StmtId, StmtKind};

use crate::{FuncAsync, OrderHazard, SuspendSite, SuspensionPoint};

pub(crate) fn find_hazards(program: &Program, funcs: &[FuncAsync], points: &[SuspensionPoint]) -> Vec<OrderHazard> {
    let suspending: FxHashSet<ExprId> = points
        .iter()
        .filter_map(|p| match p.site {
            SuspendSite::Expr(e) => Some(e),
            SuspendSite::Stmt(_) => None,
        })
        .collect();
    if suspending.is_empty() {
        return Vec::new();
    }

    let mut finder = HazardFinder {
        func: FuncId::INVALID,
        suspending: &suspending,
        first: FxHashMap::default(),
        reported: FxHashSet::default(),
        out: Vec::new(),
    };
    for (i, f) in funcs.iter().enumerate() {
        if f.is_async {
            let id = FuncId::from_usize(i);
            finder.func = id;
            walk_function(&mut finder, program, id);
        }
    }
    finder.out
}

struct HazardFinder<'a> {
    func: FuncId,
    suspending: &'a FxHashSet<ExprId>,
    /// Memoized first suspension (in evaluation order) inside a subtree.
    first: FxHashMap<ExprId, Option<ExprId>>,
    reported: FxHashSet<ExprId>,
    out: Vec<OrderHazard>,
}

impl HazardFinder<'_> {
    fn first_suspension(&mut self, program: &Program, id: ExprId) -> Option<ExprId> {
        if let Some(&cached) = self.first.get(&id) {
            return cached;
        }
        let found = ensure_sufficient_stack(|| {
            program
                .expr(id)
                .kind
                .children()
                .into_iter()
                .find_map(|child| self.first_suspension(program, child))
        })
        .or_else(|| self.suspending.contains(&id).then_some(id));
        self.first.insert(id, found);
        found
    }

    fn check(&mut self, program: &Program, operands: &[ExprId]) {
        for (i, &operand) in operands.iter().enumerate() {
            let Some(suspension) = self.first_suspension(program, operand) else {
                continue;
            };
            for &earlier in &operands[..i] {
                if !is_pure(program, earlier) && self.reported.insert(earlier) {
                    self.out.push(OrderHazard {
                        func: self.func,
                        operand: earlier,
                        suspension,
                    });
                }
            }
        }
    }
}

impl<'p> Visitor<'p> for HazardFinder<'_> {
    fn visit_stmt(&mut self, program: &'p Program, id: StmtId) {
        match &program.stmt(id).kind {
            StmtKind::Assign { lhs, rhs, .. } => {
                let operands: SmallVec<[ExprId; 4]> = lhs.iter().chain(rhs).copied().collect();
                self.check(program, &operands);
            }
            StmtKind::VarDecl { values, .. } | StmtKind::Return(values) => self.check(program, values),
            StmtKind::Send { chan, value } => self.check(program, &[*chan, *value]),
            _ => {}
        }
        walk_stmt(self, program, id);
    }

    fn visit_expr(&mut self, program: &'p Program, id: ExprId) {
        match &program.expr(id).kind {
            // The right operand may not run at all.
            ExprKind::Binary { op, .. } if op.is_short_circuit() => {}
            kind => {
                let children = kind.children();
                if children.len() > 1 {
                    self.check(program, &children);
                }
            }
        }
        walk_expr(self, program, id);
    }
}

/// Evaluating the expression has no effect other than producing its value.
fn is_pure(program: &Program, id: ExprId) -> bool {
    ensure_sufficient_stack(|| match &program.expr(id).kind {
        ExprKind::Ident(_)
        | ExprKind::FuncRef(_)
        | ExprKind::Instantiate { .. }
        | ExprKind::Lit(_)
        | ExprKind::FuncLit(_) => true,
        ExprKind::Call { .. } | ExprKind::Recv(_) | ExprKind::TypeAssert { .. } => false,
        ExprKind::BuiltinCall { builtin, args, .. } => {
            builtin.is_pure() && args.iter().all(|&a| is_pure(program, a))
        }
        kind => kind.children().into_iter().all(|c| is_pure(program, c)),
    })
}
