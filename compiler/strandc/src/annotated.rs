//! The typed program together with every analysis result.
//!
//! This is what the code generator consumes: one read-only view answering
//! "is this variable a cell", "does this function suspend", "what runtime
//! type does this expression have" without the caller knowing which pass
//! computed the answer.

use strand_async::{AsyncResult, CallGraph, FuncAsync, OrderHazard, SuspendSite, SuspensionPoint};
use strand_escape::{BoxingResult, CopyPoint};
use strand_ir::{ExprId, FuncId, Program, SymbolId};
use strand_types::{
    AssertionOutcome, AssertionSite, GenericInstance, Idx, RuntimeRegistry, SatisfactionTable,
    Selection, TypeData, TypeModel,
};

/// Per-symbol annotations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    pub ty: Idx,
    /// Some `&` reaches the symbol.
    pub address_taken: bool,
    /// Stored in a reference cell.
    pub boxed: bool,
    /// A pointer local rewritten to name its pointee directly.
    pub alias_of: Option<SymbolId>,
}

/// Counts for logging and tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub funcs: usize,
    pub async_funcs: usize,
    pub boxed: usize,
    pub aliases: usize,
    pub suspension_points: usize,
    pub order_hazards: usize,
    pub copy_points: usize,
    pub instances: usize,
    pub runtime_types: usize,
}

pub struct AnnotatedProgram<'p> {
    program: &'p Program,
    model: TypeModel,
    boxing: BoxingResult,
    asyncs: AsyncResult,
}

impl<'p> AnnotatedProgram<'p> {
    pub(crate) fn new(program: &'p Program, model: TypeModel, boxing: BoxingResult, asyncs: AsyncResult) -> Self {
        AnnotatedProgram {
            program,
            model,
            boxing,
            asyncs,
        }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn model(&self) -> &TypeModel {
        &self.model
    }

    pub fn boxing(&self) -> &BoxingResult {
        &self.boxing
    }

    pub fn async_result(&self) -> &AsyncResult {
        &self.asyncs
    }

    // Symbols

    pub fn symbol(&self, symbol: SymbolId) -> SymbolInfo {
        SymbolInfo {
            ty: self.model.symbol_type(symbol),
            address_taken: self.boxing.is_address_taken(symbol),
            boxed: self.boxing.is_boxed(symbol),
            alias_of: self.boxing.alias_of(symbol),
        }
    }

    #[inline]
    pub fn is_boxed(&self, symbol: SymbolId) -> bool {
        self.boxing.is_boxed(symbol)
    }

    #[inline]
    pub fn alias_of(&self, pointer: SymbolId) -> Option<SymbolId> {
        self.boxing.alias_of(pointer)
    }

    // Functions

    #[inline]
    pub fn is_async(&self, func: FuncId) -> bool {
        self.asyncs.is_async(func)
    }

    pub fn func_async(&self, func: FuncId) -> FuncAsync {
        self.asyncs.func(func)
    }

    pub fn call_graph(&self) -> &CallGraph {
        self.asyncs.call_graph()
    }

    pub fn suspension_points(&self) -> &[SuspensionPoint] {
        self.asyncs.suspension_points()
    }

    pub fn suspension_at(&self, site: SuspendSite) -> Option<&SuspensionPoint> {
        self.asyncs.suspension_at(site)
    }

    /// Operands to evaluate into temporaries inside `func`.
    pub fn order_hazards_in(&self, func: FuncId) -> impl Iterator<Item = &OrderHazard> {
        self.asyncs
            .order_hazards()
            .iter()
            .filter(move |h| h.func == func)
    }

    // Expressions and types

    #[inline]
    pub fn expr_type(&self, expr: ExprId) -> Idx {
        self.model.expr_type(expr)
    }

    /// Descriptor of the expression's type.
    pub fn descriptor(&self, expr: ExprId) -> Option<&TypeData> {
        self.model.pool().get(self.model.expr_type(expr))
    }

    pub fn selection(&self, expr: ExprId) -> Option<&Selection> {
        self.model.selection(expr)
    }

    pub fn copy_point(&self, value: ExprId) -> Option<&CopyPoint> {
        self.boxing.copy_point(value)
    }

    pub fn assertion(&self, site: AssertionSite) -> Option<&AssertionOutcome> {
        self.model.assertion(site)
    }

    pub fn satisfaction(&self) -> &SatisfactionTable {
        self.model.satisfaction()
    }

    pub fn instances(&self) -> &[GenericInstance] {
        self.model.instances()
    }

    pub fn registry(&self) -> &RuntimeRegistry {
        self.model.registry()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            funcs: self.program.func_count(),
            async_funcs: self.asyncs.async_funcs().len(),
            boxed: self.boxing.boxed_symbols().len(),
            aliases: self.boxing.aliases().len(),
            suspension_points: self.asyncs.suspension_points().len(),
            order_hazards: self.asyncs.order_hazards().len(),
            copy_points: self.boxing.copy_points().len(),
            instances: self.model.instances().len(),
            runtime_types: self.model.registry().len(),
        }
    }
}

impl std::fmt::Debug for AnnotatedProgram<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotatedProgram")
            .field("summary", &self.summary())
            .finish_non_exhaustive()
    }
}
