//! Output of the boxing analysis.

use rustc_hash::{FxHashMap, FxHashSet};
use strand_ir::{ExprId, FuncId, SymbolId};
use strand_types::Idx;

/// What an address-of operation refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressRoot {
    /// A variable, parameter, named result or global.
    Symbol(SymbolId),
    /// A struct field (canonical symbol).
    Field(SymbolId),
    /// Slice or array element; elements are addressed through their
    /// container and never boxed.
    Element,
    /// `&T{...}`: the literal has no other name to alias.
    Composite,
    /// `&*p`: the pointer itself.
    Pointer,
}

/// One explicit or implicit address-taking.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddressEvent {
    /// The `&` expression, or the selector of an implicit receiver.
    pub expr: ExprId,
    /// Enclosing function; `None` in package-level initializers.
    pub func: Option<FuncId>,
    pub root: AddressRoot,
    pub escaping: bool,
    /// Taken by a pointer-receiver method call or method value.
    pub implicit: bool,
}

/// Aggregate value copied on assignment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyPoint {
    /// The copied value.
    pub value: ExprId,
    pub ty: Idx,
    /// The destination is an existing reference cell (boxed variable,
    /// boxed field, or `*p`): copy into it instead of rebinding it.
    pub into_cell: bool,
}

#[derive(Clone, Debug, Default)]
pub struct BoxingResult {
    pub(crate) boxed: FxHashSet<SymbolId>,
    pub(crate) address_taken: FxHashSet<SymbolId>,
    pub(crate) aliases: FxHashMap<SymbolId, SymbolId>,
    pub(crate) events: Vec<AddressEvent>,
    pub(crate) copy_points: Vec<CopyPoint>,
}

impl BoxingResult {
    /// Whether the symbol's storage must be a reference cell.
    #[inline]
    pub fn is_boxed(&self, symbol: SymbolId) -> bool {
        self.boxed.contains(&symbol)
    }

    /// Boxed symbols in ID order.
    pub fn boxed_symbols(&self) -> Vec<SymbolId> {
        let mut out: Vec<_> = self.boxed.iter().copied().collect();
        out.sort_unstable();
        out
    }

    pub fn is_address_taken(&self, symbol: SymbolId) -> bool {
        self.address_taken.contains(&symbol)
    }

    /// Pointee of a pointer local that the generator replaces by the
    /// pointee itself.
    pub fn alias_of(&self, pointer: SymbolId) -> Option<SymbolId> {
        self.aliases.get(&pointer).copied()
    }

    /// `(pointer, pointee)` pairs in pointer ID order.
    pub fn aliases(&self) -> Vec<(SymbolId, SymbolId)> {
        let mut out: Vec<_> = self.aliases.iter().map(|(&p, &t)| (p, t)).collect();
        out.sort_unstable();
        out
    }

    pub fn events(&self) -> &[AddressEvent] {
        &self.events
    }

    pub fn copy_points(&self) -> &[CopyPoint] {
        &self.copy_points
    }

    pub fn copy_point(&self, value: ExprId) -> Option<&CopyPoint> {
        self.copy_points.iter().find(|c| c.value == value)
    }
}
