//! Arena index handles.
//!
//! Every node of the typed program lives in a flat arena and is referenced
//! by a 32-bit index. Indices are `Copy`, compare in O(1), and stay valid for
//! the whole compilation run because arenas are append-only.

use std::fmt;

macro_rules! define_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel value for "no node".
            pub const INVALID: Self = Self(u32::MAX);

            /// Create a handle from a raw arena index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Create a handle from a `usize` arena position.
            ///
            /// Positions beyond `u32::MAX` map to [`Self::INVALID`].
            #[inline]
            pub fn from_usize(index: usize) -> Self {
                Self(u32::try_from(index).unwrap_or(u32::MAX))
            }

            /// Position in the owning arena.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Raw index value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Check that this is not the sentinel.
            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                } else {
                    write!(f, concat!(stringify!($name), "::INVALID"))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

define_index!(
    /// A variable, parameter, named result, struct field, or global.
    SymbolId
);
define_index!(
    /// A declared function, method, or closure body.
    FuncId
);
define_index!(
    /// An expression node.
    ExprId
);
define_index!(
    /// A statement node.
    StmtId
);
define_index!(
    /// A syntactic (frontend-resolved) type expression.
    TypeExprId
);
define_index!(
    /// A named type declaration.
    TypeDeclId
);
define_index!(
    /// A source file in the [`SourceMap`](crate::SourceMap).
    FileId
);

#[cfg(test)]
mod tests;
