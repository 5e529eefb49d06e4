//! Canonical type handle.
//!
//! `Idx` indexes the type [`Pool`](crate::Pool). Structurally identical types
//! intern to the same index, so type identity is an integer comparison. Every
//! predeclared basic type and the untyped nil type sit at fixed indices.

use std::fmt;

use strand_ir::BasicKind;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    pub const BOOL: Self = Self(0);
    pub const INT: Self = Self(1);
    pub const STRING: Self = Self(16);
    /// Type of the untyped `nil` literal.
    pub const NIL: Self = Self(18);

    /// Number of pre-interned types; dynamic types start here.
    pub const PRIMITIVE_COUNT: u32 = 19;

    /// Sentinel for "no type".
    pub const NONE: Self = Self(u32::MAX);

    /// Fixed index of a basic type (its position in [`BasicKind::ALL`]).
    #[inline]
    pub const fn basic(kind: BasicKind) -> Self {
        Self(kind as u32)
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::PRIMITIVE_COUNT
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

impl Default for Idx {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Idx::NONE")
        } else if *self == Self::NIL {
            write!(f, "Idx(nil)")
        } else if self.is_primitive() {
            write!(f, "Idx({})", BasicKind::ALL[self.index()].as_str())
        } else {
            write!(f, "Idx({})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_indices_follow_declaration_order() {
        for (i, kind) in BasicKind::ALL.iter().enumerate() {
            assert_eq!(Idx::basic(*kind).index(), i);
        }
        assert_eq!(Idx::basic(BasicKind::Bool), Idx::BOOL);
        assert_eq!(Idx::basic(BasicKind::Int), Idx::INT);
        assert_eq!(Idx::basic(BasicKind::String), Idx::STRING);
        assert_eq!(Idx::NIL.raw() + 1, Idx::PRIMITIVE_COUNT);
    }

    #[test]
    fn debug_names_primitives() {
        assert_eq!(format!("{:?}", Idx::INT), "Idx(int)");
        assert_eq!(format!("{:?}", Idx::NIL), "Idx(nil)");
        assert_eq!(format!("{:?}", Idx::NONE), "Idx::NONE");
    }
}
