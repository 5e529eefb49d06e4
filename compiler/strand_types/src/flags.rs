//! Pre-computed type metadata flags.
//!
//! Flags are computed once when a type is interned so that common queries
//! (is this a pointer, does it mention a type parameter) need no traversal.
//! Named types only carry `IS_NAMED` plus what their type arguments
//! propagate: their underlying type is attached after interning.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u32 {
        // Presence (propagate from children)

        /// Mentions a type parameter; needs substitution before use.
        const HAS_TYPE_PARAM = 1 << 0;
        /// Contains a slice, map, or func inline; `==` is not defined.
        const NOT_COMPARABLE = 1 << 1;

        // Category

        const IS_BASIC = 1 << 8;
        const IS_NAMED = 1 << 9;
        const IS_POINTER = 1 << 10;
        const IS_STRUCT = 1 << 11;
        const IS_INTERFACE = 1 << 12;
        const IS_FUNC = 1 << 13;
        const IS_CHAN = 1 << 14;
        const IS_TYPE_PARAM = 1 << 15;

        // Assignment semantics

        /// Shared on assignment: slice, map, chan, pointer, interface, func.
        const IS_REFERENCE = 1 << 16;
        /// Copied on assignment: struct, array.
        const IS_AGGREGATE = 1 << 17;
    }
}

impl TypeFlags {
    /// Flags every composite inherits from its children.
    pub const PROPAGATE_MASK: Self = Self::HAS_TYPE_PARAM;

    #[inline]
    pub fn has_type_param(self) -> bool {
        self.contains(Self::HAS_TYPE_PARAM)
    }

    /// Inherited part of a child's flags.
    #[inline]
    pub fn propagated(self) -> Self {
        self & Self::PROPAGATE_MASK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_presence_flags_propagate() {
        let child = TypeFlags::HAS_TYPE_PARAM | TypeFlags::IS_POINTER | TypeFlags::IS_REFERENCE;
        assert_eq!(child.propagated(), TypeFlags::HAS_TYPE_PARAM);
        assert!(child.has_type_param());
        assert!(!TypeFlags::IS_BASIC.has_type_param());
    }
}
