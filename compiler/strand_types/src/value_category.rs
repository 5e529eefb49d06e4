//! Assignment semantics of a type.

/// What an assignment `a = b` does to a value of this type.
///
/// The boxing analysis uses it to find struct and array copies; the code
/// generator uses it to decide between a deep clone and a shared reference.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueCategory {
    /// Immutable scalar (numbers, strings, bools); copying is free.
    #[default]
    Scalar,
    /// Struct or array; assignment is a deep copy.
    Aggregate,
    /// Slice, map, channel, pointer, interface, or func; assignment shares.
    Reference,
}

impl ValueCategory {
    /// Assignment must clone the value.
    #[inline]
    pub const fn needs_copy(self) -> bool {
        matches!(self, Self::Aggregate)
    }

    #[inline]
    pub const fn is_reference(self) -> bool {
        matches!(self, Self::Reference)
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Aggregate => "aggregate",
            Self::Reference => "reference",
        }
    }
}

impl std::fmt::Display for ValueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
