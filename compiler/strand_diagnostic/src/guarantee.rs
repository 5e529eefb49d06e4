//! Type-level proof that an error was reported.

use std::fmt;

/// Proof that at least one error diagnostic was emitted.
///
/// Only [`DiagnosticQueue`](crate::DiagnosticQueue) and
/// [`ErrorGuaranteed::from_error_count`] can create one, so a function
/// returning `Err(ErrorGuaranteed)` cannot fail silently.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    /// `Some` when `count` errors were emitted and `count > 0`.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then_some(ErrorGuaranteed(()))
    }

    pub(crate) fn new_emitted() -> Self {
        ErrorGuaranteed(())
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}

impl std::error::Error for ErrorGuaranteed {}

#[cfg(test)]
mod tests;
