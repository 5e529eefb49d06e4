//! Diagnostic system for the Strand analyses.
//!
//! - Error codes for searchability, grouped by the pass that raises them
//! - A primary span (where it went wrong) and secondary labels (why)
//! - A [`Pass`] tag naming the analysis
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] is type-level proof that at least one error was
//! emitted. The driver returns `Err(ErrorGuaranteed)` together with the
//! queued diagnostics, never a partial result.

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Pass, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
