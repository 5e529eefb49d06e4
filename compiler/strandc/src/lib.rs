//! Pipeline driver for the Strand translation core.
//!
//! `strandc` runs the analyses over a resolved Go program and merges their
//! results into one [`AnnotatedProgram`], the read-only view the code
//! generator consumes.
//!
//! # Design
//!
//! ```text
//! Program ──► type model ──┬──► boxing ──┬──► merge ──► validate ──► AnnotatedProgram
//!                          └──► async  ──┘
//! ```
//!
//! The boxing and async analyses depend only on the program and the type
//! model, so they run side by side on rayon. Each stage either succeeds
//! completely or yields diagnostics; no partial result is ever returned.
//! The merged view is validated before it is handed out, and any
//! disagreement between the analyses surfaces as an internal error.
//!
//! # Crate Dependencies
//!
//! `strandc` depends on every other strand crate. Problems from each pass
//! are converted to `strand_diagnostic` diagnostics here ([`IntoDiagnostic`])
//! and rendered by [`reporting`].

mod annotated;
mod config;
mod pipeline;
mod problem;
pub mod reporting;
mod tracing_setup;
mod validate;

pub use annotated::{AnnotatedProgram, Summary, SymbolInfo};
pub use config::CompilerConfig;
pub use pipeline::{compile, CompileError};
pub use problem::IntoDiagnostic;
pub use tracing_setup::init_tracing;
pub use validate::{validate, Violation};
