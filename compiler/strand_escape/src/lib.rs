//! Boxing analysis for the Strand translation core.
//!
//! Decides which variables and struct fields must be stored in a reference
//! cell on the target, because their address escapes the expression that
//! takes it. Also reports the pointer locals that can be rewritten into
//! plain aliases of their pointee, and every struct or array copy together
//! with whether it writes into an existing cell.
//!
//! # Design
//!
//! The analysis is flow-insensitive and conservative: one scan over every
//! function body collects address events and pointer bindings, and a
//! monotone worklist settles the boxed set. Closures are scanned as their
//! own functions; using a pointer local from a closure counts as capture.
//!
//! # Crate Dependencies
//!
//! `strand_escape` reads the typed tree from `strand_ir` and resolved
//! selections, field aliases and value categories from `strand_types`. It
//! does not depend on the async analysis; the two run independently.

mod boxing;
mod problem;
mod result;

pub use boxing::analyze_boxing;
pub use problem::BoxingProblem;
pub use result::{AddressEvent, AddressRoot, BoxingResult, CopyPoint};
