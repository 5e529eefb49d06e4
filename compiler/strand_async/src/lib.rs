//! Async contagion analysis for the Strand translation core.
//!
//! The target runs every task on one event loop, so a function that can
//! wait for another task has to be lowered as a coroutine, and so does
//! every function that calls it. This crate finds those functions, the
//! exact expressions and statements where they suspend, and the operands
//! whose evaluation order the lowering must preserve around them.
//!
//! # Design
//!
//! - **Whole program**: a call graph over every declared function and
//!   closure, with interface calls fanned out to every implementation and
//!   calls through function values resolved from their assignments.
//! - **Monotone**: facts only ever turn a function async, so a reverse
//!   worklist over the graph reaches the fixpoint in one pass per function.
//! - **Configured edges**: blocking primitives and the synchronous
//!   allow-list come from [`AsyncConfig`], matched by qualified name.
//!
//! # Crate Dependencies
//!
//! `strand_async` reads the typed tree from `strand_ir` and method
//! resolution and interface satisfaction from `strand_types`. It shares
//! nothing with the boxing analysis.

mod analysis;
mod collect;
mod config;
mod graph;
mod hazards;
mod problem;
mod result;

pub use analysis::analyze_async;
pub use config::{AsyncConfig, DEFAULT_BLOCKING_PRIMITIVES};
pub use graph::{CallContext, CallEdge, CallGraph, CallKind, OpenSite};
pub use problem::AsyncProblem;
pub use result::{
    AsyncReason, AsyncResult, FuncAsync, OrderHazard, SuspendKind, SuspendSite, SuspensionPoint,
};
