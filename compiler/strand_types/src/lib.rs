//! Type and runtime model for the Strand translation core.
//!
//! Interns every type of the program into a [`Pool`] of canonical
//! descriptors addressed by [`Idx`], and derives what code generation needs
//! to reproduce structural typing on a target without it:
//!
//! - embedded-member promotion and selector resolution ([`Selection`])
//! - method sets and the (concrete type × interface) [`SatisfactionTable`]
//! - generic instances with validated constraints ([`GenericInstance`])
//! - static type-assertion outcomes ([`AssertionOutcome`])
//! - copy semantics per type ([`ValueCategory`])
//! - runtime metadata for named types ([`RuntimeRegistry`])
//!
//! The entry point is [`build_type_model`]. The finished [`TypeModel`] is
//! immutable and shared by reference between the boxing and async analyses.

mod data;
mod flags;
mod generics;
mod idx;
mod mapper;
mod members;
mod model;
mod pool;
mod problem;
mod registry;
mod satisfy;
mod value_category;

pub use data::{FieldInfo, FuncSig, InterfaceInfo, MethodSig, TypeData, TypeTerm};
pub use flags::TypeFlags;
pub use generics::{ConstraintViolation, GenericInstance};
pub use idx::Idx;
pub use mapper::build_type_model;
pub use members::{
    EmbedStep, Member, MemberKind, MemberLookup, MemberTable, MethodSet, SelectError, Selection,
};
pub use model::{AssertionOutcome, AssertionSite, DeclaredMethod, NamedInfo, TypeModel};
pub use pool::Pool;
pub use problem::TypeProblem;
pub use registry::{RuntimeKind, RuntimeMethod, RuntimeRegistry, RuntimeType};
pub use satisfy::{Satisfaction, SatisfactionTable};
pub use value_category::ValueCategory;
