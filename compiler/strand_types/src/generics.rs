//! Generic instances and constraint checking.

use strand_ir::{GenericOwner, Name, Span};

use crate::{Idx, TypeData, TypeModel};

/// One distinct instantiation of a generic function or type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericInstance {
    pub owner: GenericOwner,
    pub args: Vec<Idx>,
    /// Instantiated signature (functions) or named type (types).
    pub ty: Idx,
    /// First instantiation site.
    pub span: Span,
}

/// Why a type argument does not satisfy its constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstraintViolation {
    MissingMethod(Name),
    NotInTypeSet,
    NotComparable,
}

impl TypeModel {
    /// Check `arg` against the constraint interface `constraint`.
    ///
    /// Arguments that still mention type parameters are checked where they
    /// are instantiated with concrete types, not here.
    pub fn check_constraint(&self, arg: Idx, constraint: Idx) -> Result<(), ConstraintViolation> {
        let pool = &self.pool;
        if pool.flags(arg).has_type_param() {
            return Ok(());
        }
        let Some(info) = pool.interface(constraint) else {
            return Ok(());
        };

        if !info.terms.is_empty() {
            let arg_underlying = pool.underlying(arg);
            let in_set = info.terms.iter().any(|term| {
                if term.tilde {
                    pool.underlying(term.ty) == arg_underlying
                } else {
                    term.ty == arg
                }
            });
            if !in_set {
                return Err(ConstraintViolation::NotInTypeSet);
            }
        }

        if info.comparable && !pool.is_comparable(arg) {
            return Err(ConstraintViolation::NotComparable);
        }

        if !info.methods.is_empty() {
            let set = self.method_set(arg);
            for required in &info.methods {
                match set.get(required.name) {
                    Some(m) if m.sig() == Some(&required.sig) => {}
                    _ => {
                        return Err(ConstraintViolation::MissingMethod(required.name));
                    }
                }
            }
        }
        Ok(())
    }

    /// Instances of one generic declaration.
    pub fn instances_of(&self, owner: GenericOwner) -> impl Iterator<Item = &GenericInstance> {
        self.instances.iter().filter(move |i| i.owner == owner)
    }

    /// Whether `ty` is a concrete instance of a generic named type.
    pub fn is_instance_type(&self, ty: Idx) -> bool {
        matches!(self.pool.get(ty), Some(TypeData::Named { args, .. }) if !args.is_empty())
            && !self.pool.flags(ty).has_type_param()
    }
}
