//! Structural interface satisfaction and static assertion outcomes.

use rustc_hash::FxHashMap;
use strand_ir::Name;

use crate::{AssertionOutcome, Idx, Member, TypeModel};

/// Result of checking one concrete type against one interface.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Satisfaction {
    pub satisfied: bool,
    /// For each interface method, in interface order, the member that
    /// implements it. Only complete when `satisfied`.
    pub thunks: Vec<Member>,
    /// Interface methods with no matching member.
    pub missing: Vec<Name>,
}

/// Precomputed (concrete type × interface) table.
#[derive(Clone, Debug, Default)]
pub struct SatisfactionTable {
    entries: FxHashMap<(Idx, Idx), Satisfaction>,
    /// Interface to the concrete types satisfying it, sorted.
    by_iface: FxHashMap<Idx, Vec<Idx>>,
}

impl SatisfactionTable {
    pub(crate) fn insert(&mut self, concrete: Idx, iface: Idx, entry: Satisfaction) {
        if entry.satisfied {
            let list = self.by_iface.entry(iface).or_default();
            if let Err(pos) = list.binary_search(&concrete) {
                list.insert(pos, concrete);
            }
        }
        self.entries.insert((concrete, iface), entry);
    }

    pub fn get(&self, concrete: Idx, iface: Idx) -> Option<&Satisfaction> {
        self.entries.get(&(concrete, iface))
    }

    pub fn satisfies(&self, concrete: Idx, iface: Idx) -> bool {
        self.get(concrete, iface).is_some_and(|s| s.satisfied)
    }

    /// Concrete types of the program that satisfy `iface`.
    pub fn implementors(&self, iface: Idx) -> &[Idx] {
        self.by_iface.get(&iface).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = ((Idx, Idx), &Satisfaction)> {
        self.entries.iter().map(|(&k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TypeModel {
    /// Check whether `ty`'s method set covers every method of `iface` with an
    /// identical signature (name, ordered parameters and results, variadic).
    pub fn check_satisfaction(&self, ty: Idx, iface: Idx) -> Satisfaction {
        let Some(info) = self.pool.interface(iface) else {
            return Satisfaction::default();
        };
        let set = self.method_set(ty);
        let mut out = Satisfaction {
            satisfied: true,
            ..Satisfaction::default()
        };
        for required in &info.methods {
            match set.get(required.name) {
                Some(member) if member.sig() == Some(&required.sig) => {
                    out.thunks.push(member.clone());
                }
                _ => {
                    out.satisfied = false;
                    out.missing.push(required.name);
                }
            }
        }
        out
    }

    /// Whether `ty` satisfies `iface`, from the table when precomputed.
    pub fn implements(&self, ty: Idx, iface: Idx) -> bool {
        match self.satisfaction.get(ty, iface) {
            Some(entry) => entry.satisfied,
            None => self.check_satisfaction(ty, iface).satisfied,
        }
    }

    /// Static outcome of asserting a value of type `operand` to `target`.
    pub fn assertion_outcome(&self, operand: Idx, target: Idx) -> AssertionOutcome {
        let pool = &self.pool;
        if target == Idx::NIL {
            // `case nil` in a type switch: decided by the dynamic value only.
            return AssertionOutcome::Dynamic {
                candidates: Vec::new(),
            };
        }
        if !pool.is_interface(operand) {
            return if operand == target {
                AssertionOutcome::AlwaysSucceeds
            } else {
                AssertionOutcome::AlwaysFails
            };
        }

        if pool.is_interface(target) {
            if self.implements(operand, target) {
                return AssertionOutcome::AlwaysSucceeds;
            }
            let candidates: Vec<Idx> = self
                .satisfaction
                .implementors(target)
                .iter()
                .copied()
                .filter(|&c| self.satisfaction.satisfies(c, operand))
                .collect();
            if candidates.is_empty()
                && !self.is_open_interface(operand)
                && !self.is_open_interface(target)
            {
                return AssertionOutcome::AlwaysFails;
            }
            return AssertionOutcome::Dynamic { candidates };
        }

        if self.implements(target, operand) {
            AssertionOutcome::Dynamic {
                candidates: vec![target],
            }
        } else {
            AssertionOutcome::AlwaysFails
        }
    }
}

#[cfg(test)]
mod tests;
