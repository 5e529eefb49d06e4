//! Runtime type metadata consumed by the generated program's dispatch and
//! type-assertion helpers.

use rustc_hash::FxHashMap;
use strand_ir::{FuncId, Program};

use crate::{Idx, MemberKind, TypeData, TypeModel, ValueCategory};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuntimeKind {
    Basic,
    Struct,
    Pointer,
    Slice,
    Array,
    Map,
    Chan,
    Func,
    Interface,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuntimeMethod {
    pub name: String,
    pub func: FuncId,
    pub pointer_receiver: bool,
    /// Reached through an embedded field.
    pub promoted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuntimeType {
    pub ty: Idx,
    /// Qualified display name, e.g. `main.Celsius` or `*main.S`.
    pub name: String,
    pub kind: RuntimeKind,
    /// Emitted as a wrapper class around its underlying value.
    pub wrapper: bool,
    pub category: ValueCategory,
    /// Method set of the type, sorted by name.
    pub methods: Vec<RuntimeMethod>,
    /// Program interfaces the type satisfies.
    pub implements: Vec<Idx>,
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RuntimeRegistry {
    types: Vec<RuntimeType>,
    #[cfg_attr(feature = "serde", serde(skip))]
    by_idx: FxHashMap<Idx, usize>,
}

impl RuntimeRegistry {
    pub fn get(&self, ty: Idx) -> Option<&RuntimeType> {
        self.by_idx.get(&ty).map(|&i| &self.types[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuntimeType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn push(&mut self, entry: RuntimeType) {
        self.by_idx.insert(entry.ty, self.types.len());
        self.types.push(entry);
    }
}

fn runtime_kind(model: &TypeModel, ty: Idx) -> RuntimeKind {
    match model.pool.get(model.pool.underlying(ty)) {
        Some(TypeData::Struct(_)) => RuntimeKind::Struct,
        Some(TypeData::Pointer(_)) => RuntimeKind::Pointer,
        Some(TypeData::Slice(_)) => RuntimeKind::Slice,
        Some(TypeData::Array { .. }) => RuntimeKind::Array,
        Some(TypeData::Map { .. }) => RuntimeKind::Map,
        Some(TypeData::Chan { .. }) => RuntimeKind::Chan,
        Some(TypeData::Func(_)) => RuntimeKind::Func,
        Some(TypeData::Interface(_)) => RuntimeKind::Interface,
        _ => RuntimeKind::Basic,
    }
}

/// Describe every concrete named type and the pointer to it.
pub(crate) fn build_registry(model: &TypeModel, program: &Program, concrete: &[Idx]) -> RuntimeRegistry {
    let mut interfaces: FxHashMap<Idx, Vec<Idx>> = FxHashMap::default();
    for ((ty, iface), entry) in model.satisfaction.iter() {
        if entry.satisfied {
            interfaces.entry(ty).or_default().push(iface);
        }
    }

    let mut registry = RuntimeRegistry::default();
    for &ty in concrete {
        let methods = model
            .method_set(ty)
            .iter()
            .filter_map(|m| match m.kind {
                MemberKind::Method {
                    func,
                    pointer_receiver,
                    ..
                } => Some(RuntimeMethod {
                    name: program.name(m.name).to_owned(),
                    func,
                    pointer_receiver,
                    promoted: m.depth() > 0,
                }),
                _ => None,
            })
            .collect();
        let mut implements = interfaces.remove(&ty).unwrap_or_default();
        implements.sort_unstable();

        let wrapper = model
            .named
            .get(&ty)
            .is_some_and(|info| info.needs_wrapper(&model.pool));

        registry.push(RuntimeType {
            ty,
            name: model.pool.display(ty, program),
            kind: runtime_kind(model, ty),
            wrapper,
            category: model.category(ty),
            methods,
            implements,
        });
    }
    registry
}
