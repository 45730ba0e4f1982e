//! Memoization of generic instantiations.

use kiln_const::ConstValue;
use kiln_ir::{DeclId, TypeId};
use rustc_hash::FxHashMap;

/// One bound generic parameter.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum GenericArg {
    Type(TypeId),
    Value(ConstValue),
}

impl From<ConstValue> for GenericArg {
    /// Type values bind as types so `T = u8` is one key however it was
    /// spelled.
    fn from(value: ConstValue) -> Self {
        match value.as_type() {
            Some(ty) => GenericArg::Type(ty),
            None => GenericArg::Value(value),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
struct InstantiationKey {
    decl: DeclId,
    args: Vec<GenericArg>,
}

/// Cache of generic instantiations keyed by declaration identity and the
/// ordered list of bound parameters.
///
/// Guarantees a generic is instantiated once per distinct binding.
#[derive(Clone, Debug)]
pub struct InstantiationCache<T> {
    map: FxHashMap<InstantiationKey, T>,
}

impl<T> Default for InstantiationCache<T> {
    fn default() -> Self {
        InstantiationCache {
            map: FxHashMap::default(),
        }
    }
}

impl<T> InstantiationCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, decl: DeclId, args: &[GenericArg]) -> Option<&T> {
        // Keys own their args, so the lookup key copies them.
        self.map.get(&InstantiationKey {
            decl,
            args: args.to_vec(),
        })
    }

    /// Record an instantiation. Returns the previous entry, if any.
    pub fn insert(&mut self, decl: DeclId, args: Vec<GenericArg>, value: T) -> Option<T> {
        tracing::debug!(?decl, arg_count = args.len(), "recorded generic instantiation");
        self.map.insert(InstantiationKey { decl, args }, value)
    }

    /// Return the cached instantiation or create it with `make`.
    ///
    /// `make` runs at most once per key.
    pub fn get_or_insert_with(
        &mut self,
        decl: DeclId,
        args: Vec<GenericArg>,
        make: impl FnOnce() -> T,
    ) -> &T {
        self.map
            .entry(InstantiationKey { decl, args })
            .or_insert_with(make)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
