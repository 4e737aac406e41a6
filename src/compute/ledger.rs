//! ledger.rs
//! Per-simulation cache of evaluated keys and their recorded dependencies.

use super::error::EngineError;
use super::value::Value;
use crate::analysis::topology::DependencyGraph;
use crate::entity::EntityRef;
use crate::period::Period;
use crate::store::VariableId;
use std::collections::HashMap;

/// What is being computed: one variable, for one entity, over one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub variable: VariableId,
    pub entity: EntityRef,
    pub period: Period,
}

/// Dense id of an interned `CacheKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(pub u32);

impl KeyId {
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum EvalState {
    #[default]
    NotRequested,
    InProgress,
    Computed(Value),
    /// Kept for inspection only; a failed key is evaluated again when
    /// requested again.
    Failed(EngineError),
}

static NOT_REQUESTED: EvalState = EvalState::NotRequested;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub hits: usize,
    pub computations: usize,
    pub failures: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    keys: Vec<CacheKey>,
    index: HashMap<CacheKey, KeyId>,
    // Dense storage, indexed by KeyId
    states: Vec<EvalState>,
    pub(crate) dependencies: DependencyGraph,
    pub stats: LedgerStats,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the id of `key`, allocating a `NotRequested` slot on first use.
    pub fn intern(&mut self, key: CacheKey) -> KeyId {
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = KeyId(self.keys.len() as u32);
        self.keys.push(key);
        self.states.push(EvalState::NotRequested);
        self.index.insert(key, id);
        id
    }

    pub fn lookup(&self, key: &CacheKey) -> Option<KeyId> {
        self.index.get(key).copied()
    }

    /// State of `key`; keys never interned are `NotRequested`.
    pub fn state_of(&self, key: &CacheKey) -> &EvalState {
        self.lookup(key).map_or(&NOT_REQUESTED, |id| self.state(id))
    }

    #[inline(always)]
    pub fn key(&self, id: KeyId) -> Option<&CacheKey> {
        self.keys.get(id.index())
    }

    #[inline(always)]
    pub fn state(&self, id: KeyId) -> &EvalState {
        self.states.get(id.index()).unwrap_or(&NOT_REQUESTED)
    }

    pub fn set_state(&mut self, id: KeyId, state: EvalState) {
        if let Some(slot) = self.states.get_mut(id.index()) {
            *slot = state;
        }
    }

    /// Stores a final value for `id`, as a computation or a set input.
    pub fn insert(&mut self, id: KeyId, value: Value) {
        self.set_state(id, EvalState::Computed(value));
    }

    pub fn record_dependency(&mut self, dependency: KeyId, dependent: KeyId) {
        self.dependencies.record(dependency, dependent);
    }

    pub fn dependencies(&self) -> &DependencyGraph {
        &self.dependencies
    }

    pub fn invalidate(&mut self, ids: impl IntoIterator<Item = KeyId>) {
        for id in ids {
            if let Some(slot) = self.states.get_mut(id.index()) {
                *slot = EvalState::NotRequested;
            }
            self.dependencies.forget_dependencies(id);
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.index.clear();
        self.states.clear();
        self.dependencies.clear();
        self.stats = LedgerStats::default();
    }
}
