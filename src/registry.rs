//! Identity registry: transient GUIDs → stable proposed names.
//!
//! The first proposal for a key wins. Later proposals for the same key are
//! ignored and the originally bound name is returned, so an element that is
//! met again under a different proposal keeps its first identity.
//!
//! Distinct keys may bind the same name. That collision is intentional: it is
//! how instances of one library item collapse onto a single symbol.

use std::collections::BTreeMap;

use crate::types::Guid;

/// First-writer-wins map from authoring-tool keys to stable ids.
#[derive(Debug, Clone)]
pub struct IdentityRegistry<Id> {
    bound: BTreeMap<Guid, Id>,
}

impl<Id: Clone> IdentityRegistry<Id> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            bound: BTreeMap::new(),
        }
    }

    /// Resolve `key` to its stable id, binding `proposal` on first use.
    pub fn resolve(&mut self, proposal: impl Into<Id>, key: &Guid) -> Id {
        if let Some(existing) = self.bound.get(key) {
            return existing.clone();
        }

        let id = proposal.into();
        self.bound.insert(key.clone(), id.clone());
        id
    }

    /// Look up a key without binding.
    pub fn get(&self, key: &Guid) -> Option<&Id> {
        self.bound.get(key)
    }

    /// Number of bound keys.
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    /// Whether no key has been bound yet.
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

impl<Id: Clone> Default for IdentityRegistry<Id> {
    fn default() -> Self {
        Self::new()
    }
}
