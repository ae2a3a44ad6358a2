//! Per unit-of-work record of encrypted entities.

use std::collections::{HashMap, HashSet};

/// Remembers which entities were encrypted during the current unit of work.
///
/// An identity is present iff it was encrypted at least once since the last
/// [`clear`](Self::clear). Owned by a single unit of work and never shared.
#[derive(Debug, Default)]
pub struct TouchLedger {
    touched: HashMap<String, HashSet<String>>,
}

impl TouchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_touched(&mut self, entity_type: &str, entity_id: &str) {
        self.touched
            .entry(entity_type.to_string())
            .or_default()
            .insert(entity_id.to_string());
    }

    pub fn was_touched(&self, entity_type: &str, entity_id: &str) -> bool {
        self.touched
            .get(entity_type)
            .is_some_and(|ids| ids.contains(entity_id))
    }

    pub fn clear(&mut self) {
        self.touched.clear();
    }

    /// Number of touched identities across all types.
    pub fn len(&self) -> usize {
        self.touched.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    /// Entity types with at least one touched identity, sorted.
    pub fn touched_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.touched.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}
