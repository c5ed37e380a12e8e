//! Decomposition persistence seam
//!
//! The store is the source of truth for decompositions; the analysis cache
//! only ever holds copies. Backing technology is the implementor's choice.

use crate::error::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use flowscope_model::{Decomposition, DecompositionId};
use std::sync::Arc;

/// Get/set/delete contract for decompositions
#[async_trait]
pub trait DecompositionStore: Send + Sync {
    /// Fetch a decomposition by ID
    async fn get(&self, id: &DecompositionId) -> Result<Option<Decomposition>, StoreError>;

    /// Insert or replace a decomposition
    async fn put(&self, decomposition: &Decomposition) -> Result<(), StoreError>;

    /// Remove a decomposition; returns whether it existed
    async fn delete(&self, id: &DecompositionId) -> Result<bool, StoreError>;
}

/// Concurrent in-process store
#[derive(Debug, Clone, Default)]
pub struct InMemoryDecompositionStore {
    records: Arc<DashMap<DecompositionId, Decomposition>>,
}

impl InMemoryDecompositionStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored decompositions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing is stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Decompositions re-analyzed from `parent`, oldest first
    #[must_use]
    pub fn children_of(&self, parent: &DecompositionId) -> Vec<Decomposition> {
        let mut children: Vec<Decomposition> = self
            .records
            .iter()
            .filter(|record| record.parent_id.as_ref() == Some(parent))
            .map(|record| record.value().clone())
            .collect();
        children.sort_by_key(|child| child.id);
        children
    }
}

#[async_trait]
impl DecompositionStore for InMemoryDecompositionStore {
    async fn get(&self, id: &DecompositionId) -> Result<Option<Decomposition>, StoreError> {
        Ok(self.records.get(id).map(|record| record.value().clone()))
    }

    async fn put(&self, decomposition: &Decomposition) -> Result<(), StoreError> {
        self.records.insert(decomposition.id, decomposition.clone());
        Ok(())
    }

    async fn delete(&self, id: &DecompositionId) -> Result<bool, StoreError> {
        Ok(self.records.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowscope_model::{Confidence, HealthMetrics};

    fn decomposition(title: &str) -> Decomposition {
        let health = HealthMetrics {
            complexity: 0,
            fragility: 0,
            automation_potential: 0,
            team_load_balance: 60,
            team_size: None,
            confidence: Confidence::Inferred,
            confidence_reason: String::new(),
        };
        Decomposition::new(title, vec![], vec![], health)
    }

    #[tokio::test]
    async fn put_get_delete() {
        let store = InMemoryDecompositionStore::new();
        let record = decomposition("a");

        store.put(&record).await.unwrap();
        assert_eq!(store.get(&record.id).await.unwrap(), Some(record.clone()));
        assert!(store.delete(&record.id).await.unwrap());
        assert!(!store.delete(&record.id).await.unwrap());
        assert!(store.get(&record.id).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn lists_children() {
        let store = InMemoryDecompositionStore::new();
        let root = decomposition("root");
        let first = root.derive_child("first", Vec::new(), Vec::new(), root.health.clone());
        let second = root.derive_child("second", Vec::new(), Vec::new(), root.health.clone());
        for record in [&root, &first, &second] {
            store.put(record).await.unwrap();
        }

        let children: Vec<DecompositionId> =
            store.children_of(&root.id).iter().map(|c| c.id).collect();
        assert_eq!(children.len(), 2);
        assert!(children.contains(&first.id) && children.contains(&second.id));
        assert_eq!(store.len(), 3);
    }
}
