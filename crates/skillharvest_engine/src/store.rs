use tokio::sync::RwLock;

use skillharvest_core::{SkillEntity, SkillFact};

use crate::types::StoreError;

/// Persistence gateway for extracted skills.
///
/// `ensure_persisted` returns the stored name when the fact was newly
/// inserted, or `None` when an existing row already represents it. The
/// existence check is a case-insensitive substring match: an existing name
/// that contains the fact's name counts as a hit.
#[async_trait::async_trait]
pub trait SkillStore: Send + Sync {
    async fn ensure_persisted(&self, fact: &SkillFact) -> Result<Option<String>, StoreError>;
}

/// In-memory skill store for tests and volatile runs.
///
/// The write lock spans the check and the insert, so concurrent calls with
/// the same name cannot double-insert.
#[derive(Debug, Default)]
pub struct MemorySkillStore {
    rows: RwLock<Vec<SkillEntity>>,
}

impl MemorySkillStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted skills.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Persisted names, insertion order.
    pub async fn names(&self) -> Vec<String> {
        self.rows.read().await.iter().map(|row| row.name.clone()).collect()
    }

    /// All persisted rows, insertion order.
    pub async fn entities(&self) -> Vec<SkillEntity> {
        self.rows.read().await.clone()
    }
}

#[async_trait::async_trait]
impl SkillStore for MemorySkillStore {
    async fn ensure_persisted(&self, fact: &SkillFact) -> Result<Option<String>, StoreError> {
        let needle = fact.normalized_name();
        let mut rows = self.rows.write().await;
        if rows
            .iter()
            .any(|row| row.name.to_lowercase().contains(&needle))
        {
            return Ok(None);
        }
        let id = rows.len() as i64 + 1;
        rows.push(SkillEntity {
            id,
            name: fact.name.clone(),
            description: fact.description.clone(),
            category: fact.category.as_str().to_string(),
        });
        Ok(Some(fact.name.clone()))
    }
}
