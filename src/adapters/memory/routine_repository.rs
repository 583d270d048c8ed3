use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::RoutineItem;
use crate::domain::ports::RoutineRepository;

#[derive(Default)]
pub struct InMemoryRoutineRepository {
    routines: RwLock<HashMap<String, RoutineItem>>,
}

impl InMemoryRoutineRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoutineRepository for InMemoryRoutineRepository {
    async fn create(&self, routine: &RoutineItem) -> DomainResult<()> {
        let mut routines = self.routines.write().await;
        if routines.contains_key(&routine.id) {
            return Err(DomainError::ValidationFailed(format!("Routine already exists: {}", routine.id)));
        }
        routines.insert(routine.id.clone(), routine.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> DomainResult<Option<RoutineItem>> {
        Ok(self.routines.read().await.get(id).cloned())
    }

    async fn update(&self, routine: &RoutineItem, expected_version: u64) -> DomainResult<()> {
        let mut routines = self.routines.write().await;
        let stored = routines
            .get_mut(&routine.id)
            .ok_or_else(|| DomainError::RoutineNotFound(routine.id.clone()))?;
        if stored.version != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                entity: "routine".to_string(),
                id: routine.id.clone(),
            });
        }
        *stored = RoutineItem {
            version: expected_version + 1,
            ..routine.clone()
        };
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.routines
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::RoutineNotFound(id.to_string()))
    }

    async fn list(&self) -> DomainResult<Vec<RoutineItem>> {
        let mut routines: Vec<RoutineItem> = self.routines.read().await.values().cloned().collect();
        routines.sort_by_key(|r| r.created_at);
        Ok(routines)
    }
}
