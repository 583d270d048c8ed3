use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::errors::DomainResult;
use crate::domain::models::GoalTrackEvent;
use crate::domain::ports::{EventFilter, GoalTrackEventRepository};

/// Event ledger held in a map keyed by event id.
#[derive(Default)]
pub struct InMemoryEventRepository {
    events: RwLock<HashMap<String, GoalTrackEvent>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl GoalTrackEventRepository for InMemoryEventRepository {
    async fn upsert(&self, event: &GoalTrackEvent) -> DomainResult<()> {
        self.events.write().await.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> DomainResult<Option<GoalTrackEvent>> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> DomainResult<bool> {
        Ok(self.events.write().await.remove(id).is_some())
    }

    async fn list(&self, filter: EventFilter) -> DomainResult<Vec<GoalTrackEvent>> {
        let mut matching: Vec<GoalTrackEvent> = self
            .events
            .read()
            .await
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matching.sort_by_key(|e| (Reverse(e.date_key), Reverse(e.created_at)));
        Ok(matching)
    }

    async fn find_ids(&self, filter: EventFilter, limit: usize) -> DomainResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .events
            .read()
            .await
            .values()
            .filter(|e| filter.matches(e))
            .map(|e| e.id.clone())
            .collect();
        ids.sort();
        ids.truncate(limit);
        Ok(ids)
    }

    async fn delete_many(&self, ids: &[String]) -> DomainResult<u64> {
        let mut events = self.events.write().await;
        Ok(ids.iter().filter(|id| events.remove(id.as_str()).is_some()).count() as u64)
    }
}
