use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::errors::DomainResult;
use crate::domain::models::{build_review_id, DateKey, GoalTrackWeeklyReview};
use crate::domain::ports::WeeklyReviewRepository;

#[derive(Default)]
pub struct InMemoryWeeklyReviewRepository {
    reviews: RwLock<HashMap<String, GoalTrackWeeklyReview>>,
}

impl InMemoryWeeklyReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WeeklyReviewRepository for InMemoryWeeklyReviewRepository {
    async fn upsert(&self, review: &GoalTrackWeeklyReview) -> DomainResult<()> {
        self.reviews.write().await.insert(review.id.clone(), review.clone());
        Ok(())
    }

    async fn get(&self, goal_track_id: &str, week_start_key: DateKey) -> DomainResult<Option<GoalTrackWeeklyReview>> {
        let id = build_review_id(goal_track_id, week_start_key);
        Ok(self.reviews.read().await.get(&id).cloned())
    }

    async fn list_for_goal_track(&self, goal_track_id: &str, limit: usize) -> DomainResult<Vec<GoalTrackWeeklyReview>> {
        let mut reviews: Vec<GoalTrackWeeklyReview> = self
            .reviews
            .read()
            .await
            .values()
            .filter(|r| r.goal_track_id == goal_track_id)
            .cloned()
            .collect();
        reviews.sort_by_key(|r| Reverse(r.week_start_key));
        reviews.truncate(limit);
        Ok(reviews)
    }

    async fn delete_for_goal_track(&self, goal_track_id: &str) -> DomainResult<u64> {
        let mut reviews = self.reviews.write().await;
        let before = reviews.len();
        reviews.retain(|_, r| r.goal_track_id != goal_track_id);
        Ok((before - reviews.len()) as u64)
    }
}
