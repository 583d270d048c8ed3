//! Routine repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::RoutineItem;

/// Repository interface for routine persistence.
#[async_trait]
pub trait RoutineRepository: Send + Sync {
    /// Create a new routine.
    async fn create(&self, routine: &RoutineItem) -> DomainResult<()>;

    /// Get a routine by id.
    async fn get(&self, id: &str) -> DomainResult<Option<RoutineItem>>;

    /// Store `routine` only if the stored version still equals
    /// `expected_version`; the stored version becomes `expected_version + 1`.
    ///
    /// Fails with `ConcurrencyConflict` when another writer got there first
    /// and `RoutineNotFound` when the routine does not exist.
    async fn update(&self, routine: &RoutineItem, expected_version: u64) -> DomainResult<()>;

    /// Delete a routine by id.
    async fn delete(&self, id: &str) -> DomainResult<()>;

    /// List all routines, oldest first.
    async fn list(&self) -> DomainResult<Vec<RoutineItem>>;
}
