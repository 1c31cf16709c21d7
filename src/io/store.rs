//! Read-only journey store interface consumed by the statistics engine
//!
//! Every query is scoped to an owner. `created_after` on the journey list
//! is an inclusive lower bound on creation time; `None` means no bound.
//! The count and duration-sum aggregates always cover all of the owner's
//! journeys.

use crate::domain::journey::Journey;
use crate::domain::types::{JourneyId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Store operation error type
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database connection or query error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Query did not complete within the configured timeout
    #[error("store query timed out after {0} ms")]
    Timeout(u64),

    /// Store could not serve the request (worker failure, poisoned state)
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be interpreted
    #[error("corrupt stored value: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait JourneyStore: Send + Sync {
    /// Journey with nested sections and passes, only if owned by `owner`
    async fn find_journey(&self, id: &JourneyId, owner: &UserId) -> Result<Option<Journey>, StoreError>;

    /// All journeys of `owner`, sections and passes in travel order
    async fn find_journeys(
        &self,
        owner: &UserId,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Journey>, StoreError>;

    /// Number of journeys owned by `owner`
    async fn count_journeys(&self, owner: &UserId) -> Result<u64, StoreError>;

    /// Sum of stored durations (minutes). None when the owner has no journeys.
    async fn sum_duration(&self, owner: &UserId) -> Result<Option<i64>, StoreError>;
}

#[inline]
pub(crate) fn in_window(created_at: DateTime<Utc>, created_after: Option<DateTime<Utc>>) -> bool {
    created_after.map_or(true, |bound| created_at >= bound)
}
