//! In-process journey store
//!
//! Holds journeys in memory and counts every query it serves, so callers
//! can assert how many store round trips a report needed.

use crate::domain::journey::Journey;
use crate::domain::types::{JourneyId, UserId};
use crate::io::store::{in_window, JourneyStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct MemoryStore {
    journeys: RwLock<Vec<Journey>>,
    queries: AtomicU64,
    failing: AtomicBool,
    latency: RwLock<Option<Duration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journeys(journeys: Vec<Journey>) -> Self {
        let store = Self::new();
        *store.journeys.write() = journeys;
        store
    }

    /// Number of queries served (or attempted) so far
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    /// Make every subsequent query fail with `StoreError::Unavailable`
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Delay every subsequent query by `latency`
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write() = latency;
    }

    async fn begin_query(&self) -> Result<(), StoreError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        let latency = *self.latency.read();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("memory store set to fail".to_string()));
        }
        Ok(())
    }

    fn matching(&self, owner: &UserId, created_after: Option<DateTime<Utc>>) -> Vec<Journey> {
        self.journeys
            .read()
            .iter()
            .filter(|j| j.is_owned_by(owner) && in_window(j.created_at, created_after))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl JourneyStore for MemoryStore {
    async fn find_journey(&self, id: &JourneyId, owner: &UserId) -> Result<Option<Journey>, StoreError> {
        self.begin_query().await?;
        Ok(self.journeys.read().iter().find(|j| &j.id == id && j.is_owned_by(owner)).cloned())
    }

    async fn find_journeys(
        &self,
        owner: &UserId,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Journey>, StoreError> {
        self.begin_query().await?;
        Ok(self.matching(owner, created_after))
    }

    async fn count_journeys(&self, owner: &UserId) -> Result<u64, StoreError> {
        self.begin_query().await?;
        Ok(self.matching(owner, None).len() as u64)
    }

    async fn sum_duration(&self, owner: &UserId) -> Result<Option<i64>, StoreError> {
        self.begin_query().await?;
        let matching = self.matching(owner, None);
        if matching.is_empty() {
            return Ok(None);
        }
        Ok(Some(matching.iter().map(|j| j.duration).sum()))
    }
}
