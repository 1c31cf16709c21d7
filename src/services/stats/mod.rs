//! Statistics aggregator over a user's journeys
//!
//! Each call is a single stateless pass: ownership-scoped store queries,
//! the distance calculator per journey, then reduction into a report.
//! The only shared state is the append-only `Metrics` counters.

use crate::domain::journey::Journey;
use crate::domain::period::Period;
use crate::domain::report::{JourneyPath, JourneyReport, SummaryReport};
use crate::domain::types::{JourneyId, RequestContext};
use crate::error::StatsError;
use crate::infra::config::Config;
use crate::infra::metrics::{Failure, Metrics, Operation};
use crate::io::store::{JourneyStore, StoreError};
use crate::services::distance::{path_length, round_to_one_decimal, DistanceMetric};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct StatsService<S: JourneyStore + ?Sized> {
    store: Arc<S>,
    metrics: Arc<Metrics>,
    metric: DistanceMetric,
    query_timeout: Option<Duration>,
}

impl<S: JourneyStore + ?Sized> StatsService<S> {
    pub fn new(store: Arc<S>, config: &Config, metrics: Arc<Metrics>) -> Self {
        let query_timeout = match config.query_timeout_ms() {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        Self { store, metrics, metric: config.metric(), query_timeout }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Statistics for one journey owned by the caller.
    ///
    /// A missing journey and a journey owned by someone else both yield
    /// `StatsError::NotFound`.
    pub async fn get_one(&self, ctx: &RequestContext, journey_id: &JourneyId) -> Result<JourneyReport, StatsError> {
        let started = Instant::now();
        let result = self.one(ctx, journey_id).await;
        self.finish(Operation::One, started, &result);
        result
    }

    /// Totals over every journey owned by the caller
    pub async fn get_all(&self, ctx: &RequestContext) -> Result<SummaryReport, StatsError> {
        let started = Instant::now();
        let result = self.summarize(ctx, Period::All).await;
        self.finish(Operation::All, started, &result);
        result
    }

    /// Totals over the caller's journeys created within `period`
    /// (`all`, `week`, `month` or `year`). Any other value is rejected
    /// before the store is queried.
    pub async fn get_period(&self, ctx: &RequestContext, period: &str) -> Result<SummaryReport, StatsError> {
        let started = Instant::now();
        let result = match period.parse::<Period>() {
            Ok(period) => self.summarize(ctx, period).await,
            Err(e) => Err(e.into()),
        };
        self.finish(Operation::Period, started, &result);
        result
    }

    async fn one(&self, ctx: &RequestContext, journey_id: &JourneyId) -> Result<JourneyReport, StatsError> {
        let journey = self
            .bounded(self.store.find_journey(journey_id, &ctx.user_id))
            .await?
            .filter(|j| j.is_owned_by(&ctx.user_id))
            .ok_or(StatsError::NotFound)?;

        let distance = path_length(&journey.sections, self.metric).map_err(|e| {
            warn!(jid = %journey.id, error = %e, "journey_distance_invalid");
            StatsError::MalformedJourney(journey.id.clone())
        })?;

        let report = JourneyReport {
            distance: round_to_one_decimal(distance),
            stops: journey.stops(),
            duration: journey.duration,
            coordinates: vec![JourneyPath::from(journey)],
        };

        info!(
            user_id = %ctx.user_id,
            jid = %journey_id,
            distance = %report.distance,
            stops = %report.stops,
            "stats_one_served"
        );
        Ok(report)
    }

    async fn summarize(&self, ctx: &RequestContext, period: Period) -> Result<SummaryReport, StatsError> {
        let owner = &ctx.user_id;
        let created_after = period.lower_bound(Utc::now());

        // No data dependency between the three queries. Count and duration
        // are owner-wide; only the journey list follows the period.
        let (journeys, count, duration_sum) = tokio::try_join!(
            self.bounded(self.store.find_journeys(owner, created_after)),
            self.bounded(self.store.count_journeys(owner)),
            self.bounded(self.store.sum_duration(owner)),
        )?;

        let distance: f64 = journeys.iter().map(|j| self.distance_or_zero(j)).sum();
        let minutes = duration_sum.unwrap_or(0);

        let report = SummaryReport {
            period,
            distance: round_to_one_decimal(distance),
            journeys: count,
            duration: round_to_one_decimal(minutes as f64 / 60.0),
            coordinates: journeys.into_iter().map(JourneyPath::from).collect(),
        };

        info!(
            user_id = %owner,
            period = %period,
            journeys = %report.journeys,
            distance = %report.distance,
            duration_hours = %report.duration,
            "stats_summary_served"
        );
        Ok(report)
    }

    /// A journey that cannot be measured contributes nothing to a summary
    fn distance_or_zero(&self, journey: &Journey) -> f64 {
        match path_length(&journey.sections, self.metric) {
            Ok(distance) => distance,
            Err(e) => {
                warn!(jid = %journey.id, error = %e, "journey_distance_invalid");
                self.metrics.record_skipped_journey();
                0.0
            }
        }
    }

    /// Bound one store round trip by the configured timeout
    async fn bounded<T>(&self, query: impl Future<Output = Result<T, StoreError>>) -> Result<T, StoreError> {
        let Some(limit) = self.query_timeout else {
            return query.await;
        };
        match tokio::time::timeout(limit, query).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = limit.as_millis() as u64;
                warn!(timeout_ms = %timeout_ms, "store_query_timeout");
                Err(StoreError::Timeout(timeout_ms))
            }
        }
    }

    fn finish<T>(&self, operation: Operation, started: Instant, result: &Result<T, StatsError>) {
        match result {
            Ok(_) => {
                let latency_us = started.elapsed().as_micros() as u64;
                self.metrics.record_served(operation, latency_us);
            }
            Err(e) => {
                let failure = match e {
                    StatsError::NotFound => Failure::NotFound,
                    StatsError::InvalidArgument(_) => Failure::InvalidArgument,
                    StatsError::DataUnavailable(_) => Failure::StoreFailure,
                    StatsError::MalformedJourney(_) => Failure::MalformedJourney,
                };
                self.metrics.record_failure(failure);
                debug!(operation = ?operation, code = %e.code(), error = %e, "stats_request_failed");
            }
        }
    }
}
