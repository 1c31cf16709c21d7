//! Lock-free metrics for served statistics reports
//!
//! Uses atomics so concurrent requests never contend on a mutex.
//! `report()` swaps the per-interval counters for a consistent snapshot.
//!
//! NOTE: All atomics use Relaxed ordering intentionally. These are
//! statistical counters only; do NOT use them for coordination.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Exponential latency bucket boundaries (microseconds)
/// Buckets: ≤100, ≤200, ≤400, ≤800, ≤1600, ≤3200, ≤6400, ≤12800, ≤25600, ≤51200, >51200
const BUCKET_BOUNDS: [u64; 10] = [100, 200, 400, 800, 1600, 3200, 6400, 12800, 25600, 51200];
const NUM_BUCKETS: usize = 11;

#[inline]
fn bucket_index(latency_us: u64) -> usize {
    BUCKET_BOUNDS.partition_point(|&bound| bound < latency_us)
}

/// Update an atomic max value using compare-and-swap loop
#[inline]
fn update_atomic_max(atomic_max: &AtomicU64, new_value: u64) {
    let mut current_max = atomic_max.load(Ordering::Relaxed);
    while new_value > current_max {
        match atomic_max.compare_exchange_weak(current_max, new_value, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => break,
            Err(actual) => current_max = actual,
        }
    }
}

fn swap_buckets(buckets: &[AtomicU64; NUM_BUCKETS]) -> [u64; NUM_BUCKETS] {
    let mut result = [0u64; NUM_BUCKETS];
    for (i, bucket) in buckets.iter().enumerate() {
        result[i] = bucket.swap(0, Ordering::Relaxed);
    }
    result
}

/// Upper bound of the bucket containing the percentile
fn percentile_from_buckets(buckets: &[u64; NUM_BUCKETS], percentile: f64) -> u64 {
    let total: u64 = buckets.iter().sum();
    if total == 0 {
        return 0;
    }

    let target = ((total as f64 * percentile).ceil() as u64).max(1);
    let mut cumulative = 0u64;

    // last bucket uses 2x the previous bound
    const BUCKET_UPPER_BOUNDS: [u64; NUM_BUCKETS] =
        [100, 200, 400, 800, 1600, 3200, 6400, 12800, 25600, 51200, 102400];

    for (i, &count) in buckets.iter().enumerate() {
        cumulative += count;
        if cumulative >= target {
            return BUCKET_UPPER_BOUNDS[i];
        }
    }
    BUCKET_UPPER_BOUNDS[NUM_BUCKETS - 1]
}

/// Statistics operation, for per-operation counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    One,
    All,
    Period,
}

/// Failure classes counted separately from served reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    NotFound,
    InvalidArgument,
    StoreFailure,
    MalformedJourney,
}

#[derive(Default)]
pub struct Metrics {
    one_total: AtomicU64,
    all_total: AtomicU64,
    period_total: AtomicU64,
    not_found_total: AtomicU64,
    invalid_argument_total: AtomicU64,
    store_failures_total: AtomicU64,
    malformed_total: AtomicU64,
    /// Journeys whose distance was skipped in summaries (monotonic)
    skipped_journeys_total: AtomicU64,
    requests_since_report: AtomicU64,
    latency_sum_us: AtomicU64,
    latency_max_us: AtomicU64,
    latency_buckets: [AtomicU64; NUM_BUCKETS],
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully served report
    #[inline]
    pub fn record_served(&self, operation: Operation, latency_us: u64) {
        let counter = match operation {
            Operation::One => &self.one_total,
            Operation::All => &self.all_total,
            Operation::Period => &self.period_total,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.requests_since_report.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        update_atomic_max(&self.latency_max_us, latency_us);
        self.latency_buckets[bucket_index(latency_us)].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failure(&self, failure: Failure) {
        let counter = match failure {
            Failure::NotFound => &self.not_found_total,
            Failure::InvalidArgument => &self.invalid_argument_total,
            Failure::StoreFailure => &self.store_failures_total,
            Failure::MalformedJourney => &self.malformed_total,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_skipped_journey(&self) {
        self.skipped_journeys_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn served_total(&self, operation: Operation) -> u64 {
        match operation {
            Operation::One => self.one_total.load(Ordering::Relaxed),
            Operation::All => self.all_total.load(Ordering::Relaxed),
            Operation::Period => self.period_total.load(Ordering::Relaxed),
        }
    }

    pub fn failure_total(&self, failure: Failure) -> u64 {
        match failure {
            Failure::NotFound => self.not_found_total.load(Ordering::Relaxed),
            Failure::InvalidArgument => self.invalid_argument_total.load(Ordering::Relaxed),
            Failure::StoreFailure => self.store_failures_total.load(Ordering::Relaxed),
            Failure::MalformedJourney => self.malformed_total.load(Ordering::Relaxed),
        }
    }

    pub fn skipped_journeys_total(&self) -> u64 {
        self.skipped_journeys_total.load(Ordering::Relaxed)
    }

    /// Snapshot monotonic totals and reset the per-interval latency counters
    pub fn report(&self) -> MetricsSummary {
        let requests = self.requests_since_report.swap(0, Ordering::Relaxed);
        let latency_sum = self.latency_sum_us.swap(0, Ordering::Relaxed);
        let latency_max = self.latency_max_us.swap(0, Ordering::Relaxed);
        let buckets = swap_buckets(&self.latency_buckets);

        MetricsSummary {
            one_total: self.served_total(Operation::One),
            all_total: self.served_total(Operation::All),
            period_total: self.served_total(Operation::Period),
            not_found_total: self.failure_total(Failure::NotFound),
            invalid_argument_total: self.failure_total(Failure::InvalidArgument),
            store_failures_total: self.failure_total(Failure::StoreFailure),
            malformed_total: self.failure_total(Failure::MalformedJourney),
            skipped_journeys_total: self.skipped_journeys_total(),
            requests,
            avg_latency_us: if requests > 0 { latency_sum / requests } else { 0 },
            max_latency_us: latency_max,
            p50_latency_us: percentile_from_buckets(&buckets, 0.50),
            p99_latency_us: percentile_from_buckets(&buckets, 0.99),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSummary {
    pub one_total: u64,
    pub all_total: u64,
    pub period_total: u64,
    pub not_found_total: u64,
    pub invalid_argument_total: u64,
    pub store_failures_total: u64,
    pub malformed_total: u64,
    pub skipped_journeys_total: u64,
    pub requests: u64,
    pub avg_latency_us: u64,
    pub max_latency_us: u64,
    pub p50_latency_us: u64,
    pub p99_latency_us: u64,
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            one_total = %self.one_total,
            all_total = %self.all_total,
            period_total = %self.period_total,
            not_found_total = %self.not_found_total,
            invalid_argument_total = %self.invalid_argument_total,
            store_failures_total = %self.store_failures_total,
            malformed_total = %self.malformed_total,
            skipped_journeys_total = %self.skipped_journeys_total,
            requests = %self.requests,
            avg_latency_us = %self.avg_latency_us,
            max_latency_us = %self.max_latency_us,
            p50_latency_us = %self.p50_latency_us,
            p99_latency_us = %self.p99_latency_us,
            "metrics"
        );
    }
}
