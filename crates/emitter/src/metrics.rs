//! Pipeline metrics for observability
//!
//! Atomics are the source of truth for [`PipelineSnapshot`]; every update is
//! mirrored into the `metrics` facade through `observability::metrics`.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use observability::metrics as facade;
use observability::{RunningStats, StatsSummary};

/// Metrics for one emission pipeline
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    sink: String,
    /// Current queue length
    queue_len: AtomicUsize,
    /// Records accepted into the queue
    submitted: AtomicU64,
    /// Records evicted or rejected because the queue was full
    dropped: AtomicU64,
    /// Records delivered
    delivered: AtomicU64,
    /// Failed emit calls (retried or not)
    failed_attempts: AtomicU64,
    /// Records dropped after the last allowed attempt
    exhausted: AtomicU64,
    /// Records given up because of shutdown
    abandoned: AtomicU64,
    /// Emit calls currently running
    in_flight: AtomicUsize,
    /// High-water mark of `in_flight`
    max_in_flight: AtomicUsize,
    /// Accepted records not yet delivered, exhausted, evicted or abandoned
    outstanding: AtomicUsize,
    /// Submission-to-delivery latency (ms)
    latency: Mutex<RunningStats>,
}

impl PipelineMetrics {
    pub fn new(sink: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            ..Self::default()
        }
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
        facade::record_queue_depth(&self.sink, len);
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        self.outstanding.fetch_add(1, Ordering::Relaxed);
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Relaxed)
    }

    fn settle(&self, count: usize) {
        let _ = self
            .outstanding
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_sub(count))
            });
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Count a rejected submission
    pub fn inc_dropped(&self, policy: &str) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        facade::record_record_dropped(&self.sink, policy);
    }

    /// Count an accepted record evicted from the queue
    pub fn inc_evicted(&self, policy: &str) {
        self.inc_dropped(policy);
        self.settle(1);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Count a delivery and its end-to-end latency
    pub fn inc_delivered(&self, latency: Duration) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        self.settle(1);
        let ms = latency.as_secs_f64() * 1000.0;
        facade::record_delivery_attempt(&self.sink, true);
        facade::record_delivery_latency_ms(&self.sink, ms);
        if let Ok(mut stats) = self.latency.lock() {
            stats.push(ms);
        }
    }

    pub fn failed_attempts(&self) -> u64 {
        self.failed_attempts.load(Ordering::Relaxed)
    }

    pub fn inc_failed_attempts(&self) {
        self.failed_attempts.fetch_add(1, Ordering::Relaxed);
        facade::record_delivery_attempt(&self.sink, false);
    }

    pub fn exhausted(&self) -> u64 {
        self.exhausted.load(Ordering::Relaxed)
    }

    pub fn inc_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
        self.settle(1);
        facade::record_record_exhausted(&self.sink);
    }

    pub fn abandoned(&self) -> u64 {
        self.abandoned.load(Ordering::Relaxed)
    }

    pub fn add_abandoned(&self, count: u64) {
        if count == 0 {
            return;
        }
        self.abandoned.fetch_add(count, Ordering::Relaxed);
        self.settle(usize::try_from(count).unwrap_or(usize::MAX));
        facade::record_record_abandoned(&self.sink, count);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::Relaxed)
    }

    /// Mark the start of one emit call
    pub fn begin_attempt(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.max_in_flight.fetch_max(now, Ordering::Relaxed);
        facade::record_in_flight(&self.sink, now);
    }

    /// Mark the end of one emit call
    pub fn end_attempt(&self) {
        let now = self.in_flight.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
        facade::record_in_flight(&self.sink, now);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            queue_len: self.queue_len(),
            submitted: self.submitted(),
            dropped: self.dropped(),
            delivered: self.delivered(),
            failed_attempts: self.failed_attempts(),
            exhausted: self.exhausted(),
            abandoned: self.abandoned(),
            in_flight: self.in_flight(),
            max_in_flight: self.max_in_flight(),
            outstanding: self.outstanding(),
            delivery_latency_ms: self
                .latency
                .lock()
                .map(|stats| stats.summary())
                .unwrap_or_default(),
        }
    }
}

/// Snapshot of pipeline metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PipelineSnapshot {
    pub queue_len: usize,
    pub submitted: u64,
    pub dropped: u64,
    pub delivered: u64,
    pub failed_attempts: u64,
    pub exhausted: u64,
    pub abandoned: u64,
    pub in_flight: usize,
    pub max_in_flight: usize,
    pub outstanding: usize,
    pub delivery_latency_ms: StatsSummary,
}
