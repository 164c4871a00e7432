//! EmissionPipeline - bounded queue, worker pool, admission budget, retry
//!
//! `submit` never blocks: it only tries to enqueue. Worker tasks pull from the
//! queue, take one admission permit per attempt and back off between
//! failures. Shutdown interrupts permit waits and backoff sleeps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_channel::{Receiver, Sender, TrySendError};
use contracts::{DropPolicy, LineageRecord, LineageSink, TransportConfig};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::metrics::{PipelineMetrics, PipelineSnapshot};
use crate::retry::RetryPolicy;
use crate::task::EmissionTask;

/// Pipeline sizing and policies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub queue_capacity: usize,
    pub workers: usize,
    /// Admission permits
    pub max_concurrent: usize,
    pub drop_policy: DropPolicy,
    pub retry: RetryPolicy,
}

impl PipelineSettings {
    pub fn from_transport(transport: &TransportConfig) -> Self {
        Self {
            queue_capacity: transport.max_queue_size.max(1),
            workers: transport.worker_count().max(1),
            max_concurrent: transport.max_concurrent_requests.max(1),
            drop_policy: transport.queue.drop_policy,
            retry: RetryPolicy::from(&transport.retry),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_transport(&TransportConfig::default())
    }
}

/// Result of [`EmissionPipeline::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Enqueued,
    /// Enqueued after evicting the oldest queued record
    EvictedOldest,
    /// Queue full, record dropped
    Rejected,
    /// Pipeline shut down
    Closed,
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Enqueued | Self::EvictedOldest)
    }
}

/// State shared by all workers
struct Shared<S> {
    name: String,
    sink: S,
    permits: Semaphore,
    retry: RetryPolicy,
    metrics: Arc<PipelineMetrics>,
}

/// Async emission pipeline in front of one sink
pub struct EmissionPipeline<S> {
    shared: Arc<Shared<S>>,
    tx: Sender<EmissionTask>,
    /// Kept for drop-oldest eviction and shutdown draining
    rx: Receiver<EmissionTask>,
    drop_policy: DropPolicy,
    shutdown_tx: watch::Sender<bool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl<S> EmissionPipeline<S>
where
    S: LineageSink + Sync + 'static,
{
    /// Build the pipeline and spawn its workers on the current Tokio runtime
    pub fn spawn(sink: S, settings: PipelineSettings) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = async_channel::bounded(settings.queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let shared = Arc::new(Shared {
            metrics: Arc::new(PipelineMetrics::new(name.as_str())),
            name,
            sink,
            permits: Semaphore::new(settings.max_concurrent.max(1)),
            retry: settings.retry,
        });

        let workers = (0..settings.workers.max(1))
            .map(|id| {
                tokio::spawn(emission_worker(
                    id,
                    Arc::clone(&shared),
                    rx.clone(),
                    shutdown_rx.clone(),
                ))
            })
            .collect();

        info!(
            sink = %shared.name,
            queue_capacity = settings.queue_capacity,
            workers = settings.workers,
            max_concurrent = settings.max_concurrent,
            drop_policy = settings.drop_policy.as_str(),
            retry_total = settings.retry.total,
            backoff_factor = settings.retry.backoff_factor,
            "Emission pipeline started"
        );

        Self {
            shared,
            tx,
            rx,
            drop_policy: settings.drop_policy,
            shutdown_tx,
            workers: Mutex::new(workers),
            closed: AtomicBool::new(false),
        }
    }

    /// Sink name
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.shared.metrics
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        self.shared.metrics.snapshot()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Hand one record to the pipeline (non-blocking)
    pub fn submit(&self, record: LineageRecord) -> SubmitOutcome {
        match self.tx.try_send(EmissionTask::new(record)) {
            Ok(()) => {
                self.accepted();
                SubmitOutcome::Enqueued
            }
            Err(TrySendError::Full(task)) => self.on_full(task),
            Err(TrySendError::Closed(task)) => {
                debug!(
                    sink = %self.shared.name,
                    job = %task.job_name(),
                    "Pipeline closed, record discarded"
                );
                SubmitOutcome::Closed
            }
        }
    }

    fn accepted(&self) {
        self.shared.metrics.inc_submitted();
        self.shared.metrics.set_queue_len(self.tx.len());
    }

    fn on_full(&self, task: EmissionTask) -> SubmitOutcome {
        let policy = self.drop_policy.as_str();
        let metrics = &self.shared.metrics;

        let evicted = match self.drop_policy {
            DropPolicy::DropNewest => false,
            DropPolicy::DropOldest => match self.rx.try_recv() {
                Ok(oldest) => {
                    metrics.inc_evicted(policy);
                    warn!(
                        sink = %self.shared.name,
                        job = %oldest.job_name(),
                        age_ms = oldest.age().as_millis() as u64,
                        "Queue full, oldest record evicted"
                    );
                    true
                }
                Err(_) => false,
            },
        };

        if evicted || self.drop_policy == DropPolicy::DropOldest {
            match self.tx.try_send(task) {
                Ok(()) => {
                    self.accepted();
                    return if evicted {
                        SubmitOutcome::EvictedOldest
                    } else {
                        SubmitOutcome::Enqueued
                    };
                }
                Err(TrySendError::Closed(_)) => return SubmitOutcome::Closed,
                Err(TrySendError::Full(task)) => return self.reject(task, policy),
            }
        }

        self.reject(task, policy)
    }

    fn reject(&self, task: EmissionTask, policy: &str) -> SubmitOutcome {
        self.shared.metrics.inc_dropped(policy);
        warn!(
            sink = %self.shared.name,
            job = %task.job_name(),
            policy,
            "Queue full, record dropped"
        );
        SubmitOutcome::Rejected
    }

    /// Stop the pipeline.
    ///
    /// Queued records are discarded; attempts already running get `grace` to
    /// finish before their workers are aborted. The sink is closed last.
    /// Calling it again returns the final snapshot.
    #[instrument(
        name = "emission_pipeline_shutdown",
        skip(self),
        fields(sink = %self.shared.name)
    )]
    pub async fn shutdown(&self, grace: Duration) -> PipelineSnapshot {
        if self.closed.swap(true, Ordering::AcqRel) {
            return self.snapshot();
        }
        let name = &self.shared.name;
        let metrics = &self.shared.metrics;

        self.shutdown_tx.send_replace(true);
        self.tx.close();

        let mut discarded = 0u64;
        while let Ok(task) = self.rx.try_recv() {
            debug!(sink = %name, job = %task.job_name(), "Discarding queued record");
            discarded += 1;
        }
        metrics.set_queue_len(0);
        if discarded > 0 {
            warn!(sink = %name, discarded, "Queued records discarded on shutdown");
            metrics.add_abandoned(discarded);
        }

        let mut workers = match self.workers.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };

        // Handles before `joined` have completed and must not be polled again
        let mut joined = 0usize;
        let drained = tokio::time::timeout(grace, async {
            for handle in workers.iter_mut() {
                if let Err(e) = handle.await {
                    if e.is_panic() {
                        error!(sink = %name, error = ?e, "Emission worker panicked");
                    }
                }
                joined += 1;
            }
        })
        .await;

        if drained.is_err() {
            let interrupted = metrics.in_flight() as u64;
            warn!(
                sink = %name,
                grace_ms = grace.as_millis() as u64,
                interrupted,
                "Shutdown grace elapsed, aborting in-flight deliveries"
            );
            let pending: Vec<_> = workers.into_iter().skip(joined).collect();
            for handle in &pending {
                handle.abort();
            }
            for handle in pending {
                let _ = handle.await;
            }
            metrics.add_abandoned(interrupted);
        }

        if let Err(e) = self.shared.sink.close().await {
            error!(sink = %name, error = %e, "Close failed on shutdown");
        }

        let snapshot = metrics.snapshot();
        info!(
            sink = %name,
            delivered = snapshot.delivered,
            dropped = snapshot.dropped,
            exhausted = snapshot.exhausted,
            abandoned = snapshot.abandoned,
            "Emission pipeline stopped"
        );
        snapshot
    }
}

async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender also ends the wait
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Worker task that pulls tasks until shutdown or queue close
#[instrument(
    name = "emission_worker_loop",
    skip(shared, rx, shutdown),
    fields(sink = %shared.name)
)]
async fn emission_worker<S>(
    id: usize,
    shared: Arc<Shared<S>>,
    rx: Receiver<EmissionTask>,
    mut shutdown: watch::Receiver<bool>,
) where
    S: LineageSink + Sync + 'static,
{
    debug!(worker = id, "Emission worker started");

    loop {
        let task = tokio::select! {
            biased;
            _ = stopped(&mut shutdown) => break,
            next = rx.recv() => match next {
                Ok(task) => task,
                Err(_) => break,
            },
        };
        shared.metrics.set_queue_len(rx.len());
        shared.deliver(task, &mut shutdown).await;
    }

    debug!(worker = id, "Emission worker stopped");
}

impl<S: LineageSink + Sync> Shared<S> {
    async fn deliver(&self, mut task: EmissionTask, shutdown: &mut watch::Receiver<bool>) {
        loop {
            let permit = tokio::select! {
                biased;
                _ = stopped(shutdown) => {
                    self.abandon(&task, "waiting for admission");
                    return;
                }
                permit = self.permits.acquire() => match permit {
                    Ok(permit) => permit,
                    Err(_) => {
                        self.abandon(&task, "admission closed");
                        return;
                    }
                },
            };

            task.attempt += 1;
            self.metrics.begin_attempt();
            let result = self.sink.emit(&task.record).await;
            self.metrics.end_attempt();
            drop(permit);

            let err = match result {
                Ok(()) => {
                    self.metrics.inc_delivered(task.age());
                    debug!(
                        sink = %self.name,
                        job = %task.job_name(),
                        attempt = task.attempt,
                        "Record delivered"
                    );
                    return;
                }
                Err(e) => e,
            };
            self.metrics.inc_failed_attempts();

            if !self.retry.should_retry(task.attempt) {
                self.metrics.inc_exhausted();
                error!(
                    sink = %self.name,
                    job = %task.job_name(),
                    attempts = task.attempt,
                    error = %err,
                    "Delivery failed, retries exhausted, record dropped"
                );
                return;
            }

            let delay = self.retry.backoff(task.attempt);
            warn!(
                sink = %self.name,
                job = %task.job_name(),
                error = %err,
                "Delivery attempt {}/{} failed, retrying in {}ms",
                task.attempt,
                self.retry.total,
                delay.as_millis()
            );
            task.last_error = Some(err.to_string());

            tokio::select! {
                biased;
                _ = stopped(shutdown) => {
                    self.abandon(&task, "backing off");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    fn abandon(&self, task: &EmissionTask, stage: &str) {
        self.metrics.add_abandoned(1);
        warn!(
            sink = %self.name,
            job = %task.job_name(),
            attempts = task.attempt,
            last_error = task.last_error.as_deref().unwrap_or("-"),
            stage,
            "Shutdown interrupted delivery, record abandoned"
        );
    }
}
