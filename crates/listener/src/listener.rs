//! LineageListener - lifecycle controller and ingress callback

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use config_loader::ConfigLoader;
use contracts::{LifecycleEvent, LineageSink, ListenerConfig};
use converter::EventConverter;
use emitter::{create_sink, EmissionPipeline, PipelineSettings, SubmitOutcome, TransportSink};
use observability::metrics as facade;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ListenerError;
use crate::stats::{IngressCounters, ListenerStats};

/// Listener lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Uninitialized,
    Initialized,
    Started,
    Stopped,
}

impl fmt::Display for ListenerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Started => "started",
            Self::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// 宿主调度方式
///
/// 监听器在宿主线程上只做转换与入队，投递在独立运行时上异步完成。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerMode {
    AsyncIsolated,
}

/// Everything built by `init`
struct Active<S> {
    config: ListenerConfig,
    converter: EventConverter,
    pipeline: EmissionPipeline<S>,
    runtime: Option<Runtime>,
}

/// Catalog lineage listener
///
/// `init` → `start` → `on_post_event`* → `stop`. A stopped listener cannot be
/// initialized again.
pub struct LineageListener<S = TransportSink>
where
    S: LineageSink + Sync + 'static,
{
    state: ListenerState,
    active: Option<Active<S>>,
    ingress: IngressCounters,
}

impl LineageListener<TransportSink> {
    pub fn new() -> Self {
        Self::uninitialized()
    }

    /// Initialize from flat host properties
    ///
    /// # Errors
    /// - Listener already initialized
    /// - Configuration validation failure
    /// - Transport or runtime construction failure
    pub fn init(&mut self, properties: &HashMap<String, String>) -> Result<(), ListenerError> {
        self.ensure_state("init", &[ListenerState::Uninitialized])?;
        let config = ConfigLoader::load_from_properties(properties)?;
        self.init_with_config(config)
    }

    /// Initialize from an already-loaded configuration
    pub fn init_with_config(&mut self, config: ListenerConfig) -> Result<(), ListenerError> {
        self.ensure_state("init", &[ListenerState::Uninitialized])?;
        ConfigLoader::validate(&config)?;
        let sink = create_sink(&config.transport)?;
        self.activate(config, sink)
    }
}

impl Default for LineageListener<TransportSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> LineageListener<S>
where
    S: LineageSink + Sync + 'static,
{
    fn uninitialized() -> Self {
        Self {
            state: ListenerState::Uninitialized,
            active: None,
            ingress: IngressCounters::default(),
        }
    }

    /// Build an initialized listener around a caller-supplied sink
    pub fn with_sink(config: ListenerConfig, sink: S) -> Result<Self, ListenerError> {
        ConfigLoader::validate(&config)?;
        let mut listener = Self::uninitialized();
        listener.activate(config, sink)?;
        Ok(listener)
    }

    fn activate(&mut self, config: ListenerConfig, sink: S) -> Result<(), ListenerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.runtime.worker_threads.max(1))
            .thread_name("lineage-emitter")
            .enable_all()
            .build()
            .map_err(ListenerError::Runtime)?;

        let settings = PipelineSettings::from_transport(&config.transport);
        let pipeline = {
            let _guard = runtime.enter();
            EmissionPipeline::spawn(sink, settings)
        };
        let converter = EventConverter::from_config(&config);

        info!(
            namespace = %config.namespace,
            transport = config.transport.kind.as_str(),
            sink = %pipeline.name(),
            max_queue_size = settings.queue_capacity,
            max_concurrent_requests = settings.max_concurrent,
            workers = settings.workers,
            drop_policy = settings.drop_policy.as_str(),
            retry_total = settings.retry.total,
            backoff_factor = settings.retry.backoff_factor,
            tenant_required = config.tenant.required,
            worker_threads = config.runtime.worker_threads,
            grace_millis = config.shutdown.grace_millis,
            "Lineage listener initialized"
        );

        self.active = Some(Active {
            config,
            converter,
            pipeline,
            runtime: Some(runtime),
        });
        self.state = ListenerState::Initialized;
        Ok(())
    }

    fn ensure_state(
        &self,
        operation: &'static str,
        allowed: &[ListenerState],
    ) -> Result<(), ListenerError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ListenerError::invalid_state(operation, self.state))
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    pub fn mode(&self) -> ListenerMode {
        ListenerMode::AsyncIsolated
    }

    /// Effective configuration, once initialized
    pub fn config(&self) -> Option<&ListenerConfig> {
        self.active.as_ref().map(|a| &a.config)
    }

    /// Begin accepting events
    pub fn start(&mut self) -> Result<(), ListenerError> {
        self.ensure_state("start", &[ListenerState::Initialized])?;
        self.state = ListenerState::Started;
        info!("Lineage listener started");
        Ok(())
    }

    /// Stop delivery and release the runtime
    ///
    /// Queued records are discarded; running attempts get
    /// `shutdown.graceMillis` to finish. Must be called outside an async
    /// context, like the host's own lifecycle callbacks.
    #[instrument(name = "listener_stop", skip(self))]
    pub fn stop(&mut self) -> Result<ListenerStats, ListenerError> {
        self.ensure_state("stop", &[ListenerState::Initialized, ListenerState::Started])?;
        self.state = ListenerState::Stopped;

        if let Some(active) = self.active.as_mut() {
            let grace = active.config.shutdown.grace();
            if let Some(runtime) = active.runtime.take() {
                runtime.block_on(active.pipeline.shutdown(grace));
                runtime.shutdown_background();
            }
        }

        let stats = self.stats();
        info!(
            received = stats.ingress.received,
            delivered = stats.pipeline.delivered,
            dropped = stats.pipeline.dropped,
            abandoned = stats.pipeline.abandoned,
            "Lineage listener stopped"
        );
        Ok(stats)
    }

    /// Ingress and delivery counters
    pub fn stats(&self) -> ListenerStats {
        ListenerStats {
            ingress: self.ingress.snapshot(),
            pipeline: self
                .active
                .as_ref()
                .map(|a| a.pipeline.snapshot())
                .unwrap_or_default(),
        }
    }

    /// Host callback, invoked after each completed catalog mutation
    ///
    /// Never fails and never panics: conversion errors and panics are logged
    /// and the event is dropped.
    pub fn on_post_event(&self, event: &LifecycleEvent) {
        let active = match (&self.active, self.state) {
            (Some(active), ListenerState::Started) => active,
            _ => {
                debug!(kind = %event.kind, state = %self.state, "Listener not started, event ignored");
                return;
            }
        };

        self.ingress.inc_received();
        let kind = event.kind.to_string();
        facade::record_event_received(&kind);

        let converted = panic::catch_unwind(AssertUnwindSafe(|| active.converter.convert(event)));
        match converted {
            Ok(Ok(Some(record))) => {
                self.ingress.inc_converted();
                facade::record_event_converted(record.job_name(), true);
                let job = record.job_name().to_string();
                match active.pipeline.submit(record) {
                    SubmitOutcome::Enqueued | SubmitOutcome::EvictedOldest => {
                        debug!(job = %job, "Record submitted");
                    }
                    SubmitOutcome::Rejected => {
                        debug!(job = %job, "Record not accepted, queue full");
                    }
                    SubmitOutcome::Closed => {
                        debug!(job = %job, "Record not accepted, pipeline closed");
                    }
                }
            }
            Ok(Ok(None)) => {
                self.ingress.inc_unsupported();
                facade::record_event_converted(&kind, false);
            }
            Ok(Err(e)) if e.is_rejection() => {
                self.ingress.inc_rejected();
                facade::record_event_rejected(e.reason());
                warn!(kind = %event.kind, id = %event.identifier, "Event rejected: {}", e);
            }
            Ok(Err(e)) => {
                self.ingress.inc_failed();
                facade::record_event_rejected(e.reason());
                warn!(
                    kind = %event.kind,
                    id = %event.identifier,
                    error = %e,
                    "Event conversion failed, event dropped"
                );
            }
            Err(payload) => {
                self.ingress.inc_failed();
                facade::record_event_rejected("panic");
                error!(
                    kind = %event.kind,
                    id = %event.identifier,
                    panic = %panic_message(payload.as_ref()),
                    "Converter panicked, event dropped"
                );
            }
        }
    }
}

impl<S> Drop for LineageListener<S>
where
    S: LineageSink + Sync + 'static,
{
    fn drop(&mut self) {
        // Runtime drop blocks; never block in the host's drop path
        if let Some(runtime) = self.active.as_mut().and_then(|a| a.runtime.take()) {
            runtime.shutdown_background();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
