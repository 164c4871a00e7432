//! # Emitter
//!
//! Asynchronous delivery of lineage records.
//!
//! Responsibilities:
//! - Bounded task queue with a drop policy on saturation
//! - Fixed worker pool sharing one admission semaphore
//! - Exponential-backoff retry up to a total attempt cap
//! - Console, file and HTTP transports

mod error;
mod metrics;
mod pipeline;
mod retry;
pub mod sinks;
mod task;

pub use error::EmitterError;
pub use metrics::{PipelineMetrics, PipelineSnapshot};
pub use pipeline::{EmissionPipeline, PipelineSettings, SubmitOutcome};
pub use retry::RetryPolicy;
pub use sinks::{create_sink, TransportSink};
pub use task::EmissionTask;
