//! EmissionTask - one record travelling through the pipeline

use std::time::{Duration, Instant};

use contracts::LineageRecord;

/// A record plus its delivery bookkeeping.
///
/// Created on submission; dropped on success, exhaustion, or shutdown.
#[derive(Debug)]
pub struct EmissionTask {
    pub record: LineageRecord,
    /// Attempts made so far
    pub attempt: u32,
    pub last_error: Option<String>,
    pub enqueued_at: Instant,
}

impl EmissionTask {
    pub fn new(record: LineageRecord) -> Self {
        Self {
            record,
            attempt: 0,
            last_error: None,
            enqueued_at: Instant::now(),
        }
    }

    pub fn job_name(&self) -> &str {
        self.record.job_name()
    }

    /// Time since submission
    pub fn age(&self) -> Duration {
        self.enqueued_at.elapsed()
    }
}
