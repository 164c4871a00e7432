//! Listener statistics

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use emitter::PipelineSnapshot;

/// Ingress counters, updated from host threads
#[derive(Debug, Default)]
pub(crate) struct IngressCounters {
    received: AtomicU64,
    converted: AtomicU64,
    unsupported: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
}

impl IngressCounters {
    pub fn inc_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_converted(&self) {
        self.converted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_unsupported(&self) {
        self.unsupported.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> IngressStats {
        IngressStats {
            received: self.received.load(Ordering::Relaxed),
            converted: self.converted.load(Ordering::Relaxed),
            unsupported: self.unsupported.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Ingress counters at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngressStats {
    /// Events seen while started
    pub received: u64,
    /// Events turned into a record
    pub converted: u64,
    /// Events with no converter
    pub unsupported: u64,
    /// Events failing tenant validation
    pub rejected: u64,
    /// Conversion errors and panics
    pub failed: u64,
}

/// Statistics exposed by [`LineageListener::stats`](crate::LineageListener::stats)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ListenerStats {
    pub ingress: IngressStats,
    pub pipeline: PipelineSnapshot,
}

impl ListenerStats {
    /// Share of accepted records that were delivered, in percent
    pub fn delivery_rate(&self) -> f64 {
        if self.pipeline.submitted > 0 {
            self.pipeline.delivered as f64 / self.pipeline.submitted as f64 * 100.0
        } else {
            0.0
        }
    }
}

impl fmt::Display for ListenerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let i = &self.ingress;
        let p = &self.pipeline;
        writeln!(f, "Ingress")?;
        writeln!(f, "   ├─ received: {}", i.received)?;
        writeln!(f, "   ├─ converted: {}", i.converted)?;
        writeln!(f, "   ├─ unsupported: {}", i.unsupported)?;
        writeln!(f, "   ├─ rejected: {}", i.rejected)?;
        writeln!(f, "   └─ failed: {}", i.failed)?;
        writeln!(f, "Delivery")?;
        writeln!(f, "   ├─ submitted: {}", p.submitted)?;
        writeln!(f, "   ├─ delivered: {} ({:.1}%)", p.delivered, self.delivery_rate())?;
        writeln!(f, "   ├─ dropped: {}", p.dropped)?;
        writeln!(f, "   ├─ failed attempts: {}", p.failed_attempts)?;
        writeln!(f, "   ├─ exhausted: {}", p.exhausted)?;
        writeln!(f, "   ├─ abandoned: {}", p.abandoned)?;
        writeln!(f, "   ├─ max in flight: {}", p.max_in_flight)?;
        writeln!(f, "   ├─ outstanding: {}", p.outstanding)?;
        write!(f, "   └─ latency (ms): {}", p.delivery_latency_ms)
    }
}
