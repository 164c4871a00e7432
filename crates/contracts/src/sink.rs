//! LineageSink trait - emission pipeline output interface
//!
//! Defines the abstract interface for transports.

use crate::{ContractError, LineageRecord};

/// Lineage record transport
///
/// `emit` takes `&self`: the pipeline shares one sink between all workers
/// and calls it concurrently, up to the admission budget.
#[trait_variant::make(LineageSink: Send)]
pub trait LocalLineageSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one record
    ///
    /// # Errors
    /// Returns delivery error (should include context); the pipeline retries it
    async fn emit(&self, record: &LineageRecord) -> Result<(), ContractError>;

    /// Close sink, releasing connections and flushing buffers
    async fn close(&self) -> Result<(), ContractError>;
}
