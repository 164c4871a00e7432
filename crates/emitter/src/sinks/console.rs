//! ConsoleSink - logs serialized records via tracing

use contracts::{ContractError, LineageRecord, LineageSink};
use tracing::{info, instrument};

/// Sink that logs every record as one JSON line
pub struct ConsoleSink {
    name: String,
}

impl ConsoleSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new("console")
    }
}

impl LineageSink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "console_sink_emit",
        skip(self, record),
        fields(sink = %self.name, job = %record.job_name())
    )]
    async fn emit(&self, record: &LineageRecord) -> Result<(), ContractError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ContractError::serialization(record.job_name(), e))?;
        info!(sink = %self.name, record = %json, "Lineage record");
        Ok(())
    }

    #[instrument(name = "console_sink_close", skip(self))]
    async fn close(&self) -> Result<(), ContractError> {
        info!(sink = %self.name, "ConsoleSink closed");
        Ok(())
    }
}
