//! Listener error types

use contracts::ContractError;
use emitter::EmitterError;
use thiserror::Error;

use crate::ListenerState;

/// Lifecycle errors surfaced to the host from `init` / `start` / `stop`
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Configuration parse or validation failure
    #[error("configuration error: {0}")]
    Config(#[from] ContractError),

    /// Transport could not be built
    #[error(transparent)]
    SinkCreation(#[from] EmitterError),

    /// Delivery runtime could not be built
    #[error("failed to build delivery runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// Operation not allowed in the current state
    #[error("cannot {operation} listener in state {state}")]
    InvalidState {
        operation: &'static str,
        state: ListenerState,
    },
}

impl ListenerError {
    pub fn invalid_state(operation: &'static str, state: ListenerState) -> Self {
        Self::InvalidState { operation, state }
    }
}
