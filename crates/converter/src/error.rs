//! Converter error types

use contracts::EventKind;
use thiserror::Error;

/// Conversion errors
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Event carries no tenant snapshot while tenant validation is on
    #[error("missing tenant_id for '{kind}' event")]
    MissingTenant { kind: EventKind },

    /// A mandatory field is absent or empty
    #[error("'{kind}' event is missing required field '{field}'")]
    MissingField { kind: EventKind, field: &'static str },

    /// Snapshot variant does not belong to the event family
    #[error("'{kind}' event carries a '{found}' snapshot, expected '{expected}'")]
    SnapshotMismatch {
        kind: EventKind,
        expected: &'static str,
        found: &'static str,
    },

    /// Event time outside the representable range
    #[error("'{kind}' event has invalid event time {millis}")]
    InvalidEventTime { kind: EventKind, millis: i64 },
}

impl ConvertError {
    pub fn missing_field(kind: EventKind, field: &'static str) -> Self {
        Self::MissingField { kind, field }
    }

    pub fn snapshot_mismatch(kind: EventKind, expected: &'static str, found: &'static str) -> Self {
        Self::SnapshotMismatch {
            kind,
            expected,
            found,
        }
    }

    /// Short label used as the `reason` metric tag
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingTenant { .. } => "missing_tenant",
            Self::MissingField { .. } => "missing_field",
            Self::SnapshotMismatch { .. } => "snapshot_mismatch",
            Self::InvalidEventTime { .. } => "invalid_event_time",
        }
    }

    /// Validation rejection, logged without an error chain by the listener
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::MissingTenant { .. })
    }
}
