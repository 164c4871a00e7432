//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Event Model
//! - Inbound: [`LifecycleEvent`], one per completed catalog mutation, never mutated
//! - Outbound: [`LineageRecord`], OpenLineage `RunEvent` shaped
//! - Time: epoch millis on the event, UTC `DateTime` on the record

mod catalog;
mod config;
mod error;
mod event;
mod record;
mod semantic;
mod sink;
mod source_label;

pub use catalog::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use record::*;
pub use semantic::*;
pub use sink::*;
pub use source_label::SourceLabel;
