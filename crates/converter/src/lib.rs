//! # Converter
//!
//! Turns catalog lifecycle events into lineage records.
//!
//! Responsibilities:
//! - Route events by (family, operation) to a converter
//! - Map identifiers onto dataset namespace/name
//! - Build schema, lifecycle, documentation and catalog facets
//! - Reject events without a tenant when tenant validation is on

pub mod context;
pub mod converters;
mod dispatcher;
mod error;
pub mod naming;

pub use dispatcher::{ConvertFn, EventConverter, Route, ROUTES};
pub use error::ConvertError;
