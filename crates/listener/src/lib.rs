//! # Lineage Listener
//!
//! Host-facing lifecycle controller.
//!
//! The host calls [`LineageListener::on_post_event`] after every completed
//! catalog mutation. The event is converted on the caller's thread and handed
//! to the emission pipeline; delivery happens on the listener's own runtime.

mod error;
mod listener;
mod stats;

pub use error::ListenerError;
pub use listener::{LineageListener, ListenerMode, ListenerState};
pub use stats::{IngressStats, ListenerStats};
