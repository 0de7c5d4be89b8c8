//! Job status and event log.
//!
//! - [`JobStore`] is the status/event API used by workers and the gateway:
//!   append an event (creating the job on first use), write a terminal
//!   status, read a snapshot.
//! - [`JobEventSink`] binds a store to one job so pipeline stages can
//!   report progress through the [`EventSink`](vlogcrew_core::sink::EventSink)
//!   seam.

pub mod sink;
pub mod store;

pub use sink::JobEventSink;
pub use store::{JobStore, UpdateOutcome};
