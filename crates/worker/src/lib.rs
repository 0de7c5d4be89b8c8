//! Background execution of queued pipeline jobs.
//!
//! The gateway calls [`queue::enqueue_job`]; worker processes run a
//! [`QueueWorker`] that claims items, executes the pipeline through
//! [`run_job`] and records a terminal status for every claimed job.

pub mod config;
pub mod execute;
pub mod queue;
pub mod worker;

pub use execute::run_job;
pub use queue::{enqueue_job, EnqueueError};
pub use worker::QueueWorker;
