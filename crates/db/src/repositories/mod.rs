//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Methods that may run inside a caller's transaction accept any
//! [`sqlx::PgExecutor`] (a `&PgPool` or `&mut *tx`).

pub mod event_repo;
pub mod job_repo;
pub mod queue_repo;

pub use event_repo::EventRepo;
pub use job_repo::JobRepo;
pub use queue_repo::QueueRepo;
