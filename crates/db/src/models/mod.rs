//! Row models mapped with `sqlx::FromRow`.

pub mod event;
pub mod job;
pub mod queue;
