//! Domain types shared by every vlogcrew crate.
//!
//! Nothing in here touches the network or the database: the job lifecycle
//! rule, the queue payload, the validated pipeline artifacts and the
//! [`EventSink`](sink::EventSink) seam that pipeline stages report through.

pub mod artifacts;
pub mod error;
pub mod input;
pub mod sink;
pub mod status;
pub mod types;
