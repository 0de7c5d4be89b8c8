//! vlogcrew HTTP gateway library.
//!
//! Exposes config, state, error handling, the image description client and
//! the router so integration tests and the binary entrypoint share them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;
pub mod vision;
