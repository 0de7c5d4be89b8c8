pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /crewai               create job (POST, multipart)
/// /crewai/{job_id}      job status, result and events (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/crewai", post(handlers::jobs::create_job))
        .route("/crewai/{job_id}", get(handlers::jobs::get_job_status))
}
