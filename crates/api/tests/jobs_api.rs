//! Integration tests for `POST /api/crewai` and `GET /api/crewai/{job_id}`.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, count_jobs, get, post_multipart, Part, StubDescriber};
use sqlx::PgPool;
use vlogcrew_core::status::JobStatus;
use vlogcrew_db::repositories::QueueRepo;
use vlogcrew_events::JobStore;

const CREATE: &str = "/api/crewai";

fn form(platform: &str, niche: &str) -> Vec<Part> {
    vec![
        Part::text("target_platform", platform),
        Part::text("creator_niche", niche),
    ]
}

async fn queued_niche(pool: &PgPool) -> String {
    let item = QueueRepo::claim_next(pool, "inspector").await.unwrap().unwrap();
    item.payload["creator_niche"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_returns_uuid_and_job_is_immediately_started(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_multipart(app.clone(), CREATE, &form("douyin", "cooking")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let job_id = json["job_id"].as_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&job_id).is_ok());

    let response = get(app, &format!("{CREATE}/{job_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["job_id"], job_id.as_str());
    assert_eq!(json["status"], "STARTED");
    assert_eq!(json["result"], "");
    let events = json["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["data"], "Job queued");
    assert!(events[0]["timestamp"].is_string());

    assert_eq!(queued_niche(&pool).await, "cooking");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_fields_are_rejected_without_writes(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_multipart(app.clone(), CREATE, &form("   ", "cooking")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_multipart(app, CREATE, &[Part::text("target_platform", "douyin")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("creator_niche"));

    assert_eq!(count_jobs(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_image_is_rejected_and_nothing_is_created(pool: PgPool) {
    let describer = StubDescriber::ok("unused");
    let app = common::build_test_app_with(pool.clone(), describer.clone());

    let mut parts = form("douyin", "cooking");
    parts.push(Part::file("empty.jpg", "image/jpeg", b""));
    let response = post_multipart(app, CREATE, &parts).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["detail"].is_string());
    assert!(json.get("job_id").is_none());
    assert_eq!(describer.calls(), 0);
    assert_eq!(count_jobs(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unnamed_empty_file_part_is_ignored(pool: PgPool) {
    let describer = StubDescriber::ok("unused");
    let app = common::build_test_app_with(pool.clone(), describer.clone());

    let mut parts = form("douyin", "cooking");
    parts.push(Part {
        name: "file",
        file_name: None,
        content_type: None,
        data: Vec::new(),
    });
    let response = post_multipart(app, CREATE, &parts).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(describer.calls(), 0);
    assert_eq!(queued_niche(&pool).await, "cooking");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn image_description_is_merged_into_niche(pool: PgPool) {
    let describer = StubDescriber::ok("A wok on a gas stove");
    let app = common::build_test_app_with(pool.clone(), describer.clone());

    let mut parts = form("douyin", "cooking");
    parts.push(Part::file("wok.png", "image/png", b"\x89PNG fake"));
    let response = post_multipart(app, CREATE, &parts).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(describer.calls(), 1);
    assert_eq!(
        queued_niche(&pool).await,
        "User description: cooking\n\nImage analysis: A wok on a gas stove"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn image_description_failure_is_a_visible_500(pool: PgPool) {
    let app = common::build_test_app_with(pool.clone(), StubDescriber::failing("quota exceeded"));

    let mut parts = form("douyin", "cooking");
    parts.push(Part::file("wok.jpg", "image/jpeg", b"jpeg bytes"));
    let response = post_multipart(app, CREATE, &parts).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "IMAGE_UNDERSTANDING_FAILED");
    let detail = json["detail"].as_str().unwrap();
    assert!(detail.starts_with("Image understanding failed"));
    assert!(detail.contains("quota exceeded"));
    assert_eq!(count_jobs(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn slow_image_description_is_a_visible_500_before_the_request_timeout(pool: PgPool) {
    let config = vlogcrew_api::config::ServerConfig {
        request_timeout_secs: 1,
        ..common::test_config()
    };
    let describer = StubDescriber::slow("too late", Duration::from_secs(3));
    let app = common::build_test_app_with_config(pool.clone(), config, describer);

    let mut parts = form("douyin", "cooking");
    parts.push(Part::file("wok.jpg", "image/jpeg", b"jpeg bytes"));
    let response = post_multipart(app, CREATE, &parts).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "IMAGE_UNDERSTANDING_FAILED");
    assert!(json["detail"]
        .as_str()
        .unwrap()
        .starts_with("Image understanding failed: no answer within"));
    assert_eq!(count_jobs(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn oversized_upload_is_rejected_with_413(pool: PgPool) {
    let describer = StubDescriber::ok("unused");
    let app = common::build_test_app_with(pool.clone(), describer.clone());

    let too_big = vec![0u8; common::test_config().max_upload_bytes * 2];
    let mut parts = form("douyin", "cooking");
    parts.push(Part::file("huge.jpg", "image/jpeg", &too_big));
    let response = post_multipart(app, CREATE, &parts).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(describer.calls(), 0);
    assert_eq!(count_jobs(&pool).await, 0);
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_job_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, &format!("{CREATE}/does-not-exist")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completed_job_returns_decoded_result_and_reads_are_idempotent(pool: PgPool) {
    let store = JobStore::new(pool.clone());
    store.append_event("done", "Flow started").await;
    store
        .update_job(
            "done",
            JobStatus::Complete,
            r#"{"insight": "trends"}"#,
            &["Flow complete"],
        )
        .await;
    let app = common::build_test_app(pool);

    let first = body_json(get(app.clone(), &format!("{CREATE}/done")).await).await;
    let second = body_json(get(app, &format!("{CREATE}/done")).await).await;

    assert_eq!(first, second);
    assert_eq!(first["status"], "COMPLETE");
    assert_eq!(first["result"]["insight"], "trends");
    assert_eq!(first["events"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_json_result_is_returned_as_text(pool: PgPool) {
    let store = JobStore::new(pool.clone());
    store.append_event("failed", "Flow started").await;
    store
        .update_job("failed", JobStatus::Error, "insight stage failed", &["Flow failed"])
        .await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app, &format!("{CREATE}/failed")).await).await;

    assert_eq!(json["status"], "ERROR");
    assert_eq!(json["result"], "insight stage failed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn store_outage_is_a_500_not_a_404(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    pool.close().await;

    let response = get(app, &format!("{CREATE}/any")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["detail"], "An internal error occurred");
}
