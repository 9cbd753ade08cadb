//! Integration tests for the `/api/v1/campaign` endpoints.

mod common;

use axum::body::Body;
use axum::http::{Method, StatusCode};
use common::{body_json, get, send, send_json};
use serde_json::json;
use sqlx::SqlitePool;

fn populated(notes: &str) -> serde_json::Value {
    json!({
        "tables": [{ "name": "Initiative", "rows": [{ "name": "Goblin", "hp": 7 }] }],
        "notes": notes,
    })
}

fn empty_looking() -> serde_json::Value {
    json!({ "tables": [{ "name": "Initiative", "rows": [] }], "notes": "", "lists": [] })
}

// ---------------------------------------------------------------------------
// Test: GET returns the document with its version as ETag
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_returns_document_and_etag(pool: SqlitePool) {
    let app = common::build_test_app(pool).await;
    let response = get(app, "/api/v1/campaign").await;

    assert_eq!(response.status(), StatusCode::OK);
    let etag = response.headers()["etag"].to_str().unwrap().to_string();

    let json = body_json(response).await;
    assert_eq!(json["data"], json!({}));
    assert_eq!(etag, format!("\"{}\"", json["version"].as_str().unwrap()));
    assert!(json["updated_at"].is_string());
}

// ---------------------------------------------------------------------------
// Test: PUT then GET round-trips, and If-None-Match short-circuits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn put_then_conditional_get(pool: SqlitePool) {
    let app = common::build_test_app(pool).await;

    let response = send_json(
        app.clone(),
        Method::PUT,
        "/api/v1/campaign",
        &[],
        &populated("Session 3 recap"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let etag = response.headers()["etag"].to_str().unwrap().to_string();
    let written = body_json(response).await;
    let version = written["data"]["version"].as_str().unwrap().to_string();
    assert!(written["data"]["snapshot_id"].is_i64());

    let json = body_json(get(app.clone(), "/api/v1/campaign").await).await;
    assert_eq!(json["data"], populated("Session 3 recap"));
    assert_eq!(json["version"], version);

    let response = send(
        app.clone(),
        Method::GET,
        "/api/v1/campaign",
        &[("if-none-match", &etag)],
        Body::empty(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);

    let response = get(app, &format!("/api/v1/campaign?version={version}")).await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
}

// ---------------------------------------------------------------------------
// Test: stale If-Match is a version conflict and changes nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_if_match_returns_412(pool: SqlitePool) {
    let app = common::build_test_app(pool).await;

    let first = send_json(app.clone(), Method::PUT, "/api/v1/campaign", &[], &populated("one")).await;
    let first_etag = first.headers()["etag"].to_str().unwrap().to_string();

    let second = send_json(
        app.clone(),
        Method::PUT,
        "/api/v1/campaign",
        &[("if-match", &first_etag)],
        &populated("two"),
    )
    .await;
    assert_eq!(second.status(), StatusCode::OK);

    let stale = send_json(
        app.clone(),
        Method::PUT,
        "/api/v1/campaign",
        &[("if-match", &first_etag)],
        &populated("three"),
    )
    .await;
    assert_eq!(stale.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(body_json(stale).await["code"], "VERSION_CONFLICT");

    let stale_query = send_json(
        app.clone(),
        Method::PUT,
        "/api/v1/campaign?expected_version=deadbeef",
        &[],
        &populated("four"),
    )
    .await;
    assert_eq!(stale_query.status(), StatusCode::PRECONDITION_FAILED);

    let json = body_json(get(app, "/api/v1/campaign").await).await;
    assert_eq!(json["data"], populated("two"));
}

// ---------------------------------------------------------------------------
// Test: empty-looking writes need an explicit override
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_write_rejected_unless_allowed(pool: SqlitePool) {
    let app = common::build_test_app(pool).await;

    let rejected =
        send_json(app.clone(), Method::PUT, "/api/v1/campaign", &[], &empty_looking()).await;
    assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(rejected).await["code"], "EMPTY_STATE_REJECTED");

    for (uri, headers) in [
        ("/api/v1/campaign?allow_empty=1", vec![]),
        ("/api/v1/campaign?allowEmpty=1", vec![]),
        ("/api/v1/campaign", vec![("x-allow-empty", "1")]),
    ] {
        let response =
            send_json(app.clone(), Method::PUT, uri, &headers, &empty_looking()).await;
        assert_eq!(response.status(), StatusCode::OK, "override via {uri} {headers:?}");
    }
}

// ---------------------------------------------------------------------------
// Test: oversized, non-object and malformed bodies are rejected
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn bad_bodies_are_rejected(pool: SqlitePool) {
    let mut config = common::test_config();
    config.max_document_bytes = 128;
    let state = common::build_state(pool, config.clone()).await;
    let app = campfire_api::router::build_app_router(state, &config);

    let big = populated(&"x".repeat(500));
    let response = send_json(app.clone(), Method::PUT, "/api/v1/campaign", &[], &big).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], "PAYLOAD_TOO_LARGE");

    let response =
        send_json(app.clone(), Method::PUT, "/api/v1/campaign", &[], &json!([1, 2])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = send(
        app,
        Method::PUT,
        "/api/v1/campaign",
        &[],
        Body::from("{not json"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Test: snapshots are listed newest first and respect the limit
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn snapshots_list_newest_first(pool: SqlitePool) {
    let app = common::build_test_app(pool).await;
    for i in 0..3 {
        send_json(
            app.clone(),
            Method::PUT,
            "/api/v1/campaign",
            &[],
            &populated(&format!("rev {i}")),
        )
        .await;
    }

    let json = body_json(get(app.clone(), "/api/v1/campaign/snapshots").await).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 4);
    let ids: Vec<i64> = items.iter().map(|s| s["id"].as_i64().unwrap()).collect();
    assert!(ids.windows(2).all(|w| w[0] > w[1]));
    assert!(items[0]["size"].as_i64().unwrap() > 0);

    let json = body_json(get(app, "/api/v1/campaign/snapshots?limit=2").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Test: restore brings back a snapshot; unknown ids are 404
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn restore_snapshot_and_missing_id(pool: SqlitePool) {
    let app = common::build_test_app(pool).await;

    let first = send_json(app.clone(), Method::PUT, "/api/v1/campaign", &[], &populated("old")).await;
    let first = body_json(first).await;
    let old_id = first["data"]["snapshot_id"].as_i64().unwrap();
    send_json(app.clone(), Method::PUT, "/api/v1/campaign", &[], &populated("new")).await;

    let response = send(
        app.clone(),
        Method::POST,
        &format!("/api/v1/campaign/restore/{old_id}"),
        &[],
        Body::empty(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let restored = body_json(response).await;
    assert_eq!(restored["data"]["restored"], old_id);
    assert_eq!(restored["data"]["version"], first["data"]["version"]);
    assert!(restored["data"]["snapshot_id"].as_i64().unwrap() > old_id);

    let json = body_json(get(app.clone(), "/api/v1/campaign").await).await;
    assert_eq!(json["data"], populated("old"));

    let response = send(
        app,
        Method::POST,
        "/api/v1/campaign/restore/424242",
        &[],
        Body::empty(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}
