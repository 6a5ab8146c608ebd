//! Router tests exercising the REST adapter end to end on in-memory SQLite.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use controller::config::AppConfig;
use controller::server::{AppState, create_app};
use serde_json::{Value, json};
use tower::ServiceExt;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::setup_storage;

async fn app() -> Result<Router> {
    let storage = setup_storage().await?;
    Ok(create_app(AppState {
        config: Arc::new(AppConfig::default()),
        storage: Arc::new(storage),
    }))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Vec<u8>)> {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json)?)
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body)?).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, bytes.to_vec()))
}

#[tokio::test]
async fn healthz_reports_ok() -> Result<()> {
    let app = app().await?;
    let (status, body) = send(&app, Method::GET, "/healthz", None).await?;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body)?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn cluster_lifecycle_over_http() -> Result<()> {
    let app = app().await?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/clusters",
        Some(json!({"name": "c1"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = serde_json::from_slice::<Value>(&body)?["id"]
        .as_i64()
        .expect("id in response");

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/clusters/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body)?["name"], "c1");

    let (status, body) = send(&app, Method::GET, "/api/v1/clusters/search?name=c1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body)?.as_array().map(Vec::len), Some(1));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/clusters",
        Some(json!({"name": "c1"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/clusters/{id}"), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/api/v1/clusters/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn non_numeric_id_is_a_bad_request() -> Result<()> {
    let app = app().await?;
    let (status, body) = send(&app, Method::GET, "/api/v1/clusters/abc", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(serde_json::from_slice::<Value>(&body)?["code"], "VALIDATION_FAILED");

    let (status, _) = send(&app, Method::PUT, "/api/v1/configurations/x/enable", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn agent_fetches_active_configuration_verbatim() -> Result<()> {
    let app = app().await?;
    let text = r#"{"watch":["a","b","c"],"no_op":"X"}"#;

    send(&app, Method::POST, "/api/v1/clusters", Some(json!({"name": "c1"}))).await?;

    let (status, _) = send(&app, Method::GET, "/api/v1/cluster/c1/configuration", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/cluster/c1/configurations",
        Some(json!({"user": "tester", "reason": "init", "configuration": text})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let rows: Value = serde_json::from_slice(&body)?;
    assert_eq!(rows[0]["active"], true);

    let (status, body) = send(&app, Method::GET, "/api/v1/cluster/c1/configuration", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, text.as_bytes());

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/cluster/c1/configurations/disable",
        Some(json!({"user": "tester"})),
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/api/v1/cluster/c1/configuration", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/cluster/c1/configurations/enable",
        Some(json!({"user": "tester", "reason": "resume"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body)?["configuration"], text);
    Ok(())
}

#[tokio::test]
async fn trigger_flow_over_http() -> Result<()> {
    let app = app().await?;
    send(&app, Method::POST, "/api/v1/clusters", Some(json!({"name": "c1"}))).await?;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/cluster/c1/triggers",
        Some(json!({"type": "must-gather", "user": "tester"})),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/trigger-types",
        Some(json!({"type": "must-gather", "description": "diagnostics"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/cluster/c1/triggers",
        Some(json!({"type": "must-gather", "user": "tester", "reason": "why"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = serde_json::from_slice::<Value>(&body)?["id"]
        .as_i64()
        .expect("id in response");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/cluster/c1/triggers/{id}/ack"),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/triggers/{id}/deactivate"),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/cluster/c1/triggers?active=true",
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body)?, json!([]));
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_problem_response() -> Result<()> {
    let app = app().await?;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/profiles")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;

    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()["content-type"],
        "application/problem+json"
    );
    Ok(())
}

#[tokio::test]
async fn responses_echo_trace_id() -> Result<()> {
    let app = app().await?;
    let request = Request::builder()
        .uri("/")
        .header("x-trace-id", "trace-123")
        .body(Body::empty())?;

    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-trace-id"], "trace-123");
    Ok(())
}
