//! # Tests for Handlers
//!
//! Handler-level tests that need no schema: a disconnected storage handle
//! is enough to check error mapping.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::handlers::{IdPath, healthz, root};
use crate::server::AppState;
use crate::storage::{Dialect, Storage};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use sea_orm::DatabaseConnection;

fn disconnected_state() -> AppState {
    AppState {
        config: Arc::new(AppConfig::default()),
        storage: Arc::new(Storage::new(
            DatabaseConnection::default(),
            Dialect::Sqlite,
        )),
    }
}

#[tokio::test]
async fn test_root_handler_returns_expected_service_info() {
    let Json(service_info) = root().await;

    assert_eq!(service_info.service, "config-controller");
    assert_eq!(service_info.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_healthz_without_database_is_unavailable() {
    let result = healthz(State(disconnected_state())).await;

    let err = result.err().expect("health check should fail");
    assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_malformed_id_is_rejected_before_storage() {
    let path = Path(IdPath {
        id: "12a".to_string(),
    });
    let result = super::clusters::get_cluster(State(disconnected_state()), path).await;

    let err = result.err().expect("malformed id should fail");
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(&*err.code, "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_storage_failure_maps_to_unavailable() {
    let path = Path(IdPath {
        id: "7".to_string(),
    });
    let result = super::clusters::get_cluster(State(disconnected_state()), path).await;

    let err = result.err().expect("disconnected storage should fail");
    assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
}
