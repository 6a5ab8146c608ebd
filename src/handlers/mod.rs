//! # API Handlers
//!
//! HTTP endpoints over the storage facade. Handlers only translate between
//! JSON and repository calls; status codes come from [`ApiError`].

pub mod clusters;
pub mod configurations;
pub mod profiles;
pub mod triggers;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, RepositoryError, parse_id};
use crate::models::ServiceInfo;
use crate::server::AppState;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Health status response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    #[schema(example = "ok")]
    pub status: String,
}

/// Liveness plus database reachability
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service and database are reachable", body = HealthStatus),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "root"
)]
pub async fn healthz(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    state.storage.health_check().await?;
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
    }))
}

/// Numeric id taken from the request path
#[derive(Debug, Deserialize)]
pub struct IdPath {
    pub id: String,
}

impl IdPath {
    pub fn parse(&self) -> Result<i32, RepositoryError> {
        parse_id(&self.id)
    }
}

/// Cluster name taken from the request path
#[derive(Debug, Deserialize)]
pub struct ClusterPath {
    pub name: String,
}

/// Response carrying the id of a created row
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedId {
    #[schema(example = 1)]
    pub id: i32,
}

/// Audit fields sent with cluster-scoped activation changes
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangeRequest {
    #[schema(example = "tester")]
    pub user: String,
    #[serde(default)]
    #[schema(example = "rollout")]
    pub reason: String,
}

pub(crate) fn created<T>(body: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(body))
}

#[cfg(test)]
mod tests;
