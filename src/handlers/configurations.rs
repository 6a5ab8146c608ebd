//! Cluster configuration endpoints
//!
//! Routes under `/api/v1/cluster/{name}` address a cluster by name and keep
//! at most one configuration active. The by-id enable and disable routes under
//! `/api/v1/configurations/{id}` flip a single row and leave the cluster's
//! other assignments untouched.

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ChangeRequest, ClusterPath, IdPath, created};
use crate::error::ApiError;
use crate::models::ClusterConfiguration;
use crate::server::AppState;

/// Request payload for storing new configuration text for a cluster
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateConfigurationRequest {
    #[schema(example = "tester")]
    pub user: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub description: String,
    /// Opaque configuration text, stored exactly as sent
    pub configuration: String,
}

/// Request payload for attaching an existing profile to a cluster
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignConfigurationRequest {
    pub profile_id: i32,
    #[schema(example = "tester")]
    pub user: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[utoipa::path(
    get,
    path = "/api/v1/configurations",
    responses(
        (status = 200, description = "Every cluster configuration", body = [ClusterConfiguration])
    ),
    tag = "configurations"
)]
pub async fn list_configurations(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClusterConfiguration>>, ApiError> {
    Ok(Json(state.storage.configurations().list().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/configurations/{id}",
    params(("id" = i32, Path, description = "Cluster configuration id")),
    responses(
        (status = 200, description = "Cluster configuration", body = ClusterConfiguration),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 404, description = "No such configuration", body = ApiError)
    ),
    tag = "configurations"
)]
pub async fn get_configuration(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<Json<ClusterConfiguration>, ApiError> {
    let id = path.parse()?;
    Ok(Json(state.storage.configurations().get_by_id(id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/configurations/{id}",
    params(("id" = i32, Path, description = "Cluster configuration id")),
    responses(
        (status = 204, description = "Configuration deleted"),
        (status = 404, description = "No such configuration", body = ApiError)
    ),
    tag = "configurations"
)]
pub async fn delete_configuration(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<StatusCode, ApiError> {
    let id = path.parse()?;
    state.storage.configurations().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Activate one row without deactivating the cluster's other rows
#[utoipa::path(
    put,
    path = "/api/v1/configurations/{id}/enable",
    params(("id" = i32, Path, description = "Cluster configuration id")),
    responses(
        (status = 204, description = "Row activated"),
        (status = 404, description = "No such configuration", body = ApiError)
    ),
    tag = "configurations"
)]
pub async fn enable_configuration_by_id(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<StatusCode, ApiError> {
    let id = path.parse()?;
    state
        .storage
        .configurations()
        .enable_or_disable_by_id(id, true)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/configurations/{id}/disable",
    params(("id" = i32, Path, description = "Cluster configuration id")),
    responses(
        (status = 204, description = "Row deactivated"),
        (status = 404, description = "No such configuration", body = ApiError)
    ),
    tag = "configurations"
)]
pub async fn disable_configuration_by_id(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<StatusCode, ApiError> {
    let id = path.parse()?;
    state
        .storage
        .configurations()
        .enable_or_disable_by_id(id, false)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/cluster/{name}/configurations",
    params(("name" = String, Path, description = "Cluster name")),
    responses(
        (status = 200, description = "Configurations of the cluster", body = [ClusterConfiguration]),
        (status = 404, description = "No such cluster", body = ApiError)
    ),
    tag = "configurations"
)]
pub async fn list_cluster_configurations(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
) -> Result<Json<Vec<ClusterConfiguration>>, ApiError> {
    Ok(Json(
        state
            .storage
            .configurations()
            .list_for_cluster(&path.name)
            .await?,
    ))
}

/// Store new configuration text and make it the cluster's active configuration
#[utoipa::path(
    post,
    path = "/api/v1/cluster/{name}/configurations",
    params(("name" = String, Path, description = "Cluster name")),
    request_body = CreateConfigurationRequest,
    responses(
        (status = 201, description = "Configuration stored and activated", body = [ClusterConfiguration]),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "No such cluster", body = ApiError)
    ),
    tag = "configurations"
)]
pub async fn create_cluster_configuration(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    payload: Result<Json<CreateConfigurationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<ClusterConfiguration>>), ApiError> {
    let Json(request) = payload?;
    let configurations = state
        .storage
        .configurations()
        .create(
            &path.name,
            &request.user,
            &request.reason,
            &request.description,
            &request.configuration,
        )
        .await?;
    Ok(created(configurations))
}

#[utoipa::path(
    post,
    path = "/api/v1/cluster/{name}/configurations/assign",
    params(("name" = String, Path, description = "Cluster name")),
    request_body = AssignConfigurationRequest,
    responses(
        (status = 201, description = "Profile assigned", body = [ClusterConfiguration]),
        (status = 404, description = "No such cluster or profile", body = ApiError)
    ),
    tag = "configurations"
)]
pub async fn assign_cluster_configuration(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    payload: Result<Json<AssignConfigurationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<ClusterConfiguration>>), ApiError> {
    let Json(request) = payload?;
    let configurations = state
        .storage
        .configurations()
        .assign(
            &path.name,
            request.profile_id,
            &request.user,
            &request.reason,
            request.active,
        )
        .await?;
    Ok(created(configurations))
}

#[utoipa::path(
    put,
    path = "/api/v1/cluster/{name}/configurations/enable",
    params(("name" = String, Path, description = "Cluster name")),
    request_body = ChangeRequest,
    responses(
        (status = 200, description = "Latest configuration is now the only active one", body = ClusterConfiguration),
        (status = 404, description = "No such cluster or no configuration", body = ApiError)
    ),
    tag = "configurations"
)]
pub async fn enable_cluster_configuration(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    payload: Result<Json<ChangeRequest>, JsonRejection>,
) -> Result<Json<ClusterConfiguration>, ApiError> {
    let Json(request) = payload?;
    let enabled = state
        .storage
        .configurations()
        .enable(&path.name, &request.user, &request.reason)
        .await?;
    Ok(Json(enabled))
}

#[utoipa::path(
    put,
    path = "/api/v1/cluster/{name}/configurations/disable",
    params(("name" = String, Path, description = "Cluster name")),
    request_body = ChangeRequest,
    responses(
        (status = 204, description = "No configuration of the cluster is active"),
        (status = 404, description = "No such cluster", body = ApiError)
    ),
    tag = "configurations"
)]
pub async fn disable_cluster_configuration(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    payload: Result<Json<ChangeRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;
    state
        .storage
        .configurations()
        .disable(&path.name, &request.user, &request.reason)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Configuration text the cluster's agent should apply, returned verbatim
#[utoipa::path(
    get,
    path = "/api/v1/cluster/{name}/configuration",
    params(("name" = String, Path, description = "Cluster name")),
    responses(
        (status = 200, description = "Active configuration text", body = String, content_type = "application/json"),
        (status = 404, description = "No such cluster or no active configuration", body = ApiError)
    ),
    tag = "configurations"
)]
pub async fn get_active_configuration(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
) -> Result<([(&'static str, &'static str); 1], String), ApiError> {
    let configuration = state
        .storage
        .configurations()
        .get_active_configuration(&path.name)
        .await?;
    Ok(([("content-type", "application/json")], configuration))
}
