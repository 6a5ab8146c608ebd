//! Cluster registry endpoints

use axum::{
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{CreatedId, IdPath, created};
use crate::error::ApiError;
use crate::models::cluster;
use crate::repositories::ClusterLookup;
use crate::server::AppState;

/// Request payload for registering a cluster
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateClusterRequest {
    /// Cluster name, usually the cluster's UUID
    #[schema(example = "00000000-0000-0000-0000-000000000000")]
    pub name: String,
    /// Explicit id; generated when absent
    pub id: Option<i32>,
}

/// Search filters; absent filters match every cluster
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClusterSearch {
    pub id: Option<i32>,
    pub name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/clusters",
    responses(
        (status = 200, description = "All clusters ordered by id", body = [cluster::Model]),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "clusters"
)]
pub async fn list_clusters(
    State(state): State<AppState>,
) -> Result<Json<Vec<cluster::Model>>, ApiError> {
    Ok(Json(state.storage.clusters().list().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/clusters/search",
    params(ClusterSearch),
    responses(
        (status = 200, description = "Clusters matching the filters", body = [cluster::Model]),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "clusters"
)]
pub async fn search_clusters(
    State(state): State<AppState>,
    Query(search): Query<ClusterSearch>,
) -> Result<Json<Vec<cluster::Model>>, ApiError> {
    let lookup = ClusterLookup {
        id: search.id,
        name: search.name,
    };
    Ok(Json(state.storage.clusters().find(&lookup).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/clusters",
    request_body = CreateClusterRequest,
    responses(
        (status = 201, description = "Cluster registered", body = CreatedId),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "Cluster name or id already taken", body = ApiError)
    ),
    tag = "clusters"
)]
pub async fn create_cluster(
    State(state): State<AppState>,
    payload: Result<Json<CreateClusterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedId>), ApiError> {
    let Json(request) = payload?;
    let clusters = state.storage.clusters();

    let id = match request.id {
        Some(id) => clusters.create_with_id(id, &request.name).await?,
        None => clusters.create(&request.name).await?,
    };
    Ok(created(CreatedId { id }))
}

#[utoipa::path(
    get,
    path = "/api/v1/clusters/{id}",
    params(("id" = i32, Path, description = "Cluster id")),
    responses(
        (status = 200, description = "Cluster", body = cluster::Model),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 404, description = "No such cluster", body = ApiError)
    ),
    tag = "clusters"
)]
pub async fn get_cluster(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<Json<cluster::Model>, ApiError> {
    let id = path.parse()?;
    Ok(Json(state.storage.clusters().get_by_id(id).await?))
}

/// Delete a cluster with its configurations and triggers
#[utoipa::path(
    delete,
    path = "/api/v1/clusters/{id}",
    params(("id" = i32, Path, description = "Cluster id")),
    responses(
        (status = 204, description = "Cluster deleted"),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 404, description = "No such cluster", body = ApiError)
    ),
    tag = "clusters"
)]
pub async fn delete_cluster(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<StatusCode, ApiError> {
    let id = path.parse()?;
    state.storage.clusters().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
