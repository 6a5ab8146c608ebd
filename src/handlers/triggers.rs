//! Trigger type and trigger endpoints

use axum::{
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{ClusterPath, CreatedId, IdPath, created};
use crate::error::{ApiError, parse_id};
use crate::models::{trigger, trigger_type};
use crate::repositories::NewTrigger;
use crate::server::AppState;

/// Request payload for registering a trigger type
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTriggerTypeRequest {
    #[serde(rename = "type")]
    #[schema(example = "must-gather")]
    pub trigger_type: String,
    #[serde(default)]
    pub description: String,
}

/// Request payload for raising a trigger against a cluster
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTriggerRequest {
    #[serde(rename = "type")]
    #[schema(example = "must-gather")]
    pub trigger_type: String,
    #[schema(example = "tester")]
    pub user: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub parameters: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TriggerFilter {
    /// Only list triggers that are still active
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ClusterTriggerPath {
    pub name: String,
    pub id: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/trigger-types",
    responses(
        (status = 200, description = "Registered trigger types", body = [trigger_type::Model])
    ),
    tag = "triggers"
)]
pub async fn list_trigger_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<trigger_type::Model>>, ApiError> {
    Ok(Json(state.storage.trigger_types().list().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/trigger-types",
    request_body = CreateTriggerTypeRequest,
    responses(
        (status = 201, description = "Trigger type registered", body = CreatedId),
        (status = 409, description = "Type already registered", body = ApiError)
    ),
    tag = "triggers"
)]
pub async fn create_trigger_type(
    State(state): State<AppState>,
    payload: Result<Json<CreateTriggerTypeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedId>), ApiError> {
    let Json(request) = payload?;
    let id = state
        .storage
        .trigger_types()
        .create(&request.trigger_type, &request.description)
        .await?;
    Ok(created(CreatedId { id }))
}

#[utoipa::path(
    get,
    path = "/api/v1/triggers",
    responses(
        (status = 200, description = "Every trigger", body = [trigger::Model])
    ),
    tag = "triggers"
)]
pub async fn list_triggers(
    State(state): State<AppState>,
) -> Result<Json<Vec<trigger::Model>>, ApiError> {
    Ok(Json(state.storage.triggers().list().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/triggers/{id}",
    params(("id" = i32, Path, description = "Trigger id")),
    responses(
        (status = 200, description = "Trigger", body = trigger::Model),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 404, description = "No such trigger", body = ApiError)
    ),
    tag = "triggers"
)]
pub async fn get_trigger(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<Json<trigger::Model>, ApiError> {
    let id = path.parse()?;
    Ok(Json(state.storage.triggers().get_by_id(id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/triggers/{id}",
    params(("id" = i32, Path, description = "Trigger id")),
    responses(
        (status = 204, description = "Trigger deleted"),
        (status = 404, description = "No such trigger", body = ApiError)
    ),
    tag = "triggers"
)]
pub async fn delete_trigger(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<StatusCode, ApiError> {
    let id = path.parse()?;
    state.storage.triggers().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/triggers/{id}/activate",
    params(("id" = i32, Path, description = "Trigger id")),
    responses(
        (status = 204, description = "Trigger activated"),
        (status = 404, description = "No such trigger", body = ApiError)
    ),
    tag = "triggers"
)]
pub async fn activate_trigger(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<StatusCode, ApiError> {
    let id = path.parse()?;
    state.storage.triggers().change_state_by_id(id, true).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/triggers/{id}/deactivate",
    params(("id" = i32, Path, description = "Trigger id")),
    responses(
        (status = 204, description = "Trigger deactivated"),
        (status = 404, description = "No such trigger", body = ApiError)
    ),
    tag = "triggers"
)]
pub async fn deactivate_trigger(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<StatusCode, ApiError> {
    let id = path.parse()?;
    state
        .storage
        .triggers()
        .change_state_by_id(id, false)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/cluster/{name}/triggers",
    params(
        ("name" = String, Path, description = "Cluster name"),
        TriggerFilter
    ),
    responses(
        (status = 200, description = "Triggers of the cluster ordered by id", body = [trigger::Model]),
        (status = 404, description = "No such cluster", body = ApiError)
    ),
    tag = "triggers"
)]
pub async fn list_cluster_triggers(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    Query(filter): Query<TriggerFilter>,
) -> Result<Json<Vec<trigger::Model>>, ApiError> {
    let triggers = state.storage.triggers();
    let listed = if filter.active {
        triggers.list_active_for_cluster(&path.name).await?
    } else {
        triggers.list_for_cluster(&path.name).await?
    };
    Ok(Json(listed))
}

#[utoipa::path(
    post,
    path = "/api/v1/cluster/{name}/triggers",
    params(("name" = String, Path, description = "Cluster name")),
    request_body = CreateTriggerRequest,
    responses(
        (status = 201, description = "Trigger recorded", body = CreatedId),
        (status = 404, description = "No such cluster or trigger type", body = ApiError)
    ),
    tag = "triggers"
)]
pub async fn create_trigger(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    payload: Result<Json<CreateTriggerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedId>), ApiError> {
    let Json(request) = payload?;
    let new_trigger = NewTrigger {
        cluster: path.name,
        trigger_type: request.trigger_type,
        user: request.user,
        reason: request.reason,
        link: request.link,
        parameters: request.parameters,
    };
    let id = state.storage.triggers().new_trigger(&new_trigger).await?;
    Ok(created(CreatedId { id }))
}

/// Acknowledge a trigger on behalf of the cluster's agent
#[utoipa::path(
    put,
    path = "/api/v1/cluster/{name}/triggers/{id}/ack",
    params(
        ("name" = String, Path, description = "Cluster name"),
        ("id" = i32, Path, description = "Trigger id")
    ),
    responses(
        (status = 204, description = "Trigger acknowledged"),
        (status = 404, description = "Trigger does not belong to the cluster", body = ApiError)
    ),
    tag = "triggers"
)]
pub async fn ack_trigger(
    State(state): State<AppState>,
    Path(path): Path<ClusterTriggerPath>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&path.id)?;
    state.storage.triggers().ack(&path.name, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
