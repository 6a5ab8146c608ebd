//! Configuration profile endpoints

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{IdPath, created};
use crate::error::ApiError;
use crate::models::configuration_profile;
use crate::server::AppState;

/// Request payload for creating or changing a profile
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileRequest {
    #[schema(example = "tester")]
    pub user: String,
    #[serde(default)]
    #[schema(example = "cfg1")]
    pub description: String,
    /// Opaque configuration text, stored exactly as sent
    #[schema(example = r#"{"no_op":"X","watch":["a","b","c"]}"#)]
    pub configuration: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/profiles",
    responses(
        (status = 200, description = "All profiles ordered by id", body = [configuration_profile::Model])
    ),
    tag = "profiles"
)]
pub async fn list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<configuration_profile::Model>>, ApiError> {
    Ok(Json(state.storage.profiles().list().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/profiles",
    request_body = ProfileRequest,
    responses(
        (status = 201, description = "Profile stored; returns every profile", body = [configuration_profile::Model]),
        (status = 400, description = "Validation failed", body = ApiError)
    ),
    tag = "profiles"
)]
pub async fn create_profile(
    State(state): State<AppState>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<configuration_profile::Model>>), ApiError> {
    let Json(request) = payload?;
    let profiles = state
        .storage
        .profiles()
        .create(&request.user, &request.description, &request.configuration)
        .await?;
    Ok(created(profiles))
}

#[utoipa::path(
    get,
    path = "/api/v1/profiles/{id}",
    params(("id" = i32, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Profile", body = configuration_profile::Model),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 404, description = "No such profile", body = ApiError)
    ),
    tag = "profiles"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<Json<configuration_profile::Model>, ApiError> {
    let id = path.parse()?;
    Ok(Json(state.storage.profiles().get_by_id(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/profiles/{id}",
    params(("id" = i32, Path, description = "Profile id")),
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Profile changed; returns every profile", body = [configuration_profile::Model]),
        (status = 404, description = "No such profile", body = ApiError)
    ),
    tag = "profiles"
)]
pub async fn change_profile(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Json<Vec<configuration_profile::Model>>, ApiError> {
    let id = path.parse()?;
    let Json(request) = payload?;
    let profiles = state
        .storage
        .profiles()
        .change(
            id,
            &request.user,
            &request.description,
            &request.configuration,
        )
        .await?;
    Ok(Json(profiles))
}

#[utoipa::path(
    delete,
    path = "/api/v1/profiles/{id}",
    params(("id" = i32, Path, description = "Profile id")),
    responses(
        (status = 204, description = "Profile and its assignments deleted"),
        (status = 404, description = "No such profile", body = ApiError)
    ),
    tag = "profiles"
)]
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<StatusCode, ApiError> {
    let id = path.parse()?;
    state.storage.profiles().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
