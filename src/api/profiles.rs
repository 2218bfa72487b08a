// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::extract::ApiJson;
use crate::{
    auth::{AdminOnly, Auth},
    error::ApiError,
    models::{CreateProfileRequest, Profile, UpdateProfileRequest, WriteOutcome},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/profileAll",
    tag = "Profiles",
    responses((status = 200, body = [Profile]))
)]
pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<Profile>>, ApiError> {
    let profiles = state.store.list_profiles().await?;
    Ok(Json(profiles.into_iter().map(Profile::from).collect()))
}

#[utoipa::path(
    get,
    path = "/profile/{username}",
    params(("username" = String, Path, description = "Account username")),
    tag = "Profiles",
    responses(
        (status = 200, body = Profile),
        (status = 404, description = "No profile for this username"),
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .store
        .get_profile(&username)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Profile {username} not found")))?;
    Ok(Json(profile.into()))
}

/// Create the profile for an existing account.
///
/// The role shown on a profile always comes from the account; a `role` in the
/// request is only checked against it.
#[utoipa::path(
    post,
    path = "/addprofile",
    request_body = CreateProfileRequest,
    tag = "Profiles",
    security(("bearer" = [])),
    responses(
        (status = 201, body = WriteOutcome),
        (status = 404, description = "No account for this username"),
        (status = 409, description = "Profile already exists"),
        (status = 422, description = "Invalid fields or role mismatch"),
    )
)]
pub async fn create_profile(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateProfileRequest>,
) -> Result<(StatusCode, Json<WriteOutcome>), ApiError> {
    request.validate()?;

    let account = state
        .store
        .find_account(&request.username)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Account {} not found", request.username)))?;
    if let Some(role) = request.role {
        if role != account.role {
            return Err(ApiError::unprocessable(format!(
                "role {role} does not match account role {}",
                account.role
            )));
        }
    }

    let fields = request.into_fields();
    state.store.create_profile(&fields).await?;

    info!(username = %fields.username, created_by = %admin.username, "profile created");
    Ok((
        StatusCode::CREATED,
        Json(WriteOutcome::new("Profile created successfully", 1)),
    ))
}

/// Replace a profile's editable fields. Owners and admins only.
#[utoipa::path(
    put,
    path = "/updateprofile",
    request_body = UpdateProfileRequest,
    tag = "Profiles",
    security(("bearer" = [])),
    responses(
        (status = 200, body = WriteOutcome),
        (status = 403, description = "Caller is neither the owner nor an admin"),
    )
)]
pub async fn update_profile(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> Result<Json<WriteOutcome>, ApiError> {
    user.require_self_or_admin(&request.username)?;
    request.validate()?;

    let fields = request.into_fields();
    let rows_affected = state.store.update_profile(&fields).await?;

    info!(username = %fields.username, rows_affected, "profile updated");
    Ok(Json(WriteOutcome::new(
        "Profile updated successfully",
        rows_affected,
    )))
}
