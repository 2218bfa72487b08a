// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session endpoints.
//!
//! `POST /session` exchanges credentials for a signed bearer token;
//! `GET /session` describes the session behind a token so the frontend can
//! decide which sections to render.

use axum::{extract::State, Json};
use tracing::{info, warn};

use super::accounts::check_credentials;
use super::extract::ApiJson;
use crate::{
    auth::{Auth, AuthError},
    error::ApiError,
    models::{LoginRequest, LoginResponse, SessionInfo},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/session",
    request_body = LoginRequest,
    tag = "Session",
    responses(
        (status = 200, body = LoginResponse),
        (status = 401, description = "Unknown username or wrong password"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Some(account) = check_credentials(&state.store, &request.username, &request.password).await?
    else {
        warn!(username = %request.username, "login rejected");
        return Err(AuthError::InvalidCredentials.into());
    };

    let issued = state.sessions.issue(&account.username, account.role)?;
    info!(
        username = %account.username,
        role = %account.role,
        session_id = %issued.user.session_id,
        "session opened"
    );

    Ok(Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
        session: SessionInfo::from(&issued.user),
    }))
}

#[utoipa::path(
    get,
    path = "/session",
    tag = "Session",
    security(("bearer" = [])),
    responses(
        (status = 200, body = SessionInfo),
        (status = 401, description = "Missing, invalid or expired token"),
    )
)]
pub async fn current_session(Auth(user): Auth) -> Json<SessionInfo> {
    Json(SessionInfo::from(&user))
}
