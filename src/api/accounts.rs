// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account and credential endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::extract::ApiJson;
use crate::{
    auth::{hash_password_blocking, verify_password_blocking, AdminOnly, Auth},
    error::ApiError,
    models::{Account, ChangePasswordRequest, CreateAccountRequest, WriteOutcome},
    state::AppState,
    storage::{AccountRecord, Store},
};

/// Look up `username` and check `password` against its stored hash.
pub(crate) async fn check_credentials(
    store: &Store,
    username: &str,
    password: &str,
) -> Result<Option<AccountRecord>, ApiError> {
    let Some(account) = store.find_account(username).await? else {
        return Ok(None);
    };

    let matches =
        verify_password_blocking(password.to_string(), account.password_hash.clone()).await?;
    Ok(matches.then_some(account))
}

#[utoipa::path(
    get,
    path = "/authAll",
    tag = "Accounts",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [Account]),
        (status = 401, description = "Missing or invalid session"),
        (status = 403, description = "Caller is not an admin"),
    )
)]
pub async fn list_accounts(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<Account>>, ApiError> {
    let accounts = state.store.list_accounts().await?;
    Ok(Json(accounts.into_iter().map(Account::from).collect()))
}

/// Verify a username/password pair.
///
/// Returns a one-element array when the pair matches an account and an
/// empty array otherwise.
#[utoipa::path(
    post,
    path = "/auth/{username}/{password}",
    params(
        ("username" = String, Path, description = "Account username"),
        ("password" = String, Path, description = "Candidate password")
    ),
    tag = "Accounts",
    responses((status = 200, body = [Account]))
)]
pub async fn verify_credentials(
    State(state): State<AppState>,
    Path((username, password)): Path<(String, String)>,
) -> Result<Json<Vec<Account>>, ApiError> {
    let matched = check_credentials(&state.store, &username, &password).await?;
    info!(username = %username, matched = matched.is_some(), "credential verification");
    Ok(Json(matched.into_iter().map(Account::from).collect()))
}

#[utoipa::path(
    post,
    path = "/addaccount",
    request_body = CreateAccountRequest,
    tag = "Accounts",
    security(("bearer" = [])),
    responses(
        (status = 201, body = WriteOutcome),
        (status = 409, description = "Username already taken"),
        (status = 422, description = "Invalid username, password or role"),
    )
)]
pub async fn create_account(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<WriteOutcome>), ApiError> {
    request.validate()?;

    let account = AccountRecord {
        username: request.username,
        password_hash: hash_password_blocking(request.password).await?,
        role: request.role,
    };
    state.store.create_account(&account).await?;

    info!(
        username = %account.username,
        role = %account.role,
        created_by = %admin.username,
        "account created"
    );
    Ok((
        StatusCode::CREATED,
        Json(WriteOutcome::new("Account created successfully", 1)),
    ))
}

/// Set a new password. Callers may change their own password; admins may
/// change anyone's.
#[utoipa::path(
    put,
    path = "/changepsw",
    request_body = ChangePasswordRequest,
    tag = "Accounts",
    security(("bearer" = [])),
    responses(
        (status = 200, body = WriteOutcome),
        (status = 403, description = "Caller is neither the account nor an admin"),
    )
)]
pub async fn change_password(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> Result<Json<WriteOutcome>, ApiError> {
    user.require_self_or_admin(&request.username)?;
    request.validate()?;

    let password_hash = hash_password_blocking(request.password).await?;
    let rows_affected = state
        .store
        .update_password(&request.username, &password_hash)
        .await?;

    info!(username = %request.username, rows_affected, "password updated");
    Ok(Json(WriteOutcome::new(
        "Password updated successfully",
        rows_affected,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::test_support::{memory_state, seed_account, session_user};

    fn new_account(username: &str, password: &str, role: Role) -> CreateAccountRequest {
        CreateAccountRequest {
            username: username.to_string(),
            password: password.to_string(),
            role,
        }
    }

    fn admin() -> AdminOnly {
        AdminOnly(session_user("admin", Role::Admin))
    }

    #[tokio::test]
    async fn created_account_is_listed_exactly_once() {
        let (state, _dir) = memory_state();

        let (status, Json(outcome)) = create_account(
            admin(),
            State(state.clone()),
            ApiJson(new_account("ivan", "issuer-pass", Role::Issuer)),
        )
        .await
        .expect("account creation succeeds");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(outcome.message, "Account created successfully");

        let Json(accounts) = list_accounts(admin(), State(state.clone())).await.unwrap();
        let matching: Vec<_> = accounts.iter().filter(|a| a.username == "ivan").collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].role, Role::Issuer);
    }

    #[tokio::test]
    async fn duplicate_account_conflicts() {
        let (state, _dir) = memory_state();
        seed_account(&state, "ivan", "issuer-pass", Role::Issuer).await;

        let err = create_account(
            admin(),
            State(state.clone()),
            ApiJson(new_account("ivan", "other-pass", Role::User)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn invalid_account_is_rejected() {
        let (state, _dir) = memory_state();

        let err = create_account(
            admin(),
            State(state.clone()),
            ApiJson(new_account("bad name", "long-enough", Role::User)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(state.store.list_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn verify_credentials_returns_one_row_or_none() {
        let (state, _dir) = memory_state();
        seed_account(&state, "vera", "verify-me", Role::Verifier).await;

        let Json(rows) = verify_credentials(
            State(state.clone()),
            Path(("vera".to_string(), "verify-me".to_string())),
        )
        .await
        .unwrap();
        assert_eq!(
            rows,
            vec![Account {
                username: "vera".into(),
                role: Role::Verifier
            }]
        );

        for (username, password) in [("vera", "wrong"), ("nobody", "verify-me"), ("vera", "")] {
            let Json(rows) = verify_credentials(
                State(state.clone()),
                Path((username.to_string(), password.to_string())),
            )
            .await
            .unwrap();
            assert!(rows.is_empty(), "{username}/{password} should not match");
        }
    }

    #[tokio::test]
    async fn injection_shaped_input_matches_nothing() {
        let (state, _dir) = memory_state();
        seed_account(&state, "vera", "verify-me", Role::Verifier).await;

        let Json(rows) = verify_credentials(
            State(state.clone()),
            Path(("vera' --".to_string(), "' OR '1'='1".to_string())),
        )
        .await
        .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn change_password_swaps_credentials() {
        let (state, _dir) = memory_state();
        seed_account(&state, "uma", "old-pass", Role::User).await;

        let Json(outcome) = change_password(
            Auth(session_user("uma", Role::User)),
            State(state.clone()),
            ApiJson(ChangePasswordRequest {
                username: "uma".into(),
                password: "new-pass".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(outcome.rows_affected, 1);

        let new = check_credentials(&state.store, "uma", "new-pass").await.unwrap();
        assert!(new.is_some());
        let old = check_credentials(&state.store, "uma", "old-pass").await.unwrap();
        assert!(old.is_none());
    }

    #[tokio::test]
    async fn change_password_for_another_account_is_forbidden() {
        let (state, _dir) = memory_state();
        seed_account(&state, "uma", "old-pass", Role::User).await;

        let err = change_password(
            Auth(session_user("mallory", Role::Verifier)),
            State(state.clone()),
            ApiJson(ChangePasswordRequest {
                username: "uma".into(),
                password: "owned-now".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_change_password_for_unknown_account_affects_nothing() {
        let (state, _dir) = memory_state();

        let Json(outcome) = change_password(
            Auth(session_user("admin", Role::Admin)),
            State(state.clone()),
            ApiJson(ChangePasswordRequest {
                username: "ghost".into(),
                password: "whatever".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(outcome.rows_affected, 0);
    }
}
