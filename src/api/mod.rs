// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{AuthenticatedUser, Role, Section},
    models::{
        Account, ChangePasswordRequest, CreateAccountRequest, CreateDocumentRequest,
        CreateProfileRequest, Document, DocumentFileUpload, LoginRequest, LoginResponse, Profile,
        ProfileImageUpload, SessionInfo, UpdateDocumentHashRequest, UpdateProfileRequest,
        UploadResponse, WriteOutcome,
    },
    state::AppState,
    storage::UploadKind,
};

pub mod accounts;
pub mod documents;
pub mod extract;
pub mod files;
pub mod health;
pub mod profiles;
pub mod session;

pub fn router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;

    let routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route(
            "/session",
            get(session::current_session).post(session::login),
        )
        .route("/authAll", get(accounts::list_accounts))
        .route(
            "/auth/{username}/{password}",
            post(accounts::verify_credentials),
        )
        .route("/addaccount", post(accounts::create_account))
        .route(
            "/changepsw",
            put(accounts::change_password).post(accounts::change_password),
        )
        .route("/profileAll", get(profiles::list_profiles))
        .route("/profile/{username}", get(profiles::get_profile))
        .route("/addprofile", post(profiles::create_profile))
        .route("/updateprofile", put(profiles::update_profile))
        .route("/documentAll", get(documents::list_documents))
        .route("/document/{documentId}", get(documents::get_document))
        .route("/adddocument", post(documents::create_document))
        .route(
            "/updatedocumenthash",
            put(documents::update_document_hash),
        )
        .route(
            "/upload/profile",
            post(files::upload_profile).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/upload/document",
            post(files::upload_document).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/file/profile/{fileName}", get(files::get_profile_file))
        .route("/file/document/{fileName}", get(files::get_document_file))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        session::login,
        session::current_session,
        accounts::list_accounts,
        accounts::verify_credentials,
        accounts::create_account,
        accounts::change_password,
        profiles::list_profiles,
        profiles::get_profile,
        profiles::create_profile,
        profiles::update_profile,
        documents::list_documents,
        documents::get_document,
        documents::create_document,
        documents::update_document_hash,
        files::upload_profile,
        files::upload_document,
        files::get_profile_file,
        files::get_document_file
    ),
    components(
        schemas(
            Account,
            AuthenticatedUser,
            ChangePasswordRequest,
            CreateAccountRequest,
            CreateDocumentRequest,
            CreateProfileRequest,
            Document,
            DocumentFileUpload,
            LoginRequest,
            LoginResponse,
            Profile,
            ProfileImageUpload,
            Role,
            Section,
            SessionInfo,
            UpdateDocumentHashRequest,
            UpdateProfileRequest,
            UploadKind,
            UploadResponse,
            WriteOutcome,
            health::HealthChecks,
            health::HealthResponse,
            health::ReadyResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Session", description = "Login and session introspection"),
        (name = "Accounts", description = "Accounts, credentials and roles"),
        (name = "Profiles", description = "Account display profiles"),
        (name = "Documents", description = "Documents and their fingerprints"),
        (name = "Files", description = "Profile image and document file storage")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{memory_state, seed_account};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const BOUNDARY: &str = "verityvault-test-boundary";

    fn bearer(state: &AppState, username: &str, role: Role) -> String {
        let issued = state.sessions.issue(username, role).unwrap();
        format!("Bearer {}", issued.token)
    }

    fn multipart_body(field: &str, file_name: &str, contents: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(path: &str, auth: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::AUTHORIZATION, auth)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(method: &str, path: &str, auth: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn public_reads_need_no_session() {
        let (state, _dir) = memory_state();
        let app = router(state);

        let response = app.oneshot(get_request("/documentAll")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let (state, _dir) = memory_state();
        let response = router(state)
            .oneshot(get_request("/health/live"))
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn add_account_is_admin_only() {
        let (state, _dir) = memory_state();
        let app = router(state.clone());
        let body = json!({"username": "newbie", "password": "secret", "role": "user"});

        let response = app
            .clone()
            .oneshot(json_request("POST", "/addaccount", None, body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let user = bearer(&state, "uma", Role::User);
        let response = app
            .clone()
            .oneshot(json_request("POST", "/addaccount", Some(&user), body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let admin = bearer(&state, "admin", Role::Admin);
        let response = app
            .oneshot(json_request("POST", "/addaccount", Some(&admin), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({"message": "Account created successfully", "rowsAffected": 1})
        );
    }

    #[tokio::test]
    async fn in_handler_forbidden_matches_extractor_forbidden() {
        let (state, _dir) = memory_state();
        let app = router(state.clone());
        let verifier = bearer(&state, "vera", Role::Verifier);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/adddocument",
                Some(&verifier),
                json!({"documentId": "doc-1", "name": "Diploma", "documentHash": "0xabc"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let in_handler = body_json(response).await;
        assert_eq!(in_handler["error_code"], "insufficient_permissions");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/authAll")
                    .header(header::AUTHORIZATION, &verifier)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await, in_handler);
    }

    #[tokio::test]
    async fn wrong_login_carries_error_code() {
        let (state, _dir) = memory_state();
        let response = router(state)
            .oneshot(json_request(
                "POST",
                "/session",
                None,
                json!({"username": "nobody", "password": "nothing"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error_code"], "invalid_credentials");
    }

    #[tokio::test]
    async fn malformed_json_bodies_get_json_errors() {
        let (state, _dir) = memory_state();
        let app = router(state.clone());
        let issuer = bearer(&state, "ivy", Role::Issuer);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/adddocument",
                Some(&issuer),
                json!({"name": "Diploma", "documentHash": "0xabc"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
        assert!(body.get("error_code").is_none());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/session")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/session")
                    .body(Body::from(r#"{"username":"a","password":"b"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn forged_token_is_rejected() {
        let (state, _dir) = memory_state();
        let forged = crate::auth::SessionKeys::new(b"some-other-secret-that-is-long-enough", 3600)
            .issue("mallory", Role::Admin)
            .unwrap();

        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/authAll")
                    .header(header::AUTHORIZATION, format!("Bearer {}", forged.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_then_inspect_session() {
        let (state, _dir) = memory_state();
        seed_account(&state, "vera", "verify-me", Role::Verifier).await;
        let app = router(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/session",
                None,
                json!({"username": "vera", "password": "verify-me"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let login = body_json(response).await;
        let token = login["token"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/session")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let session = body_json(response).await;
        assert_eq!(session["username"], "vera");
        assert_eq!(session["role"], "verifier");
        assert_eq!(session["home"], "/verifier");
    }

    #[tokio::test]
    async fn credential_check_over_path() {
        let (state, _dir) = memory_state();
        seed_account(&state, "vera", "verify-me", Role::Verifier).await;
        let app = router(state);

        let response = app
            .clone()
            .oneshot(json_request("POST", "/auth/vera/verify-me", None, json!({})))
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            json!([{"username": "vera", "role": "verifier"}])
        );

        let response = app
            .oneshot(json_request("POST", "/auth/vera/wrong", None, json!({})))
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn change_password_accepts_post_and_put() {
        let (state, _dir) = memory_state();
        seed_account(&state, "uma", "first-pass", Role::User).await;
        let app = router(state.clone());
        let auth = bearer(&state, "uma", Role::User);

        for (method, password) in [("PUT", "second-pass"), ("POST", "third-pass")] {
            let response = app
                .clone()
                .oneshot(json_request(
                    method,
                    "/changepsw",
                    Some(&auth),
                    json!({"username": "uma", "password": password}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{method}");
        }

        let matched = accounts::check_credentials(&state.store, "uma", "third-pass")
            .await
            .unwrap();
        assert!(matched.is_some());
    }

    #[tokio::test]
    async fn uploaded_document_downloads_byte_for_byte() {
        let (state, _dir) = memory_state();
        state.uploads.initialize().await.unwrap();
        let app = router(state.clone());
        let issuer = bearer(&state, "ivy", Role::Issuer);
        let contents: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

        let response = app
            .clone()
            .oneshot(upload_request(
                "/upload/document",
                &issuer,
                multipart_body("file", "diploma.pdf", &contents),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let uploaded = body_json(response).await;
        assert_eq!(uploaded["message"], "Document uploaded successfully");
        assert_eq!(uploaded["url"], "/file/document/diploma.pdf");
        assert_eq!(uploaded["size"], 4096);

        let response = app
            .oneshot(get_request("/file/document/diploma.pdf"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert_eq!(body_bytes(response).await, contents);
    }

    #[tokio::test]
    async fn reupload_replaces_profile_image() {
        let (state, _dir) = memory_state();
        let app = router(state.clone());
        let user = bearer(&state, "uma", Role::User);

        for contents in [&b"first image"[..], &b"second image"[..]] {
            let response = app
                .clone()
                .oneshot(upload_request(
                    "/upload/profile",
                    &user,
                    multipart_body("image", "avatar.png", contents),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(get_request("/file/profile/avatar.png"))
            .await
            .unwrap();
        assert_eq!(body_bytes(response).await, b"second image");
    }

    #[tokio::test]
    async fn upload_without_expected_field_is_bad_request() {
        let (state, _dir) = memory_state();
        let user = bearer(&state, "uma", Role::User);

        let response = router(state)
            .oneshot(upload_request(
                "/upload/profile",
                &user,
                multipart_body("file", "avatar.png", b"wrong field"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Please select an image to upload"})
        );
    }

    #[tokio::test]
    async fn document_upload_requires_issuer() {
        let (state, _dir) = memory_state();
        let verifier = bearer(&state, "vera", Role::Verifier);

        let response = router(state.clone())
            .oneshot(upload_request(
                "/upload/document",
                &verifier,
                multipart_body("file", "fake.pdf", b"nope"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!state.uploads.paths().file(UploadKind::Document, "fake.pdf").exists());
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let (state, _dir) = memory_state();
        let state = state.with_max_upload_bytes(1024);
        let issuer = bearer(&state, "ivy", Role::Issuer);

        let response = router(state)
            .oneshot(upload_request(
                "/upload/document",
                &issuer,
                multipart_body("file", "big.bin", &vec![7u8; 8 * 1024]),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn upload_with_traversal_name_is_rejected() {
        let (state, dir) = memory_state();
        let user = bearer(&state, "uma", Role::User);

        let response = router(state)
            .oneshot(upload_request(
                "/upload/profile",
                &user,
                multipart_body("image", "../escaped.png", b"payload"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!dir.path().join("escaped.png").exists());
    }

    #[tokio::test]
    async fn file_names_cannot_escape_upload_dir() {
        let (state, dir) = memory_state();
        std::fs::write(dir.path().join("secret.txt"), b"top secret").unwrap();
        let app = router(state);

        let response = app
            .clone()
            .oneshot(get_request("/file/document/..%2Fsecret.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(get_request("/file/document/missing.pdf"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (state, _dir) = memory_state();
        let response = router(state)
            .oneshot(get_request("/api-doc/openapi.json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let doc = body_json(response).await;
        assert!(doc["paths"]["/documentAll"].is_object());
        assert!(doc["components"]["securitySchemes"]["bearer"].is_object());
    }
}
