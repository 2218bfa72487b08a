// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File upload and download endpoints.
//!
//! Uploads are `multipart/form-data` with the file in the `image` field
//! (profile images) or the `file` field (documents). Other fields are
//! ignored. A file keeps its client-supplied name, so uploading the same
//! name again replaces the stored bytes.

use axum::{
    extract::{Multipart, Path, State},
    http::header::CONTENT_TYPE,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{
    auth::{Auth, Section},
    error::ApiError,
    models::{DocumentFileUpload, ProfileImageUpload, UploadResponse},
    state::AppState,
    storage::{uploads::content_type_for, UploadKind},
};

/// Store the first file found in `kind`'s multipart field.
async fn receive_upload(
    state: &AppState,
    kind: UploadKind,
    mut multipart: Multipart,
) -> Result<Option<UploadResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(kind.field_name()) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await?;
        let stored = state.uploads.save(kind, &file_name, &bytes).await?;

        info!(
            kind = kind.dir_name(),
            file_name = %stored.file_name,
            size = stored.size,
            "file stored"
        );
        return Ok(Some(UploadResponse {
            message: String::new(),
            kind,
            url: format!("/file/{}/{}", kind.dir_name(), stored.file_name),
            file_name: stored.file_name,
            size: stored.size,
        }));
    }
    Ok(None)
}

#[utoipa::path(
    post,
    path = "/upload/profile",
    request_body(content = ProfileImageUpload, content_type = "multipart/form-data"),
    tag = "Files",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UploadResponse),
        (status = 400, description = "No image field or invalid file name"),
        (status = 413, description = "File exceeds the upload limit"),
    )
)]
pub async fn upload_profile(
    Auth(_user): Auth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut response = receive_upload(&state, UploadKind::Profile, multipart)
        .await?
        .ok_or_else(|| ApiError::bad_request("Please select an image to upload"))?;
    response.message = "Profile image uploaded successfully".to_string();
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/upload/document",
    request_body(content = DocumentFileUpload, content_type = "multipart/form-data"),
    tag = "Files",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UploadResponse),
        (status = 400, description = "No file field or invalid file name"),
        (status = 403, description = "Caller is not an issuer"),
        (status = 413, description = "File exceeds the upload limit"),
    )
)]
pub async fn upload_document(
    Auth(user): Auth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    user.require_section(Section::Issuer)?;

    let mut response = receive_upload(&state, UploadKind::Document, multipart)
        .await?
        .ok_or_else(|| ApiError::bad_request("Please select a document to upload"))?;
    response.message = "Document uploaded successfully".to_string();
    Ok(Json(response))
}

async fn serve_file(
    state: &AppState,
    kind: UploadKind,
    file_name: &str,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.uploads.read(kind, file_name).await?;
    Ok(([(CONTENT_TYPE, content_type_for(file_name))], bytes))
}

#[utoipa::path(
    get,
    path = "/file/profile/{fileName}",
    params(("fileName" = String, Path, description = "Stored file name")),
    tag = "Files",
    responses(
        (status = 200, description = "File contents"),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "No such file"),
    )
)]
pub async fn get_profile_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    serve_file(&state, UploadKind::Profile, &file_name).await
}

#[utoipa::path(
    get,
    path = "/file/document/{fileName}",
    params(("fileName" = String, Path, description = "Stored file name")),
    tag = "Files",
    responses(
        (status = 200, description = "File contents"),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "No such file"),
    )
)]
pub async fn get_document_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    serve_file(&state, UploadKind::Document, &file_name).await
}
