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
    auth::{Auth, Section},
    error::ApiError,
    models::{CreateDocumentRequest, Document, UpdateDocumentHashRequest, WriteOutcome},
    state::AppState,
    storage::DocumentRecord,
};

#[utoipa::path(
    get,
    path = "/documentAll",
    tag = "Documents",
    responses((status = 200, body = [Document]))
)]
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<Vec<Document>>, ApiError> {
    let documents = state.store.list_documents().await?;
    Ok(Json(documents.into_iter().map(Document::from).collect()))
}

#[utoipa::path(
    get,
    path = "/document/{documentId}",
    params(("documentId" = String, Path, description = "Document identifier")),
    tag = "Documents",
    responses(
        (status = 200, body = Document),
        (status = 404, description = "Unknown document"),
    )
)]
pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let document = state
        .store
        .get_document(&document_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Document {document_id} not found")))?;
    Ok(Json(document.into()))
}

/// Register a document and its fingerprint. Issuers and admins only.
#[utoipa::path(
    post,
    path = "/adddocument",
    request_body = CreateDocumentRequest,
    tag = "Documents",
    security(("bearer" = [])),
    responses(
        (status = 201, body = WriteOutcome),
        (status = 403, description = "Caller is not an issuer"),
        (status = 409, description = "Document id already registered"),
    )
)]
pub async fn create_document(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<WriteOutcome>), ApiError> {
    user.require_section(Section::Issuer)?;
    request.validate()?;

    let record = DocumentRecord::from(request);
    state.store.create_document(&record).await?;

    info!(document_id = %record.document_id, issuer = %user.username, "document added");
    Ok((
        StatusCode::CREATED,
        Json(WriteOutcome::new("Document added successfully", 1)),
    ))
}

#[utoipa::path(
    put,
    path = "/updatedocumenthash",
    request_body = UpdateDocumentHashRequest,
    tag = "Documents",
    security(("bearer" = [])),
    responses((status = 200, body = WriteOutcome))
)]
pub async fn update_document_hash(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateDocumentHashRequest>,
) -> Result<Json<WriteOutcome>, ApiError> {
    request.validate()?;

    let rows_affected = state
        .store
        .update_document_hash(&request.document_id, &request.document_hash)
        .await?;

    info!(
        document_id = %request.document_id,
        updated_by = %user.username,
        rows_affected,
        "document hash updated"
    );
    Ok(Json(WriteOutcome::new(
        "Document hash updated successfully",
        rows_affected,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::test_support::{memory_state, session_user};

    fn issuer() -> Auth {
        Auth(session_user("ivy", Role::Issuer))
    }

    fn diploma() -> CreateDocumentRequest {
        CreateDocumentRequest {
            document_id: "doc-1".into(),
            name: "Diploma".into(),
            document_hash: "0xabc123".into(),
        }
    }

    #[tokio::test]
    async fn issuer_adds_document() {
        let (state, _dir) = memory_state();

        let (status, Json(outcome)) = create_document(issuer(), State(state.clone()), ApiJson(diploma()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(outcome.message, "Document added successfully");

        let Json(document) = get_document(State(state.clone()), Path("doc-1".into()))
            .await
            .unwrap();
        assert_eq!(
            document,
            Document {
                document_id: "doc-1".into(),
                name: "Diploma".into(),
                document_hash: "0xabc123".into(),
            }
        );
    }

    #[tokio::test]
    async fn admin_may_add_documents() {
        let (state, _dir) = memory_state();
        let result = create_document(
            Auth(session_user("admin", Role::Admin)),
            State(state),
            ApiJson(diploma()),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn verifier_cannot_add_documents() {
        let (state, _dir) = memory_state();

        let err = create_document(
            Auth(session_user("vera", Role::Verifier)),
            State(state.clone()),
            ApiJson(diploma()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert!(state.store.list_documents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_document_id_conflicts() {
        let (state, _dir) = memory_state();
        let (status, _) = create_document(issuer(), State(state.clone()), ApiJson(diploma()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let err = create_document(issuer(), State(state.clone()), ApiJson(diploma()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn hash_update_replaces_fingerprint() {
        let (state, _dir) = memory_state();
        let (status, _) = create_document(issuer(), State(state.clone()), ApiJson(diploma()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(outcome) = update_document_hash(
            Auth(session_user("uma", Role::User)),
            State(state.clone()),
            ApiJson(UpdateDocumentHashRequest {
                document_id: "doc-1".into(),
                document_hash: "0xdef456".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(outcome.rows_affected, 1);

        let Json(documents) = list_documents(State(state.clone())).await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].document_hash, "0xdef456");
        assert_eq!(documents[0].name, "Diploma");
    }

    #[tokio::test]
    async fn hash_update_for_unknown_document_affects_no_rows() {
        let (state, _dir) = memory_state();

        let Json(outcome) = update_document_hash(
            issuer(),
            State(state),
            ApiJson(UpdateDocumentHashRequest {
                document_id: "missing".into(),
                document_hash: "0x00".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(outcome.rows_affected, 0);
    }

    #[tokio::test]
    async fn unknown_document_is_not_found() {
        let (state, _dir) = memory_state();
        let err = get_document(State(state), Path("nope".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
