// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. JSON field names follow
//! the frontend (`documentId`, `documentHash`, `rowsAffected`); every type
//! derives `ToSchema` for the OpenAPI document.
//!
//! ## Model Categories
//!
//! - **Accounts**: credentials and roles (password hashes never leave the server)
//! - **Profiles**: display metadata for an account
//! - **Documents**: tracked items with an opaque content fingerprint
//! - **Sessions**: signed session tokens and the sections they unlock
//! - **Uploads**: results of storing a file

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{AuthenticatedUser, Role, Section};
use crate::error::ApiError;
use crate::storage::{AccountRecord, DocumentRecord, ProfileFields, ProfileRecord, UploadKind};

const MAX_USERNAME_CHARS: usize = 64;
const MIN_PASSWORD_CHARS: usize = 4;
const MAX_DOCUMENT_ID_CHARS: usize = 128;
const MAX_DOCUMENT_HASH_CHARS: usize = 512;

// =============================================================================
// Write Outcome
// =============================================================================

/// Result of a write: the success message and how many rows changed.
///
/// Updates addressing a key that does not exist succeed with
/// `rowsAffected == 0`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    pub message: String,
    pub rows_affected: u64,
}

impl WriteOutcome {
    pub fn new(message: impl Into<String>, rows_affected: u64) -> Self {
        Self {
            message: message.into(),
            rows_affected,
        }
    }
}

// =============================================================================
// Account Models
// =============================================================================

/// An account as exposed by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub role: Role,
}

impl From<AccountRecord> for Account {
    fn from(record: AccountRecord) -> Self {
        Self {
            username: record.username,
            role: record.role,
        }
    }
}

/// Request to create an account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl CreateAccountRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_username(&self.username)?;
        validate_password(&self.password)
    }
}

/// Request to set a new password for an account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub username: String,
    /// The new password.
    pub password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_username(&self.username)?;
        validate_password(&self.password)
    }
}

// =============================================================================
// Profile Models
// =============================================================================

/// Display metadata for an account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    /// File name of the profile image under `/file/profile/`.
    pub image: Option<String>,
    /// Role of the owning account.
    pub role: Role,
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        Self {
            username: record.username,
            name: record.name,
            description: record.description,
            website: record.website,
            location: record.location,
            image: record.image,
            role: record.role,
        }
    }
}

/// Request to create a profile for an existing account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateProfileRequest {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Optional; when present it must match the account's role.
    #[serde(default)]
    pub role: Option<Role>,
}

impl CreateProfileRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_username(&self.username)?;
        validate_website(self.website.as_deref())
    }

    pub fn into_fields(self) -> ProfileFields {
        ProfileFields {
            username: self.username,
            name: self.name,
            description: self.description,
            website: self.website,
            location: self.location,
            image: self.image,
        }
    }
}

/// Request to replace a profile's editable fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_username(&self.username)?;
        validate_website(self.website.as_deref())
    }

    pub fn into_fields(self) -> ProfileFields {
        ProfileFields {
            username: self.username,
            name: self.name,
            description: self.description,
            website: self.website,
            location: self.location,
            image: self.image,
        }
    }
}

// =============================================================================
// Document Models
// =============================================================================

/// A tracked document and its content fingerprint.
///
/// The hash is stored as supplied; the server never computes or checks it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_id: String,
    pub name: String,
    pub document_hash: String,
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        Self {
            document_id: record.document_id,
            name: record.name,
            document_hash: record.document_hash,
        }
    }
}

/// Request to register a document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub document_id: String,
    pub name: String,
    pub document_hash: String,
}

impl CreateDocumentRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_document_id(&self.document_id)?;
        if self.name.trim().is_empty() {
            return Err(ApiError::unprocessable("name must not be empty"));
        }
        validate_document_hash(&self.document_hash)
    }
}

impl From<CreateDocumentRequest> for DocumentRecord {
    fn from(request: CreateDocumentRequest) -> Self {
        Self {
            document_id: request.document_id,
            name: request.name,
            document_hash: request.document_hash,
        }
    }
}

/// Request to replace a document's fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentHashRequest {
    pub document_id: String,
    pub document_hash: String,
}

impl UpdateDocumentHashRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_document_id(&self.document_id)?;
        validate_document_hash(&self.document_hash)
    }
}

// =============================================================================
// Session Models
// =============================================================================

/// Credentials posted to open a session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// A session as seen by the frontend route guard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub username: String,
    pub role: Role,
    /// Route the frontend should land on after login.
    pub home: String,
    /// Sections the role renders.
    pub sections: Vec<Section>,
    /// Unix timestamp after which the token is rejected.
    pub expires_at: i64,
}

impl From<&AuthenticatedUser> for SessionInfo {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
            home: user.role.home().route().to_string(),
            sections: user.role.sections(),
            expires_at: user.expires_at,
        }
    }
}

/// Response to a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for guarded endpoints.
    pub token: String,
    pub token_type: String,
    pub session: SessionInfo,
}

// =============================================================================
// Upload Models
// =============================================================================

/// Result of storing an uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub kind: UploadKind,
    pub file_name: String,
    pub size: u64,
    /// Path the file can be fetched from.
    pub url: String,
}

/// Multipart form for `POST /upload/profile`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ProfileImageUpload {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Multipart form for `POST /upload/document`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct DocumentFileUpload {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

// =============================================================================
// Validation
// =============================================================================

fn validate_username(username: &str) -> Result<(), ApiError> {
    let chars = username.chars().count();
    if chars == 0 || chars > MAX_USERNAME_CHARS {
        return Err(ApiError::unprocessable(format!(
            "username must be 1-{MAX_USERNAME_CHARS} characters"
        )));
    }
    if username.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ApiError::unprocessable(
            "username must not contain whitespace or control characters",
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::unprocessable(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_document_id(document_id: &str) -> Result<(), ApiError> {
    let chars = document_id.chars().count();
    if document_id.trim().is_empty() || chars > MAX_DOCUMENT_ID_CHARS {
        return Err(ApiError::unprocessable(format!(
            "documentId must be 1-{MAX_DOCUMENT_ID_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_document_hash(document_hash: &str) -> Result<(), ApiError> {
    let chars = document_hash.chars().count();
    if document_hash.trim().is_empty() || chars > MAX_DOCUMENT_HASH_CHARS {
        return Err(ApiError::unprocessable(format!(
            "documentHash must be 1-{MAX_DOCUMENT_HASH_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_website(website: Option<&str>) -> Result<(), ApiError> {
    let Some(website) = website.filter(|w| !w.is_empty()) else {
        return Ok(());
    };
    match url::Url::parse(website) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ApiError::unprocessable(
            "website must be an absolute http or https URL",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_uses_frontend_field_names() {
        let doc = Document {
            document_id: "doc-1".into(),
            name: "Diploma".into(),
            document_hash: "0xabc".into(),
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["documentId"], "doc-1");
        assert_eq!(json["documentHash"], "0xabc");
    }

    #[test]
    fn write_outcome_serializes_rows_affected() {
        let json = serde_json::to_string(&WriteOutcome::new("ok", 0)).unwrap();
        assert_eq!(json, r#"{"message":"ok","rowsAffected":0}"#);
    }

    #[test]
    fn account_never_carries_password() {
        let account: Account = AccountRecord {
            username: "alice".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::User,
        }
        .into();
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(json, r#"{"username":"alice","role":"user"}"#);
    }

    #[test]
    fn username_validation() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("al ice").is_err());
        assert!(validate_username(&"a".repeat(65)).is_err());
    }

    #[test]
    fn password_validation() {
        assert!(validate_password("admin").is_ok());
        assert!(validate_password("abc").is_err());
    }

    #[test]
    fn website_validation() {
        assert!(validate_website(None).is_ok());
        assert!(validate_website(Some("")).is_ok());
        assert!(validate_website(Some("https://example.org")).is_ok());
        assert!(validate_website(Some("example.org")).is_err());
        assert!(validate_website(Some("javascript:alert(1)")).is_err());
    }

    #[test]
    fn document_request_validation() {
        let mut request = CreateDocumentRequest {
            document_id: "doc-1".into(),
            name: "Diploma".into(),
            document_hash: "0xabc".into(),
        };
        assert!(request.validate().is_ok());

        request.document_hash = "   ".into();
        assert!(request.validate().is_err());
    }

    #[test]
    fn create_document_request_reads_camel_case() {
        let request: CreateDocumentRequest = serde_json::from_str(
            r#"{"documentId":"doc-9","name":"Certificate","documentHash":"0xfeed"}"#,
        )
        .unwrap();
        assert_eq!(request.document_id, "doc-9");
        assert_eq!(request.document_hash, "0xfeed");
    }
}
