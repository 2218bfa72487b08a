// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Uploaded file storage on the local filesystem.
//!
//! Files keep the name the client supplied, so a second upload under the
//! same name replaces the first. Names are reduced to a single plain path
//! component before they touch the filesystem.

use std::io;
use std::path::PathBuf;

use tokio::fs;
use uuid::Uuid;

use super::{UploadKind, UploadPaths};

const MAX_FILE_NAME_BYTES: usize = 255;

/// Error type for upload storage operations.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type UploadResult<T> = Result<T, UploadError>;

/// A file that has been written into an upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub kind: UploadKind,
    pub file_name: String,
    pub size: u64,
}

/// Check that `name` is a single, plain file name.
///
/// Rejects empty names, `.` and `..`, anything with a path separator, NUL or
/// other control character, and names over 255 bytes.
pub fn sanitize_file_name(name: &str) -> UploadResult<&str> {
    let invalid = name.is_empty()
        || name.len() > MAX_FILE_NAME_BYTES
        || name == "."
        || name == ".."
        || name.contains(|c: char| matches!(c, '/' | '\\' | '\0'))
        || name.chars().any(char::is_control);

    if invalid {
        Err(UploadError::InvalidFileName(name.to_string()))
    } else {
        Ok(name)
    }
}

/// Content type guessed from the file extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain; charset=utf-8",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Reads and writes files under the upload root.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    paths: UploadPaths,
}

impl UploadStorage {
    pub fn new(paths: UploadPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &UploadPaths {
        &self.paths
    }

    /// Create the upload directories. Safe to call multiple times.
    pub async fn initialize(&self) -> UploadResult<()> {
        for kind in UploadKind::ALL {
            fs::create_dir_all(self.paths.dir(kind)).await?;
        }
        Ok(())
    }

    /// Whether every upload directory exists.
    pub async fn health_check(&self) -> bool {
        for kind in UploadKind::ALL {
            match fs::metadata(self.paths.dir(kind)).await {
                Ok(meta) if meta.is_dir() => {}
                _ => return false,
            }
        }
        true
    }

    /// Store `contents` under `file_name`, replacing any existing file.
    ///
    /// The bytes land in a staging file first and are renamed into place, so
    /// concurrent readers see either the old or the new file in full.
    pub async fn save(&self, kind: UploadKind, file_name: &str, contents: &[u8]) -> UploadResult<StoredFile> {
        let file_name = sanitize_file_name(file_name)?;
        fs::create_dir_all(self.paths.dir(kind)).await?;

        let staging = self
            .paths
            .staging_file(kind, &Uuid::new_v4().simple().to_string());
        let target = self.paths.file(kind, file_name);

        if let Err(e) = fs::write(&staging, contents).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&staging, &target).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }

        Ok(StoredFile {
            kind,
            file_name: file_name.to_string(),
            size: contents.len() as u64,
        })
    }

    /// Read a stored file in full.
    pub async fn read(&self, kind: UploadKind, file_name: &str) -> UploadResult<Vec<u8>> {
        let path = self.resolve(kind, file_name)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(UploadError::NotFound(format!(
                "{}/{file_name}",
                kind.dir_name()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, kind: UploadKind, file_name: &str) -> UploadResult<PathBuf> {
        let file_name = sanitize_file_name(file_name)?;
        Ok(self.paths.file(kind, file_name))
    }
}
