// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path layout for uploaded files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default root for uploaded files, relative to the working directory.
pub const DEFAULT_UPLOAD_ROOT: &str = "public/uploads";

/// Which upload directory a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    /// Profile images (multipart field `image`)
    Profile,
    /// Document files (multipart field `file`)
    Document,
}

impl UploadKind {
    pub const ALL: [UploadKind; 2] = [UploadKind::Profile, UploadKind::Document];

    pub fn dir_name(&self) -> &'static str {
        match self {
            UploadKind::Profile => "profile",
            UploadKind::Document => "document",
        }
    }

    /// Name of the multipart field carrying the file.
    pub fn field_name(&self) -> &'static str {
        match self {
            UploadKind::Profile => "image",
            UploadKind::Document => "file",
        }
    }
}

/// Path utilities for the upload directories.
#[derive(Debug, Clone)]
pub struct UploadPaths {
    root: PathBuf,
}

impl Default for UploadPaths {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_ROOT)
    }
}

impl UploadPaths {
    /// Create a new UploadPaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding files of one kind.
    pub fn dir(&self, kind: UploadKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Path of a stored file. `file_name` must already be sanitized.
    pub fn file(&self, kind: UploadKind, file_name: &str) -> PathBuf {
        self.dir(kind).join(file_name)
    }

    /// Scratch path a file is written to before being renamed into place.
    pub fn staging_file(&self, kind: UploadKind, token: &str) -> PathBuf {
        self.dir(kind).join(format!(".{token}.part"))
    }
}
