// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Instant;

use crate::auth::SessionKeys;
use crate::storage::{Store, UploadStorage};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub uploads: UploadStorage,
    pub sessions: SessionKeys,
    pub max_upload_bytes: usize,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Store, uploads: UploadStorage, sessions: SessionKeys) -> Self {
        Self {
            store,
            uploads,
            sessions,
            max_upload_bytes: crate::config::DEFAULT_MAX_UPLOAD_BYTES,
            started_at: Instant::now(),
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
