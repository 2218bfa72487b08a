// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.

use tempfile::TempDir;

use crate::auth::{hash_password, AuthenticatedUser, Role, SessionKeys};
use crate::state::AppState;
use crate::storage::{AccountRecord, MemoryStore, Store, UploadPaths, UploadStorage};

pub(crate) const TEST_SESSION_SECRET: &[u8] = b"test-session-secret-0123456789abcdef";

/// App state over an in-memory store and a temporary upload root.
pub(crate) fn memory_state() -> (AppState, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let state = AppState::new(
        Store::Memory(MemoryStore::new()),
        UploadStorage::new(UploadPaths::new(dir.path())),
        SessionKeys::new(TEST_SESSION_SECRET, 3600),
    );
    (state, dir)
}

/// A caller as the `Auth` extractor would produce it.
pub(crate) fn session_user(username: &str, role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
        username: username.to_string(),
        role,
        session_id: format!("sess-{username}"),
        expires_at: i64::MAX,
    }
}

pub(crate) async fn seed_account(state: &AppState, username: &str, password: &str, role: Role) {
    state
        .store
        .create_account(&AccountRecord {
            username: username.to_string(),
            password_hash: hash_password(password).expect("hashing succeeds"),
            role,
        })
        .await
        .expect("seed account");
}
