// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Relational data lives in Postgres (`auth`, `profile`, `document`);
//! uploaded files live on the local filesystem.
//!
//! ## Backends
//!
//! - [`PgStore`] - pooled Postgres connections, migrations from `./migrations`
//! - [`MemoryStore`] - same semantics in process memory (tests, development)
//!
//! Handlers talk to [`Store`], which dispatches to whichever backend the
//! server was started with.
//!
//! ## Upload Layout
//!
//! ```text
//! <UPLOAD_DIR>/
//!   profile/{original file name}
//!   document/{original file name}
//! ```

pub mod bootstrap;
pub mod memory;
pub mod paths;
pub mod postgres;
pub mod records;
pub mod uploads;

pub use bootstrap::ensure_admin;
pub use memory::MemoryStore;
pub use paths::{UploadKind, UploadPaths};
pub use postgres::PgStore;
pub use records::{AccountRecord, DocumentRecord, ProfileFields, ProfileRecord};
pub use uploads::{UploadError, UploadStorage};

/// Error type for relational storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid stored row: {0}")]
    InvalidRow(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// The relational store the server was started with.
#[derive(Clone)]
pub enum Store {
    Postgres(PgStore),
    Memory(MemoryStore),
}

impl Store {
    pub fn backend(&self) -> &'static str {
        match self {
            Store::Postgres(_) => "postgres",
            Store::Memory(_) => "memory",
        }
    }

    pub async fn ping(&self) -> StoreResult<()> {
        match self {
            Store::Postgres(pg) => pg.ping().await,
            Store::Memory(_) => Ok(()),
        }
    }

    pub async fn list_accounts(&self) -> StoreResult<Vec<AccountRecord>> {
        match self {
            Store::Postgres(pg) => pg.list_accounts().await,
            Store::Memory(mem) => mem.list_accounts().await,
        }
    }

    pub async fn find_account(&self, username: &str) -> StoreResult<Option<AccountRecord>> {
        match self {
            Store::Postgres(pg) => pg.find_account(username).await,
            Store::Memory(mem) => mem.find_account(username).await,
        }
    }

    pub async fn create_account(&self, account: &AccountRecord) -> StoreResult<()> {
        match self {
            Store::Postgres(pg) => pg.create_account(account).await,
            Store::Memory(mem) => mem.create_account(account).await,
        }
    }

    pub async fn update_password(&self, username: &str, password_hash: &str) -> StoreResult<u64> {
        match self {
            Store::Postgres(pg) => pg.update_password(username, password_hash).await,
            Store::Memory(mem) => mem.update_password(username, password_hash).await,
        }
    }

    pub async fn list_profiles(&self) -> StoreResult<Vec<ProfileRecord>> {
        match self {
            Store::Postgres(pg) => pg.list_profiles().await,
            Store::Memory(mem) => mem.list_profiles().await,
        }
    }

    pub async fn get_profile(&self, username: &str) -> StoreResult<Option<ProfileRecord>> {
        match self {
            Store::Postgres(pg) => pg.get_profile(username).await,
            Store::Memory(mem) => mem.get_profile(username).await,
        }
    }

    pub async fn create_profile(&self, profile: &ProfileFields) -> StoreResult<()> {
        match self {
            Store::Postgres(pg) => pg.create_profile(profile).await,
            Store::Memory(mem) => mem.create_profile(profile).await,
        }
    }

    pub async fn update_profile(&self, profile: &ProfileFields) -> StoreResult<u64> {
        match self {
            Store::Postgres(pg) => pg.update_profile(profile).await,
            Store::Memory(mem) => mem.update_profile(profile).await,
        }
    }

    pub async fn list_documents(&self) -> StoreResult<Vec<DocumentRecord>> {
        match self {
            Store::Postgres(pg) => pg.list_documents().await,
            Store::Memory(mem) => mem.list_documents().await,
        }
    }

    pub async fn get_document(&self, document_id: &str) -> StoreResult<Option<DocumentRecord>> {
        match self {
            Store::Postgres(pg) => pg.get_document(document_id).await,
            Store::Memory(mem) => mem.get_document(document_id).await,
        }
    }

    pub async fn create_document(&self, document: &DocumentRecord) -> StoreResult<()> {
        match self {
            Store::Postgres(pg) => pg.create_document(document).await,
            Store::Memory(mem) => mem.create_document(document).await,
        }
    }

    pub async fn update_document_hash(&self, document_id: &str, document_hash: &str) -> StoreResult<u64> {
        match self {
            Store::Postgres(pg) => pg.update_document_hash(document_id, document_hash).await,
            Store::Memory(mem) => mem.update_document_hash(document_id, document_hash).await,
        }
    }

    pub async fn create_account_with_profile(
        &self,
        account: &AccountRecord,
        profile: &ProfileFields,
    ) -> StoreResult<bool> {
        match self {
            Store::Postgres(pg) => pg.create_account_with_profile(account, profile).await,
            Store::Memory(mem) => mem.create_account_with_profile(account, profile).await,
        }
    }
}
