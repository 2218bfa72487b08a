// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory store with the same semantics as the Postgres store.
//!
//! Used by the test suite and by `STORAGE_BACKEND=memory` for local
//! development. Constraint behavior mirrors the schema: primary keys reject
//! duplicates and a profile needs an existing account.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::records::{AccountRecord, DocumentRecord, ProfileFields, ProfileRecord};
use super::{StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<String, AccountRecord>,
    profiles: BTreeMap<String, ProfileFields>,
    documents: BTreeMap<String, DocumentRecord>,
}

impl Tables {
    fn joined_profile(&self, fields: &ProfileFields) -> StoreResult<ProfileRecord> {
        let account = self.accounts.get(&fields.username).ok_or_else(|| {
            StoreError::InvalidRow(format!("profile {} has no account", fields.username))
        })?;
        Ok(fields.clone().with_role(account.role))
    }

    fn insert_account(&mut self, account: &AccountRecord) -> StoreResult<()> {
        if self.accounts.contains_key(&account.username) {
            return Err(StoreError::AlreadyExists(format!("Account {}", account.username)));
        }
        self.accounts.insert(account.username.clone(), account.clone());
        Ok(())
    }

    fn insert_profile(&mut self, profile: &ProfileFields) -> StoreResult<()> {
        if !self.accounts.contains_key(&profile.username) {
            return Err(StoreError::NotFound(format!("Account {}", profile.username)));
        }
        if self.profiles.contains_key(&profile.username) {
            return Err(StoreError::AlreadyExists(format!("Profile {}", profile.username)));
        }
        self.profiles.insert(profile.username.clone(), profile.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list_accounts(&self) -> StoreResult<Vec<AccountRecord>> {
        Ok(self.tables.read().await.accounts.values().cloned().collect())
    }

    pub async fn find_account(&self, username: &str) -> StoreResult<Option<AccountRecord>> {
        Ok(self.tables.read().await.accounts.get(username).cloned())
    }

    pub async fn create_account(&self, account: &AccountRecord) -> StoreResult<()> {
        self.tables.write().await.insert_account(account)
    }

    pub async fn update_password(&self, username: &str, password_hash: &str) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        match tables.accounts.get_mut(username) {
            Some(account) => {
                account.password_hash = password_hash.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    pub async fn list_profiles(&self) -> StoreResult<Vec<ProfileRecord>> {
        let tables = self.tables.read().await;
        tables
            .profiles
            .values()
            .map(|fields| tables.joined_profile(fields))
            .collect()
    }

    pub async fn get_profile(&self, username: &str) -> StoreResult<Option<ProfileRecord>> {
        let tables = self.tables.read().await;
        tables
            .profiles
            .get(username)
            .map(|fields| tables.joined_profile(fields))
            .transpose()
    }

    pub async fn create_profile(&self, profile: &ProfileFields) -> StoreResult<()> {
        self.tables.write().await.insert_profile(profile)
    }

    pub async fn update_profile(&self, profile: &ProfileFields) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        match tables.profiles.get_mut(&profile.username) {
            Some(existing) => {
                *existing = profile.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    pub async fn list_documents(&self) -> StoreResult<Vec<DocumentRecord>> {
        Ok(self.tables.read().await.documents.values().cloned().collect())
    }

    pub async fn get_document(&self, document_id: &str) -> StoreResult<Option<DocumentRecord>> {
        Ok(self.tables.read().await.documents.get(document_id).cloned())
    }

    pub async fn create_document(&self, document: &DocumentRecord) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.documents.contains_key(&document.document_id) {
            return Err(StoreError::AlreadyExists(format!(
                "Document {}",
                document.document_id
            )));
        }
        tables
            .documents
            .insert(document.document_id.clone(), document.clone());
        Ok(())
    }

    pub async fn update_document_hash(&self, document_id: &str, document_hash: &str) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        match tables.documents.get_mut(document_id) {
            Some(document) => {
                document.document_hash = document_hash.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    pub async fn create_account_with_profile(
        &self,
        account: &AccountRecord,
        profile: &ProfileFields,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.accounts.contains_key(&account.username) {
            return Ok(false);
        }
        tables.insert_account(account)?;
        if !tables.profiles.contains_key(&profile.username) {
            tables.insert_profile(profile)?;
        }
        Ok(true)
    }
}
