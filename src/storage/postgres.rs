// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Postgres-backed store.
//!
//! Every statement is parameterized. The pool hands out one connection per
//! query and takes it back when the query completes.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use super::records::{AccountRecord, DocumentRecord, ProfileFields, ProfileRecord};
use super::{StoreError, StoreResult};
use crate::auth::Role;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

const PROFILE_SELECT: &str = "SELECT p.username, p.name, p.description, p.website, p.location, p.image, a.role \
     FROM profile p JOIN auth a ON a.username = p.username";

#[derive(sqlx::FromRow)]
struct AccountRow {
    username: String,
    password_hash: String,
    role: String,
}

impl TryFrom<AccountRow> for AccountRecord {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = parse_role(&row.username, &row.role)?;
        Ok(AccountRecord {
            username: row.username,
            password_hash: row.password_hash,
            role,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    username: String,
    name: Option<String>,
    description: Option<String>,
    website: Option<String>,
    location: Option<String>,
    image: Option<String>,
    role: String,
}

impl TryFrom<ProfileRow> for ProfileRecord {
    type Error = StoreError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role = parse_role(&row.username, &row.role)?;
        Ok(ProfileRecord {
            username: row.username,
            name: row.name,
            description: row.description,
            website: row.website,
            location: row.location,
            image: row.image,
            role,
        })
    }
}

fn parse_role(username: &str, role: &str) -> StoreResult<Role> {
    Role::from_str(role)
        .ok_or_else(|| StoreError::InvalidRow(format!("account {username} has unknown role {role}")))
}

/// Translate constraint violations into domain errors.
fn write_error(e: sqlx::Error, entity: impl FnOnce() -> String, parent: impl FnOnce() -> String) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StoreError::AlreadyExists(entity());
        }
        if db.is_foreign_key_violation() {
            return StoreError::NotFound(parent());
        }
    }
    StoreError::Database(e)
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a pool against `database_url` and apply pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await?;

        info!(max_connections, "Postgres pool opened");

        let store = Self::from_pool(pool);
        store.run_migrations().await?;

        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations complete");
        Ok(())
    }

    pub async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    pub async fn list_accounts(&self) -> StoreResult<Vec<AccountRecord>> {
        sqlx::query_as::<_, AccountRow>(
            "SELECT username, password_hash, role FROM auth ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(AccountRecord::try_from)
        .collect()
    }

    pub async fn find_account(&self, username: &str) -> StoreResult<Option<AccountRecord>> {
        sqlx::query_as::<_, AccountRow>(
            "SELECT username, password_hash, role FROM auth WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(AccountRecord::try_from)
        .transpose()
    }

    pub async fn create_account(&self, account: &AccountRecord) -> StoreResult<()> {
        sqlx::query("INSERT INTO auth (username, password_hash, role) VALUES ($1, $2, $3)")
            .bind(&account.username)
            .bind(&account.password_hash)
            .bind(account.role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    || format!("Account {}", account.username),
                    || format!("Account {}", account.username),
                )
            })?;
        Ok(())
    }

    pub async fn update_password(&self, username: &str, password_hash: &str) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE auth SET password_hash = $1 WHERE username = $2")
            .bind(password_hash)
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    pub async fn list_profiles(&self) -> StoreResult<Vec<ProfileRecord>> {
        sqlx::query_as::<_, ProfileRow>(&format!("{PROFILE_SELECT} ORDER BY p.username"))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(ProfileRecord::try_from)
            .collect()
    }

    pub async fn get_profile(&self, username: &str) -> StoreResult<Option<ProfileRecord>> {
        sqlx::query_as::<_, ProfileRow>(&format!("{PROFILE_SELECT} WHERE p.username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .map(ProfileRecord::try_from)
            .transpose()
    }

    pub async fn create_profile(&self, profile: &ProfileFields) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO profile (username, name, description, website, location, image) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&profile.username)
        .bind(&profile.name)
        .bind(&profile.description)
        .bind(&profile.website)
        .bind(&profile.location)
        .bind(&profile.image)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            write_error(
                e,
                || format!("Profile {}", profile.username),
                || format!("Account {}", profile.username),
            )
        })?;
        Ok(())
    }

    pub async fn update_profile(&self, profile: &ProfileFields) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE profile SET name = $1, description = $2, website = $3, location = $4, image = $5 \
             WHERE username = $6",
        )
        .bind(&profile.name)
        .bind(&profile.description)
        .bind(&profile.website)
        .bind(&profile.location)
        .bind(&profile.image)
        .bind(&profile.username)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Documents
    // =========================================================================

    pub async fn list_documents(&self) -> StoreResult<Vec<DocumentRecord>> {
        let documents = sqlx::query_as::<_, DocumentRecord>(
            "SELECT document_id, name, document_hash FROM document ORDER BY document_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(documents)
    }

    pub async fn get_document(&self, document_id: &str) -> StoreResult<Option<DocumentRecord>> {
        let document = sqlx::query_as::<_, DocumentRecord>(
            "SELECT document_id, name, document_hash FROM document WHERE document_id = $1",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(document)
    }

    pub async fn create_document(&self, document: &DocumentRecord) -> StoreResult<()> {
        sqlx::query("INSERT INTO document (document_id, name, document_hash) VALUES ($1, $2, $3)")
            .bind(&document.document_id)
            .bind(&document.name)
            .bind(&document.document_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    || format!("Document {}", document.document_id),
                    || format!("Document {}", document.document_id),
                )
            })?;
        Ok(())
    }

    pub async fn update_document_hash(&self, document_id: &str, document_hash: &str) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE document SET document_hash = $1 WHERE document_id = $2")
            .bind(document_hash)
            .bind(document_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Bootstrap
    // =========================================================================

    /// Insert an account and its profile in one transaction, unless the
    /// account already exists. Returns whether anything was written.
    pub async fn create_account_with_profile(
        &self,
        account: &AccountRecord,
        profile: &ProfileFields,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO auth (username, password_hash, role) VALUES ($1, $2, $3) \
             ON CONFLICT (username) DO NOTHING",
        )
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO profile (username, name, description, website, location, image) \
             VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (username) DO NOTHING",
        )
        .bind(&profile.username)
        .bind(&profile.name)
        .bind(&profile.description)
        .bind(&profile.website)
        .bind(&profile.location)
        .bind(&profile.image)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}
