// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Default administrator account created on first start.

use tracing::{info, warn};

use super::{AccountRecord, ProfileFields, Store, StoreError};
use crate::auth::{hash_password, AuthError, Role};

pub const ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Create the `admin` account and its profile unless it already exists.
///
/// Returns whether the account was created.
pub async fn ensure_admin(store: &Store, password: &str) -> Result<bool, BootstrapError> {
    if store.find_account(ADMIN_USERNAME).await?.is_some() {
        info!("Admin user already exists");
        return Ok(false);
    }

    if password == DEFAULT_ADMIN_PASSWORD {
        warn!("Bootstrapping admin with the default password; set BOOTSTRAP_ADMIN_PASSWORD");
    }

    let account = AccountRecord {
        username: ADMIN_USERNAME.to_string(),
        password_hash: hash_password(password)?,
        role: Role::Admin,
    };
    let profile = ProfileFields {
        username: ADMIN_USERNAME.to_string(),
        name: Some("System Administrator".to_string()),
        description: Some("Default system administrator account".to_string()),
        ..Default::default()
    };

    let created = store.create_account_with_profile(&account, &profile).await?;
    if created {
        info!("Default admin user and profile created");
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn creates_admin_once() {
        let store = Store::Memory(MemoryStore::new());

        assert!(ensure_admin(&store, "s3cret").await.unwrap());
        assert!(!ensure_admin(&store, "other").await.unwrap());

        let admin = store.find_account("admin").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(verify_password("s3cret", &admin.password_hash));

        let profile = store.get_profile("admin").await.unwrap().unwrap();
        assert_eq!(profile.name.as_deref(), Some("System Administrator"));
        assert_eq!(profile.role, Role::Admin);
    }
}
