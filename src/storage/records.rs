// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Rows as they live in storage.
//!
//! These are distinct from the API models in `crate::models`: an
//! [`AccountRecord`] carries the password hash, which never leaves the
//! server.

use crate::auth::Role;

/// Row of the `auth` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Row of the `profile` table, with the role joined in from `auth`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub username: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub role: Role,
}

/// Writable columns of the `profile` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub username: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
}

impl ProfileFields {
    pub fn with_role(self, role: Role) -> ProfileRecord {
        ProfileRecord {
            username: self.username,
            name: self.name,
            description: self.description,
            website: self.website,
            location: self.location,
            image: self.image,
            role,
        }
    }
}

/// Row of the `document` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DocumentRecord {
    pub document_id: String,
    pub name: String,
    pub document_hash: String,
}
