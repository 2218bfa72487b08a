// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::{Role, Section};
use super::AuthError;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (username)
    pub sub: String,

    /// Role at the time the session was issued
    pub role: Role,

    /// Session ID
    pub sid: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,
}

/// Authenticated user information extracted from a session token.
///
/// This is the primary type used throughout the application to represent
/// the caller of a guarded endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Account username (`sub` claim)
    pub username: String,

    /// Account role
    pub role: Role,

    /// Session ID
    pub session_id: String,

    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: SessionClaims) -> Self {
        Self {
            username: claims.sub,
            role: claims.role,
            session_id: claims.sid,
            expires_at: claims.exp,
        }
    }

    /// Check if this user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Reject unless the role may call the API behind `section`.
    pub fn require_section(&self, section: Section) -> Result<(), AuthError> {
        if section.permits(self.role) {
            Ok(())
        } else {
            tracing::warn!(
                username = %self.username,
                role = %self.role,
                section = ?section,
                "section access denied"
            );
            Err(AuthError::InsufficientPermissions)
        }
    }

    /// Reject unless the caller owns `username` or is an admin.
    pub fn require_self_or_admin(&self, username: &str) -> Result<(), AuthError> {
        if self.is_admin() || self.username == username {
            Ok(())
        } else {
            tracing::warn!(
                username = %self.username,
                target = %username,
                "cross-account write denied"
            );
            Err(AuthError::InsufficientPermissions)
        }
    }
}
