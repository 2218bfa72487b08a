// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuing and verification (HS256).

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::{AuthError, AuthenticatedUser, Role, SessionClaims};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Issuer claim written into every session token.
pub const SESSION_ISSUER: &str = "verityvault";

/// Signing material and lifetime for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    ttl_secs: i64,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

/// A freshly issued session token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user: AuthenticatedUser,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
            ttl_secs,
        }
    }

    /// Keys from a random secret; sessions do not survive a restart.
    pub fn ephemeral(ttl_secs: i64) -> Self {
        let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        Self::new(secret.as_bytes(), ttl_secs)
    }

    /// Sign a session token for `username`.
    pub fn issue(&self, username: &str, role: Role) -> Result<IssuedSession, AuthError> {
        let now = Utc::now().timestamp();
        self.issue_at(username, role, now)
    }

    fn issue_at(&self, username: &str, role: Role, now: i64) -> Result<IssuedSession, AuthError> {
        let claims = SessionClaims {
            sub: username.to_string(),
            role,
            sid: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.ttl_secs,
            iss: SESSION_ISSUER.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(format!("token signing failed: {e}")))?;

        Ok(IssuedSession {
            token,
            user: AuthenticatedUser::from_claims(claims),
        })
    }

    /// Verify signature, expiry and issuer of a session token.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_issuer(&[SESSION_ISSUER]);
        validation.validate_aud = false;

        let token_data = decode::<SessionClaims>(token, &self.decoding, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
                _ => AuthError::MalformedToken,
            },
        )?;

        Ok(AuthenticatedUser::from_claims(token_data.claims))
    }
}
