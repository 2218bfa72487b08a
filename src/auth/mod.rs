// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Server-side session handling for the VerityVault API.
//!
//! ## Auth Flow
//!
//! 1. Frontend posts `{username, password}` to `POST /session`
//! 2. Server verifies the argon2id hash stored in `auth` and signs an
//!    HS256 session token carrying username and role
//! 3. Frontend sends `Authorization: Bearer <token>` on guarded calls
//! 4. Server verifies signature, expiry and issuer, then checks the role
//!    against the section guarding the endpoint
//!
//! ## Security
//!
//! - Passwords are never stored or returned in cleartext
//! - The role in the token is signed, so the route guard is enforced
//!   server-side rather than held in client state
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod roles;
pub mod session;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use password::{
    hash_password, hash_password_blocking, verify_password, verify_password_blocking,
};
pub use roles::{Role, Section};
pub use session::{IssuedSession, SessionKeys};
