// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! VerityVault - Document Verification Service
//!
//! REST backend for registering documents with a content fingerprint and
//! letting verifiers look them up. Accounts carry one of four roles
//! (admin, issuer, verifier, user) that decide which parts of the
//! frontend render and which write endpoints a session may call.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password hashing, session tokens and role guards
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber setup
//! - `storage` - Postgres / in-memory tables and uploaded files

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
