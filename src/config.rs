// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup. Invalid
//! values abort startup rather than falling back silently.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATABASE_URL` | Postgres connection string | `postgres://postgres@localhost:5432/verityvault` |
//! | `STORAGE_BACKEND` | `postgres` or `memory` | `postgres` |
//! | `DB_MAX_CONNECTIONS` | Pool size | `10` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5000` |
//! | `UPLOAD_DIR` | Root of the upload directories | `public/uploads` |
//! | `MAX_UPLOAD_BYTES` | Body limit on upload routes | `26214400` |
//! | `SESSION_SECRET` | HS256 secret for session tokens | random per process |
//! | `SESSION_TTL_SECS` | Session lifetime | `28800` |
//! | `BOOTSTRAP_ADMIN_PASSWORD` | Password for the first-start admin | `admin` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; both set enables HTTPS | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::logging::LogFormat;
use crate::storage::bootstrap::DEFAULT_ADMIN_PASSWORD;
use crate::storage::paths::DEFAULT_UPLOAD_ROOT;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "STORAGE_BACKEND";
pub const DB_MAX_CONNECTIONS_ENV: &str = "DB_MAX_CONNECTIONS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const UPLOAD_DIR_ENV: &str = "UPLOAD_DIR";
pub const MAX_UPLOAD_BYTES_ENV: &str = "MAX_UPLOAD_BYTES";
pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";
pub const SESSION_TTL_SECS_ENV: &str = "SESSION_TTL_SECS";
pub const BOOTSTRAP_ADMIN_PASSWORD_ENV: &str = "BOOTSTRAP_ADMIN_PASSWORD";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_DATABASE_URL: &str = "postgres://postgres@localhost:5432/verityvault";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
pub const DEFAULT_SESSION_TTL_SECS: i64 = 8 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

/// Which relational store the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub storage_backend: StorageBackend,
    pub db_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub session_secret: Option<String>,
    pub session_ttl_secs: i64,
    pub bootstrap_admin_password: String,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

// Secrets stay out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("storage_backend", &self.storage_backend)
            .field("db_max_connections", &self.db_max_connections)
            .field("bind_addr", &self.bind_addr)
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("tls", &self.tls)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary lookup (useful for testing).
    pub fn from_map(vars: &HashMap<&str, &str>) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_backend = match lookup(STORAGE_BACKEND_ENV).as_deref() {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(invalid(STORAGE_BACKEND_ENV, other, "expected postgres or memory"))
            }
        };

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port: u16 = parse_or(&lookup, PORT_ENV, DEFAULT_PORT)?;
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e: std::net::AddrParseError| invalid(HOST_ENV, &host, &e.to_string()))?;

        let db_max_connections = parse_or(&lookup, DB_MAX_CONNECTIONS_ENV, DEFAULT_DB_MAX_CONNECTIONS)?;
        if db_max_connections == 0 {
            return Err(invalid(DB_MAX_CONNECTIONS_ENV, "0", "must be at least 1"));
        }

        let session_ttl_secs = parse_or(&lookup, SESSION_TTL_SECS_ENV, DEFAULT_SESSION_TTL_SECS)?;
        if session_ttl_secs <= 0 {
            return Err(invalid(
                SESSION_TTL_SECS_ENV,
                &session_ttl_secs.to_string(),
                "must be positive",
            ));
        }

        let session_secret = lookup(SESSION_SECRET_ENV).filter(|s| !s.is_empty());
        if let Some(secret) = &session_secret {
            if secret.len() < 32 {
                return Err(invalid(
                    SESSION_SECRET_ENV,
                    "<redacted>",
                    "must be at least 32 bytes",
                ));
            }
        }

        let tls = match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
        };

        let log_format = match lookup(LOG_FORMAT_ENV) {
            Some(value) => LogFormat::parse(&value)
                .ok_or_else(|| invalid(LOG_FORMAT_ENV, &value, "expected json or pretty"))?,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            database_url: lookup(DATABASE_URL_ENV).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            storage_backend,
            db_max_connections,
            bind_addr,
            upload_dir: lookup(UPLOAD_DIR_ENV)
                .unwrap_or_else(|| DEFAULT_UPLOAD_ROOT.to_string())
                .into(),
            max_upload_bytes: parse_or(&lookup, MAX_UPLOAD_BYTES_ENV, DEFAULT_MAX_UPLOAD_BYTES)?,
            session_secret,
            session_ttl_secs,
            bootstrap_admin_password: lookup(BOOTSTRAP_ADMIN_PASSWORD_ENV)
                .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
            tls,
            log_format,
        })
    }
}

fn invalid(name: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(name, &value, &e.to_string())),
        None => Ok(default),
    }
}
