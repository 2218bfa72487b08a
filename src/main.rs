// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use axum_server::tls_rustls::RustlsConfig;
use tracing::{error, info, warn};

use verityvault_server::{
    api::router,
    auth::SessionKeys,
    config::{Config, StorageBackend},
    logging::init_tracing,
    state::AppState,
    storage::{ensure_admin, MemoryStore, PgStore, Store, UploadPaths, UploadStorage},
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };
    init_tracing(config.log_format);
    info!(?config, "starting VerityVault server");

    let store = match config.storage_backend {
        StorageBackend::Postgres => match PgStore::connect(&config.database_url, config.db_max_connections).await {
            Ok(pg) => Store::Postgres(pg),
            Err(e) => {
                error!(error = %e, "failed to connect to database");
                std::process::exit(1);
            }
        },
        StorageBackend::Memory => {
            warn!("using in-memory storage; data is lost on restart");
            Store::Memory(MemoryStore::new())
        }
    };

    let uploads = UploadStorage::new(UploadPaths::new(&config.upload_dir));
    uploads.initialize().await?;
    info!(root = %uploads.paths().root().display(), "upload directories ready");

    if let Err(e) = ensure_admin(&store, &config.bootstrap_admin_password).await {
        error!(error = %e, "failed to bootstrap admin account");
        std::process::exit(1);
    }

    let sessions = match &config.session_secret {
        Some(secret) => SessionKeys::new(secret.as_bytes(), config.session_ttl_secs),
        None => {
            warn!("SESSION_SECRET not set; sessions will not survive a restart");
            SessionKeys::ephemeral(config.session_ttl_secs)
        }
    };

    let state = AppState::new(store, uploads, sessions).with_max_upload_bytes(config.max_upload_bytes);
    let app = router(state);

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!(grace_secs = SHUTDOWN_GRACE.as_secs(), "draining connections");
        shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    let addr = config.bind_addr;
    match &config.tls {
        Some(tls) => {
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "Failed to install rustls crypto provider")?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;

            info!(%addr, "listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!(%addr, "listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    info!("server stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C shutdown signal");
        }
        _ = sigterm => {
            info!("Received SIGTERM shutdown signal");
        }
    }
}
