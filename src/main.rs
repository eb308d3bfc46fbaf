// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use tokengate::api::router;
use tokengate::auth::keys::{generate_key_pair_files, DEFAULT_KEY_BITS};
use tokengate::auth::TokenManager;
use tokengate::config::{JwtConfig, ServerConfig};
use tokengate::logging::{self, LogFormat};
use tokengate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "tokengate", version, about = "RS256 bearer token service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Generate an RSA key pair as PEM files
    Keygen {
        /// Output path for the X.509 public key
        #[arg(long)]
        public_key: PathBuf,
        /// Output path for the PKCS#8 private key
        #[arg(long)]
        private_key: PathBuf,
        #[arg(long, default_value_t = DEFAULT_KEY_BITS)]
        bits: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(LogFormat::from_env())?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Keygen {
            public_key,
            private_key,
            bits,
        } => generate_key_pair_files(&public_key, &private_key, bits)
            .context("failed to generate key pair"),
    }
}

async fn serve() -> anyhow::Result<()> {
    let server = ServerConfig::from_env()?;
    let jwt = JwtConfig::from_env()?;

    // Without keys nobody can be authenticated
    let state = AppState::from_config(&jwt).context("failed to load JWT key material")?;
    spawn_reload_on_hangup(Arc::clone(&state.token_manager));

    let addr = server.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        %addr,
        issuer = %jwt.issuer,
        access_ms = jwt.access_token_validity_ms,
        refresh_ms = jwt.refresh_token_validity_ms,
        "Tokengate listening"
    );

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Reload keys and settings from the environment on SIGHUP.
#[cfg(unix)]
fn spawn_reload_on_hangup(manager: Arc<TokenManager>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "SIGHUP key reload unavailable");
            return;
        }
    };

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            match JwtConfig::from_env() {
                Ok(config) => {
                    if let Err(e) = manager.reload(&config) {
                        tracing::error!(error = %e, "Key reload failed, keeping current keys");
                    }
                }
                Err(e) => tracing::error!(error = %e, "Key reload skipped: invalid configuration"),
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_on_hangup(_manager: Arc<TokenManager>) {}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
