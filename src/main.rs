// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use opnsense_webhook::{
    config::Config,
    constants::{TOKIO_THREAD_NAME, TOKIO_WORKER_THREADS},
    domain_filter::DomainFilter,
    provider::UnboundProvider,
    webhook::{health_router, webhook_router, with_timeouts, WebhookState},
};
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Default log level when neither `RUST_LOG` nor `LOG_LEVEL` is set
const DEFAULT_LOG_LEVEL: &str = "info";

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name(TOKIO_THREAD_NAME)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

/// Filter directive used when `RUST_LOG` is not set.
fn log_directive(log_level: Option<&str>) -> String {
    log_level
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .to_lowercase()
}

/// Whether `LOG_FORMAT` selects JSON output. JSON unless `text` is asked for.
fn use_json_format(log_format: Option<&str>) -> bool {
    !log_format.is_some_and(|format| format.trim().eq_ignore_ascii_case("text"))
}

fn init_logging() {
    // RUST_LOG wins; LOG_LEVEL is the simple knob, e.g. LOG_LEVEL=debug
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("LOG_LEVEL").ok();
        tracing_subscriber::EnvFilter::new(log_directive(level.as_deref()))
    });

    let log_format = std::env::var("LOG_FORMAT").ok();

    if use_json_format(log_format.as_deref()) {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_file(true)
            .with_line_number(true)
            .with_thread_names(true)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_file(true)
            .with_line_number(true)
            .with_thread_names(true)
            .with_target(false)
            .with_ansi(true)
            .compact()
            .init();
    }
}

/// Resolve once `kind` is delivered; stay pending if it cannot be watched.
#[cfg(unix)]
async fn unix_signal(kind: tokio::signal::unix::SignalKind, server: &'static str, name: &'static str) {
    match tokio::signal::unix::signal(kind) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            error!(server, signal = name, error = %e, "Failed to listen for signal");
            std::future::pending::<()>().await;
        }
    }
}

/// Resolve when the process is asked to stop (SIGINT, SIGTERM, SIGHUP or SIGQUIT).
async fn shutdown_signal(server: &'static str) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(server, error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::SignalKind;

        tokio::select! {
            () = ctrl_c => info!(server, "Received SIGINT, shutting down"),
            () = unix_signal(SignalKind::terminate(), server, "SIGTERM") => {
                info!(server, "Received SIGTERM, shutting down");
            }
            () = unix_signal(SignalKind::hangup(), server, "SIGHUP") => {
                info!(server, "Received SIGHUP, shutting down");
            }
            () = unix_signal(SignalKind::quit(), server, "SIGQUIT") => {
                info!(server, "Received SIGQUIT, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        info!(server, "Received SIGINT, shutting down");
    }
}

async fn async_main() -> Result<()> {
    println!(
        "opnsense-webhook {} - external-dns provider for OPNsense Unbound",
        env!("CARGO_PKG_VERSION")
    );

    init_logging();
    debug!("Logging initialized with file and line number tracking");

    let config = Config::parse();
    debug!(?config, "Configuration loaded");

    let domain_filter = DomainFilter::from_config(&config.domain_filter)
        .context("invalid domain filter regular expression")?;
    info!("{domain_filter}");

    let provider = UnboundProvider::new(domain_filter, &config.opnsense)
        .await
        .context("failed to initialize OPNsense Unbound provider")?;
    let state = WebhookState::new(Arc::new(provider));

    let webhook_addr = config.server.webhook_addr();
    let webhook_listener = TcpListener::bind(&webhook_addr)
        .await
        .with_context(|| format!("can't bind webhook server to '{webhook_addr}'"))?;

    let health_addr = config.server.health_addr();
    let health_listener = TcpListener::bind(&health_addr)
        .await
        .with_context(|| format!("can't bind health server to '{health_addr}'"))?;

    info!(
        addr = %webhook_addr,
        read_timeout = ?config.server.read_timeout(),
        write_timeout = ?config.server.write_timeout(),
        "Starting webhook server"
    );
    info!(addr = %health_addr, "Starting health server");

    let (read_timeout, write_timeout) = (config.server.read_timeout(), config.server.write_timeout());
    let webhook_app = with_timeouts(webhook_router(state), read_timeout, write_timeout);
    let health_app = with_timeouts(health_router(), read_timeout, write_timeout);

    let webhook = axum::serve(webhook_listener, webhook_app)
        .with_graceful_shutdown(shutdown_signal("webhook"))
        .into_future();
    let health = axum::serve(health_listener, health_app)
        .with_graceful_shutdown(shutdown_signal("health"))
        .into_future();

    tokio::try_join!(webhook, health).context("server error")?;

    info!("Graceful shutdown completed");
    Ok(())
}
