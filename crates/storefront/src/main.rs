//! `shopfront` binary: serves the storefront over HTTP.
//!
//! Pages are server-rendered with Askama and enhanced with HTMX fragments.
//! Persistence goes to the hosted backend when `BACKEND_URL` and
//! `BACKEND_ANON_KEY` are set, and to each visitor's session otherwise.

#![cfg_attr(not(test), forbid(unsafe_code))]

use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use shopfront_storefront::{build_app, config::StorefrontConfig, state::AppState};
use tokio::net::TcpListener;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "shopfront_storefront=info,tower_http=debug";

/// Start Sentry (when a DSN is set) and the tracing subscriber.
///
/// Sentry goes first so the tracing layer has a client to report to. The
/// returned guard flushes pending events when dropped.
fn init_telemetry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(config.sentry_environment.clone().into()),
                attach_stacktrace: true,
                ..Default::default()
            },
        ))
    });

    let sentry_layer = sentry_tracing::layer().event_filter(|meta| match *meta.level() {
        Level::ERROR | Level::WARN => EventFilter::Event,
        Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
        Level::TRACE => EventFilter::Ignore,
    });

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_layer)
        .init();

    if guard.is_some() {
        tracing::info!(environment = %config.sentry_environment, "Sentry enabled");
    }
    guard
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let _sentry = init_telemetry(&config);

    let addr = config.socket_addr();
    let state = AppState::new(config);
    tracing::info!(
        remote = state.backend().is_remote(),
        base_url = %state.config().base_url,
        "Backend selected"
    );

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "shopfront listening");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shopfront stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix. A signal that cannot be
/// listened for never resolves.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
    tracing::info!("Shutting down");
}
