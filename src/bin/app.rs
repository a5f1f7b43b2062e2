use adapter::kv::KvStore;
use anyhow::{Context, Result};
use api::route::v1;
use axum::Router;
use registry::AppRegistry;
use shared::config::AppConfig;
use shared::env::{which, Environment};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger()?;
    bootstrap().await
}

fn init_logger() -> Result<()> {
    let log_level = match which() {
        Environment::Development => "debug",
        Environment::Production => "info",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| log_level.into());

    let subscriber = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(subscriber)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

async fn bootstrap() -> Result<()> {
    let app_config = AppConfig::new()?;
    let kv = match &app_config.ledger.path {
        Some(path) => KvStore::open(path.clone())
            .await
            .with_context(|| format!("open ledger store at {}", path.display()))?,
        None => {
            tracing::warn!("LEDGER_PATH is empty; reservations are kept in memory only");
            KvStore::in_memory()
        }
    };

    let addr = SocketAddr::new(app_config.server.host, app_config.server.port);
    let poll_interval = app_config.sensor.poll_interval;
    let registry = AppRegistry::new(kv, app_config)?;

    // Ctrl-C でサーバーとセンサーの問い合わせを両方止める
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reconciler = registry.sensor_reconciler();
    let reconciler_task = tokio::spawn({
        let mut shutdown_rx = shutdown_rx;
        async move {
            reconciler
                .run(poll_interval, async move {
                    let _ = shutdown_rx.wait_for(|stop| *stop).await;
                })
                .await;
        }
    });

    let app = Router::new()
        .merge(v1::routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(registry.clone());

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await
        .context("Unexpected error happened in server")
        .inspect_err(|e| {
            tracing::error!(
                error.cause_chain = ?e,error.message = %e, "Unexpected error"
            )
        });

    reconciler_task.await.ok();
    registry.shutdown().await;
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
