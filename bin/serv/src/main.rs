use std::sync::Arc;

use anyhow::Context;
use lks_gateway::{config::ApiConfig, state::ApiState};
use lks_storage::S3Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env().context("invalid configuration")?;

    let _log_guard = lks_gateway::tracing::init_tracing(&config.env, &config.log_path)
        .with_context(|| format!("failed to open log file {}", config.log_path))?;

    tracing::info!("===== APPLICATION STARTED =====");
    tracing::info!(api_gateway_url = %config.api_url, "Upstream API configured");
    tracing::info!(s3_bucket_name = %config.s3_bucket, aws_region = %config.aws_region, "Object storage configured");
    tracing::info!(log_path = %config.log_path, "Logging to file");

    let storage = S3Store::connect(&config.s3_settings())
        .await
        .context("failed to configure object storage")?;

    let state = ApiState::new(&config, Arc::new(storage))
        .context("failed to build upstream API client")?;

    let app = lks_gateway::router::app(state, config.max_upload_bytes);

    let addr = config.bind_addr().context("invalid HOST/PORT")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
