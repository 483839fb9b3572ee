use anyhow::Context;
use axum::Router;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use admin_gateway::{app_with_ui, AppState, GatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up UPSTREAM_API_ORIGIN etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("admin_gateway=info,tower_http=info")),
        )
        .init();

    // Read once; nothing below consults the environment per request
    let config = GatewayConfig::from_env().context("invalid gateway configuration")?;
    tracing::info!(
        environment = ?config.environment,
        upstream = %config.upstream.base_url,
        proxy_prefix = %config.routes.proxy_prefix,
        "Starting admin gateway"
    );
    if config.is_production() && !config.session.secure {
        tracing::warn!("SESSION_COOKIE_SECURE is off in production; session cookies will be sent over plain http");
    }

    let ui = match &config.api.ui_dir {
        Some(dir) => {
            tracing::info!("Serving admin UI from {}", dir.display());
            Router::new().fallback_service(ServeDir::new(dir))
        }
        None => Router::new(),
    };

    let state = AppState::new(config).context("failed to build upstream client")?;
    let app = app_with_ui(state, ui);

    // Allow tests or deployments to override port via env
    let port = std::env::var("GATEWAY_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Admin gateway listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
