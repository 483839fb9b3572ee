use axum::{
    middleware::from_fn_with_state,
    routing::{any, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::handlers;
use crate::middleware::session_gate;
use crate::state::AppState;

/// Gateway router without any UI behind it; unknown paths get a JSON 404.
pub fn app(state: AppState) -> Router {
    app_with_ui(state, Router::new().fallback(handlers::not_found))
}

/// Gateway router with `ui` serving everything the gateway does not.
/// The session gate wraps both.
pub fn app_with_ui(state: AppState, ui: Router) -> Router {
    let config = state.config.clone();

    Router::new()
        // Public
        .route("/health", get(handlers::health))
        .merge(auth_routes(&config, ui.clone()))
        // Upstream API passthrough
        .merge(proxy_routes(&config))
        .with_state(state.clone())
        // Admin UI (external)
        .merge(ui)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn_with_state(state, session_gate)),
        )
}

/// Only POST is handled here; other methods on these paths (the login page
/// itself) fall through to the UI.
fn auth_routes(config: &GatewayConfig, ui: Router) -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route(
            &config.routes.login_path,
            post(auth::session_login).fallback_service(ui.clone()),
        )
        .route(
            &config.routes.logout_path,
            post(auth::session_logout).fallback_service(ui),
        )
}

fn proxy_routes(config: &GatewayConfig) -> Router<AppState> {
    let prefix = &config.routes.proxy_prefix;

    Router::new()
        .route(prefix, any(handlers::forward_any))
        .route(&format!("{}/*path", prefix), any(handlers::forward_any))
}
