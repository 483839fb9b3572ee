// handlers/public/auth/logout.rs - POST <logout-path> handler

use axum::{extract::State, http::header, response::IntoResponse};

use crate::middleware::ApiResponse;
use crate::session::removal_cookie;
use crate::state::AppState;

/// POST <logout-path> - expire the session cookie
///
/// Always succeeds; there is no server-side session to tear down.
pub async fn session_logout(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!("Admin session cleared");
    (
        [(header::SET_COOKIE, removal_cookie(&state.config.session))],
        ApiResponse::ok(),
    )
}
