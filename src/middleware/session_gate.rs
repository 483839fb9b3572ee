use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;

use crate::config::RouteConfig;
use crate::session::{encode_query_value, SessionArtifact};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// 302 to this location
    RedirectToLogin(String),
}

/// Decide whether a request for `raw_path` may proceed.
///
/// Only paths under the protected prefix are gated. The proxy prefix, the
/// login/logout paths and public asset prefixes always pass; proxied calls
/// are left for the upstream to reject.
///
/// Prefixes are matched against the percent-decoded, dot-normalized path, the
/// same path a static file service resolves. A path that does not decode to
/// UTF-8 is gated like a protected one.
pub fn evaluate(raw_path: &str, state: SessionState, routes: &RouteConfig) -> GateDecision {
    let Some(path) = canonical_path(raw_path) else {
        return match state {
            SessionState::Authenticated => GateDecision::Allow,
            SessionState::Unauthenticated => GateDecision::RedirectToLogin(login_location(routes, raw_path)),
        };
    };

    if under(&path, &routes.proxy_prefix)
        || under(&path, &routes.login_path)
        || under(&path, &routes.logout_path)
        || routes.public_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    {
        return GateDecision::Allow;
    }

    if state == SessionState::Unauthenticated && under(&path, &routes.protected_prefix) {
        return GateDecision::RedirectToLogin(login_location(routes, raw_path));
    }

    GateDecision::Allow
}

/// `next` carries the path exactly as requested.
fn login_location(routes: &RouteConfig, raw_path: &str) -> String {
    format!("{}?next={}", routes.login_path, encode_query_value(raw_path))
}

/// Percent-decode, then drop empty and `.` segments and resolve `..`.
/// Keeps a trailing slash so public prefixes like `/_next/` still match.
fn canonical_path(raw_path: &str) -> Option<String> {
    let decoded = percent_decode_str(raw_path).decode_utf8().ok()?;

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut path = format!("/{}", segments.join("/"));
    if decoded.ends_with('/') && !segments.is_empty() {
        path.push('/');
    }
    Some(path)
}

/// Segment-aware prefix match: `/admin` covers `/admin` and `/admin/x`, not `/admin-proxy`.
fn under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Gate evaluated before route dispatch. Never touches the session cookie.
pub async fn session_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let session = match SessionArtifact::from_headers(request.headers(), &state.config.session) {
        Some(_) => SessionState::Authenticated,
        None => SessionState::Unauthenticated,
    };

    match evaluate(request.uri().path(), session, &state.config.routes) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::RedirectToLogin(location) => {
            tracing::debug!(path = %request.uri().path(), "No session; redirecting to login");
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
    }
}
