// handlers/public/auth/login.rs - POST <login-path> handler

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::proxy::{UpstreamBody, ADMIN_KEY_HEADER};
use crate::session::{encode_query_value, removal_cookie, safe_next, session_cookie, SessionArtifact};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginAccepted {
    next: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginFormat {
    Json,
    Form,
}

/// POST <login-path> - exchange an admin key for a session cookie
///
/// Body is either JSON `{ "key": "...", "next": "/admin/..." }` or an HTML
/// form with the same fields. The key is probed against the upstream before
/// any cookie is written.
///
/// JSON success: `200 { "ok": true }` (plus `data.next` when `next` was sent)
/// JSON failure: `400`/`401`/`502 { "ok": false, "error": { "message", "code" } }`
/// Form success: `303` to `next`; form failure: `303` back to the login page.
pub async fn session_login(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let config = &state.config;
    let had_session = SessionArtifact::from_headers(&headers, &config.session).is_some();
    let (format, login) = parse_login(&headers, &body);
    let next = safe_next(login.next.as_deref(), &config.routes.default_next).to_string();

    let outcome = match verify_key(&state, login.key.as_deref()).await {
        Ok(artifact) => session_cookie(artifact.as_str(), &config.session)
            .ok_or_else(|| ApiError::internal_server_error("Failed to encode session cookie")),
        Err(err) => Err(err),
    };

    match outcome {
        Ok(cookie) => {
            tracing::info!("Admin login accepted");
            let set_cookie = [(header::SET_COOKIE, cookie)];
            match format {
                LoginFormat::Form => (set_cookie, Redirect::to(&next)).into_response(),
                LoginFormat::Json if login.next.is_some() => {
                    (set_cookie, ApiResponse::success(LoginAccepted { next })).into_response()
                }
                LoginFormat::Json => (set_cookie, ApiResponse::ok()).into_response(),
            }
        }
        Err(err) => {
            tracing::warn!(code = err.error_code(), "Admin login rejected: {}", err);
            // Only touch the cookie if the browser actually holds one
            let clear: Option<[(header::HeaderName, HeaderValue); 1]> =
                had_session.then(|| [(header::SET_COOKIE, removal_cookie(&config.session))]);
            let response = match format {
                LoginFormat::Form => {
                    let location = format!(
                        "{}?next={}&error={}",
                        config.routes.login_path,
                        encode_query_value(&next),
                        err.error_code()
                    );
                    Redirect::to(&location).into_response()
                }
                LoginFormat::Json => err.into_response(),
            };
            match clear {
                Some(clear) => (clear, response).into_response(),
                None => response,
            }
        }
    }
}

fn parse_login(headers: &HeaderMap, body: &[u8]) -> (LoginFormat, LoginRequest) {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false);

    if is_form {
        let mut login = LoginRequest::default();
        for (name, value) in url::form_urlencoded::parse(body) {
            match name.as_ref() {
                "key" => login.key = Some(value.into_owned()),
                "next" => login.next = Some(value.into_owned()),
                _ => {}
            }
        }
        (LoginFormat::Form, login)
    } else {
        // Unparseable JSON is treated as an empty submission
        (LoginFormat::Json, serde_json::from_slice(body).unwrap_or_default())
    }
}

/// Validate the candidate key locally, then probe the upstream with it.
async fn verify_key(state: &AppState, key: Option<&str>) -> Result<SessionArtifact, ApiError> {
    let artifact = key.and_then(SessionArtifact::new).ok_or(ApiError::MissingKey)?;

    let mut value = HeaderValue::from_str(artifact.as_str())
        .map_err(|_| ApiError::invalid_key("Admin key contains characters that cannot be sent upstream"))?;
    value.set_sensitive(true);

    let upstream = &state.config.upstream;
    let url = format!("{}{}", upstream.base_url, upstream.probe_path);

    let response = state
        .client
        .get(&url)
        .header(ADMIN_KEY_HEADER, value)
        .send()
        .await
        .map_err(|e| {
            tracing::warn!("Login probe could not reach upstream: {}", e);
            ApiError::from(e)
        })?;

    let status = response.status();
    if status.is_success() {
        return Ok(artifact);
    }

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(status = status.as_u16(), "Failed to read login probe body: {}", e);
            Bytes::new()
        }
    };
    let body = UpstreamBody::new(bytes);
    match status.as_u16() {
        401 | 403 => Err(ApiError::auth_rejected(format!(
            "Authentication rejected: {}",
            body.error_message(status)
        ))),
        _ => Err(ApiError::bad_gateway(format!(
            "Upstream probe failed: {}",
            body.error_message(status)
        ))),
    }
}
