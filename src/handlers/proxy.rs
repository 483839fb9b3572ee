// handlers/proxy.rs - ANY <proxy-prefix>/* handler

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderMap},
    response::Response,
};

use http_body_util::LengthLimitError;
use std::error::Error as StdError;

use crate::error::ApiError;
use crate::proxy::{self, forward::carries_body, ProxiedRequest};
use crate::session::resolve_credential;
use crate::state::AppState;

/// ANY <proxy-prefix>/*path - forward to `<upstream>/<path>?<query>`
///
/// The upstream's status, headers (minus transport ones) and body bytes come
/// back unchanged. Only a failure to reach the upstream produces a gateway
/// error (502).
pub async fn forward_any(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    let config = &state.config;
    let (parts, body) = request.into_parts();

    let path = ProxiedRequest::suffix_under(parts.uri.path(), &config.routes.proxy_prefix)
        .ok_or_else(|| ApiError::not_found("Not a proxied path"))?
        .to_string();

    let body = if carries_body(&parts.method) {
        read_body(body, &parts.headers, config.api.max_request_size_bytes).await?
    } else {
        Bytes::new()
    };

    let credential = resolve_credential(&parts.headers, config);
    let proxied = ProxiedRequest {
        method: parts.method,
        path,
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers,
        body,
    };

    let upstream = proxy::forward(&state.client, &config.upstream.base_url, proxied, credential.as_ref()).await?;
    Ok(proxy::relay(upstream, config.api.proxy_cors))
}

/// Buffer the whole inbound body once, bounded by `limit`.
async fn read_body(body: Body, headers: &HeaderMap, limit: usize) -> Result<Bytes, ApiError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(too_large(limit));
    }

    axum::body::to_bytes(body, limit).await.map_err(|e| {
        if exceeded_limit(&e) {
            too_large(limit)
        } else {
            tracing::debug!("Inbound body read failed: {}", e);
            ApiError::bad_request("Failed to read request body")
        }
    })
}

fn exceeded_limit(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

fn too_large(limit: usize) -> ApiError {
    ApiError::payload_too_large(format!("Request body exceeds {} bytes", limit))
}
