use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};

use super::relay::UpstreamBody;
use super::{strip_hop_by_hop, ADMIN_KEY_HEADER};
use crate::error::ApiError;
use crate::session::SessionArtifact;

/// Everything the gateway needs from one inbound request to call upstream.
#[derive(Debug)]
pub struct ProxiedRequest {
    pub method: Method,
    /// Raw path after the mount prefix, without its leading slash
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Upstream answer, fully buffered.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: UpstreamBody,
}

impl ProxiedRequest {
    /// Split a raw request path into the suffix under `prefix`.
    /// Returns `None` when the path is not under the prefix.
    pub fn suffix_under<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
        let rest = path.strip_prefix(prefix)?;
        if rest.is_empty() {
            Some("")
        } else {
            rest.strip_prefix('/')
        }
    }

    pub fn carries_body(&self) -> bool {
        carries_body(&self.method)
    }
}

pub fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}

/// `base + "/" + path [+ "?" + query]`, with the path left exactly as received.
pub fn target_url(base: &str, path: &str, query: Option<&str>) -> String {
    let mut url = String::with_capacity(base.len() + path.len() + 2);
    url.push_str(base.trim_end_matches('/'));
    url.push('/');
    url.push_str(path);
    if let Some(q) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(q);
    }
    url
}

/// Header set sent upstream.
///
/// Browser cookies and caller-supplied credentials never cross; the only
/// credential forwarded is the one resolved from the session artifact.
pub fn upstream_headers(
    inbound: &HeaderMap,
    method: &Method,
    body_len: usize,
    credential: Option<&SessionArtifact>,
) -> HeaderMap {
    let mut headers = inbound.clone();
    strip_hop_by_hop(&mut headers);

    headers.remove(header::HOST);
    headers.remove(header::COOKIE);
    // Compression is negotiated and decoded by the upstream client
    headers.remove(header::ACCEPT_ENCODING);
    headers.remove(ADMIN_KEY_HEADER);

    if carries_body(method) {
        if body_len > 0 && !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
    } else {
        headers.remove(header::CONTENT_TYPE);
    }

    if let Some(credential) = credential {
        match HeaderValue::from_str(credential.as_str()) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(HeaderName::from_static(ADMIN_KEY_HEADER), value);
            }
            Err(_) => {
                tracing::warn!("Session credential is not a valid header value; forwarding without it");
            }
        }
    }

    headers
}

/// Issue one upstream call for `request`. Upstream error statuses are not
/// errors here; only transport failures are.
pub async fn forward(
    client: &reqwest::Client,
    base_url: &str,
    request: ProxiedRequest,
    credential: Option<&SessionArtifact>,
) -> Result<UpstreamResponse, ApiError> {
    let url = target_url(base_url, &request.path, request.query.as_deref());
    let headers = upstream_headers(&request.headers, &request.method, request.body.len(), credential);

    let mut builder = client.request(request.method.clone(), &url).headers(headers);
    if request.carries_body() {
        builder = builder.body(request.body);
    }

    let response = builder.send().await.map_err(|e| {
        tracing::warn!(method = %request.method, path = %request.path, "Upstream request failed: {}", e);
        ApiError::from(e)
    })?;

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await.map_err(|e| {
        tracing::warn!(method = %request.method, path = %request.path, "Upstream body read failed: {}", e);
        ApiError::from(e)
    })?;

    tracing::debug!(
        method = %request.method,
        path = %request.path,
        status = status.as_u16(),
        bytes = body.len(),
        "Upstream responded"
    );

    Ok(UpstreamResponse {
        status,
        headers,
        body: UpstreamBody::new(body),
    })
}
