use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::forward::UpstreamResponse;
use super::strip_hop_by_hop;

/// Upstream response body kept as opaque bytes. Callers that want structure
/// ask for a typed decode and decide themselves what to do when it fails.
#[derive(Debug, Clone)]
pub struct UpstreamBody(Bytes);

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl UpstreamBody {
    pub fn new(bytes: Bytes) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.0)
    }

    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Best message for a failed upstream call: `error.message`, else the
    /// raw text, else one derived from the status.
    pub fn error_message(&self, status: StatusCode) -> String {
        if let Ok(ErrorEnvelope { error: ErrorDetail { message: Some(message) } }) = self.decode::<ErrorEnvelope>() {
            if !message.trim().is_empty() {
                return message;
            }
        }
        match self.text().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => format!("HTTP {}", status.as_u16()),
        }
    }
}

/// Turn a buffered upstream response into the response for the caller.
/// Status and body bytes are exact.
pub fn relay(upstream: UpstreamResponse, allow_any_origin: bool) -> Response {
    let UpstreamResponse { status, mut headers, body } = upstream;

    strip_hop_by_hop(&mut headers);
    // Body is already decoded in memory
    headers.remove(header::CONTENT_ENCODING);
    // Upstream cookies belong to the upstream origin
    headers.remove(header::SET_COOKIE);

    if allow_any_origin {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }

    let mut response = Response::new(Body::from(body.into_bytes()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    fn upstream(status: StatusCode, headers: HeaderMap, body: &'static [u8]) -> UpstreamResponse {
        UpstreamResponse {
            status,
            headers,
            body: UpstreamBody::new(Bytes::from_static(body)),
        }
    }

    #[tokio::test]
    async fn relay_is_exact() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::SET_COOKIE, HeaderValue::from_static("upstream=1"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert("x-upstream-trace", HeaderValue::from_static("t-9"));

        let raw: &'static [u8] = br#"{"b":1.50,"a":[2,1]}"#;
        let response = relay(upstream(StatusCode::UNPROCESSABLE_ENTITY, headers, raw), false);

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert!(response.headers().get(header::TRANSFER_ENCODING).is_none());
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(response.headers().get("x-upstream-trace").unwrap(), "t-9");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], raw);
    }

    #[test]
    fn relay_adds_cors_when_enabled() {
        let response = relay(upstream(StatusCode::OK, HeaderMap::new(), b""), true);
        assert_eq!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    }

    #[test]
    fn error_message_prefers_structured() {
        let body = UpstreamBody::new(Bytes::from_static(br#"{"ok":false,"error":{"message":"UNAUTHORIZED"}}"#));
        assert_eq!(body.error_message(StatusCode::UNAUTHORIZED), "UNAUTHORIZED");
    }

    #[test]
    fn error_message_falls_back_to_text_then_status() {
        let text = UpstreamBody::new(Bytes::from_static(b"upstream exploded"));
        assert_eq!(text.error_message(StatusCode::INTERNAL_SERVER_ERROR), "upstream exploded");

        let empty = UpstreamBody::new(Bytes::new());
        assert_eq!(empty.error_message(StatusCode::SERVICE_UNAVAILABLE), "HTTP 503");
    }
}
