//! Session artifact handling.
//!
//! The admin credential lives only in an HTTP-only cookie held by the browser.
//! There is no server-side session table: whatever the cookie carries is the
//! identity forwarded upstream.

pub mod cookies;

use axum::http::HeaderMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::{GatewayConfig, SessionConfig};

pub use cookies::{find_cookie, removal_cookie, session_cookie};

/// Non-empty admin credential read from the session cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionArtifact(String);

impl SessionArtifact {
    pub fn from_headers(headers: &HeaderMap, config: &SessionConfig) -> Option<Self> {
        find_cookie(headers, &config.cookie_name).and_then(Self::new)
    }

    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionArtifact(<redacted>)")
    }
}

/// Credential to forward upstream: the session cookie, else the configured default.
pub fn resolve_credential(headers: &HeaderMap, config: &GatewayConfig) -> Option<SessionArtifact> {
    SessionArtifact::from_headers(headers, &config.session)
        .or_else(|| config.upstream.default_key.clone().and_then(SessionArtifact::new))
}

/// Accept `next` only when it stays on this origin.
pub fn safe_next<'a>(next: Option<&'a str>, default: &'a str) -> &'a str {
    match next {
        Some(candidate) if is_local_path(candidate) => candidate,
        _ => default,
    }
}

fn is_local_path(candidate: &str) -> bool {
    candidate.starts_with('/')
        && !candidate.starts_with("//")
        && !candidate.contains('\\')
        && !candidate.chars().any(|c| c.is_control())
}

/// Characters escaped in a query value. `/` stays readable.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Escape a path so it survives as a single query parameter value.
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    fn headers_with_cookie(raw: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(raw));
        headers
    }

    #[test]
    fn artifact_present() {
        let config = GatewayConfig::for_upstream("http://upstream.test").unwrap();
        let headers = headers_with_cookie("admin_key=abc123");
        let artifact = SessionArtifact::from_headers(&headers, &config.session).unwrap();
        assert_eq!(artifact.as_str(), "abc123");
    }

    #[test]
    fn empty_artifact_is_absent() {
        let config = GatewayConfig::for_upstream("http://upstream.test").unwrap();
        let headers = headers_with_cookie("admin_key=");
        assert!(SessionArtifact::from_headers(&headers, &config.session).is_none());
        assert!(resolve_credential(&headers, &config).is_none());
    }

    #[test]
    fn default_key_only_without_cookie() {
        let mut config = GatewayConfig::for_upstream("http://upstream.test").unwrap();
        config.upstream.default_key = Some("fallback".to_string());

        let none = HeaderMap::new();
        assert_eq!(resolve_credential(&none, &config).unwrap().as_str(), "fallback");

        let with_cookie = headers_with_cookie("admin_key=abc123");
        assert_eq!(resolve_credential(&with_cookie, &config).unwrap().as_str(), "abc123");
    }

    #[test]
    fn debug_does_not_leak() {
        let artifact = SessionArtifact::new("secret").unwrap();
        assert!(!format!("{:?}", artifact).contains("secret"));
    }

    #[test]
    fn next_must_be_local() {
        assert_eq!(safe_next(Some("/admin/cases"), "/admin/inbox"), "/admin/cases");
        assert_eq!(safe_next(Some("//evil.example"), "/admin/inbox"), "/admin/inbox");
        assert_eq!(safe_next(Some("https://evil.example"), "/admin/inbox"), "/admin/inbox");
        assert_eq!(safe_next(Some("/\\evil.example"), "/admin/inbox"), "/admin/inbox");
        assert_eq!(safe_next(Some("/admin\r\nx"), "/admin/inbox"), "/admin/inbox");
        assert_eq!(safe_next(None, "/admin/inbox"), "/admin/inbox");
    }

    #[test]
    fn query_value_escaping_keeps_slashes() {
        assert_eq!(encode_query_value("/admin/cases"), "/admin/cases");
        assert_eq!(encode_query_value("/admin/a&b"), "/admin/a%26b");
        assert_eq!(encode_query_value("/admin/café"), "/admin/caf%C3%A9");
    }

    #[test]
    fn query_value_round_trips_percent() {
        let original = "/admin/case/a%2Fb?x=1";
        let query = format!("next={}", encode_query_value(original));
        let decoded: Vec<_> = url::form_urlencoded::parse(query.as_bytes()).collect();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].1, original);
    }
}
