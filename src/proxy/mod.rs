//! Reverse-proxy core: request forwarding and response relaying.

pub mod forward;
pub mod relay;

use axum::http::{header, HeaderMap, HeaderName};

pub use forward::{forward, target_url, upstream_headers, ProxiedRequest, UpstreamResponse};
pub use relay::{relay, UpstreamBody};

/// Header carrying the admin credential to the upstream API.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

const HOP_BY_HOP: [&str; 4] = ["keep-alive", "proxy-connection", "te", "trailer"];

/// Remove connection-scoped headers, including any named by `Connection`,
/// plus `Content-Length` since bodies are re-framed on each side.
pub(crate) fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in named {
        headers.remove(name);
    }

    headers.remove(header::CONNECTION);
    headers.remove(header::TRANSFER_ENCODING);
    headers.remove(header::UPGRADE);
    headers.remove(header::CONTENT_LENGTH);
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}
