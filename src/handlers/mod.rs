// handlers/mod.rs - Gateway handlers
//
// public: health and session issuance, never gated
// proxy:  transparent forwarding to the upstream API under the proxy prefix

pub mod proxy;
pub mod public;

pub use proxy::forward_any;
pub use public::*;

use crate::error::ApiError;

/// Fallback when no UI is mounted
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
