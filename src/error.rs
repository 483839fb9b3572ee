// Gateway error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// Failure raised by the gateway itself, as opposed to an upstream
/// response, which is always relayed untouched.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    MissingKey,
    InvalidKey(String),

    // 401 Unauthorized
    AuthRejected(String),

    // 404 Not Found
    NotFound(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (upstream answered, but not usefully)
    BadGateway(String),

    // 502 Bad Gateway (upstream never answered)
    UpstreamUnreachable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::MissingKey | ApiError::InvalidKey(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::AuthRejected(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) | ApiError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::MissingKey => "Admin key is required",
            ApiError::BadRequest(msg)
            | ApiError::InvalidKey(msg)
            | ApiError::AuthRejected(msg)
            | ApiError::NotFound(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::BadGateway(msg)
            | ApiError::UpstreamUnreachable(msg) => msg,
        }
    }

    /// Error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::MissingKey => "MISSING_KEY",
            ApiError::InvalidKey(_) => "INVALID_KEY",
            ApiError::AuthRejected(_) => "AUTH_REJECTED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::UpstreamUnreachable(_) => "UPSTREAM_UNREACHABLE",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "ok": false,
            "error": {
                "message": self.message(),
                "code": self.error_code()
            }
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_key(message: impl Into<String>) -> Self {
        ApiError::InvalidKey(message.into())
    }

    pub fn auth_rejected(message: impl Into<String>) -> Self {
        ApiError::AuthRejected(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn upstream_unreachable(message: impl Into<String>) -> Self {
        ApiError::UpstreamUnreachable(message.into())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            // A URL or header we assembled was rejected before anything hit the wire
            tracing::error!("Failed to build upstream request: {}", err);
            return ApiError::internal_server_error("Failed to build upstream request");
        }
        let reason = if err.is_timeout() {
            "timed out"
        } else if err.is_connect() {
            "connection failed"
        } else if err.is_body() || err.is_decode() {
            "response body could not be read"
        } else {
            "request failed"
        };
        ApiError::upstream_unreachable(format!("Could not reach upstream: {}", reason))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
