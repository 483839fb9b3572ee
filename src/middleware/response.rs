use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Success envelope for gateway-originated responses: `{ "ok": true[, "data": ...] }`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl ApiResponse<()> {
    /// Bare `{ "ok": true }`
    pub fn ok() -> Self {
        Self { data: () }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "ok": false,
                        "error": {
                            "message": "Failed to serialize response data",
                            "code": "INTERNAL_SERVER_ERROR"
                        }
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = json!({ "ok": true });
        if !data_value.is_null() {
            envelope["data"] = data_value;
        }

        (StatusCode::OK, Json::<Value>(envelope)).into_response()
    }
}
