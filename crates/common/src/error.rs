use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced at the HTTP boundary.
///
/// Every variant renders the same `{ "ok": false, "error": ... }` body so
/// callers see one failure shape regardless of where the request failed.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    /// A chat or email send failed; carries the underlying error text.
    #[error("{0}")]
    Delivery(String),

    /// Caller failed the webhook secret check.
    #[error("{0}")]
    Auth(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) | AppError::Delivery(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
        };

        let body = json!({ "ok": false, "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
