//! Telegram webhook route for the Confirm/Reject buttons.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use booking_common::error::AppError;
use booking_notifier::callback::Update;

use crate::state::AppState;

/// Header Telegram sets to the `secret_token` given to `setWebhook`.
const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

pub fn router() -> Router<AppState> {
    Router::new().route("/api/telegram/webhook", post(telegram_webhook))
}

/// POST /api/telegram/webhook — Handle a staff button press.
///
/// Calls without the configured secret are refused with 401. Once the
/// secret matches the response is always 200, since any other status makes
/// Telegram redeliver the same update; failures are only logged.
async fn telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Update>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    match (state.webhook_secret.as_deref(), provided) {
        (Some(expected), Some(provided)) if expected == provided => {}
        _ => return Err(AppError::Auth("Invalid webhook secret".to_string())),
    }

    let update = match payload {
        Ok(Json(update)) => update,
        Err(e) => {
            tracing::warn!(error = %e.body_text(), "Ignoring malformed Telegram update");
            return Ok(Json(json!({ "ok": true })));
        }
    };

    match state.dispatcher.handle_callback(&update).await {
        Ok(Some(decision)) => {
            tracing::debug!(update_id = update.update_id, decision = ?decision, "Callback handled");
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(
                error = %e,
                update_id = update.update_id,
                "Booking decision failed"
            );
        }
    }

    Ok(Json(json!({ "ok": true })))
}
