//! Booking request route.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use booking_common::error::AppError;
use booking_common::types::BookingRequest;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/book", post(create_booking))
}

/// POST /api/book — Validate a booking, notify staff over Telegram, email the guest.
///
/// Malformed JSON and schema violations return 400 before anything is sent.
/// A failed send is logged and returned as 400 with the sender's error text.
async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let booking = request.validate_into()?;

    if let Err(e) = state.dispatcher.dispatch(&booking).await {
        tracing::error!(
            error = %e,
            property_code = %booking.property_code,
            room_id = %booking.room_id,
            "Booking notification failed"
        );
        return Err(e.into());
    }

    Ok(Json(json!({ "ok": true })))
}
