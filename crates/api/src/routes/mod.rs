pub mod bookings;
pub mod health;
pub mod telegram;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(bookings::router())
        .merge(telegram::router())
        .with_state(state)
}
