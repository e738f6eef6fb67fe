// --- File: crates/elements_booking/src/routes.rs ---

use crate::handlers::{
    availability_handler, callback_url_handler, home_handler, real_time_schedule_click_handler,
    submit_handler, BookingState,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// All page and API routes of the demo. Static files are mounted by the binary.
pub fn routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/availability", get(availability_handler))
        .route("/real-time-schedule-click", post(real_time_schedule_click_handler))
        .route("/submit", get(submit_handler))
        .route("/callback-url", post(callback_url_handler))
        .with_state(state)
}
