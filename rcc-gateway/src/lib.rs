//! Router construction shared between the `rcc-gateway` binary and its
//! integration tests.

pub mod api;
pub mod error;
pub mod sse;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(api::health))
        .route("/api/v1/capabilities", get(api::capabilities))
        .route("/api/v1/radios", get(api::list_radios))
        .route("/api/v1/radios/select", post(api::select_radio))
        .route("/api/v1/radios/:id", get(api::get_radio))
        .route("/api/v1/radios/:id/power", get(api::get_power).post(api::set_power))
        .route(
            "/api/v1/radios/:id/channel",
            get(api::get_channel).post(api::set_channel),
        )
        .route("/api/v1/telemetry", get(sse::telemetry))
        .with_state(state)
}
