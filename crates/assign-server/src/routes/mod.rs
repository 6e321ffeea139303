use axum::{Json, Router, routing::get};
use api_types::HealthResponse;

use crate::AppState;

pub mod error;
pub mod pull_requests;
pub mod stats;
pub mod teams;
pub mod users;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(teams::router())
        .merge(users::router())
        .merge(pull_requests::router())
        .merge(stats::router())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
