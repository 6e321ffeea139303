use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use super::error::ErrorResponse;
use crate::AppState;
use api_types::Stats;

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}

#[instrument(name = "stats.get_stats", skip(state))]
async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>, ErrorResponse> {
    Ok(Json(state.stats().get().await?))
}
