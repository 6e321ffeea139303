use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};
use tracing::instrument;

use super::error::{ErrorResponse, require};
use crate::AppState;
use api_types::{SetUserActiveRequest, UserResponse, UserReviewsQuery, UserReviewsResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/setIsActive", post(set_is_active))
        .route("/users/getReview", get(get_review))
}

#[instrument(name = "users.set_is_active", skip(state, payload))]
async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetUserActiveRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ErrorResponse> {
    let Json(payload) = payload?;
    require("user_id", &payload.user_id)?;

    let user = state
        .directory()
        .set_user_active(&payload.user_id, payload.is_active)
        .await?;

    Ok(Json(UserResponse { user }))
}

#[instrument(name = "users.get_review", skip(state, query))]
async fn get_review(
    State(state): State<AppState>,
    query: Result<Query<UserReviewsQuery>, QueryRejection>,
) -> Result<Json<UserReviewsResponse>, ErrorResponse> {
    let Query(query) = query?;
    require("user_id", &query.user_id)?;

    let pull_requests = state.engine().list_for_reviewer(&query.user_id).await?;

    Ok(Json(UserReviewsResponse {
        user_id: query.user_id,
        pull_requests,
    }))
}
