use axum::{
    Json, Router, extract::State, extract::rejection::JsonRejection, http::StatusCode,
    routing::post,
};
use tracing::instrument;

use super::error::{ErrorResponse, require};
use crate::AppState;
use api_types::{
    CreatePullRequestRequest, MergePullRequestRequest, PullRequestResponse,
    ReassignReviewerRequest, ReassignReviewerResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pullRequest/create", post(create_pull_request))
        .route("/pullRequest/merge", post(merge_pull_request))
        .route("/pullRequest/reassign", post(reassign_reviewer))
}

#[instrument(name = "pull_requests.create_pull_request", skip(state, payload))]
async fn create_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequestResponse>), ErrorResponse> {
    let Json(payload) = payload?;
    require("pull_request_id", &payload.pull_request_id)?;
    require("pull_request_name", &payload.pull_request_name)?;
    require("author_id", &payload.author_id)?;

    let pr = state
        .engine()
        .create_pull_request(
            &payload.pull_request_id,
            &payload.pull_request_name,
            &payload.author_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr })))
}

#[instrument(name = "pull_requests.merge_pull_request", skip(state, payload))]
async fn merge_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> Result<Json<PullRequestResponse>, ErrorResponse> {
    let Json(payload) = payload?;
    require("pull_request_id", &payload.pull_request_id)?;

    let pr = state
        .engine()
        .merge_pull_request(&payload.pull_request_id)
        .await?;

    Ok(Json(PullRequestResponse { pr }))
}

#[instrument(name = "pull_requests.reassign_reviewer", skip(state, payload))]
async fn reassign_reviewer(
    State(state): State<AppState>,
    payload: Result<Json<ReassignReviewerRequest>, JsonRejection>,
) -> Result<Json<ReassignReviewerResponse>, ErrorResponse> {
    let Json(payload) = payload?;
    require("pull_request_id", &payload.pull_request_id)?;
    require("old_user_id", &payload.old_user_id)?;

    let reassignment = state
        .engine()
        .reassign_reviewer(&payload.pull_request_id, &payload.old_user_id)
        .await?;

    Ok(Json(ReassignReviewerResponse {
        pr: reassignment.pull_request,
        replaced_by: reassignment.replaced_by,
    }))
}
