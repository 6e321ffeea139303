use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use super::error::{ErrorResponse, require};
use crate::AppState;
use api_types::{CreateTeamRequest, Team, TeamQuery, TeamResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/team/add", post(create_team))
        .route("/team/get", get(get_team))
}

#[instrument(name = "teams.create_team", skip(state, payload))]
async fn create_team(
    State(state): State<AppState>,
    payload: Result<Json<CreateTeamRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamResponse>), ErrorResponse> {
    let Json(payload) = payload?;
    require("team_name", &payload.team_name)?;
    for member in &payload.members {
        require("user_id", &member.user_id)?;
    }

    let team = state
        .directory()
        .create_team(&payload.team_name, payload.members)
        .await?;

    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

#[instrument(name = "teams.get_team", skip(state, query))]
async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<Team>, ErrorResponse> {
    let Query(query) = query?;
    require("team_name", &query.team_name)?;

    let team = state.directory().get_team(&query.team_name).await?;

    Ok(Json(team))
}
