//! Writes TypeScript declarations for the API types.
//!
//! Usage: `generate-types [OUTPUT]` (defaults to `shared/types.ts`).

use std::{env, fs, path::PathBuf};

use api_types::{
    CreatePullRequestRequest, ErrorBody, ErrorDetail, HealthResponse, MergePullRequestRequest,
    PullRequest, PullRequestResponse, PullRequestShort, PullRequestStatus,
    ReassignReviewerRequest, ReassignReviewerResponse, SetUserActiveRequest, Stats, Team,
    TeamMember, TeamResponse, User, UserResponse, UserReviewStat, UserReviewsResponse,
};
use ts_rs::TS;

fn declarations() -> Vec<String> {
    vec![
        PullRequestStatus::decl(),
        PullRequest::decl(),
        PullRequestShort::decl(),
        CreatePullRequestRequest::decl(),
        MergePullRequestRequest::decl(),
        ReassignReviewerRequest::decl(),
        PullRequestResponse::decl(),
        ReassignReviewerResponse::decl(),
        User::decl(),
        SetUserActiveRequest::decl(),
        UserResponse::decl(),
        UserReviewsResponse::decl(),
        TeamMember::decl(),
        Team::decl(),
        TeamResponse::decl(),
        UserReviewStat::decl(),
        Stats::decl(),
        ErrorDetail::decl(),
        ErrorBody::decl(),
        HealthResponse::decl(),
    ]
}

fn main() -> anyhow::Result<()> {
    let output = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("shared/types.ts"));

    let mut contents = String::from(
        "// This file was generated by `generate-types`. Do not edit it by hand.\n\n",
    );
    for decl in declarations() {
        contents.push_str("export ");
        contents.push_str(&decl);
        contents.push_str("\n\n");
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, contents)?;
    println!("wrote {}", output.display());

    Ok(())
}
