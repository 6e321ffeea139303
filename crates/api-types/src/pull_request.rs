use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use ts_rs::TS;

/// Lifecycle of a pull request. `Merged` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, TS)]
#[sqlx(type_name = "pull_request_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestStatus {
    Open,
    Merged,
}

/// A pull request together with its ordered reviewer slots.
///
/// The position of a reviewer in `assigned_reviewers` identifies the slot that a
/// reassignment replaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, TS)]
pub struct PullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
    pub assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "mergedAt", default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub merged_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency token, bumped on every stored update.
    #[serde(skip)]
    #[ts(skip)]
    pub version: i64,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.status == PullRequestStatus::Merged
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.assigned_reviewers.iter().any(|id| id == user_id)
    }
}

/// Summary row returned when listing the pull requests a reviewer is assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, TS)]
pub struct PullRequestShort {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
}

impl From<&PullRequest> for PullRequestShort {
    fn from(pr: &PullRequest) -> Self {
        Self {
            pull_request_id: pr.pull_request_id.clone(),
            pull_request_name: pr.pull_request_name.clone(),
            author_id: pr.author_id.clone(),
            status: pr.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreatePullRequestRequest {
    #[serde(default)]
    pub pull_request_id: String,
    #[serde(default)]
    pub pull_request_name: String,
    #[serde(default)]
    pub author_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct MergePullRequestRequest {
    #[serde(default)]
    pub pull_request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ReassignReviewerRequest {
    #[serde(default)]
    pub pull_request_id: String,
    #[serde(default)]
    pub old_user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct PullRequestResponse {
    pub pr: PullRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ReassignReviewerResponse {
    pub pr: PullRequest,
    pub replaced_by: String,
}
