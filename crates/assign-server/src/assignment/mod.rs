//! Reviewer assignment engine.
//!
//! Creates pull requests with an initial reviewer sample, replaces a single
//! reviewer slot on request, and merges. All reads and writes go through the
//! injected stores; randomness comes from the injected `RandomSource`.

pub mod sampling;

use std::sync::Arc;

use api_types::{PullRequest, PullRequestShort, PullRequestStatus};
use chrono::Utc;
use tracing::instrument;

use self::sampling::{RandomSource, pick_one, sample};
use crate::{
    error::{Entity, ServiceError},
    store::{DirectoryStore, PullRequestStore, StoreError},
};

/// Reviewers drawn for a freshly created pull request.
pub const MAX_INITIAL_REVIEWERS: usize = 2;

#[derive(Debug, Clone)]
pub struct Reassignment {
    pub pull_request: PullRequest,
    pub replaced_by: String,
}

#[derive(Clone)]
pub struct AssignmentEngine {
    pull_requests: Arc<dyn PullRequestStore>,
    directory: Arc<dyn DirectoryStore>,
    random: Arc<dyn RandomSource>,
}

impl AssignmentEngine {
    pub fn new(
        pull_requests: Arc<dyn PullRequestStore>,
        directory: Arc<dyn DirectoryStore>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            pull_requests,
            directory,
            random,
        }
    }

    #[instrument(
        name = "assignment.create_pull_request",
        skip(self, title),
        fields(pull_request_id = %id, author_id = %author_id)
    )]
    pub async fn create_pull_request(
        &self,
        id: &str,
        title: &str,
        author_id: &str,
    ) -> Result<PullRequest, ServiceError> {
        if self.pull_requests.find_by_id(id).await?.is_some() {
            return Err(ServiceError::AlreadyExists(Entity::PullRequest));
        }

        let author = self
            .directory
            .find_user(author_id)
            .await?
            .ok_or(ServiceError::NotFound(Entity::User))?;

        self.directory
            .find_team(&author.team_name)
            .await?
            .ok_or(ServiceError::NotFound(Entity::Team))?;

        let candidates: Vec<String> = self
            .directory
            .list_active_users_by_team(&author.team_name)
            .await?
            .into_iter()
            .filter(|user| user.user_id != author.user_id)
            .map(|user| user.user_id)
            .collect();

        let reviewers = sample(candidates, MAX_INITIAL_REVIEWERS, self.random.as_ref());

        let pr = PullRequest {
            pull_request_id: id.to_string(),
            pull_request_name: title.to_string(),
            author_id: author.user_id,
            status: PullRequestStatus::Open,
            assigned_reviewers: reviewers,
            created_at: Utc::now(),
            merged_at: None,
            version: 0,
        };

        self.pull_requests
            .create(&pr)
            .await
            .map_err(|error| ServiceError::from_store(Entity::PullRequest, error))?;

        tracing::info!(reviewers = ?pr.assigned_reviewers, "pull request created");

        Ok(pr)
    }

    /// Merge is idempotent: an already merged pull request is returned untouched,
    /// including when another merge lands between our read and our write.
    #[instrument(name = "assignment.merge_pull_request", skip(self), fields(pull_request_id = %id))]
    pub async fn merge_pull_request(&self, id: &str) -> Result<PullRequest, ServiceError> {
        let mut pr = self
            .pull_requests
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(Entity::PullRequest))?;

        if pr.is_merged() {
            return Ok(pr);
        }

        pr.status = PullRequestStatus::Merged;
        pr.merged_at = Some(Utc::now());
        match self.pull_requests.update(&pr).await {
            Ok(version) => pr.version = version,
            // A concurrent merge won the race; its result is ours too.
            Err(StoreError::VersionConflict) => {
                let current = self
                    .pull_requests
                    .find_by_id(id)
                    .await?
                    .ok_or(ServiceError::NotFound(Entity::PullRequest))?;
                if current.is_merged() {
                    return Ok(current);
                }
                return Err(ServiceError::Conflict);
            }
            Err(error) => return Err(ServiceError::from_store(Entity::PullRequest, error)),
        }

        tracing::info!("pull request merged");

        Ok(pr)
    }

    /// Replace `old_reviewer_id` with a random eligible teammate, in the same slot.
    ///
    /// Candidates come from the departing reviewer's team, not the author's.
    /// This is intended: reviewer pools follow the reviewer being replaced so a
    /// cross-team reviewer is substituted by someone from that same team.
    ///
    /// The write is version-checked. If another request changed the pull request
    /// between our read and our write, the call fails with `Conflict` and
    /// nothing is stored.
    #[instrument(
        name = "assignment.reassign_reviewer",
        skip(self),
        fields(pull_request_id = %id, old_reviewer_id = %old_reviewer_id)
    )]
    pub async fn reassign_reviewer(
        &self,
        id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment, ServiceError> {
        let mut pr = self
            .pull_requests
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(Entity::PullRequest))?;

        if pr.is_merged() {
            return Err(ServiceError::PullRequestMerged);
        }

        let slot = pr
            .assigned_reviewers
            .iter()
            .position(|reviewer| reviewer == old_reviewer_id)
            .ok_or(ServiceError::NotAssigned)?;

        let departing = self
            .directory
            .find_user(old_reviewer_id)
            .await?
            .ok_or(ServiceError::NotFound(Entity::User))?;

        let candidates: Vec<String> = self
            .directory
            .list_active_users_by_team(&departing.team_name)
            .await?
            .into_iter()
            .map(|user| user.user_id)
            .filter(|user_id| {
                *user_id != departing.user_id && *user_id != pr.author_id && !pr.has_reviewer(user_id)
            })
            .collect();

        let replacement =
            pick_one(candidates, self.random.as_ref()).ok_or(ServiceError::NoCandidate)?;

        pr.assigned_reviewers[slot] = replacement.clone();
        pr.version = self
            .pull_requests
            .update(&pr)
            .await
            .map_err(|error| ServiceError::from_store(Entity::PullRequest, error))?;

        tracing::info!(new_reviewer_id = %replacement, slot, "reviewer reassigned");

        Ok(Reassignment {
            pull_request: pr,
            replaced_by: replacement,
        })
    }

    #[instrument(name = "assignment.list_for_reviewer", skip(self), fields(user_id = %user_id))]
    pub async fn list_for_reviewer(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequestShort>, ServiceError> {
        self.directory
            .find_user(user_id)
            .await?
            .ok_or(ServiceError::NotFound(Entity::User))?;

        Ok(self.pull_requests.list_by_reviewer(user_id).await?)
    }
}
