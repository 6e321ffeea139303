//! Storage abstraction for the assignment engine.
//!
//! The engine only talks to the `PullRequestStore` and `DirectoryStore` traits.
//! `PgStore` (see `crate::db`) backs them with PostgreSQL; `InMemoryStore` keeps
//! everything behind `RwLock`s and is used by tests and `STORE_BACKEND=memory`.

mod memory;

pub use memory::InMemoryStore;

use api_types::{PullRequest, PullRequestShort, User, UserReviewStat};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("record already exists")]
    AlreadyExists,
    #[error("stale version: record was modified concurrently")]
    VersionConflict,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Snapshot of pull request counts, read atomically so that
/// `total == open + merged` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: i64,
    pub open: i64,
    pub merged: i64,
}

#[async_trait]
pub trait PullRequestStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<PullRequest>, StoreError>;

    /// Insert a new pull request. Fails with `AlreadyExists` on an id collision.
    async fn create(&self, pr: &PullRequest) -> Result<(), StoreError>;

    /// Conditionally write status, reviewers and merge timestamp.
    ///
    /// The write only applies when the stored version equals `pr.version`.
    /// Returns the new version. Fails with `NotFound` when no such record exists
    /// and `VersionConflict` when the stored version moved on.
    async fn update(&self, pr: &PullRequest) -> Result<i64, StoreError>;

    /// Pull requests whose reviewer list contains `reviewer_id`, oldest first.
    async fn list_by_reviewer(&self, reviewer_id: &str)
    -> Result<Vec<PullRequestShort>, StoreError>;

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError>;

    /// Number of pull requests (any status) listing each reviewer, ordered by user id.
    async fn count_assignments_by_reviewer(&self) -> Result<Vec<UserReviewStat>, StoreError>;
}

#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user. Fails with `AlreadyExists` on an id collision.
    async fn create_user(&self, user: &User) -> Result<(), StoreError>;

    /// Overwrite username, team and activity. Fails with `NotFound` for unknown ids.
    async fn update_user(&self, user: &User) -> Result<(), StoreError>;

    async fn list_active_users_by_team(&self, team_name: &str) -> Result<Vec<User>, StoreError>;

    async fn list_users_by_team(&self, team_name: &str) -> Result<Vec<User>, StoreError>;

    /// Returns the team name when the team is registered.
    async fn find_team(&self, team_name: &str) -> Result<Option<String>, StoreError>;

    /// Register `team_name` and upsert every member in one atomic step.
    ///
    /// Fails with `AlreadyExists` when the team is already registered, in which
    /// case no member is touched.
    async fn create_team(&self, team_name: &str, members: &[User]) -> Result<(), StoreError>;
}
