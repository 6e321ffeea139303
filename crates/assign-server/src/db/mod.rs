//! PostgreSQL persistence.
//!
//! Repositories follow the usual shape: stateless structs whose functions take a
//! pool (or executor) and return a per-table error. `PgStore` adapts them to the
//! engine-facing store traits.

pub mod pull_requests;
pub mod teams;
pub mod users;

use api_types::{PullRequest, PullRequestShort, User, UserReviewStat};
use async_trait::async_trait;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};

use self::{
    pull_requests::{PullRequestError, PullRequestRepository},
    teams::{TeamError, TeamRepository},
    users::{UserError, UserRepository},
};
use crate::store::{DirectoryStore, PullRequestStore, StatusCounts, StoreError};

pub async fn create_pool(
    options: PgConnectOptions,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

impl From<PullRequestError> for StoreError {
    fn from(error: PullRequestError) -> Self {
        match error {
            PullRequestError::Database(error) => StoreError::Database(error),
            PullRequestError::AlreadyExists => StoreError::AlreadyExists,
            PullRequestError::NotFound => StoreError::NotFound,
            PullRequestError::StaleVersion => StoreError::VersionConflict,
        }
    }
}

impl From<UserError> for StoreError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::Database(error) => StoreError::Database(error),
            UserError::NotFound => StoreError::NotFound,
            UserError::AlreadyExists => StoreError::AlreadyExists,
        }
    }
}

impl From<TeamError> for StoreError {
    fn from(error: TeamError) -> Self {
        match error {
            TeamError::Database(error) => StoreError::Database(error),
            TeamError::AlreadyExists => StoreError::AlreadyExists,
            TeamError::User(error) => error.into(),
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PullRequestStore for PgStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<PullRequest>, StoreError> {
        Ok(PullRequestRepository::find_by_id(&self.pool, id).await?)
    }

    async fn create(&self, pr: &PullRequest) -> Result<(), StoreError> {
        Ok(PullRequestRepository::create(&self.pool, pr).await?)
    }

    async fn update(&self, pr: &PullRequest) -> Result<i64, StoreError> {
        Ok(PullRequestRepository::update(&self.pool, pr).await?)
    }

    async fn list_by_reviewer(
        &self,
        reviewer_id: &str,
    ) -> Result<Vec<PullRequestShort>, StoreError> {
        Ok(PullRequestRepository::list_by_reviewer(&self.pool, reviewer_id).await?)
    }

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError> {
        let (total, open, merged) = PullRequestRepository::count_by_status(&self.pool).await?;
        Ok(StatusCounts {
            total,
            open,
            merged,
        })
    }

    async fn count_assignments_by_reviewer(&self) -> Result<Vec<UserReviewStat>, StoreError> {
        Ok(PullRequestRepository::count_assignments_by_reviewer(&self.pool).await?)
    }
}

#[async_trait]
impl DirectoryStore for PgStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepository::find_by_id(&self.pool, user_id).await?)
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        Ok(UserRepository::create(&self.pool, user).await?)
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        Ok(UserRepository::update(&self.pool, user).await?)
    }

    async fn list_active_users_by_team(&self, team_name: &str) -> Result<Vec<User>, StoreError> {
        Ok(UserRepository::list_by_team(&self.pool, team_name, true).await?)
    }

    async fn list_users_by_team(&self, team_name: &str) -> Result<Vec<User>, StoreError> {
        Ok(UserRepository::list_by_team(&self.pool, team_name, false).await?)
    }

    async fn find_team(&self, team_name: &str) -> Result<Option<String>, StoreError> {
        Ok(TeamRepository::find_by_name(&self.pool, team_name).await?)
    }

    async fn create_team(&self, team_name: &str, members: &[User]) -> Result<(), StoreError> {
        Ok(TeamRepository::create_with_members(&self.pool, team_name, members).await?)
    }
}
