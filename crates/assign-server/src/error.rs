use std::fmt;

use thiserror::Error;

use crate::store::StoreError;

/// Entity referenced by a `NotFound` or `AlreadyExists` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    PullRequest,
    User,
    Team,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::PullRequest => "pull request",
            Entity::User => "user",
            Entity::Team => "team",
        })
    }
}

/// Every failure the engine and directory services can report.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(Entity),
    #[error("{0} already exists")]
    AlreadyExists(Entity),
    #[error("pull request already merged")]
    PullRequestMerged,
    #[error("reviewer not assigned to pull request")]
    NotAssigned,
    #[error("no active candidate available for review")]
    NoCandidate,
    #[error("pull request was modified concurrently")]
    Conflict,
    #[error("internal store error: {0}")]
    Internal(#[from] StoreError),
}

impl ServiceError {
    /// Classify a store error raised while writing `entity`.
    pub(crate) fn from_store(entity: Entity, error: StoreError) -> Self {
        match error {
            StoreError::NotFound => ServiceError::NotFound(entity),
            StoreError::AlreadyExists => ServiceError::AlreadyExists(entity),
            StoreError::VersionConflict => ServiceError::Conflict,
            other => ServiceError::Internal(other),
        }
    }
}
