use api_types::{PullRequest, PullRequestShort, PullRequestStatus, UserReviewStat};
use sqlx::PgPool;
use thiserror::Error;

use super::is_unique_violation;

#[derive(Debug, Error)]
pub enum PullRequestError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("pull request already exists")]
    AlreadyExists,
    #[error("pull request not found")]
    NotFound,
    #[error("pull request version is stale")]
    StaleVersion,
}

#[derive(Debug, sqlx::FromRow)]
struct StatusCountRow {
    total: i64,
    open: i64,
    merged: i64,
}

pub struct PullRequestRepository;

impl PullRequestRepository {
    pub async fn find_by_id(
        pool: &PgPool,
        id: &str,
    ) -> Result<Option<PullRequest>, PullRequestError> {
        let record = sqlx::query_as::<_, PullRequest>(
            r#"
            SELECT
                pull_request_id,
                pull_request_name,
                author_id,
                status,
                assigned_reviewers,
                created_at,
                merged_at,
                version
            FROM pull_requests
            WHERE pull_request_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn create(pool: &PgPool, pr: &PullRequest) -> Result<(), PullRequestError> {
        sqlx::query(
            r#"
            INSERT INTO pull_requests (
                pull_request_id, pull_request_name, author_id, status,
                assigned_reviewers, created_at, merged_at, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(&pr.pull_request_name)
        .bind(&pr.author_id)
        .bind(pr.status)
        .bind(&pr.assigned_reviewers)
        .bind(pr.created_at)
        .bind(pr.merged_at)
        .bind(pr.version)
        .execute(pool)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                PullRequestError::AlreadyExists
            } else {
                PullRequestError::Database(error)
            }
        })?;

        Ok(())
    }

    /// Compare-and-swap update keyed by id and version.
    ///
    /// Zero affected rows is disambiguated by a second lookup: a missing row is
    /// `NotFound`, an existing one means another writer got there first.
    pub async fn update(pool: &PgPool, pr: &PullRequest) -> Result<i64, PullRequestError> {
        let version = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE pull_requests
            SET
                status = $2,
                assigned_reviewers = $3,
                merged_at = $4,
                version = version + 1
            WHERE pull_request_id = $1 AND version = $5
            RETURNING version
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(pr.status)
        .bind(&pr.assigned_reviewers)
        .bind(pr.merged_at)
        .bind(pr.version)
        .fetch_optional(pool)
        .await?;

        if let Some(version) = version {
            return Ok(version);
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM pull_requests WHERE pull_request_id = $1)",
        )
        .bind(&pr.pull_request_id)
        .fetch_one(pool)
        .await?;

        if exists {
            Err(PullRequestError::StaleVersion)
        } else {
            Err(PullRequestError::NotFound)
        }
    }

    pub async fn list_by_reviewer(
        pool: &PgPool,
        reviewer_id: &str,
    ) -> Result<Vec<PullRequestShort>, PullRequestError> {
        let records = sqlx::query_as::<_, PullRequestShort>(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status
            FROM pull_requests
            WHERE $1 = ANY(assigned_reviewers)
            ORDER BY created_at, pull_request_id
            "#,
        )
        .bind(reviewer_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Total, open and merged counts from a single statement snapshot.
    pub async fn count_by_status(pool: &PgPool) -> Result<(i64, i64, i64), PullRequestError> {
        let row = sqlx::query_as::<_, StatusCountRow>(
            r#"
            SELECT
                COUNT(*)                                AS total,
                COUNT(*) FILTER (WHERE status = $1)     AS open,
                COUNT(*) FILTER (WHERE status = $2)     AS merged
            FROM pull_requests
            "#,
        )
        .bind(PullRequestStatus::Open)
        .bind(PullRequestStatus::Merged)
        .fetch_one(pool)
        .await?;

        Ok((row.total, row.open, row.merged))
    }

    pub async fn count_assignments_by_reviewer(
        pool: &PgPool,
    ) -> Result<Vec<UserReviewStat>, PullRequestError> {
        let records = sqlx::query_as::<_, UserReviewStat>(
            r#"
            SELECT reviewer_id AS user_id, COUNT(*) AS reviews_count
            FROM pull_requests
            CROSS JOIN LATERAL unnest(assigned_reviewers) AS reviewer_id
            GROUP BY reviewer_id
            ORDER BY reviewer_id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
