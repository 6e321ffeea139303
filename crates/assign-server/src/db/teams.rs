use api_types::User;
use sqlx::PgPool;
use thiserror::Error;

use super::{
    is_unique_violation,
    users::{UserError, UserRepository},
};

#[derive(Debug, Error)]
pub enum TeamError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("team already exists")]
    AlreadyExists,
    #[error("user error: {0}")]
    User(#[from] UserError),
}

pub struct TeamRepository;

impl TeamRepository {
    pub async fn find_by_name(pool: &PgPool, team_name: &str) -> Result<Option<String>, TeamError> {
        let record =
            sqlx::query_scalar::<_, String>("SELECT team_name FROM teams WHERE team_name = $1")
                .bind(team_name)
                .fetch_optional(pool)
                .await?;

        Ok(record)
    }

    /// Insert the team and upsert its members inside one transaction.
    pub async fn create_with_members(
        pool: &PgPool,
        team_name: &str,
        members: &[User],
    ) -> Result<(), TeamError> {
        let mut tx = pool.begin().await?;

        sqlx::query("INSERT INTO teams (team_name) VALUES ($1)")
            .bind(team_name)
            .execute(&mut *tx)
            .await
            .map_err(|error| {
                if is_unique_violation(&error) {
                    TeamError::AlreadyExists
                } else {
                    TeamError::Database(error)
                }
            })?;

        for member in members {
            UserRepository::upsert(&mut *tx, member).await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
