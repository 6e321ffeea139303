use api_types::User;
use sqlx::{Executor, PgPool, Postgres};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("user not found")]
    NotFound,
    #[error("user already exists")]
    AlreadyExists,
}

pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_id(pool: &PgPool, user_id: &str) -> Result<Option<User>, UserError> {
        let record = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, team_name, is_active
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn create(pool: &PgPool, user: &User) -> Result<(), UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, team_name, is_active)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.username)
        .bind(&user.team_name)
        .bind(user.is_active)
        .execute(pool)
        .await
        .map_err(|error| {
            if super::is_unique_violation(&error) {
                UserError::AlreadyExists
            } else {
                UserError::Database(error)
            }
        })?;

        Ok(())
    }

    pub async fn update(pool: &PgPool, user: &User) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, team_name = $3, is_active = $4
            WHERE user_id = $1
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.username)
        .bind(&user.team_name)
        .bind(user.is_active)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound);
        }

        Ok(())
    }

    /// Insert the user, or overwrite username, team and activity when the id exists.
    pub async fn upsert<'e, E>(executor: E, user: &User) -> Result<(), UserError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, team_name, is_active)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET
                username = EXCLUDED.username,
                team_name = EXCLUDED.team_name,
                is_active = EXCLUDED.is_active
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.username)
        .bind(&user.team_name)
        .bind(user.is_active)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn list_by_team(
        pool: &PgPool,
        team_name: &str,
        active_only: bool,
    ) -> Result<Vec<User>, UserError> {
        let records = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, team_name, is_active
            FROM users
            WHERE team_name = $1 AND (is_active OR NOT $2)
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .bind(active_only)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
