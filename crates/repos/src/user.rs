use sqlx::Postgres;
use tracing::error;
use uuid::Uuid;

use crate::error::{RepoError, handle_sql_error};
use data::user::{NewUser, User};

pub struct UserRepo {}

impl UserRepo {
    pub async fn get_by_id(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        id: Uuid,
    ) -> Result<Option<User>, RepoError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT *
            FROM foodline.users
            WHERE id = $1
        "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|err| {
            error!("Failed to retrieve user {id}: {err}");
            RepoError::DatabaseError("Failed to retrieve user".to_string())
        })
    }

    pub async fn get_by_email(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        email: &str,
    ) -> Result<Option<User>, RepoError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT *
            FROM foodline.users
            WHERE email = $1
        "#,
        )
        .bind(email)
        .fetch_optional(executor)
        .await
        .map_err(|err| {
            error!("Failed to retrieve user by email: {err}");
            RepoError::DatabaseError("Failed to retrieve user by email".to_string())
        })
    }

    /// Duplicate emails surface as `RepoError::UniqueViolation`.
    pub async fn create(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        user: NewUser,
    ) -> Result<Uuid, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO foodline.users
              (
                name,
                email,
                password_hash,
                role
              )
            VALUES ($1, $2, $3, $4)
            RETURNING
              id
        "#,
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role)
        .fetch_one(executor)
        .await
        .map_err(handle_sql_error)
    }
}
