use sqlx::Postgres;
use tracing::error;
use uuid::Uuid;

use crate::error::{RepoError, handle_sql_error};
use data::driver::{Driver, NewDriver};

pub struct DriverRepo {}

impl DriverRepo {
    pub async fn get_by_id(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        id: Uuid,
    ) -> Result<Option<Driver>, RepoError> {
        sqlx::query_as::<_, Driver>(
            r#"
            SELECT *
            FROM foodline.drivers
            WHERE id = $1
        "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|err| {
            error!("Failed to retrieve driver {id}: {err}");
            RepoError::DatabaseError("Failed to retrieve driver".to_string())
        })
    }

    pub async fn get_available(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
    ) -> Result<Vec<Driver>, RepoError> {
        sqlx::query_as::<_, Driver>(
            r#"
            SELECT *
            FROM foodline.drivers
            WHERE available = TRUE
            ORDER BY name
        "#,
        )
        .fetch_all(executor)
        .await
        .map_err(|err| {
            error!("Failed to retrieve available drivers: {err}");
            RepoError::DatabaseError("Failed to retrieve drivers".to_string())
        })
    }

    pub async fn create(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        driver: NewDriver,
    ) -> Result<Uuid, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO foodline.drivers
              (
                name,
                phone,
                vehicle
              )
            VALUES ($1, $2, $3)
            RETURNING
              id
        "#,
        )
        .bind(driver.name)
        .bind(driver.phone)
        .bind(driver.vehicle)
        .fetch_one(executor)
        .await
        .map_err(handle_sql_error)
    }

    pub async fn set_available(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        id: Uuid,
        available: bool,
    ) -> Result<Option<Uuid>, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE foodline.drivers
            SET available = $1
            WHERE id = $2
            RETURNING id
        "#,
        )
        .bind(available)
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(handle_sql_error)
    }

    pub async fn set_location(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        id: Uuid,
        lat: f64,
        lng: f64,
    ) -> Result<Option<Driver>, RepoError> {
        sqlx::query_as::<_, Driver>(
            r#"
            UPDATE foodline.drivers
            SET lat = $1, lng = $2
            WHERE id = $3
            RETURNING *
        "#,
        )
        .bind(lat)
        .bind(lng)
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(handle_sql_error)
    }
}
