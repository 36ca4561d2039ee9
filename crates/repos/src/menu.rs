use sqlx::Postgres;
use tracing::error;
use uuid::Uuid;

use crate::error::{RepoError, handle_sql_error};
use data::menu::{MenuItem, NewMenuItem};

pub struct MenuRepo {}

impl MenuRepo {
    pub async fn get_by_id(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        id: Uuid,
    ) -> Result<Option<MenuItem>, RepoError> {
        sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT *
            FROM foodline.menu_items
            WHERE id = $1
        "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|err| {
            error!("Failed to retrieve menu item {id}: {err}");
            RepoError::DatabaseError("Failed to retrieve menu item".to_string())
        })
    }

    pub async fn get_by_restaurant(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        restaurant_id: Uuid,
    ) -> Result<Vec<MenuItem>, RepoError> {
        sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT *
            FROM foodline.menu_items
            WHERE restaurant_id = $1
            ORDER BY name
        "#,
        )
        .bind(restaurant_id)
        .fetch_all(executor)
        .await
        .map_err(|err| {
            error!("Failed to retrieve menu for restaurant {restaurant_id}: {err}");
            RepoError::DatabaseError("Failed to retrieve menu".to_string())
        })
    }

    pub async fn create(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        item: NewMenuItem,
    ) -> Result<Uuid, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO foodline.menu_items
              (
                restaurant_id,
                name,
                description,
                price,
                image_url
              )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING
              id
        "#,
        )
        .bind(item.restaurant_id)
        .bind(item.name)
        .bind(item.description)
        .bind(item.price)
        .bind(item.image_url)
        .fetch_one(executor)
        .await
        .map_err(handle_sql_error)
    }

    pub async fn update(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        item: MenuItem,
    ) -> Result<Option<Uuid>, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE foodline.menu_items
            SET name = $1, description = $2, price = $3, image_url = $4
            WHERE id = $5
            RETURNING id
        "#,
        )
        .bind(item.name)
        .bind(item.description)
        .bind(item.price)
        .bind(item.image_url)
        .bind(item.id)
        .fetch_optional(executor)
        .await
        .map_err(handle_sql_error)
    }

    pub async fn remove(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        id: Uuid,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            DELETE FROM foodline.menu_items
            WHERE id = $1
        "#,
        )
        .bind(id)
        .execute(executor)
        .await
        .map_err(|err| {
            error!("Failed to remove menu item {id}: {err}");
            RepoError::DatabaseError("Failed to remove menu item".to_string())
        })?;

        Ok(())
    }
}
