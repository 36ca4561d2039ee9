use sqlx::{Postgres, QueryBuilder};
use tracing::error;
use uuid::Uuid;

use crate::error::{RepoError, handle_sql_error};
use crate::{QueryParams, Repo};
use data::restaurant::{NewRestaurant, Restaurant};

pub struct RestaurantRepo {}

impl RestaurantRepo {
    pub async fn get_by_id(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        id: Uuid,
    ) -> Result<Option<Restaurant>, RepoError> {
        sqlx::query_as::<_, Restaurant>(
            r#"
            SELECT *
            FROM foodline.restaurants
            WHERE id = $1
        "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|err| {
            error!("Failed to retrieve restaurant {id}: {err}");
            RepoError::DatabaseError("Failed to retrieve restaurant".to_string())
        })
    }

    pub async fn get_all(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        params: QueryParams,
    ) -> Result<Vec<Restaurant>, RepoError> {
        let mut builder = QueryBuilder::new("SELECT * FROM foodline.restaurants");
        Repo::build_query(
            &mut builder,
            &params,
            &["id", "name", "description", "address", "created_at"],
            &["name", "description", "address"],
        )?;

        let query = builder.build_query_as();

        query.fetch_all(executor).await.map_err(|err| {
            error!("Failed to retrieve all restaurants: {err}");
            RepoError::DatabaseError("Failed to retrieve restaurants".to_string())
        })
    }

    pub async fn create(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        restaurant: NewRestaurant,
    ) -> Result<Uuid, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO foodline.restaurants
              (
                name,
                description,
                image_url,
                address
              )
            VALUES ($1, $2, $3, $4)
            RETURNING
              id
        "#,
        )
        .bind(restaurant.name)
        .bind(restaurant.description)
        .bind(restaurant.image_url)
        .bind(restaurant.address)
        .fetch_one(executor)
        .await
        .map_err(handle_sql_error)
    }

    pub async fn update(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        restaurant: Restaurant,
    ) -> Result<Option<Uuid>, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE foodline.restaurants
            SET name = $1, description = $2, image_url = $3, address = $4
            WHERE id = $5
            RETURNING id
        "#,
        )
        .bind(restaurant.name)
        .bind(restaurant.description)
        .bind(restaurant.image_url)
        .bind(restaurant.address)
        .bind(restaurant.id)
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
            DELETE FROM foodline.restaurants
            WHERE id = $1
        "#,
        )
        .bind(id)
        .execute(executor)
        .await
        .map_err(|err| {
            error!("Failed to remove restaurant {id}: {err}");
            RepoError::DatabaseError("Failed to remove restaurant".to_string())
        })?;

        Ok(())
    }
}
