use sqlx::{Postgres, QueryBuilder};
use tracing::error;
use uuid::Uuid;

use crate::error::{RepoError, handle_sql_error};
use crate::{QueryParams, Repo};
use data::order::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus};

pub struct OrderRepo {}

impl OrderRepo {
    pub async fn get_by_id(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        id: Uuid,
    ) -> Result<Option<Order>, RepoError> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT *
            FROM foodline.orders
            WHERE id = $1
        "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|err| {
            error!("Failed to retrieve order {id}: {err}");
            RepoError::DatabaseError("Failed to retrieve order".to_string())
        })
    }

    pub async fn get_for_user(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        user_id: Uuid,
    ) -> Result<Vec<Order>, RepoError> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT *
            FROM foodline.orders
            WHERE user_id = $1
            ORDER BY created_at DESC
        "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
        .map_err(|err| {
            error!("Failed to retrieve orders for user {user_id}: {err}");
            RepoError::DatabaseError("Failed to retrieve orders".to_string())
        })
    }

    pub async fn get_all(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        params: QueryParams,
    ) -> Result<Vec<Order>, RepoError> {
        let mut builder = QueryBuilder::new("SELECT * FROM foodline.orders");
        Repo::build_query(
            &mut builder,
            &params,
            &["id", "status", "delivery_address", "total", "created_at"],
            &["status", "delivery_address"],
        )?;

        let query = builder.build_query_as();

        query.fetch_all(executor).await.map_err(|err| {
            error!("Failed to retrieve all orders: {err}");
            RepoError::DatabaseError("Failed to retrieve orders".to_string())
        })
    }

    /// Inserts the order row only. Items are added with `add_item` inside
    /// the same transaction so an order never lands without its lines.
    pub async fn create(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        order: NewOrder,
    ) -> Result<Uuid, RepoError> {
        let total = order.total();
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO foodline.orders
              (
                user_id,
                restaurant_id,
                delivery_address,
                subtotal,
                delivery_fee,
                tip,
                total,
                status
              )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING
              id
        "#,
        )
        .bind(order.user_id)
        .bind(order.restaurant_id)
        .bind(order.delivery_address)
        .bind(order.subtotal)
        .bind(order.delivery_fee)
        .bind(order.tip)
        .bind(total)
        .bind(OrderStatus::Pending.to_string())
        .fetch_one(executor)
        .await
        .map_err(handle_sql_error)
    }

    pub async fn add_item(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        order_id: Uuid,
        item: NewOrderItem,
    ) -> Result<Uuid, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO foodline.order_items
              (
                order_id,
                menu_item_id,
                quantity
              )
            VALUES ($1, $2, $3)
            RETURNING
              id
        "#,
        )
        .bind(order_id)
        .bind(item.menu_item_id)
        .bind(item.quantity)
        .fetch_one(executor)
        .await
        .map_err(handle_sql_error)
    }

    pub async fn get_items(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        order_id: Uuid,
    ) -> Result<Vec<OrderItem>, RepoError> {
        sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT *
            FROM foodline.order_items
            WHERE order_id = $1
        "#,
        )
        .bind(order_id)
        .fetch_all(executor)
        .await
        .map_err(|err| {
            error!("Failed to retrieve items for order {order_id}: {err}");
            RepoError::DatabaseError("Failed to retrieve order items".to_string())
        })
    }

    pub async fn set_status(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepoError> {
        sqlx::query_as::<_, Order>(
            r#"
            UPDATE foodline.orders
            SET status = $1
            WHERE id = $2
            RETURNING *
        "#,
        )
        .bind(status.to_string())
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(handle_sql_error)
    }

    /// Attaches a driver and flips the order to `assigned`. The caller
    /// marks the driver unavailable in the same transaction.
    pub async fn assign_driver(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        order_id: Uuid,
        driver_id: Uuid,
    ) -> Result<Option<Order>, RepoError> {
        sqlx::query_as::<_, Order>(
            r#"
            UPDATE foodline.orders
            SET driver_id = $1, status = $2
            WHERE id = $3
            RETURNING *
        "#,
        )
        .bind(driver_id)
        .bind(OrderStatus::Assigned.to_string())
        .bind(order_id)
        .fetch_optional(executor)
        .await
        .map_err(handle_sql_error)
    }
}
