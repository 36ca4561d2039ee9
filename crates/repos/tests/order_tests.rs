#![cfg(test)]

use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use data::order::{NewOrder, NewOrderItem, OrderStatus};
use repos::driver::DriverRepo;
use repos::error::RepoError;
use repos::order::OrderRepo;
use testware::{
    create_test_driver, create_test_menu_item, create_test_order, create_test_restaurant,
    create_test_user,
};

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_order_with_items(pool: PgPool) {
    let user = create_test_user(&pool, "thandi@example.com", "s3cret-pw", false).await;
    let restaurant = create_test_restaurant(&pool).await;
    let item = create_test_menu_item(&pool, restaurant.id, "Burger", 80.0).await;

    let mut tx = pool.begin().await.expect("Failed to begin transaction");

    let order_id = OrderRepo::create(
        &mut *tx,
        NewOrder {
            user_id: user.id,
            restaurant_id: restaurant.id,
            delivery_address: "12 Long Street".to_string(),
            subtotal: 160.0,
            delivery_fee: 25.0,
            tip: 15.0,
        },
    )
    .await
    .expect("Failed to create order");

    OrderRepo::add_item(
        &mut *tx,
        order_id,
        NewOrderItem {
            menu_item_id: item.id,
            quantity: 2,
        },
    )
    .await
    .expect("Failed to add order item");

    tx.commit().await.expect("Failed to commit");

    let order = OrderRepo::get_by_id(&pool, order_id)
        .await
        .expect("Failed to reload order")
        .expect("Order not found");
    assert_eq!(order.total, 200.0);
    assert_eq!(OrderStatus::from_str(&order.status).unwrap(), OrderStatus::Pending);

    let items = OrderRepo::get_items(&pool, order_id)
        .await
        .expect("Failed to load items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_rolled_back_order_leaves_nothing(pool: PgPool) {
    let user = create_test_user(&pool, "thandi@example.com", "s3cret-pw", false).await;
    let restaurant = create_test_restaurant(&pool).await;

    let mut tx = pool.begin().await.expect("Failed to begin transaction");
    let order_id = OrderRepo::create(
        &mut *tx,
        NewOrder {
            user_id: user.id,
            restaurant_id: restaurant.id,
            delivery_address: "12 Long Street".to_string(),
            subtotal: 55.0,
            delivery_fee: 25.0,
            tip: 0.0,
        },
    )
    .await
    .expect("Failed to create order");
    drop(tx);

    let order = OrderRepo::get_by_id(&pool, order_id)
        .await
        .expect("Failed to query order");
    assert!(order.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_order_item_requires_existing_order(pool: PgPool) {
    let restaurant = create_test_restaurant(&pool).await;
    let item = create_test_menu_item(&pool, restaurant.id, "Burger", 80.0).await;

    let result = OrderRepo::add_item(
        &pool,
        Uuid::new_v4(),
        NewOrderItem {
            menu_item_id: item.id,
            quantity: 1,
        },
    )
    .await;

    assert!(matches!(result, Err(RepoError::ForeignKeyViolation(_, _))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_order_item_quantity_must_be_positive(pool: PgPool) {
    let user = create_test_user(&pool, "thandi@example.com", "s3cret-pw", false).await;
    let restaurant = create_test_restaurant(&pool).await;
    let item = create_test_menu_item(&pool, restaurant.id, "Burger", 80.0).await;
    let order = create_test_order(&pool, user.id, restaurant.id).await;

    let result = OrderRepo::add_item(
        &pool,
        order.id,
        NewOrderItem {
            menu_item_id: item.id,
            quantity: 0,
        },
    )
    .await;

    assert!(matches!(result, Err(RepoError::CheckViolation(_, _))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_set_status(pool: PgPool) {
    let user = create_test_user(&pool, "thandi@example.com", "s3cret-pw", false).await;
    let restaurant = create_test_restaurant(&pool).await;
    let order = create_test_order(&pool, user.id, restaurant.id).await;

    let updated = OrderRepo::set_status(&pool, order.id, OrderStatus::OutForDelivery)
        .await
        .expect("Failed to set status")
        .expect("Order not found");
    assert_eq!(updated.status, "out_for_delivery");

    let missing = OrderRepo::set_status(&pool, Uuid::new_v4(), OrderStatus::Delivered)
        .await
        .expect("Failed to set status on missing order");
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_assign_driver_in_one_transaction(pool: PgPool) {
    let user = create_test_user(&pool, "thandi@example.com", "s3cret-pw", false).await;
    let restaurant = create_test_restaurant(&pool).await;
    let order = create_test_order(&pool, user.id, restaurant.id).await;
    let driver = create_test_driver(&pool).await;

    let mut tx = pool.begin().await.expect("Failed to begin transaction");
    let assigned = OrderRepo::assign_driver(&mut *tx, order.id, driver.id)
        .await
        .expect("Failed to assign driver")
        .expect("Order not found");
    DriverRepo::set_available(&mut *tx, driver.id, false)
        .await
        .expect("Failed to mark driver busy");
    tx.commit().await.expect("Failed to commit");

    assert_eq!(assigned.driver_id, Some(driver.id));
    assert_eq!(assigned.status, "assigned");

    let available = DriverRepo::get_available(&pool)
        .await
        .expect("Failed to list available drivers");
    assert!(available.iter().all(|d| d.id != driver.id));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_get_for_user_newest_first(pool: PgPool) {
    let user = create_test_user(&pool, "thandi@example.com", "s3cret-pw", false).await;
    let other = create_test_user(&pool, "other@example.com", "s3cret-pw", false).await;
    let restaurant = create_test_restaurant(&pool).await;

    create_test_order(&pool, user.id, restaurant.id).await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let newest = create_test_order(&pool, user.id, restaurant.id).await;
    create_test_order(&pool, other.id, restaurant.id).await;

    let orders = OrderRepo::get_for_user(&pool, user.id)
        .await
        .expect("Failed to get orders");
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].id, newest.id);
}
