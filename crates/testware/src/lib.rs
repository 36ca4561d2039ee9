pub mod setup;

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use common::settings::Settings;
use common::token::{hash_password, issue_token};

// Data models
use data::driver::NewDriver;
use data::menu::NewMenuItem;
use data::order::{NewOrder, NewOrderItem};
use data::release::{NewRelease, NewWhitelistEntry};
use data::restaurant::NewRestaurant;
use data::user::{NewUser, ROLE_ADMIN, ROLE_CUSTOMER};

// Repos
use repos::driver::DriverRepo;
use repos::menu::MenuRepo;
use repos::order::OrderRepo;
use repos::release::{ReleaseRepo, WhitelistRepo};
use repos::restaurant::RestaurantRepo;
use repos::user::UserRepo;

// Entity types
use data::driver::Driver;
use data::menu::MenuItem;
use data::order::Order;
use data::release::{Release, WhitelistEntry};
use data::restaurant::Restaurant;
use data::user::User;

pub fn create_settings() -> Arc<Settings> {
    let mut settings = Settings::default();
    settings.auth.jwt_secret = "test-secret".to_string();
    Arc::new(settings)
}

/// Create a test user with a known password
pub async fn create_test_user(pool: &PgPool, email: &str, password: &str, admin: bool) -> User {
    let new_user = NewUser {
        name: format!("Test User {}", Uuid::new_v4()),
        email: email.to_string(),
        password_hash: hash_password(password).expect("Failed to hash test password"),
        role: if admin { ROLE_ADMIN } else { ROLE_CUSTOMER }.to_string(),
    };

    let user_id = UserRepo::create(pool, new_user)
        .await
        .expect("Failed to insert test user");

    UserRepo::get_by_id(pool, user_id)
        .await
        .expect("Failed to retrieve created user")
        .expect("Created user not found")
}

/// Mint a bearer token for a test user, the way the login endpoint would
pub fn mint_token(settings: &Settings, user: &User) -> String {
    issue_token(
        &settings.auth.jwt_secret,
        user.id,
        &user.role,
        settings.auth.token_validity_in_minutes,
    )
    .expect("Failed to issue test token")
}

/// Create a test release; `created_by` is left unset
pub async fn create_test_release(
    pool: &PgPool,
    platform: &str,
    version: &str,
    minimum: &str,
    rollout_percent: i32,
    active: bool,
) -> Release {
    let new_release = NewRelease {
        platform: platform.to_string(),
        version: version.to_string(),
        minimum: minimum.to_string(),
        rollout_percent,
        notes: "test release".to_string(),
        active,
        created_by: None,
    };

    let release_id = ReleaseRepo::create(pool, new_release)
        .await
        .expect("Failed to insert test release");

    ReleaseRepo::get_by_id(pool, release_id)
        .await
        .expect("Failed to retrieve created release")
        .expect("Created release not found")
}

pub async fn create_test_whitelist_entry(
    pool: &PgPool,
    release_id: Uuid,
    identifier: &str,
) -> WhitelistEntry {
    let entry = NewWhitelistEntry {
        release_id,
        kind: "device".to_string(),
        identifier: identifier.to_string(),
        note: "test entry".to_string(),
    };

    let entry_id = WhitelistRepo::create(pool, entry)
        .await
        .expect("Failed to insert test whitelist entry");

    WhitelistRepo::get_by_id(pool, entry_id)
        .await
        .expect("Failed to retrieve created whitelist entry")
        .expect("Created whitelist entry not found")
}

pub async fn create_test_restaurant(pool: &PgPool) -> Restaurant {
    let new_restaurant = NewRestaurant {
        name: format!("Restaurant {}", Uuid::new_v4()),
        description: "Test Restaurant".to_string(),
        image_url: String::new(),
        address: "1 Test Street".to_string(),
    };

    let restaurant_id = RestaurantRepo::create(pool, new_restaurant)
        .await
        .expect("Failed to insert test restaurant");

    RestaurantRepo::get_by_id(pool, restaurant_id)
        .await
        .expect("Failed to retrieve created restaurant")
        .expect("Created restaurant not found")
}

pub async fn create_test_menu_item(
    pool: &PgPool,
    restaurant_id: Uuid,
    name: &str,
    price: f64,
) -> MenuItem {
    let new_item = NewMenuItem {
        restaurant_id,
        name: name.to_string(),
        description: "Test menu item".to_string(),
        price,
        image_url: String::new(),
    };

    let item_id = MenuRepo::create(pool, new_item)
        .await
        .expect("Failed to insert test menu item");

    MenuRepo::get_by_id(pool, item_id)
        .await
        .expect("Failed to retrieve created menu item")
        .expect("Created menu item not found")
}

pub async fn create_test_driver(pool: &PgPool) -> Driver {
    let new_driver = NewDriver {
        name: format!("Driver {}", Uuid::new_v4()),
        phone: "0820000000".to_string(),
        vehicle: "scooter".to_string(),
    };

    let driver_id = DriverRepo::create(pool, new_driver)
        .await
        .expect("Failed to insert test driver");

    DriverRepo::get_by_id(pool, driver_id)
        .await
        .expect("Failed to retrieve created driver")
        .expect("Created driver not found")
}

/// Create an order with a single line item, going through the same
/// transactional path the API uses
pub async fn create_test_order(pool: &PgPool, user_id: Uuid, restaurant_id: Uuid) -> Order {
    let menu_item = create_test_menu_item(pool, restaurant_id, "Test Meal", 55.0).await;

    let mut tx = pool.begin().await.expect("Failed to begin transaction");

    let new_order = NewOrder {
        user_id,
        restaurant_id,
        delivery_address: "1 Test Street".to_string(),
        subtotal: 55.0,
        delivery_fee: 25.0,
        tip: 0.0,
    };

    let order_id = OrderRepo::create(&mut *tx, new_order)
        .await
        .expect("Failed to insert test order");

    OrderRepo::add_item(
        &mut *tx,
        order_id,
        NewOrderItem {
            menu_item_id: menu_item.id,
            quantity: 1,
        },
    )
    .await
    .expect("Failed to insert test order item");

    tx.commit().await.expect("Failed to commit transaction");

    OrderRepo::get_by_id(pool, order_id)
        .await
        .expect("Failed to retrieve created order")
        .expect("Created order not found")
}
