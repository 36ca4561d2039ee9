#![cfg(test)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use sqlx::PgPool;
use testware::{
    create_settings, create_test_menu_item, create_test_restaurant, create_test_user, mint_token,
};
use tower::ServiceExt;
use tower_http::trace::TraceLayer;

use api::routes::routes;
use api::state::AppState;
use repos::Repo;
use rollout::Resolver;

async fn setup(pool: &PgPool) -> Router {
    testware::setup::TestSetup::init();

    let settings = create_settings();
    let repo = Repo::new(pool.clone());

    let state = AppState {
        repo,
        settings: settings.clone(),
        resolver: Resolver::default(),
    };

    Router::new()
        .nest("/api", routes(state.clone()).await)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn admin_token(pool: &PgPool) -> String {
    let admin = create_test_user(pool, "admin@example.com", "s3cret-pw", true).await;
    mint_token(&create_settings(), &admin)
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_restaurant_listing_is_public(pool: PgPool) {
    let restaurant = create_test_restaurant(&pool).await;

    let (status, body) = send(setup(&pool).await, Method::GET, "/api/restaurants", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(|r| r.len()), Some(1));

    let (status, body) = send(
        setup(&pool).await,
        Method::GET,
        &format!("/api/restaurants/{}", restaurant.id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], restaurant.id.to_string());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_menu_listing_is_public(pool: PgPool) {
    let restaurant = create_test_restaurant(&pool).await;
    create_test_menu_item(&pool, restaurant.id, "Bunny Chow", 65.0).await;

    let (status, body) = send(
        setup(&pool).await,
        Method::GET,
        &format!("/api/restaurants/{}/menu", restaurant.id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Bunny Chow");
    assert_eq!(body[0]["price"], 65.0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_admin_restaurant_crud(pool: PgPool) {
    let token = admin_token(&pool).await;

    let (status, body) = send(
        setup(&pool).await,
        Method::POST,
        "/api/admin/restaurants",
        Some(&token),
        Some(json!({ "name": "Mzansi Flame", "address": "5 Kloof Street" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let restaurant_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        setup(&pool).await,
        Method::PUT,
        &format!("/api/admin/restaurants/{restaurant_id}"),
        Some(&token),
        Some(json!({ "description": "Flame-grilled everything" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Flame-grilled everything");
    assert_eq!(body["name"], "Mzansi Flame");

    let (status, _) = send(
        setup(&pool).await,
        Method::DELETE,
        &format!("/api/admin/restaurants/{restaurant_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        setup(&pool).await,
        Method::GET,
        &format!("/api/restaurants/{restaurant_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_deleting_restaurant_takes_menu_with_it(pool: PgPool) {
    let token = admin_token(&pool).await;
    let restaurant = create_test_restaurant(&pool).await;
    let item = create_test_menu_item(&pool, restaurant.id, "Gatsby", 70.0).await;

    let (status, _) = send(
        setup(&pool).await,
        Method::DELETE,
        &format!("/api/admin/restaurants/{}", restaurant.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        setup(&pool).await,
        Method::PUT,
        &format!("/api/admin/menu/{}", item.id),
        Some(&token),
        Some(json!({ "price": 75.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_admin_menu_item_validation(pool: PgPool) {
    let token = admin_token(&pool).await;
    let restaurant = create_test_restaurant(&pool).await;

    let (status, _) = send(
        setup(&pool).await,
        Method::POST,
        &format!("/api/admin/restaurants/{}/menu", restaurant.id),
        Some(&token),
        Some(json!({ "name": "Free Lunch", "price": -1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        setup(&pool).await,
        Method::POST,
        &format!("/api/admin/restaurants/{}/menu", restaurant.id),
        Some(&token),
        Some(json!({ "name": "Boerie Roll", "price": 45.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["restaurantId"], restaurant.id.to_string());
}
