use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};
use data::menu::NewMenuItem;
use repos::{menu::MenuRepo, restaurant::RestaurantRepo};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
}

fn validate_price(price: f64) -> Result<f64, ApiError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::Validation(
            "price must be a non-negative number".to_string(),
        ));
    }
    Ok(price)
}

/// GET /restaurants/{id}/menu is public; writes sit under /admin.
pub async fn get_for_restaurant(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    RestaurantRepo::get_by_id(&mut *conn, restaurant_id)
        .await?
        .ok_or(ApiError::NotFound("restaurant"))?;

    let items = MenuRepo::get_by_restaurant(&mut *conn, restaurant_id).await?;
    Ok(Json(items))
}

pub async fn create(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    Json(body): Json<CreateMenuItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }
    let price = validate_price(body.price)?;

    let mut conn = state.repo.acquire().await?;
    RestaurantRepo::get_by_id(&mut *conn, restaurant_id)
        .await?
        .ok_or(ApiError::NotFound("restaurant"))?;

    let item_id = MenuRepo::create(
        &mut *conn,
        NewMenuItem {
            restaurant_id,
            name: body.name,
            description: body.description.unwrap_or_default(),
            price,
            image_url: body.image_url.unwrap_or_default(),
        },
    )
    .await?;

    let item = MenuRepo::get_by_id(&mut *conn, item_id)
        .await?
        .ok_or(ApiError::InternalFailure())?;

    info!("Created menu item {} for restaurant {}", item.id, restaurant_id);
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(body): Json<UpdateMenuItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    let mut item = MenuRepo::get_by_id(&mut *conn, item_id)
        .await?
        .ok_or(ApiError::NotFound("menu item"))?;

    if let Some(name) = body.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("name must not be empty".to_string()));
        }
        item.name = name;
    }
    if let Some(description) = body.description {
        item.description = description;
    }
    if let Some(price) = body.price {
        item.price = validate_price(price)?;
    }
    if let Some(image_url) = body.image_url {
        item.image_url = image_url;
    }

    MenuRepo::update(&mut *conn, item)
        .await?
        .ok_or(ApiError::NotFound("menu item"))?;

    let item = MenuRepo::get_by_id(&mut *conn, item_id)
        .await?
        .ok_or(ApiError::NotFound("menu item"))?;
    Ok(Json(item))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    MenuRepo::get_by_id(&mut *conn, item_id)
        .await?
        .ok_or(ApiError::NotFound("menu item"))?;

    MenuRepo::remove(&mut *conn, item_id).await?;
    Ok(Json(json!({ "message": "Menu item removed" })))
}
