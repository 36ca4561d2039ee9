use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};
use common::QueryParams;
use data::restaurant::NewRestaurant;
use repos::restaurant::RestaurantRepo;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub address: Option<String>,
}

pub async fn get_all(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    let restaurants = RestaurantRepo::get_all(&mut *conn, params).await?;
    Ok(Json(restaurants))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    let restaurant = RestaurantRepo::get_by_id(&mut *conn, restaurant_id)
        .await?
        .ok_or(ApiError::NotFound("restaurant"))?;
    Ok(Json(restaurant))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateRestaurantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() || body.address.trim().is_empty() {
        return Err(ApiError::Validation(
            "name and address are required".to_string(),
        ));
    }

    let new_restaurant = NewRestaurant {
        name: body.name,
        description: body.description.unwrap_or_default(),
        image_url: body.image_url.unwrap_or_default(),
        address: body.address,
    };

    let mut conn = state.repo.acquire().await?;
    let restaurant_id = RestaurantRepo::create(&mut *conn, new_restaurant).await?;
    let restaurant = RestaurantRepo::get_by_id(&mut *conn, restaurant_id)
        .await?
        .ok_or(ApiError::InternalFailure())?;

    info!("Created restaurant {}", restaurant.id);
    Ok((StatusCode::CREATED, Json(restaurant)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    Json(body): Json<UpdateRestaurantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    let mut restaurant = RestaurantRepo::get_by_id(&mut *conn, restaurant_id)
        .await?
        .ok_or(ApiError::NotFound("restaurant"))?;

    if let Some(name) = body.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("name must not be empty".to_string()));
        }
        restaurant.name = name;
    }
    if let Some(description) = body.description {
        restaurant.description = description;
    }
    if let Some(image_url) = body.image_url {
        restaurant.image_url = image_url;
    }
    if let Some(address) = body.address {
        restaurant.address = address;
    }

    RestaurantRepo::update(&mut *conn, restaurant)
        .await?
        .ok_or(ApiError::NotFound("restaurant"))?;

    let restaurant = RestaurantRepo::get_by_id(&mut *conn, restaurant_id)
        .await?
        .ok_or(ApiError::NotFound("restaurant"))?;
    Ok(Json(restaurant))
}

/// Menu items go with the restaurant (cascade).
pub async fn remove(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    RestaurantRepo::get_by_id(&mut *conn, restaurant_id)
        .await?
        .ok_or(ApiError::NotFound("restaurant"))?;

    RestaurantRepo::remove(&mut *conn, restaurant_id).await?;
    info!("Removed restaurant {}", restaurant_id);
    Ok(Json(json!({ "message": "Restaurant removed" })))
}
