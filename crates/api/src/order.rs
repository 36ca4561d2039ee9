use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};
use common::{AuthenticatedUser, QueryParams};
use data::order::{NewOrder, NewOrderItem, Order, OrderStatus, OrderWithItems};
use repos::{
    driver::DriverRepo, menu::MenuRepo, order::OrderRepo, restaurant::RestaurantRepo,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub restaurant_id: Uuid,
    pub delivery_address: String,
    pub items: Vec<OrderItemRequest>,
    pub delivery_fee: Option<f64>,
    pub tip: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDriverRequest {
    pub order_id: Uuid,
    pub driver_id: Uuid,
}

fn validate_amount(name: &str, amount: f64) -> Result<f64, ApiError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ApiError::Validation(format!(
            "{} must be a non-negative number",
            name
        )));
    }
    Ok(amount)
}

/// POST /orders. Prices come from the stored menu, never from the request;
/// the order row and its items are written in one transaction.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.delivery_address.trim().is_empty() {
        return Err(ApiError::Validation(
            "deliveryAddress is required".to_string(),
        ));
    }
    if body.items.is_empty() {
        return Err(ApiError::Validation(
            "order must contain at least one item".to_string(),
        ));
    }
    for item in &body.items {
        if item.quantity <= 0 {
            return Err(ApiError::Validation(
                "quantity must be positive".to_string(),
            ));
        }
    }
    let delivery_fee = validate_amount("deliveryFee", body.delivery_fee.unwrap_or(0.0))?;
    let tip = validate_amount("tip", body.tip.unwrap_or(0.0))?;

    let mut tx = state.repo.begin().await?;

    RestaurantRepo::get_by_id(&mut *tx, body.restaurant_id)
        .await?
        .ok_or(ApiError::NotFound("restaurant"))?;

    let mut subtotal = 0.0;
    for item in &body.items {
        let menu_item = MenuRepo::get_by_id(&mut *tx, item.menu_item_id)
            .await?
            .ok_or(ApiError::NotFound("menu item"))?;
        if menu_item.restaurant_id != body.restaurant_id {
            return Err(ApiError::Validation(
                "menu item does not belong to this restaurant".to_string(),
            ));
        }
        subtotal += menu_item.price * item.quantity as f64;
    }

    let order_id = OrderRepo::create(
        &mut *tx,
        NewOrder {
            user_id: user.id,
            restaurant_id: body.restaurant_id,
            delivery_address: body.delivery_address,
            subtotal,
            delivery_fee,
            tip,
        },
    )
    .await?;

    for item in body.items {
        OrderRepo::add_item(
            &mut *tx,
            order_id,
            NewOrderItem {
                menu_item_id: item.menu_item_id,
                quantity: item.quantity,
            },
        )
        .await?;
    }

    let order = OrderRepo::get_by_id(&mut *tx, order_id)
        .await?
        .ok_or(ApiError::InternalFailure())?;
    let items = OrderRepo::get_items(&mut *tx, order_id).await?;

    state.repo.end(tx).await?;

    info!("Created order {} for user {}", order_id, user.id);
    Ok((StatusCode::CREATED, Json(OrderWithItems { order, items })))
}

/// GET /orders. The caller's own orders, newest first.
pub async fn get_own(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    let orders = OrderRepo::get_for_user(&mut *conn, user.id).await?;
    Ok(Json(orders))
}

/// GET /orders/{id}. Owner or admin only; anyone else sees 404 rather than
/// a hint the order exists.
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    let order = OrderRepo::get_by_id(&mut *conn, order_id)
        .await?
        .ok_or(ApiError::NotFound("order"))?;

    if order.user_id != user.id && !user.is_admin {
        return Err(ApiError::NotFound("order"));
    }

    let items = OrderRepo::get_items(&mut *conn, order_id).await?;
    Ok(Json(OrderWithItems { order, items }))
}

pub async fn get_all(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    let orders = OrderRepo::get_all(&mut *conn, params).await?;
    Ok(Json(orders))
}

pub async fn set_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<SetStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = OrderStatus::from_str(&body.status)
        .map_err(|_| ApiError::Validation(format!("unknown status: {}", body.status)))?;

    let mut conn = state.repo.acquire().await?;
    let order: Order = OrderRepo::set_status(&mut *conn, order_id, status)
        .await?
        .ok_or(ApiError::NotFound("order"))?;

    info!("Order {} moved to {}", order_id, status);
    Ok(Json(order))
}

/// POST /admin/orders/assign. The order update and the driver's
/// availability flip commit together or not at all.
pub async fn assign_driver(
    State(state): State<AppState>,
    Json(body): Json<AssignDriverRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = state.repo.begin().await?;

    let driver = DriverRepo::get_by_id(&mut *tx, body.driver_id)
        .await?
        .ok_or(ApiError::NotFound("driver"))?;
    if !driver.available {
        return Err(ApiError::Validation("driver is not available".to_string()));
    }

    let order = OrderRepo::assign_driver(&mut *tx, body.order_id, driver.id)
        .await?
        .ok_or(ApiError::NotFound("order"))?;

    DriverRepo::set_available(&mut *tx, driver.id, false)
        .await?
        .ok_or(ApiError::NotFound("driver"))?;

    state.repo.end(tx).await?;

    info!("Assigned driver {} to order {}", driver.id, order.id);
    Ok(Json(order))
}
