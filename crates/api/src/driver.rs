use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};
use data::driver::NewDriver;
use repos::driver::DriverRepo;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriverRequest {
    pub name: String,
    pub phone: String,
    pub vehicle: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationRequest {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct SetAvailabilityRequest {
    pub available: bool,
}

pub async fn get_available(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    let drivers = DriverRepo::get_available(&mut *conn).await?;
    Ok(Json(drivers))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateDriverRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() || body.phone.trim().is_empty() {
        return Err(ApiError::Validation(
            "name and phone are required".to_string(),
        ));
    }

    let mut conn = state.repo.acquire().await?;
    let driver_id = DriverRepo::create(
        &mut *conn,
        NewDriver {
            name: body.name,
            phone: body.phone,
            vehicle: body.vehicle.unwrap_or_default(),
        },
    )
    .await?;

    let driver = DriverRepo::get_by_id(&mut *conn, driver_id)
        .await?
        .ok_or(ApiError::InternalFailure())?;

    info!("Created driver {}", driver.id);
    Ok((StatusCode::CREATED, Json(driver)))
}

/// Location pings come straight from the driver app.
pub async fn update_location(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
    Json(body): Json<UpdateLocationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !body.lat.is_finite() || !body.lng.is_finite() {
        return Err(ApiError::Validation(
            "lat and lng must be numbers".to_string(),
        ));
    }

    let mut conn = state.repo.acquire().await?;
    let driver = DriverRepo::set_location(&mut *conn, driver_id, body.lat, body.lng)
        .await?
        .ok_or(ApiError::NotFound("driver"))?;
    Ok(Json(driver))
}

pub async fn set_availability(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
    Json(body): Json<SetAvailabilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    DriverRepo::set_available(&mut *conn, driver_id, body.available)
        .await?
        .ok_or(ApiError::NotFound("driver"))?;

    let driver = DriverRepo::get_by_id(&mut *conn, driver_id)
        .await?
        .ok_or(ApiError::NotFound("driver"))?;
    Ok(Json(driver))
}
