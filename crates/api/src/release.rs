use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};
use common::{AuthenticatedUser, QueryParams};
use data::release::{NewRelease, NewWhitelistEntry};
use repos::release::{ReleaseRepo, WhitelistRepo};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReleaseRequest {
    pub platform: String,
    pub version: String,
    pub minimum: String,
    pub rollout_percent: Option<i32>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReleaseRequest {
    pub platform: Option<String>,
    pub version: Option<String>,
    pub minimum: Option<String>,
    pub rollout_percent: Option<i32>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWhitelistRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub identifier: String,
    pub note: Option<String>,
}

fn validate_percent(percent: i32) -> Result<i32, ApiError> {
    if !(0..=100).contains(&percent) {
        return Err(ApiError::Validation(
            "rolloutPercent must be between 0 and 100".to_string(),
        ));
    }
    Ok(percent)
}

pub async fn get_all(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    let releases = ReleaseRepo::get_all(&mut *conn, params).await?;
    Ok(Json(releases))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(release_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    let release = ReleaseRepo::get_by_id(&mut *conn, release_id)
        .await?
        .ok_or(ApiError::NotFound("release"))?;
    Ok(Json(release))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateReleaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.platform.trim().is_empty() {
        return Err(ApiError::Validation("platform is required".to_string()));
    }
    if body.version.trim().is_empty() || body.minimum.trim().is_empty() {
        return Err(ApiError::Validation(
            "version and minimum are required".to_string(),
        ));
    }
    let rollout_percent = validate_percent(body.rollout_percent.unwrap_or(100))?;

    let new_release = NewRelease {
        platform: body.platform,
        version: body.version,
        minimum: body.minimum,
        rollout_percent,
        notes: body.notes.unwrap_or_default(),
        active: body.active.unwrap_or(true),
        created_by: Some(user.id),
    };

    let mut conn = state.repo.acquire().await?;
    let release_id = ReleaseRepo::create(&mut *conn, new_release).await?;
    let release = ReleaseRepo::get_by_id(&mut *conn, release_id)
        .await?
        .ok_or(ApiError::InternalFailure())?;

    info!("Created release {} for {}", release.id, release.platform);
    Ok((StatusCode::CREATED, Json(release)))
}

/// Partial update; absent fields keep their stored value.
pub async fn update(
    State(state): State<AppState>,
    Path(release_id): Path<Uuid>,
    Json(body): Json<UpdateReleaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    let mut release = ReleaseRepo::get_by_id(&mut *conn, release_id)
        .await?
        .ok_or(ApiError::NotFound("release"))?;

    if let Some(platform) = body.platform {
        if platform.trim().is_empty() {
            return Err(ApiError::Validation("platform must not be empty".to_string()));
        }
        release.platform = platform;
    }
    if let Some(version) = body.version {
        if version.trim().is_empty() {
            return Err(ApiError::Validation("version must not be empty".to_string()));
        }
        release.version = version;
    }
    if let Some(minimum) = body.minimum {
        if minimum.trim().is_empty() {
            return Err(ApiError::Validation("minimum must not be empty".to_string()));
        }
        release.minimum = minimum;
    }
    if let Some(percent) = body.rollout_percent {
        release.rollout_percent = validate_percent(percent)?;
    }
    if let Some(notes) = body.notes {
        release.notes = notes;
    }
    if let Some(active) = body.active {
        release.active = active;
    }

    ReleaseRepo::update(&mut *conn, release.clone())
        .await?
        .ok_or(ApiError::NotFound("release"))?;

    let release = ReleaseRepo::get_by_id(&mut *conn, release_id)
        .await?
        .ok_or(ApiError::NotFound("release"))?;
    Ok(Json(release))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(release_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    ReleaseRepo::get_by_id(&mut *conn, release_id)
        .await?
        .ok_or(ApiError::NotFound("release"))?;

    ReleaseRepo::remove(&mut *conn, release_id).await?;
    info!("Removed release {}", release_id);
    Ok(Json(json!({ "message": "Release removed" })))
}

pub async fn get_whitelist(
    State(state): State<AppState>,
    Path(release_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    ReleaseRepo::get_by_id(&mut *conn, release_id)
        .await?
        .ok_or(ApiError::NotFound("release"))?;

    let entries = WhitelistRepo::get_for_release(&mut *conn, release_id).await?;
    Ok(Json(entries))
}

/// Whitelisting the same identifier twice for one release returns 409.
pub async fn add_to_whitelist(
    State(state): State<AppState>,
    Path(release_id): Path<Uuid>,
    Json(body): Json<CreateWhitelistRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.identifier.trim().is_empty() {
        return Err(ApiError::Validation("identifier is required".to_string()));
    }

    let mut conn = state.repo.acquire().await?;
    ReleaseRepo::get_by_id(&mut *conn, release_id)
        .await?
        .ok_or(ApiError::NotFound("release"))?;

    let entry_id = WhitelistRepo::create(
        &mut *conn,
        NewWhitelistEntry {
            release_id,
            kind: body.kind.unwrap_or_else(|| "device".to_string()),
            identifier: body.identifier,
            note: body.note.unwrap_or_default(),
        },
    )
    .await?;

    let entry = WhitelistRepo::get_by_id(&mut *conn, entry_id)
        .await?
        .ok_or(ApiError::InternalFailure())?;

    info!("Whitelisted {} for release {}", entry.identifier, release_id);
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn remove_from_whitelist(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;
    WhitelistRepo::get_by_id(&mut *conn, entry_id)
        .await?
        .ok_or(ApiError::NotFound("whitelist entry"))?;

    WhitelistRepo::remove(&mut *conn, entry_id).await?;
    Ok(Json(json!({ "message": "Whitelist entry removed" })))
}
