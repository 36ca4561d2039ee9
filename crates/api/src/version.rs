use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};
use data::release::Release;
use repos::release::{ReleaseRepo, WhitelistRepo};
use rollout::{Client, ReleaseTerms, Verdict};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionQuery {
    pub platform: Option<String>,
    pub identifier: Option<String>,
    pub client_version: Option<String>,
}

/// Release fields exposed to clients. Audit columns stay internal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicRelease {
    pub id: Uuid,
    pub platform: String,
    pub version: String,
    pub minimum: String,
    pub rollout_percent: i32,
    pub notes: String,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl From<Release> for PublicRelease {
    fn from(release: Release) -> Self {
        Self {
            id: release.id,
            platform: release.platform,
            version: release.version,
            minimum: release.minimum,
            rollout_percent: release.rollout_percent,
            notes: release.notes,
            active: release.active,
            created_at: release.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<PublicRelease>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollout: Option<Verdict>,
}

/// GET /version?platform=android&identifier=...&clientVersion=...
///
/// Reads a snapshot of the newest active release for the platform plus its
/// whitelist and hands both to the eligibility resolver. No active release
/// is a valid outcome, not an error.
pub async fn get_release_for_identifier(
    State(state): State<AppState>,
    Query(query): Query<VersionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let platform = query.platform.as_deref().unwrap_or("android");

    let mut conn = state.repo.acquire().await?;

    let Some(release) = ReleaseRepo::find_active(&mut *conn, platform).await? else {
        return Ok(Json(VersionResponse {
            found: false,
            release: None,
            rollout: None,
        }));
    };

    let whitelist = WhitelistRepo::get_for_release(&mut *conn, release.id).await?;
    let identifiers: Vec<&str> = whitelist.iter().map(|entry| entry.identifier.as_str()).collect();

    let verdict = state.resolver.resolve(
        &ReleaseTerms {
            version: &release.version,
            minimum: &release.minimum,
            rollout_percent: release.rollout_percent,
        },
        &identifiers,
        &Client {
            identifier: query.identifier.as_deref(),
            version: query.client_version.as_deref(),
        },
    );

    Ok(Json(VersionResponse {
        found: true,
        release: Some(release.into()),
        rollout: Some(verdict),
    }))
}
