use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One published app version for one platform. History rows are kept; the
/// eligibility path only ever reads the newest active release per platform.
#[derive(Debug, Serialize, Deserialize, Clone, Default, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: Uuid,
    pub platform: String,
    pub version: String,
    pub minimum: String,
    pub rollout_percent: i32,
    pub notes: String,
    pub active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewRelease {
    pub platform: String,
    pub version: String,
    pub minimum: String,
    pub rollout_percent: i32,
    pub notes: String,
    pub active: bool,
    pub created_by: Option<Uuid>,
}

/// Grants one identifier early access to one release. `kind` ("type" on the
/// wire) classifies the identifier but is never consulted by eligibility.
#[derive(Debug, Serialize, Deserialize, Clone, Default, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistEntry {
    pub id: Uuid,
    pub release_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
    pub note: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewWhitelistEntry {
    pub release_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
    pub note: String,
}
