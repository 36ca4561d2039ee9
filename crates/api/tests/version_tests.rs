#![cfg(test)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use sqlx::PgPool;
use testware::{create_settings, create_test_release, create_test_whitelist_entry};
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

async fn get_version(app: Router, query: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/version?{query}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_no_active_release_reports_not_found(pool: PgPool) {
    let app = setup(&pool).await;

    // Inactive releases are never served.
    create_test_release(&pool, "android", "2.0.0", "1.0.0", 100, false).await;

    let (status, body) = get_version(app, "platform=android&clientVersion=1.0.0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["found"], false);
    assert!(body.get("release").is_none());
    assert!(body.get("rollout").is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_client_below_minimum_must_update(pool: PgPool) {
    let app = setup(&pool).await;
    create_test_release(&pool, "android", "2.0.0", "1.5.0", 0, true).await;

    // Forced update wins even at zero percent rollout.
    let (status, body) =
        get_version(app, "platform=android&identifier=device-1&clientVersion=1.0.0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["found"], true);
    assert_eq!(body["rollout"]["mustUpdate"], true);
    assert_eq!(body["rollout"]["optionalUpdate"], false);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_current_client_outside_rollout_gets_nothing(pool: PgPool) {
    let app = setup(&pool).await;
    create_test_release(&pool, "android", "2.0.0", "1.5.0", 0, true).await;

    let (status, body) =
        get_version(app, "platform=android&identifier=device-1&clientVersion=1.6.0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rollout"]["inRollout"], false);
    assert_eq!(body["rollout"]["mustUpdate"], false);
    assert_eq!(body["rollout"]["optionalUpdate"], false);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_full_rollout_offers_optional_update(pool: PgPool) {
    let app = setup(&pool).await;
    create_test_release(&pool, "android", "2.0.0", "1.0.0", 100, true).await;

    let (status, body) =
        get_version(app, "platform=android&identifier=device-1&clientVersion=1.5.0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rollout"]["inRollout"], true);
    assert_eq!(body["rollout"]["mustUpdate"], false);
    assert_eq!(body["rollout"]["optionalUpdate"], true);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_whitelisted_identifier_bypasses_rollout(pool: PgPool) {
    let app = setup(&pool).await;
    let release = create_test_release(&pool, "android", "2.0.0", "1.0.0", 0, true).await;
    create_test_whitelist_entry(&pool, release.id, "device-1").await;

    let (_, body) = get_version(
        setup(&pool).await,
        "platform=android&identifier=device-1&clientVersion=1.5.0",
    )
    .await;
    assert_eq!(body["rollout"]["inWhitelist"], true);
    assert_eq!(body["rollout"]["optionalUpdate"], true);

    // Whitelist matching is exact and case sensitive.
    let (_, body) = get_version(
        app,
        "platform=android&identifier=DEVICE-1&clientVersion=1.5.0",
    )
    .await;
    assert_eq!(body["rollout"]["inWhitelist"], false);
    assert_eq!(body["rollout"]["optionalUpdate"], false);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_whitelisted_client_already_current_gets_nothing(pool: PgPool) {
    let app = setup(&pool).await;
    let release = create_test_release(&pool, "android", "2.0.0", "1.0.0", 0, true).await;
    create_test_whitelist_entry(&pool, release.id, "device-1").await;

    let (_, body) =
        get_version(app, "platform=android&identifier=device-1&clientVersion=2.0.0").await;
    assert_eq!(body["rollout"]["inWhitelist"], true);
    assert_eq!(body["rollout"]["optionalUpdate"], false);
    assert_eq!(body["rollout"]["mustUpdate"], false);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_anonymous_client_only_counted_at_full_rollout(pool: PgPool) {
    create_test_release(&pool, "android", "2.0.0", "1.0.0", 99, true).await;

    let (_, body) = get_version(setup(&pool).await, "platform=android&clientVersion=1.5.0").await;
    assert_eq!(body["rollout"]["inRollout"], false);
    assert_eq!(body["rollout"]["optionalUpdate"], false);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_empty_identifier_counts_as_anonymous(pool: PgPool) {
    create_test_release(&pool, "android", "2.0.0", "1.0.0", 99, true).await;

    // An empty identifier query value must not be bucketed into a partial
    // rollout.
    let (_, body) = get_version(
        setup(&pool).await,
        "platform=android&identifier=&clientVersion=1.5.0",
    )
    .await;
    assert_eq!(body["rollout"]["inRollout"], false);
    assert_eq!(body["rollout"]["inWhitelist"], false);
    assert_eq!(body["rollout"]["optionalUpdate"], false);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_missing_client_version_never_forces_update(pool: PgPool) {
    create_test_release(&pool, "android", "2.0.0", "1.5.0", 100, true).await;

    let (_, body) = get_version(setup(&pool).await, "platform=android&identifier=device-1").await;
    assert_eq!(body["rollout"]["mustUpdate"], false);
    assert_eq!(body["rollout"]["optionalUpdate"], true);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_platform_defaults_to_android(pool: PgPool) {
    create_test_release(&pool, "ios", "2.0.0", "1.0.0", 100, true).await;

    let (_, body) = get_version(setup(&pool).await, "clientVersion=1.0.0").await;
    assert_eq!(body["found"], false);

    let (_, body) = get_version(setup(&pool).await, "platform=ios&clientVersion=1.0.0").await;
    assert_eq!(body["found"], true);
    assert_eq!(body["release"]["platform"], "ios");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_newest_active_release_wins(pool: PgPool) {
    create_test_release(&pool, "android", "1.9.0", "1.0.0", 100, true).await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    create_test_release(&pool, "android", "2.0.0", "1.0.0", 100, true).await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    create_test_release(&pool, "android", "2.1.0", "1.0.0", 100, false).await;

    let (_, body) = get_version(setup(&pool).await, "platform=android&clientVersion=1.0.0").await;
    assert_eq!(body["release"]["version"], "2.0.0");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_release_payload_hides_audit_fields(pool: PgPool) {
    create_test_release(&pool, "android", "2.0.0", "1.0.0", 100, true).await;

    let (_, body) = get_version(setup(&pool).await, "platform=android&clientVersion=1.0.0").await;
    let release = &body["release"];
    assert_eq!(release["rolloutPercent"], 100);
    assert!(release.get("createdBy").is_none());
    assert!(release.get("updatedAt").is_none());
}
