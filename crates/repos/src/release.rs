use sqlx::Postgres;
use tracing::error;
use uuid::Uuid;

use crate::error::{RepoError, handle_sql_error};
use crate::{QueryParams, Repo};
use data::release::{NewRelease, NewWhitelistEntry, Release, WhitelistEntry};
use sqlx::QueryBuilder;

pub struct ReleaseRepo {}

impl ReleaseRepo {
    /// Newest active release for a platform; the only query the eligibility
    /// path performs.
    pub async fn find_active(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        platform: &str,
    ) -> Result<Option<Release>, RepoError> {
        sqlx::query_as::<_, Release>(
            r#"
            SELECT *
            FROM foodline.releases
            WHERE platform = $1 AND active = TRUE
            ORDER BY created_at DESC
            LIMIT 1
        "#,
        )
        .bind(platform)
        .fetch_optional(executor)
        .await
        .map_err(|err| {
            error!("Failed to retrieve active release for {platform}: {err}");
            RepoError::DatabaseError("Failed to retrieve active release".to_string())
        })
    }

    pub async fn get_by_id(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        id: Uuid,
    ) -> Result<Option<Release>, RepoError> {
        sqlx::query_as::<_, Release>(
            r#"
            SELECT *
            FROM foodline.releases
            WHERE id = $1
        "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|err| {
            error!("Failed to retrieve release {id}: {err}");
            RepoError::DatabaseError("Failed to retrieve release".to_string())
        })
    }

    pub async fn get_all(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        params: QueryParams,
    ) -> Result<Vec<Release>, RepoError> {
        let mut builder = QueryBuilder::new("SELECT * FROM foodline.releases");
        Repo::build_query(
            &mut builder,
            &params,
            &["id", "platform", "version", "minimum", "notes", "active", "created_at"],
            &["platform", "version", "notes"],
        )?;

        let query = builder.build_query_as();

        query.fetch_all(executor).await.map_err(|err| {
            error!("Failed to retrieve all releases: {err}");
            RepoError::DatabaseError("Failed to retrieve releases".to_string())
        })
    }

    pub async fn create(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        release: NewRelease,
    ) -> Result<Uuid, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO foodline.releases
              (
                platform,
                version,
                minimum,
                rollout_percent,
                notes,
                active,
                created_by
              )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
              id
        "#,
        )
        .bind(release.platform)
        .bind(release.version)
        .bind(release.minimum)
        .bind(release.rollout_percent)
        .bind(release.notes)
        .bind(release.active)
        .bind(release.created_by)
        .fetch_one(executor)
        .await
        .map_err(handle_sql_error)
    }

    pub async fn update(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        release: Release,
    ) -> Result<Option<Uuid>, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE foodline.releases
            SET platform = $1, version = $2, minimum = $3, rollout_percent = $4,
                notes = $5, active = $6
            WHERE id = $7
            RETURNING id
        "#,
        )
        .bind(release.platform)
        .bind(release.version)
        .bind(release.minimum)
        .bind(release.rollout_percent)
        .bind(release.notes)
        .bind(release.active)
        .bind(release.id)
        .fetch_optional(executor)
        .await
        .map_err(handle_sql_error)
    }

    pub async fn remove(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        id: Uuid,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            DELETE FROM foodline.releases
            WHERE id = $1
        "#,
        )
        .bind(id)
        .execute(executor)
        .await
        .map_err(|err| {
            error!("Failed to remove release {id}: {err}");
            RepoError::DatabaseError("Failed to remove release".to_string())
        })?;

        Ok(())
    }
}

pub struct WhitelistRepo {}

impl WhitelistRepo {
    /// Whitelist snapshot read next to the release in the eligibility path.
    pub async fn get_for_release(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        release_id: Uuid,
    ) -> Result<Vec<WhitelistEntry>, RepoError> {
        sqlx::query_as::<_, WhitelistEntry>(
            r#"
            SELECT *
            FROM foodline.release_whitelist
            WHERE release_id = $1
            ORDER BY created_at DESC
        "#,
        )
        .bind(release_id)
        .fetch_all(executor)
        .await
        .map_err(|err| {
            error!("Failed to retrieve whitelist for release {release_id}: {err}");
            RepoError::DatabaseError("Failed to retrieve whitelist".to_string())
        })
    }

    pub async fn get_by_id(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        id: Uuid,
    ) -> Result<Option<WhitelistEntry>, RepoError> {
        sqlx::query_as::<_, WhitelistEntry>(
            r#"
            SELECT *
            FROM foodline.release_whitelist
            WHERE id = $1
        "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|err| {
            error!("Failed to retrieve whitelist entry {id}: {err}");
            RepoError::DatabaseError("Failed to retrieve whitelist entry".to_string())
        })
    }

    /// Duplicate `(release_id, identifier)` inserts surface as
    /// `RepoError::UniqueViolation` so callers can report "already
    /// whitelisted" instead of a generic failure.
    pub async fn create(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        entry: NewWhitelistEntry,
    ) -> Result<Uuid, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO foodline.release_whitelist
              (
                release_id,
                kind,
                identifier,
                note
              )
            VALUES ($1, $2, $3, $4)
            RETURNING
              id
        "#,
        )
        .bind(entry.release_id)
        .bind(entry.kind)
        .bind(entry.identifier)
        .bind(entry.note)
        .fetch_one(executor)
        .await
        .map_err(handle_sql_error)
    }

    pub async fn remove(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        id: Uuid,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            DELETE FROM foodline.release_whitelist
            WHERE id = $1
        "#,
        )
        .bind(id)
        .execute(executor)
        .await
        .map_err(|err| {
            error!("Failed to remove whitelist entry {id}: {err}");
            RepoError::DatabaseError("Failed to remove whitelist entry".to_string())
        })?;

        Ok(())
    }
}
