//! Database operations for `discovery_runs` and `discovery_run_regions`.
//!
//! Run rows track the lifecycle of one end-to-end discovery
//! (queued → running → succeeded/failed). Region rows record per-region
//! outcomes and serve as the resume checkpoint: a region with a `succeeded`
//! row from any prior run can be skipped.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `discovery_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DiscoveryRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub entities_discovered: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A row from the `discovery_run_regions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DiscoveryRunRegionRow {
    pub id: i64,
    pub discovery_run_id: i64,
    pub region_code: String,
    pub status: String,
    pub entity_count: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Creates a new discovery run in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_discovery_run(
    pool: &PgPool,
    trigger_source: &str,
) -> Result<DiscoveryRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, DiscoveryRunRow>(
        "INSERT INTO discovery_runs (public_id, trigger_source, status) \
         VALUES ($1, $2, 'queued') \
         RETURNING id, public_id, trigger_source, status, started_at, completed_at, \
                   entities_discovered, error_message, created_at",
    )
    .bind(public_id)
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `queued`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn start_discovery_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE discovery_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded` and records the total entities discovered.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn complete_discovery_run(
    pool: &PgPool,
    id: i64,
    entities_discovered: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE discovery_runs \
         SET status = 'succeeded', completed_at = NOW(), entities_discovered = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(entities_discovered)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed` with an error message.
///
/// Unlike the other transitions this is not status-guarded: a run may fail
/// from `queued` or `running`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn fail_discovery_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE discovery_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetches one run by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such run exists, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_discovery_run(pool: &PgPool, id: i64) -> Result<DiscoveryRunRow, DbError> {
    sqlx::query_as::<_, DiscoveryRunRow>(
        "SELECT id, public_id, trigger_source, status, started_at, completed_at, \
                entities_discovered, error_message, created_at \
         FROM discovery_runs WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Records (or updates) the outcome of one region within a run.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_run_region(
    pool: &PgPool,
    run_id: i64,
    region_code: &str,
    status: &str,
    entity_count: i32,
    error_message: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO discovery_run_regions \
             (discovery_run_id, region_code, status, entity_count, error_message) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (discovery_run_id, region_code) DO UPDATE SET \
             status        = EXCLUDED.status, \
             entity_count  = EXCLUDED.entity_count, \
             error_message = EXCLUDED.error_message",
    )
    .bind(run_id)
    .bind(region_code)
    .bind(status)
    .bind(entity_count)
    .bind(error_message)
    .execute(pool)
    .await?;

    Ok(())
}

/// Whether any prior run fully covered this region.
///
/// A region counts as covered once it has a `succeeded` row, even with an
/// entity count of zero — some regions legitimately contain nothing, and
/// re-searching them on every resume would burn quota for no new data.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn region_already_covered(pool: &PgPool, region_code: &str) -> Result<bool, DbError> {
    let covered = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(\
             SELECT 1 FROM discovery_run_regions \
             WHERE region_code = $1 AND status = 'succeeded')",
    )
    .bind(region_code)
    .fetch_one(pool)
    .await?;

    Ok(covered)
}
