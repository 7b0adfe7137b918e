//! Database operations for `search_runs`.
//!
//! A run moves `queued` → `running` → `succeeded` | `failed`. Each transition
//! is guarded on the expected current status.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `search_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub region_kind: String,
    pub region_bounds: serde_json::Value,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub search_calls: i64,
    pub detail_calls: i64,
    pub places_saved: i64,
    pub budget_exhausted: bool,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Counters written when a run finishes, successfully or not.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunTotals {
    pub search_calls: i64,
    pub detail_calls: i64,
    pub places_saved: i64,
    pub budget_exhausted: bool,
}

const RUN_COLUMNS: &str = "id, public_id, region_kind, region_bounds, status, started_at, \
     completed_at, search_calls, detail_calls, places_saved, budget_exhausted, \
     error_message, created_at";

/// Creates a new run in `queued` status and returns the full row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_search_run(
    pool: &PgPool,
    region_kind: &str,
    region_bounds: &serde_json::Value,
) -> Result<SearchRunRow, DbError> {
    let row = sqlx::query_as::<_, SearchRunRow>(&format!(
        "INSERT INTO search_runs (public_id, region_kind, region_bounds, status) \
         VALUES ($1, $2, $3, 'queued') \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(region_kind)
    .bind(region_bounds)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidSearchRunTransition`] if the run is not queued,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn start_search_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE search_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidSearchRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded` and records its totals.
///
/// # Errors
///
/// Returns [`DbError::InvalidSearchRunTransition`] if the run is not
/// running, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_search_run(
    pool: &PgPool,
    id: i64,
    totals: &RunTotals,
) -> Result<(), DbError> {
    finish(pool, id, "succeeded", totals, None).await
}

/// Marks a run as `failed`, recording its totals so the spent calls are
/// still accounted for.
///
/// # Errors
///
/// Returns [`DbError::InvalidSearchRunTransition`] if the run is not
/// running, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_search_run(
    pool: &PgPool,
    id: i64,
    totals: &RunTotals,
    error_message: &str,
) -> Result<(), DbError> {
    finish(pool, id, "failed", totals, Some(error_message)).await
}

async fn finish(
    pool: &PgPool,
    id: i64,
    status: &str,
    totals: &RunTotals,
    error_message: Option<&str>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE search_runs \
         SET status = $1, completed_at = NOW(), search_calls = $2, detail_calls = $3, \
             places_saved = $4, budget_exhausted = $5, error_message = $6 \
         WHERE id = $7 AND status = 'running'",
    )
    .bind(status)
    .bind(totals.search_calls)
    .bind(totals.detail_calls)
    .bind(totals.places_saved)
    .bind(totals.budget_exhausted)
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidSearchRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_search_run(pool: &PgPool, id: i64) -> Result<SearchRunRow, DbError> {
    sqlx::query_as::<_, SearchRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM search_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_search_runs(pool: &PgPool, limit: i64) -> Result<Vec<SearchRunRow>, DbError> {
    let rows = sqlx::query_as::<_, SearchRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM search_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
