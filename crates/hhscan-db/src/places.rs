//! Database operations for the `places` table.

use std::collections::HashMap;

use hhscan_core::PlaceRow;
use sqlx::PgPool;

/// Insert or replace a batch of places keyed by `place_id`.
///
/// Returns `(new_count, updated_count)`. Existing rows have every column
/// replaced and `last_seen_at` bumped; `first_seen_at` is kept.
///
/// The whole batch goes through one `INSERT … SELECT * FROM UNNEST(…)
/// ON CONFLICT` round-trip. A place id repeated within the batch keeps its
/// last occurrence, since Postgres refuses to update the same row twice in
/// one statement.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn upsert_places(pool: &PgPool, rows: &[PlaceRow]) -> Result<(u64, u64), sqlx::Error> {
    let rows = dedupe_keep_last(rows);
    if rows.is_empty() {
        return Ok((0, 0));
    }

    let mut place_ids: Vec<String> = Vec::with_capacity(rows.len());
    let mut names: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut addresses: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut latitudes: Vec<Option<f64>> = Vec::with_capacity(rows.len());
    let mut longitudes: Vec<Option<f64>> = Vec::with_capacity(rows.len());
    let mut ratings: Vec<Option<f64>> = Vec::with_capacity(rows.len());
    let mut rating_counts: Vec<Option<i64>> = Vec::with_capacity(rows.len());
    let mut price_levels: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut phones: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut websites: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut categories: Vec<serde_json::Value> = Vec::with_capacity(rows.len());
    let mut primary_types: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut regular_hours: Vec<Option<serde_json::Value>> = Vec::with_capacity(rows.len());
    let mut secondary_hours: Vec<Option<serde_json::Value>> = Vec::with_capacity(rows.len());
    let mut summaries: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut statuses: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut photos: Vec<Option<serde_json::Value>> = Vec::with_capacity(rows.len());
    let mut raw_jsons: Vec<serde_json::Value> = Vec::with_capacity(rows.len());

    for row in &rows {
        place_ids.push(row.place_id.clone());
        names.push(row.name.clone());
        addresses.push(row.address.clone());
        latitudes.push(row.latitude);
        longitudes.push(row.longitude);
        ratings.push(row.rating);
        rating_counts.push(row.user_rating_count);
        price_levels.push(row.price_level.clone());
        phones.push(row.phone.clone());
        websites.push(row.website.clone());
        categories.push(serde_json::Value::from(row.categories.clone()));
        primary_types.push(row.primary_type.clone());
        regular_hours.push(row.regular_hours.clone());
        secondary_hours.push(row.secondary_hours.clone());
        summaries.push(row.editorial_summary.clone());
        statuses.push(row.business_status.map(|s| s.as_str().to_string()));
        photos.push(row.photos.clone());
        raw_jsons.push(row.raw_json.clone());
    }

    let results: Vec<bool> = sqlx::query_scalar::<_, bool>(
        "INSERT INTO places \
             (place_id, name, address, latitude, longitude, rating, user_rating_count, \
              price_level, phone, website, categories, primary_type, regular_hours, \
              secondary_hours, editorial_summary, business_status, photos, raw_json) \
         SELECT * FROM UNNEST(\
              $1::text[], $2::text[], $3::text[], $4::float8[], $5::float8[], $6::float8[], \
              $7::int8[], $8::text[], $9::text[], $10::text[], $11::jsonb[], $12::text[], \
              $13::jsonb[], $14::jsonb[], $15::text[], $16::text[], $17::jsonb[], $18::jsonb[]) \
         ON CONFLICT (place_id) DO UPDATE SET \
             name              = EXCLUDED.name, \
             address           = EXCLUDED.address, \
             latitude          = EXCLUDED.latitude, \
             longitude         = EXCLUDED.longitude, \
             rating            = EXCLUDED.rating, \
             user_rating_count = EXCLUDED.user_rating_count, \
             price_level       = EXCLUDED.price_level, \
             phone             = EXCLUDED.phone, \
             website           = EXCLUDED.website, \
             categories        = EXCLUDED.categories, \
             primary_type      = EXCLUDED.primary_type, \
             regular_hours     = EXCLUDED.regular_hours, \
             secondary_hours   = EXCLUDED.secondary_hours, \
             editorial_summary = EXCLUDED.editorial_summary, \
             business_status   = EXCLUDED.business_status, \
             photos            = EXCLUDED.photos, \
             raw_json          = EXCLUDED.raw_json, \
             last_seen_at      = NOW() \
         RETURNING (xmax = 0) AS is_new",
    )
    .bind(&place_ids)
    .bind(&names)
    .bind(&addresses)
    .bind(&latitudes)
    .bind(&longitudes)
    .bind(&ratings)
    .bind(&rating_counts)
    .bind(&price_levels)
    .bind(&phones)
    .bind(&websites)
    .bind(&categories)
    .bind(&primary_types)
    .bind(&regular_hours)
    .bind(&secondary_hours)
    .bind(&summaries)
    .bind(&statuses)
    .bind(&photos)
    .bind(&raw_jsons)
    .fetch_all(pool)
    .await?;

    let new_count = results.iter().filter(|&&is_new| is_new).count() as u64;
    let updated_count = results.len() as u64 - new_count;

    Ok((new_count, updated_count))
}

/// Every persisted place id, for seeding a resumed run's seen set.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_place_ids(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT place_id FROM places")
        .fetch_all(pool)
        .await
}

/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_places(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM places")
        .fetch_one(pool)
        .await
}

/// Drops earlier duplicates of a place id, keeping batch order otherwise.
fn dedupe_keep_last(rows: &[PlaceRow]) -> Vec<&PlaceRow> {
    let last_index: HashMap<&str, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (r.place_id.as_str(), i))
        .collect();
    rows.iter()
        .enumerate()
        .filter(|(i, r)| last_index.get(r.place_id.as_str()) == Some(i))
        .map(|(_, r)| r)
        .collect()
}
