//! CSV mirror of the most recently flushed batch, for eyeballing a run.

use std::path::Path;

use hhscan_core::{BusinessStatus, PlaceRow};
use serde::Serialize;

use crate::error::SinkError;

/// One CSV line. Nested JSON columns are written as compact JSON text.
#[derive(Debug, Serialize)]
struct SnapshotRecord<'a> {
    place_id: &'a str,
    name: Option<&'a str>,
    address: Option<&'a str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    rating: Option<f64>,
    user_rating_count: Option<i64>,
    price_level: Option<&'a str>,
    phone: Option<&'a str>,
    website: Option<&'a str>,
    categories: String,
    primary_type: Option<&'a str>,
    regular_hours: Option<String>,
    secondary_hours: Option<String>,
    editorial_summary: Option<&'a str>,
    business_status: Option<&'static str>,
    photos: Option<String>,
    raw_json: String,
}

impl<'a> From<&'a PlaceRow> for SnapshotRecord<'a> {
    fn from(row: &'a PlaceRow) -> Self {
        Self {
            place_id: &row.place_id,
            name: row.name.as_deref(),
            address: row.address.as_deref(),
            latitude: row.latitude,
            longitude: row.longitude,
            rating: row.rating,
            user_rating_count: row.user_rating_count,
            price_level: row.price_level.as_deref(),
            phone: row.phone.as_deref(),
            website: row.website.as_deref(),
            categories: row.categories.join("|"),
            primary_type: row.primary_type.as_deref(),
            regular_hours: row.regular_hours.as_ref().map(ToString::to_string),
            secondary_hours: row.secondary_hours.as_ref().map(ToString::to_string),
            editorial_summary: row.editorial_summary.as_deref(),
            business_status: row.business_status.map(BusinessStatus::as_str),
            photos: row.photos.as_ref().map(ToString::to_string),
            raw_json: row.raw_json.to_string(),
        }
    }
}

/// Replaces the file at `path` with `rows`, header first.
///
/// # Errors
///
/// Returns [`SinkError::Snapshot`] if the file cannot be created or a record
/// cannot be written, and [`SinkError::Io`] if the final flush fails.
pub fn write_snapshot(path: &Path, rows: &[PlaceRow]) -> Result<(), SinkError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(SnapshotRecord::from(row))?;
    }
    writer.flush()?;
    Ok(())
}
