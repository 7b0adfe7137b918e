//! Flattening of Places detail payloads into [`PlaceRow`]s for persistence.

use hhscan_core::PlaceRow;

use crate::types::PlaceDetail;

/// Converts a [`PlaceDetail`] into the flat row written by the sink.
///
/// Returns `None` when the record has no usable id; such records are never
/// persisted.
#[must_use]
pub fn flatten_detail(detail: &PlaceDetail) -> Option<PlaceRow> {
    let place_id = detail.place_id()?.to_string();
    let fields = &detail.fields;

    Some(PlaceRow {
        place_id,
        name: detail.display_name().map(str::to_string),
        address: fields.formatted_address.clone(),
        latitude: fields.location.map(|l| l.latitude),
        longitude: fields.location.map(|l| l.longitude),
        rating: fields.rating,
        user_rating_count: fields.user_rating_count,
        price_level: fields.price_level.clone(),
        phone: fields.national_phone_number.clone(),
        website: fields.website_uri.clone(),
        categories: fields.types.clone(),
        primary_type: fields.primary_type.clone(),
        regular_hours: fields.regular_opening_hours.clone(),
        secondary_hours: fields.regular_secondary_opening_hours.clone(),
        editorial_summary: fields
            .editorial_summary
            .as_ref()
            .and_then(|s| s.text.clone()),
        business_status: fields.business_status,
        photos: fields.photos.clone(),
        raw_json: detail.raw.clone(),
    })
}
