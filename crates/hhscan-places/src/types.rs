//! Places v1 wire types.
//!
//! Only the fields the search engine inspects are typed. Detail responses keep
//! the full untouched payload next to the typed view so provider schema changes
//! never lose data.

use hhscan_core::{BusinessStatus, LatLng};
use serde::{Deserialize, Deserializer, Serialize};

/// `{"latitude": .., "longitude": ..}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngLiteral {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<LatLngLiteral> for LatLng {
    fn from(p: LatLngLiteral) -> Self {
        LatLng::new(p.latitude, p.longitude)
    }
}

impl From<LatLng> for LatLngLiteral {
    fn from(p: LatLng) -> Self {
        Self {
            latitude: p.lat,
            longitude: p.lng,
        }
    }
}

/// `{"text": .., "languageCode": ..}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

/// One `regularSecondaryOpeningHours` section.
///
/// The section tag has appeared under two names over the provider's lifetime;
/// both are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryHours {
    #[serde(default)]
    pub secondary_hours_type: Option<String>,
    #[serde(default, rename = "type")]
    pub legacy_type: Option<String>,
}

impl SecondaryHours {
    /// The section tag, preferring `secondaryHoursType` and skipping blanks.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.secondary_hours_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.legacy_type.as_deref().filter(|s| !s.is_empty()))
    }
}

/// Lightweight descriptor returned by a nearby search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<LocalizedText>,
    #[serde(default)]
    pub location: Option<LatLngLiteral>,
    #[serde(default)]
    pub primary_type: Option<String>,
    #[serde(default)]
    pub business_status: Option<BusinessStatus>,
    #[serde(default)]
    pub regular_opening_hours: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub regular_secondary_opening_hours: Vec<SecondaryHours>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Candidate {
    /// The id, if present and non-empty.
    #[must_use]
    pub fn place_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|s| !s.is_empty())
    }

    /// `true` when any secondary-hours section carries `tag` (ASCII case-insensitive).
    #[must_use]
    pub fn has_secondary_hours(&self, tag: &str) -> bool {
        self.regular_secondary_opening_hours
            .iter()
            .filter_map(SecondaryHours::tag)
            .any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// One nearby-search response.
///
/// `returned` counts every entry the provider sent, including ones that could
/// not be parsed into a [`Candidate`]. Saturation is judged on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NearbyPage {
    pub returned: usize,
    pub candidates: Vec<Candidate>,
}

impl From<Vec<Candidate>> for NearbyPage {
    fn from(candidates: Vec<Candidate>) -> Self {
        Self {
            returned: candidates.len(),
            candidates,
        }
    }
}

/// Body of a `places:searchNearby` response. `places` is omitted when empty.
#[derive(Debug, Deserialize)]
pub(crate) struct NearbySearchResponse {
    #[serde(default)]
    pub places: Vec<serde_json::Value>,
}

/// Typed view over a detail payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailFields {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<LocalizedText>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub location: Option<LatLngLiteral>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_rating_count: Option<i64>,
    #[serde(default)]
    pub price_level: Option<String>,
    #[serde(default)]
    pub national_phone_number: Option<String>,
    #[serde(default)]
    pub website_uri: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub primary_type: Option<String>,
    #[serde(default)]
    pub business_status: Option<BusinessStatus>,
    #[serde(default)]
    pub regular_opening_hours: Option<serde_json::Value>,
    #[serde(default)]
    pub regular_secondary_opening_hours: Option<serde_json::Value>,
    #[serde(default)]
    pub editorial_summary: Option<LocalizedText>,
    #[serde(default)]
    pub photos: Option<serde_json::Value>,
}

/// A full place record: the typed fields plus the untouched provider payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetail {
    pub fields: DetailFields,
    pub raw: serde_json::Value,
}

impl PlaceDetail {
    /// Builds the typed view from a raw payload, keeping the payload.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when a typed field has the wrong shape.
    pub fn from_value(raw: serde_json::Value) -> Result<Self, serde_json::Error> {
        let fields = DetailFields::deserialize(&raw)?;
        Ok(Self { fields, raw })
    }

    #[must_use]
    pub fn place_id(&self) -> Option<&str> {
        self.fields.id.as_deref().filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.fields
            .display_name
            .as_ref()
            .and_then(|t| t.text.as_deref())
    }

    /// `true` for a `{}` or `null` payload, which the provider can return in
    /// place of an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.raw {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}
