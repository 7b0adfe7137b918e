//! HTTP client for the Places v1 REST API.
//!
//! Two endpoints are used: `POST places:searchNearby` for coarse circle
//! searches and `GET places/{id}` for full records. Both authenticate with the
//! `X-Goog-Api-Key` header and select fields with `X-Goog-FieldMask`.

use std::time::Duration;

use hhscan_core::LatLng;
use reqwest::{Client, Response, Url};
use serde::Serialize;

use crate::error::PlacesError;
use crate::types::{Candidate, LatLngLiteral, NearbyPage, NearbySearchResponse, PlaceDetail};

const DEFAULT_BASE_URL: &str = "https://places.googleapis.com/v1/";
const DEFAULT_USER_AGENT: &str = "hhscan/0.1 (place-discovery)";

/// Characters of an error body kept in [`PlacesError::UnexpectedStatus`].
const ERROR_BODY_LIMIT: usize = 200;

/// Fields requested from a nearby search. Just enough to run the admission filter.
pub const NEARBY_FIELD_MASK: &str = "places.id,places.displayName,places.location,\
places.primaryType,places.businessStatus,places.regularOpeningHours,\
places.regularSecondaryOpeningHours";

/// Fields requested from a place detail lookup.
pub const DETAIL_FIELD_MASK: &str = "id,displayName,location,formattedAddress,primaryType,\
types,websiteUri,businessStatus,nationalPhoneNumber,rating,userRatingCount,priceLevel,\
photos,editorialSummary,regularOpeningHours,regularSecondaryOpeningHours";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NearbySearchRequest<'a> {
    included_types: &'a [String],
    location_restriction: LocationRestriction,
}

#[derive(Debug, Serialize)]
struct LocationRestriction {
    circle: Circle,
}

#[derive(Debug, Serialize)]
struct Circle {
    center: LatLngLiteral,
    radius: f64,
}

/// Client for the Places v1 API.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    included_types: Vec<String>,
}

impl PlacesClient {
    /// Creates a client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_USER_AGENT, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`PlacesError::InvalidBaseUrl`] if `base_url` cannot carry a path.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let base_url = Url::parse(base_url)
            .map_err(|e| PlacesError::InvalidBaseUrl(format!("'{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(PlacesError::InvalidBaseUrl(format!(
                "'{base_url}' cannot carry a path"
            )));
        }

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            included_types: Vec::new(),
        })
    }

    /// Restricts nearby searches to the given provider categories.
    #[must_use]
    pub fn with_included_types(mut self, included_types: Vec<String>) -> Self {
        self.included_types = included_types;
        self
    }

    #[must_use]
    pub fn included_types(&self) -> &[String] {
        &self.included_types
    }

    /// Searches a circle around `center`.
    ///
    /// The radius is rounded up to whole meters, so the circle never shrinks
    /// below the requested size. Individual entries that fail to parse are
    /// skipped with a warning but still counted in [`NearbyPage::returned`].
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure or timeout.
    /// - [`PlacesError::UnexpectedStatus`] on a non-2xx response.
    /// - [`PlacesError::Deserialize`] if the body is not the expected envelope.
    pub async fn search_nearby(
        &self,
        center: LatLng,
        radius_m: f64,
    ) -> Result<NearbyPage, PlacesError> {
        let url = self.endpoint(&["places:searchNearby"])?;
        let request = NearbySearchRequest {
            included_types: &self.included_types,
            location_restriction: LocationRestriction {
                circle: Circle {
                    center: center.into(),
                    radius: radius_m.ceil(),
                },
            },
        };

        let response = self
            .client
            .post(url.clone())
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", NEARBY_FIELD_MASK)
            .json(&request)
            .send()
            .await?;
        let body = Self::read_success_body(&url, response).await?;

        let envelope: NearbySearchResponse =
            serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
                context: format!("searchNearby(center={},{})", center.lat, center.lng),
                source: e,
            })?;

        let returned = envelope.places.len();
        let candidates = envelope
            .places
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Candidate>(value) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unparseable nearby-search entry");
                    None
                }
            })
            .collect();

        Ok(NearbyPage {
            returned,
            candidates,
        })
    }

    /// Fetches the full record for `place_id`.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure or timeout.
    /// - [`PlacesError::UnexpectedStatus`] on a non-2xx response.
    /// - [`PlacesError::Deserialize`] if the body is not JSON or a typed field
    ///   has the wrong shape.
    pub async fn get_place(&self, place_id: &str) -> Result<PlaceDetail, PlacesError> {
        let url = self.endpoint(&["places", place_id])?;
        let response = self
            .client
            .get(url.clone())
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", DETAIL_FIELD_MASK)
            .send()
            .await?;
        let body = Self::read_success_body(&url, response).await?;

        let raw: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
                context: format!("getPlace(id={place_id})"),
                source: e,
            })?;
        PlaceDetail::from_value(raw).map_err(|e| PlacesError::Deserialize {
            context: format!("getPlace(id={place_id})"),
            source: e,
        })
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PlacesError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| PlacesError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Returns the body text of a 2xx response, or an `UnexpectedStatus`
    /// carrying the start of the body otherwise.
    async fn read_success_body(url: &Url, response: Response) -> Result<String, PlacesError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PlacesError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> PlacesClient {
        PlacesClient::with_base_url("test-key", 30, DEFAULT_USER_AGENT, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_keeps_versioned_base_path() {
        let client = test_client("https://places.googleapis.com/v1/");
        let url = client.endpoint(&["places:searchNearby"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://places.googleapis.com/v1/places:searchNearby"
        );
    }

    #[test]
    fn endpoint_works_without_trailing_slash() {
        let client = test_client("http://127.0.0.1:9999");
        let url = client.endpoint(&["places", "abc123"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9999/places/abc123");
    }

    #[test]
    fn endpoint_encodes_place_id() {
        let client = test_client("https://places.googleapis.com/v1/");
        let url = client.endpoint(&["places", "a/b c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://places.googleapis.com/v1/places/a%2Fb%20c"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = PlacesClient::with_base_url("k", 30, DEFAULT_USER_AGENT, "not a url");
        assert!(matches!(result, Err(PlacesError::InvalidBaseUrl(_))));
    }

    #[test]
    fn cannot_be_a_base_url_is_rejected() {
        let result = PlacesClient::with_base_url("k", 30, DEFAULT_USER_AGENT, "mailto:x@y.z");
        assert!(matches!(result, Err(PlacesError::InvalidBaseUrl(_))));
    }

    #[test]
    fn nearby_request_serializes_to_provider_shape() {
        let types = vec!["bar".to_string()];
        let request = NearbySearchRequest {
            included_types: &types,
            location_restriction: LocationRestriction {
                circle: Circle {
                    center: LatLng::new(30.0, -97.0).into(),
                    radius: 707.2_f64.ceil(),
                },
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "includedTypes": ["bar"],
                "locationRestriction": {
                    "circle": {
                        "center": { "latitude": 30.0, "longitude": -97.0 },
                        "radius": 708.0
                    }
                }
            })
        );
    }
}
