//! The provider seam the engine drives, and its Places API implementation.

use std::future::Future;

use hhscan_core::LatLng;
use hhscan_places::{NearbyPage, PlaceDetail, PlacesClient};

/// A paid place-search backend.
///
/// Both calls are infallible from the engine's point of view: failures degrade
/// to "no results" or "absent", so one bad response cannot stop a run.
pub trait SearchProvider {
    /// One coarse circle search. The page's `returned` count is the number of
    /// entries the backend sent, parsed or not.
    fn search_near(
        &self,
        center: LatLng,
        radius_m: f64,
    ) -> impl Future<Output = NearbyPage> + Send;

    /// One detail lookup. `None` when the record could not be obtained.
    fn fetch_detail(&self, place_id: &str) -> impl Future<Output = Option<PlaceDetail>> + Send;
}

impl SearchProvider for PlacesClient {
    async fn search_near(&self, center: LatLng, radius_m: f64) -> NearbyPage {
        match self.search_nearby(center, radius_m).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    lat = center.lat,
                    lng = center.lng,
                    radius_m,
                    error = %e,
                    "nearby search failed; treating cell as empty"
                );
                NearbyPage::default()
            }
        }
    }

    async fn fetch_detail(&self, place_id: &str) -> Option<PlaceDetail> {
        match self.get_place(place_id).await {
            Ok(detail) if detail.is_empty() => {
                tracing::warn!(place_id, "place detail came back empty; skipping");
                None
            }
            Ok(detail) => Some(detail),
            Err(e) => {
                tracing::warn!(place_id, error = %e, "place detail failed; skipping");
                None
            }
        }
    }
}
