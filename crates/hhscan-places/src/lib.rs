pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::{PlacesClient, DETAIL_FIELD_MASK, NEARBY_FIELD_MASK};
pub use error::PlacesError;
pub use normalize::flatten_detail;
pub use types::{
    Candidate, DetailFields, LatLngLiteral, LocalizedText, NearbyPage, PlaceDetail,
    SecondaryHours,
};
