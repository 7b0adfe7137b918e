//! Rectangle geometry for the subdivision search.
//!
//! Distances use a local equirectangular approximation: a fixed meters-per-degree
//! for latitude and a cosine-scaled one for longitude at the cell's mean latitude.
//! That is cheap and only has to be good enough for a covering circle to contain
//! the whole cell.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const METERS_PER_LAT_DEGREE: f64 = 110_574.0;
const METERS_PER_LNG_DEGREE_AT_EQUATOR: f64 = 111_320.0;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Meters per degree of `(latitude, longitude)` at the given latitude.
#[must_use]
pub fn meters_per_degree(lat_deg: f64) -> (f64, f64) {
    (
        METERS_PER_LAT_DEGREE,
        METERS_PER_LNG_DEGREE_AT_EQUATOR * lat_deg.to_radians().cos(),
    )
}

/// An axis-aligned lat/lng rectangle given by its north-east and south-west corners.
///
/// `north >= south` is enforced by [`Bounds::new`]. East/west ordering is the
/// caller's responsibility; rectangles crossing the antimeridian are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub east: f64,
    pub south: f64,
    pub west: f64,
}

impl Bounds {
    /// Builds a rectangle from its four edges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRegion`] when an edge is not finite or
    /// `north < south`.
    pub fn new(north: f64, east: f64, south: f64, west: f64) -> Result<Self, ConfigError> {
        if ![north, east, south, west].iter().all(|v| v.is_finite()) {
            return Err(ConfigError::InvalidRegion(
                "rectangle edges must be finite numbers".to_string(),
            ));
        }
        if north < south {
            return Err(ConfigError::InvalidRegion(format!(
                "north latitude {north} is below south latitude {south}"
            )));
        }
        Ok(Self {
            north,
            east,
            south,
            west,
        })
    }

    #[must_use]
    pub fn north_east(&self) -> LatLng {
        LatLng::new(self.north, self.east)
    }

    #[must_use]
    pub fn south_west(&self) -> LatLng {
        LatLng::new(self.south, self.west)
    }

    #[must_use]
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    /// East-west extent in meters at the rectangle's mean latitude.
    #[must_use]
    pub fn width_m(&self) -> f64 {
        let (_, m_lng) = meters_per_degree(self.center().lat);
        (self.east - self.west) * m_lng
    }

    /// North-south extent in meters.
    #[must_use]
    pub fn height_m(&self) -> f64 {
        (self.north - self.south) * METERS_PER_LAT_DEGREE
    }

    #[must_use]
    pub fn longer_side_m(&self) -> f64 {
        self.width_m().max(self.height_m())
    }

    /// Half the rectangle's diagonal in meters.
    ///
    /// A circle of this radius centered on [`Bounds::center`] covers the whole
    /// rectangle.
    #[must_use]
    pub fn covering_radius_m(&self) -> f64 {
        let w = self.width_m();
        let h = self.height_m();
        0.5 * (w * w + h * h).sqrt()
    }

    /// Area in square degrees. Only meaningful as a ratio against other
    /// degree-space areas.
    #[must_use]
    pub fn area_deg2(&self) -> f64 {
        (self.north - self.south) * (self.east - self.west)
    }

    /// Splits at the midpoint of each axis into `[NW, NE, SW, SE]`.
    ///
    /// The quadrants share edges with each other and cover `self` exactly.
    #[must_use]
    pub fn quadrants(&self) -> [Bounds; 4] {
        let mid = self.center();
        [
            Bounds {
                north: self.north,
                east: mid.lng,
                south: mid.lat,
                west: self.west,
            },
            Bounds {
                north: self.north,
                east: self.east,
                south: mid.lat,
                west: mid.lng,
            },
            Bounds {
                north: mid.lat,
                east: mid.lng,
                south: self.south,
                west: self.west,
            },
            Bounds {
                north: mid.lat,
                east: self.east,
                south: self.south,
                west: mid.lng,
            },
        ]
    }

    /// `true` when the two rectangles share any area or edge.
    #[must_use]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.west <= other.east
            && other.west <= self.east
            && self.south <= other.north
            && other.south <= self.north
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NE=({:.5},{:.5}) SW=({:.5},{:.5})",
            self.north, self.east, self.south, self.west
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_km_at(lat: f64, lng: f64) -> Bounds {
        let (m_lat, m_lng) = meters_per_degree(lat);
        Bounds::new(lat + 1_000.0 / m_lat, lng + 1_000.0 / m_lng, lat, lng).unwrap()
    }

    #[test]
    fn new_rejects_inverted_latitudes() {
        let err = Bounds::new(10.0, 1.0, 11.0, 0.0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegion(_)));
    }

    #[test]
    fn new_rejects_non_finite_edges() {
        assert!(Bounds::new(f64::NAN, 1.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn width_narrows_with_latitude() {
        let low = Bounds::new(1.0, 1.0, 0.0, 0.0).unwrap();
        let high = Bounds::new(61.0, 1.0, 60.0, 0.0).unwrap();
        assert!(high.width_m() < low.width_m());
        // Same latitude span → same height regardless of where it sits.
        assert!((high.height_m() - low.height_m()).abs() < 1e-6);
    }

    #[test]
    fn covering_radius_is_half_diagonal() {
        let b = square_km_at(37.7, -122.4);
        let expected = 0.5 * (2.0_f64 * 1_000.0 * 1_000.0).sqrt();
        // Width is measured at the mean latitude, not the south edge.
        assert!((b.covering_radius_m() - expected).abs() < 1.0, "{}", b.covering_radius_m());
    }

    #[test]
    fn covering_circle_contains_every_corner() {
        let b = Bounds::new(37.8108, -122.3569, 37.7068, -122.5158).unwrap();
        let c = b.center();
        let (m_lat, m_lng) = meters_per_degree(c.lat);
        let r = b.covering_radius_m();
        for corner in [
            b.north_east(),
            b.south_west(),
            LatLng::new(b.north, b.west),
            LatLng::new(b.south, b.east),
        ] {
            let dy = (corner.lat - c.lat) * m_lat;
            let dx = (corner.lng - c.lng) * m_lng;
            assert!((dx * dx + dy * dy).sqrt() <= r + 1e-6);
        }
    }

    #[test]
    fn quadrants_tile_the_parent_exactly() {
        let b = Bounds::new(35.315_387, -120.622_404, 35.229_789, -120.721_626).unwrap();
        let q = b.quadrants();

        let total: f64 = q.iter().map(Bounds::area_deg2).sum();
        assert!((total - b.area_deg2()).abs() < 1e-15);

        assert_eq!(q[0].north, b.north);
        assert_eq!(q[0].west, b.west);
        assert_eq!(q[3].south, b.south);
        assert_eq!(q[3].east, b.east);

        // NW and NE share the vertical midline; NW and SW share the horizontal one.
        assert_eq!(q[0].east, q[1].west);
        assert_eq!(q[0].south, q[2].north);
        assert_eq!(q[3].west, q[2].east);
    }

    #[test]
    fn quadrants_halve_each_side() {
        let b = square_km_at(0.0, 0.0);
        for cell in b.quadrants() {
            assert!((cell.height_m() - b.height_m() / 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn intersects_detects_disjoint_rectangles() {
        let a = Bounds::new(1.0, 1.0, 0.0, 0.0).unwrap();
        let b = Bounds::new(3.0, 3.0, 2.0, 2.0).unwrap();
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Bounds::new(2.0, 2.0, 0.5, 0.5).unwrap()));
    }
}
