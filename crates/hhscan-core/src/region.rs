//! Search regions: a plain rectangle or a polygon collection.
//!
//! The search engine only asks two things of a region: its bounding rectangle
//! (where the subdivision starts) and, per cell, what fraction of the cell's
//! area lies inside the region. Polygon parts are unioned once when the
//! region is built, so overlapping parts count their shared area once. Areas
//! are measured in degree space, the same `(lng, lat)` plane the GeoJSON
//! coordinates live in.

use std::path::Path;

use geo::{Area, BooleanOps, BoundingRect};
use geo_types::{coord, LineString, MultiPolygon, Polygon, Rect};
use serde::Deserialize;

use crate::geo::{Bounds, LatLng};
use crate::ConfigError;

/// One polygon: an exterior ring and zero or more holes.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonPart {
    pub exterior: Vec<LatLng>,
    pub holes: Vec<Vec<LatLng>>,
}

impl PolygonPart {
    fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(
            ring(&self.exterior),
            self.holes.iter().map(|h| ring(h)).collect(),
        )
    }
}

/// A polygon collection, possibly multi-part. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRegion {
    parts: Vec<PolygonPart>,
    shape: MultiPolygon<f64>,
    bounds: Bounds,
}

impl PolygonRegion {
    /// Builds a region from its parts, unioning any that overlap.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRegion`] if there are no parts, an
    /// exterior ring has fewer than three vertices, or the union has no
    /// extent.
    pub fn new(parts: Vec<PolygonPart>) -> Result<Self, ConfigError> {
        if parts.is_empty() {
            return Err(ConfigError::InvalidRegion(
                "polygon region has no polygons".to_string(),
            ));
        }
        if let Some(bad) = parts.iter().position(|p| p.exterior.len() < 3) {
            return Err(ConfigError::InvalidRegion(format!(
                "polygon {bad} has fewer than three vertices"
            )));
        }

        let outline = MultiPolygon::new(parts.iter().map(PolygonPart::to_polygon).collect());
        let rect = outline
            .bounding_rect()
            .ok_or_else(|| ConfigError::InvalidRegion("polygon region is empty".to_string()))?;
        let bounds = Bounds::new(rect.max().y, rect.max().x, rect.min().y, rect.min().x)?;

        let mut polygons = outline.into_iter();
        let first = MultiPolygon::new(polygons.next().into_iter().collect());
        let shape = polygons.fold(first, |acc, p| acc.union(&MultiPolygon::new(vec![p])));

        Ok(Self {
            parts,
            shape,
            bounds,
        })
    }

    #[must_use]
    pub fn parts(&self) -> &[PolygonPart] {
        &self.parts
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Area of the intersection between `cell` and this region, in square degrees.
    fn intersection_area(&self, cell: &Bounds) -> f64 {
        let window = MultiPolygon::new(vec![cell_rect(cell).to_polygon()]);
        self.shape.intersection(&window).unsigned_area()
    }
}

/// The area a search run must cover.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    /// Every cell counts as fully inside; no culling.
    Rect(Bounds),
    /// Cells are culled by how much of them overlaps the polygons.
    Polygon(PolygonRegion),
}

impl Region {
    /// The rectangle the subdivision starts from.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        match self {
            Region::Rect(b) => *b,
            Region::Polygon(p) => p.bounds(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Region::Rect(_) => "rect",
            Region::Polygon(_) => "polygon",
        }
    }

    /// Fraction of `cell`'s area that lies inside the region, in `[0, 1]`.
    ///
    /// Always `1.0` for [`Region::Rect`]. For polygons, `0.0` when disjoint
    /// or when the cell has no area.
    #[must_use]
    pub fn overlap_fraction(&self, cell: &Bounds) -> f64 {
        match self {
            Region::Rect(_) => 1.0,
            Region::Polygon(poly) => {
                let cell_area = cell.area_deg2();
                if cell_area <= 0.0 || !cell.intersects(&poly.bounds) {
                    return 0.0;
                }
                (poly.intersection_area(cell) / cell_area).clamp(0.0, 1.0)
            }
        }
    }

    /// Reads a GeoJSON `FeatureCollection` file into a polygon region.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RegionFile`] if the file cannot be read or is
    /// not valid GeoJSON, and [`ConfigError::InvalidRegion`] if it holds no
    /// usable polygon.
    pub fn from_geojson_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::RegionFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_geojson_str(&raw).map_err(|e| match e {
            ConfigError::RegionFile { reason, .. } => ConfigError::RegionFile {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parses a GeoJSON `FeatureCollection`. `Polygon` and `MultiPolygon`
    /// features become parts; every other geometry is ignored.
    ///
    /// # Errors
    ///
    /// Same as [`Region::from_geojson_file`].
    pub fn from_geojson_str(raw: &str) -> Result<Self, ConfigError> {
        let fc: FeatureCollection =
            serde_json::from_str(raw).map_err(|e| ConfigError::RegionFile {
                path: "<inline>".into(),
                reason: e.to_string(),
            })?;

        let mut parts = Vec::new();
        for geometry in fc.features.into_iter().filter_map(|f| f.geometry) {
            match geometry {
                Geometry::Polygon { coordinates } => parts.push(polygon_part(&coordinates)?),
                Geometry::MultiPolygon { coordinates } => {
                    for polygon in &coordinates {
                        parts.push(polygon_part(polygon)?);
                    }
                }
                Geometry::Other => {}
            }
        }

        Ok(Region::Polygon(PolygonRegion::new(parts)?))
    }
}

// ---------------------------------------------------------------------------
// GeoJSON
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Other,
}

/// GeoJSON rings are `[lng, lat(, alt)]` positions; the first ring is the exterior.
fn polygon_part(rings: &[Vec<Vec<f64>>]) -> Result<PolygonPart, ConfigError> {
    let mut converted = rings.iter().map(|ring| {
        ring.iter()
            .map(|pos| match pos.as_slice() {
                [lng, lat, ..] => Ok(LatLng::new(*lat, *lng)),
                _ => Err(ConfigError::InvalidRegion(
                    "GeoJSON position needs at least two numbers".to_string(),
                )),
            })
            .collect::<Result<Vec<_>, _>>()
    });

    let exterior = converted
        .next()
        .transpose()?
        .ok_or_else(|| ConfigError::InvalidRegion("polygon without rings".to_string()))?;
    let holes = converted.collect::<Result<Vec<_>, _>>()?;
    Ok(PolygonPart { exterior, holes })
}

fn ring(points: &[LatLng]) -> LineString<f64> {
    points.iter().map(|p| coord! { x: p.lng, y: p.lat }).collect()
}

fn cell_rect(cell: &Bounds) -> Rect<f64> {
    Rect::new(
        coord! { x: cell.west, y: cell.south },
        coord! { x: cell.east, y: cell.north },
    )
}
