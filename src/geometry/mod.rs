//! Traversable floor area derived from vector floor-plan features.
//!
//! The first feature is the floor outline, every later feature an obstacle
//! footprint. Obstacles are inflated by a small margin before they are cut
//! out of the outline so that cells hugging a wall are not reported open.

use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{Area, BooleanOps, BoundingRect, Coord, MultiPolygon, Rect};
use thiserror::Error;
use tracing::debug;

pub mod fit;
pub mod inflate;

pub use fit::{FitError, fit};
pub use inflate::inflate;

pub const DEFAULT_OBSTACLE_MARGIN: f64 = 0.1;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("no features: the floor outline is required")]
    NoFeatures,
    #[error("invalid floor outline: {0}")]
    InvalidOutline(String),
    #[error("floor outline has zero area after repair")]
    DegenerateOutline,
    #[error("obstacle margin must be finite and non-negative, got {0}")]
    InvalidMargin(f64),
}

/// Open floor area: the outline minus inflated obstacles.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversableGeometry {
    region: MultiPolygon<f64>,
}

impl TraversableGeometry {
    pub fn new(region: MultiPolygon<f64>) -> Self {
        Self { region }
    }

    pub fn region(&self) -> &MultiPolygon<f64> {
        &self.region
    }

    pub fn into_region(self) -> MultiPolygon<f64> {
        self.region
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.region.bounding_rect()
    }

    pub fn area(&self) -> f64 {
        self.region.unsigned_area()
    }

    /// Point-in-region test; points on the boundary count as inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.region.coordinate_position(&Coord { x, y }) != CoordPos::Outside
    }
}

/// Extract the traversable area with the default obstacle margin.
pub fn extract(features: &[MultiPolygon<f64>]) -> Result<TraversableGeometry, GeometryError> {
    extract_with_margin(features, DEFAULT_OBSTACLE_MARGIN)
}

pub fn extract_with_margin(
    features: &[MultiPolygon<f64>],
    margin: f64,
) -> Result<TraversableGeometry, GeometryError> {
    if !margin.is_finite() || margin < 0.0 {
        return Err(GeometryError::InvalidMargin(margin));
    }
    let (outline, obstacles) = features.split_first().ok_or(GeometryError::NoFeatures)?;
    check_rings(outline)?;

    let floor = repair(outline);
    if floor.unsigned_area() <= 0.0 {
        return Err(GeometryError::DegenerateOutline);
    }

    let blocked = obstacles
        .iter()
        .map(|obstacle| inflate(&repair(obstacle), margin))
        .fold(MultiPolygon::new(Vec::new()), |acc, obstacle| {
            acc.union(&obstacle)
        });
    let region = floor.difference(&blocked);

    debug!(
        obstacles = obstacles.len(),
        floor_area = floor.unsigned_area(),
        open_area = region.unsigned_area(),
        "Traversable geometry extracted"
    );
    Ok(TraversableGeometry::new(region))
}

fn check_rings(outline: &MultiPolygon<f64>) -> Result<(), GeometryError> {
    if outline.0.is_empty() {
        return Err(GeometryError::InvalidOutline("no polygons".to_string()));
    }
    for polygon in outline {
        let exterior = polygon.exterior();
        if exterior.0.len() < 4 || !exterior.is_closed() {
            return Err(GeometryError::InvalidOutline(format!(
                "exterior ring has {} vertices",
                exterior.0.len()
            )));
        }
        if exterior.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(GeometryError::InvalidOutline(
                "non-finite coordinate".to_string(),
            ));
        }
    }
    Ok(())
}

/// Resolve self-intersections by re-running the shape through the overlay.
pub fn repair(shape: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    shape.union(&MultiPolygon::new(Vec::new()))
}
