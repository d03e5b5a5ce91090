use geo::{BooleanOps, Coord, Line, LineString, MultiPolygon, Polygon};
use std::f64::consts::TAU;

/// Vertices used to approximate the rounded corners of an inflated shape.
pub const ARC_SEGMENTS: usize = 32;

/// Grow a shape outward by `margin` with round joins.
///
/// Computed as the union of the shape with a band around every edge and a
/// disc at every vertex, which is the Minkowski sum of the shape and a disc.
pub fn inflate(shape: &MultiPolygon<f64>, margin: f64) -> MultiPolygon<f64> {
    if margin <= 0.0 || shape.0.is_empty() {
        return shape.clone();
    }

    let mut pieces: Vec<Polygon<f64>> = shape.0.clone();
    for polygon in shape {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            pieces.extend(ring.lines().filter_map(|line| edge_band(line, margin)));
            pieces.extend(ring.coords().map(|coord| disc(*coord, margin)));
        }
    }
    union_all(&pieces)
}

pub fn union_all(pieces: &[Polygon<f64>]) -> MultiPolygon<f64> {
    pieces
        .iter()
        .fold(MultiPolygon::new(Vec::new()), |acc, piece| {
            acc.union(&MultiPolygon::new(vec![piece.clone()]))
        })
}

fn edge_band(line: Line<f64>, margin: f64) -> Option<Polygon<f64>> {
    let delta = line.delta();
    let length = delta.x.hypot(delta.y);
    if length == 0.0 {
        return None;
    }
    let normal = Coord {
        x: -delta.y / length * margin,
        y: delta.x / length * margin,
    };
    Some(Polygon::new(
        LineString::from(vec![
            line.start + normal,
            line.end + normal,
            line.end - normal,
            line.start - normal,
        ]),
        Vec::new(),
    ))
}

fn disc(center: Coord<f64>, radius: f64) -> Polygon<f64> {
    let ring: Vec<Coord<f64>> = (0..ARC_SEGMENTS)
        .map(|step| {
            let angle = TAU * step as f64 / ARC_SEGMENTS as f64;
            Coord {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::from(ring), Vec::new())
}
