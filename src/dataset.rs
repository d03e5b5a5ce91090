//! File access for a floor's data: trace logs, floor info and GeoJSON features.

use crate::trace::{self, DecodeError, TraceRecord};
use crate::waypoint::{self, WaypointError, WaypointSet};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const TRACE_EXTENSION: &str = "txt";
pub const FLOOR_IMAGE_FILE: &str = "floor_image.png";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Waypoints(#[from] WaypointError),
}

fn read_to_string(path: &Path) -> Result<String, DatasetError> {
    std::fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and decode one trace file; its path is the file id.
pub fn read_trace_file(path: impl AsRef<Path>) -> Result<TraceRecord, DatasetError> {
    let path = path.as_ref();
    let text = read_to_string(path)?;
    Ok(trace::decode_str(&text, &path.display().to_string())?)
}

/// Trace files of one floor directory, sorted by path.
pub fn trace_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, DatasetError> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|source| DatasetError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == TRACE_EXTENSION)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Decode every trace file of a floor and aggregate its waypoints.
///
/// A file that fails to decode is logged and skipped; the rest of the
/// floor is still processed.
pub fn floor_waypoints(dir: impl AsRef<Path>, strict: bool) -> Result<WaypointSet, DatasetError> {
    let dir = dir.as_ref();
    let files = trace_files(dir)?;
    let mut records = Vec::with_capacity(files.len());
    for path in &files {
        match read_trace_file(path) {
            Ok(record) => records.push(record),
            Err(err) => warn!(path = %path.display(), error = %err, "Skipping trace file"),
        }
    }
    info!(
        dir = %dir.display(),
        files = files.len(),
        decoded = records.len(),
        "Floor traces decoded"
    );

    if strict {
        Ok(waypoint::aggregate_strict(&records)?)
    } else {
        Ok(waypoint::aggregate(&records))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MapInfo {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize)]
struct FloorInfoFile {
    map_info: MapInfo,
}

/// Real-world floor size plus the raster floor plan next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorInfo {
    pub width: f64,
    pub height: f64,
    pub floor_image: PathBuf,
}

/// Parse `floor_info.json`; the floor image is expected in the same directory.
pub fn read_floor_info(path: impl AsRef<Path>) -> Result<FloorInfo, DatasetError> {
    let path = path.as_ref();
    let parsed: FloorInfoFile = serde_json::from_str(&read_to_string(path)?)?;
    let floor_image = path
        .parent()
        .map(|dir| dir.join(FLOOR_IMAGE_FILE))
        .unwrap_or_else(|| PathBuf::from(FLOOR_IMAGE_FILE));
    Ok(FloorInfo {
        width: parsed.map_info.width,
        height: parsed.map_info.height,
        floor_image,
    })
}

type Ring = Vec<Vec<f64>>;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<GeometryObject>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeometryObject {
    Polygon {
        coordinates: Vec<Ring>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Ring>>,
    },
    #[serde(other)]
    Other,
}

/// Read a GeoJSON FeatureCollection of floor features, in file order.
pub fn read_features(path: impl AsRef<Path>) -> Result<Vec<MultiPolygon<f64>>, DatasetError> {
    parse_features(&read_to_string(path.as_ref())?)
}

pub fn parse_features(text: &str) -> Result<Vec<MultiPolygon<f64>>, DatasetError> {
    let collection: FeatureCollection = serde_json::from_str(text)?;
    let features = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| match feature.geometry {
            Some(GeometryObject::Polygon { coordinates }) => {
                Ok(MultiPolygon::new(vec![polygon(coordinates, index)?]))
            }
            Some(GeometryObject::MultiPolygon { coordinates }) => coordinates
                .into_iter()
                .map(|rings| polygon(rings, index))
                .collect::<Result<Vec<_>, _>>()
                .map(MultiPolygon::new),
            Some(GeometryObject::Other) => Err(DatasetError::UnsupportedGeometry(format!(
                "feature {index} is not a polygon"
            ))),
            None => Err(DatasetError::UnsupportedGeometry(format!(
                "feature {index} has no geometry"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = features.len(), "Features parsed");
    Ok(features)
}

fn polygon(rings: Vec<Ring>, index: usize) -> Result<Polygon<f64>, DatasetError> {
    let mut rings = rings
        .into_iter()
        .map(|ring| line_string(ring, index))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter();
    let exterior = rings.next().ok_or_else(|| {
        DatasetError::UnsupportedGeometry(format!("feature {index} has an empty polygon"))
    })?;
    Ok(Polygon::new(exterior, rings.collect()))
}

fn line_string(ring: Ring, index: usize) -> Result<LineString<f64>, DatasetError> {
    ring.into_iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(DatasetError::UnsupportedGeometry(format!(
                "feature {index} has a position with fewer than two coordinates"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_dir(label: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let dir = std::env::temp_dir().join(format!("floorgrid-{label}-{unique}"));
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    #[test]
    fn polygon_and_multipolygon_features_parse_in_order() -> Result<(), DatasetError> {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon",
                    "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]}},
                {"type": "Feature", "properties": {"name": "shop"}, "geometry": {"type": "MultiPolygon",
                    "coordinates": [
                        [[[1, 1, 0], [2, 1, 0], [2, 2, 0], [1, 1, 0]]],
                        [[[5, 5], [6, 5], [6, 6], [5, 5]]]
                    ]}}
            ]
        }"#;
        let features = parse_features(text)?;

        assert_eq!(features.len(), 2);
        assert_eq!(features[0].0.len(), 1);
        assert_eq!(features[0].0[0].exterior().0.len(), 5);
        assert_eq!(features[1].0.len(), 2);
        assert_eq!(features[1].0[0].exterior().0[1], Coord { x: 2.0, y: 1.0 });
        Ok(())
    }

    #[test]
    fn non_polygon_feature_is_rejected() {
        let text = r#"{"features": [{"geometry": {"type": "Point", "coordinates": [1, 2]}}]}"#;
        assert!(matches!(
            parse_features(text),
            Err(DatasetError::UnsupportedGeometry(_))
        ));
        let text = r#"{"features": [{"geometry": null}]}"#;
        assert!(matches!(
            parse_features(text),
            Err(DatasetError::UnsupportedGeometry(_))
        ));
    }

    #[test]
    fn short_positions_are_rejected() {
        let text = r#"{"features": [{"geometry": {"type": "Polygon", "coordinates": [[[0], [1, 1], [0, 1]]]}}]}"#;
        assert!(matches!(
            parse_features(text),
            Err(DatasetError::UnsupportedGeometry(_))
        ));
    }

    #[test]
    fn floor_info_points_at_sibling_image() -> Result<(), Box<dyn std::error::Error>> {
        let dir = unique_dir("floor-info")?;
        let path = dir.join("floor_info.json");
        fs::write(
            &path,
            r#"{"map_info": {"height": 189.06, "width": 278.28}, "floor_image": "ignored"}"#,
        )?;

        let info = read_floor_info(&path)?;
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(info.width, 278.28);
        assert_eq!(info.height, 189.06);
        assert_eq!(info.floor_image, dir.join("floor_image.png"));
        Ok(())
    }

    #[test]
    fn missing_floor_info_is_read_error() {
        let result = read_floor_info("/definitely/not/here/floor_info.json");
        assert!(matches!(result, Err(DatasetError::Read { .. })));
    }

    #[test]
    fn floor_waypoints_skip_bad_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = unique_dir("floor-waypoints")?;
        fs::write(
            dir.join("a.txt"),
            "#\tSiteID:S1\n1\tTYPE_WAYPOINT\t1.0\t1.0\n2\tTYPE_WAYPOINT\t2.0\t2.0\n",
        )?;
        fs::write(dir.join("b.txt"), "5\tTYPE_WAYPOINT\t1.0\t1.0\n")?;
        fs::write(dir.join("c.txt"), "5\tTYPE_UNKNOWN\t1.0\n")?;
        fs::write(dir.join("notes.md"), "not a trace")?;

        let files = trace_files(&dir)?;
        let set = floor_waypoints(&dir, true);
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(files.len(), 3);
        assert_eq!(set?.len(), 2);
        Ok(())
    }

    #[test]
    fn strict_floor_without_waypoints_fails() -> Result<(), Box<dyn std::error::Error>> {
        let dir = unique_dir("floor-testing")?;
        fs::write(dir.join("t.txt"), "1\tTYPE_WIFI\ta\tb\t-70\t2412\t1\n")?;

        let strict = floor_waypoints(&dir, true);
        let lenient = floor_waypoints(&dir, false);
        let _ = fs::remove_dir_all(&dir);

        assert!(matches!(strict, Err(DatasetError::Waypoints(_))));
        assert!(lenient?.is_empty());
        Ok(())
    }

    #[test]
    fn trace_file_id_is_its_path() -> Result<(), Box<dyn std::error::Error>> {
        let dir = unique_dir("trace-id")?;
        let path = dir.join("trace.txt");
        fs::write(&path, "1\tTYPE_BOGUS\n")?;

        let result = read_trace_file(&path);
        let _ = fs::remove_dir_all(&dir);

        match result {
            Err(DatasetError::Decode(err)) => {
                assert_eq!(err.file_id, path.display().to_string());
                assert_eq!(err.unknown_tag(), Some("TYPE_BOGUS"));
            }
            other => panic!("expected decode error, got {other:?}"),
        }
        Ok(())
    }
}
