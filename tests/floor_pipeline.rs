use floorgrid::dataset;
use floorgrid::geometry::{self, GeometryError};
use floorgrid::grid::OccupancyGrid;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

// Floor plan drawn in pixel-like units: 200 x 100 source for a 20 m x 10 m floor,
// with one shop occupying [80, 120] x [40, 60] (8..12 m x 4..6 m).
const GEOJSON: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon",
            "coordinates": [[[0, 0], [200, 0], [200, 100], [0, 100], [0, 0]]]}},
        {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon",
            "coordinates": [[[80, 40], [120, 40], [120, 60], [80, 60], [80, 40]]]}}
    ]
}"#;

fn unique_dir(label: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    let dir = std::env::temp_dir().join(format!("floorgrid-it-{label}-{unique}"));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[test]
fn geojson_floor_becomes_metric_grid() -> Result<(), Box<dyn std::error::Error>> {
    let dir = unique_dir("floor")?;
    let geojson_path = dir.join("geojson_map.json");
    let info_path = dir.join("floor_info.json");
    fs::write(&geojson_path, GEOJSON)?;
    fs::write(&info_path, r#"{"map_info": {"width": 20.0, "height": 10.0}}"#)?;

    let features = dataset::read_features(&geojson_path);
    let floor = dataset::read_floor_info(&info_path);
    let _ = fs::remove_dir_all(&dir);
    let (features, floor) = (features?, floor?);

    let layout = geometry::extract(&features)?;
    let fitted = geometry::fit(&layout, floor.width, floor.height)?;
    let grid = OccupancyGrid::build(&fitted, 1.0)?;

    assert_eq!((grid.width(), grid.height()), (20, 10));
    // shop spans cells 8..12 x 4..6
    let blocked: Vec<(usize, usize)> = (0..grid.height())
        .flat_map(|j| (0..grid.width()).map(move |i| (i, j)))
        .filter(|(i, j)| grid.is_traversable(*i, *j) == Some(false))
        .collect();
    assert_eq!(
        blocked,
        vec![(8, 4), (9, 4), (10, 4), (11, 4), (8, 5), (9, 5), (10, 5), (11, 5)]
    );

    let (x, y) = grid.index_to_coords(9, 5);
    assert_eq!(grid.coords_to_index(x, y), (9, 5));
    assert_eq!(floor.floor_image, dir.join("floor_image.png"));
    Ok(())
}

#[test]
fn square_floor_with_pillar_example() -> Result<(), Box<dyn std::error::Error>> {
    let features = dataset::parse_features(
        r#"{"features": [
            {"geometry": {"type": "Polygon", "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]}},
            {"geometry": {"type": "Polygon", "coordinates": [[[4, 4], [6, 4], [6, 6], [4, 6], [4, 4]]]}}
        ]}"#,
    )?;
    let grid = OccupancyGrid::build(&geometry::extract(&features)?, 1.0)?;

    assert_eq!((grid.width(), grid.height()), (10, 10));
    for j in 0..10 {
        for i in 0..10 {
            let pillar = (4..6).contains(&i) && (4..6).contains(&j);
            assert_eq!(grid.is_traversable(i, j), Some(!pillar));
        }
    }
    Ok(())
}

#[test]
fn boundary_errors() -> Result<(), Box<dyn std::error::Error>> {
    assert_eq!(geometry::extract(&[]), Err(GeometryError::NoFeatures));

    let features = dataset::parse_features(
        r#"{"features": [{"geometry": {"type": "Polygon", "coordinates": [[[0, 0], [3, 0], [3, 3], [0, 0]]]}}]}"#,
    )?;
    let layout = geometry::extract(&features)?;
    assert!(OccupancyGrid::build(&layout, 0.0).is_err());
    assert!(OccupancyGrid::build(&layout, -2.0).is_err());
    assert!(geometry::fit(&layout, 0.0, 5.0).is_err());
    Ok(())
}
