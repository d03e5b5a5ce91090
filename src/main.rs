use floorgrid::config::{self, Config};
use floorgrid::dataset;
use floorgrid::error::AppError;
use floorgrid::geometry;
use floorgrid::grid::OccupancyGrid;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use tracing::Level;

fn init_tracing(level: &str) {
    let max_level = level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(max_level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    if level.parse::<Level>().is_err() {
        tracing::warn!(level, "Unknown log level, using info");
    }
}

fn main() -> Result<(), AppError> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let config = config::load_from_path(&config_path)?;
    init_tracing(&config.logging.level);
    tracing::info!(config_path = %config_path, app = %config.app.name, "floorgrid starting");

    match config.trace_dir() {
        Some(dir) => summarize_traces(&config, dir)?,
        None => tracing::info!("No trace directory configured, skipping waypoints"),
    }

    match (config.geojson_path(), config.floor_info_path()) {
        (Some(geojson), Some(floor_info)) => build_grid(&config, geojson, floor_info)?,
        _ => tracing::info!("Floor geometry not configured, skipping occupancy grid"),
    }

    Ok(())
}

fn summarize_traces(config: &Config, dir: &Path) -> Result<(), AppError> {
    let files = dataset::trace_files(dir)?;
    if let Some(first) = files.first() {
        match dataset::read_trace_file(first) {
            Ok(record) => {
                let started = record
                    .header()
                    .started_at()
                    .and_then(|t| t.format(&Rfc3339).ok());
                tracing::info!(
                    file_id = record.file_id(),
                    started = started.as_deref().unwrap_or("unknown"),
                    floor = record.header().floor_name.as_deref().unwrap_or("unknown"),
                    training = record.is_training(),
                    "First trace of floor"
                );
            }
            Err(err) => tracing::warn!(error = %err, "Could not decode first trace"),
        }
    }

    let waypoints = dataset::floor_waypoints(dir, config.strict_waypoints())?;
    tracing::info!(nodes = waypoints.len(), "Waypoint set built");
    Ok(())
}

fn build_grid(config: &Config, geojson: &Path, floor_info: &Path) -> Result<(), AppError> {
    let features = dataset::read_features(geojson)?;
    let floor = dataset::read_floor_info(floor_info)?;
    let layout = geometry::extract_with_margin(&features, config.obstacle_margin())?;
    let fitted = geometry::fit(&layout, floor.width, floor.height)?;
    let grid = OccupancyGrid::build(&fitted, config.cell_size())?;

    tracing::info!(
        width = grid.width(),
        height = grid.height(),
        cell_size = grid.cell_size(),
        open = grid.traversable_count(),
        floor_image = %floor.floor_image.display(),
        "Occupancy grid ready"
    );
    Ok(())
}
