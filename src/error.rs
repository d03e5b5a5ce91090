use crate::config::ConfigError;
use crate::dataset::DatasetError;
use crate::geometry::{FitError, GeometryError};
use crate::grid::GridError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),
    #[error("fit error: {0}")]
    Fit(#[from] FitError),
    #[error("grid error: {0}")]
    Grid(#[from] GridError),
}
