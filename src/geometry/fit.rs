use super::TraversableGeometry;
use geo::{AffineOps, AffineTransform};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("target dimensions must be positive, got {width} x {height}")]
    InvalidDimensions { width: f64, height: f64 },
    #[error("geometry bounding box has zero width or height")]
    DegenerateBounds,
}

/// Map the geometry's bounding box onto `[0, width] x [0, height]` meters.
///
/// X and Y are scaled independently: floor-plan coordinates are not
/// guaranteed to share a unit across axes.
pub fn fit(
    geometry: &TraversableGeometry,
    target_width: f64,
    target_height: f64,
) -> Result<TraversableGeometry, FitError> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(target_width) || !valid(target_height) {
        return Err(FitError::InvalidDimensions {
            width: target_width,
            height: target_height,
        });
    }

    let bounds = geometry.bounds().ok_or(FitError::DegenerateBounds)?;
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return Err(FitError::DegenerateBounds);
    }

    let x_scale = target_width / bounds.width();
    let y_scale = target_height / bounds.height();
    let transform = AffineTransform::new(
        x_scale,
        0.0,
        -bounds.min().x * x_scale,
        0.0,
        y_scale,
        -bounds.min().y * y_scale,
    );
    debug!(x_scale, y_scale, "Fitting geometry to floor dimensions");

    Ok(TraversableGeometry::new(
        geometry.region().affine_transform(&transform),
    ))
}
