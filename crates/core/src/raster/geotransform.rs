//! Affine geotransformation carried by rasters

use serde::{Deserialize, Serialize};

/// Affine transformation coefficients for georeferencing rasters.
///
/// qamask does no coordinate math with these; they are read from the QA
/// band and written unchanged onto every mask derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Pixel width (cell size in X direction)
    pub pixel_width: f64,
    /// Pixel height (cell size in Y direction, negative for north-up)
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Create a north-up GeoTransform
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// Build from GeoTIFF ModelPixelScaleTag and ModelTiepointTag values.
    ///
    /// `scale` is `[ScaleX, ScaleY, ScaleZ]`, `tiepoint` is `[I, J, K, X, Y, Z]`.
    /// Returns `None` when either tag is too short.
    pub fn from_model_tags(scale: &[f64], tiepoint: &[f64]) -> Option<Self> {
        if scale.len() < 2 || tiepoint.len() < 6 {
            return None;
        }

        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];

        Some(Self::new(origin_x, origin_y, scale[0], -scale[1]))
    }

    /// ModelPixelScaleTag and ModelTiepointTag values for this transform
    pub fn model_tags(&self) -> ([f64; 3], [f64; 6]) {
        (
            [self.pixel_width, self.pixel_height.abs(), 0.0],
            [0.0, 0.0, 0.0, self.origin_x, self.origin_y, 0.0],
        )
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}
