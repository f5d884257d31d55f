use lightmap_core::DEFAULT_NUM_LIGHTS;
use serde::{Deserialize, Serialize};

/// Image size and lens field of view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionParams {
    pub image_width: u32,
    pub image_height: u32,
    /// Horizontal field of view (degrees).
    pub fov_x_deg: f64,
    /// Vertical field of view (degrees).
    pub fov_y_deg: f64,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            image_width: 640,
            image_height: 480,
            fov_x_deg: 60.0,
            fov_y_deg: 60.0,
        }
    }
}

impl ProjectionParams {
    /// Radians per pixel column.
    #[inline]
    pub fn rad_per_px_x(&self) -> f64 {
        self.fov_x_deg.to_radians() / self.image_width as f64
    }

    /// Radians per pixel row.
    #[inline]
    pub fn rad_per_px_y(&self) -> f64 {
        self.fov_y_deg.to_radians() / self.image_height as f64
    }

    /// Row of the optical axis.
    #[inline]
    pub fn center_row(&self) -> f64 {
        self.image_height as f64 / 2.0
    }
}

/// Per-photograph model parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryParams {
    /// Light ids at or above this are ignored.
    pub num_lights: usize,
    /// A detection is unreliable when its mean neighbor distance exceeds
    /// this multiple of the photograph's median step.
    pub reliability_factor: f64,
    /// Neighbors on each side used for the mean neighbor distance.
    pub neighbor_span: usize,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            num_lights: DEFAULT_NUM_LIGHTS,
            reliability_factor: 2.0,
            neighbor_span: 1,
        }
    }
}

/// String disambiguation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringParams {
    /// Largest id step that still continues a string.
    pub max_gap: u32,
    /// Pass limit; `None` means twice the light count.
    pub max_passes: Option<usize>,
    /// Upper bound on candidate combinations tried per string.
    pub max_combinations: usize,
    /// A string point whose neighbor distance exceeds this multiple of the
    /// string average is rejected.
    pub outlier_factor: f64,
}

impl Default for StringParams {
    fn default() -> Self {
        Self {
            max_gap: 4,
            max_passes: None,
            max_combinations: 4096,
            outlier_factor: 2.0,
        }
    }
}
