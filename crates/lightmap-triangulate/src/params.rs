use serde::{Deserialize, Serialize};

/// How each pass re-estimates a camera from the point cloud.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefitMethod {
    /// Origin column from the two lights bracketing the line of sight,
    /// distance from the median over the widest-angle lights.
    #[default]
    Bracketing,
    /// Origin column and distance fitted together over every reliable light.
    JointFit,
}

/// Configuration for the triangulation loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriangulationParams {
    /// Rotation samples over the full circle in the angle sweep.
    pub angle_samples: usize,
    /// Intersections with `|x|` or `|y|` at or beyond this are discarded.
    pub max_intersection_distance: f64,
    /// Intersections of rays crossing at a shallower angle are discarded.
    pub min_crossing_angle_deg: f64,
    /// Refinement passes.
    pub refine_iterations: usize,
    /// Stop early once no camera parameter moves more than this.
    pub convergence_tolerance: Option<f64>,
    pub refit: RefitMethod,
    /// Widest-angle lights whose back-projected distances are combined.
    pub extreme_lights: usize,
    /// Gauss-Newton steps of [`RefitMethod::JointFit`].
    pub refit_steps: usize,
    /// Rescale each pass so the widest horizontal radius is one.
    pub normalize_radius: bool,
}

impl Default for TriangulationParams {
    fn default() -> Self {
        Self {
            angle_samples: 500,
            max_intersection_distance: 2.0,
            min_crossing_angle_deg: 10.0,
            refine_iterations: 10,
            convergence_tolerance: None,
            refit: RefitMethod::Bracketing,
            extreme_lights: 5,
            refit_steps: 8,
            normalize_radius: true,
        }
    }
}
