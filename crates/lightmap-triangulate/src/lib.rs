//! Combine photograph models into 3-D light positions.
//!
//! Each photograph only knows horizontal and vertical angles to its lights.
//! For a pair of photographs the unknown rotation between the two viewpoints
//! is found by sweeping it over the full circle ([`estimate_angle`]); three
//! photographs close the loop to one full turn ([`close_angle_loop`]). Rays
//! are then intersected pairwise and averaged, and each camera is refitted
//! against the new point cloud ([`Triangulator`]).

mod closure;
mod engine;
mod error;
mod export;
mod intersect;
mod params;
mod refine;
mod sweep;

pub use closure::{close_angle_loop, ClosedAngles};
pub use engine::{
    CameraState, Reconstruction, ReconstructedPoint, ResolvedAngles, Snapshot, Triangulator,
};
pub use error::TriangulationError;
pub use export::ReconstructionExport;
pub use intersect::{intersect_rays, pair_intersections};
pub use params::{RefitMethod, TriangulationParams};
pub use refine::{refit_camera, CameraRefit};
pub use sweep::{angle_fit_curve, estimate_angle, find_circular_peaks, AngleEstimate};
