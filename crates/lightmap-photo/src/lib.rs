//! One photograph of the light string, seen through a simple pinhole model.
//!
//! A [`PhotographGeometry`] owns every candidate detection of one capture,
//! grouped per light into [`LightRecord`]s. From the selected candidates it
//! derives the tree center column, the reliable subset, a reference line and
//! an initial [`CameraPosition`]. [`disambiguate_strings`] resolves lights
//! with several candidates by fitting runs of consecutive lights to lines.

mod camera;
mod error;
mod export;
mod geometry;
mod params;
mod record;
mod strings;

pub use camera::{camera_distance_from_angle, CameraPosition};
pub use error::GeometryError;
pub use export::{CandidateStatus, ExportedCandidate, ExportedLight, PhotographExport, ReferenceLine};
pub use geometry::PhotographGeometry;
pub use params::{GeometryParams, ProjectionParams, StringParams};
pub use record::LightRecord;
pub use strings::{disambiguate_strings, find_strings, DisambiguationReport, LightString};
