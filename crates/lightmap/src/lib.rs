//! High-level facade for the `lightmap-*` workspace.
//!
//! This crate provides:
//! - re-exports of the stage crates
//! - a JSON-configurable [`ReconstructionPipeline`] that turns per-photograph
//!   light candidates into 3-D positions, isolating per-photograph failures
//! - (feature `image`) a [`capture`] adapter building a frame stack from
//!   `image::GrayImage` buffers
//!
//! ## Quickstart
//!
//! ```no_run
//! use lightmap::{PhotographInput, PipelineConfig, ReconstructionPipeline};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::load_json("lightmap.json")?;
//! let num_lights = config.geometry.num_lights;
//! let inputs = vec![
//!     PhotographInput::from_candidate_file("front", "front/coords.json", num_lights)?,
//!     PhotographInput::from_candidate_file("left", "left/coords.json", num_lights)?,
//!     PhotographInput::from_candidate_file("back", "back/coords.json", num_lights)?,
//! ];
//! let report = ReconstructionPipeline::new(config).run(inputs);
//! report.write_json("lights_3d_report.json")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `lightmap::core`: candidate records, identity map, colors, line fitting, logging.
//! - `lightmap::detect`: signature decoding and pixel clustering.
//! - `lightmap::photo`: per-photograph geometry and string disambiguation.
//! - `lightmap::triangulate`: angle sweep, loop closure and the refinement loop.

pub use lightmap_core as core;
pub use lightmap_detect as detect;
pub use lightmap_photo as photo;
pub use lightmap_triangulate as triangulate;

mod config;
mod error;
mod pipeline;

#[cfg(feature = "image")]
pub mod capture;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::{PhotographInput, PhotographOutcome, PipelineReport, ReconstructionPipeline};

pub use lightmap_core::{LightCandidate, LightId};
pub use lightmap_triangulate::{Reconstruction, ReconstructionExport};
