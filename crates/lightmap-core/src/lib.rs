//! Core records and geometry helpers for light-string reconstruction.
//!
//! This crate is intentionally small and purely numeric. It knows nothing
//! about cameras, clustering or triangulation; it only defines the records
//! exchanged between those stages and the few math helpers they share.

mod candidate;
mod color;
mod error;
mod identity;
mod image;
mod line;
mod logger;

pub use candidate::{
    load_candidate_file, write_candidate_file, CandidateRow, LightCandidate, LightId,
    DEFAULT_NUM_LIGHTS,
};
pub use color::NamedColor;
pub use error::CoreError;
pub use identity::IdentityMap;
pub use image::{abs_diff, GrayImage, GrayImageView};
pub use line::{distance, fit_line, median, path_length, LineFit};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, init_with_spec, LogSpec, LOG_ENV};
