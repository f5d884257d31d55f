//! Per-light detection from a structured-light capture.
//!
//! Every light on the string blinks a unique binary pattern across the
//! capture frames. This crate turns the per-pixel brightness series into
//! signatures ([`decode_signature`]) and groups pixels with similar series
//! into per-light blobs ([`PixelClusterer`]).
//!
//! ```no_run
//! use lightmap_core::IdentityMap;
//! use lightmap_detect::{ClusterParams, FrameStack, PixelClusterer};
//!
//! # fn frames() -> FrameStack { unimplemented!() }
//! let identity = IdentityMap::load_json("numbers.json").unwrap();
//! let clusterer = PixelClusterer::new(ClusterParams::default(), identity);
//! let report = clusterer.run(&frames()).unwrap();
//! println!("{} candidates, shortfall {}", report.candidates.len(), report.shortfall);
//! ```

mod arena;
mod cluster;
mod error;
mod frames;
mod kmeans;
mod signature;

pub use arena::PixelArena;
pub use cluster::{ClusterParams, ClusterReport, LightDetection, PixelClusterer};
pub use error::DetectError;
pub use frames::FrameStack;
pub use kmeans::{kmeans, KMeansParams, KMeansResult};
pub use signature::{decode_signature, Signature, MAX_SIGNATURE_BITS};
