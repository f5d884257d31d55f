//! Pixel clustering into per-light detections.
//!
//! The loop alternates k-means over the still-enabled pixels with pruning:
//! oversized clusters are background, and each round the smallest and the
//! largest of the best-scoring clusters are taken as detections. Taken
//! pixels are disabled before the next round.

mod params;
mod pipeline;
mod result;

pub use params::ClusterParams;
pub use pipeline::PixelClusterer;
pub use result::{ClusterReport, LightDetection};
