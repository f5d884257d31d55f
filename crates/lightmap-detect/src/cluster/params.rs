use crate::KMeansParams;
use lightmap_core::DEFAULT_NUM_LIGHTS;
use serde::{Deserialize, Serialize};

/// Configuration for [`crate::PixelClusterer`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterParams {
    /// Number of lights to detect, also the k of each k-means run.
    pub expected_lights: usize,
    /// Pixels whose all-on gain is below this are ignored.
    ///
    /// The gain is a single luma difference. A threshold of `21` on the sum
    /// of the three color channel differences is about `7` here.
    pub noise_threshold: f64,
    /// Clusters larger than this are treated as background and removed.
    pub max_cluster_size: usize,
    /// Fraction of clusters, best score first, considered each round.
    pub best_fraction: f64,
    /// Hard cap on k-means rounds; `None` means `4 * expected_lights`.
    pub max_rounds: Option<usize>,
    pub kmeans: KMeansParams,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            expected_lights: DEFAULT_NUM_LIGHTS,
            noise_threshold: 7.0,
            max_cluster_size: 100,
            best_fraction: 0.2,
            max_rounds: None,
            kmeans: KMeansParams::default(),
        }
    }
}

impl ClusterParams {
    pub fn round_limit(&self) -> usize {
        self.max_rounds
            .unwrap_or(4 * self.expected_lights)
            .max(1)
    }

    /// Number of best-scoring clusters inspected per round, at least one.
    pub(crate) fn best_count(&self) -> usize {
        ((self.expected_lights as f64 * self.best_fraction) as usize).max(1)
    }
}
