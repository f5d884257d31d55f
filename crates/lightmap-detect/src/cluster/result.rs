use crate::Signature;
use lightmap_core::{CandidateRow, LightCandidate, LightId};
use serde::{Deserialize, Serialize};

/// One accepted pixel cluster.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LightDetection {
    /// Integer centroid column.
    pub x: i32,
    /// Integer centroid row.
    pub y: i32,
    pub signature: Signature,
    /// `None` when the signature number is not in the identity map.
    pub light: Option<LightId>,
    pub pixels: Vec<usize>,
}

impl LightDetection {
    #[inline]
    pub fn size(&self) -> usize {
        self.pixels.len()
    }

    pub fn to_row(&self) -> CandidateRow {
        CandidateRow {
            row: self.y,
            column: self.x,
            led: self.light.map_or(-1, i64::from),
            bit: self.signature.bits.clone(),
            score: self.signature.score,
            number: Some(self.signature.number),
        }
    }
}

/// Outcome of one clustering run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClusterReport {
    pub detections: Vec<LightDetection>,
    /// Detections that resolved to a light id.
    pub candidates: Vec<LightCandidate>,
    /// Expected lights minus detections, zero on a full run.
    pub shortfall: usize,
    /// Detections with no identity match.
    pub unresolved: usize,
    pub rounds: usize,
}

impl ClusterReport {
    #[inline]
    pub fn is_partial(&self) -> bool {
        self.shortfall > 0
    }

    /// Rows of the candidate file, including unresolved detections as `led = -1`.
    pub fn rows(&self) -> Vec<CandidateRow> {
        self.detections.iter().map(LightDetection::to_row).collect()
    }
}
