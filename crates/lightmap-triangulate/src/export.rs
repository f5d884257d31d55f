//! Final 3-D export consumed by visualization collaborators.

use crate::{CameraState, Reconstruction, TriangulationError};
use lightmap_core::LightId;
use lightmap_photo::{PhotographGeometry, ReferenceLine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Latest pass of a reconstruction in a flat, stable JSON shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionExport {
    /// Refinement passes that were run.
    pub iterations: usize,
    pub converged: bool,
    /// Light id to `[x, y, z]` in tree-radius units.
    pub points: BTreeMap<LightId, [f64; 3]>,
    pub cameras: Vec<CameraState>,
    /// Per-photograph reference line, keyed by photograph name.
    #[serde(default)]
    pub reference_lines: BTreeMap<String, ReferenceLine>,
}

impl ReconstructionExport {
    /// `None` when the reconstruction holds no pass.
    pub fn from_reconstruction(
        reconstruction: &Reconstruction,
        photos: &[PhotographGeometry],
    ) -> Option<Self> {
        let latest = reconstruction.latest()?;
        let points = latest
            .points
            .iter()
            .map(|(&id, p)| (id, [p.position.x, p.position.y, p.position.z]))
            .collect();
        let reference_lines = photos
            .iter()
            .filter_map(|photo| {
                let (slope, intercept) = photo.reference_line()?.column_of_row()?;
                Some((photo.name().to_string(), ReferenceLine { slope, intercept }))
            })
            .collect();
        Some(Self {
            iterations: reconstruction.history.len(),
            converged: reconstruction.converged,
            points,
            cameras: latest.cameras.clone(),
            reference_lines,
        })
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TriangulationError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TriangulationError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
