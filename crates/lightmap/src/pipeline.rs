//! End-to-end reconstruction from per-photograph candidates.

use crate::{PipelineConfig, PipelineError};
use lightmap_core::{load_candidate_file, IdentityMap, LightCandidate};
use lightmap_detect::{ClusterReport, FrameStack, PixelClusterer};
use lightmap_photo::{
    disambiguate_strings, DisambiguationReport, GeometryError, PhotographExport,
    PhotographGeometry,
};
use lightmap_triangulate::{Reconstruction, ReconstructionExport, Triangulator};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Candidates of one photograph, as written by the detection step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhotographInput {
    pub name: String,
    pub candidates: Vec<LightCandidate>,
}

impl PhotographInput {
    pub fn new(name: impl Into<String>, candidates: Vec<LightCandidate>) -> Self {
        Self {
            name: name.into(),
            candidates,
        }
    }

    /// Load a candidate file, skipping unmatched and out-of-range rows.
    pub fn from_candidate_file(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        num_lights: usize,
    ) -> Result<Self, PipelineError> {
        let rows = load_candidate_file(path)?;
        let candidates = rows
            .iter()
            .filter_map(|r| r.to_candidate(num_lights))
            .collect();
        Ok(Self::new(name, candidates))
    }

    pub fn from_cluster_report(name: impl Into<String>, report: &ClusterReport) -> Self {
        Self::new(name, report.candidates.clone())
    }
}

/// What happened to one photograph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhotographOutcome {
    pub name: String,
    /// Lights with at least one active candidate.
    pub lights: usize,
    pub reliable: usize,
    #[serde(default)]
    pub disambiguation: Option<DisambiguationReport>,
    #[serde(default)]
    pub export: Option<PhotographExport>,
    /// Set when the photograph could not be modeled; it is left out of the
    /// triangulation.
    #[serde(default)]
    pub error: Option<String>,
}

impl PhotographOutcome {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a pipeline run; partial results are kept on failure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineReport {
    pub photographs: Vec<PhotographOutcome>,
    #[serde(default)]
    pub reconstruction: Option<Reconstruction>,
    #[serde(default)]
    pub export: Option<ReconstructionExport>,
    #[serde(default)]
    pub triangulation_error: Option<String>,
}

impl PipelineReport {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PipelineError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Detection, per-photograph modeling and triangulation under one config.
#[derive(Clone, Debug, Default)]
pub struct ReconstructionPipeline {
    config: PipelineConfig,
}

impl ReconstructionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Cluster one capture into light candidates.
    pub fn detect(
        &self,
        frames: &FrameStack,
        identity: IdentityMap,
    ) -> Result<ClusterReport, PipelineError> {
        let clusterer = PixelClusterer::new(self.config.clustering.clone(), identity)
            .with_num_lights(self.config.geometry.num_lights);
        Ok(clusterer.run(frames)?)
    }

    /// Model one photograph: load, resolve strings, refresh.
    pub fn build_photograph(
        &self,
        input: &PhotographInput,
    ) -> Result<(PhotographGeometry, DisambiguationReport), GeometryError> {
        let mut geometry = PhotographGeometry::new(
            input.name.clone(),
            input.candidates.iter().cloned(),
            &self.config.projection,
            &self.config.geometry,
        )?;
        let report = disambiguate_strings(&mut geometry, &self.config.strings);
        geometry.refresh()?;
        Ok((geometry, report))
    }

    /// Model every photograph and triangulate the ones that succeed.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
    pub fn run(&self, inputs: impl IntoIterator<Item = PhotographInput>) -> PipelineReport {
        let mut photos = Vec::new();
        let mut outcomes = Vec::new();
        for input in inputs {
            match self.build_photograph(&input) {
                Ok((geometry, disambiguation)) => {
                    outcomes.push(PhotographOutcome {
                        name: input.name,
                        lights: geometry.records().filter(|r| r.is_active()).count(),
                        reliable: geometry.reliable().count(),
                        disambiguation: Some(disambiguation),
                        export: None,
                        error: None,
                    });
                    photos.push(geometry);
                }
                Err(err) => {
                    warn!("photograph {} skipped: {err}", input.name);
                    outcomes.push(PhotographOutcome {
                        name: input.name,
                        lights: 0,
                        reliable: 0,
                        disambiguation: None,
                        export: None,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        let triangulator = Triangulator::new(self.config.triangulation.clone());
        let (reconstruction, triangulation_error) = match triangulator.run(&mut photos) {
            Ok(rec) => (Some(rec), None),
            Err(err) => {
                warn!("triangulation failed: {err}");
                (None, Some(err.to_string()))
            }
        };

        let mut built = photos.iter();
        for outcome in outcomes.iter_mut().filter(|o| o.is_ok()) {
            outcome.export = built.next().map(PhotographExport::from_geometry);
        }
        let export = reconstruction
            .as_ref()
            .and_then(|rec| ReconstructionExport::from_reconstruction(rec, &photos));
        if let Some(export) = &export {
            info!(
                "reconstructed {} lights from {} photographs",
                export.points.len(),
                photos.len()
            );
        }

        PipelineReport {
            photographs: outcomes,
            reconstruction,
            export,
            triangulation_error,
        }
    }
}
