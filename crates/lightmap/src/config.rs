use crate::PipelineError;
use lightmap_detect::ClusterParams;
use lightmap_photo::{GeometryParams, ProjectionParams, StringParams};
use lightmap_triangulate::TriangulationParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters of every stage; missing sections take their defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub projection: ProjectionParams,
    pub geometry: GeometryParams,
    pub strings: StringParams,
    pub clustering: ClusterParams,
    pub triangulation: TriangulationParams,
}

impl PipelineConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PipelineError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: PipelineConfig = serde_json::from_str(
            r#"{"projection": {"image_width": 1920}, "triangulation": {"refine_iterations": 3}}"#,
        )
        .unwrap();
        assert_eq!(cfg.projection.image_width, 1920);
        assert_eq!(cfg.projection.image_height, 480);
        assert_eq!(cfg.triangulation.refine_iterations, 3);
        assert_eq!(cfg.triangulation.angle_samples, 500);
        assert_eq!(cfg.geometry.num_lights, 50);
        assert_eq!(cfg.clustering.expected_lights, 50);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lightmap.json");
        let mut cfg = PipelineConfig::default();
        cfg.strings.max_gap = 2;
        cfg.write_json(&path).unwrap();
        let loaded = PipelineConfig::load_json(&path).unwrap();
        assert_eq!(
            serde_json::to_value(&loaded).unwrap(),
            serde_json::to_value(&cfg).unwrap()
        );
    }
}
