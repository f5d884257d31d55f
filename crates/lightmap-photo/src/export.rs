//! 2-D per-photograph export for plotting collaborators.

use crate::{GeometryError, PhotographGeometry};
use lightmap_core::{LightId, NamedColor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Selected,
    Alternative,
    Rejected,
}

impl CandidateStatus {
    /// Display color used when plotting this candidate.
    pub fn color(self) -> NamedColor {
        match self {
            CandidateStatus::Selected => NamedColor::Green,
            CandidateStatus::Alternative => NamedColor::Red,
            CandidateStatus::Rejected => NamedColor::Purple,
        }
    }
}

/// `column = slope * row + intercept`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub slope: f64,
    pub intercept: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedCandidate {
    pub column: i32,
    pub row: i32,
    pub score: f64,
    pub status: CandidateStatus,
    pub color: NamedColor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedLight {
    /// Selected `[column, row]`, absent when every candidate was rejected.
    pub position: Option<[i32; 2]>,
    pub reliable: bool,
    pub candidates: Vec<ExportedCandidate>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhotographExport {
    pub name: String,
    pub center_column: f64,
    #[serde(default)]
    pub reference_line: Option<ReferenceLine>,
    pub lights: BTreeMap<LightId, ExportedLight>,
}

impl PhotographExport {
    pub fn from_geometry(geometry: &PhotographGeometry) -> Self {
        let reference_line = geometry
            .reference_line()
            .and_then(|l| l.column_of_row())
            .map(|(slope, intercept)| ReferenceLine { slope, intercept });

        let lights = geometry
            .records()
            .map(|rec| {
                let selected = geometry.selected_index(rec.id());
                let candidates = rec
                    .candidates()
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        let status = if rec.is_incorrect(i) {
                            CandidateStatus::Rejected
                        } else if selected == Some(i) {
                            CandidateStatus::Selected
                        } else {
                            CandidateStatus::Alternative
                        };
                        ExportedCandidate {
                            column: c.x,
                            row: c.y,
                            score: c.score,
                            status,
                            color: status.color(),
                        }
                    })
                    .collect();
                let light = ExportedLight {
                    position: geometry.selected_candidate(rec.id()).map(|c| [c.x, c.y]),
                    reliable: geometry.is_reliable(rec.id()),
                    candidates,
                };
                (rec.id(), light)
            })
            .collect();

        Self {
            name: geometry.name().to_string(),
            center_column: geometry.center_column(),
            reference_line,
            lights,
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, GeometryError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), GeometryError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
