//! Light candidates and the per-photograph candidate file.

use crate::CoreError;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Address of a light on the string, in `[0, num_lights)`.
pub type LightId = u32;

/// Number of lights on the string when nothing else is configured.
pub const DEFAULT_NUM_LIGHTS: usize = 50;

/// One observed pixel location for a light in one photograph.
///
/// `x` is the pixel column and `y` the pixel row. Lower `score` means a
/// cleaner on/off separation of the decoded signature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightCandidate {
    pub light: LightId,
    pub x: i32,
    pub y: i32,
    pub score: f64,
    pub signature: String,
}

impl LightCandidate {
    #[inline]
    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x as f64, self.y as f64)
    }

    /// Convert into a file row.
    pub fn to_row(&self) -> CandidateRow {
        CandidateRow {
            row: self.y,
            column: self.x,
            led: self.light as i64,
            bit: self.signature.clone(),
            score: self.score,
            number: u32::from_str_radix(&self.signature, 2).ok(),
        }
    }
}

/// One row of the candidate file: `{x, y, led, bit, score}`.
///
/// The file stores image coordinates in array order: its `x` key is the
/// pixel row and its `y` key the pixel column. `led == -1` marks a cluster
/// whose signature did not resolve to a light.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateRow {
    #[serde(rename = "x")]
    pub row: i32,
    #[serde(rename = "y")]
    pub column: i32,
    pub led: i64,
    pub bit: String,
    #[serde(default)]
    pub score: f64,
    /// Decoded signature number, kept for diagnostics.
    #[serde(default, alias = "random", skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
}

impl CandidateRow {
    /// Resolve the row into a candidate, rejecting unmatched or out-of-range ids.
    pub fn to_candidate(&self, num_lights: usize) -> Option<LightCandidate> {
        if self.led < 0 || self.led >= num_lights as i64 {
            return None;
        }
        Some(LightCandidate {
            light: self.led as LightId,
            x: self.column,
            y: self.row,
            score: self.score,
            signature: self.bit.clone(),
        })
    }
}

// Older capture runs stored the rows as an object keyed by row index.
#[derive(Deserialize)]
#[serde(untagged)]
enum CandidateFile {
    Rows(Vec<CandidateRow>),
    Indexed(BTreeMap<String, CandidateRow>),
}

/// Load all rows of a candidate file, in file order.
pub fn load_candidate_file(path: impl AsRef<Path>) -> Result<Vec<CandidateRow>, CoreError> {
    let raw = fs::read_to_string(path)?;
    let rows = match serde_json::from_str::<CandidateFile>(&raw)? {
        CandidateFile::Rows(rows) => rows,
        CandidateFile::Indexed(map) => {
            let mut indexed: Vec<(usize, CandidateRow)> = map
                .into_iter()
                .map(|(k, row)| (k.parse::<usize>().unwrap_or(usize::MAX), row))
                .collect();
            indexed.sort_by_key(|(idx, _)| *idx);
            indexed.into_iter().map(|(_, row)| row).collect()
        }
    };
    Ok(rows)
}

/// Write rows as a JSON array.
pub fn write_candidate_file(
    path: impl AsRef<Path>,
    rows: &[CandidateRow],
) -> Result<(), CoreError> {
    let json = serde_json::to_string_pretty(rows)?;
    fs::write(path, json)?;
    Ok(())
}
