//! Brute-force search for the rotation between two viewpoints.

use crate::{intersect_rays, TriangulationError, TriangulationParams};
use lightmap_photo::PhotographGeometry;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// The two strongest rotation hypotheses of a camera pair, in `[0, 2π)`.
///
/// Two views cannot tell a rotation from its mirror image, so both are kept.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngleEstimate {
    pub best: f64,
    pub second: f64,
    pub best_score: f64,
    pub second_score: f64,
    /// Number of local maxima in the score curve.
    pub peaks: usize,
}

impl AngleEstimate {
    #[inline]
    pub fn hypotheses(&self) -> [f64; 2] {
        [self.best, self.second]
    }
}

/// Score of every sampled rotation `phi = i * 2π / samples` of the second
/// camera around the tree axis.
///
/// Each light reliable in both photographs contributes `1` when its ray
/// intersection falls inside the unit circle and `1 / r²` otherwise, so the
/// score peaks where the lights agree with a unit-radius tree.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(first = first.name(), second = second.name())))]
pub fn angle_fit_curve(
    first: &PhotographGeometry,
    second: &PhotographGeometry,
    samples: usize,
) -> Vec<(f64, f64)> {
    let d1 = first.camera().ground_distance();
    let d2 = second.camera().ground_distance();
    let rays: Vec<(f64, f64)> = first
        .shared_reliable(second)
        .into_iter()
        .filter_map(|id| Some((first.horizontal_angle(id)?, second.horizontal_angle(id)?)))
        .collect();

    (0..samples)
        .map(|i| {
            let phi = i as f64 * TAU / samples as f64;
            let score = rays
                .iter()
                .filter_map(|&(alpha, beta)| intersect_rays(alpha, d1, beta, d2, phi))
                .map(|p| {
                    let r2 = p.coords.norm_squared();
                    if r2 < 1.0 {
                        1.0
                    } else {
                        1.0 / r2
                    }
                })
                .sum();
            (phi, score)
        })
        .collect()
}

/// Strict local maxima of a circular sequence.
///
/// A plateau counts once, at its middle sample, when both neighbors of the
/// plateau are lower. A constant sequence has no peak.
pub fn find_circular_peaks(values: &[f64]) -> Vec<usize> {
    let n = values.len();
    let Some(start) = (0..n).find(|&i| values[i] != values[(i + n - 1) % n]) else {
        return Vec::new();
    };

    let mut peaks = Vec::new();
    let mut i = start;
    let mut seen = 0;
    while seen < n {
        let v = values[i];
        let mut len = 1;
        while len < n && values[(i + len) % n] == v {
            len += 1;
        }
        let prev = values[(i + n - 1) % n];
        let next = values[(i + len) % n];
        if v > prev && v > next {
            peaks.push((i + (len - 1) / 2) % n);
        }
        i = (i + len) % n;
        seen += len;
    }
    peaks.sort_unstable();
    peaks
}

/// Best two rotation hypotheses of `second` relative to `first`.
///
/// With a single peak both hypotheses are the same angle.
pub fn estimate_angle(
    first: &PhotographGeometry,
    second: &PhotographGeometry,
    params: &TriangulationParams,
) -> Result<AngleEstimate, TriangulationError> {
    if first.shared_reliable(second).is_empty() {
        return Err(TriangulationError::NoSharedLights {
            first: first.name().to_string(),
            second: second.name().to_string(),
        });
    }
    let curve = angle_fit_curve(first, second, params.angle_samples.max(3));
    let scores: Vec<f64> = curve.iter().map(|&(_, s)| s).collect();
    let mut peaks = find_circular_peaks(&scores);
    if peaks.is_empty() {
        return Err(TriangulationError::NoPeaks {
            first: first.name().to_string(),
            second: second.name().to_string(),
        });
    }
    peaks.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

    let best = peaks[0];
    let second_idx = peaks.get(1).copied().unwrap_or_else(|| {
        warn!(
            "angle sweep {} -> {}: single peak, mirror hypothesis unavailable",
            first.name(),
            second.name()
        );
        best
    });
    debug!(
        "angle sweep {} -> {}: {:.2} deg ({:.2}), {:.2} deg ({:.2})",
        first.name(),
        second.name(),
        curve[best].0.to_degrees(),
        scores[best],
        curve[second_idx].0.to_degrees(),
        scores[second_idx]
    );
    Ok(AngleEstimate {
        best: curve[best].0,
        second: curve[second_idx].0,
        best_score: scores[best],
        second_score: scores[second_idx],
        peaks: peaks.len(),
    })
}
