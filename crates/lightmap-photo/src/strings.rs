//! Light-string disambiguation.
//!
//! Consecutively numbered lights hang next to each other on the wire, so a
//! run of them should look like a short, nearly straight polyline. For every
//! run the candidate combination with the smallest
//! `line residual * path length` is accepted; a point that sits much further
//! from its neighbors than the run average is rejected and the whole pass is
//! repeated.

use crate::{PhotographGeometry, StringParams};
use lightmap_core::{distance, fit_line, path_length, LightId, LineFit};
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// An accepted run of consecutive lights.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LightString {
    pub lights: Vec<LightId>,
    /// Chosen candidate index per light.
    pub candidates: Vec<usize>,
    pub coords: Vec<Point2<f64>>,
    pub line: Option<LineFit>,
    pub residual: f64,
    pub score: f64,
}

impl LightString {
    /// `(slope, intercept)` of `column = slope * row + intercept`.
    pub fn column_of_row(&self) -> Option<(f64, f64)> {
        self.line.as_ref().and_then(LineFit::column_of_row)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DisambiguationReport {
    pub passes: usize,
    /// `(light, candidate index)` marked incorrect, in order.
    pub disabled: Vec<(LightId, usize)>,
    /// `false` when the pass limit stopped the loop; the last state is kept.
    pub converged: bool,
    pub strings: Vec<LightString>,
}

/// Runs of active lights whose consecutive ids differ by at most `max_gap`.
/// Runs of a single light are dropped.
pub fn find_strings(geometry: &PhotographGeometry, max_gap: u32) -> Vec<Vec<LightId>> {
    let mut runs: Vec<Vec<LightId>> = Vec::new();
    for rec in geometry.records().filter(|r| r.is_active()) {
        let id = rec.id();
        match runs.last_mut() {
            Some(run) if run.last().is_some_and(|&last| id - last <= max_gap) => run.push(id),
            _ => runs.push(vec![id]),
        }
    }
    runs.retain(|r| r.len() > 1);
    runs
}

/// Resolve multi-candidate lights into consistent strings.
///
/// Each pass rebuilds the runs, picks the best combination per run and
/// rejects at most one outlier per run. The first pass without rejections
/// assigns the accepted candidates as in-string. Derived geometry state is
/// not refreshed here; call [`PhotographGeometry::refresh`] afterwards.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip_all, fields(photo = geometry.name())))]
pub fn disambiguate_strings(
    geometry: &mut PhotographGeometry,
    params: &StringParams,
) -> DisambiguationReport {
    let max_passes = params
        .max_passes
        .unwrap_or(2 * geometry.params().num_lights)
        .max(1);
    let mut report = DisambiguationReport::default();

    while report.passes < max_passes {
        report.passes += 1;
        let mut accepted = Vec::new();
        let mut rejected = 0usize;

        for run in find_strings(geometry, params.max_gap) {
            let Some(string) = best_combination(geometry, &run, params.max_combinations) else {
                continue;
            };
            match outlier(&string.coords, params.outlier_factor) {
                Some(i) => {
                    let (light, idx) = (string.lights[i], string.candidates[i]);
                    if let Some(rec) = geometry.record_mut(light) {
                        rec.mark_incorrect(idx);
                    }
                    debug!("light {light}: candidate {idx} rejected");
                    report.disabled.push((light, idx));
                    rejected += 1;
                }
                None => accepted.push(string),
            }
        }

        if rejected == 0 {
            assign(geometry, &accepted);
            report.strings = accepted;
            report.converged = true;
            break;
        }
        report.strings = accepted;
    }

    if !report.converged {
        warn!(
            "photograph {}: strings not stable after {} passes, {} candidates rejected",
            geometry.name(),
            report.passes,
            report.disabled.len()
        );
    }
    report
}

fn assign(geometry: &mut PhotographGeometry, strings: &[LightString]) {
    let ids: Vec<LightId> = geometry.records().map(|r| r.id()).collect();
    for id in ids {
        if let Some(rec) = geometry.record_mut(id) {
            rec.clear_string();
        }
    }
    for s in strings {
        for (&light, &idx) in s.lights.iter().zip(&s.candidates) {
            if let Some(rec) = geometry.record_mut(light) {
                rec.assign_to_string(idx);
            }
        }
    }
}

/// Index of the point whose mean neighbor distance exceeds `factor` times
/// the average, if any. End points use their single neighbor.
fn outlier(coords: &[Point2<f64>], factor: f64) -> Option<usize> {
    let dists = neighbor_distances(coords);
    if dists.is_empty() {
        return None;
    }
    let avg = dists.iter().sum::<f64>() / dists.len() as f64;
    let (i, max) = dists
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, d)| if d > best.1 { (i, d) } else { best });
    (max > factor * avg).then_some(i)
}

fn neighbor_distances(coords: &[Point2<f64>]) -> Vec<f64> {
    let n = coords.len();
    if n < 2 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            if i == 0 {
                distance(&coords[0], &coords[1])
            } else if i == n - 1 {
                distance(&coords[i - 1], &coords[i])
            } else {
                0.5 * (distance(&coords[i - 1], &coords[i]) + distance(&coords[i], &coords[i + 1]))
            }
        })
        .collect()
}

/// Lowest-scoring candidate combination of a run.
fn best_combination(
    geometry: &PhotographGeometry,
    run: &[LightId],
    max_combinations: usize,
) -> Option<LightString> {
    let mut options: Vec<Vec<usize>> = Vec::with_capacity(run.len());
    for &id in run {
        let rec = geometry.record(id)?;
        let mut active: Vec<usize> = rec.active_indices().collect();
        active.sort_by(|&a, &b| {
            rec.candidates()[a]
                .score
                .total_cmp(&rec.candidates()[b].score)
                .then(a.cmp(&b))
        });
        if active.is_empty() {
            return None;
        }
        options.push(active);
    }
    trim_options(&mut options, max_combinations.max(1));

    let positions: Vec<Vec<Point2<f64>>> = run
        .iter()
        .zip(&options)
        .map(|(&id, opts)| {
            let rec = geometry.record(id);
            opts.iter()
                .filter_map(|&i| rec.and_then(|r| r.candidate(i)).map(|c| c.position()))
                .collect()
        })
        .collect();

    let mut choice = vec![0usize; run.len()];
    let mut coords: Vec<Point2<f64>> = positions.iter().map(|p| p[0]).collect();
    let mut best: Option<(f64, Vec<usize>)> = None;
    loop {
        for (i, &c) in choice.iter().enumerate() {
            coords[i] = positions[i][c];
        }
        let residual = fit_line(&coords).map_or(0.0, |l| l.residual_sum_sq(&coords));
        let score = residual * path_length(&coords);
        if best.as_ref().is_none_or(|(s, _)| score < *s) {
            best = Some((score, choice.clone()));
        }
        if !advance(&mut choice, &options) {
            break;
        }
    }

    let (score, choice) = best?;
    let candidates: Vec<usize> = choice.iter().zip(&options).map(|(&c, o)| o[c]).collect();
    let coords: Vec<Point2<f64>> = choice
        .iter()
        .zip(&positions)
        .map(|(&c, p)| p[c])
        .collect();
    let line = fit_line(&coords);
    let residual = line.as_ref().map_or(0.0, |l| l.residual_sum_sq(&coords));
    Some(LightString {
        lights: run.to_vec(),
        candidates,
        coords,
        line,
        residual,
        score,
    })
}

/// Odometer step over the option lists; `false` after the last combination.
fn advance(choice: &mut [usize], options: &[Vec<usize>]) -> bool {
    for (c, opts) in choice.iter_mut().zip(options).rev() {
        *c += 1;
        if *c < opts.len() {
            return true;
        }
        *c = 0;
    }
    false
}

/// Drop the worst-scoring options of the most ambiguous lights until the
/// number of combinations fits the budget.
fn trim_options(options: &mut [Vec<usize>], budget: usize) {
    let combinations = |opts: &[Vec<usize>]| {
        opts.iter()
            .try_fold(1usize, |acc, o| acc.checked_mul(o.len()))
            .unwrap_or(usize::MAX)
    };
    let mut trimmed = false;
    while combinations(options) > budget {
        let Some(widest) = options.iter_mut().max_by_key(|o| o.len()) else {
            break;
        };
        if widest.len() <= 1 {
            break;
        }
        widest.pop();
        trimmed = true;
    }
    if trimmed {
        debug!("candidate options trimmed to {} combinations", combinations(options));
    }
}
