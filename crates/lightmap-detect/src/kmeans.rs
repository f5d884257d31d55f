//! Deterministic k-means over brightness series.
//!
//! Seeding is farthest-first starting from the brightest series, so a run is
//! reproducible for the same input order.

use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansParams {
    /// Max Lloyd iterations.
    pub max_iters: usize,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self { max_iters: 30 }
    }
}

#[derive(Clone, Debug)]
pub struct KMeansResult {
    /// Mean series of each non-empty cluster.
    pub centers: Vec<Vec<f64>>,
    /// Cluster index of every input point.
    pub labels: Vec<usize>,
    pub iterations: usize,
}

impl KMeansResult {
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centers.len()];
        for &l in &self.labels {
            sizes[l] += 1;
        }
        sizes
    }
}

/// Cluster `points` (all of equal length) into at most `k` groups.
///
/// Fewer groups come back when the input has fewer distinct points than `k`.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(points, params), fields(n = points.len())))]
pub fn kmeans(points: &[&[f64]], k: usize, params: &KMeansParams) -> KMeansResult {
    if points.is_empty() || k == 0 {
        return KMeansResult {
            centers: Vec::new(),
            labels: vec![0; points.len()],
            iterations: 0,
        };
    }

    let mut centers = seed_farthest_first(points, k);
    let mut labels = vec![usize::MAX; points.len()];
    let mut iterations = 0;

    for _ in 0..params.max_iters.max(1) {
        iterations += 1;
        let mut changed = false;
        for (i, p) in points.iter().enumerate() {
            let l = nearest(&centers, p);
            if labels[i] != l {
                labels[i] = l;
                changed = true;
            }
        }
        if !changed {
            break;
        }
        update_centers(points, &labels, &mut centers);
    }

    compact(&mut centers, &mut labels);
    KMeansResult {
        centers,
        labels,
        iterations,
    }
}

fn seed_farthest_first(points: &[&[f64]], k: usize) -> Vec<Vec<f64>> {
    let first = points
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, p)| {
            let n = norm_sq(p);
            if n > best.1 {
                (i, n)
            } else {
                best
            }
        })
        .0;
    let mut centers = vec![points[first].to_vec()];
    let mut min_dist: Vec<f64> = points.iter().map(|p| dist_sq(p, &centers[0])).collect();

    while centers.len() < k {
        let (idx, d) = min_dist
            .iter()
            .enumerate()
            .fold((0, -1.0), |best, (i, &d)| if d > best.1 { (i, d) } else { best });
        if d <= 0.0 {
            break;
        }
        let c = points[idx].to_vec();
        for (m, p) in min_dist.iter_mut().zip(points) {
            *m = m.min(dist_sq(p, &c));
        }
        centers.push(c);
    }
    centers
}

fn update_centers(points: &[&[f64]], labels: &[usize], centers: &mut [Vec<f64>]) {
    let dim = centers[0].len();
    let mut sums = vec![vec![0.0; dim]; centers.len()];
    let mut counts = vec![0usize; centers.len()];
    for (p, &l) in points.iter().zip(labels) {
        counts[l] += 1;
        for (s, v) in sums[l].iter_mut().zip(p.iter()) {
            *s += v;
        }
    }
    for ((c, s), &n) in centers.iter_mut().zip(sums).zip(&counts) {
        // an empty cluster keeps its last center
        if n > 0 {
            *c = s.into_iter().map(|v| v / n as f64).collect();
        }
    }
}

/// Drop empty clusters and renumber labels.
fn compact(centers: &mut Vec<Vec<f64>>, labels: &mut [usize]) {
    let mut counts = vec![0usize; centers.len()];
    for &l in labels.iter() {
        counts[l] += 1;
    }
    let mut remap = vec![usize::MAX; centers.len()];
    let mut next = 0;
    for (i, &n) in counts.iter().enumerate() {
        if n > 0 {
            remap[i] = next;
            next += 1;
        }
    }
    let mut i = 0;
    centers.retain(|_| {
        let keep = counts[i] > 0;
        i += 1;
        keep
    });
    for l in labels.iter_mut() {
        *l = remap[*l];
    }
}

#[inline]
fn nearest(centers: &[Vec<f64>], p: &[f64]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, c) in centers.iter().enumerate() {
        let d = dist_sq(p, c);
        if d < best_d {
            best = i;
            best_d = d;
        }
    }
    best
}

#[inline]
fn dist_sq(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[inline]
fn norm_sq(a: &[f64]) -> f64 {
    a.iter().map(|x| x * x).sum()
}
