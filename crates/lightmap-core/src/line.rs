//! Total-least-squares line fitting and small distance helpers.
//!
//! Detections on a photograph are pixel points `(column, row)`. Strings of
//! lights hang mostly vertically, so fitting `row = f(column)` would blow up
//! exactly where it matters; the fit here is orientation free and reports
//! `column = slope * row + intercept` only when asked.

use nalgebra::{Matrix2, Point2, SymmetricEigen, Vector2};
use serde::{Deserialize, Serialize};

/// Line through `centroid` along the unit vector `direction`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    pub centroid: Point2<f64>,
    pub direction: Vector2<f64>,
}

impl LineFit {
    /// Perpendicular distance from `p` to the line.
    #[inline]
    pub fn distance(&self, p: &Point2<f64>) -> f64 {
        let d = p - self.centroid;
        (self.direction.x * d.y - self.direction.y * d.x).abs()
    }

    pub fn residual_sum_sq(&self, points: &[Point2<f64>]) -> f64 {
        points.iter().map(|p| self.distance(p).powi(2)).sum()
    }

    /// `(slope, intercept)` of `column = slope * row + intercept`.
    ///
    /// `None` for a horizontal line, which has no such form.
    pub fn column_of_row(&self) -> Option<(f64, f64)> {
        if self.direction.y.abs() < 1e-12 {
            return None;
        }
        let slope = self.direction.x / self.direction.y;
        Some((slope, self.centroid.x - slope * self.centroid.y))
    }
}

/// Fit a line minimizing squared perpendicular residuals.
///
/// Returns `None` for fewer than two points.
pub fn fit_line(points: &[Point2<f64>]) -> Option<LineFit> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.coords);
    let centroid = Point2::from(sum / n);

    let mut scatter = Matrix2::zeros();
    for p in points {
        let d = p - centroid;
        scatter += d * d.transpose();
    }
    if scatter.iter().all(|v| v.abs() < 1e-18) {
        // all points coincide; any direction fits with zero residual
        return Some(LineFit {
            centroid,
            direction: Vector2::new(0.0, 1.0),
        });
    }

    let eig = SymmetricEigen::new(scatter);
    let major = eig.eigenvalues.imax();
    let direction = eig.eigenvectors.column(major).normalize();
    Some(LineFit {
        centroid,
        direction,
    })
}

#[inline]
pub fn distance(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a - b).norm()
}

/// Sum of consecutive point distances.
pub fn path_length(points: &[Point2<f64>]) -> f64 {
    points.windows(2).map(|w| distance(&w[0], &w[1])).sum()
}

/// Median of the finite values; the mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    if v.len() % 2 == 0 {
        Some(0.5 * (v[mid - 1] + v[mid]))
    } else {
        Some(v[mid])
    }
}
