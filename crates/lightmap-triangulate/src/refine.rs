use crate::{ReconstructedPoint, RefitMethod, TriangulationParams};
use lightmap_core::{median, LightId};
use lightmap_photo::{GeometryError, PhotographGeometry};
use log::debug;
use nalgebra::{Matrix2, Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Observed column in radians and the light's point in the camera frame.
type Observation = (f64, Point2<f64>);

/// How much one refit moved a camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraRefit {
    /// Change of the origin column, pixels.
    pub origin_shift: f64,
    /// Change of the horizontal distance, tree-radius units.
    pub distance_change: f64,
    /// Reliable lights the refit used.
    pub observations: usize,
    /// RMS column residual after the refit, radians.
    pub rms: f64,
}

impl CameraRefit {
    /// Largest change expressed as an angle, using the column scale of the
    /// photograph for the origin shift.
    pub fn magnitude(&self, rad_per_px: f64) -> f64 {
        (self.origin_shift * rad_per_px)
            .abs()
            .max(self.distance_change.abs())
    }
}

/// Re-estimate a camera's origin column and horizontal distance from the
/// reconstructed points.
///
/// Each reliable light with a point is moved into the camera's frame, where
/// the camera looks from `(0, -d)` and the light's modeled column is
/// `origin + atan2(q.x, q.y + d) / k`. With [`RefitMethod::Bracketing`] the
/// distance is the median of the distances back-projected from the
/// `extreme_lights` widest observed angles, and the origin is the midpoint
/// of the origins implied by the nearest light on either side of the line
/// of sight. [`RefitMethod::JointFit`] fits both to every observed column by
/// Gauss-Newton. Estimates that cannot be formed leave that parameter as it
/// was; fewer than two lights leave the camera untouched.
pub fn refit_camera(
    geometry: &mut PhotographGeometry,
    points: &BTreeMap<LightId, ReconstructedPoint>,
    params: &TriangulationParams,
) -> Result<CameraRefit, GeometryError> {
    let camera = geometry.camera().clone();
    let to_local = Rotation2::new(-camera.angle_estimate);
    let k = geometry.projection().rad_per_px_x();

    let observations: Vec<Observation> = geometry
        .reliable()
        .filter_map(|id| {
            let p = points.get(&id)?.position;
            let px = geometry.position(id)?;
            Some((px.x * k, to_local * Point2::new(p.x, p.y)))
        })
        .collect();
    if observations.len() < 2 {
        return Ok(CameraRefit {
            observations: observations.len(),
            ..CameraRefit::default()
        });
    }

    let start = Vector2::new(camera.origin.x * k, camera.ground_distance());
    let fit = match params.refit {
        RefitMethod::Bracketing => {
            let d = extreme_distance(&observations, start.x, params.extreme_lights)
                .unwrap_or(start.y);
            let o = bracketing_origin(&observations, d).unwrap_or(start.x);
            Some(Vector2::new(o, d))
        }
        RefitMethod::JointFit => gauss_newton(&observations, start, params.refit_steps),
    };
    let Some(fit) = fit else {
        debug!("photograph {}: camera refit diverged", geometry.name());
        return Ok(CameraRefit {
            observations: observations.len(),
            rms: rms(&observations, start),
            ..CameraRefit::default()
        });
    };

    let polar_sin = camera.polar().sin();
    let cam = geometry.camera_mut();
    cam.origin.x = fit.x / k;
    cam.set_distance(fit.y / polar_sin)?;

    Ok(CameraRefit {
        origin_shift: (fit.x - start.x) / k,
        distance_change: fit.y - start.y,
        observations: observations.len(),
        rms: rms(&observations, fit),
    })
}

/// Median horizontal distance back-projected from the `count` lights with
/// the widest observed angle `u - origin`.
fn extreme_distance(observations: &[Observation], origin: f64, count: usize) -> Option<f64> {
    let mut widest: Vec<(f64, Point2<f64>)> = observations
        .iter()
        .map(|(u, q)| (u - origin, *q))
        .collect();
    widest.sort_by(|a, b| b.0.abs().total_cmp(&a.0.abs()));

    let distances: Vec<f64> = widest
        .iter()
        .take(count.max(1))
        .filter_map(|(angle, q)| {
            let t = angle.tan();
            if t.abs() < 1e-9 {
                return None;
            }
            let d = q.x / t - q.y;
            (d.is_finite() && d > 0.0).then_some(d)
        })
        .collect();
    median(&distances)
}

/// Midpoint of the origins implied by the nearest modeled light right of
/// the line of sight and the nearest one left of it, at distance `d`.
fn bracketing_origin(observations: &[Observation], d: f64) -> Option<f64> {
    let mut right: Option<(f64, f64)> = None;
    let mut left: Option<(f64, f64)> = None;
    for (u, q) in observations {
        let m = q.x.atan2(q.y + d);
        if m >= 0.0 {
            if right.is_none_or(|(best, _)| m < best) {
                right = Some((m, u - m));
            }
        } else if left.is_none_or(|(best, _)| m > best) {
            left = Some((m, u - m));
        }
    }
    let ((_, r), (_, l)) = (right?, left?);
    Some(0.5 * (r + l))
}

/// Residual `u - o - atan2(q.x, q.y + d)` of one observation at `(o, d)`.
#[inline]
fn residual(u: f64, q: &Point2<f64>, x: &Vector2<f64>) -> f64 {
    u - x.x - q.x.atan2(q.y + x.y)
}

fn rms(observations: &[Observation], x: Vector2<f64>) -> f64 {
    let sum: f64 = observations
        .iter()
        .map(|(u, q)| residual(*u, q, &x).powi(2))
        .sum();
    (sum / observations.len() as f64).sqrt()
}

fn gauss_newton(
    observations: &[Observation],
    start: Vector2<f64>,
    steps: usize,
) -> Option<Vector2<f64>> {
    let mut x = start;
    for _ in 0..steps {
        let mut jtj = Matrix2::zeros();
        let mut jtr = Vector2::zeros();
        for (u, q) in observations {
            let den = q.x * q.x + (q.y + x.y).powi(2);
            let j = Vector2::new(-1.0, q.x / den);
            jtj += j * j.transpose();
            jtr += j * residual(*u, q, &x);
        }
        let delta = jtj.lu().solve(&(-jtr))?;
        x += delta;
        if !x.iter().all(|v| v.is_finite()) || x.y <= 0.0 {
            return None;
        }
        if delta.norm() < 1e-12 {
            break;
        }
    }
    Some(x)
}
