use crate::{
    close_angle_loop, estimate_angle, pair_intersections, refit_camera, AngleEstimate,
    ClosedAngles, TriangulationError, TriangulationParams,
};
use lightmap_core::LightId;
use lightmap_photo::PhotographGeometry;
use log::{debug, info};
use nalgebra::{Point2, Point3, Rotation2, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Triangulated position of one light.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedPoint {
    pub light: LightId,
    pub position: Point3<f64>,
    /// Camera pairs that contributed.
    pub views: usize,
}

/// Camera parameters a pass was computed with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub name: String,
    pub angle_estimate: f64,
    pub distance: f64,
    pub origin: Point2<f64>,
}

impl CameraState {
    fn of(geometry: &PhotographGeometry) -> Self {
        let cam = geometry.camera();
        Self {
            name: geometry.name().to_string(),
            angle_estimate: cam.angle_estimate,
            distance: cam.distance(),
            origin: cam.origin,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedAngles {
    /// Two photographs: the best hypothesis is used, both are kept.
    Pair(AngleEstimate),
    Loop {
        estimates: [AngleEstimate; 3],
        closed: ClosedAngles,
    },
}

impl ResolvedAngles {
    /// Rotation of every camera from the first one.
    pub fn azimuths(&self) -> Vec<f64> {
        match self {
            ResolvedAngles::Pair(est) => vec![0.0, est.best],
            ResolvedAngles::Loop { closed, .. } => closed.azimuths().to_vec(),
        }
    }
}

/// One refinement pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub iteration: usize,
    pub points: BTreeMap<LightId, ReconstructedPoint>,
    pub cameras: Vec<CameraState>,
    pub angles: ResolvedAngles,
    /// Factor applied to bring the widest horizontal radius to one.
    pub scale: f64,
}

/// Every pass of a triangulation run; the last one is authoritative.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Reconstruction {
    pub history: Vec<Snapshot>,
    /// Set when the convergence tolerance ended the loop early.
    pub converged: bool,
}

impl Reconstruction {
    #[inline]
    pub fn latest(&self) -> Option<&Snapshot> {
        self.history.last()
    }

    pub fn points(&self) -> Option<&BTreeMap<LightId, ReconstructedPoint>> {
        self.latest().map(|s| &s.points)
    }
}

/// Runs the angle estimation, intersection and camera refit loop.
pub struct Triangulator {
    params: TriangulationParams,
}

impl Triangulator {
    pub fn new(params: TriangulationParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &TriangulationParams {
        &self.params
    }

    /// Triangulate two or three photographs, refining their cameras in place.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip_all, fields(photos = photos.len())))]
    pub fn run(
        &self,
        photos: &mut [PhotographGeometry],
    ) -> Result<Reconstruction, TriangulationError> {
        if !(2..=3).contains(&photos.len()) {
            return Err(TriangulationError::CameraCount { got: photos.len() });
        }

        let mut reconstruction = Reconstruction::default();
        let mut previous: Option<Vec<f64>> = None;
        for iteration in 0..self.params.refine_iterations.max(1) {
            let angles = self.resolve_angles(photos)?;
            let azimuths = angles.azimuths();
            for (photo, &psi) in photos.iter_mut().zip(&azimuths) {
                photo.camera_mut().angle_estimate = psi;
            }

            let mut points = self.triangulate(photos);
            let scale = if self.params.normalize_radius {
                normalize_radius(&mut points)
            } else {
                1.0
            };
            debug!(
                "pass {iteration}: {} points, scale {scale:.4}",
                points.len()
            );

            let cameras = photos.iter().map(CameraState::of).collect();
            let mut change = previous
                .as_ref()
                .map_or(f64::INFINITY, |prev| max_abs_diff(prev, &azimuths));
            for photo in photos.iter_mut() {
                let refit = refit_camera(photo, &points, &self.params)?;
                change = change.max(refit.magnitude(photo.projection().rad_per_px_x()));
            }
            previous = Some(azimuths);

            reconstruction.history.push(Snapshot {
                iteration,
                points,
                cameras,
                angles,
                scale,
            });

            if let Some(tol) = self.params.convergence_tolerance {
                if change < tol {
                    reconstruction.converged = true;
                    break;
                }
            }
        }

        info!(
            "triangulation finished after {} passes with {} points",
            reconstruction.history.len(),
            reconstruction.points().map_or(0, BTreeMap::len)
        );
        Ok(reconstruction)
    }

    fn resolve_angles(
        &self,
        photos: &[PhotographGeometry],
    ) -> Result<ResolvedAngles, TriangulationError> {
        match photos {
            [a, b] => Ok(ResolvedAngles::Pair(estimate_angle(a, b, &self.params)?)),
            [a, b, c] => {
                let estimates = [
                    estimate_angle(a, b, &self.params)?,
                    estimate_angle(b, c, &self.params)?,
                    estimate_angle(c, a, &self.params)?,
                ];
                let closed = close_angle_loop(&estimates[0], &estimates[1], &estimates[2]);
                debug!(
                    "angle loop closes in {} turn(s), error {:.2} deg",
                    closed.turns,
                    closed.error.to_degrees()
                );
                Ok(ResolvedAngles::Loop { estimates, closed })
            }
            _ => Err(TriangulationError::CameraCount { got: photos.len() }),
        }
    }

    /// Average of the pairwise intersections in the first camera's frame.
    fn triangulate(&self, photos: &[PhotographGeometry]) -> BTreeMap<LightId, ReconstructedPoint> {
        let pairs: &[(usize, usize)] = if photos.len() == 3 {
            &[(0, 1), (1, 2), (0, 2)]
        } else {
            &[(0, 1)]
        };

        let mut sums: BTreeMap<LightId, (Vector3<f64>, usize)> = BTreeMap::new();
        for &(i, j) in pairs {
            let psi_i = photos[i].camera().angle_estimate;
            let psi_j = photos[j].camera().angle_estimate;
            let rot = Rotation2::new(psi_i);
            let local = pair_intersections(&photos[i], &photos[j], psi_j - psi_i, &self.params);
            for (id, p) in local {
                let xy = rot * Point2::new(p.x, p.y);
                let entry = sums.entry(id).or_insert((Vector3::zeros(), 0));
                entry.0 += Vector3::new(xy.x, xy.y, p.z);
                entry.1 += 1;
            }
        }

        sums.into_iter()
            .map(|(light, (sum, views))| {
                let point = ReconstructedPoint {
                    light,
                    position: Point3::from(sum / views as f64),
                    views,
                };
                (light, point)
            })
            .collect()
    }
}

/// Scale all points so the widest horizontal radius is one; returns the factor.
fn normalize_radius(points: &mut BTreeMap<LightId, ReconstructedPoint>) -> f64 {
    let widest = points
        .values()
        .map(|p| p.position.x.hypot(p.position.y))
        .fold(0.0, f64::max);
    if widest <= f64::EPSILON {
        return 1.0;
    }
    let scale = 1.0 / widest;
    for p in points.values_mut() {
        p.position.coords *= scale;
    }
    scale
}

fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
