use crate::TriangulationParams;
use lightmap_core::LightId;
use lightmap_photo::PhotographGeometry;
use nalgebra::{Matrix2, Point2, Point3, Rotation2, Vector2};
use std::collections::BTreeMap;

/// Intersect the horizontal rays of two cameras looking at the tree axis.
///
/// The first camera sits at `(0, -d1)`, the second at the same spot rotated
/// by `phi` about the axis with distance `d2`. `alpha` and `beta` are the
/// rays' angles from each camera's line of sight, positive to the right.
/// The result is in the first camera's frame; parallel rays give `None`.
pub fn intersect_rays(alpha: f64, d1: f64, beta: f64, d2: f64, phi: f64) -> Option<Point2<f64>> {
    let (s1, c1) = alpha.sin_cos();
    let (s2, c2) = (beta - phi).sin_cos();
    let a = Matrix2::new(c1, -s1, c2, -s2);
    let det = a.determinant();
    if !det.is_finite() || det.abs() < 1e-12 {
        return None;
    }
    let b = Vector2::new(d1 * s1, d2 * beta.sin());
    let p = a.lu().solve(&b)?;
    p.iter().all(|v| v.is_finite()).then(|| Point2::from(p))
}

/// 3-D intersections of every light seen in both photographs, in the first
/// camera's frame.
///
/// Heights come from each camera's vertical angle at the intersection's
/// horizontal range, averaged over the two cameras. Points with `|x|` or
/// `|y|` at or beyond `max_intersection_distance`, and rays crossing at less
/// than `min_crossing_angle_deg`, are dropped.
pub fn pair_intersections(
    first: &PhotographGeometry,
    second: &PhotographGeometry,
    phi: f64,
    params: &TriangulationParams,
) -> BTreeMap<LightId, Point3<f64>> {
    let max_dist = params.max_intersection_distance;
    let min_crossing = params.min_crossing_angle_deg.to_radians().sin();
    let d1 = first.camera().ground_distance();
    let d2 = second.camera().ground_distance();
    let c1 = Point2::new(0.0, -d1);
    let c2 = Rotation2::new(phi) * Point2::new(0.0, -d2);

    let mut out = BTreeMap::new();
    for id in first.shared_lights(second) {
        let (Some(p1), Some(p2)) = (first.position(id), second.position(id)) else {
            continue;
        };
        let alpha = first.horizontal_angle_of(&p1);
        let beta = second.horizontal_angle_of(&p2);
        if (alpha - beta + phi).sin().abs() < min_crossing {
            continue;
        }
        let Some(p) = intersect_rays(alpha, d1, beta, d2, phi) else {
            continue;
        };
        if p.x.abs() >= max_dist || p.y.abs() >= max_dist {
            continue;
        }
        let z1 = (p - c1).norm() * first.vertical_angle_of(&p1).tan();
        let z2 = (p - c2).norm() * second.vertical_angle_of(&p2).tan();
        out.insert(id, Point3::new(p.x, p.y, 0.5 * (z1 + z2)));
    }
    out
}
