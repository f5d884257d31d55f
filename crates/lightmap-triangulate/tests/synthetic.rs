use lightmap_core::{LightCandidate, LightId};
use lightmap_photo::{GeometryParams, PhotographGeometry, ProjectionParams};
use lightmap_triangulate::{
    estimate_angle, ReconstructionExport, ResolvedAngles, TriangulationParams, Triangulator,
};
use nalgebra::{Point2, Point3, Rotation2};
use std::f64::consts::TAU;

const LIGHTS: u32 = 60;
const CAMERA_DISTANCE: f64 = 2.0;

fn projection() -> ProjectionParams {
    ProjectionParams {
        image_width: 6400,
        image_height: 4800,
        fov_x_deg: 60.0,
        fov_y_deg: 60.0,
    }
}

fn geometry_params() -> GeometryParams {
    GeometryParams {
        num_lights: LIGHTS as usize,
        ..GeometryParams::default()
    }
}

/// One light every 6 degrees on the unit circle, rising along a helix.
fn helix() -> Vec<Point3<f64>> {
    (0..LIGHTS)
        .map(|i| {
            let t = (6.0 * i as f64).to_radians();
            Point3::new(t.cos(), t.sin(), 0.02 * i as f64 - 0.6)
        })
        .collect()
}

/// Pixel positions of every light seen from `azimuth_deg` around the tree.
fn photograph(name: &str, scene: &[Point3<f64>], azimuth_deg: f64) -> PhotographGeometry {
    let proj = projection();
    let to_local = Rotation2::new(-azimuth_deg.to_radians());
    let candidates = scene.iter().enumerate().map(|(i, p)| {
        let q = to_local * Point2::new(p.x, p.y);
        let alpha = q.x.atan2(q.y + CAMERA_DISTANCE);
        let gamma = p.z.atan2(q.x.hypot(q.y + CAMERA_DISTANCE));
        let x = proj.image_width as f64 / 2.0 + alpha / proj.rad_per_px_x();
        let y = proj.center_row() - gamma / proj.rad_per_px_y();
        LightCandidate {
            light: i as LightId,
            x: x.round() as i32,
            y: y.round() as i32,
            score: 1.0,
            signature: format!("{i:06b}"),
        }
    });
    PhotographGeometry::new(name, candidates, &proj, &geometry_params()).expect("valid photograph")
}

fn angle_error_deg(estimate: f64, truth_deg: f64) -> f64 {
    let diff = (estimate - truth_deg.to_radians()).rem_euclid(TAU);
    diff.min(TAU - diff).to_degrees()
}

#[test]
fn sweep_finds_the_rotation_between_two_views() {
    let scene = helix();
    let front = photograph("front", &scene, 0.0);
    let side = photograph("side", &scene, 100.0);

    let estimate =
        estimate_angle(&front, &side, &TriangulationParams::default()).expect("shared lights");
    assert!(estimate.peaks >= 2);
    assert!(estimate.best_score >= estimate.second_score);
    assert!(
        angle_error_deg(estimate.best, 100.0) < 3.0,
        "best hypothesis {:.2} deg",
        estimate.best.to_degrees()
    );
}

#[test]
fn sweep_with_known_cameras_is_within_one_sample() {
    let scene = helix();
    let params = TriangulationParams::default();
    let step_deg = (TAU / params.angle_samples as f64).to_degrees();

    let place = |photo: &mut PhotographGeometry| {
        let center = projection().image_width as f64 / 2.0;
        let camera = photo.camera_mut();
        camera.origin.x = center;
        let polar_sin = camera.polar().sin();
        camera
            .set_distance(CAMERA_DISTANCE / polar_sin)
            .expect("positive distance");
    };
    let mut front = photograph("front", &scene, 0.0);
    place(&mut front);

    for truth in [100.0, 45.0, 130.0, 230.0] {
        let mut other = photograph("other", &scene, truth);
        place(&mut other);
        let estimate = estimate_angle(&front, &other, &params).expect("shared lights");
        let err = angle_error_deg(estimate.best, truth);
        assert!(
            err < step_deg,
            "{truth} deg: best {:.3} deg, error {err:.3}",
            estimate.best.to_degrees()
        );
    }
}

#[test]
fn three_views_reconstruct_the_helix() {
    let scene = helix();
    let mut photos = vec![
        photograph("front", &scene, 0.0),
        photograph("left", &scene, 100.0),
        photograph("back", &scene, 230.0),
    ];

    let params = TriangulationParams::default();
    let reconstruction = Triangulator::new(params.clone())
        .run(&mut photos)
        .expect("triangulates");
    assert_eq!(reconstruction.history.len(), params.refine_iterations);
    assert!(!reconstruction.converged);

    let latest = reconstruction.latest().expect("one pass at least");
    let ResolvedAngles::Loop { closed, .. } = &latest.angles else {
        panic!("three photographs close an angle loop");
    };
    let sum: f64 = closed.angles.iter().sum();
    assert!((sum - closed.turns as f64 * TAU).abs() < 1e-9);

    let azimuths = latest.angles.azimuths();
    for (azimuth, truth) in azimuths.iter().zip([0.0, 100.0, 230.0]) {
        assert!(
            angle_error_deg(*azimuth, truth) < 3.0,
            "azimuth {:.2} deg vs {truth}",
            azimuth.to_degrees()
        );
    }

    assert!(latest.points.len() >= 55);
    for (id, point) in &latest.points {
        let truth = scene[*id as usize];
        let err = (point.position - truth).norm();
        assert!(err < 0.05, "light {id}: {} vs {truth}", point.position);
    }
    let widest = latest
        .points
        .values()
        .map(|p| p.position.x.hypot(p.position.y))
        .fold(0.0, f64::max);
    assert!((widest - 1.0).abs() < 1e-9);

    for photo in &photos {
        assert!(photo.camera().distance() > 1.5 && photo.camera().distance() < 2.5);
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lights_3d.json");
    let export = ReconstructionExport::from_reconstruction(&reconstruction, &photos)
        .expect("latest pass");
    export.write_json(&path).unwrap();
    let loaded = ReconstructionExport::load_json(&path).unwrap();
    assert_eq!(loaded, export);
    assert_eq!(loaded.cameras.len(), 3);
    assert_eq!(loaded.iterations, params.refine_iterations);
}

#[test]
fn two_views_use_the_best_hypothesis() {
    let scene = helix();
    let mut photos = vec![
        photograph("front", &scene, 0.0),
        photograph("left", &scene, 100.0),
    ];

    let reconstruction = Triangulator::new(TriangulationParams::default())
        .run(&mut photos)
        .expect("triangulates");
    let latest = reconstruction.latest().unwrap();
    let ResolvedAngles::Pair(estimate) = &latest.angles else {
        panic!("two photographs resolve a single pair");
    };
    assert_eq!(latest.angles.azimuths(), vec![0.0, estimate.best]);
    assert!(latest.points.len() >= 55);
    for (id, point) in &latest.points {
        let err = (point.position - scene[*id as usize]).norm();
        assert!(err < 0.05, "light {id}: {}", point.position);
    }
}

#[test]
fn convergence_tolerance_stops_early() {
    let scene = helix();
    let mut photos = vec![
        photograph("front", &scene, 0.0),
        photograph("left", &scene, 100.0),
    ];
    let params = TriangulationParams {
        convergence_tolerance: Some(1e-6),
        ..TriangulationParams::default()
    };
    let reconstruction = Triangulator::new(params).run(&mut photos).unwrap();
    assert!(reconstruction.converged);
    assert!(reconstruction.history.len() < 10);
}
