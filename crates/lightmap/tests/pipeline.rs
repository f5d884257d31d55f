use lightmap::core::{write_candidate_file, LightCandidate, LightId};
use lightmap::photo::ProjectionParams;
use lightmap::{PhotographInput, PipelineConfig, PipelineReport, ReconstructionPipeline};
use nalgebra::{Point2, Point3, Rotation2};

const LIGHTS: u32 = 60;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config() -> PipelineConfig {
    let mut cfg = PipelineConfig {
        projection: ProjectionParams {
            image_width: 6400,
            image_height: 4800,
            fov_x_deg: 60.0,
            fov_y_deg: 60.0,
        },
        ..PipelineConfig::default()
    };
    cfg.geometry.num_lights = LIGHTS as usize;
    // a helix seen from the side is not a straight string
    cfg.strings.outlier_factor = 1000.0;
    cfg
}

fn helix() -> Vec<Point3<f64>> {
    (0..LIGHTS)
        .map(|i| {
            let t = (6.0 * i as f64).to_radians();
            Point3::new(t.cos(), t.sin(), 0.02 * i as f64 - 0.6)
        })
        .collect()
}

fn shoot(name: &str, scene: &[Point3<f64>], azimuth_deg: f64) -> PhotographInput {
    let proj = config().projection;
    let to_local = Rotation2::new(-azimuth_deg.to_radians());
    let candidates = scene
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let q = to_local * Point2::new(p.x, p.y);
            let alpha = q.x.atan2(q.y + 2.0);
            let gamma = p.z.atan2(q.x.hypot(q.y + 2.0));
            LightCandidate {
                light: i as LightId,
                x: (3200.0 + alpha / proj.rad_per_px_x()).round() as i32,
                y: (proj.center_row() - gamma / proj.rad_per_px_y()).round() as i32,
                score: 1.0,
                signature: format!("{i:06b}"),
            }
        })
        .collect();
    PhotographInput::new(name, candidates)
}

/// Every light on one column: the camera distance is undefined.
fn flat(name: &str) -> PhotographInput {
    let candidates = (0..LIGHTS)
        .map(|i| LightCandidate {
            light: i,
            x: 3200,
            y: 400 + 50 * i as i32,
            score: 1.0,
            signature: String::new(),
        })
        .collect();
    PhotographInput::new(name, candidates)
}

#[test]
fn failed_photograph_is_isolated() {
    init_logging();
    let scene = helix();
    let inputs = vec![
        shoot("front", &scene, 0.0),
        flat("blurred"),
        shoot("left", &scene, 100.0),
    ];

    let report = ReconstructionPipeline::new(config()).run(inputs);
    assert_eq!(report.photographs.len(), 3);
    assert!(report.photographs[0].is_ok());
    assert!(report.photographs[2].is_ok());
    let failed = &report.photographs[1];
    assert_eq!(failed.name, "blurred");
    assert!(failed.error.is_some());
    assert!(failed.export.is_none());

    let front = &report.photographs[0];
    assert_eq!(front.lights, LIGHTS as usize);
    let disambiguation = front.disambiguation.as_ref().unwrap();
    assert!(disambiguation.converged);
    assert!(disambiguation.disabled.is_empty());
    assert_eq!(front.export.as_ref().unwrap().name, "front");

    assert!(report.triangulation_error.is_none());
    let export = report.export.as_ref().expect("two photographs triangulate");
    assert_eq!(export.cameras.len(), 2);
    assert!(export.points.len() >= 55);
    for (id, p) in &export.points {
        let truth = scene[*id as usize];
        let err = (Point3::new(p[0], p[1], p[2]) - truth).norm();
        assert!(err < 0.05, "light {id}: {p:?} vs {truth}");
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.write_json(&path).unwrap();
    let loaded = PipelineReport::load_json(&path).unwrap();
    assert_eq!(loaded.export, report.export);
    assert_eq!(loaded.photographs[1].error, failed.error);
}

#[test]
fn one_usable_photograph_reports_triangulation_error() {
    init_logging();
    let scene = helix();
    let report =
        ReconstructionPipeline::new(config()).run(vec![shoot("front", &scene, 0.0), flat("flat")]);
    assert!(report.reconstruction.is_none());
    assert!(report.export.is_none());
    let err = report.triangulation_error.expect("needs two photographs");
    assert!(err.contains("got 1"), "{err}");
    assert!(report.photographs[0].export.is_some());
}

#[test]
fn candidate_files_feed_the_pipeline() {
    init_logging();
    let scene = helix();
    let dir = tempfile::tempdir().unwrap();
    let mut inputs = Vec::new();
    for (name, azimuth) in [("front", 0.0), ("left", 100.0)] {
        let shot = shoot(name, &scene, azimuth);
        let mut rows: Vec<_> = shot.candidates.iter().map(|c| c.to_row()).collect();
        // unmatched cluster and an id beyond the string
        rows.push(lightmap::core::CandidateRow {
            led: -1,
            ..rows[0].clone()
        });
        rows.push(lightmap::core::CandidateRow {
            led: LIGHTS as i64,
            ..rows[0].clone()
        });
        let path = dir.path().join(format!("{name}.json"));
        write_candidate_file(&path, &rows).unwrap();

        let loaded = PhotographInput::from_candidate_file(name, &path, LIGHTS as usize).unwrap();
        assert_eq!(loaded.candidates, shot.candidates);
        inputs.push(loaded);
    }

    let report = ReconstructionPipeline::new(config()).run(inputs);
    assert!(report.photographs.iter().all(|p| p.is_ok()));
    assert!(report.reconstruction.is_some());
}
