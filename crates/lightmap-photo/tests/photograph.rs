use approx::assert_relative_eq;
use lightmap_core::{LightCandidate, LightId, NamedColor};
use lightmap_photo::{
    disambiguate_strings, CandidateStatus, GeometryParams, PhotographExport, PhotographGeometry,
    ProjectionParams, StringParams,
};

fn cand(light: LightId, x: i32, y: i32, score: f64) -> LightCandidate {
    LightCandidate {
        light,
        x,
        y,
        score,
        signature: format!("{light:08b}"),
    }
}

/// Two strings wound around the tree: lights 0..10 on a left-leaning line and
/// 15..25 on a right-leaning one, with a few ghost detections.
fn capture() -> Vec<LightCandidate> {
    let mut cands = Vec::new();
    for i in 0..10 {
        cands.push(cand(i, 250 + 6 * i as i32, 80 + 25 * i as i32, 10.0));
    }
    for i in 15..25 {
        let k = (i - 15) as i32;
        cands.push(cand(i, 380 - 6 * k, 80 + 25 * k, 10.0));
    }
    // ghosts with better scores than the real detections
    cands.push(cand(4, 520, 60, 2.0));
    cands.push(cand(18, 120, 400, 3.0));
    cands
}

#[test]
fn disambiguation_then_refresh_feeds_export() {
    let mut geo = PhotographGeometry::new(
        "front",
        capture(),
        &ProjectionParams::default(),
        &GeometryParams::default(),
    )
    .expect("usable photograph");

    let report = disambiguate_strings(&mut geo, &StringParams::default());
    assert!(report.converged);
    assert_eq!(report.strings.len(), 2);
    geo.refresh().expect("refresh");

    assert_eq!(geo.position(4).map(|p| (p.x, p.y)), Some((274.0, 180.0)));
    assert_eq!(geo.position(18).map(|p| (p.x, p.y)), Some((362.0, 155.0)));
    assert_eq!(geo.record(4).unwrap().best_match(), 0);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("front_export.json");
    let export = PhotographExport::from_geometry(&geo);
    export.write_json(&path).unwrap();
    let loaded = PhotographExport::load_json(&path).unwrap();
    assert_eq!(loaded, export);

    let light4 = &loaded.lights[&4];
    assert_eq!(light4.position, Some([274, 180]));
    assert_eq!(light4.candidates[0].status, CandidateStatus::Selected);
    assert_eq!(light4.candidates[1].status, CandidateStatus::Alternative);
    assert_eq!(light4.candidates[1].color, NamedColor::Red);
    assert!(loaded.reference_line.is_some());
}

#[test]
fn reference_line_and_angles_follow_camera_origin() {
    let cands: Vec<_> = (0..6).map(|i| cand(i, 300 + 10 * i as i32, 100 + 20 * i as i32, 1.0)).collect();
    let mut geo = PhotographGeometry::new(
        "slanted",
        cands,
        &ProjectionParams::default(),
        &GeometryParams::default(),
    )
    .unwrap();

    let (slope, intercept) = geo.reference_line().unwrap().column_of_row().unwrap();
    assert_relative_eq!(slope, 0.5, epsilon = 1e-9);
    assert_relative_eq!(intercept, 250.0, epsilon = 1e-9);

    assert_relative_eq!(geo.center_column(), 325.0);
    let per_px = 60f64.to_radians() / 640.0;
    assert_relative_eq!(geo.horizontal_angle(5).unwrap(), 25.0 * per_px, epsilon = 1e-12);
    assert_relative_eq!(geo.vertical_angle(0).unwrap(), 140.0 * 60f64.to_radians() / 480.0, epsilon = 1e-12);

    geo.camera_mut().origin.x = 300.0;
    assert_relative_eq!(geo.horizontal_angle(0).unwrap(), 0.0);
}
