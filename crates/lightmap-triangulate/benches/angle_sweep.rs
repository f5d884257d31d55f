use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lightmap_core::{LightCandidate, LightId};
use lightmap_photo::{GeometryParams, PhotographGeometry, ProjectionParams};
use lightmap_triangulate::{angle_fit_curve, TriangulationParams, Triangulator};
use nalgebra::{Point2, Rotation2};

fn photograph(name: &str, azimuth_deg: f64) -> PhotographGeometry {
    let proj = ProjectionParams {
        image_width: 6400,
        image_height: 4800,
        ..ProjectionParams::default()
    };
    let params = GeometryParams {
        num_lights: 60,
        ..GeometryParams::default()
    };
    let to_local = Rotation2::new(-azimuth_deg.to_radians());
    let candidates = (0..60u32).map(|i| {
        let t = (6.0 * i as f64).to_radians();
        let z = 0.02 * i as f64 - 0.6;
        let q = to_local * Point2::new(t.cos(), t.sin());
        let alpha = q.x.atan2(q.y + 2.0);
        let gamma = z.atan2(q.x.hypot(q.y + 2.0));
        LightCandidate {
            light: i as LightId,
            x: (3200.0 + alpha / proj.rad_per_px_x()).round() as i32,
            y: (proj.center_row() - gamma / proj.rad_per_px_y()).round() as i32,
            score: 1.0,
            signature: String::new(),
        }
    });
    PhotographGeometry::new(name, candidates, &proj, &params).expect("synthetic photograph")
}

fn bench_sweep(c: &mut Criterion) {
    let front = photograph("front", 0.0);
    let side = photograph("side", 100.0);
    c.bench_function("angle_fit_curve_500", |b| {
        b.iter(|| angle_fit_curve(black_box(&front), black_box(&side), 500))
    });
}

fn bench_triangulation(c: &mut Criterion) {
    let photos = vec![
        photograph("front", 0.0),
        photograph("left", 100.0),
        photograph("back", 230.0),
    ];
    let triangulator = Triangulator::new(TriangulationParams::default());
    c.bench_function("triangulate_three_views", |b| {
        b.iter(|| {
            let mut photos = photos.clone();
            triangulator.run(black_box(&mut photos))
        })
    });
}

criterion_group!(benches, bench_sweep, bench_triangulation);
criterion_main!(benches);
