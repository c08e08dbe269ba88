use criterion::{criterion_group, criterion_main, Criterion};
use scenematch::{
    match_template_with, Mat, MatchConfig, Matcher, Method, PixelFormat, ScanOptions, TemplatePlan,
};
use std::hint::black_box;

fn make_scene(cols: usize, rows: usize, format: PixelFormat) -> Mat {
    let channels = format.channels();
    let mut data = Vec::with_capacity(cols * rows * channels);
    for y in 0..rows {
        for x in 0..cols {
            for c in 0..channels {
                let value = ((x * 13) ^ (y * 7) ^ (x * y) ^ (c * 29)) & 0xFF;
                data.push(value as u8);
            }
        }
    }
    Mat::from_u8(rows, cols, format, &data).unwrap()
}

fn bench_surface(c: &mut Criterion) {
    let scene = make_scene(320, 240, PixelFormat::U8C1);
    let templ = Mat::from_view(scene.view().roi(100, 80, 32, 24).unwrap()).unwrap();
    let plan = TemplatePlan::from_mat(&templ).unwrap();

    for method in [Method::SqDiff, Method::CCorrNormed, Method::CCoeffNormed] {
        c.bench_function(&format!("surface_{}_gray", method.name()), |b| {
            b.iter(|| {
                black_box(
                    match_template_with(&scene, &plan, method, &ScanOptions::default()).unwrap(),
                )
            });
        });
    }

    if cfg!(feature = "rayon") {
        let opts = ScanOptions {
            parallel: true,
            cancel: None,
        };
        c.bench_function("surface_ccoeff_normed_gray_parallel", |b| {
            b.iter(|| {
                black_box(match_template_with(&scene, &plan, Method::CCoeffNormed, &opts).unwrap())
            });
        });
    }

    let rgb = make_scene(320, 240, PixelFormat::U8C3);
    let rgb_plan =
        TemplatePlan::from_mat(&Mat::from_view(rgb.view().roi(40, 60, 32, 24).unwrap()).unwrap())
            .unwrap();
    c.bench_function("surface_ccoeff_normed_rgb", |b| {
        b.iter(|| {
            black_box(
                match_template_with(&rgb, &rgb_plan, Method::CCoeffNormed, &ScanOptions::default())
                    .unwrap(),
            )
        });
    });
}

fn bench_find_matches(c: &mut Criterion) {
    let scene = make_scene(320, 240, PixelFormat::U8C1);
    let templ = Mat::from_view(scene.view().roi(100, 80, 32, 24).unwrap()).unwrap();
    let matcher = Matcher::from_template(&templ)
        .unwrap()
        .with_config(MatchConfig {
            method: Method::CCoeffNormed,
            threshold: 0.5,
            max_matches: 20,
            parallel: false,
        });

    c.bench_function("find_matches_ccoeff_normed", |b| {
        b.iter(|| black_box(matcher.find_matches(&scene).unwrap()));
    });
}

criterion_group!(benches, bench_surface, bench_find_matches);
criterion_main!(benches);
