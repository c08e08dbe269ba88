#![cfg(feature = "rayon")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scenematch::{
    match_template_with, CancelToken, ErrorKind, Mat, MatchConfig, Matcher, Method, PixelFormat,
    ScanOptions, TemplatePlan,
};

fn random_rgb(seed: u64, rows: usize, cols: usize) -> Mat {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<u8> = (0..rows * cols * 3).map(|_| rng.random::<u8>()).collect();
    Mat::from_u8(rows, cols, PixelFormat::U8C3, &data).unwrap()
}

#[test]
fn parallel_surface_is_bit_identical() {
    let scene = random_rgb(17, 64, 80);
    let templ = Mat::from_view(scene.view().roi(30, 20, 9, 7).unwrap()).unwrap();
    let plan = TemplatePlan::from_mat(&templ).unwrap();

    for method in Method::ALL {
        let seq = match_template_with(&scene, &plan, method, &ScanOptions::default()).unwrap();
        let par = match_template_with(
            &scene,
            &plan,
            method,
            &ScanOptions {
                parallel: true,
                cancel: None,
            },
        )
        .unwrap();
        assert_eq!(seq.as_bytes(), par.as_bytes(), "{}", method.name());
    }
}

#[test]
fn parallel_search_matches_sequential() {
    let scene = random_rgb(23, 48, 48);
    let templ = Mat::from_view(scene.view().roi(5, 8, 6, 6).unwrap()).unwrap();
    let cfg = MatchConfig {
        method: Method::CCoeffNormed,
        threshold: 0.1,
        max_matches: 20,
        parallel: false,
    };

    let seq = Matcher::from_template(&templ)
        .unwrap()
        .with_config(cfg.clone())
        .find_matches(&scene)
        .unwrap();
    let par = Matcher::from_template(&templ)
        .unwrap()
        .with_config(MatchConfig {
            parallel: true,
            ..cfg
        })
        .find_matches(&scene)
        .unwrap();
    assert_eq!(seq, par);
}

#[test]
fn parallel_scan_honours_cancellation() {
    let scene = random_rgb(29, 32, 32);
    let templ = Mat::zeros(4, 4, PixelFormat::U8C3).unwrap();
    let plan = TemplatePlan::from_mat(&templ).unwrap();
    let token = CancelToken::new();
    token.cancel();

    let err = match_template_with(
        &scene,
        &plan,
        Method::CCorr,
        &ScanOptions {
            parallel: true,
            cancel: Some(token),
        },
    )
    .err()
    .unwrap();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}
