//! Score surfaces checked against a direct `f64` evaluation of each formula.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scenematch::{
    match_template, match_template_with, min_max_loc, CancelToken, ErrorKind, Mat, Method,
    PixelFormat, Point, ScanOptions, TemplatePlan,
};

fn random_mat(rng: &mut StdRng, rows: usize, cols: usize, format: PixelFormat) -> Mat {
    match format {
        PixelFormat::F32C1 => {
            let values: Vec<f32> = (0..rows * cols)
                .map(|_| rng.random_range(-50.0f32..50.0))
                .collect();
            Mat::from_f32(rows, cols, &values).unwrap()
        }
        _ => {
            let len = rows * cols * format.channels();
            let data: Vec<u8> = (0..len).map(|_| rng.random::<u8>()).collect();
            Mat::from_u8(rows, cols, format, &data).unwrap()
        }
    }
}

fn crop(scene: &Mat, x: usize, y: usize, cols: usize, rows: usize) -> Mat {
    Mat::from_view(scene.view().roi(x, y, cols, rows).unwrap()).unwrap()
}

/// Evaluates one window exactly as the formulas are written.
fn reference_score(scene: &Mat, templ: &Mat, method: Method, x: usize, y: usize) -> f64 {
    let ch = templ.format().channels();
    let n = (templ.rows() * templ.cols()) as f64;
    let mut w = Vec::new();
    let mut t = Vec::new();
    for ty in 0..templ.rows() {
        for tx in 0..templ.cols() {
            for c in 0..ch {
                w.push((c, scene.sample(x + tx, y + ty, c).unwrap()));
                t.push(templ.sample(tx, ty, c).unwrap());
            }
        }
    }

    let mut mean_w = vec![0.0; ch];
    let mut mean_t = vec![0.0; ch];
    for (&(c, wv), &tv) in w.iter().zip(&t) {
        mean_w[c] += wv / n;
        mean_t[c] += tv / n;
    }

    let sum = |f: &dyn Fn(usize, f64, f64) -> f64| -> f64 {
        w.iter().zip(&t).map(|(&(c, wv), &tv)| f(c, wv, tv)).sum()
    };
    let sq_w = sum(&|_, wv, _| wv * wv);
    let sq_t = sum(&|_, _, tv| tv * tv);
    let norm = |num: f64, a: f64, b: f64| {
        if a <= 1e-9 || b <= 1e-9 {
            0.0
        } else {
            num / (a * b).sqrt()
        }
    };

    match method {
        Method::SqDiff => sum(&|_, wv, tv| (wv - tv).powi(2)),
        Method::SqDiffNormed => norm(sum(&|_, wv, tv| (wv - tv).powi(2)), sq_w, sq_t).min(1.0),
        Method::CCorr => sum(&|_, wv, tv| wv * tv),
        Method::CCorrNormed => norm(sum(&|_, wv, tv| wv * tv), sq_w, sq_t),
        Method::CCoeff => sum(&|c, wv, tv| (wv - mean_w[c]) * (tv - mean_t[c])),
        Method::CCoeffNormed => norm(
            sum(&|c, wv, tv| (wv - mean_w[c]) * (tv - mean_t[c])),
            sum(&|c, wv, _| (wv - mean_w[c]).powi(2)),
            sum(&|c, _, tv| (tv - mean_t[c]).powi(2)),
        ),
    }
}

fn assert_surface_matches_reference(scene: &Mat, templ: &Mat, method: Method) {
    let surface = match_template(scene, templ, method).unwrap();
    assert_eq!(surface.rows(), scene.rows() - templ.rows() + 1);
    assert_eq!(surface.cols(), scene.cols() - templ.cols() + 1);

    for y in 0..surface.rows() {
        for x in 0..surface.cols() {
            let got = surface.sample(x, y, 0).unwrap();
            let expected = reference_score(scene, templ, method, x, y);
            let tol = 1e-5 * expected.abs().max(1.0);
            assert!(
                (got - expected).abs() <= tol,
                "{} at ({x}, {y}): got {got}, expected {expected}",
                method.name()
            );
        }
    }
}

#[test]
fn all_methods_match_reference_gray() {
    let mut rng = StdRng::seed_from_u64(11);
    let scene = random_mat(&mut rng, 14, 17, PixelFormat::U8C1);
    let templ = random_mat(&mut rng, 4, 5, PixelFormat::U8C1);
    for method in Method::ALL {
        assert_surface_matches_reference(&scene, &templ, method);
    }
}

#[test]
fn all_methods_match_reference_rgb() {
    let mut rng = StdRng::seed_from_u64(12);
    let scene = random_mat(&mut rng, 10, 12, PixelFormat::U8C3);
    let templ = random_mat(&mut rng, 3, 4, PixelFormat::U8C3);
    for method in Method::ALL {
        assert_surface_matches_reference(&scene, &templ, method);
    }
}

#[test]
fn all_methods_match_reference_rgba() {
    let mut rng = StdRng::seed_from_u64(13);
    let scene = random_mat(&mut rng, 9, 9, PixelFormat::U8C4);
    let templ = random_mat(&mut rng, 3, 3, PixelFormat::U8C4);
    for method in Method::ALL {
        assert_surface_matches_reference(&scene, &templ, method);
    }
}

#[test]
fn all_methods_match_reference_float() {
    let mut rng = StdRng::seed_from_u64(14);
    let scene = random_mat(&mut rng, 12, 11, PixelFormat::F32C1);
    let templ = random_mat(&mut rng, 5, 3, PixelFormat::F32C1);
    for method in Method::ALL {
        assert_surface_matches_reference(&scene, &templ, method);
    }
}

#[test]
fn exact_subwindow_is_global_extremum() {
    let mut rng = StdRng::seed_from_u64(21);
    for format in [PixelFormat::U8C1, PixelFormat::U8C3, PixelFormat::F32C1] {
        let scene = random_mat(&mut rng, 40, 50, format);
        let (x, y) = (rng.random_range(0..40), rng.random_range(0..30));
        let templ = crop(&scene, x, y, 8, 7);
        let at = Point { x, y };

        let sq = min_max_loc(&match_template(&scene, &templ, Method::SqDiff).unwrap()).unwrap();
        assert_eq!(sq.min_loc, at);
        assert!(sq.min_val.abs() < 1e-6);

        let cc = min_max_loc(&match_template(&scene, &templ, Method::CCoeffNormed).unwrap())
            .unwrap();
        assert_eq!(cc.max_loc, at);
        assert!((cc.max_val - 1.0).abs() < 1e-5);
    }
}

#[test]
fn normalized_scores_are_bounded() {
    let mut rng = StdRng::seed_from_u64(31);
    let scene = random_mat(&mut rng, 30, 30, PixelFormat::U8C1);
    let templ = random_mat(&mut rng, 6, 6, PixelFormat::U8C1);

    for method in [Method::CCorrNormed, Method::CCoeffNormed] {
        let ext = min_max_loc(&match_template(&scene, &templ, method).unwrap()).unwrap();
        assert!(ext.min_val >= -1.0 && ext.max_val <= 1.0, "{}", method.name());
    }
    let ext = min_max_loc(&match_template(&scene, &templ, Method::SqDiffNormed).unwrap()).unwrap();
    assert!(ext.min_val >= 0.0 && ext.max_val <= 1.0);
}

#[test]
fn sqdiff_normed_stays_within_unit_range_for_dissimilar_windows() {
    let scene = Mat::from_u8(2, 2, PixelFormat::U8C1, &[200, 10, 30, 250]).unwrap();
    let templ = Mat::from_u8(1, 2, PixelFormat::U8C1, &[1, 2]).unwrap();
    let ext = min_max_loc(&match_template(&scene, &templ, Method::SqDiffNormed).unwrap()).unwrap();
    assert_eq!(ext.max_val, 1.0);
    assert!(ext.min_val >= 0.0);

    let mut rng = StdRng::seed_from_u64(32);
    let dark = random_mat(&mut rng, 20, 20, PixelFormat::U8C1);
    let bright = Mat::from_u8(4, 4, PixelFormat::U8C1, &[255; 16]).unwrap();
    let ext = min_max_loc(&match_template(&dark, &bright, Method::SqDiffNormed).unwrap()).unwrap();
    assert!(ext.min_val >= 0.0 && ext.max_val <= 1.0);
}

#[test]
fn single_block_scene_scenario() {
    let mut scene = Mat::zeros(100, 100, PixelFormat::U8C1).unwrap();
    scene.set_region(20, 20, 10, 10, 255.0).unwrap();
    let templ = Mat::from_u8(10, 10, PixelFormat::U8C1, &[255; 100]).unwrap();

    let surface = match_template(&scene, &templ, Method::SqDiff).unwrap();
    assert_eq!((surface.rows(), surface.cols()), (91, 91));
    let ext = min_max_loc(&surface).unwrap();
    assert_eq!(ext.min_val, 0.0);
    assert_eq!(ext.min_loc, Point { x: 20, y: 20 });
}

#[test]
fn flat_template_scores_zero_under_ccoeff_normed() {
    let mut rng = StdRng::seed_from_u64(41);
    let scene = random_mat(&mut rng, 12, 12, PixelFormat::U8C1);
    let templ = Mat::from_u8(3, 3, PixelFormat::U8C1, &[90; 9]).unwrap();
    let ext = min_max_loc(&match_template(&scene, &templ, Method::CCoeffNormed).unwrap()).unwrap();
    assert_eq!(ext.min_val, 0.0);
    assert_eq!(ext.max_val, 0.0);
}

#[test]
fn precondition_failures_are_classified() {
    let scene = Mat::zeros(5, 5, PixelFormat::U8C1).unwrap();

    let tall = Mat::zeros(6, 2, PixelFormat::U8C1).unwrap();
    let err = match_template(&scene, &tall, Method::CCorr).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let rgb = Mat::zeros(2, 2, PixelFormat::U8C3).unwrap();
    let err = match_template(&scene, &rgb, Method::CCorr).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::ComputationFailure);

    let float = Mat::zeros(2, 2, PixelFormat::F32C1).unwrap();
    let err = match_template(&scene, &float, Method::CCorr).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::ComputationFailure);
}

#[test]
fn template_equal_to_scene_gives_single_cell() {
    let mut rng = StdRng::seed_from_u64(51);
    let scene = random_mat(&mut rng, 6, 7, PixelFormat::U8C1);
    let surface = match_template(&scene, &scene, Method::CCorrNormed).unwrap();
    assert_eq!((surface.rows(), surface.cols()), (1, 1));
    assert!((surface.sample(0, 0, 0).unwrap() - 1.0).abs() < 1e-6);
}

#[test]
fn cancelled_scan_reports_cancellation() {
    let scene = Mat::zeros(20, 20, PixelFormat::U8C1).unwrap();
    let templ = Mat::zeros(4, 4, PixelFormat::U8C1).unwrap();
    let plan = TemplatePlan::from_mat(&templ).unwrap();
    let token = CancelToken::new();
    token.cancel();

    let opts = ScanOptions {
        parallel: false,
        cancel: Some(token),
    };
    let err = match_template_with(&scene, &plan, Method::SqDiff, &opts)
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}
