//! SIMD-accelerated kernel using the `wide` crate.
//!
//! Reductions process four samples at a time with `f64x4` and finish the
//! remainder with a scalar tail.

use crate::kernel::Kernel;
use wide::f64x4;

const LANES: usize = 4;

/// Load 4 f64 values into f64x4.
#[inline]
fn load_f64x4(slice: &[f64]) -> f64x4 {
    f64x4::from([slice[0], slice[1], slice[2], slice[3]])
}

/// Horizontal sum of f64x4.
#[inline]
fn hsum(v: f64x4) -> f64 {
    let arr = v.to_array();
    arr[0] + arr[1] + arr[2] + arr[3]
}

/// Vectorized reductions.
pub struct SimdKernel;

impl Kernel for SimdKernel {
    #[inline]
    fn dot(a: &[f64], b: &[f64]) -> f64 {
        let n = a.len().min(b.len());
        let simd_end = n / LANES * LANES;
        let mut acc = f64x4::ZERO;
        let mut i = 0;
        while i < simd_end {
            acc += load_f64x4(&a[i..]) * load_f64x4(&b[i..]);
            i += LANES;
        }
        let mut tail = 0.0;
        while i < n {
            tail += a[i] * b[i];
            i += 1;
        }
        hsum(acc) + tail
    }

    #[inline]
    fn sq_diff(a: &[f64], b: &[f64]) -> f64 {
        let n = a.len().min(b.len());
        let simd_end = n / LANES * LANES;
        let mut acc = f64x4::ZERO;
        let mut i = 0;
        while i < simd_end {
            let d = load_f64x4(&a[i..]) - load_f64x4(&b[i..]);
            acc += d * d;
            i += LANES;
        }
        let mut tail = 0.0;
        while i < n {
            let d = a[i] - b[i];
            tail += d * d;
            i += 1;
        }
        hsum(acc) + tail
    }

    #[inline]
    fn sum_sq(a: &[f64]) -> f64 {
        let simd_end = a.len() / LANES * LANES;
        let mut acc = f64x4::ZERO;
        let mut i = 0;
        while i < simd_end {
            let v = load_f64x4(&a[i..]);
            acc += v * v;
            i += LANES;
        }
        let mut tail = 0.0;
        while i < a.len() {
            tail += a[i] * a[i];
            i += 1;
        }
        hsum(acc) + tail
    }
}
