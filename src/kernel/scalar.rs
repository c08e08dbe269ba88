//! Scalar reference kernel.

use crate::kernel::Kernel;

/// Plain sequential reductions.
pub struct ScalarKernel;

impl Kernel for ScalarKernel {
    #[inline]
    fn dot(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[inline]
    fn sq_diff(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(x, y)| {
                let d = x - y;
                d * d
            })
            .sum()
    }

    #[inline]
    fn sum_sq(a: &[f64]) -> f64 {
        a.iter().map(|x| x * x).sum()
    }
}
