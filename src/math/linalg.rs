//! Linear algebra helpers for LWPR.
//!
//! ## Purpose
//!
//! This module bridges the generic `Float` code of the crate to nalgebra for
//! the one dense factorisation LWPR needs (Cholesky, used to validate and
//! factor user-supplied initial distance metrics), and provides the small
//! vector kernels used on every update.
//!
//! ## Design notes
//!
//! * Cholesky is delegated to nalgebra for `f32` and `f64`.
//! * Vector kernels are plain slice loops; LWPR vectors have length `nIn`.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::fmt::Debug;
use num_traits::Float;

// ============================================================================
// FloatLinalg Trait
// ============================================================================

/// Floating point types usable by LWPR models.
pub trait FloatLinalg: Float + Debug + Send + Sync + 'static {
    /// Lower Cholesky factor `L` (`A = L * Lᵀ`) of a dense row-major matrix.
    ///
    /// Returns `None` if `A` is not positive definite. Only the lower triangle
    /// of `A` is read; symmetry is the caller's responsibility.
    fn cholesky_lower(a: &[Self], n: usize) -> Option<Vec<Self>>;
}

impl FloatLinalg for f64 {
    #[inline]
    fn cholesky_lower(a: &[Self], n: usize) -> Option<Vec<Self>> {
        nalgebra_backend::cholesky_lower_f64(a, n)
    }
}

impl FloatLinalg for f32 {
    #[inline]
    fn cholesky_lower(a: &[Self], n: usize) -> Option<Vec<Self>> {
        nalgebra_backend::cholesky_lower_f32(a, n)
    }
}

// ============================================================================
// Vector kernels
// ============================================================================

/// Dot product.
#[inline]
pub fn dot<T: Float>(a: &[T], b: &[T]) -> T {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .fold(T::zero(), |acc, (&x, &y)| acc + x * y)
}

/// `y += alpha * x`.
#[inline]
pub fn axpy<T: Float>(alpha: T, x: &[T], y: &mut [T]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi = *yi + alpha * xi;
    }
}

/// `y = beta * y + alpha * x`.
#[inline]
pub fn scale_add<T: Float>(beta: T, y: &mut [T], alpha: T, x: &[T]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi = beta * *yi + alpha * xi;
    }
}

/// Squared Mahalanobis distance `dxᵀ D dx` for a dense row-major `D`.
#[inline]
pub fn quadratic_form<T: Float>(d: &[T], dx: &[T]) -> T {
    let n = dx.len();
    debug_assert_eq!(d.len(), n * n);
    let mut q = T::zero();
    for i in 0..n {
        q = q + dx[i] * dot(&d[i * n..(i + 1) * n], dx);
    }
    q
}

/// Whether a dense row-major matrix is symmetric within a relative tolerance.
pub fn is_symmetric<T: Float>(a: &[T], n: usize) -> bool {
    let tol = T::from(1e-10).unwrap();
    for i in 0..n {
        for j in 0..i {
            let (p, q) = (a[i * n + j], a[j * n + i]);
            if (p - q).abs() > tol * (T::one() + p.abs().max(q.abs())) {
                return false;
            }
        }
    }
    true
}

// ============================================================================
// Nalgebra Backend Implementation
// ============================================================================

/// Nalgebra-based factorisations.
pub mod nalgebra_backend {
    use super::*;
    use nalgebra::DMatrix;

    /// Lower Cholesky factor in row-major order using f64 precision.
    pub fn cholesky_lower_f64(a: &[f64], n: usize) -> Option<Vec<f64>> {
        let matrix = DMatrix::from_row_slice(n, n, a);
        let l = matrix.cholesky()?.l();
        let mut out = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                out.push(l[(i, j)]);
            }
        }
        Some(out)
    }

    /// Lower Cholesky factor in row-major order using f32 precision.
    pub fn cholesky_lower_f32(a: &[f32], n: usize) -> Option<Vec<f32>> {
        let matrix = DMatrix::from_row_slice(n, n, a);
        let l = matrix.cholesky()?.l();
        let mut out = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                out.push(l[(i, j)]);
            }
        }
        Some(out)
    }
}
